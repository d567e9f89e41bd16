//! Startup seeding of menu items from config.toml.
//!
//! Seeding writes straight to the store without the admin check: it runs before
//! anyone signs in. An item is skipped when one with the same name, meal and
//! date already exists, so restarting with the same config inserts nothing new.

use crate::{
    config::MenuSeed,
    errors::Result,
    models::{MenuItem, Record},
    store::{DocumentStore, Query},
};
use tracing::{debug, info, instrument};

/// Inserts missing seed items and returns how many were added.
#[instrument(skip(store, seeds))]
pub async fn seed_menu(store: &dyn DocumentStore, seeds: &[MenuSeed]) -> Result<usize> {
    info!("Seeding menu. Found {} entries in config.", seeds.len());
    let mut inserted = 0;

    for seed in seeds {
        let item = MenuItem::from(seed);
        item.validate()?;

        let query = Query::new()
            .where_eq("date", item.date.format("%Y-%m-%d").to_string())
            .where_eq("category", item.category.as_str())
            .where_eq("name", item.name.as_str());
        if !store.get(MenuItem::COLLECTION, &query).await?.is_empty() {
            debug!("Menu item '{}' on {} already exists. Skipping.", item.name, item.date);
            continue;
        }

        store
            .insert(MenuItem::COLLECTION, serde_json::to_value(&item)?)
            .await?;
        inserted += 1;
    }

    info!("Finished seeding menu, inserted {} items.", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{config::AppConfig, store::SeaOrmStore, test_utils::setup_test_db};

    fn seeds() -> Vec<MenuSeed> {
        let config: AppConfig = toml::from_str(
            r#"
            [[menu]]
            name = "Upma"
            category = "breakfast"
            price = 20.0
            date = "2024-05-01"

            [[menu]]
            name = "Rajma Rice"
            category = "lunch"
            price = 55.0
            date = "2024-05-01"
            "#,
        )
        .unwrap();
        config.menu
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() -> Result<()> {
        let store = SeaOrmStore::new(setup_test_db().await?);
        assert_eq!(seed_menu(&store, &seeds()).await?, 2);
        assert_eq!(seed_menu(&store, &seeds()).await?, 0);

        let items = store.get(MenuItem::COLLECTION, &Query::new()).await?;
        assert_eq!(items.len(), 2);
        Ok(())
    }
}
