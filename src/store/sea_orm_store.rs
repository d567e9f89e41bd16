//! SQLite-backed [`DocumentStore`] built on `SeaORM`.
//!
//! All documents share the `documents` table. Filtering and sorting run in
//! process over one collection's rows. Writes take an in-process lock before
//! opening a database transaction, so read-modify-write cycles on the same
//! document never interleave and `SQLite` never sees competing writers.

use super::{Document, DocumentStore, Mutation, Query};
use crate::{
    entities::{Document as DocumentEntity, document},
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, trace};
use uuid::Uuid;

/// Document store persisted through a `SeaORM` connection.
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
    write_lock: Arc<Mutex<()>>,
}

impl SeaOrmStore {
    /// Wraps a connection whose tables were created with
    /// [`create_tables`](crate::config::database::create_tables).
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Underlying connection, shared with the auth backend.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn find_in(
        txn: &DatabaseTransaction,
        collection: &str,
        id: &str,
    ) -> Result<Option<document::Model>> {
        DocumentEntity::find_by_id((collection.to_string(), id.to_string()))
            .one(txn)
            .await
            .map_err(Into::into)
    }

    async fn write_existing(
        txn: &DatabaseTransaction,
        model: document::Model,
        data: Value,
    ) -> Result<()> {
        let mut active: document::ActiveModel = model.into();
        active.data = Set(data);
        active.updated_at = Set(chrono::Utc::now());
        active.update(txn).await?;
        Ok(())
    }
}

fn require_object(collection: &str, data: &Value) -> Result<()> {
    if data.is_object() {
        Ok(())
    } else {
        Err(Error::validation(
            "document",
            format!("documents in '{collection}' must be JSON objects"),
        ))
    }
}

#[async_trait]
impl DocumentStore for SeaOrmStore {
    #[instrument(skip(self, data))]
    async fn insert(&self, collection: &str, data: Value) -> Result<String> {
        require_object(collection, &data)?;
        let id = Uuid::new_v4().to_string();
        let _guard = self.write_lock.lock().await;

        let model = document::ActiveModel {
            collection: Set(collection.to_string()),
            id: Set(id.clone()),
            data: Set(data),
            updated_at: Set(chrono::Utc::now()),
        };
        model.insert(&self.db).await?;

        debug!("Inserted {}/{}", collection, id);
        Ok(id)
    }

    #[instrument(skip(self, data))]
    async fn upsert(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        require_object(collection, &data)?;
        let _guard = self.write_lock.lock().await;
        let txn = self.db.begin().await?;

        match Self::find_in(&txn, collection, id).await? {
            Some(existing) => {
                Self::write_existing(&txn, existing, data).await?;
                debug!("Overwrote {}/{}", collection, id);
            }
            None => {
                let model = document::ActiveModel {
                    collection: Set(collection.to_string()),
                    id: Set(id.to_string()),
                    data: Set(data),
                    updated_at: Set(chrono::Utc::now()),
                };
                model.insert(&txn).await?;
                debug!("Created {}/{}", collection, id);
            }
        }

        txn.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        let rows = DocumentEntity::find()
            .filter(document::Column::Collection.eq(collection))
            .order_by_asc(document::Column::UpdatedAt)
            .order_by_asc(document::Column::Id)
            .all(&self.db)
            .await?;

        let mut documents: Vec<Document> = rows
            .into_iter()
            .map(|row| Document {
                id: row.id,
                data: row.data,
            })
            .collect();
        query.apply(&mut documents);

        trace!("Query on '{}' matched {} documents", collection, documents.len());
        Ok(documents)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let row = DocumentEntity::find_by_id((collection.to_string(), id.to_string()))
            .one(&self.db)
            .await?;
        Ok(row.map(|row| Document {
            id: row.id,
            data: row.data,
        }))
    }

    #[instrument(skip(self, fields))]
    async fn update(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let txn = self.db.begin().await?;

        let Some(existing) = Self::find_in(&txn, collection, id).await? else {
            txn.rollback().await?;
            return Err(Error::not_found(collection, id));
        };

        let mut data = existing.data.clone();
        let Some(body) = data.as_object_mut() else {
            txn.rollback().await?;
            return Err(Error::validation(
                "document",
                format!("{collection}/{id} is not a JSON object"),
            ));
        };
        body.extend(fields);

        Self::write_existing(&txn, existing, data).await?;
        txn.commit().await?;

        debug!("Updated fields of {}/{}", collection, id);
        Ok(())
    }

    #[instrument(skip(self, mutation))]
    async fn run_transaction(
        &self,
        collection: &str,
        id: &str,
        mutation: Mutation,
    ) -> Result<Value> {
        let _guard = self.write_lock.lock().await;
        let txn = self.db.begin().await?;

        let Some(existing) = Self::find_in(&txn, collection, id).await? else {
            txn.rollback().await?;
            return Err(Error::not_found(collection, id));
        };

        let mut data = existing.data.clone();
        if let Err(e) = mutation(&mut data) {
            txn.rollback().await?;
            return Err(e);
        }
        require_object(collection, &data)?;

        Self::write_existing(&txn, existing, data.clone()).await?;
        txn.commit().await?;

        debug!("Committed transaction on {}/{}", collection, id);
        Ok(data)
    }
}
