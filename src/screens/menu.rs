//! Menu screen: the day's items with an optional meal filter.

use super::{ScreenMessage, ScreenScope};
use crate::{
    core::MessRepository,
    models::{MealType, MenuItem},
};
use chrono::NaiveDate;

/// Menu for one day, optionally narrowed to one meal.
#[derive(Debug)]
pub struct MenuScreen {
    mess: MessRepository,
    scope: ScreenScope,
    /// Day shown
    pub date: NaiveDate,
    /// `None` shows every meal
    pub meal_filter: Option<MealType>,
    items: Vec<MenuItem>,
    message: Option<ScreenMessage>,
}

impl MenuScreen {
    /// An empty screen for `date`; call [`Self::load`] next.
    #[must_use]
    pub fn new(mess: MessRepository, date: NaiveDate) -> Self {
        Self {
            mess,
            scope: ScreenScope::new(),
            date,
            meal_filter: None,
            items: Vec::new(),
            message: None,
        }
    }

    /// Mount scope of this screen.
    #[must_use]
    pub const fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    /// Inline message from the last operation.
    #[must_use]
    pub const fn message(&self) -> Option<&ScreenMessage> {
        self.message.as_ref()
    }

    /// Every loaded item, unfiltered.
    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Items for the selected meal, breakfast first.
    #[must_use]
    pub fn visible_items(&self) -> Vec<&MenuItem> {
        let mut visible: Vec<&MenuItem> = self
            .items
            .iter()
            .filter(|item| self.meal_filter.is_none_or(|meal| item.category == meal))
            .collect();
        visible.sort_by_key(|item| item.category);
        visible
    }

    /// Reloads the items for `date`. Returns true when the load succeeded.
    pub async fn load(&mut self) -> bool {
        let mess = self.mess.clone();
        let date = self.date;
        let Some(outcome) = self
            .scope
            .run(async move { mess.get_menu_items(date).await })
            .await
        else {
            return false;
        };

        match outcome {
            Ok(items) => {
                self.items = items;
                self.message = None;
                true
            }
            Err(e) => {
                self.message = Some(ScreenMessage::error(&e));
                false
            }
        }
    }

    /// Admin action: adds an item and reloads when it is for the shown date.
    pub async fn add_item(&mut self, item: MenuItem) -> bool {
        let mess = self.mess.clone();
        let shown = item.date == self.date;
        let Some(outcome) = self
            .scope
            .run(async move { mess.add_menu_item(item).await })
            .await
        else {
            return false;
        };

        match outcome {
            Ok(_) => {
                if shown {
                    self.load().await;
                }
                self.message = Some(ScreenMessage::Info("Menu item added".to_string()));
                true
            }
            Err(e) => {
                self.message = Some(ScreenMessage::error(&e));
                false
            }
        }
    }
}
