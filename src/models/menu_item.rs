//! Menu items served on a given day.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Meal slot of the day. Used both as a menu category and an attendance key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    /// Morning meal
    Breakfast,
    /// Midday meal
    Lunch,
    /// Evening meal
    Dinner,
}

impl MealType {
    /// All meals in serving order.
    pub const ALL: [Self; 3] = [Self::Breakfast, Self::Lunch, Self::Dinner];

    /// Stored and command-line name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|meal| meal.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation("meal_type", format!("unknown meal type '{s}'")))
    }
}

/// A dish offered for one meal on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Store-assigned document id
    #[serde(default, skip_serializing)]
    pub id: String,
    /// Dish name
    pub name: String,
    /// Meal the dish is served at
    pub category: MealType,
    /// Price in the local currency
    pub price: f64,
    /// Optional free text
    #[serde(default)]
    pub description: String,
    /// False when the dish ran out or was withdrawn
    #[serde(default = "default_available")]
    pub is_available: bool,
    /// Serving date, stored as `yyyy-mm-dd`
    pub date: NaiveDate,
}

const fn default_available() -> bool {
    true
}

impl MenuItem {
    /// Builds an available item with no description.
    #[must_use]
    pub fn new(name: impl Into<String>, category: MealType, price: f64, date: NaiveDate) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            category,
            price,
            description: String::new(),
            is_available: true,
            date,
        }
    }

    /// Checks the name is present and the price is a finite non-negative amount.
    pub fn validate(&self) -> Result<()> {
        super::require_text("name", &self.name)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::validation(
                "price",
                format!("must be a non-negative amount, got {}", self.price),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_meal_type_parsing() {
        assert_eq!("lunch".parse::<MealType>().unwrap(), MealType::Lunch);
        assert_eq!(" Dinner ".parse::<MealType>().unwrap(), MealType::Dinner);
        assert!("brunch".parse::<MealType>().is_err());
    }

    #[test]
    fn test_menu_item_serializes_without_id() {
        let mut item = MenuItem::new("Poha", MealType::Breakfast, 25.0, date());
        item.id = "abc".to_string();
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["date"], "2024-05-01");
        assert_eq!(json["category"], "breakfast");
        assert_eq!(json["isAvailable"], true);
    }

    #[test]
    fn test_menu_item_validation() {
        assert!(MenuItem::new("Dal", MealType::Lunch, 0.0, date()).validate().is_ok());
        assert!(MenuItem::new("  ", MealType::Lunch, 10.0, date()).validate().is_err());
        assert!(MenuItem::new("Dal", MealType::Lunch, -1.0, date()).validate().is_err());
        assert!(MenuItem::new("Dal", MealType::Lunch, f64::NAN, date()).validate().is_err());
    }

    #[test]
    fn test_rejects_non_iso_date() {
        let json = serde_json::json!({
            "name": "Dal",
            "category": "lunch",
            "price": 10.0,
            "date": "01/05/2024"
        });
        assert!(serde_json::from_value::<MenuItem>(json).is_err());
    }
}
