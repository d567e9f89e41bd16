//! Meal attendance records.
//!
//! There is at most one record per user, date and meal. The document id is
//! derived from those three fields so marking twice overwrites.

use super::{MealType, now_millis};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a user will eat a given meal on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    /// Always `userId_date_mealType` once stored
    #[serde(default, skip_serializing)]
    pub id: String,
    /// Account uid of the diner
    pub user_id: String,
    /// Email at the time of marking
    #[serde(default)]
    pub user_email: String,
    /// Day of the meal
    pub date: NaiveDate,
    /// Which meal
    pub meal_type: MealType,
    /// Whether the user will eat it
    pub is_present: bool,
    /// Last change, epoch milliseconds
    pub timestamp: i64,
}

impl Attendance {
    /// Builds a record stamped with the current time.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        user_email: impl Into<String>,
        date: NaiveDate,
        meal_type: MealType,
        is_present: bool,
    ) -> Self {
        let mut attendance = Self {
            id: String::new(),
            user_id: user_id.into(),
            user_email: user_email.into(),
            date,
            meal_type,
            is_present,
            timestamp: now_millis(),
        };
        attendance.id = attendance.document_id();
        attendance
    }

    /// The composite key `userId_date_mealType`.
    #[must_use]
    pub fn document_id(&self) -> String {
        composite_id(&self.user_id, self.date, self.meal_type)
    }
}

/// Derives the attendance document id for a user, date and meal.
#[must_use]
pub fn composite_id(user_id: &str, date: NaiveDate, meal_type: MealType) -> String {
    format!("{user_id}_{}_{meal_type}", date.format("%Y-%m-%d"))
}
