//! Feedback submitted by diners and triaged by admins.

use super::{now_millis, require_text};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Lowest accepted star rating
pub const MIN_RATING: u8 = 1;
/// Highest accepted star rating
pub const MAX_RATING: u8 = 5;

/// What the feedback is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    /// Taste, temperature and portions
    FoodQuality,
    /// Staff and serving
    Service,
    /// Hygiene of the hall
    Cleanliness,
    /// Anything else
    Other,
}

impl FeedbackCategory {
    /// Every category.
    pub const ALL: [Self; 4] = [
        Self::FoodQuality,
        Self::Service,
        Self::Cleanliness,
        Self::Other,
    ];

    /// Stored and command-line name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FoodQuality => "food_quality",
            Self::Service => "service",
            Self::Cleanliness => "cleanliness",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| Error::validation("category", format!("unknown feedback category '{s}'")))
    }
}

/// Review state. Variants are declared in transition order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
/// Review progress of a feedback entry.
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    /// Not looked at yet
    #[default]
    Pending,
    /// Seen by an admin
    Reviewed,
    /// Dealt with
    Resolved,
}

impl FeedbackStatus {
    /// Every status in workflow order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Reviewed, Self::Resolved];

    /// Stored and command-line name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Resolved => "resolved",
        }
    }

    /// Status only moves forward; staying put is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        next >= self
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s.trim())
            .ok_or_else(|| Error::validation("status", format!("unknown feedback status '{s}'")))
    }
}

/// A rated piece of feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Document id
    #[serde(default, skip_serializing)]
    pub id: String,
    /// Author uid
    pub user_id: String,
    /// Author email
    #[serde(default)]
    pub user_email: String,
    /// Short summary
    pub title: String,
    /// Details
    pub description: String,
    /// Stars, 1 to 5
    pub rating: u8,
    /// What the feedback is about
    pub category: FeedbackCategory,
    /// Submission time, epoch milliseconds
    pub timestamp: i64,
    /// Review progress
    #[serde(default)]
    pub status: FeedbackStatus,
}

impl Feedback {
    /// Builds a pending feedback entry stamped with the current time.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        user_email: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        rating: u8,
        category: FeedbackCategory,
    ) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.into(),
            user_email: user_email.into(),
            title: title.into(),
            description: description.into(),
            rating,
            category,
            timestamp: now_millis(),
            status: FeedbackStatus::Pending,
        }
    }

    /// Checks the rating range and that title and description are set.
    pub fn validate(&self) -> Result<()> {
        validate_rating(self.rating)?;
        require_text("title", &self.title)?;
        require_text("description", &self.description)
    }
}

/// Accepts 1 through 5 stars.
pub fn validate_rating(rating: u8) -> Result<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(Error::validation(
            "rating",
            format!("must be between {MIN_RATING} and {MAX_RATING}, got {rating}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_rating_bounds() {
        for rating in 1..=5 {
            assert!(validate_rating(rating).is_ok(), "rating {rating} should pass");
        }
        for rating in [0, 6, 10, u8::MAX] {
            assert!(matches!(
                validate_rating(rating),
                Err(Error::Validation { field: "rating", .. })
            ));
        }
    }

    #[test]
    fn test_status_transitions() {
        use FeedbackStatus::{Pending, Resolved, Reviewed};
        assert!(Pending.can_transition_to(Reviewed));
        assert!(Reviewed.can_transition_to(Resolved));
        assert!(Pending.can_transition_to(Resolved));
        assert!(Reviewed.can_transition_to(Reviewed));
        assert!(!Resolved.can_transition_to(Pending));
        assert!(!Reviewed.can_transition_to(Pending));
    }

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_value(FeedbackCategory::FoodQuality).unwrap();
        assert_eq!(json, "food_quality");
        assert_eq!(
            "cleanliness".parse::<FeedbackCategory>().unwrap(),
            FeedbackCategory::Cleanliness
        );
    }

    #[test]
    fn test_missing_status_defaults_to_pending() {
        let json = serde_json::json!({
            "userId": "u1",
            "title": "Cold rice",
            "description": "Rice was cold at lunch",
            "rating": 2,
            "category": "food_quality",
            "timestamp": 1
        });
        let feedback: Feedback = serde_json::from_value(json).unwrap();
        assert_eq!(feedback.status, FeedbackStatus::Pending);
        assert!(feedback.validate().is_ok());
    }
}
