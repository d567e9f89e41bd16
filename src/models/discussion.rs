//! Discussion threads and their replies.
//!
//! Replies are append-only and kept in arrival order; the like counter only grows.
//! Both are mutated through store transactions, never by a plain overwrite.

use super::{now_millis, require_text};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Board a discussion is posted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscussionCategory {
    /// Open talk
    #[default]
    General,
    /// Problems with the mess
    Complaints,
    /// Ideas for improvement
    Suggestions,
    /// Notices from the staff
    Announcements,
}

impl DiscussionCategory {
    /// Every category in display order.
    pub const ALL: [Self; 4] = [
        Self::General,
        Self::Complaints,
        Self::Suggestions,
        Self::Announcements,
    ];

    /// Stored and command-line name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Complaints => "complaints",
            Self::Suggestions => "suggestions",
            Self::Announcements => "announcements",
        }
    }
}

impl fmt::Display for DiscussionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscussionCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::validation("category", format!("unknown discussion category '{s}'"))
            })
    }
}

/// Category selection for listing discussions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiscussionFilter {
    #[default]
    All,
    Category(DiscussionCategory),
}

impl DiscussionFilter {
    /// `None` and `"all"` mean no filter; anything else must name a category.
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None => Ok(Self::All),
            Some(v) if v.eq_ignore_ascii_case("all") => Ok(Self::All),
            Some(v) => v.parse().map(Self::Category),
        }
    }

    /// The selected category, `None` for all.
    #[must_use]
    pub const fn category(self) -> Option<DiscussionCategory> {
        match self {
            Self::All => None,
            Self::Category(c) => Some(c),
        }
    }
}

impl FromStr for DiscussionFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(Some(s))
    }
}

impl From<DiscussionCategory> for DiscussionFilter {
    fn from(category: DiscussionCategory) -> Self {
        Self::Category(category)
    }
}

impl From<Option<DiscussionCategory>> for DiscussionFilter {
    fn from(category: Option<DiscussionCategory>) -> Self {
        category.map_or(Self::All, Self::Category)
    }
}

/// A reply stored inline in its discussion's `replies` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionReply {
    /// UUID assigned when the reply is added
    #[serde(default)]
    pub id: String,
    /// Author uid
    pub user_id: String,
    /// Author email
    #[serde(default)]
    pub user_email: String,
    /// Author display name
    #[serde(default)]
    pub user_name: String,
    /// Reply text
    pub content: String,
    /// Creation time, epoch milliseconds
    pub timestamp: i64,
}

impl DiscussionReply {
    /// Builds a reply stamped with the current time. The id is assigned on append.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        user_email: impl Into<String>,
        user_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.into(),
            user_email: user_email.into(),
            user_name: user_name.into(),
            content: content.into(),
            timestamp: now_millis(),
        }
    }

    /// Rejects empty author or content.
    pub fn validate(&self) -> Result<()> {
        require_text("content", &self.content)
    }
}

/// A discussion thread with inline replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    /// Document id
    #[serde(default, skip_serializing)]
    pub id: String,
    /// Author uid
    pub user_id: String,
    /// Author email
    #[serde(default)]
    pub user_email: String,
    /// Author display name
    #[serde(default)]
    pub user_name: String,
    /// Thread title
    pub title: String,
    /// Opening post
    pub content: String,
    /// Creation time, epoch milliseconds
    pub timestamp: i64,
    /// Replies in the order they were added
    #[serde(default)]
    pub replies: Vec<DiscussionReply>,
    /// Like count
    #[serde(default)]
    pub likes: u32,
    /// Board the thread belongs to
    #[serde(default)]
    pub category: DiscussionCategory,
}

impl Discussion {
    /// Builds a new thread with no replies or likes.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        user_email: impl Into<String>,
        user_name: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        category: DiscussionCategory,
    ) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.into(),
            user_email: user_email.into(),
            user_name: user_name.into(),
            title: title.into(),
            content: content.into(),
            timestamp: now_millis(),
            replies: Vec::new(),
            likes: 0,
            category,
        }
    }

    /// Rejects empty author, title or content.
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_filter_parse() {
        assert_eq!(DiscussionFilter::parse(None).unwrap(), DiscussionFilter::All);
        assert_eq!(DiscussionFilter::parse(Some("all")).unwrap(), DiscussionFilter::All);
        assert_eq!(
            DiscussionFilter::parse(Some("complaints")).unwrap(),
            DiscussionFilter::Category(DiscussionCategory::Complaints)
        );
        assert!(DiscussionFilter::parse(Some("rants")).is_err());
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let json = serde_json::json!({
            "userId": "u1",
            "title": "Hello",
            "content": "First post",
            "timestamp": 10
        });
        let discussion: Discussion = serde_json::from_value(json).unwrap();
        assert_eq!(discussion.category, DiscussionCategory::General);
        assert_eq!(discussion.likes, 0);
        assert!(discussion.replies.is_empty());
    }

    #[test]
    fn test_validation() {
        let mut discussion =
            Discussion::new("u1", "a@b.c", "A", "Title", "Body", DiscussionCategory::General);
        assert!(discussion.validate().is_ok());
        discussion.content = " ".to_string();
        assert!(discussion.validate().is_err());
        assert!(DiscussionReply::new("u1", "a@b.c", "A", "").validate().is_err());
    }
}
