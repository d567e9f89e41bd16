//! Domain records stored in the document store.
//!
//! Records serialize with camelCase field names. A record's `id` is the document
//! id: it is never written into the body and is filled in after a read.

/// Per-meal attendance
pub mod attendance;
/// Discussion threads and replies
pub mod discussion;
/// Feedback and its review workflow
pub mod feedback;
/// Menu items and meal slots
pub mod menu_item;
/// User profiles
pub mod user;

pub use attendance::Attendance;
pub use discussion::{Discussion, DiscussionCategory, DiscussionFilter, DiscussionReply};
pub use feedback::{Feedback, FeedbackCategory, FeedbackStatus};
pub use menu_item::{MealType, MenuItem};
pub use user::User;

/// Current time as Unix epoch milliseconds, the timestamp unit of every record.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Rejects empty or whitespace-only text fields.
pub(crate) fn require_text(field: &'static str, value: &str) -> crate::errors::Result<()> {
    if value.trim().is_empty() {
        return Err(crate::errors::Error::validation(
            field,
            "cannot be empty",
        ));
    }
    Ok(())
}

/// A record kept in its own collection of the document store.
pub trait Record: serde::Serialize + serde::de::DeserializeOwned {
    /// Collection the record lives in
    const COLLECTION: &'static str;

    /// Copies the document id onto the record after a read.
    fn set_id(&mut self, id: String);
}

impl Record for MenuItem {
    const COLLECTION: &'static str = "menu_items";

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for Attendance {
    const COLLECTION: &'static str = "attendance";

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for Feedback {
    const COLLECTION: &'static str = "feedback";

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for Discussion {
    const COLLECTION: &'static str = "discussions";

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for User {
    const COLLECTION: &'static str = "users";

    // The email is the id and is already part of the body.
    fn set_id(&mut self, _id: String) {}
}
