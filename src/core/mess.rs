//! Mess repository - menu, attendance, feedback and discussion operations.
//!
//! Attendance is upserted under the composite id `userId_date_mealType`, so marking
//! the same meal twice overwrites. Reply appends, like increments and feedback
//! status changes run as store transactions, never as a separate read and write.

use super::{RepositorySettings, bounded};
use crate::{
    auth::{AuthService, AuthUser},
    errors::{Error, Result},
    models::{
        Attendance, Discussion, DiscussionFilter, DiscussionReply, Feedback, FeedbackStatus,
        MenuItem, Record, now_millis,
    },
    store::{DocumentStore, Query, SortDirection, record_mutation},
};
use chrono::NaiveDate;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Store value of a calendar date, `yyyy-mm-dd`.
fn date_value(date: NaiveDate) -> Value {
    Value::String(date.format("%Y-%m-%d").to_string())
}

/// Menu, attendance, feedback and discussion operations.
#[derive(Clone)]
pub struct MessRepository {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthService>,
    settings: RepositorySettings,
}

impl std::fmt::Debug for MessRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessRepository")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl MessRepository {
    /// Wires the repository to its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthService>,
        settings: RepositorySettings,
    ) -> Self {
        Self {
            store,
            auth,
            settings,
        }
    }

    /// Reads and decodes every matching record. Documents that no longer decode
    /// are skipped with a warning rather than failing the whole listing.
    async fn fetch<T: Record>(&self, query: &Query) -> Result<Vec<T>> {
        let documents = self.store.get(T::COLLECTION, query).await?;
        let total = documents.len();
        let records: Vec<T> = documents
            .into_iter()
            .filter_map(|doc| {
                let id = doc.id.clone();
                doc.into_record::<T>()
                    .inspect_err(|e| warn!("Skipping malformed {}/{}: {}", T::COLLECTION, id, e))
                    .ok()
            })
            .collect();
        debug!("Fetched {}/{} {} records", records.len(), total, T::COLLECTION);
        Ok(records)
    }

    async fn require_admin(&self) -> Result<AuthUser> {
        let user = self.auth.current_user().await.ok_or(Error::NotSignedIn)?;
        if self.settings.is_admin(&user.email) {
            Ok(user)
        } else {
            Err(Error::PermissionDenied {
                message: format!("{} is not an admin", user.email),
            })
        }
    }

    // Menu

    /// All menu items served on `date`. No items is an empty list, not an error.
    #[instrument(skip(self))]
    pub async fn get_menu_items(&self, date: NaiveDate) -> Result<Vec<MenuItem>> {
        bounded("get_menu_items", self.settings.timeout, async {
            self.fetch(&Query::new().where_eq("date", date_value(date)))
                .await
        })
        .await
    }

    /// Inserts a menu item. Admin only; the store assigns the id.
    #[instrument(skip(self, item), fields(name = %item.name, date = %item.date))]
    pub async fn add_menu_item(&self, item: MenuItem) -> Result<bool> {
        item.validate()?;
        bounded("add_menu_item", self.settings.timeout, async {
            let admin = self.require_admin().await?;
            let id = self
                .store
                .insert(MenuItem::COLLECTION, serde_json::to_value(&item)?)
                .await?;
            info!("{} added menu item {}", admin.email, id);
            Ok(true)
        })
        .await
    }

    // Attendance

    /// Creates or overwrites the record for the attendance's user, date and meal.
    #[instrument(skip(self, attendance), fields(id = %attendance.document_id()))]
    pub async fn mark_attendance(&self, attendance: Attendance) -> Result<bool> {
        crate::models::require_text("user_id", &attendance.user_id)?;
        let id = attendance.document_id();
        bounded("mark_attendance", self.settings.timeout, async {
            self.store
                .upsert(Attendance::COLLECTION, &id, serde_json::to_value(&attendance)?)
                .await?;
            debug!("Marked {} present={}", id, attendance.is_present);
            Ok(true)
        })
        .await
    }

    /// A user's attendance records for one day.
    #[instrument(skip(self))]
    pub async fn get_attendance(&self, user_id: &str, date: NaiveDate) -> Result<Vec<Attendance>> {
        bounded("get_attendance", self.settings.timeout, async {
            let query = Query::new()
                .where_eq("userId", user_id)
                .where_eq("date", date_value(date));
            self.fetch(&query).await
        })
        .await
    }

    /// Sets the presence flag and refreshes the timestamp of an existing record.
    #[instrument(skip(self))]
    pub async fn update_attendance(&self, attendance_id: &str, is_present: bool) -> Result<bool> {
        crate::models::require_text("attendance_id", attendance_id)?;
        bounded("update_attendance", self.settings.timeout, async {
            let mut fields = Map::new();
            fields.insert("isPresent".to_string(), json!(is_present));
            fields.insert("timestamp".to_string(), json!(now_millis()));
            self.store
                .update(Attendance::COLLECTION, attendance_id, fields)
                .await?;
            Ok(true)
        })
        .await
    }

    // Feedback

    /// Validates and stores new feedback. Submitted feedback always starts pending.
    #[instrument(skip(self, feedback), fields(user_id = %feedback.user_id, rating = feedback.rating))]
    pub async fn submit_feedback(&self, mut feedback: Feedback) -> Result<bool> {
        feedback.validate()?;
        feedback.status = FeedbackStatus::Pending;
        bounded("submit_feedback", self.settings.timeout, async {
            let id = self
                .store
                .insert(Feedback::COLLECTION, serde_json::to_value(&feedback)?)
                .await?;
            info!("Stored feedback {}", id);
            Ok(true)
        })
        .await
    }

    /// A user's feedback, newest first.
    #[instrument(skip(self))]
    pub async fn get_user_feedback(&self, user_id: &str) -> Result<Vec<Feedback>> {
        bounded("get_user_feedback", self.settings.timeout, async {
            let query = Query::new()
                .where_eq("userId", user_id)
                .order_by("timestamp", SortDirection::Descending);
            self.fetch(&query).await
        })
        .await
    }

    /// Every feedback entry, newest first.
    #[instrument(skip(self))]
    pub async fn get_all_feedback(&self) -> Result<Vec<Feedback>> {
        bounded("get_all_feedback", self.settings.timeout, async {
            self.fetch(&Query::new().order_by("timestamp", SortDirection::Descending))
                .await
        })
        .await
    }

    /// Moves feedback forward through pending, reviewed, resolved. Admin only.
    #[instrument(skip(self))]
    pub async fn update_feedback_status(
        &self,
        feedback_id: &str,
        status: FeedbackStatus,
    ) -> Result<bool> {
        bounded("update_feedback_status", self.settings.timeout, async {
            let admin = self.require_admin().await?;
            let mutation = record_mutation(move |feedback: &mut Feedback| {
                if !feedback.status.can_transition_to(status) {
                    return Err(Error::InvalidStatusTransition {
                        from: feedback.status.to_string(),
                        to: status.to_string(),
                    });
                }
                feedback.status = status;
                Ok(())
            });
            self.store
                .run_transaction(Feedback::COLLECTION, feedback_id, mutation)
                .await?;
            info!("{} set feedback {} to {}", admin.email, feedback_id, status);
            Ok(true)
        })
        .await
    }

    // Discussions

    /// Starts a thread. Likes and replies always start empty.
    #[instrument(skip(self, discussion), fields(user_id = %discussion.user_id, category = %discussion.category))]
    pub async fn create_discussion(&self, mut discussion: Discussion) -> Result<bool> {
        discussion.validate()?;
        discussion.likes = 0;
        discussion.replies.clear();
        bounded("create_discussion", self.settings.timeout, async {
            let id = self
                .store
                .insert(Discussion::COLLECTION, serde_json::to_value(&discussion)?)
                .await?;
            info!("Created discussion {}", id);
            Ok(true)
        })
        .await
    }

    /// Threads newest first, optionally limited to one category.
    #[instrument(skip(self))]
    pub async fn get_discussions(&self, filter: DiscussionFilter) -> Result<Vec<Discussion>> {
        bounded("get_discussions", self.settings.timeout, async {
            let mut query = Query::new().order_by("timestamp", SortDirection::Descending);
            if let Some(category) = filter.category() {
                query = query.where_eq("category", category.as_str());
            }
            self.fetch(&query).await
        })
        .await
    }

    /// Appends a reply inside a transaction so concurrent replies all survive.
    #[instrument(skip(self, reply))]
    pub async fn add_reply_to_discussion(
        &self,
        discussion_id: &str,
        mut reply: DiscussionReply,
    ) -> Result<bool> {
        reply.validate()?;
        if reply.id.trim().is_empty() {
            reply.id = Uuid::new_v4().to_string();
        }
        bounded("add_reply_to_discussion", self.settings.timeout, async {
            let mutation = record_mutation(move |discussion: &mut Discussion| {
                discussion.replies.push(reply);
                Ok(())
            });
            self.store
                .run_transaction(Discussion::COLLECTION, discussion_id, mutation)
                .await?;
            Ok(true)
        })
        .await
    }

    /// Adds one like inside a transaction.
    #[instrument(skip(self))]
    pub async fn like_discussion(&self, discussion_id: &str) -> Result<bool> {
        bounded("like_discussion", self.settings.timeout, async {
            let mutation = record_mutation(|discussion: &mut Discussion| {
                discussion.likes = discussion.likes.saturating_add(1);
                Ok(())
            });
            self.store
                .run_transaction(Discussion::COLLECTION, discussion_id, mutation)
                .await?;
            Ok(true)
        })
        .await
    }

    // Session helpers

    /// Identity of the signed-in user, if any.
    pub async fn current_user(&self) -> Option<AuthUser> {
        self.auth.current_user().await
    }

    /// Email of the signed-in user, empty when nobody is signed in.
    pub async fn current_user_email(&self) -> String {
        self.current_user()
            .await
            .map(|user| user.email)
            .unwrap_or_default()
    }
}
