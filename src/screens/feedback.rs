//! Feedback screen: submission form plus the user's own history.

use super::{ScreenMessage, ScreenScope};
use crate::{
    auth::AuthUser,
    core::MessRepository,
    models::{
        Feedback, FeedbackCategory,
        feedback::{MAX_RATING, MIN_RATING},
    },
};

/// Form fields. A rating of 0 means no star picked yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackForm {
    /// Short summary
    pub title: String,
    /// Details
    pub description: String,
    /// Stars picked, 0 when none
    pub rating: u8,
    /// What the feedback is about
    pub category: FeedbackCategory,
}

impl Default for FeedbackForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            rating: 0,
            category: FeedbackCategory::FoodQuality,
        }
    }
}

impl FeedbackForm {
    /// Whether every field is filled with a valid value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.description.trim().is_empty()
            && (MIN_RATING..=MAX_RATING).contains(&self.rating)
    }
}

/// Feedback form plus the user's past entries.
#[derive(Debug)]
pub struct FeedbackScreen {
    mess: MessRepository,
    scope: ScreenScope,
    user: AuthUser,
    /// Fields being edited
    pub form: FeedbackForm,
    history: Vec<Feedback>,
    message: Option<ScreenMessage>,
}

impl FeedbackScreen {
    /// An empty form for `user`.
    #[must_use]
    pub fn new(mess: MessRepository, user: AuthUser) -> Self {
        Self {
            mess,
            scope: ScreenScope::new(),
            user,
            form: FeedbackForm::default(),
            history: Vec::new(),
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

    /// The user's feedback, newest first.
    #[must_use]
    pub fn history(&self) -> &[Feedback] {
        &self.history
    }

    /// Whether the submit button is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.form.is_complete()
    }

    /// Reloads the user's feedback, newest first.
    pub async fn load_history(&mut self) -> bool {
        let mess = self.mess.clone();
        let user_id = self.user.uid.clone();
        let Some(outcome) = self
            .scope
            .run(async move { mess.get_user_feedback(&user_id).await })
            .await
        else {
            return false;
        };

        match outcome {
            Ok(history) => {
                self.history = history;
                true
            }
            Err(e) => {
                self.message = Some(ScreenMessage::error(&e));
                false
            }
        }
    }

    /// Submits the form; on success clears it and refreshes the history.
    pub async fn submit(&mut self) -> bool {
        if !self.can_submit() {
            self.message = Some(ScreenMessage::Error(format!(
                "Add a title, a description and a rating from {MIN_RATING} to {MAX_RATING}"
            )));
            return false;
        }

        let feedback = Feedback::new(
            &self.user.uid,
            &self.user.email,
            self.form.title.trim(),
            self.form.description.trim(),
            self.form.rating,
            self.form.category,
        );
        let mess = self.mess.clone();
        let Some(outcome) = self
            .scope
            .run(async move { mess.submit_feedback(feedback).await })
            .await
        else {
            return false;
        };

        match outcome {
            Ok(_) => {
                self.form = FeedbackForm::default();
                self.load_history().await;
                self.message = Some(ScreenMessage::Info("Thanks for your feedback".to_string()));
                true
            }
            Err(e) => {
                self.message = Some(ScreenMessage::error(&e));
                false
            }
        }
    }
}
