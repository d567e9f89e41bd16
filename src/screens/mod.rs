//! View state holders - the state behind each screen of the app.
//!
//! A screen owns the records it displays, its form fields and an inline
//! [`ScreenMessage`]. Every failed repository call becomes an error message on
//! the screen; nothing is swallowed.
//!
//! Repository calls issued by a screen run as detached tasks through its
//! [`ScreenScope`]. Unmounting the screen (or dropping the future awaiting the
//! call) never cancels a write already issued, but a result that arrives after
//! unmount is discarded instead of touching the screen's state.

/// Attendance marks for a day
pub mod attendance;
/// Discussion board
pub mod discuss;
/// Feedback form and history
pub mod feedback;
/// Daily menu
pub mod menu;
/// Sign-in and sign-up
pub mod sign_in;

pub use attendance::AttendanceScreen;
pub use discuss::{DiscussScreen, DiscussionDraft};
pub use feedback::{FeedbackForm, FeedbackScreen};
pub use menu::MenuScreen;
pub use sign_in::{AuthMode, AuthState, SignInScreen};

use crate::{
    auth::AuthUser,
    core::UserRepository,
    errors::{Error, Result},
    models::User,
};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Inline feedback shown on a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenMessage {
    /// Confirmation of a completed action
    Info(String),
    /// A failed operation, shown in place of the result
    Error(String),
}

impl ScreenMessage {
    /// Error message carrying the error's display text.
    pub fn error(err: &Error) -> Self {
        Self::Error(err.to_string())
    }

    /// True for [`ScreenMessage::Error`].
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Lifetime of a mounted screen. Clones share one token, so unmounting through
/// any clone unmounts them all.
#[derive(Debug, Clone)]
pub struct ScreenScope {
    unmounted: CancellationToken,
}

impl Default for ScreenScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenScope {
    /// A scope for a freshly mounted screen.
    #[must_use]
    pub fn new() -> Self {
        Self {
            unmounted: CancellationToken::new(),
        }
    }

    /// Marks the screen as gone. Pending results will be discarded.
    pub fn unmount(&self) {
        self.unmounted.cancel();
    }

    /// False once [`Self::unmount`] was called on this scope or a clone.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        !self.unmounted.is_cancelled()
    }

    /// Resolves when the screen is unmounted.
    pub async fn unmounted(&self) {
        self.unmounted.cancelled().await;
    }

    /// Runs `operation` on its own task and waits for it.
    ///
    /// Returns `None` when the screen was unmounted before the result arrived.
    pub async fn run<T, F>(&self, operation: F) -> Option<Result<T>>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let outcome = tokio::spawn(operation).await.unwrap_or_else(|e| {
            Err(Error::Task {
                message: e.to_string(),
            })
        });

        if self.is_mounted() {
            Some(outcome)
        } else {
            debug!("Screen unmounted, discarding result");
            None
        }
    }
}

/// The signed-in user as the screens see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Signed-in identity
    pub user: AuthUser,
    /// Stored profile, if sign-up wrote one
    pub profile: Option<User>,
}

impl Session {
    /// Reads the signed-in identity and its profile.
    pub async fn load(users: &UserRepository) -> Result<Self> {
        let user = users.current_user().await.ok_or(Error::NotSignedIn)?;
        let profile = users.get_profile(&user.email).await?;
        Ok(Self { user, profile })
    }

    /// Profile name, or the email when no profile exists.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.profile
            .as_ref()
            .map(User::display_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.user.email.clone())
    }
}
