//! Repositories - translate domain operations into document store and auth calls.
//!
//! Repositories own no state beyond their collaborator handles and settings, and
//! are cheap to clone. Every operation validates its input, runs under the
//! configured timeout and returns [`Result`]; collaborator failures never escape
//! as panics.

/// Menu, attendance, feedback and discussions
pub mod mess;
/// Menu seeding from config
pub mod seed;
/// Sign-up, login and profiles
pub mod user;

pub use mess::MessRepository;
pub use seed::seed_menu;
pub use user::UserRepository;

use crate::{
    auth::normalize_email,
    errors::{Error, Result},
};
use std::{collections::HashSet, future::Future, sync::Arc, time::Duration};
use tracing::warn;

/// Behaviour shared by both repositories.
#[derive(Debug, Clone)]
pub struct RepositorySettings {
    /// Bound applied to every repository call
    pub timeout: Duration,
    admin_emails: Arc<HashSet<String>>,
}

impl RepositorySettings {
    /// Settings with the given timeout and admin emails (normalised).
    pub fn new(timeout: Duration, admin_emails: impl IntoIterator<Item = String>) -> Self {
        Self {
            timeout,
            admin_emails: Arc::new(
                admin_emails
                    .into_iter()
                    .map(|email| normalize_email(&email))
                    .collect(),
            ),
        }
    }

    /// Whether `email` is in the admin list, ignoring case.
    #[must_use]
    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails.contains(&normalize_email(email))
    }
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), Vec::new())
    }
}

/// Runs `operation` under `timeout`, logging failures.
pub(crate) async fn bounded<T, F>(name: &'static str, timeout: Duration, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result.inspect_err(|e| warn!("{} failed: {}", name, e)),
        Err(_) => {
            warn!("{} timed out after {:?}", name, timeout);
            Err(Error::Timeout {
                operation: name,
                timeout,
            })
        }
    }
}
