//! Authentication seam.
//!
//! [`AuthService`] is the capability set repositories need: create an account,
//! sign in, sign out and ask who is signed in. [`AccountAuth`] implements it over
//! the `accounts` table with argon2 password hashes.

/// Argon2 accounts stored through `SeaORM`
pub mod account_auth;

pub use account_auth::AccountAuth;

use crate::errors::Result;
use async_trait::async_trait;

/// Identity of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Stable user id, stored as `userId` on records
    pub uid: String,
    /// Normalised login email
    pub email: String,
}

/// Identity operations the repositories depend on.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a new identity and signs it in.
    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Checks the password and makes the account the signed-in user.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Clears the signed-in user.
    async fn sign_out(&self);

    /// The signed-in user, if any.
    async fn current_user(&self) -> Option<AuthUser>;
}

/// Emails are matched case-insensitively and without surrounding whitespace.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
