//! User profile documents, keyed by email.

use super::require_text;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// Profile written at sign-up under `users/<email>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Normalised email, also the document id
    pub email: String,
}

impl User {
    /// Builds a profile without validating it.
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// "First Last", used as the author name on discussions.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Requires both names and a plausible email.
    pub fn validate(&self) -> Result<()> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        validate_email(&self.email)
    }
}

/// Minimal shape check: something before and after a single `@`.
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(Error::validation("email", format!("'{email}' is not an email address"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(User::new("Asha", "Rao", "asha@uni.edu").display_name(), "Asha Rao");
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("asha@uni.edu").is_ok());
        assert!(validate_email("asha").is_err());
        assert!(validate_email("@uni.edu").is_err());
        assert!(validate_email("a@b@c").is_err());
    }
}
