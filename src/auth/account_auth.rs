//! Account-table authentication backend.

use super::{AuthService, AuthUser, normalize_email};
use crate::{
    entities::{Account, account},
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, SqlErr};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Email/password authentication persisted in the `accounts` table.
///
/// The signed-in user is process-local session state shared by every clone.
#[derive(Debug, Clone)]
pub struct AccountAuth {
    db: DatabaseConnection,
    current: Arc<RwLock<Option<AuthUser>>>,
}

impl AccountAuth {
    /// Authentication over `db`, with nobody signed in.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            current: Arc::new(RwLock::new(None)),
        }
    }

    async fn set_current(&self, user: AuthUser) -> AuthUser {
        *self.current.write().await = Some(user.clone());
        user
    }
}

/// Hashing is CPU-bound, so it runs on the blocking pool.
async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        use argon2::password_hash::SaltString;
        use argon2::password_hash::rand_core::OsRng;
        use argon2::{Argon2, PasswordHasher};
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::PasswordHash {
                message: e.to_string(),
            })
    })
    .await
    .map_err(|e| Error::Task {
        message: e.to_string(),
    })?
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        use argon2::{Argon2, PasswordHash, PasswordVerifier};
        let Ok(parsed) = PasswordHash::new(&hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .map_err(|e| Error::Task {
        message: e.to_string(),
    })
}

#[async_trait]
impl AuthService for AccountAuth {
    #[instrument(skip(self, password))]
    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser> {
        let email = normalize_email(email);
        if Account::find_by_id(email.clone()).one(&self.db).await?.is_some() {
            warn!("Sign-up rejected, account exists for {}", email);
            return Err(Error::AccountExists { email });
        }

        let password_hash = hash_password(password.to_string()).await?;
        let uid = Uuid::new_v4().to_string();
        let model = account::ActiveModel {
            email: Set(email.clone()),
            uid: Set(uid.clone()),
            password_hash: Set(password_hash),
            created_at: Set(chrono::Utc::now()),
        };
        model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            // Lost a race with a concurrent sign-up for the same email
            Some(SqlErr::UniqueConstraintViolation(_)) => Error::AccountExists {
                email: email.clone(),
            },
            _ => Error::from(e),
        })?;

        info!("Created account {} for {}", uid, email);
        Ok(self.set_current(AuthUser { uid, email }).await)
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let email = normalize_email(email);
        let Some(account) = Account::find_by_id(email.clone()).one(&self.db).await? else {
            warn!("Sign-in failed, unknown email {}", email);
            return Err(Error::InvalidCredentials { email });
        };

        if !verify_password(password.to_string(), account.password_hash).await? {
            warn!("Sign-in failed, wrong password for {}", email);
            return Err(Error::InvalidCredentials { email });
        }

        info!("Signed in {}", email);
        Ok(self
            .set_current(AuthUser {
                uid: account.uid,
                email: account.email,
            })
            .await)
    }

    async fn sign_out(&self) {
        if let Some(user) = self.current.write().await.take() {
            info!("Signed out {}", user.email);
        }
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.current.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_create_account_signs_in() -> Result<()> {
        let auth = AccountAuth::new(setup_test_db().await?);
        assert!(auth.current_user().await.is_none());

        let user = auth.create_account("Asha@Uni.edu", "secret1").await?;
        assert_eq!(user.email, "asha@uni.edu");
        assert_eq!(auth.current_user().await, Some(user));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_account_rejected() -> Result<()> {
        let auth = AccountAuth::new(setup_test_db().await?);
        auth.create_account("asha@uni.edu", "secret1").await?;
        let result = auth.create_account(" ASHA@uni.edu", "other12").await;
        assert!(matches!(result, Err(Error::AccountExists { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_in_checks_password() -> Result<()> {
        let auth = AccountAuth::new(setup_test_db().await?);
        let created = auth.create_account("asha@uni.edu", "secret1").await?;
        auth.sign_out().await;
        assert!(auth.current_user().await.is_none());

        let wrong = auth.sign_in("asha@uni.edu", "nope").await;
        assert!(matches!(wrong, Err(Error::InvalidCredentials { .. })));
        assert!(auth.current_user().await.is_none());

        let unknown = auth.sign_in("ravi@uni.edu", "secret1").await;
        assert!(matches!(unknown, Err(Error::InvalidCredentials { .. })));

        let signed_in = auth.sign_in("asha@uni.edu", "secret1").await?;
        assert_eq!(signed_in.uid, created.uid);
        assert_eq!(auth.current_user().await.unwrap().uid, created.uid);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sign_ups_for_one_email() -> Result<()> {
        let auth = AccountAuth::new(setup_test_db().await?);
        let (a, b) = tokio::join!(
            auth.create_account("asha@uni.edu", "secret1"),
            auth.create_account("asha@uni.edu", "secret2"),
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(Error::AccountExists { .. })))
        );
        Ok(())
    }
}
