//! User repository - sign-up, login and profile documents.
//!
//! Sign-up creates the auth identity and then writes the profile to
//! `users/<email>`. Both steps must succeed for sign-up to report success.

use super::{RepositorySettings, bounded};
use crate::{
    auth::{AuthService, AuthUser, normalize_email},
    errors::{Error, Result},
    models::{Record, User},
    store::DocumentStore,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Account and profile operations.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthService>,
    settings: RepositorySettings,
}

impl std::fmt::Debug for UserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRepository")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl UserRepository {
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

    /// Creates the account, signs it in and persists the profile.
    ///
    /// On failure nobody is left signed in under this email. Calling again with
    /// the same password completes a sign-up whose profile write failed.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<bool> {
        let profile = User::new(first_name.trim(), last_name.trim(), normalize_email(email));
        profile.validate()?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::validation(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }

        let result = bounded("sign_up", self.settings.timeout, async {
            let user = match self.auth.create_account(&profile.email, password).await {
                Ok(user) => user,
                Err(Error::AccountExists { email }) => self.resume_sign_up(email, password).await?,
                Err(e) => return Err(e),
            };
            let written = match serde_json::to_value(&profile) {
                Ok(body) => self.store.upsert(User::COLLECTION, &profile.email, body).await,
                Err(e) => Err(e.into()),
            };
            if let Err(e) = written {
                self.auth.sign_out().await;
                return Err(e);
            }
            info!("Signed up {} ({})", user.email, user.uid);
            Ok(true)
        })
        .await;

        // A timeout can land between the account and profile writes
        if matches!(result, Err(Error::Timeout { .. })) {
            self.sign_out_if(&profile.email).await;
        }
        result
    }

    /// An account without a profile is a sign-up whose profile write never
    /// landed. The same password picks it up again; anything else is a duplicate.
    async fn resume_sign_up(&self, email: String, password: &str) -> Result<AuthUser> {
        if self.store.get_by_id(User::COLLECTION, &email).await?.is_some() {
            return Err(Error::AccountExists { email });
        }
        match self.auth.sign_in(&email, password).await {
            Ok(user) => {
                warn!("Resuming sign-up for {} with no stored profile", email);
                Ok(user)
            }
            Err(Error::InvalidCredentials { .. }) => Err(Error::AccountExists { email }),
            Err(e) => Err(e),
        }
    }

    async fn sign_out_if(&self, email: &str) {
        let signed_in = self
            .auth
            .current_user()
            .await
            .is_some_and(|user| user.email == email);
        if signed_in {
            self.auth.sign_out().await;
        }
    }

    /// Authenticates only; the profile is read separately with [`Self::get_profile`].
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<bool> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::validation("credentials", "email and password are required"));
        }
        bounded("login", self.settings.timeout, async {
            self.auth.sign_in(email, password).await?;
            Ok(true)
        })
        .await
    }

    /// Profile stored at sign-up, if any.
    #[instrument(skip(self))]
    pub async fn get_profile(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        bounded("get_profile", self.settings.timeout, async {
            self.store
                .get_by_id(User::COLLECTION, &email)
                .await?
                .map(|doc| doc.into_record::<User>())
                .transpose()
        })
        .await
    }

    /// Signs the current user out.
    pub async fn logout(&self) {
        self.auth.sign_out().await;
    }

    /// Identity of the signed-in user, if any.
    pub async fn current_user(&self) -> Option<AuthUser> {
        self.auth.current_user().await
    }
}
