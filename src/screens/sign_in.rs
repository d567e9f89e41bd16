//! Sign-in / sign-up screen.
//!
//! Authentication progresses `Idle -> Pending -> Success | Error`. Transitions are
//! published on a watch channel; the screen only reports `Success` after the
//! awaited repository call has actually completed.

use super::ScreenScope;
use crate::core::UserRepository;
use tokio::sync::watch;
use tracing::{debug, info};

/// Which form the screen shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// Existing account
    #[default]
    SignIn,
    /// New account with a profile
    SignUp,
}

/// Progress of the last submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// A submit is in flight
    Pending,
    /// The last submit succeeded
    Success,
    /// Message to show inline under the form
    Error(String),
}

impl AuthState {
    /// Navigation away from the sign-in screen is allowed only in this state.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Sign-in / sign-up form.
#[derive(Debug)]
pub struct SignInScreen {
    users: UserRepository,
    scope: ScreenScope,
    state: watch::Sender<AuthState>,
    /// Sign in or sign up
    pub mode: AuthMode,
    /// Email field
    pub email: String,
    /// Password field
    pub password: String,
    /// Used only when signing up
    pub first_name: String,
    /// Used only when signing up
    pub last_name: String,
}

impl SignInScreen {
    /// An idle sign-in form.
    #[must_use]
    pub fn new(users: UserRepository) -> Self {
        let (state, _) = watch::channel(AuthState::Idle);
        Self {
            users,
            scope: ScreenScope::new(),
            state,
            mode: AuthMode::SignIn,
            email: String::new(),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    /// Receives every state transition, starting from the current state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Mount scope of this screen.
    #[must_use]
    pub const fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    /// Whether the submit button is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        let base = !self.email.trim().is_empty() && !self.password.is_empty();
        match self.mode {
            AuthMode::SignIn => base,
            AuthMode::SignUp => {
                base && !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
            }
        }
    }

    /// Runs sign-in or sign-up and waits for it to finish before settling the state.
    ///
    /// Returns the settled state. If the screen was unmounted meanwhile, the state is
    /// left untouched and the current one is returned.
    pub async fn submit(&self) -> AuthState {
        if matches!(self.state(), AuthState::Pending) {
            debug!("Submit ignored, request already pending");
            return AuthState::Pending;
        }
        if !self.can_submit() {
            let state = AuthState::Error("Please fill in every field".to_string());
            self.state.send_replace(state.clone());
            return state;
        }

        self.state.send_replace(AuthState::Pending);

        let users = self.users.clone();
        let mode = self.mode;
        let email = self.email.trim().to_string();
        let password = self.password.clone();
        let first_name = self.first_name.clone();
        let last_name = self.last_name.clone();
        let outcome = self
            .scope
            .run(async move {
                match mode {
                    AuthMode::SignIn => users.login(&email, &password).await,
                    AuthMode::SignUp => {
                        users
                            .sign_up(&email, &password, &first_name, &last_name)
                            .await
                    }
                }
            })
            .await;

        let Some(outcome) = outcome else {
            return self.state();
        };
        let next = match outcome {
            Ok(true) => {
                info!("Authentication succeeded for {}", self.email.trim());
                AuthState::Success
            }
            Ok(false) => AuthState::Error("Authentication did not complete".to_string()),
            Err(e) => AuthState::Error(e.to_string()),
        };
        self.state.send_replace(next.clone());
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::Result, test_utils::*};

    #[tokio::test]
    async fn test_sign_up_then_sign_in() -> Result<()> {
        let app = setup_test_app().await?;
        let mut screen = SignInScreen::new(app.users.clone());
        assert_eq!(screen.state(), AuthState::Idle);

        screen.mode = AuthMode::SignUp;
        screen.email = "asha@uni.edu".to_string();
        screen.password = "secret1".to_string();
        assert!(!screen.can_submit());
        screen.first_name = "Asha".to_string();
        screen.last_name = "Rao".to_string();
        assert!(screen.can_submit());

        assert!(screen.submit().await.is_success());
        assert!(app.users.get_profile("asha@uni.edu").await?.is_some());

        app.users.logout().await;
        let mut login = SignInScreen::new(app.users.clone());
        login.email = "asha@uni.edu".to_string();
        login.password = "secret1".to_string();
        assert_eq!(login.submit().await, AuthState::Success);
        Ok(())
    }

    #[tokio::test]
    async fn test_pending_is_published_before_success() -> Result<()> {
        let app = setup_test_app().await?;
        app.users
            .sign_up("asha@uni.edu", TEST_PASSWORD, "Asha", "Rao")
            .await?;

        let mut screen = SignInScreen::new(app.users.clone());
        screen.email = "asha@uni.edu".to_string();
        screen.password = TEST_PASSWORD.to_string();
        let mut rx = screen.subscribe();

        let (settled, observed) = tokio::join!(screen.submit(), async {
            let _ = rx.changed().await;
            rx.borrow_and_update().clone()
        });
        assert_eq!(observed, AuthState::Pending);
        assert_eq!(settled, AuthState::Success);
        assert_eq!(*rx.borrow(), AuthState::Success);
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_password_surfaces_error() -> Result<()> {
        let app = setup_test_app().await?;
        app.users
            .sign_up("asha@uni.edu", TEST_PASSWORD, "Asha", "Rao")
            .await?;

        let mut screen = SignInScreen::new(app.users.clone());
        screen.email = "asha@uni.edu".to_string();
        screen.password = "not-it".to_string();

        match screen.submit().await {
            AuthState::Error(message) => assert!(message.contains("asha@uni.edu")),
            other => panic!("expected error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_form_never_reaches_repository() -> Result<()> {
        let app = setup_test_app().await?;
        let screen = SignInScreen::new(app.users.clone());
        assert!(matches!(screen.submit().await, AuthState::Error(_)));
        assert!(app.users.current_user().await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_unmounted_screen_keeps_pending() -> Result<()> {
        let app = setup_test_app().await?;
        app.users
            .sign_up("asha@uni.edu", TEST_PASSWORD, "Asha", "Rao")
            .await?;
        app.users.logout().await;

        let mut screen = SignInScreen::new(app.users.clone());
        screen.email = "asha@uni.edu".to_string();
        screen.password = TEST_PASSWORD.to_string();
        screen.scope().unmount();

        assert_eq!(screen.submit().await, AuthState::Pending);
        // The login itself still went through
        assert!(app.users.current_user().await.is_some());
        Ok(())
    }
}
