//! Shared test utilities for `MessMate`.
//!
//! This module provides common helpers for setting up an in-memory database,
//! wiring repositories to it, and building records with sensible defaults.
#![allow(clippy::unwrap_used)]

use crate::{
    auth::{AccountAuth, AuthService, AuthUser},
    core::{MessRepository, RepositorySettings, UserRepository},
    errors::{Error, Result},
    models::{Discussion, DiscussionCategory, DiscussionFilter, Feedback, FeedbackCategory},
    store::{Document, DocumentStore, Mutation, Query, SeaOrmStore},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use serde_json::{Map, Value};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tracing_subscriber::EnvFilter;

/// Email configured as admin in [`setup_test_app`].
pub const ADMIN_EMAIL: &str = "warden@uni.edu";
/// Password used by every helper-created account.
pub const TEST_PASSWORD: &str = "password1";

/// Installs a test-writer subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// A single connection keeps every query on the same in-memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Repositories wired to one in-memory database.
pub struct TestApp {
    /// Store shared by both repositories
    pub store: SeaOrmStore,
    /// Auth shared by both repositories
    pub auth: AccountAuth,
    /// Mess repository under test
    pub mess: MessRepository,
    /// User repository under test
    pub users: UserRepository,
}

impl TestApp {
    /// Signs up a fresh account (which signs it in) and returns its identity.
    pub async fn sign_up(&self, email: &str) -> Result<AuthUser> {
        self.users
            .sign_up(email, TEST_PASSWORD, "Test", "User")
            .await?;
        self.auth.current_user().await.ok_or(Error::NotSignedIn)
    }

    /// Signs up the configured admin account.
    pub async fn sign_in_admin(&self) -> Result<AuthUser> {
        self.sign_up(ADMIN_EMAIL).await
    }
}

/// Sets up a complete test environment with [`ADMIN_EMAIL`] as the only admin.
pub async fn setup_test_app() -> Result<TestApp> {
    let db = setup_test_db().await?;
    let store = SeaOrmStore::new(db.clone());
    let auth = AccountAuth::new(db);
    let settings = RepositorySettings::new(Duration::from_secs(10), vec![ADMIN_EMAIL.to_string()]);

    let store_handle: Arc<dyn DocumentStore> = Arc::new(store.clone());
    let auth_handle: Arc<dyn AuthService> = Arc::new(auth.clone());
    Ok(TestApp {
        mess: MessRepository::new(
            Arc::clone(&store_handle),
            Arc::clone(&auth_handle),
            settings.clone(),
        ),
        users: UserRepository::new(store_handle, auth_handle, settings),
        store,
        auth,
    })
}

/// 2024-05-01, the date used across tests.
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

/// Feedback with the given rating and defaults for everything else.
///
/// # Defaults
/// * `title`: "Dinner was late"
/// * `category`: food quality
pub fn sample_feedback(user_id: &str, rating: u8) -> Feedback {
    Feedback::new(
        user_id,
        format!("{user_id}@uni.edu"),
        "Dinner was late",
        "Service started 30 minutes after the posted time",
        rating,
        FeedbackCategory::FoodQuality,
    )
}

/// Discussion by `user_id` with a fixed body.
pub fn sample_discussion(user_id: &str, category: DiscussionCategory, title: &str) -> Discussion {
    Discussion::new(
        user_id,
        format!("{user_id}@uni.edu"),
        "Test User",
        title,
        "Body text",
        category,
    )
}

/// Creates one general discussion and returns its id.
pub async fn create_test_discussion(app: &TestApp) -> Result<String> {
    app.mess
        .create_discussion(sample_discussion("u1", DiscussionCategory::General, "Thread"))
        .await?;
    let discussions = app.mess.get_discussions(DiscussionFilter::All).await?;
    Ok(discussions[0].id.clone())
}

/// A store whose calls never complete, for exercising timeouts.
pub struct StalledStore;

#[async_trait]
impl DocumentStore for StalledStore {
    async fn insert(&self, _collection: &str, _data: Value) -> Result<String> {
        std::future::pending().await
    }

    async fn upsert(&self, _collection: &str, _id: &str, _data: Value) -> Result<()> {
        std::future::pending().await
    }

    async fn get(&self, _collection: &str, _query: &Query) -> Result<Vec<Document>> {
        std::future::pending().await
    }

    async fn get_by_id(&self, _collection: &str, _id: &str) -> Result<Option<Document>> {
        std::future::pending().await
    }

    async fn update(&self, _collection: &str, _id: &str, _fields: Map<String, Value>) -> Result<()> {
        std::future::pending().await
    }

    async fn run_transaction(
        &self,
        _collection: &str,
        _id: &str,
        _mutation: Mutation,
    ) -> Result<Value> {
        std::future::pending().await
    }
}

/// A mess repository backed by [`StalledStore`] with the given timeout.
pub async fn stalled_repository(timeout: Duration) -> Result<MessRepository> {
    let auth = AccountAuth::new(setup_test_db().await?);
    Ok(MessRepository::new(
        Arc::new(StalledStore),
        Arc::new(auth),
        RepositorySettings::new(timeout, Vec::new()),
    ))
}

/// A [`SeaOrmStore`] whose upserts can be switched to fail.
pub struct FlakyStore {
    inner: SeaOrmStore,
    fail_upserts: AtomicBool,
}

impl FlakyStore {
    /// Makes every following upsert fail (or succeed again).
    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn insert(&self, collection: &str, data: Value) -> Result<String> {
        self.inner.insert(collection, data).await
    }

    async fn upsert(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(DbErr::Custom(format!("upsert of {collection}/{id} rejected")).into());
        }
        self.inner.upsert(collection, id, data).await
    }

    async fn get(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        self.inner.get(collection, query).await
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.inner.get_by_id(collection, id).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<()> {
        self.inner.update(collection, id, fields).await
    }

    async fn run_transaction(
        &self,
        collection: &str,
        id: &str,
        mutation: Mutation,
    ) -> Result<Value> {
        self.inner.run_transaction(collection, id, mutation).await
    }
}

/// A user repository over a [`FlakyStore`].
pub struct FlakyApp {
    /// Store whose upserts can be made to fail
    pub store: Arc<FlakyStore>,
    /// User repository over the flaky store
    pub users: UserRepository,
}

/// A user repository whose store can reject upserts.
pub async fn setup_flaky_app() -> Result<FlakyApp> {
    let db = setup_test_db().await?;
    let store = Arc::new(FlakyStore {
        inner: SeaOrmStore::new(db.clone()),
        fail_upserts: AtomicBool::new(false),
    });
    let users = UserRepository::new(
        Arc::clone(&store) as Arc<dyn DocumentStore>,
        Arc::new(AccountAuth::new(db)),
        RepositorySettings::default(),
    );
    Ok(FlakyApp { store, users })
}
