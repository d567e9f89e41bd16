//! Account entity - Authentication identities.
//!
//! Email is the login key. `uid` is the stable identity handed to the rest of the
//! app (stored as `userId` on attendance, feedback and discussions).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Login email, normalised to lowercase
    #[sea_orm(primary_key, auto_increment = false)]
    pub email: String,
    /// Generated user id (UUID v4)
    #[sea_orm(unique)]
    pub uid: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Accounts have no relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
