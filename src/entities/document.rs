//! Document entity - One JSON document inside a named collection.
//!
//! The pair (`collection`, `id`) is the document identity. The body is stored as
//! JSON so every collection shares a single table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored document model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Collection name (e.g., "attendance", "discussions")
    #[sea_orm(primary_key, auto_increment = false)]
    pub collection: String,
    /// Document id, either store-assigned (UUID) or caller-derived
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Document body
    pub data: Json,
    /// Last write time
    pub updated_at: DateTimeUtc,
}

/// Documents have no relations; cross-document links live inside the JSON bodies
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
