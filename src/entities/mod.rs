//! Entity module - Contains all SeaORM entity definitions for the database.
//! `documents` backs the schemaless document store, `accounts` backs authentication.
//! Each entity has a Model struct for data and an Entity struct for operations.

/// Login accounts
pub mod account;
/// JSON documents of every collection
pub mod document;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use document::{Column as DocumentColumn, Entity as Document, Model as DocumentModel};
