//! SQLite-backed dataset cache
//!
//! - Schema migrations
//! - [`SqliteStore`], a [`crate::storage::KeyValueStore`] over a single table

pub mod schema;
pub mod store;

pub use store::SqliteStore;
