//! SQLite bootstrap behind `SqliteKeyValueStorage`.
//!
//! # Responsibility
//! - Open file or in-memory connections with the item table migrated.
//!
//! # Invariants
//! - Table layout version is tracked via `PRAGMA user_version`.
//! - No item is read or written before migrations succeed.
//! - Failures surface as `StorageError`, the single backend error type.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
