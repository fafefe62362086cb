//! Core domain logic for the account manager.
//! This crate is the single source of truth for account invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::account::{Account, AccountId, Mark, RecordType};
pub use model::marks::{format_marks, parse_marks};
pub use model::validation::{is_valid, validate, AccountValidationError};
pub use repo::account_store::{
    AccountRepository, AccountStore, AccountStoreOptions, RepoResult, StoreError, StoreResult,
    DEFAULT_STORAGE_KEY,
};
pub use service::edit_session::{
    CommitOutcome, DraftView, EditEvent, EditSession, EventOutcome, Field,
};
pub use storage::{
    KeyValueStorage, MemoryStorage, SqliteKeyValueStorage, StorageError, StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
