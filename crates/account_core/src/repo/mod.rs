//! Repository layer: the account store and its write contract.
//!
//! # Responsibility
//! - Own the authoritative account collection.
//! - Isolate serialization and storage details from the edit session.
//!
//! # Invariants
//! - Unknown ids on update/remove are reported as `Ok(false)`, not errors.
//! - Store writes never validate; validation belongs to callers.

pub mod account_store;
