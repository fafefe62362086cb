//! Account domain model, mark codec and validation rules.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep buffer parsing and commit rules pure and storage-agnostic.
//!
//! # Invariants
//! - Every account is identified by a store-assigned `AccountId`.
//! - Nothing in this module performs I/O.

pub mod account;
pub mod marks;
pub mod validation;
