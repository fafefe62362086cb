//! Core use-case services.
//!
//! # Responsibility
//! - Turn UI field events into validated store commits.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod edit_session;
