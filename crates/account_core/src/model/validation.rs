//! Commit-time validation rules for account candidates.
//!
//! # Invariants
//! - Validation never panics and never touches storage.
//! - Rules are checked in order; the first failure is reported.

use crate::model::account::{Account, RecordType};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reason a candidate account was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountValidationError {
    /// `login` is empty or whitespace-only.
    EmptyLogin,
    /// `local` record without a non-blank password.
    EmptyPassword,
}

impl Display for AccountValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLogin => write!(f, "login must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty for local accounts"),
        }
    }
}

impl Error for AccountValidationError {}

/// Checks whether `candidate` may be persisted.
///
/// # Errors
/// - `EmptyLogin` when the trimmed login is empty.
/// - `EmptyPassword` when a `local` record has no password or a blank one.
///   `ldap` records skip the password rule.
pub fn validate(candidate: &Account) -> Result<(), AccountValidationError> {
    if candidate.login.trim().is_empty() {
        return Err(AccountValidationError::EmptyLogin);
    }

    if candidate.record_type == RecordType::Local {
        let has_password = candidate
            .password
            .as_deref()
            .is_some_and(|password| !password.trim().is_empty());
        if !has_password {
            return Err(AccountValidationError::EmptyPassword);
        }
    }

    Ok(())
}

/// Boolean form of [`validate`].
pub fn is_valid(candidate: &Account) -> bool {
    validate(candidate).is_ok()
}
