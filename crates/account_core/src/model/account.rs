//! Account domain model.
//!
//! # Responsibility
//! - Define the persisted account record and its tag/record-type parts.
//! - Provide the fresh-draft constructor used by the store on `create`.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused for another account.
//! - Committed records satisfy `record_type == Ldap <=> password.is_none()`.
//! - A freshly created record is a draft and may still have an empty login.

use serde::{Deserialize, Serialize};

/// Store-assigned account identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type AccountId = u64;

/// Single free-form tag attached to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub text: String,
}

impl Mark {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Authentication source for an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// Credentials checked locally; a password is stored.
    #[default]
    Local,
    /// Credentials checked against LDAP; no password is stored.
    Ldap,
}

impl RecordType {
    /// Stable lowercase label, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Ldap => "ldap",
        }
    }

    /// Parses the lowercase label produced by [`RecordType::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "local" => Some(Self::Local),
            "ldap" => Some(Self::Ldap),
            _ => None,
        }
    }

    /// Whether records of this type carry a password field.
    pub fn has_password(self) -> bool {
        matches!(self, Self::Local)
    }
}

/// Persisted account record.
///
/// Serialized with camelCase field names (`recordType`) to match the stored
/// JSON payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    /// Display/edit order is preserved across round-trips.
    pub marks: Vec<Mark>,
    pub record_type: RecordType,
    pub login: String,
    /// `None` iff `record_type == RecordType::Ldap` once committed.
    pub password: Option<String>,
}

impl Account {
    /// Creates the draft record handed out by `AccountStore::create`.
    ///
    /// # Invariants
    /// - `record_type` starts as `Local`.
    /// - `password` starts as `Some("")`, not `None`.
    /// - Login is empty, so the draft does not pass validation yet.
    pub fn draft(id: AccountId) -> Self {
        Self {
            id,
            marks: Vec::new(),
            record_type: RecordType::Local,
            login: String::new(),
            password: Some(String::new()),
        }
    }

    /// Whether the UI should render a password field for this record.
    pub fn password_visible(&self) -> bool {
        self.record_type.has_password()
    }
}

#[cfg(test)]
mod tests {
    use super::{Account, Mark, RecordType};

    #[test]
    fn draft_starts_local_with_empty_password() {
        let account = Account::draft(1);
        assert_eq!(account.id, 1);
        assert!(account.marks.is_empty());
        assert_eq!(account.record_type, RecordType::Local);
        assert_eq!(account.login, "");
        assert_eq!(account.password.as_deref(), Some(""));
        assert!(account.password_visible());
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let account = Account {
            id: 4,
            marks: vec![Mark::new("ops")],
            record_type: RecordType::Ldap,
            login: "jdoe".to_string(),
            password: None,
        };

        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 4,
                "marks": [{ "text": "ops" }],
                "recordType": "ldap",
                "login": "jdoe",
                "password": null,
            })
        );
    }

    #[test]
    fn record_type_labels_roundtrip() {
        for kind in [RecordType::Local, RecordType::Ldap] {
            assert_eq!(RecordType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(RecordType::parse("LDAP"), None);
    }
}
