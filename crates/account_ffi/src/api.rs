//! FFI use-case API for UI-facing calls.
//!
//! # Responsibility
//! - Expose account list/create/edit/delete as synchronous calls.
//! - Own the single process-level store and its per-account edit sessions.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Only `accounts_open` replaces the active store; it drops all sessions.
//! - Typing events never persist; blur and record-type changes may.

use account_core::{
    core_version as core_version_inner, format_marks, init_logging as init_logging_inner,
    ping as ping_inner, Account, AccountId, AccountStore, CommitOutcome, DraftView, EditEvent,
    EditSession, EventOutcome, Field, RecordType, SqliteKeyValueStorage,
};
use log::{error, info};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

static WORKSPACE: Mutex<Option<AccountWorkspace>> = Mutex::new(None);

struct AccountWorkspace {
    store: AccountStore<SqliteKeyValueStorage>,
    sessions: HashMap<AccountId, EditSession>,
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Account projection rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountItem {
    pub account_id: AccountId,
    /// Marks joined with `"; "`.
    pub marks_text: String,
    /// `local|ldap`.
    pub record_type: String,
    pub login: String,
    /// `None` for `ldap` drafts.
    pub password: Option<String>,
    pub password_visible: bool,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountListResponse {
    pub ok: bool,
    /// Accounts in store order; drafts under edit are shown as drafts.
    pub items: Vec<AccountItem>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountActionResponse {
    pub ok: bool,
    pub account_id: Option<AccountId>,
    pub message: String,
}

impl AccountActionResponse {
    fn success(message: impl Into<String>, account_id: AccountId) -> Self {
        Self {
            ok: true,
            account_id: Some(account_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            account_id: None,
            message: message.into(),
        }
    }
}

/// Edit response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEditResponse {
    /// Whether the event was accepted. A rejected commit is still `ok`.
    pub ok: bool,
    /// Whether this event wrote the account to storage.
    pub committed: bool,
    /// Current draft after the event; `None` after delete or on failure.
    pub draft: Option<AccountItem>,
    pub message: String,
}

impl AccountEditResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            committed: false,
            draft: None,
            message: message.into(),
        }
    }
}

/// Opens the account database at `db_path` and loads the store.
///
/// # FFI contract
/// - Replaces any previously opened store and drops its edit sessions.
/// - Corrupt stored data is discarded, not reported as failure.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn accounts_open(db_path: String) -> String {
    let path = db_path.trim();
    if path.is_empty() {
        return "accounts_open failed: db_path cannot be empty".to_string();
    }

    let store = match SqliteKeyValueStorage::open(path)
        .map_err(account_core::StoreError::from)
        .and_then(AccountStore::open)
    {
        Ok(store) => store,
        Err(err) => {
            error!("event=accounts_open module=ffi status=error error={err}");
            return format!("accounts_open failed: {err}");
        }
    };

    info!(
        "event=accounts_open module=ffi status=ok count={}",
        store.len()
    );
    *lock_workspace() = Some(AccountWorkspace {
        store,
        sessions: HashMap::new(),
    });
    String::new()
}

/// Lists all accounts, using the live draft for accounts being edited.
#[flutter_rust_bridge::frb(sync)]
pub fn account_list() -> AccountListResponse {
    let guard = lock_workspace();
    let Some(workspace) = guard.as_ref() else {
        return AccountListResponse {
            ok: false,
            items: Vec::new(),
            message: not_open_message("account_list"),
        };
    };

    let items = workspace
        .store
        .accounts()
        .iter()
        .map(|account| match workspace.sessions.get(&account.id) {
            Some(session) => to_account_item(account.id, session.view()),
            None => account_to_item(account),
        })
        .collect::<Vec<_>>();
    let message = format!("{} account(s).", items.len());
    AccountListResponse {
        ok: true,
        items,
        message,
    }
}

/// Appends a new draft account.
#[flutter_rust_bridge::frb(sync)]
pub fn account_create() -> AccountActionResponse {
    with_workspace("account_create", |workspace| {
        workspace
            .store
            .create()
            .map(|account| AccountActionResponse::success("Account created.", account.id))
            .map_err(|err| err.to_string())
    })
    .unwrap_or_else(AccountActionResponse::failure)
}

/// Routes one UI event to the account's edit session.
///
/// Event names:
/// - `marks_input`, `login_input`, `password_input`: `value` is the text.
/// - `record_type_change`: `value` is `local|ldap`; commits.
/// - `blur`: `value` is `marks|login|password|record_type`; commits.
/// - `delete`: `value` is ignored; removes the account and ends the session.
///
/// # FFI contract
/// - Unknown events, values or ids return `ok=false` without side effects.
/// - A draft that fails validation returns `ok=true, committed=false` and
///   keeps the rejected input in `draft`.
#[flutter_rust_bridge::frb(sync)]
pub fn account_edit(account_id: AccountId, event: String, value: String) -> AccountEditResponse {
    let event = match parse_edit_event(event.as_str(), value) {
        Ok(event) => event,
        Err(message) => {
            return AccountEditResponse::failure(format!("account_edit failed: {message}"));
        }
    };

    with_workspace("account_edit", |workspace| {
        let AccountWorkspace { store, sessions } = workspace;
        let session = match sessions.entry(account_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let account = store
                    .get(account_id)
                    .cloned()
                    .ok_or_else(|| format!("account not found: {account_id}"))?;
                entry.insert(EditSession::new(account))
            }
        };

        let outcome = session.handle(event, store).map_err(|err| err.to_string())?;
        let draft = Some(to_account_item(account_id, session.view()));
        Ok(match outcome {
            EventOutcome::Edited => AccountEditResponse {
                ok: true,
                committed: false,
                draft,
                message: "Draft updated.".to_string(),
            },
            EventOutcome::Commit(CommitOutcome::Committed) => AccountEditResponse {
                ok: true,
                committed: true,
                draft,
                message: "Account saved.".to_string(),
            },
            EventOutcome::Commit(CommitOutcome::Rejected(reason)) => AccountEditResponse {
                ok: true,
                committed: false,
                draft,
                message: format!("Not saved: {reason}."),
            },
            EventOutcome::Commit(CommitOutcome::Missing) => {
                sessions.remove(&account_id);
                AccountEditResponse::failure(format!("account not found: {account_id}"))
            }
            EventOutcome::Deleted(removed) => {
                sessions.remove(&account_id);
                AccountEditResponse {
                    ok: true,
                    committed: false,
                    draft: None,
                    message: delete_message(removed).to_string(),
                }
            }
        })
    })
    .unwrap_or_else(AccountEditResponse::failure)
}

/// Deletes an account and its edit session; unknown ids are not an error.
#[flutter_rust_bridge::frb(sync)]
pub fn account_delete(account_id: AccountId) -> AccountActionResponse {
    with_workspace("account_delete", |workspace| {
        let removed = match workspace.sessions.remove(&account_id) {
            Some(session) => session.request_delete(&mut workspace.store),
            None => workspace.store.remove(account_id),
        }
        .map_err(|err| err.to_string())?;

        Ok(AccountActionResponse::success(delete_message(removed), account_id))
    })
    .unwrap_or_else(AccountActionResponse::failure)
}

fn parse_edit_event(event: &str, value: String) -> Result<EditEvent, String> {
    match event {
        "marks_input" => Ok(EditEvent::MarksChanged(value)),
        "login_input" => Ok(EditEvent::LoginChanged(value)),
        "password_input" => Ok(EditEvent::PasswordChanged(value)),
        "record_type_change" => RecordType::parse(value.as_str())
            .map(EditEvent::RecordTypeChanged)
            .ok_or_else(|| format!("unsupported record type `{value}`")),
        "delete" => Ok(EditEvent::DeleteClicked),
        "blur" => parse_field(value.as_str())
            .map(EditEvent::Blur)
            .ok_or_else(|| format!("unsupported field `{value}`")),
        other => Err(format!("unsupported event `{other}`")),
    }
}

fn delete_message(removed: bool) -> &'static str {
    if removed {
        "Account deleted."
    } else {
        "Account already absent."
    }
}

fn parse_field(value: &str) -> Option<Field> {
    match value {
        "marks" => Some(Field::Marks),
        "record_type" => Some(Field::RecordType),
        "login" => Some(Field::Login),
        "password" => Some(Field::Password),
        _ => None,
    }
}

fn with_workspace<T>(
    operation: &str,
    f: impl FnOnce(&mut AccountWorkspace) -> Result<T, String>,
) -> Result<T, String> {
    let mut guard = lock_workspace();
    let workspace = guard.as_mut().ok_or_else(|| not_open_message(operation))?;
    f(workspace).map_err(|err| format!("{operation} failed: {err}"))
}

fn lock_workspace() -> MutexGuard<'static, Option<AccountWorkspace>> {
    WORKSPACE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn not_open_message(operation: &str) -> String {
    format!("{operation} failed: accounts not opened; call accounts_open first")
}

fn account_to_item(account: &Account) -> AccountItem {
    AccountItem {
        account_id: account.id,
        marks_text: format_marks(&account.marks),
        record_type: account.record_type.as_str().to_string(),
        login: account.login.clone(),
        password: account.password.clone(),
        password_visible: account.password_visible(),
    }
}

fn to_account_item(account_id: AccountId, view: DraftView) -> AccountItem {
    AccountItem {
        account_id,
        marks_text: view.marks_text,
        record_type: view.record_type.as_str().to_string(),
        login: view.login,
        password: view.password,
        password_visible: view.password_visible,
    }
}
