//! Per-account edit session.
//!
//! # Responsibility
//! - Hold a draft copy of one account while the UI edits it.
//! - Enforce the record-type/password rule on the draft immediately.
//! - Gate commits on validation and forward them to the repository.
//!
//! # Invariants
//! - Switching the draft to `ldap` clears the password synchronously.
//! - A rejected commit performs no repository call and keeps the draft.
//! - The account id never changes for the lifetime of a session.
//! - Only designated triggers (blur, record-type change) commit.

use crate::model::account::{Account, AccountId, RecordType};
use crate::model::marks::{format_marks, parse_marks};
use crate::model::validation::{validate, AccountValidationError};
use crate::repo::account_store::{AccountRepository, RepoResult};
use log::{debug, info};

/// Editable fields that emit blur events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Marks,
    RecordType,
    Login,
    Password,
}

/// UI event routed into a session by [`EditSession::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEvent {
    /// Marks buffer typed into.
    MarksChanged(String),
    /// Login input typed into.
    LoginChanged(String),
    /// Password input typed into.
    PasswordChanged(String),
    /// Record-type select `change` event. Commits.
    RecordTypeChanged(RecordType),
    /// A field lost focus. Commits.
    Blur(Field),
    /// Delete button pressed.
    DeleteClicked,
}

/// Result of a commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Candidate was valid and forwarded to the repository.
    Committed,
    /// Candidate failed validation; nothing was written.
    Rejected(AccountValidationError),
    /// Candidate was valid but the repository no longer holds the id.
    Missing,
}

/// Result of routing one [`EditEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Draft changed, no commit requested.
    Edited,
    /// A commit was attempted.
    Commit(CommitOutcome),
    /// Removal was requested; `true` when the repository removed a record.
    Deleted(bool),
}

/// Read-only projection of a session draft for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftView {
    pub marks_text: String,
    pub record_type: RecordType,
    pub login: String,
    pub password: Option<String>,
    pub password_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Draft {
    marks_text: String,
    record_type: RecordType,
    login: String,
    password: Option<String>,
}

impl Draft {
    fn from_account(account: &Account) -> Self {
        Self {
            marks_text: format_marks(&account.marks),
            record_type: account.record_type,
            login: account.login.clone(),
            password: account
                .password
                .clone()
                .filter(|_| account.record_type.has_password()),
        }
    }
}

/// Draft copy of one account plus its last committed state.
#[derive(Debug, Clone)]
pub struct EditSession {
    original: Account,
    draft: Draft,
}

impl EditSession {
    /// Starts editing from the last committed state of `account`.
    pub fn new(account: Account) -> Self {
        let draft = Draft::from_account(&account);
        Self {
            original: account,
            draft,
        }
    }

    pub fn id(&self) -> AccountId {
        self.original.id
    }

    /// Last committed account.
    pub fn original(&self) -> &Account {
        &self.original
    }

    pub fn marks_text(&self) -> &str {
        &self.draft.marks_text
    }

    pub fn record_type(&self) -> RecordType {
        self.draft.record_type
    }

    pub fn login(&self) -> &str {
        &self.draft.login
    }

    pub fn password(&self) -> Option<&str> {
        self.draft.password.as_deref()
    }

    pub fn password_visible(&self) -> bool {
        self.draft.record_type.has_password()
    }

    /// Stores raw buffer text; parsed only when committing.
    pub fn set_marks_text(&mut self, text: impl Into<String>) {
        self.draft.marks_text = text.into();
    }

    /// Changes the draft record type.
    ///
    /// Switching to `ldap` drops the password right away. Switching back to
    /// `local` leaves it empty until the user types one.
    pub fn set_record_type(&mut self, record_type: RecordType) {
        self.draft.record_type = record_type;
        if !record_type.has_password() {
            self.draft.password = None;
        }
    }

    pub fn set_login(&mut self, text: impl Into<String>) {
        self.draft.login = text.into();
    }

    /// Updates the draft password; ignored while the draft is `ldap`.
    pub fn set_password(&mut self, text: impl Into<String>) {
        if self.password_visible() {
            self.draft.password = Some(text.into());
        }
    }

    /// Builds the full account the next commit would write.
    ///
    /// `ldap` candidates never carry a password.
    pub fn candidate(&self) -> Account {
        Account {
            id: self.original.id,
            marks: parse_marks(&self.draft.marks_text),
            record_type: self.draft.record_type,
            login: self.draft.login.clone(),
            password: self
                .draft
                .password
                .clone()
                .filter(|_| self.draft.record_type.has_password()),
        }
    }

    /// Validates the draft and forwards it to `repo` when valid.
    ///
    /// # Contract
    /// - Valid: `repo.update_account(id, candidate)` is called once and the
    ///   candidate becomes the new `original`.
    /// - Invalid: no repository call; draft and `original` are untouched.
    /// - Unknown id in `repo`: `Missing`, `original` is untouched.
    ///
    /// # Errors
    /// - Propagates repository persistence failures. `original` is left
    ///   unchanged in that case.
    pub fn commit<R: AccountRepository + ?Sized>(
        &mut self,
        repo: &mut R,
    ) -> RepoResult<CommitOutcome> {
        let candidate = self.candidate();
        if let Err(reason) = validate(&candidate) {
            debug!(
                "event=account_commit module=edit_session status=rejected account_id={} reason={:?}",
                candidate.id, reason
            );
            return Ok(CommitOutcome::Rejected(reason));
        }

        if !repo.update_account(candidate.id, candidate.clone())? {
            info!(
                "event=account_commit module=edit_session status=skipped reason=not_found account_id={}",
                candidate.id
            );
            return Ok(CommitOutcome::Missing);
        }
        info!(
            "event=account_commit module=edit_session status=ok account_id={} record_type={} marks={}",
            candidate.id,
            candidate.record_type.as_str(),
            candidate.marks.len()
        );
        self.original = candidate;
        Ok(CommitOutcome::Committed)
    }

    /// Removes the account from `repo` without any validation gate.
    pub fn request_delete<R: AccountRepository + ?Sized>(&self, repo: &mut R) -> RepoResult<bool> {
        let removed = repo.remove_account(self.original.id)?;
        info!(
            "event=account_delete module=edit_session status=ok account_id={} removed={}",
            self.original.id, removed
        );
        Ok(removed)
    }

    /// Routes one UI event, committing only on blur or record-type change.
    pub fn handle<R: AccountRepository + ?Sized>(
        &mut self,
        event: EditEvent,
        repo: &mut R,
    ) -> RepoResult<EventOutcome> {
        match event {
            EditEvent::MarksChanged(text) => {
                self.set_marks_text(text);
                Ok(EventOutcome::Edited)
            }
            EditEvent::LoginChanged(text) => {
                self.set_login(text);
                Ok(EventOutcome::Edited)
            }
            EditEvent::PasswordChanged(text) => {
                self.set_password(text);
                Ok(EventOutcome::Edited)
            }
            EditEvent::RecordTypeChanged(record_type) => {
                self.set_record_type(record_type);
                self.commit(repo).map(EventOutcome::Commit)
            }
            EditEvent::Blur(_) => self.commit(repo).map(EventOutcome::Commit),
            EditEvent::DeleteClicked => self.request_delete(repo).map(EventOutcome::Deleted),
        }
    }

    /// Current draft projection for rendering.
    pub fn view(&self) -> DraftView {
        DraftView {
            marks_text: self.draft.marks_text.clone(),
            record_type: self.draft.record_type,
            login: self.draft.login.clone(),
            password: self.draft.password.clone(),
            password_visible: self.password_visible(),
        }
    }
}
