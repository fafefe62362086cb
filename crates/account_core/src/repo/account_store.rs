//! Account store: authoritative collection with persistence sync.
//!
//! # Responsibility
//! - Own the ordered account collection and id assignment.
//! - Mirror the full collection to key-value storage after every mutation.
//! - Recover the id counter (or discard corrupt data) when opening.
//!
//! # Invariants
//! - Ids are unique and never reused; `counter >= max(id)` at all times,
//!   including right after a restore.
//! - Every successful mutation writes the whole collection as one JSON array
//!   under the storage key; no-op calls write nothing.
//! - The store performs no validation; callers gate commits.

use crate::model::account::{Account, AccountId};
use crate::storage::{KeyValueStorage, StorageError};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "accounts";

pub type StoreResult<T> = Result<T, StoreError>;
pub type RepoResult<T> = StoreResult<T>;

/// Failure while persisting or loading the account collection.
#[derive(Debug)]
pub enum StoreError {
    Storage(StorageError),
    Serialize(serde_json::Error),
    /// The counter already holds the largest representable id.
    IdSpaceExhausted { last_id: AccountId },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize accounts: {err}"),
            Self::IdSpaceExhausted { last_id } => {
                write!(f, "no account id left after {last_id}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::IdSpaceExhausted { .. } => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Write-side contract the edit session commits through.
///
/// Both methods return `Ok(false)` for unknown ids instead of failing.
pub trait AccountRepository {
    fn update_account(&mut self, id: AccountId, account: Account) -> RepoResult<bool>;
    fn remove_account(&mut self, id: AccountId) -> RepoResult<bool>;
}

/// Open-time options for [`AccountStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountStoreOptions {
    /// Storage key holding the serialized collection.
    pub storage_key: String,
}

impl Default for AccountStoreOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// In-memory account collection synchronized to `S`.
pub struct AccountStore<S: KeyValueStorage> {
    storage: S,
    storage_key: String,
    accounts: Vec<Account>,
    counter: AccountId,
}

impl<S: KeyValueStorage> AccountStore<S> {
    /// Opens the store with the default storage key.
    ///
    /// See [`AccountStore::open_with_options`].
    pub fn open(storage: S) -> StoreResult<Self> {
        Self::open_with_options(storage, AccountStoreOptions::default())
    }

    /// Opens the store and restores previously persisted accounts.
    ///
    /// # Contract
    /// - Missing or empty value: empty collection, counter `0`.
    /// - Value parses as an account array: adopted as-is, counter set to the
    ///   highest restored id (`0` when the array is empty).
    /// - Malformed value: logged at `warn`, removed from storage, empty
    ///   collection.
    ///
    /// # Errors
    /// - Returns `StoreError::Storage` when the backend read or the cleanup
    ///   delete fails. Malformed data alone is never an error.
    pub fn open_with_options(storage: S, options: AccountStoreOptions) -> StoreResult<Self> {
        let mut store = Self {
            storage,
            storage_key: options.storage_key,
            accounts: Vec::new(),
            counter: 0,
        };
        store.load()?;
        Ok(store)
    }

    fn load(&mut self) -> StoreResult<()> {
        let raw = match self.storage.get_item(&self.storage_key)? {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                debug!("event=accounts_load module=store status=ok source=empty");
                return Ok(());
            }
        };

        match serde_json::from_str::<Vec<Account>>(&raw) {
            Ok(accounts) => {
                self.counter = accounts.iter().map(|account| account.id).max().unwrap_or(0);
                let duplicates = duplicate_ids(&accounts);
                if !duplicates.is_empty() {
                    warn!(
                        "event=accounts_load module=store status=duplicate_ids key={} ids={:?}",
                        self.storage_key, duplicates
                    );
                }
                self.accounts = accounts;
                info!(
                    "event=accounts_load module=store status=ok count={} counter={}",
                    self.accounts.len(),
                    self.counter
                );
            }
            Err(err) => {
                warn!(
                    "event=accounts_load module=store status=discarded key={} error={}",
                    self.storage_key, err
                );
                self.storage.remove_item(&self.storage_key)?;
            }
        }

        Ok(())
    }

    /// Appends a fresh draft account and persists the collection.
    ///
    /// # Contract
    /// - The new id is `previous counter + 1`.
    /// - The record is `Account::draft(id)`: local, empty login, `Some("")`
    ///   password, no marks.
    ///
    /// # Errors
    /// - `IdSpaceExhausted` when the counter is at `AccountId::MAX`; nothing
    ///   is appended or written.
    pub fn create(&mut self) -> StoreResult<Account> {
        let Some(id) = self.counter.checked_add(1) else {
            warn!(
                "event=account_create module=store status=error error_code=id_space_exhausted last_id={}",
                self.counter
            );
            return Err(StoreError::IdSpaceExhausted {
                last_id: self.counter,
            });
        };
        self.counter = id;
        let account = Account::draft(id);
        self.accounts.push(account.clone());
        info!(
            "event=account_create module=store status=ok account_id={}",
            account.id
        );
        self.persist()?;
        Ok(account)
    }

    /// Replaces the account with `id` in place.
    ///
    /// The stored record always keeps `id`, whatever `account.id` says.
    /// Returns `Ok(false)` without writing when `id` is unknown.
    pub fn update(&mut self, id: AccountId, mut account: Account) -> StoreResult<bool> {
        let Some(slot) = self.accounts.iter_mut().find(|existing| existing.id == id) else {
            debug!("event=account_update module=store status=skipped reason=not_found account_id={id}");
            return Ok(false);
        };

        account.id = id;
        *slot = account;
        info!("event=account_update module=store status=ok account_id={id}");
        self.persist()?;
        Ok(true)
    }

    /// Removes the first account with `id`.
    ///
    /// Returns `Ok(false)` without writing when `id` is unknown.
    pub fn remove(&mut self, id: AccountId) -> StoreResult<bool> {
        let Some(index) = self.accounts.iter().position(|account| account.id == id) else {
            debug!("event=account_remove module=store status=skipped reason=not_found account_id={id}");
            return Ok(false);
        };

        self.accounts.remove(index);
        info!("event=account_remove module=store status=ok account_id={id}");
        self.persist()?;
        Ok(true)
    }

    /// Accounts in insertion order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Id the next `create` call will assign; `None` once ids are exhausted.
    pub fn next_id(&self) -> Option<AccountId> {
        self.counter.checked_add(1)
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) -> StoreResult<()> {
        let payload = serde_json::to_string(&self.accounts)?;
        self.storage.set_item(&self.storage_key, &payload)?;
        debug!(
            "event=accounts_persist module=store status=ok count={} bytes={}",
            self.accounts.len(),
            payload.len()
        );
        Ok(())
    }
}

/// Ids that occur more than once, in first-repeat order.
fn duplicate_ids(accounts: &[Account]) -> Vec<AccountId> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for account in accounts {
        if !seen.insert(account.id) && !duplicates.contains(&account.id) {
            duplicates.push(account.id);
        }
    }
    duplicates
}

impl<S: KeyValueStorage> AccountRepository for AccountStore<S> {
    fn update_account(&mut self, id: AccountId, account: Account) -> RepoResult<bool> {
        self.update(id, account)
    }

    fn remove_account(&mut self, id: AccountId) -> RepoResult<bool> {
        self.remove(id)
    }
}
