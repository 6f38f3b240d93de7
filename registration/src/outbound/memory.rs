//! In-memory `UserRecordStore` guarded by a mutex.
//!
//! Both unique keys are checked and claimed under a single lock, so two
//! concurrent inserts of the same username cannot both succeed.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ConflictField;
use crate::domain::ports::{UserRecordStore, UserRecordStoreError};
use crate::domain::user::{
    EmailAddress, NewUserRecord, PasswordHash, ProfileChanges, UserRecord, Username,
};

#[derive(Default)]
struct StoreState {
    users: HashMap<Username, UserRecord>,
    emails: HashMap<EmailAddress, Username>,
    hashes: HashMap<Username, PasswordHash>,
}

/// Process-local user-record store.
#[derive(Default)]
pub struct InMemoryUserRecordStore {
    state: Mutex<StoreState>,
}

impl InMemoryUserRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    ///
    /// # Errors
    /// [`UserRecordStoreError::Connection`] when a writer panicked while
    /// holding the lock.
    pub fn len(&self) -> Result<usize, UserRecordStoreError> {
        Ok(self.lock()?.users.len())
    }

    /// Whether the store holds no records.
    ///
    /// # Errors
    /// As for [`Self::len`].
    pub fn is_empty(&self) -> Result<bool, UserRecordStoreError> {
        Ok(self.lock()?.users.is_empty())
    }

    /// Stored password digest for `username`, if any.
    ///
    /// # Errors
    /// As for [`Self::len`].
    pub fn password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<PasswordHash>, UserRecordStoreError> {
        Ok(self.lock()?.hashes.get(username).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, UserRecordStoreError> {
        self.state
            .lock()
            .map_err(|_| UserRecordStoreError::connection("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl UserRecordStore for InMemoryUserRecordStore {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserRecord>, UserRecordStoreError> {
        Ok(self.lock()?.users.get(username).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, UserRecordStoreError> {
        let state = self.lock()?;
        Ok(state
            .emails
            .get(email)
            .and_then(|owner| state.users.get(owner))
            .cloned())
    }

    async fn insert(&self, record: &NewUserRecord) -> Result<UserRecord, UserRecordStoreError> {
        let mut state = self.lock()?;
        if state.users.contains_key(&record.username) {
            return Err(UserRecordStoreError::duplicate_key(ConflictField::Username));
        }
        if state.emails.contains_key(&record.email) {
            return Err(UserRecordStoreError::duplicate_key(ConflictField::Email));
        }

        let stored = UserRecord {
            id: Uuid::new_v4(),
            username: record.username.clone(),
            email: record.email.clone(),
            full_name: record.full_name.clone(),
            bio: record.bio.clone(),
        };
        state
            .emails
            .insert(record.email.clone(), record.username.clone());
        state
            .hashes
            .insert(record.username.clone(), record.password_hash.clone());
        state.users.insert(record.username.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_profile(
        &self,
        username: &Username,
        changes: &ProfileChanges,
    ) -> Result<Option<UserRecord>, UserRecordStoreError> {
        let mut state = self.lock()?;
        let Some(current) = state.users.get(username).cloned() else {
            return Ok(None);
        };

        if let Some(email) = changes.email.as_ref() {
            if state.emails.get(email).is_some_and(|owner| owner != username) {
                return Err(UserRecordStoreError::duplicate_key(ConflictField::Email));
            }
        }

        let mut updated = current;
        if let Some(email) = changes.email.clone() {
            state.emails.remove(&updated.email);
            state.emails.insert(email.clone(), username.clone());
            updated.email = email;
        }
        if let Some(full_name) = changes.full_name.clone() {
            updated.full_name = full_name;
        }
        if let Some(bio) = changes.bio.clone() {
            updated.bio = bio;
        }
        if let Some(hash) = changes.password_hash.clone() {
            state.hashes.insert(username.clone(), hash);
        }
        state.users.insert(username.clone(), updated.clone());
        Ok(Some(updated))
    }
}
