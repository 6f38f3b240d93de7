//! Port abstraction for the external user-record store and its errors.
//!
//! The store owns persistence and, crucially, the uniqueness constraints on
//! username and email. Lookups through this port feed the advisory
//! uniqueness checks; the `DuplicateKey` error from `insert` and
//! `update_profile` is the authoritative answer.

use async_trait::async_trait;

use crate::domain::uniqueness::ConflictField;
use crate::domain::user::{EmailAddress, NewUserRecord, ProfileChanges, UserRecord, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user-record store adapters.
    pub enum UserRecordStoreError {
        /// The store could not be reached.
        Connection {
            /// Adapter-supplied detail.
            message: String,
        } => "user record store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query {
            /// Adapter-supplied detail.
            message: String,
        } => "user record store query failed: {message}",
        /// A uniqueness constraint rejected the write.
        DuplicateKey {
            /// Unique key the write collided on.
            field: ConflictField,
        } => "user record store rejected duplicate {field}",
    }
}

/// Persistence port for user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRecordStore: Send + Sync {
    /// Fetch the record whose normalised username equals `username`.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserRecord>, UserRecordStoreError>;

    /// Fetch the record whose normalised email equals `email`.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, UserRecordStoreError>;

    /// Insert a new record.
    ///
    /// Adapters must enforce uniqueness of username and email atomically and
    /// report a violation as [`UserRecordStoreError::DuplicateKey`].
    async fn insert(&self, record: &NewUserRecord) -> Result<UserRecord, UserRecordStoreError>;

    /// Apply `changes` to the record owned by `username`, returning the
    /// updated record or `None` when no such user exists.
    async fn update_profile(
        &self,
        username: &Username,
        changes: &ProfileChanges,
    ) -> Result<Option<UserRecord>, UserRecordStoreError>;
}
