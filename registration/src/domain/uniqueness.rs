//! Advisory uniqueness checks against the user-record store.
//!
//! Each check normalises its input, performs exactly one store lookup, and
//! reports whether a record already owns the key. The answer is early
//! feedback only: another request may insert the same key between the check
//! and the write, so the store's own constraint (surfaced as
//! [`UserRecordStoreError::DuplicateKey`]) remains the source of truth.
//!
//! A failed lookup is never read as "unique".

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::ports::{UserRecordStore, UserRecordStoreError};
use crate::domain::user::{EmailAddress, Username};

/// Unique key that an existing record already owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictField {
    /// The normalised username is taken.
    Username,
    /// The normalised email is taken.
    Email,
}

impl ConflictField {
    /// Wire name of the conflicting field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a uniqueness lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniqueness {
    /// No record owns the key at the time of the lookup.
    Unique,
    /// A record already owns the key.
    Conflict(ConflictField),
}

impl Uniqueness {
    /// Whether the lookup found no conflict.
    #[must_use]
    pub const fn is_unique(self) -> bool {
        matches!(self, Self::Unique)
    }
}

/// Failures that prevent a uniqueness answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UniquenessError {
    /// The key was blank; callers must validate before checking.
    #[error("{field} must not be blank when checking uniqueness")]
    BlankKey {
        /// Key that was blank.
        field: ConflictField,
    },
    /// The store could not be reached.
    #[error("user record store unavailable: {message}")]
    CollaboratorUnavailable {
        /// Adapter-supplied detail.
        message: String,
    },
    /// The store answered with an error.
    #[error("user record store lookup failed: {message}")]
    Store {
        /// Adapter-supplied detail.
        message: String,
    },
}

impl From<UserRecordStoreError> for UniquenessError {
    fn from(error: UserRecordStoreError) -> Self {
        match error {
            UserRecordStoreError::Connection { message } => {
                Self::CollaboratorUnavailable { message }
            }
            UserRecordStoreError::Query { message } => Self::Store { message },
            other @ UserRecordStoreError::DuplicateKey { .. } => Self::Store {
                message: other.to_string(),
            },
        }
    }
}

/// Check whether `username` is free, comparing case-insensitively.
///
/// # Examples
/// ```
/// use registration::domain::{Uniqueness, check_unique};
/// use registration::outbound::memory::InMemoryUserRecordStore;
///
/// # let runtime = tokio::runtime::Builder::new_current_thread().build().expect("runtime");
/// # runtime.block_on(async {
/// let store = InMemoryUserRecordStore::default();
/// let outcome = check_unique("bob", &store).await.expect("store reachable");
/// assert_eq!(outcome, Uniqueness::Unique);
/// # });
/// ```
///
/// # Errors
/// [`UniquenessError::BlankKey`] for blank input; otherwise the mapped store
/// failure.
pub async fn check_unique<S>(username: &str, store: &S) -> Result<Uniqueness, UniquenessError>
where
    S: UserRecordStore + ?Sized,
{
    let key = Username::normalise(username).ok_or(UniquenessError::BlankKey {
        field: ConflictField::Username,
    })?;
    let existing = store.find_by_username(&key).await?;
    debug!(username = %key, taken = existing.is_some(), "checked username uniqueness");
    Ok(match existing {
        Some(_) => Uniqueness::Conflict(ConflictField::Username),
        None => Uniqueness::Unique,
    })
}

/// Check whether `email` is free, comparing case-insensitively.
///
/// # Errors
/// As for [`check_unique`].
pub async fn check_unique_email<S>(email: &str, store: &S) -> Result<Uniqueness, UniquenessError>
where
    S: UserRecordStore + ?Sized,
{
    let key = EmailAddress::normalise(email).ok_or(UniquenessError::BlankKey {
        field: ConflictField::Email,
    })?;
    let existing = store.find_by_email(&key).await?;
    debug!(taken = existing.is_some(), "checked email uniqueness");
    Ok(match existing {
        Some(_) => Uniqueness::Conflict(ConflictField::Email),
        None => Uniqueness::Unique,
    })
}

/// Check whether `email` is free for `owner`: a record owned by `owner`
/// itself does not count as a conflict.
///
/// # Errors
/// As for [`check_unique`].
pub async fn check_email_available_for<S>(
    email: &str,
    owner: &Username,
    store: &S,
) -> Result<Uniqueness, UniquenessError>
where
    S: UserRecordStore + ?Sized,
{
    let key = EmailAddress::normalise(email).ok_or(UniquenessError::BlankKey {
        field: ConflictField::Email,
    })?;
    let existing = store.find_by_email(&key).await?;
    Ok(match existing {
        Some(record) if record.username != *owner => Uniqueness::Conflict(ConflictField::Email),
        _ => Uniqueness::Unique,
    })
}
