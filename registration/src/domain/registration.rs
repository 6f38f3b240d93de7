//! Domain service orchestrating registration and profile edits.
//!
//! The service runs the field validator, the advisory uniqueness checks, and
//! the password hasher before handing a record to the store. Expected
//! outcomes (rejected fields, a taken username or email) come back as
//! [`RegistrationOutcome`] / [`ProfileEditOutcome`] values; only collaborator
//! failures are errors.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::error::Error;
use crate::domain::ports::{
    PasswordHasher, PasswordHasherError, UserRecordStore, UserRecordStoreError,
};
use crate::domain::profile::{CandidateProfile, ProfileUpdate};
use crate::domain::uniqueness::{
    ConflictField, Uniqueness, UniquenessError, check_email_available_for, check_unique,
    check_unique_email,
};
use crate::domain::user::{NewUserRecord, ProfileChanges, UserRecord, Username};
use crate::domain::validation::{ProfileValidator, Rejections, ValidationResult};

/// Collaborator failures raised while registering or editing a user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The user-record store could not be reached.
    #[error("user record store unavailable: {message}")]
    CollaboratorUnavailable {
        /// Adapter-supplied detail.
        message: String,
    },
    /// The user-record store answered with an error.
    #[error("user record store failed: {message}")]
    Store {
        /// Adapter-supplied detail.
        message: String,
    },
    /// The password hasher failed.
    #[error(transparent)]
    Hashing(#[from] PasswordHasherError),
    /// The user being edited does not exist.
    #[error("user {username} not found")]
    NotFound {
        /// Username as supplied, trimmed.
        username: String,
    },
}

impl From<UserRecordStoreError> for RegistrationError {
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

impl From<UniquenessError> for RegistrationError {
    fn from(error: UniquenessError) -> Self {
        match error {
            UniquenessError::CollaboratorUnavailable { message } => {
                Self::CollaboratorUnavailable { message }
            }
            UniquenessError::Store { message } => Self::Store { message },
            other @ UniquenessError::BlankKey { .. } => Self::Store {
                message: other.to_string(),
            },
        }
    }
}

impl From<RegistrationError> for Error {
    fn from(error: RegistrationError) -> Self {
        match error {
            RegistrationError::CollaboratorUnavailable { message } => {
                Self::service_unavailable(format!("user record store unavailable: {message}"))
            }
            RegistrationError::Store { message } => {
                Self::internal(format!("user record store error: {message}"))
            }
            RegistrationError::Hashing(err) => Self::internal(err.to_string()),
            RegistrationError::NotFound { username } => {
                Self::not_found(format!("User {username} not found."))
            }
        }
    }
}

impl From<&Rejections> for Error {
    fn from(rejections: &Rejections) -> Self {
        Self::invalid_request("Validation error").with_details(json!({
            "code": "validation_error",
            "fields": rejections.to_details(),
        }))
    }
}

impl From<ConflictField> for Error {
    fn from(field: ConflictField) -> Self {
        Self::conflict(format!("User with given {field} already exists.")).with_details(json!({
            "code": "duplicate",
            "field": field.as_str(),
        }))
    }
}

/// Outcome of [`RegistrationService::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The record was written.
    Registered(UserRecord),
    /// One or more fields failed validation.
    Rejected(Rejections),
    /// The username or email is already taken.
    Conflict(ConflictField),
}

impl RegistrationOutcome {
    /// Map the outcome onto a transport-agnostic result.
    ///
    /// # Errors
    /// An `invalid_request` or `conflict` [`Error`] for anything but
    /// [`RegistrationOutcome::Registered`].
    pub fn into_result(self) -> Result<UserRecord, Error> {
        match self {
            Self::Registered(record) => Ok(record),
            Self::Rejected(rejections) => Err(Error::from(&rejections)),
            Self::Conflict(field) => Err(Error::from(field)),
        }
    }
}

/// Outcome of [`RegistrationService::edit_profile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEditOutcome {
    /// The record now reflects the edit.
    Updated(UserRecord),
    /// One or more edited fields failed validation.
    Rejected(Rejections),
    /// The new email belongs to another user.
    Conflict(ConflictField),
}

impl ProfileEditOutcome {
    /// Map the outcome onto a transport-agnostic result.
    ///
    /// # Errors
    /// An `invalid_request` or `conflict` [`Error`] for anything but
    /// [`ProfileEditOutcome::Updated`].
    pub fn into_result(self) -> Result<UserRecord, Error> {
        match self {
            Self::Updated(record) => Ok(record),
            Self::Rejected(rejections) => Err(Error::from(&rejections)),
            Self::Conflict(field) => Err(Error::from(field)),
        }
    }
}

/// Registration service wired to a store and a password hasher.
pub struct RegistrationService<S, H> {
    store: Arc<S>,
    hasher: Arc<H>,
    validator: ProfileValidator,
}

impl<S, H> Clone for RegistrationService<S, H> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hasher: Arc::clone(&self.hasher),
            validator: self.validator.clone(),
        }
    }
}

impl<S, H> RegistrationService<S, H> {
    /// Create a new service with the given collaborators.
    #[must_use]
    pub const fn new(store: Arc<S>, hasher: Arc<H>, validator: ProfileValidator) -> Self {
        Self {
            store,
            hasher,
            validator,
        }
    }

    /// Validator used for incoming profiles.
    #[must_use]
    pub const fn validator(&self) -> &ProfileValidator {
        &self.validator
    }
}

impl<S, H> RegistrationService<S, H>
where
    S: UserRecordStore,
    H: PasswordHasher,
{
    /// Validate, check, hash, and insert a new user.
    ///
    /// A `DuplicateKey` from the store wins over an earlier `Unique` answer:
    /// a concurrent request may have claimed the key after the check ran.
    ///
    /// # Errors
    /// [`RegistrationError`] when the store or the hasher fails.
    pub async fn register(
        &self,
        candidate: &CandidateProfile,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let profile = match self.validator.validate(candidate) {
            ValidationResult::Accepted(profile) => profile,
            ValidationResult::Rejected(rejections) => {
                info!(fields = ?rejections.fields(), "registration rejected by validation");
                return Ok(RegistrationOutcome::Rejected(rejections));
            }
        };

        let store = self.store.as_ref();
        if let Uniqueness::Conflict(field) = check_unique(profile.username.as_ref(), store).await? {
            info!(%field, "registration conflicts with an existing user");
            return Ok(RegistrationOutcome::Conflict(field));
        }
        if let Uniqueness::Conflict(field) = check_unique_email(profile.email.as_ref(), store).await?
        {
            info!(%field, "registration conflicts with an existing user");
            return Ok(RegistrationOutcome::Conflict(field));
        }

        let password_hash = self.hasher.hash(&profile.password).await?;
        let record = NewUserRecord {
            username: profile.username,
            email: profile.email,
            full_name: profile.full_name,
            bio: profile.bio,
            password_hash,
        };

        match store.insert(&record).await {
            Ok(stored) => {
                info!(username = %stored.username, id = %stored.id, "user registered");
                Ok(RegistrationOutcome::Registered(stored))
            }
            Err(UserRecordStoreError::DuplicateKey { field }) => {
                warn!(%field, "store constraint rejected registration after uniqueness check");
                Ok(RegistrationOutcome::Conflict(field))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Validate and apply a partial profile edit for `username`.
    ///
    /// # Errors
    /// [`RegistrationError::NotFound`] when no such user exists, otherwise
    /// as for [`Self::register`].
    pub async fn edit_profile(
        &self,
        username: &str,
        update: &ProfileUpdate,
    ) -> Result<ProfileEditOutcome, RegistrationError> {
        let not_found = || RegistrationError::NotFound {
            username: username.trim().to_owned(),
        };
        let key = Username::normalise(username).ok_or_else(not_found)?;
        let store = self.store.as_ref();
        let existing = store.find_by_username(&key).await?.ok_or_else(not_found)?;

        let validated = match self.validator.validate_update(update, &existing.username) {
            ValidationResult::Accepted(validated) => validated,
            ValidationResult::Rejected(rejections) => {
                info!(fields = ?rejections.fields(), "profile edit rejected by validation");
                return Ok(ProfileEditOutcome::Rejected(rejections));
            }
        };

        if let Some(email) = validated.email.as_ref().filter(|email| **email != existing.email) {
            if let Uniqueness::Conflict(field) =
                check_email_available_for(email.as_ref(), &existing.username, store).await?
            {
                info!(%field, "profile edit conflicts with an existing user");
                return Ok(ProfileEditOutcome::Conflict(field));
            }
        }

        let password_hash = match validated.password.as_ref() {
            Some(password) => Some(self.hasher.hash(password).await?),
            None => None,
        };
        let changes = ProfileChanges {
            email: validated.email,
            full_name: validated.full_name,
            bio: validated.bio,
            password_hash,
        };
        if changes.is_empty() {
            return Ok(ProfileEditOutcome::Updated(existing));
        }

        match store.update_profile(&existing.username, &changes).await {
            Ok(Some(updated)) => {
                info!(username = %updated.username, "profile updated");
                Ok(ProfileEditOutcome::Updated(updated))
            }
            Ok(None) => Err(not_found()),
            Err(UserRecordStoreError::DuplicateKey { field }) => {
                warn!(%field, "store constraint rejected profile edit after uniqueness check");
                Ok(ProfileEditOutcome::Conflict(field))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests;
