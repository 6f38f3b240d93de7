//! Domain primitives and services for user registration.
//!
//! Purpose: Validate candidate profiles, normalise the identifying fields, and
//! consult the user-record store for conflicts before a record is written.
//! Nothing in this module reaches a database or a transport directly; the
//! store and the password hasher are injected through [`ports`].
//!
//! Public surface:
//! - Error (alias of `DomainError`): transport-agnostic error payload.
//! - ProfileValidator / validate: pure field validation.
//! - check_unique / check_unique_email: advisory conflict lookups.
//! - RegistrationService: validate, check, hash, and insert in one call.

pub mod error;
pub mod policy;
pub mod ports;
pub mod profile;
pub mod registration;
pub mod uniqueness;
pub mod user;
pub mod validation;

pub use self::error::{DomainError, Error, ErrorCode, ErrorValidationError};
pub use self::policy::{CharacterClass, LengthBounds, PolicyError, ValidationPolicy};
pub use self::profile::{CandidateProfile, Password, ProfileUpdate};
pub use self::registration::{
    ProfileEditOutcome, RegistrationError, RegistrationOutcome, RegistrationService,
};
pub use self::uniqueness::{
    ConflictField, Uniqueness, UniquenessError, check_email_available_for, check_unique,
    check_unique_email,
};
pub use self::user::{
    Bio, EmailAddress, FullName, NewUserRecord, PasswordHash, ProfileChanges, UserRecord,
    Username,
};
pub use self::validation::{
    FieldName, FieldRejection, NormalizedProfile, ProfileValidator, RejectionReason, Rejections,
    ValidatedUpdate, ValidationResult, validate,
};
