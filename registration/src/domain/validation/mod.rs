//! Field validation for candidate profiles and profile edits.
//!
//! Every field is checked on every call and all failures are collected, so a
//! caller can report the full list back to the user in one round trip.
//! Within a single field the rules run in a fixed order and only the first
//! failure is reported, which keeps each field to at most one entry.
//!
//! Validation is pure: no I/O, no shared state, and the same input always
//! yields the same [`ValidationResult`].

mod rules;

use std::fmt;

use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::policy::{CharacterClass, ValidationPolicy};
use crate::domain::profile::{CandidateProfile, Password, ProfileUpdate};
use crate::domain::user::{Bio, EmailAddress, FullName, Username};

/// Profile fields subject to validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    /// Requested username.
    Username,
    /// Requested or replacement password.
    Password,
    /// Contact email.
    Email,
    /// Optional display name.
    FullName,
    /// Optional biography.
    Bio,
}

impl FieldName {
    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::Email => "email",
            Self::FullName => "full_name",
            Self::Bio => "bio",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// Required value is missing or blank after trimming.
    Empty,
    /// Fewer characters than the policy minimum.
    TooShort {
        /// Policy minimum.
        min: usize,
    },
    /// More characters than the policy maximum.
    TooLong {
        /// Policy maximum.
        max: usize,
    },
    /// Contains characters outside the allowed set.
    InvalidCharacters,
    /// Password lacks one or more required character classes.
    MissingCharacterClasses {
        /// Required classes absent from the password, in reporting order.
        missing: Vec<CharacterClass>,
    },
    /// Password equals the username, ignoring case.
    MatchesUsername,
    /// Value is not structurally valid (e.g. an email without a domain).
    InvalidFormat,
    /// Free text contains control characters.
    ControlCharacters,
}

impl RejectionReason {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooShort { .. } => "too_short",
            Self::TooLong { .. } => "too_long",
            Self::InvalidCharacters => "invalid_characters",
            Self::MissingCharacterClasses { .. } => "missing_character_classes",
            Self::MatchesUsername => "matches_username",
            Self::InvalidFormat => "invalid_format",
            Self::ControlCharacters => "control_characters",
        }
    }

    fn message_for(&self, field: FieldName) -> String {
        match self {
            Self::Empty => format!("{field} must not be empty"),
            Self::TooShort { min } => format!("{field} must be at least {min} characters"),
            Self::TooLong { max } => format!("{field} must be at most {max} characters"),
            Self::InvalidCharacters => match field {
                FieldName::Username => format!(
                    "{field} may only contain letters, numbers, underscores, hyphens, or periods"
                ),
                _ => format!("{field} contains characters that are not allowed"),
            },
            Self::MissingCharacterClasses { missing } => {
                let names: Vec<_> = missing.iter().map(|class| class.as_str()).collect();
                format!("{field} must contain at least one {} character", names.join(", one "))
            }
            Self::MatchesUsername => format!("{field} must not match the username"),
            Self::InvalidFormat => format!("{field} is not a valid email address"),
            Self::ControlCharacters => format!("{field} must not contain control characters"),
        }
    }
}

/// One rejected field with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRejection {
    /// Field that failed.
    pub field: FieldName,
    /// First rule it failed.
    pub reason: RejectionReason,
}

impl FieldRejection {
    /// Human-readable explanation, e.g. "username must be at least 3 characters".
    #[must_use]
    pub fn message(&self) -> String {
        self.reason.message_for(self.field)
    }

    fn to_json(&self) -> Value {
        let mut value = json!({
            "field": self.field.as_str(),
            "code": self.reason.code(),
            "message": self.message(),
        });
        match &self.reason {
            RejectionReason::TooShort { min } => value["min"] = json!(min),
            RejectionReason::TooLong { max } => value["max"] = json!(max),
            RejectionReason::MissingCharacterClasses { missing } => {
                value["missing"] = json!(missing);
            }
            _ => {}
        }
        value
    }
}

impl fmt::Display for FieldRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Ordered, non-empty list of field rejections with at most one entry per
/// field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejections(Vec<FieldRejection>);

impl Rejections {
    /// Rejection recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: FieldName) -> Option<&RejectionReason> {
        self.0
            .iter()
            .find(|rejection| rejection.field == field)
            .map(|rejection| &rejection.reason)
    }

    /// Whether `field` was rejected.
    #[must_use]
    pub fn contains(&self, field: FieldName) -> bool {
        self.get(field).is_some()
    }

    /// Rejected field names in validation order.
    #[must_use]
    pub fn fields(&self) -> Vec<FieldName> {
        self.0.iter().map(|rejection| rejection.field).collect()
    }

    /// Iterate over the rejections in validation order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldRejection> {
        self.0.iter()
    }

    /// Number of rejected fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON array suitable for [`crate::domain::Error::with_details`].
    #[must_use]
    pub fn to_details(&self) -> Value {
        Value::Array(self.0.iter().map(FieldRejection::to_json).collect())
    }
}

impl Serialize for Rejections {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_details().serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a Rejections {
    type Item = &'a FieldRejection;
    type IntoIter = std::slice::Iter<'a, FieldRejection>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Outcome of validating a candidate profile or a profile edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult<T = NormalizedProfile> {
    /// Every field passed; carries the normalised value.
    Accepted(T),
    /// At least one field failed.
    Rejected(Rejections),
}

impl<T> ValidationResult<T> {
    /// Whether every field passed.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Rejections, when any field failed.
    #[must_use]
    pub const fn rejections(&self) -> Option<&Rejections> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(rejections) => Some(rejections),
        }
    }

    /// Convert into a `Result` for `?`-style callers.
    pub fn into_result(self) -> Result<T, Rejections> {
        match self {
            Self::Accepted(value) => Ok(value),
            Self::Rejected(rejections) => Err(rejections),
        }
    }
}

/// Profile that passed validation, with identifying fields canonicalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedProfile {
    /// Canonical username.
    pub username: Username,
    /// Accepted password, still plaintext.
    pub password: Password,
    /// Canonical email.
    pub email: EmailAddress,
    /// Trimmed display name; absent when blank.
    pub full_name: Option<FullName>,
    /// Trimmed biography; absent when blank.
    pub bio: Option<Bio>,
}

/// Profile edit that passed validation.
///
/// `full_name` and `bio` use `Some(None)` to mean "clear the stored value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedUpdate {
    /// Canonical replacement email.
    pub email: Option<EmailAddress>,
    /// Replacement display name, or `Some(None)` to clear it.
    pub full_name: Option<Option<FullName>>,
    /// Replacement biography, or `Some(None)` to clear it.
    pub bio: Option<Option<Bio>>,
    /// Accepted replacement password.
    pub password: Option<Password>,
}

impl ValidatedUpdate {
    /// Whether the edit changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.full_name.is_none()
            && self.bio.is_none()
            && self.password.is_none()
    }
}

/// Collects per-field outcomes while every rule runs.
#[derive(Default)]
struct RejectionCollector(Vec<FieldRejection>);

impl RejectionCollector {
    fn check<T>(&mut self, field: FieldName, outcome: Result<T, RejectionReason>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(reason) => {
                self.0.push(FieldRejection { field, reason });
                None
            }
        }
    }

    /// Run `rule` only when the field was supplied.
    fn check_present<T>(
        &mut self,
        field: FieldName,
        outcome: Option<Result<T, RejectionReason>>,
    ) -> Option<Option<T>> {
        match outcome {
            None => Some(None),
            Some(result) => self.check(field, result).map(Some),
        }
    }

    fn finish<T>(self, accepted: impl FnOnce() -> Option<T>) -> ValidationResult<T> {
        if self.0.is_empty() {
            if let Some(value) = accepted() {
                return ValidationResult::Accepted(value);
            }
        }
        ValidationResult::Rejected(Rejections(self.0))
    }
}

/// Validates candidate profiles against a [`ValidationPolicy`].
///
/// # Examples
/// ```
/// use registration::domain::{CandidateProfile, FieldName, ProfileValidator};
///
/// let validator = ProfileValidator::default();
/// let result = validator.validate(&CandidateProfile::new("al", "Password1!", "a@b.com"));
/// let rejections = result.rejections().expect("username too short");
/// assert_eq!(rejections.fields(), vec![FieldName::Username]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProfileValidator {
    policy: ValidationPolicy,
}

impl ProfileValidator {
    /// Create a validator enforcing `policy`.
    #[must_use]
    pub const fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    /// Policy this validator enforces.
    #[must_use]
    pub const fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Validate every field of a registration candidate.
    #[must_use]
    pub fn validate(&self, profile: &CandidateProfile) -> ValidationResult {
        let policy = &self.policy;
        let mut collector = RejectionCollector::default();

        let username = collector.check(
            FieldName::Username,
            rules::username(&profile.username, policy),
        );
        let password = collector.check(
            FieldName::Password,
            rules::password(&profile.password, Some(&profile.username), policy),
        );
        let email = collector.check(FieldName::Email, rules::email(&profile.email, policy));
        let full_name = collector.check(
            FieldName::FullName,
            rules::full_name(profile.full_name.as_deref(), policy),
        );
        let bio = collector.check(FieldName::Bio, rules::bio(profile.bio.as_deref(), policy));

        collector.finish(|| {
            Some(NormalizedProfile {
                username: username?,
                password: password?,
                email: email?,
                full_name: full_name?,
                bio: bio?,
            })
        })
    }

    /// Validate the fields present in a profile edit for `username`.
    #[must_use]
    pub fn validate_update(
        &self,
        update: &ProfileUpdate,
        username: &Username,
    ) -> ValidationResult<ValidatedUpdate> {
        let policy = &self.policy;
        let mut collector = RejectionCollector::default();

        let password = collector.check_present(
            FieldName::Password,
            update
                .password
                .as_ref()
                .map(|password| rules::password(password, Some(username.as_ref()), policy)),
        );
        let email = collector.check_present(
            FieldName::Email,
            update.email.as_deref().map(|email| rules::email(email, policy)),
        );
        let full_name = collector.check_present(
            FieldName::FullName,
            update
                .full_name
                .as_deref()
                .map(|full_name| rules::full_name(Some(full_name), policy)),
        );
        let bio = collector.check_present(
            FieldName::Bio,
            update.bio.as_deref().map(|bio| rules::bio(Some(bio), policy)),
        );

        collector.finish(|| {
            Some(ValidatedUpdate {
                email: email?,
                full_name: full_name?,
                bio: bio?,
                password: password?,
            })
        })
    }
}

/// Validate `profile` against the default policy.
#[must_use]
pub fn validate(profile: &CandidateProfile) -> ValidationResult {
    ProfileValidator::default().validate(profile)
}
