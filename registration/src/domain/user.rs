//! Normalised user identity fields and the records exchanged with the store.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// Canonical username: trimmed and lower-cased.
///
/// ## Invariants
/// - Non-empty, no surrounding whitespace, no upper-case characters.
///
/// Length and character-set rules are policy decisions enforced by
/// [`crate::domain::ProfileValidator`]; a `Username` built with
/// [`Username::normalise`] is only guaranteed to be canonical, which is all
/// the uniqueness lookup needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct Username(String);

impl Username {
    /// Canonicalise raw input, returning `None` when it is blank.
    ///
    /// # Examples
    /// ```
    /// use registration::domain::Username;
    ///
    /// let name = Username::normalise("  Alice ").expect("non-blank");
    /// assert_eq!(name.as_ref(), "alice");
    /// assert!(Username::normalise("   ").is_none());
    /// ```
    #[must_use]
    pub fn normalise(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Canonical email address: trimmed and lower-cased.
///
/// ## Invariants
/// - Non-empty, no surrounding whitespace, no upper-case characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Canonicalise raw input, returning `None` when it is blank.
    ///
    /// Structural checks (an `@`, a dotted domain) belong to the validator;
    /// this only produces the comparison key.
    #[must_use]
    pub fn normalise(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Trimmed full name; blank input never produces a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct FullName(String);

/// Trimmed free-text biography; blank input never produces a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Bio(String);

macro_rules! trusted_text {
    ($name:ident) => {
        impl $name {
            /// Wrap text that has already passed validation or was read
            /// back from the store.
            pub(crate) fn from_trusted(value: impl Into<String>) -> Self {
                Self(value.into())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

trusted_text!(FullName);
trusted_text!(Bio);

/// Opaque password digest produced by a [`crate::domain::ports::PasswordHasher`].
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded digest, e.g. a PHC string.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// User record as stored by the external user-record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Store-assigned identifier.
    pub id: Uuid,
    /// Normalised username.
    pub username: Username,
    /// Normalised email address.
    pub email: EmailAddress,
    /// Optional display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<FullName>,
    /// Optional biography.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<Bio>,
}

/// Record handed to the store for insertion once validation and the
/// advisory uniqueness checks pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Normalised username; must not already be stored.
    pub username: Username,
    /// Normalised email; must not already be stored.
    pub email: EmailAddress,
    /// Optional display name.
    pub full_name: Option<FullName>,
    /// Optional biography.
    pub bio: Option<Bio>,
    /// Digest of the accepted password.
    pub password_hash: PasswordHash,
}

/// Field-level changes applied by [`crate::domain::ports::UserRecordStore::update_profile`].
///
/// `None` leaves a field untouched. For the optional columns `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    /// Replacement email.
    pub email: Option<EmailAddress>,
    /// Replacement or cleared display name.
    pub full_name: Option<Option<FullName>>,
    /// Replacement or cleared biography.
    pub bio: Option<Option<Bio>>,
    /// Digest of a replacement password.
    pub password_hash: Option<PasswordHash>,
}

impl ProfileChanges {
    /// Whether applying these changes would leave the record untouched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.full_name.is_none()
            && self.bio.is_none()
            && self.password_hash.is_none()
    }
}
