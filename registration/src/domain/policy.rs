//! Validation policy: the length bounds and character-class requirements the
//! field validator enforces.
//!
//! The numbers are a product decision rather than a protocol constant, so
//! they live in one value that configuration can override. The defaults are
//! exposed as constants for callers that want to quote them in UI copy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum username length, counted in characters after trimming.
pub const USERNAME_MIN: usize = 3;
/// Maximum username length, counted in characters after trimming.
pub const USERNAME_MAX: usize = 30;
/// Minimum password length.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length; bounds the work done by the password hasher.
pub const PASSWORD_MAX: usize = 128;
/// Maximum email length (RFC 5321 forward-path limit).
pub const EMAIL_MAX: usize = 254;
/// Maximum full name length.
pub const FULL_NAME_MAX: usize = 100;
/// Maximum bio length.
pub const BIO_MAX: usize = 500;

/// Errors raised when a policy is assembled from inconsistent values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A minimum length of zero would accept blank values.
    #[error("{field} minimum length must be at least 1")]
    ZeroMinimum {
        /// Field whose bounds were rejected.
        field: &'static str,
    },
    /// The minimum exceeds the maximum.
    #[error("{field} minimum length {min} exceeds maximum {max}")]
    InvertedBounds {
        /// Field whose bounds were rejected.
        field: &'static str,
        /// Configured minimum.
        min: usize,
        /// Configured maximum.
        max: usize,
    },
    /// A maximum of zero would reject every value.
    #[error("{field} maximum length must be at least 1")]
    ZeroMaximum {
        /// Field whose maximum was rejected.
        field: &'static str,
    },
    /// An unknown password character class name was supplied.
    #[error("unknown password character class: {name}")]
    UnknownCharacterClass {
        /// The unrecognised name, trimmed.
        name: String,
    },
}

/// Inclusive character-count bounds.
///
/// ## Invariants
/// - `1 <= min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LengthBounds {
    min: usize,
    max: usize,
}

impl LengthBounds {
    /// Validate and construct bounds for the named field.
    ///
    /// # Examples
    /// ```
    /// use registration::domain::LengthBounds;
    ///
    /// let bounds = LengthBounds::new("username", 3, 30).expect("valid bounds");
    /// assert_eq!(bounds.min(), 3);
    /// assert!(LengthBounds::new("username", 5, 4).is_err());
    /// ```
    pub const fn new(field: &'static str, min: usize, max: usize) -> Result<Self, PolicyError> {
        if min == 0 {
            return Err(PolicyError::ZeroMinimum { field });
        }
        if min > max {
            return Err(PolicyError::InvertedBounds { field, min, max });
        }
        Ok(Self { min, max })
    }

    /// Smallest accepted length.
    #[must_use]
    pub const fn min(self) -> usize {
        self.min
    }

    /// Largest accepted length.
    #[must_use]
    pub const fn max(self) -> usize {
        self.max
    }
}

/// Character classes a password may be required to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    /// `A`–`Z` and other upper-case letters.
    Uppercase,
    /// `a`–`z` and other lower-case letters.
    Lowercase,
    /// Decimal digits.
    Digit,
    /// Anything printable that is neither alphanumeric nor whitespace.
    Symbol,
}

impl CharacterClass {
    /// Every class, in reporting order.
    pub const ALL: [Self; 4] = [Self::Uppercase, Self::Lowercase, Self::Digit, Self::Symbol];

    /// Whether `ch` belongs to this class.
    #[must_use]
    pub fn matches(self, ch: char) -> bool {
        match self {
            Self::Uppercase => ch.is_uppercase(),
            Self::Lowercase => ch.is_lowercase(),
            Self::Digit => ch.is_ascii_digit(),
            Self::Symbol => !ch.is_alphanumeric() && !ch.is_whitespace() && !ch.is_control(),
        }
    }

    /// Stable identifier used in configuration and error details.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Digit => "digit",
            Self::Symbol => "symbol",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacterClass {
    type Err = PolicyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "upper" | "uppercase" => Ok(Self::Uppercase),
            "lower" | "lowercase" => Ok(Self::Lowercase),
            "digit" | "number" => Ok(Self::Digit),
            "symbol" | "special" => Ok(Self::Symbol),
            _ => Err(PolicyError::UnknownCharacterClass {
                name: raw.trim().to_owned(),
            }),
        }
    }
}

/// Parse character class names, e.g. `["upper", "lower,digit"]`.
///
/// Each entry may itself be a comma-separated list and blank entries are
/// skipped, so `[""]` yields no classes. Duplicates collapse; order follows
/// [`CharacterClass::ALL`].
pub fn parse_character_classes<I, S>(names: I) -> Result<Vec<CharacterClass>, PolicyError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = Vec::new();
    for entry in names {
        for part in entry.as_ref().split(',').filter(|part| !part.trim().is_empty()) {
            parsed.push(part.parse::<CharacterClass>()?);
        }
    }
    parsed.sort_unstable();
    parsed.dedup();
    Ok(parsed)
}

/// Rules applied by [`crate::domain::ProfileValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationPolicy {
    username: LengthBounds,
    password: LengthBounds,
    required_classes: Vec<CharacterClass>,
    email_max: usize,
    full_name_max: usize,
    bio_max: usize,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            username: LengthBounds {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            },
            password: LengthBounds {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            },
            required_classes: CharacterClass::ALL.to_vec(),
            email_max: EMAIL_MAX,
            full_name_max: FULL_NAME_MAX,
            bio_max: BIO_MAX,
        }
    }
}

impl ValidationPolicy {
    /// Replace the username bounds.
    #[must_use]
    pub fn with_username_length(mut self, bounds: LengthBounds) -> Self {
        self.username = bounds;
        self
    }

    /// Replace the password bounds.
    #[must_use]
    pub fn with_password_length(mut self, bounds: LengthBounds) -> Self {
        self.password = bounds;
        self
    }

    /// Replace the set of character classes every password must contain.
    #[must_use]
    pub fn with_required_classes(mut self, classes: impl IntoIterator<Item = CharacterClass>) -> Self {
        let mut required: Vec<_> = classes.into_iter().collect();
        required.sort_unstable();
        required.dedup();
        self.required_classes = required;
        self
    }

    /// Replace the maximum lengths of the free-text fields.
    pub fn with_text_limits(
        mut self,
        email_max: usize,
        full_name_max: usize,
        bio_max: usize,
    ) -> Result<Self, PolicyError> {
        for (field, max) in [
            ("email", email_max),
            ("full_name", full_name_max),
            ("bio", bio_max),
        ] {
            if max == 0 {
                return Err(PolicyError::ZeroMaximum { field });
            }
        }
        self.email_max = email_max;
        self.full_name_max = full_name_max;
        self.bio_max = bio_max;
        Ok(self)
    }

    /// Username length bounds.
    #[must_use]
    pub const fn username(&self) -> LengthBounds {
        self.username
    }

    /// Password length bounds.
    #[must_use]
    pub const fn password(&self) -> LengthBounds {
        self.password
    }

    /// Character classes every password must contain.
    #[must_use]
    pub fn required_classes(&self) -> &[CharacterClass] {
        &self.required_classes
    }

    /// Maximum email length.
    #[must_use]
    pub const fn email_max(&self) -> usize {
        self.email_max
    }

    /// Maximum full name length.
    #[must_use]
    pub const fn full_name_max(&self) -> usize {
        self.full_name_max
    }

    /// Maximum bio length.
    #[must_use]
    pub const fn bio_max(&self) -> usize {
        self.bio_max
    }
}
