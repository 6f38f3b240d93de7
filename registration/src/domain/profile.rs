//! Raw, unvalidated input accepted at the registration boundary.
//!
//! Route handlers deserialise request bodies straight into these structs, so
//! the shape of the input is fixed before any rule runs: unknown fields are
//! refused and every field has a concrete type.

use std::fmt;

use serde::Deserialize;
use zeroize::Zeroizing;

/// Plaintext password supplied by the user.
///
/// The buffer is wiped on drop and the value never serialises or prints.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a plaintext password.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// Borrow the plaintext for validation or hashing.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for Password {}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}

/// User-supplied registration data pending validation.
///
/// Accepts camelCase or snake_case keys for the optional fields.
///
/// # Examples
/// ```
/// use registration::domain::CandidateProfile;
///
/// let profile: CandidateProfile = serde_json::from_str(
///     r#"{"username":"alice2","password":"Str0ng!Pass","email":"a@b.com","fullName":"Alice"}"#,
/// )
/// .expect("well-formed body");
/// assert_eq!(profile.full_name.as_deref(), Some("Alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct CandidateProfile {
    /// Requested username, as typed.
    pub username: String,
    /// Requested password.
    pub password: Password,
    /// Contact email, as typed.
    pub email: String,
    /// Optional display name.
    #[serde(default, alias = "full_name")]
    pub full_name: Option<String>,
    /// Optional biography.
    #[serde(default)]
    pub bio: Option<String>,
}

impl CandidateProfile {
    /// Build a candidate with the required fields only.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: Password::new(password),
            email: email.into(),
            full_name: None,
            bio: None,
        }
    }

    /// Attach a full name.
    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Attach a biography.
    #[must_use]
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }
}

/// Partial profile edit. Absent fields are left untouched; a blank
/// `full_name` or `bio` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    /// Replacement email.
    #[serde(default)]
    pub email: Option<String>,
    /// Replacement display name; blank clears it.
    #[serde(default, alias = "full_name")]
    pub full_name: Option<String>,
    /// Replacement biography; blank clears it.
    #[serde(default)]
    pub bio: Option<String>,
    /// Replacement password.
    #[serde(default)]
    pub password: Option<Password>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for boundary deserialisation.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn password_debug_never_reveals_plaintext() {
        let profile = CandidateProfile::new("alice", "Str0ng!Pass", "a@b.com");
        let rendered = format!("{profile:?}");
        assert!(!rendered.contains("Str0ng!Pass"));
        assert!(rendered.contains("Password(..)"));
    }

    #[rstest]
    fn deserialises_snake_case_full_name() {
        let profile: CandidateProfile = serde_json::from_str(
            r#"{"username":"alice","password":"x","email":"a@b.com","full_name":"Alice L"}"#,
        )
        .expect("snake_case alias accepted");
        assert_eq!(profile.full_name.as_deref(), Some("Alice L"));
        assert!(profile.bio.is_none());
    }

    #[rstest]
    fn rejects_unknown_fields() {
        let result: Result<CandidateProfile, _> = serde_json::from_str(
            r#"{"username":"alice","password":"x","email":"a@b.com","role":"ADMIN"}"#,
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn rejects_missing_required_fields() {
        let result: Result<CandidateProfile, _> =
            serde_json::from_str(r#"{"username":"alice","email":"a@b.com"}"#);
        assert!(result.is_err());
    }

    #[rstest]
    fn update_defaults_to_no_changes() {
        let update: ProfileUpdate = serde_json::from_str("{}").expect("empty update");
        assert_eq!(update, ProfileUpdate::default());
    }

    #[rstest]
    fn update_accepts_password() {
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"password":"N3w!Password"}"#).expect("update");
        assert_eq!(
            update.password.as_ref().map(Password::expose),
            Some("N3w!Password")
        );
    }
}
