//! Validation policy configuration loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::policy::{
    BIO_MAX, EMAIL_MAX, FULL_NAME_MAX, PASSWORD_MAX, PASSWORD_MIN, USERNAME_MAX, USERNAME_MIN,
    parse_character_classes,
};
use crate::domain::{CharacterClass, LengthBounds, PolicyError, ValidationPolicy};

/// Configuration values overriding the default validation policy.
///
/// Lengths default to the constants behind [`ValidationPolicy::default`].
/// Each layer (defaults, config file, `REGISTRATION_*` environment, CLI
/// flags such as `--username-min-length`) overrides the one before it.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REGISTRATION")]
pub struct ValidationSettings {
    /// Minimum username length in characters.
    #[ortho_config(default = USERNAME_MIN)]
    pub username_min_length: usize,
    /// Maximum username length in characters.
    #[ortho_config(default = USERNAME_MAX)]
    pub username_max_length: usize,
    /// Minimum password length in characters.
    #[ortho_config(default = PASSWORD_MIN)]
    pub password_min_length: usize,
    /// Maximum password length in characters.
    #[ortho_config(default = PASSWORD_MAX)]
    pub password_max_length: usize,
    /// Character classes every password must contain, e.g.
    /// `REGISTRATION_PASSWORD_CLASSES=upper,lower,digit`. When unset every
    /// class is required; an empty list disables the rule.
    pub password_classes: Option<Vec<String>>,
    /// Maximum email length in characters.
    #[ortho_config(default = EMAIL_MAX)]
    pub email_max_length: usize,
    /// Maximum full-name length in characters.
    #[ortho_config(default = FULL_NAME_MAX)]
    pub full_name_max_length: usize,
    /// Maximum biography length in characters.
    #[ortho_config(default = BIO_MAX)]
    pub bio_max_length: usize,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            username_min_length: USERNAME_MIN,
            username_max_length: USERNAME_MAX,
            password_min_length: PASSWORD_MIN,
            password_max_length: PASSWORD_MAX,
            password_classes: None,
            email_max_length: EMAIL_MAX,
            full_name_max_length: FULL_NAME_MAX,
            bio_max_length: BIO_MAX,
        }
    }
}

impl ValidationSettings {
    /// Configured username bounds.
    ///
    /// # Errors
    /// Returns [`PolicyError`] when the bounds are inverted or the minimum is
    /// zero.
    pub const fn username_bounds(&self) -> Result<LengthBounds, PolicyError> {
        LengthBounds::new(
            "username",
            self.username_min_length,
            self.username_max_length,
        )
    }

    /// Configured password bounds.
    ///
    /// # Errors
    /// Returns [`PolicyError`] when the bounds are inverted or the minimum is
    /// zero.
    pub const fn password_bounds(&self) -> Result<LengthBounds, PolicyError> {
        LengthBounds::new(
            "password",
            self.password_min_length,
            self.password_max_length,
        )
    }

    /// Required password character classes, falling back to all of them.
    ///
    /// # Errors
    /// Returns [`PolicyError::UnknownCharacterClass`] for an unrecognised
    /// class name.
    pub fn password_classes(&self) -> Result<Vec<CharacterClass>, PolicyError> {
        self.password_classes
            .as_deref()
            .map_or_else(|| Ok(CharacterClass::ALL.to_vec()), parse_character_classes)
    }

    /// Build the validation policy described by these settings.
    ///
    /// # Errors
    /// Returns [`PolicyError`] when bounds are inverted, a minimum or maximum
    /// is zero, or a character class name is unknown.
    pub fn policy(&self) -> Result<ValidationPolicy, PolicyError> {
        ValidationPolicy::default()
            .with_username_length(self.username_bounds()?)
            .with_password_length(self.password_bounds()?)
            .with_required_classes(self.password_classes()?)
            .with_text_limits(
                self.email_max_length,
                self.full_name_max_length,
                self.bio_max_length,
            )
    }
}
