//! Per-field rules. Each returns the normalised value or the first failure.

use std::sync::OnceLock;

use regex::Regex;

use super::RejectionReason;
use crate::domain::policy::{LengthBounds, ValidationPolicy};
use crate::domain::profile::Password;
use crate::domain::user::{Bio, EmailAddress, FullName, Username};

/// Longest local part (before `@`) accepted in an email address.
const EMAIL_LOCAL_MAX: usize = 64;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_LOCAL_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_LABEL_RE: OnceLock<Regex> = OnceLock::new();

fn compile(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("validation regex {pattern} failed to compile: {error}"))
    })
}

fn username_regex() -> &'static Regex {
    // Length is enforced separately; this constrains the character set.
    compile(&USERNAME_RE, "^[A-Za-z0-9_.-]+$")
}

fn email_local_regex() -> &'static Regex {
    compile(&EMAIL_LOCAL_RE, r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+$")
}

fn email_label_regex() -> &'static Regex {
    compile(&EMAIL_LABEL_RE, "^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$")
}

const fn check_length(length: usize, bounds: LengthBounds) -> Result<(), RejectionReason> {
    if length < bounds.min() {
        return Err(RejectionReason::TooShort { min: bounds.min() });
    }
    if length > bounds.max() {
        return Err(RejectionReason::TooLong { max: bounds.max() });
    }
    Ok(())
}

pub(super) fn username(raw: &str, policy: &ValidationPolicy) -> Result<Username, RejectionReason> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RejectionReason::Empty);
    }
    check_length(trimmed.chars().count(), policy.username())?;
    if !username_regex().is_match(trimmed) {
        return Err(RejectionReason::InvalidCharacters);
    }
    Username::normalise(trimmed).ok_or(RejectionReason::Empty)
}

pub(super) fn password(
    password: &Password,
    username: Option<&str>,
    policy: &ValidationPolicy,
) -> Result<Password, RejectionReason> {
    let plaintext = password.expose();
    if plaintext.is_empty() {
        return Err(RejectionReason::Empty);
    }

    // Checked before anything scans the whole value so oversized input stays cheap.
    let bounds = policy.password();
    if plaintext.len() > bounds.max().saturating_mul(4) {
        return Err(RejectionReason::TooLong { max: bounds.max() });
    }
    check_length(plaintext.chars().count(), bounds)?;

    let missing: Vec<_> = policy
        .required_classes()
        .iter()
        .copied()
        .filter(|class| !plaintext.chars().any(|ch| class.matches(ch)))
        .collect();
    if !missing.is_empty() {
        return Err(RejectionReason::MissingCharacterClasses { missing });
    }

    if let Some(name) = username.map(str::trim).filter(|name| !name.is_empty()) {
        if plaintext.to_lowercase() == name.to_lowercase() {
            return Err(RejectionReason::MatchesUsername);
        }
    }

    Ok(password.clone())
}

pub(super) fn email(raw: &str, policy: &ValidationPolicy) -> Result<EmailAddress, RejectionReason> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RejectionReason::Empty);
    }
    if trimmed.chars().count() > policy.email_max() {
        return Err(RejectionReason::TooLong {
            max: policy.email_max(),
        });
    }

    let Some((local, domain)) = trimmed.split_once('@') else {
        return Err(RejectionReason::InvalidFormat);
    };
    if local.is_empty()
        || local.len() > EMAIL_LOCAL_MAX
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
        || !email_local_regex().is_match(local)
    {
        return Err(RejectionReason::InvalidFormat);
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || !labels.iter().all(|label| email_label_regex().is_match(label)) {
        return Err(RejectionReason::InvalidFormat);
    }

    EmailAddress::normalise(trimmed).ok_or(RejectionReason::Empty)
}

/// Shared rule for optional free text. Blank input normalises to `None`.
fn optional_text(
    raw: Option<&str>,
    max: usize,
    allow_layout: bool,
) -> Result<Option<String>, RejectionReason> {
    let Some(trimmed) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > max {
        return Err(RejectionReason::TooLong { max });
    }
    let illegal = trimmed
        .chars()
        .any(|ch| ch.is_control() && !(allow_layout && matches!(ch, '\n' | '\t')));
    if illegal {
        return Err(RejectionReason::ControlCharacters);
    }
    Ok(Some(trimmed.to_owned()))
}

pub(super) fn full_name(
    raw: Option<&str>,
    policy: &ValidationPolicy,
) -> Result<Option<FullName>, RejectionReason> {
    optional_text(raw, policy.full_name_max(), false).map(|value| value.map(FullName::from_trusted))
}

pub(super) fn bio(raw: Option<&str>, policy: &ValidationPolicy) -> Result<Option<Bio>, RejectionReason> {
    optional_text(raw, policy.bio_max(), true).map(|value| value.map(Bio::from_trusted))
}
