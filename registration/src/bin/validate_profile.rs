//! Validate a registration profile and optionally check it against the store.
//!
//! Reads a JSON profile from a file or stdin, applies the configured
//! validation policy, and prints a JSON report on stdout. With
//! `--check-store` the advisory uniqueness checks also run against
//! PostgreSQL. Nothing is ever written.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use registration::config::ValidationSettings;
use registration::domain::ports::UserRecordStore;
use registration::domain::{
    Bio, CandidateProfile, ConflictField, EmailAddress, Error, FullName, NormalizedProfile,
    ProfileValidator, Uniqueness, UniquenessError, Username, ValidationResult, check_unique,
    check_unique_email,
};
use registration::outbound::persistence::{DbPool, DieselUserRecordStore, PoolConfig};
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `validate-profile` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "validate-profile",
    about = "Validate a registration profile and report field rejections or conflicts",
    version
)]
struct CliArgs {
    /// Path to a JSON profile, or `-` for stdin.
    #[arg(long = "input", value_name = "path|-")]
    input: PathBuf,
    /// Also check username and email uniqueness against the database.
    #[arg(long = "check-store")]
    check_store: bool,
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Validation policy flags after `--`, e.g. `-- --username-min-length 5`.
    #[arg(last = true, value_name = "policy flags")]
    policy_flags: Vec<OsString>,
}

/// Profile fields echoed back once validation accepts them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AcceptedProfile {
    username: Username,
    email: EmailAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<FullName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bio: Option<Bio>,
}

impl From<NormalizedProfile> for AcceptedProfile {
    fn from(profile: NormalizedProfile) -> Self {
        Self {
            username: profile.username,
            email: profile.email,
            full_name: profile.full_name,
            bio: profile.bio,
        }
    }
}

/// JSON report printed on stdout.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum ProfileReport {
    Accepted { profile: AcceptedProfile },
    Rejected { error: Error },
    Conflict { field: ConflictField, error: Error },
}

impl ProfileReport {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Accepted { .. } => ExitCode::SUCCESS,
            Self::Rejected { .. } | Self::Conflict { .. } => ExitCode::from(2),
        }
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = load_settings(&args)?;
    let validator = ProfileValidator::new(
        settings
            .policy()
            .wrap_err("validation settings are inconsistent")?,
    );

    let raw = read_input(&args.input)?;
    let candidate: CandidateProfile =
        serde_json::from_str(&raw).wrap_err("input is not a registration profile")?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    let report = runtime.block_on(run(args, &validator, &candidate))?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report).wrap_err("failed to encode report")?;
    writeln!(stdout).wrap_err("failed to write report")?;
    Ok(report.exit_code())
}

async fn run(
    args: CliArgs,
    validator: &ProfileValidator,
    candidate: &CandidateProfile,
) -> Result<ProfileReport> {
    if !args.check_store {
        return evaluate(validator, candidate, None)
            .await
            .wrap_err("uniqueness check failed");
    }

    let database_url = resolve_database_url(args.database_url)?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .wrap_err("failed to create database pool")?;
    let store = DieselUserRecordStore::new(pool);
    evaluate(validator, candidate, Some(&store as &dyn UserRecordStore))
        .await
        .wrap_err("uniqueness check failed")
}

async fn evaluate(
    validator: &ProfileValidator,
    candidate: &CandidateProfile,
    store: Option<&dyn UserRecordStore>,
) -> Result<ProfileReport, UniquenessError> {
    let profile = match validator.validate(candidate) {
        ValidationResult::Accepted(profile) => profile,
        ValidationResult::Rejected(rejections) => {
            return Ok(ProfileReport::Rejected {
                error: Error::from(&rejections),
            });
        }
    };

    if let Some(store) = store {
        if let Uniqueness::Conflict(field) = check_unique(profile.username.as_ref(), store).await? {
            return Ok(conflict(field));
        }
        if let Uniqueness::Conflict(field) = check_unique_email(profile.email.as_ref(), store).await?
        {
            return Ok(conflict(field));
        }
    }

    Ok(ProfileReport::Accepted {
        profile: profile.into(),
    })
}

fn conflict(field: ConflictField) -> ProfileReport {
    ProfileReport::Conflict {
        field,
        error: Error::from(field),
    }
}

fn load_settings(args: &CliArgs) -> Result<ValidationSettings> {
    let argv =
        std::iter::once(OsString::from("validate-profile")).chain(args.policy_flags.iter().cloned());
    ValidationSettings::load_from_iter(argv).wrap_err("failed to load validation settings")
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .wrap_err("failed to read profile from stdin")?;
        return Ok(raw);
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("input path must name a file: {}", path.display()))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())
        .wrap_err_with(|| format!("failed to open input directory '{}'", parent.display()))?;
    directory
        .read_to_string(Path::new(file_name))
        .wrap_err_with(|| format!("failed to read input file '{}'", path.display()))
}

fn resolve_database_url(explicit: Option<String>) -> Result<String> {
    let value = match explicit {
        Some(value) => value,
        None => env::var("DATABASE_URL")
            .map_err(|_| eyre!("database URL missing: set --database-url or DATABASE_URL"))?,
    };
    if value.trim().is_empty() {
        return Err(eyre!("database URL must not be empty"));
    }
    Ok(value)
}
