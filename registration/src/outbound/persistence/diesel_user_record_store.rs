//! PostgreSQL-backed `UserRecordStore` using Diesel ORM.
//!
//! The `users_username_key` and `users_email_key` unique constraints are the
//! final word on uniqueness; a violation comes back as
//! [`UserRecordStoreError::DuplicateKey`] naming the field.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ConflictField;
use crate::domain::ports::{UserRecordStore, UserRecordStoreError};
use crate::domain::user::{
    Bio, EmailAddress, FullName, NewUserRecord, ProfileChanges, UserRecord, Username,
};

use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed user-record store.
#[derive(Clone)]
pub struct DieselUserRecordStore {
    pool: DbPool,
}

impl DieselUserRecordStore {
    /// Create a store over `pool`.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn conflict_for_constraint(constraint: Option<&str>) -> Option<ConflictField> {
    match constraint? {
        USERNAME_CONSTRAINT => Some(ConflictField::Username),
        EMAIL_CONSTRAINT => Some(ConflictField::Email),
        _ => None,
    }
}

/// Map Diesel errors to store errors.
fn map_diesel_error(error: diesel::result::Error) -> UserRecordStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => debug!(
            ?kind,
            constraint = info.constraint_name(),
            message = info.message(),
            "diesel operation failed"
        ),
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match conflict_for_constraint(info.constraint_name()) {
                Some(field) => UserRecordStoreError::duplicate_key(field),
                None => UserRecordStoreError::query("unexpected unique constraint violation"),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserRecordStoreError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => UserRecordStoreError::query("database query error"),
        DieselError::NotFound => UserRecordStoreError::query("record not found"),
        _ => UserRecordStoreError::query("database error"),
    }
}

/// Convert a row into a domain record, refusing values that were not stored
/// in normalised form.
fn row_to_record(row: UserRow) -> Result<UserRecord, UserRecordStoreError> {
    let username = Username::normalise(&row.username)
        .filter(|name| name.as_ref() == row.username)
        .ok_or_else(|| {
            UserRecordStoreError::query(format!("non-canonical username in database: {}", row.id))
        })?;
    let email = EmailAddress::normalise(&row.email)
        .filter(|email| email.as_ref() == row.email)
        .ok_or_else(|| {
            UserRecordStoreError::query(format!("non-canonical email in database: {}", row.id))
        })?;

    Ok(UserRecord {
        id: row.id,
        username,
        email,
        full_name: row.full_name.map(FullName::from_trusted),
        bio: row.bio.map(Bio::from_trusted),
    })
}

fn changeset(changes: &ProfileChanges) -> UserChangeset<'_> {
    UserChangeset {
        email: changes.email.as_ref().map(AsRef::as_ref),
        full_name: changes
            .full_name
            .as_ref()
            .map(|value| value.as_ref().map(AsRef::as_ref)),
        bio: changes
            .bio
            .as_ref()
            .map(|value| value.as_ref().map(AsRef::as_ref)),
        password_hash: changes.password_hash.as_ref().map(|hash| hash.as_str()),
    }
}

#[async_trait]
impl UserRecordStore for DieselUserRecordStore {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserRecord>, UserRecordStoreError> {
        let key: &str = username.as_ref();
        let mut conn = self.pool.get().await?;
        let row = users::table
            .filter(users::username.eq(key))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_record).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserRecord>, UserRecordStoreError> {
        let key: &str = email.as_ref();
        let mut conn = self.pool.get().await?;
        let row = users::table
            .filter(users::email.eq(key))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_record).transpose()
    }

    async fn insert(&self, record: &NewUserRecord) -> Result<UserRecord, UserRecordStoreError> {
        let mut conn = self.pool.get().await?;
        let row = NewUserRow {
            id: Uuid::new_v4(),
            username: record.username.as_ref(),
            email: record.email.as_ref(),
            full_name: record.full_name.as_ref().map(AsRef::as_ref),
            bio: record.bio.as_ref().map(AsRef::as_ref),
            password_hash: record.password_hash.as_str(),
        };

        let stored = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_record(stored)
    }

    async fn update_profile(
        &self,
        username: &Username,
        changes: &ProfileChanges,
    ) -> Result<Option<UserRecord>, UserRecordStoreError> {
        if changes.is_empty() {
            return self.find_by_username(username).await;
        }

        let key: &str = username.as_ref();
        let mut conn = self.pool.get().await?;
        let updated = diesel::update(users::table.filter(users::username.eq(key)))
            .set(&changeset(changes))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        updated.map(row_to_record).transpose()
    }
}
