//! Internal Diesel row structs for the users table.
//!
//! These types never leave the persistence layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::users;

/// Row read back from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    #[expect(dead_code, reason = "audit column read for completeness")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "audit column read for completeness")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable row for a new registration.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub full_name: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub password_hash: &'a str,
}

/// Partial profile update.
///
/// `None` skips a column; `Some(None)` writes `NULL`.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub email: Option<&'a str>,
    pub full_name: Option<Option<&'a str>>,
    pub bio: Option<Option<&'a str>>,
    pub password_hash: Option<&'a str>,
}
