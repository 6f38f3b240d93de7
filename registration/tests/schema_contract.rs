//! Static contract checks for the `users` migration SQL.

use rstest::rstest;

const USERS_UP: &str = include_str!("../migrations/2026-10-01-000000_create_users/up.sql");
const USERS_DOWN: &str = include_str!("../migrations/2026-10-01-000000_create_users/down.sql");
const SCHEMA: &str = include_str!("../src/outbound/persistence/schema.rs");

#[rstest]
#[case("username TEXT NOT NULL")]
#[case("email TEXT NOT NULL")]
#[case("full_name TEXT,")]
#[case("bio TEXT,")]
fn profile_columns_leave_length_limits_to_the_policy(#[case] column_ddl: &str) {
    assert!(
        USERS_UP.contains(column_ddl),
        "expected migration to contain: {column_ddl}"
    );
}

#[rstest]
fn no_column_carries_a_fixed_width() {
    assert!(!USERS_UP.to_ascii_uppercase().contains("VARCHAR"));
    assert!(!SCHEMA.contains("Varchar"));
}

#[rstest]
#[case("CONSTRAINT users_username_key UNIQUE (username)")]
#[case("CONSTRAINT users_email_key UNIQUE (email)")]
fn unique_constraints_keep_the_names_the_adapter_maps(#[case] constraint: &str) {
    assert!(
        USERS_UP.contains(constraint),
        "expected migration to contain: {constraint}"
    );
}

#[rstest]
#[case("DROP TRIGGER IF EXISTS users_touch_updated_at ON users;")]
#[case("DROP FUNCTION IF EXISTS users_touch_updated_at();")]
#[case("DROP TABLE IF EXISTS users;")]
fn down_migration_removes_everything_up_creates(#[case] ddl: &str) {
    assert!(
        USERS_DOWN.contains(ddl),
        "expected down migration to contain: {ddl}"
    );
}
