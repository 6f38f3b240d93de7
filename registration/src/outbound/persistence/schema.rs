//! Diesel table definitions for the registration schema.
//!
//! Must match `migrations/` exactly. Regenerate with `diesel print-schema`
//! after changing a migration.

diesel::table! {
    /// Registered users.
    ///
    /// `username` and `email` hold normalised (trimmed, lower-cased) values
    /// and carry the `users_username_key` and `users_email_key` unique
    /// constraints.
    users (id) {
        id -> Uuid,
        username -> Text,
        email -> Text,
        full_name -> Nullable<Text>,
        bio -> Nullable<Text>,
        /// Encoded password digest; plaintext never reaches this table.
        password_hash -> Text,
        created_at -> Timestamptz,
        /// Auto-updated by trigger.
        updated_at -> Timestamptz,
    }
}
