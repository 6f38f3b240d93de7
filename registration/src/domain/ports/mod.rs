//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod password_hasher;
mod user_record_store;

#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use user_record_store::MockUserRecordStore;
pub use user_record_store::{UserRecordStore, UserRecordStoreError};
