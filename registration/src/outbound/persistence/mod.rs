//! PostgreSQL persistence for user records using Diesel ORM.
//!
//! Queries run on `diesel-async` connections checked out of a `bb8` pool.
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module; only domain types cross the port.
//!
//! # Example
//!
//! ```ignore
//! use registration::outbound::persistence::{DbPool, DieselUserRecordStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/registration")).await?;
//! let store = DieselUserRecordStore::new(pool);
//! ```

mod diesel_user_record_store;
mod models;
mod pool;
mod schema;

pub use diesel_user_record_store::DieselUserRecordStore;
pub use pool::{DbPool, PoolConfig, PoolError};
