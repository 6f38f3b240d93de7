//! Outbound adapters implementing the registration ports.
//!
//! - **memory**: process-local store for tests and the offline CLI path.
//! - **persistence**: PostgreSQL-backed store using Diesel ORM.
//!
//! Adapters translate between domain types and storage representations and
//! enforce the unique keys the domain relies on. They hold no business rules.

pub mod memory;
pub mod persistence;
