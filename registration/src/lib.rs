//! Registration intake core: field validation, uniqueness checks, and the
//! store adapters they run against.

pub mod config;
pub mod domain;
pub mod outbound;
