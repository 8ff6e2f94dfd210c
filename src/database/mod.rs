/// Database module for PostgreSQL integration
///
/// This module provides:
/// - r2d2 connection pooling
/// - Repository traits and Diesel-backed implementations
/// - Row models and schema
/// - String-backed enums for task status and trigger type

pub mod connection;
pub mod enums;
pub mod models;
pub mod repositories;
pub mod schema;

pub use connection::{establish_connection_pool, DatabaseError, DatabasePool};
