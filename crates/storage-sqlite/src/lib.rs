//! SQLite storage implementation for Goalpost.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `goalpost-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations (including the seed of the singleton goal row)
//! - The single-writer actor all mutations go through
//! - Database-specific model types (with Diesel derives)
//!
//! ```text
//!      core (domain)
//!            │
//!            ▼
//!  storage-sqlite (this crate)
//!            │
//!            ▼
//!        SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod goals;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from goalpost-core for convenience
pub use goalpost_core::errors::{DatabaseError, Error, Result};
