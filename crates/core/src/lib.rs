//! Goalpost Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic of the donation goal tracker.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod events;
pub mod goals;
pub mod utils;
pub mod webhook;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
