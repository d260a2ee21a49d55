//! Storage backend implementations.
//!
//! This module provides concrete implementations of the repository traits
//! defined in `pgcdt_core::storage`. The backend is chosen at startup from the
//! configuration (see `Config::storage_backend`).
//!
//! - `postgres`: PostgreSQL via `sqlx`, one connection per operation
//! - `inmemory`: process-local storage for tests and database-less runs

pub mod inmemory;
pub mod postgres;

pub use inmemory::InMemoryRepository;
pub use postgres::PostgresRepository;
