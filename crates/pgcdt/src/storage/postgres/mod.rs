//! PostgreSQL storage backend implementation.
//!
//! Uses `sqlx` with one connection per operation. The `address` composite type
//! is encoded and decoded through `pgcdt_core::record`.

mod conversions;
mod error;
#[cfg(test)]
mod fixture;
mod repository;
mod schema;

pub use repository::PostgresRepository;
