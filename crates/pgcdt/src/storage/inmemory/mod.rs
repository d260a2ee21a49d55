//! In-memory storage backend.
//!
//! Stores rows in `Vec`s wrapped in `Arc<RwLock<_>>`. Useful for tests and for
//! running the service without a database. Data is lost when the repository is
//! dropped.

mod repository;

pub use repository::InMemoryRepository;
