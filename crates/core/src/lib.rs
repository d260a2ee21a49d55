//! Domain types and codecs for the pgcdt service.
//!
//! Everything here is free of I/O: the storage backends and the HTTP layer
//! live in the `pgcdt` crate.

pub mod contact;
pub mod person;
pub mod plan;
pub mod record;
pub mod storage;
