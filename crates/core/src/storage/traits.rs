use async_trait::async_trait;

use crate::contact::Contact;
use crate::person::{NewUser, User};
use crate::plan::{ExplainTarget, QueryTiming};

use super::Result;

/// Repository for contacts and their JSON phone directories.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Returns every stored contact (full scan), fully materialized.
    async fn fetch_all(&self) -> Result<Vec<Contact>>;

    /// Returns contacts whose phone directory has a number under `label`.
    async fn fetch_with_label(&self, label: &str) -> Result<Vec<Contact>>;

    /// Inserts all contacts as one batch and returns the rows written.
    ///
    /// Either every contact is stored or none is.
    async fn persist(&self, contacts: &[Contact]) -> Result<u64>;
}

/// Repository for contacts whose phone directory is stored as a JSONB array
/// of `{"tag", "value"}` objects.
///
/// Labels inside an array cannot be reached with `->` / `->>`; queries go
/// through containment (`@>`) or unnest the array.
#[async_trait]
pub trait TaggedContactRepository: Send + Sync {
    /// Returns every stored tagged contact (full scan).
    async fn fetch_all(&self) -> Result<Vec<Contact>>;

    /// Returns contacts whose array holds an entry tagged `tag`.
    async fn fetch_with_tag(&self, tag: &str) -> Result<Vec<Contact>>;

    /// Returns every number stored under `tag`, across all contacts.
    async fn fetch_numbers_with_tag(&self, tag: &str) -> Result<Vec<i64>>;

    /// Inserts all contacts as one batch and returns the rows written.
    async fn persist(&self, contacts: &[Contact]) -> Result<u64>;
}

/// Repository for users and their composite addresses.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns every stored user ordered by id.
    async fn fetch_all(&self) -> Result<Vec<User>>;

    /// Returns users whose address has the given pin code.
    async fn fetch_by_pin_code(&self, pin_code: i32) -> Result<Vec<User>>;

    /// Inserts all users as one batch and returns the rows written.
    async fn persist(&self, users: &[NewUser]) -> Result<u64>;
}

/// Runs `EXPLAIN ANALYZE` for the demo queries.
#[async_trait]
pub trait QueryInspector: Send + Sync {
    /// Explains `target`. With `force_index`, sequential scans are disabled
    /// for the session first so the planner picks an index when one exists.
    async fn explain_analyze(
        &self,
        target: &ExplainTarget,
        force_index: bool,
    ) -> Result<QueryTiming>;
}
