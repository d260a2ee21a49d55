//! Tagged contact handlers.
//!
//! Same payload as `/contacts`, stored as a JSONB array of
//! `{"tag", "value"}` entries instead of an object keyed by label.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use pgcdt_core::contact::Contact;

use crate::{handlers::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ListTaggedContactsQuery {
    /// Only return contacts with an entry under this tag.
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TaggedNumbersQuery {
    pub tag: String,
}

/// List tagged contacts (GET /tagged-contacts).
pub async fn list_tagged_contacts(
    State(state): State<AppState>,
    Query(query): Query<ListTaggedContactsQuery>,
) -> Result<Json<Vec<Contact>>, AppError> {
    let contacts = match query.tag.as_deref() {
        Some(tag) => state.tagged_contact_repo.fetch_with_tag(tag).await?,
        None => state.tagged_contact_repo.fetch_all().await?,
    };

    tracing::debug!(count = contacts.len(), tag = ?query.tag, "Listed tagged contacts");

    Ok(Json(contacts))
}

/// Insert a batch of tagged contacts (POST /tagged-contacts).
pub async fn create_tagged_contacts(
    State(state): State<AppState>,
    Json(contacts): Json<Vec<Contact>>,
) -> Result<Json<u64>, AppError> {
    let count = state.tagged_contact_repo.persist(&contacts).await?;

    tracing::info!(count, "Persisted tagged contacts");

    Ok(Json(count))
}

/// Every number stored under a tag (GET /tagged-contacts/numbers).
pub async fn list_tagged_numbers(
    State(state): State<AppState>,
    Query(query): Query<TaggedNumbersQuery>,
) -> Result<Json<Vec<i64>>, AppError> {
    let numbers = state
        .tagged_contact_repo
        .fetch_numbers_with_tag(&query.tag)
        .await?;

    tracing::debug!(count = numbers.len(), tag = %query.tag, "Listed tagged numbers");

    Ok(Json(numbers))
}
