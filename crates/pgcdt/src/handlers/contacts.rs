//! Contact handlers.
//!
//! Contacts carry their phone numbers as a JSONB object keyed by label.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use pgcdt_core::contact::Contact;

use crate::{handlers::AppError, state::AppState};

/// Query parameters for listing contacts.
#[derive(Debug, Deserialize)]
pub struct ListContactsQuery {
    /// Only return contacts with a number under this label.
    pub label: Option<String>,
}

/// List contacts (GET /contacts).
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(query): Query<ListContactsQuery>,
) -> Result<Json<Vec<Contact>>, AppError> {
    let contacts = match query.label.as_deref() {
        Some(label) => state.contact_repo.fetch_with_label(label).await?,
        None => state.contact_repo.fetch_all().await?,
    };

    tracing::debug!(count = contacts.len(), label = ?query.label, "Listed contacts");

    Ok(Json(contacts))
}

/// Insert a batch of contacts (POST /contacts).
///
/// Responds with the number of rows written.
pub async fn create_contacts(
    State(state): State<AppState>,
    Json(contacts): Json<Vec<Contact>>,
) -> Result<Json<u64>, AppError> {
    let count = state.contact_repo.persist(&contacts).await?;

    tracing::info!(count, "Persisted contacts");

    Ok(Json(count))
}
