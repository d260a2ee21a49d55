//! Query plan inspection (GET /explain).
//!
//! Runs `EXPLAIN ANALYZE` for one of the demo queries and returns the plan
//! with its planning and execution times.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use pgcdt_core::plan::ExplainTarget;
use pgcdt_core::storage::RepositoryError;

use crate::{handlers::AppError, state::AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplainTable {
    Users,
    Contacts,
    TaggedContacts,
    /// Numbers unnested from `tagged_contacts`; needs a `label`.
    TaggedNumbers,
}

/// Query parameters for `GET /explain`.
#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub target: ExplainTable,
    /// Filter users on `(address).pin_code`.
    pub pin_code: Option<i32>,
    /// Filter contacts on a phone-number label or tag.
    pub label: Option<String>,
    /// Disable sequential scans before explaining.
    #[serde(default)]
    pub force_index: bool,
}

impl ExplainQuery {
    fn into_target(self) -> Result<ExplainTarget, RepositoryError> {
        match (self.target, self.pin_code, self.label) {
            (ExplainTable::Users, None, None) => Ok(ExplainTarget::AllUsers),
            (ExplainTable::Users, Some(pin_code), None) => {
                Ok(ExplainTarget::UsersByPinCode(pin_code))
            }
            (ExplainTable::Contacts, None, None) => Ok(ExplainTarget::AllContacts),
            (ExplainTable::Contacts, None, Some(label)) => {
                Ok(ExplainTarget::ContactsWithLabel(label))
            }
            (ExplainTable::TaggedContacts, None, None) => Ok(ExplainTarget::AllTaggedContacts),
            (ExplainTable::TaggedContacts, None, Some(tag)) => {
                Ok(ExplainTarget::TaggedContactsWithTag(tag))
            }
            (ExplainTable::TaggedNumbers, None, Some(tag)) => {
                Ok(ExplainTarget::TaggedNumbersWithTag(tag))
            }
            (ExplainTable::TaggedNumbers, None, None) => Err(RepositoryError::InvalidData(
                "tagged_numbers needs a label".to_string(),
            )),
            (ExplainTable::Users, _, Some(_)) => Err(RepositoryError::InvalidData(
                "label only applies to contacts".to_string(),
            )),
            (_, Some(_), _) => Err(RepositoryError::InvalidData(
                "pin_code only applies to users".to_string(),
            )),
        }
    }
}

/// Explain a demo query (GET /explain).
///
/// Returns 503 when the storage backend has no query planner.
pub async fn explain_query(
    State(state): State<AppState>,
    Query(query): Query<ExplainQuery>,
) -> Result<Response, AppError> {
    let Some(inspector) = state.query_inspector.as_ref() else {
        return Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "error": "query plans require the postgres storage backend"
            })),
        )
            .into_response());
    };

    let force_index = query.force_index;
    let target = query.into_target()?;
    let timing = inspector.explain_analyze(&target, force_index).await?;

    tracing::info!(
        ?target,
        force_index,
        planning_ms = ?timing.planning_ms,
        execution_ms = timing.execution_ms,
        uses_index = timing.uses_index(),
        "Explained query"
    );

    Ok(Json(timing).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(target: ExplainTable, pin_code: Option<i32>, label: Option<&str>) -> ExplainQuery {
        ExplainQuery {
            target,
            pin_code,
            label: label.map(str::to_string),
            force_index: false,
        }
    }

    #[test]
    fn test_into_target() {
        assert_eq!(
            query(ExplainTable::Users, None, None).into_target(),
            Ok(ExplainTarget::AllUsers)
        );
        assert_eq!(
            query(ExplainTable::Users, Some(25130), None).into_target(),
            Ok(ExplainTarget::UsersByPinCode(25130))
        );
        assert_eq!(
            query(ExplainTable::Contacts, None, None).into_target(),
            Ok(ExplainTarget::AllContacts)
        );
        assert_eq!(
            query(ExplainTable::Contacts, None, Some("Home")).into_target(),
            Ok(ExplainTarget::ContactsWithLabel("Home".to_string()))
        );
    }

    #[test]
    fn test_into_target_tagged() {
        assert_eq!(
            query(ExplainTable::TaggedContacts, None, None).into_target(),
            Ok(ExplainTarget::AllTaggedContacts)
        );
        assert_eq!(
            query(ExplainTable::TaggedContacts, None, Some("Home")).into_target(),
            Ok(ExplainTarget::TaggedContactsWithTag("Home".to_string()))
        );
        assert_eq!(
            query(ExplainTable::TaggedNumbers, None, Some("Work")).into_target(),
            Ok(ExplainTarget::TaggedNumbersWithTag("Work".to_string()))
        );
    }

    #[test]
    fn test_tagged_numbers_requires_label() {
        assert!(matches!(
            query(ExplainTable::TaggedNumbers, None, None).into_target(),
            Err(RepositoryError::InvalidData(_))
        ));
        assert!(matches!(
            query(ExplainTable::TaggedContacts, Some(25130), Some("Home")).into_target(),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_table_names_are_snake_case() {
        let table: ExplainTable = serde_json::from_str(r#""tagged_numbers""#).unwrap();
        assert_eq!(table, ExplainTable::TaggedNumbers);
    }

    #[test]
    fn test_into_target_rejects_mismatched_filters() {
        assert!(matches!(
            query(ExplainTable::Users, None, Some("Home")).into_target(),
            Err(RepositoryError::InvalidData(_))
        ));
        assert!(matches!(
            query(ExplainTable::Contacts, Some(25130), None).into_target(),
            Err(RepositoryError::InvalidData(_))
        ));
    }
}
