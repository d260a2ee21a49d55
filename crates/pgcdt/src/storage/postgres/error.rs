//! PostgreSQL error mapping.
//!
//! Maps `sqlx::Error` to `RepositoryError` from `pgcdt_core::storage`.
//! Constraint violations are mapped to semantic variants (e.g., unique
//! violations to AlreadyExists).

use pgcdt_core::storage::RepositoryError;
use sqlx::postgres::PgDatabaseError;

/// Maps a sqlx error to a RepositoryError.
///
/// # Error Mapping
///
/// - unique violation → `RepositoryError::AlreadyExists` (key taken from the error detail)
/// - foreign key / not-null / check violation → `RepositoryError::InvalidData`
/// - I/O, TLS, configuration, pool errors → `RepositoryError::ConnectionFailed`
/// - `RowNotFound` → `RepositoryError::NotFound`
/// - column or value decode failures → `RepositoryError::Serialization`
/// - All other errors → `RepositoryError::QueryFailed`
pub fn map_sqlx_error(err: sqlx::Error, entity_type: &'static str) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            let id = db_err
                .try_downcast_ref::<PgDatabaseError>()
                .and_then(PgDatabaseError::detail)
                .and_then(key_from_detail)
                .unwrap_or("unknown")
                .to_string();

            RepositoryError::AlreadyExists { entity_type, id }
        }

        sqlx::Error::Database(db_err)
            if db_err.is_foreign_key_violation() || db_err.is_check_violation() =>
        {
            RepositoryError::InvalidData(format!("Constraint violation for {entity_type}: {db_err}"))
        }

        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(NOT_NULL_VIOLATION) => {
            RepositoryError::InvalidData(format!("Missing value for {entity_type}: {db_err}"))
        }

        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Configuration(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => RepositoryError::ConnectionFailed(err.to_string()),

        sqlx::Error::RowNotFound => RepositoryError::NotFound {
            entity_type,
            id: "unknown".to_string(),
        },

        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            RepositoryError::Serialization(err.to_string())
        }

        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

/// SQLSTATE for `not_null_violation`.
const NOT_NULL_VIOLATION: &str = "23502";

/// Extracts the key value from a unique-violation detail such as
/// `Key (email)=(julie@xyz.com) already exists.`
fn key_from_detail(detail: &str) -> Option<&str> {
    let start = detail.find(")=(")? + 3;
    let end = detail.rfind(')')?;
    (end >= start).then(|| &detail[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgcdt_core::contact::ContactError;

    #[test]
    fn test_key_from_detail() {
        assert_eq!(
            key_from_detail("Key (email)=(julie@xyz.com) already exists."),
            Some("julie@xyz.com")
        );
        assert_eq!(
            key_from_detail("Key (name, email)=(Ann, (ann)@xyz.com) already exists."),
            Some("Ann, (ann)@xyz.com")
        );
        assert_eq!(key_from_detail("duplicate key"), None);
    }

    #[test]
    fn test_io_error_maps_to_connection_failed() {
        let err = sqlx::Error::Io(std::io::Error::other("connection refused"));

        let result = map_sqlx_error(err, "Contact");

        assert!(matches!(result, RepositoryError::ConnectionFailed(_)));
    }

    #[test]
    fn test_pool_timeout_maps_to_connection_failed() {
        let result = map_sqlx_error(sqlx::Error::PoolTimedOut, "User");

        assert!(matches!(result, RepositoryError::ConnectionFailed(_)));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let result = map_sqlx_error(sqlx::Error::RowNotFound, "User");

        assert_eq!(
            result,
            RepositoryError::NotFound {
                entity_type: "User",
                id: "unknown".to_string()
            }
        );
    }

    #[test]
    fn test_column_decode_maps_to_serialization() {
        let err = sqlx::Error::ColumnDecode {
            index: "phone_numbers".to_string(),
            source: Box::new(ContactError::Decode("expected a JSON object".to_string())),
        };

        let result = map_sqlx_error(err, "Contact");

        match result {
            RepositoryError::Serialization(message) => {
                assert!(message.contains("phone_numbers"));
            }
            other => panic!("Expected Serialization error, got {other:?}"),
        }
    }

    #[test]
    fn test_other_errors_map_to_query_failed() {
        let err = sqlx::Error::ColumnNotFound("address".to_string());

        let result = map_sqlx_error(err, "User");

        assert!(matches!(result, RepositoryError::QueryFailed(_)));
    }
}
