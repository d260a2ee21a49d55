use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pgcdt_core::storage::RepositoryError;

/// Handler error. Repository failures keep their mapped status code; anything
/// else is a 500. The body is `{"error": <message>, "kind": <variant>}`.
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, kind) = match self.0.downcast_ref::<RepositoryError>() {
            Some(repo_error) => (
                StatusCode::from_u16(repo_error.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                repo_error.kind(),
            ),
            None => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        if status_code.is_server_error() {
            tracing::error!(status = %status_code, kind, error = %self.0, "Request failed");
        } else {
            tracing::warn!(status = %status_code, kind, error = %self.0, "Request rejected");
        }

        let body = serde_json::json!({ "error": self.0.to_string(), "kind": kind });
        (status_code, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_keeps_status() {
        let error = AppError::from(RepositoryError::AlreadyExists {
            entity_type: "Contact",
            id: "julie@xyz.com".to_string(),
        });

        assert_eq!(error.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_body_names_the_error_kind() {
        use http_body_util::BodyExt;

        let error = AppError::from(RepositoryError::InvalidData(
            "pin_code only applies to users".to_string(),
        ));

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["kind"], "invalid_data");
        assert_eq!(body["error"], "Invalid data: pin_code only applies to users");
    }

    #[test]
    fn test_other_errors_are_internal() {
        let error = AppError(anyhow::anyhow!("boom"));

        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
