use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        contacts::{create_contacts, list_contacts},
        explain::explain_query,
        health::livez,
        persons::list_persons,
        tagged_contacts::{create_tagged_contacts, list_tagged_contacts, list_tagged_numbers},
        users::{create_users, list_users},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/persons", get(list_persons))
        .route("/contacts", get(list_contacts).post(create_contacts))
        .route(
            "/tagged-contacts",
            get(list_tagged_contacts).post(create_tagged_contacts),
        )
        .route("/tagged-contacts/numbers", get(list_tagged_numbers))
        .route("/users", get(list_users).post(create_users))
        .route("/explain", get(explain_query))
        .route("/livez", get(livez))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .with_state(state)
}
