use axum::Json;

use pgcdt_core::person::Person;

use crate::mock_data::sample_person;

/// Returns the sample person (GET /persons).
pub async fn list_persons() -> Json<Vec<Person>> {
    Json(vec![sample_person()])
}
