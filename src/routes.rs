use crate::{
    error::{StudentsError, StudentsResult},
    routes::students::{delete_student, get_student, get_students, post_student, put_student},
    state::StudentsState,
};
use axum::{
    Router,
    http::header,
    response::IntoResponse,
    routing::get,
};
use tower_http::limit::RequestBodyLimitLayer;

pub mod students;

const MAX_BODY_BYTES: usize = 16 * 1024;

/// OpenAPI 3 description of every route below.
const API_DESCRIPTION: &str = include_str!("../api/swagger.json");

pub fn router(state: StudentsState) -> Router {
    Router::new()
        .route("/students/", get(get_students).post(post_student))
        .route("/students", get(get_students).post(post_student))
        .route(
            "/students/{id}",
            get(get_student).put(put_student).delete(delete_student),
        )
        .route("/swagger.json", get(get_api_description))
        .fallback(unknown_route)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn get_api_description() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], API_DESCRIPTION)
}

async fn unknown_route() -> StudentsResult<()> {
    Err(StudentsError::UnknownRoute)
}
