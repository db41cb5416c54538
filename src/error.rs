use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{FormRejection, JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use std::num::ParseIntError;

pub type StudentsResult<T> = Result<T, StudentsError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StudentsError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error creating database schema"))]
    CreateSchema { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse env var `{}` as a number", name))]
    ParseNumber {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("Invalid JSON body: {}", source.body_text()))]
    InvalidJsonBody { source: JsonRejection },
    #[snafu(display("Invalid form body: {}", source.body_text()))]
    InvalidFormBody { source: FormRejection },
    #[snafu(display("Invalid multipart body: {}", source.body_text()))]
    InvalidMultipartBody { source: MultipartRejection },
    #[snafu(display("Error reading multipart field: {}", source.body_text()))]
    Multipart { source: MultipartError },
    #[snafu(display("Missing field `{}`", field))]
    MissingField { field: &'static str },
    #[snafu(display("Unable to parse age {:?}", original))]
    ParseAge {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display("Field `{}` must not be empty", field))]
    EmptyField { field: &'static str },
    #[snafu(display("Resource not found"))]
    InvalidStudentId { source: PathRejection },
    #[snafu(display("Student not found"))]
    MissingStudent { id: i64 },
    #[snafu(display("Resource not found"))]
    UnknownRoute,
}

#[derive(Serialize)]
struct ErrorMessage {
    message: String,
}

/// Body rejections are all bad input, except a body over the size limit.
const fn keep_too_large(status: StatusCode) -> StatusCode {
    if status.as_u16() == StatusCode::PAYLOAD_TOO_LARGE.as_u16() {
        status
    } else {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for StudentsError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        let status_code = match &self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::CreateSchema { .. } => ISE,
            Self::MakeQuery { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParseNumber { .. } => ISE,
            Self::InvalidJsonBody { source } => keep_too_large(source.status()),
            Self::InvalidFormBody { source } => keep_too_large(source.status()),
            Self::InvalidMultipartBody { source } => source.status(),
            Self::Multipart { source } => source.status(),
            Self::MissingField { .. } | Self::ParseAge { .. } => BI,
            Self::EmptyField { .. } => BI,
            Self::InvalidStudentId { .. } => NF,
            Self::MissingStudent { .. } => NF,
            Self::UnknownRoute => NF,
        };

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            warn!(?self, "Rejected request");
        }

        (
            status_code,
            Json(ErrorMessage {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
