use axum::{
    Json,
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Error fetching documents")]
    Fetch(#[source] anyhow::Error),

    #[error("Error inserting review")]
    Insert(#[source] anyhow::Error),

    #[error("Malformed review payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid path parameter: {0}")]
    BadPath(#[from] PathRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Fetch(ref cause) | ApiError::Insert(ref cause) => {
                // the cause stays in the logs, clients only get the generic message
                error!("{}: {:#}", self, cause);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::BadPath(ref rejection) => rejection.status(),
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
