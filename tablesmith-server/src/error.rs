//! Server error types with HTTP status code mapping

use crate::datafiles::DataFileError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tablesmith_store::StoreError;
use thiserror::Error;

/// Server error type wrapping store and data file errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Table store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Data file error
    #[error(transparent)]
    Data(#[from] DataFileError),

    /// Generic bad request error
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ServerError {
    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ServerError::BadRequest(msg.into())
    }

    /// Whether this error has no single-table/single-file scope and must
    /// abort a bootstrap run
    pub fn is_fatal(&self) -> bool {
        matches!(self, ServerError::Store(StoreError::Unreachable(_)))
    }

    /// Map error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Store(StoreError::Unreachable(_)) => StatusCode::BAD_GATEWAY,
            ServerError::Store(StoreError::TableNotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Store(StoreError::InvalidSchema(_)) => StatusCode::BAD_REQUEST,
            ServerError::Store(StoreError::InvalidRecord(_)) => StatusCode::BAD_REQUEST,
            ServerError::Store(StoreError::Sdk(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Data(DataFileError::UnknownFormat(_)) => StatusCode::BAD_REQUEST,
            ServerError::Data(DataFileError::Read { .. }) => StatusCode::BAD_REQUEST,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// HTTP status code
    pub status: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_gateway_and_not_found() {
        let err: ServerError = StoreError::unreachable("refused").into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err: ServerError = StoreError::table_not_found("users").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn data_file_errors_are_client_errors() {
        let err: ServerError = DataFileError::UnknownFormat("x.parquet".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
