//! Error types for the phone ledger.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gemini_client::GeminiError;
use phone_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Ledger error types.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid number {0}")]
    InvalidNumberFormat(String),

    #[error("Phone number already exists.")]
    DuplicateNumber(String),

    #[error("Phone number not found.")]
    NotFound(String),

    #[error("No phone numbers found for review.")]
    NoPendingReview(String),

    #[error("Invalid Base64 image data: {0}")]
    InvalidImageEncoding(String),

    #[error("Failed to parse phone numbers from response.")]
    ExtractionResponseUnparseable(String),

    #[error("Failed to extract phone numbers: {0}")]
    CollaboratorFailure(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub code: String,
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            LedgerError::InvalidNumberFormat(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_NUMBER_FORMAT")
            }
            LedgerError::DuplicateNumber(_) => (StatusCode::BAD_REQUEST, "DUPLICATE_NUMBER"),
            LedgerError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            LedgerError::NoPendingReview(_) => (StatusCode::NOT_FOUND, "NO_PENDING_REVIEW"),
            LedgerError::InvalidImageEncoding(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_IMAGE_ENCODING")
            }
            LedgerError::ExtractionResponseUnparseable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "EXTRACTION_RESPONSE_UNPARSEABLE",
            ),
            LedgerError::CollaboratorFailure(_) => (StatusCode::BAD_GATEWAY, "COLLABORATOR_FAILURE"),
            LedgerError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            LedgerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            detail: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidNumberFormat(n) => LedgerError::InvalidNumberFormat(n),
            StoreError::DuplicateNumber(n) => LedgerError::DuplicateNumber(n),
            StoreError::NotFound(key) => LedgerError::NotFound(key),
            StoreError::NoPendingReview(client) => LedgerError::NoPendingReview(client),
            StoreError::Io(e) => LedgerError::Storage(e.to_string()),
            StoreError::Serialization(e) => {
                LedgerError::Storage(format!("JSON serialization error: {}", e))
            }
        }
    }
}

impl From<GeminiError> for LedgerError {
    fn from(e: GeminiError) -> Self {
        LedgerError::CollaboratorFailure(e.to_string())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(e: std::io::Error) -> Self {
        LedgerError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_keep_their_meaning() {
        assert!(matches!(
            LedgerError::from(StoreError::DuplicateNumber("123-456-7890".into())),
            LedgerError::DuplicateNumber(_)
        ));
        assert!(matches!(
            LedgerError::from(StoreError::NoPendingReview("10.0.0.1".into())),
            LedgerError::NoPendingReview(_)
        ));
        assert!(matches!(
            LedgerError::from(StoreError::Io(std::io::Error::other("disk full"))),
            LedgerError::Storage(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (LedgerError::InvalidNumberFormat("12345".into()), StatusCode::BAD_REQUEST),
            (LedgerError::DuplicateNumber("x".into()), StatusCode::BAD_REQUEST),
            (LedgerError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (LedgerError::NoPendingReview("x".into()), StatusCode::NOT_FOUND),
            (LedgerError::InvalidImageEncoding("x".into()), StatusCode::BAD_REQUEST),
            (
                LedgerError::ExtractionResponseUnparseable("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (LedgerError::CollaboratorFailure("x".into()), StatusCode::BAD_GATEWAY),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            LedgerError::InvalidNumberFormat("12345".into()).to_string(),
            "Invalid number 12345"
        );
        assert_eq!(
            LedgerError::DuplicateNumber("123-456-7890".into()).to_string(),
            "Phone number already exists."
        );
    }
}
