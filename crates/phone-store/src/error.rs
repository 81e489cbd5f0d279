//! Store errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid number {0}")]
    InvalidNumberFormat(String),

    #[error("Phone number already exists: {0}")]
    DuplicateNumber(String),

    #[error("Phone number not found: {0}")]
    NotFound(String),

    #[error("No phone numbers pending review for {0}")]
    NoPendingReview(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
