//! API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to extract phone numbers from an image.
#[derive(Debug, Deserialize)]
pub struct ExtractImageRequest {
    /// Base64 image bytes, optionally as a `data:` URL
    pub image_base64: String,

    /// Original file name, used for the scratch file and MIME type
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Query for the bulk calculations endpoint.
#[derive(Debug, Deserialize)]
pub struct CalculationsQuery {
    pub has_redeem_value: bool,
    pub number_of_points: i64,
}

/// Query for removing one staged number.
#[derive(Debug, Deserialize)]
pub struct DeleteNumberQuery {
    pub number_to_delete: String,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Acknowledgement carrying the client's current staged list.
#[derive(Debug, Serialize)]
pub struct StagedNumbersResponse {
    pub detail: String,
    pub numbers: Vec<String>,
}

/// Result of a number search.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub id: Uuid,
    /// Address of the client that asked
    pub client_ip: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub record_count: usize,
    pub pending_reviews: usize,
}
