//! Image extraction and review workflow handlers.

use super::client::ClientIp;
use super::types::{DeleteNumberQuery, DetailResponse, ExtractImageRequest, StagedNumbersResponse};
use super::AppState;
use crate::error::LedgerError;
use crate::extract::decode_image;
use axum::{
    extract::{Query, State},
    Json,
};
use std::collections::HashMap;
use tracing::info;

/// Extract numbers from a base64 image and stage them for the caller.
pub async fn upload_base64_image(
    State(state): State<AppState>,
    client: ClientIp,
    Json(request): Json<ExtractImageRequest>,
) -> Result<Json<StagedNumbersResponse>, LedgerError> {
    let image = decode_image(&request.image_base64)?;
    info!(client_ip = %client, bytes = image.len(), "Image received for extraction");

    let numbers = state
        .extractor
        .extract(&image, request.file_name.as_deref())
        .await?;

    let numbers = state.staging.stage(&client.0, numbers).await?;

    Ok(Json(StagedNumbersResponse {
        detail: "Phone numbers extracted for review.".to_string(),
        numbers,
    }))
}

/// The caller's staged numbers, keyed by its address.
pub async fn review_numbers(
    State(state): State<AppState>,
    client: ClientIp,
) -> Result<Json<HashMap<String, Vec<String>>>, LedgerError> {
    let numbers = state.staging.review(&client.0).await?;
    Ok(Json(HashMap::from([(client.0, numbers)])))
}

/// Promote the caller's staged numbers into the record store.
pub async fn confirm_numbers(
    State(state): State<AppState>,
    client: ClientIp,
) -> Result<Json<DetailResponse>, LedgerError> {
    let outcome = state.staging.confirm(&client.0, &state.records).await?;

    info!(
        client_ip = %client,
        added = outcome.added.len(),
        skipped = outcome.skipped.len(),
        "Review confirmed"
    );

    Ok(Json(DetailResponse::new("Phone numbers confirmed and saved.")))
}

/// Replace the caller's staged list.
pub async fn edit_numbers(
    State(state): State<AppState>,
    client: ClientIp,
    Json(numbers): Json<Vec<String>>,
) -> Result<Json<StagedNumbersResponse>, LedgerError> {
    let numbers = state.staging.edit(&client.0, &numbers).await?;

    Ok(Json(StagedNumbersResponse {
        detail: "Phone numbers updated for review.".to_string(),
        numbers,
    }))
}

/// Remove one number from the caller's staged list.
pub async fn delete_number(
    State(state): State<AppState>,
    client: ClientIp,
    Query(query): Query<DeleteNumberQuery>,
) -> Result<Json<StagedNumbersResponse>, LedgerError> {
    let numbers = state
        .staging
        .delete_one(&client.0, &query.number_to_delete)
        .await?;

    Ok(Json(StagedNumbersResponse {
        detail: format!(
            "Phone number {} deleted from review.",
            query.number_to_delete
        ),
        numbers,
    }))
}
