//! Phone number record handlers.

use super::client::ClientIp;
use super::types::{CalculationsQuery, DetailResponse, HealthResponse, SearchResponse};
use super::AppState;
use crate::error::LedgerError;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use phone_store::{NewPhoneNumber, PhoneRecord, PhoneUpdate};
use tracing::info;
use uuid::Uuid;

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        record_count: state.records.len().await,
        pending_reviews: state.staging.pending_clients().await,
    })
}

/// Create a phone number record.
pub async fn create_phone_number(
    State(state): State<AppState>,
    client: ClientIp,
    Json(candidate): Json<NewPhoneNumber>,
) -> Result<Json<PhoneRecord>, LedgerError> {
    info!(client_ip = %client, phone_number = %candidate.number, "Create request received");

    let record = state.records.create(candidate, &client.0).await?;
    Ok(Json(record))
}

/// List every record.
pub async fn list_phone_numbers(State(state): State<AppState>) -> Json<Vec<PhoneRecord>> {
    Json(state.records.list().await)
}

pub async fn get_phone_number(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PhoneRecord>, LedgerError> {
    Ok(Json(state.records.get(id).await?))
}

/// Look up a record id by its exact number string.
pub async fn search_phone_number(
    State(state): State<AppState>,
    client: ClientIp,
    Path(number): Path<String>,
) -> Result<Json<SearchResponse>, LedgerError> {
    let id = state.records.search_by_number(&number).await?;
    info!(client_ip = %client, phone_id = %id, "Phone number found");

    Ok(Json(SearchResponse {
        id,
        client_ip: client.0,
    }))
}

/// Partially update a record, logging usage events against the caller.
pub async fn update_phone_number(
    State(state): State<AppState>,
    client: ClientIp,
    Path(id): Path<Uuid>,
    Json(update): Json<PhoneUpdate>,
) -> Result<Json<PhoneRecord>, LedgerError> {
    info!(client_ip = %client, phone_id = %id, "Update request received");

    let record = state.records.update(id, update, &client.0).await?;
    Ok(Json(record))
}

pub async fn delete_phone_number(
    State(state): State<AppState>,
    client: ClientIp,
    Path(id): Path<Uuid>,
) -> Result<Json<DetailResponse>, LedgerError> {
    state.records.delete(id).await?;
    info!(client_ip = %client, phone_id = %id, "Phone number deleted");

    Ok(Json(DetailResponse::new("Phone number deleted.")))
}

/// Overwrite the redeem flag and points on every record.
pub async fn upload_calculations(
    State(state): State<AppState>,
    client: ClientIp,
    Query(query): Query<CalculationsQuery>,
) -> Result<Json<DetailResponse>, LedgerError> {
    let count = state
        .records
        .bulk_annotate(query.has_redeem_value, query.number_of_points)
        .await?;

    info!(
        client_ip = %client,
        count,
        has_redeem_value = query.has_redeem_value,
        number_of_points = query.number_of_points,
        "Calculations updated"
    );

    Ok(Json(DetailResponse::new(
        "Calculations updated for all phone numbers.",
    )))
}
