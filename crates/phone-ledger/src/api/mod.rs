//! HTTP API for the phone ledger.

mod client;
mod handlers;
mod middleware;
mod review;
mod types;

pub use client::ClientIp;
pub use handlers::*;
pub use middleware::logging_middleware;
pub use review::*;
pub use types::*;

use crate::extract::PhoneExtractor;
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use phone_store::{RecordStore, StagingStore};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Default request body limit; base64 images are large.
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Phone number records
    pub records: Arc<RecordStore>,
    /// Numbers awaiting review, per client
    pub staging: Arc<StagingStore>,
    /// Image extraction workflow
    pub extractor: Arc<PhoneExtractor>,
}

impl AppState {
    /// Create new application state.
    pub fn new(records: RecordStore, staging: StagingStore, extractor: PhoneExtractor) -> Self {
        Self {
            records: Arc::new(records),
            staging: Arc::new(staging),
            extractor: Arc::new(extractor),
        }
    }
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

/// Create the API router with a custom request body limit.
pub fn create_router_with_body_limit(state: AppState, body_limit: usize) -> Router {
    let router = Router::new().route("/health", get(handlers::health));

    let routes: Vec<(&str, MethodRouter<AppState>)> = vec![
        (
            "/phone_numbers",
            post(handlers::create_phone_number).get(handlers::list_phone_numbers),
        ),
        (
            "/phone_numbers/search_phone_number/:number",
            get(handlers::search_phone_number),
        ),
        (
            "/phone_numbers/upload_calculations",
            post(handlers::upload_calculations),
        ),
        (
            "/phone_numbers/:id",
            get(handlers::get_phone_number)
                .put(handlers::update_phone_number)
                .delete(handlers::delete_phone_number),
        ),
        ("/extract/upload_base64_image", post(review::upload_base64_image)),
        ("/extract/review_numbers", get(review::review_numbers)),
        ("/extract/confirm_numbers", post(review::confirm_numbers)),
        ("/extract/edit_numbers", put(review::edit_numbers)),
        ("/extract/delete_number", delete(review::delete_number)),
    ];

    // Clients call these both with and without the trailing slash
    let router = routes
        .into_iter()
        .fold(router, |router, (path, method_router)| {
            router
                .route(path, method_router.clone())
                .route(&format!("{path}/"), method_router)
        });

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
