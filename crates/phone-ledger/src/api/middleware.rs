//! Request logging middleware.

use axum::{
    extract::{connect_info::MockConnectInfo, ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use tracing::{debug, error, warn};

/// Log every request with its outcome and latency.
///
/// Server errors log at `error`, client errors at `warn`, the rest at
/// `debug`.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client_ip = peer_ip(&request).unwrap_or_else(|| "unknown".into());
    let start = std::time::Instant::now();

    debug!(%method, %uri, %client_ip, "Request started");

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        error!(%method, %uri, %client_ip, %status, ?duration, "Request failed");
    } else if status.is_client_error() {
        warn!(%method, %uri, %client_ip, %status, ?duration, "Request rejected");
    } else {
        debug!(%method, %uri, %client_ip, %status, ?duration, "Request completed");
    }

    response
}

fn peer_ip(request: &Request) -> Option<String> {
    let extensions = request.extensions();
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .or_else(|| {
            extensions
                .get::<MockConnectInfo<SocketAddr>>()
                .map(|MockConnectInfo(addr)| addr.ip().to_string())
        })
}
