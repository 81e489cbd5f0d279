//! Requester identity.

use axum::{
    async_trait,
    extract::{rejection::ExtensionRejection, ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use std::net::SocketAddr;

/// The requesting peer's IP address, used as its identity.
///
/// Staged numbers and history entries are keyed by this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = ExtensionRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ConnectInfo(addr) = ConnectInfo::<SocketAddr>::from_request_parts(parts, state).await?;
        Ok(ClientIp(addr.ip().to_string()))
    }
}

impl std::fmt::Display for ClientIp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
