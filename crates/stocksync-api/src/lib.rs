//! StockSync API - REST gateways to the system of record
//!
//! Provides:
//! - An authenticated HTTP client with status classification
//! - Response normalization tolerant of heterogeneous field naming
//! - One gateway per entity kind implementing the core gateway ports
//!
//! ## Modules
//!
//! - [`client`] - HTTP client wrapper (base URL, bearer token, timeouts)
//! - [`normalize`] - Field lookup helpers shared by the per-kind mappings
//! - [`gateway`] - Generic REST gateway and the per-kind aliases
//! - [`branch`], [`user`], [`product`], [`sale`] - Wire mappings per kind

pub mod branch;
pub mod client;
pub mod gateway;
pub mod normalize;
pub mod product;
pub mod sale;
pub mod user;

pub use client::ApiClient;
pub use gateway::{BranchGateway, HttpGateway, ProductGateway, SaleGateway, UserGateway};

use stocksync_core::ports::RemoteError;
use thiserror::Error;

/// Errors that can occur when talking to the REST API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials are missing, invalid or expired (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials are valid but lack permission (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server refused the request on business grounds (400, 409, 422)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<ApiError> for RemoteError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) => RemoteError::Auth(msg),
            ApiError::NotFound(msg) => RemoteError::NotFound(msg),
            ApiError::Conflict(msg) => RemoteError::Conflict(msg),
            ApiError::Status { status, message } => RemoteError::Server { status, message },
            ApiError::NetworkError(e) if e.is_timeout() => RemoteError::Timeout,
            ApiError::NetworkError(e) if e.is_decode() => {
                RemoteError::InvalidResponse(e.to_string())
            }
            ApiError::NetworkError(e) => RemoteError::Network(e.to_string()),
            ApiError::InvalidResponse(msg) => RemoteError::InvalidResponse(msg),
        }
    }
}
