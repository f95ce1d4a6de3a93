//! Error kinds surfaced by the remote data gateway.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Request error: {source} for URL: {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {status} for URL: {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Invalid request URL {url}: {message}")]
    Url { url: String, message: String },

    #[error("API error from {url}: {message}")]
    Api { url: String, message: String },

    #[error("Failed to parse JSON response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, GatewayError>;
