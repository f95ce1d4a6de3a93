use crate::core::error::{GatewayError, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

const USER_AGENT: &str = concat!("coinwatch/", env!("CARGO_PKG_VERSION"));

/// Fetches `url` and returns the raw body of a successful response.
pub(crate) async fn get_text(url: &str) -> Result<String> {
    let http = |source| GatewayError::Http {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(http)?;
    let response = client.get(url).send().await.map_err(http)?;
    debug!(status = %response.status(), %url, "Received response");

    if !response.status().is_success() {
        return Err(GatewayError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    response.text().await.map_err(http)
}

/// Fetches `url` and decodes the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T> {
    let text = get_text(url).await?;
    decode(url, &text)
}

pub(crate) fn decode<T: DeserializeOwned>(url: &str, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|source| GatewayError::Decode {
        url: url.to_string(),
        source,
    })
}
