use super::util::{decode, get_text};
use crate::core::error::{GatewayError, Result};
use crate::core::gateway::{LivePrices, QUOTE_CURRENCY};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Batched live prices from the CryptoCompare `pricemulti` endpoint.
pub struct CryptoCompareClient {
    base_url: String,
}

/// Shape of an error body. CryptoCompare reports errors with HTTP 200.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(rename = "Message")]
    message: String,
}

impl CryptoCompareClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Upper-cased, de-duplicated symbols joined by commas, in input order.
    fn fsyms(symbols: &[String]) -> String {
        let mut unique: Vec<String> = Vec::with_capacity(symbols.len());
        for symbol in symbols.iter().map(|s| s.trim().to_uppercase()) {
            if !symbol.is_empty() && !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }
        unique.join(",")
    }

    #[instrument(name = "CryptoComparePrices", skip(self))]
    pub async fn get_live_prices(&self, symbols: &[String]) -> Result<LivePrices> {
        let fsyms = Self::fsyms(symbols);
        if fsyms.is_empty() {
            return Ok(LivePrices::new());
        }

        let endpoint = format!("{}/pricemulti", self.base_url);
        let mut request_url = Url::parse(&endpoint).map_err(|e| GatewayError::Url {
            url: endpoint.clone(),
            message: e.to_string(),
        })?;
        request_url
            .query_pairs_mut()
            .append_pair("fsyms", &fsyms)
            .append_pair("tsyms", QUOTE_CURRENCY);
        let url = request_url.to_string();
        debug!("Requesting live prices from {}", url);

        let text = get_text(&url).await?;
        let body: Value = decode(&url, &text)?;
        if body.get("Response").and_then(Value::as_str) == Some("Error") {
            let error: ErrorResponse = decode(&url, &text)?;
            return Err(GatewayError::Api {
                url,
                message: error.message,
            });
        }

        let quotes: HashMap<String, HashMap<String, f64>> = decode(&url, &text)?;
        Ok(quotes
            .into_iter()
            .filter_map(|(symbol, quote)| {
                quote
                    .get(QUOTE_CURRENCY)
                    .map(|price| (symbol.to_uppercase(), *price))
            })
            .collect())
    }
}
