use super::util::get_json;
use crate::core::currency::{Currency, CurrencyDetail, CurrentPrice};
use crate::core::error::Result;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Coin list and per-coin detail lookups against the CoinGecko API.
pub struct CoinGeckoClient {
    base_url: String,
    max_currencies: usize,
}

#[derive(Debug, Deserialize)]
struct CoinListItem {
    id: String,
    symbol: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CoinResponse {
    #[serde(default)]
    id: Option<String>,
    name: String,
    image: CoinImage,
    market_data: MarketData,
}

#[derive(Debug, Deserialize)]
struct CoinImage {
    small: String,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    #[serde(default)]
    current_price: CurrentPrice,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str, max_currencies: usize) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            max_currencies,
        }
    }

    /// Lists coins, keeping only the first `max_currencies` entries.
    #[instrument(name = "CoinGeckoList", skip(self))]
    pub async fn list_currencies(&self) -> Result<Vec<Currency>> {
        let url = format!("{}/coins/list", self.base_url);
        debug!("Requesting currency list from {}", url);

        let items: Vec<CoinListItem> = get_json(&url).await?;
        debug!(total = items.len(), "Received currency list");

        Ok(items
            .into_iter()
            .take(self.max_currencies)
            .map(|item| Currency {
                id: item.id,
                symbol: item.symbol,
                name: item.name,
            })
            .collect())
    }

    #[instrument(name = "CoinGeckoDetails", skip(self), fields(id = %id))]
    pub async fn get_details(&self, id: &str) -> Result<CurrencyDetail> {
        let url = format!("{}/coins/{}", self.base_url, id);
        debug!("Requesting currency details from {}", url);

        let coin: CoinResponse = get_json(&url).await?;
        Ok(CurrencyDetail {
            id: coin.id.unwrap_or_else(|| id.to_string()),
            name: coin.name,
            image_url: coin.image.small,
            current_price: coin.market_data.current_price,
        })
    }
}
