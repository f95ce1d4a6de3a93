use super::currency::{Currency, CurrencyDetail, CurrentPrice};
use super::error::{GatewayError, Result};
use super::gateway::{LivePrices, MarketGateway};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-process gateway for tests. Price calls listed in `failing_price_calls`
/// (1-based) return an error. Call `n` adds `(n - 1) * price_step` to every
/// price.
#[derive(Default)]
pub(crate) struct MockGateway {
    pub currencies: Vec<Currency>,
    pub prices: LivePrices,
    pub failing_price_calls: HashSet<usize>,
    pub price_step: f64,
    pub fail_list: bool,
    pub fail_details: bool,
    pub price_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

pub(crate) fn mock_error() -> GatewayError {
    GatewayError::Status {
        url: "http://mock".to_string(),
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn sample_currencies() -> Vec<Currency> {
    vec![
        Currency::new("bitcoin", "btc", "Bitcoin"),
        Currency::new("ethereum", "eth", "Ethereum"),
        Currency::new("tether", "usdt", "Tether"),
        Currency::new("solana", "sol", "Solana"),
        Currency::new("cardano", "ada", "Cardano"),
        Currency::new("dogecoin", "doge", "Dogecoin"),
    ]
}

impl MockGateway {
    pub fn with_prices(prices: &[(&str, f64)]) -> Self {
        Self {
            currencies: sample_currencies(),
            prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
            ..Default::default()
        }
    }

    pub fn price_calls(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketGateway for MockGateway {
    async fn list_currencies(&self) -> Result<Vec<Currency>> {
        if self.fail_list {
            return Err(mock_error());
        }
        Ok(self.currencies.clone())
    }

    async fn get_details(&self, id: &str) -> Result<CurrencyDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_details {
            return Err(mock_error());
        }
        Ok(CurrencyDetail {
            id: id.to_string(),
            name: id.to_string(),
            image_url: format!("https://img.example/{id}.png"),
            current_price: CurrentPrice {
                usd: Some(1.0),
                eur: Some(0.9),
                ils: Some(3.7),
            },
        })
    }

    async fn get_live_prices(&self, symbols: &[String]) -> Result<LivePrices> {
        let call = self.price_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_price_calls.contains(&call) {
            return Err(mock_error());
        }
        Ok(symbols
            .iter()
            .filter_map(|s| {
                self.prices
                    .get(s)
                    .map(|p| (s.clone(), p + (call - 1) as f64 * self.price_step))
            })
            .collect())
    }
}
