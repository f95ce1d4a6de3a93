//! Remote data gateway abstraction

use super::currency::{Currency, CurrencyDetail};
use super::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Target currency for live ticker prices.
pub const QUOTE_CURRENCY: &str = "USD";

/// Latest USD price keyed by upper-case symbol.
pub type LivePrices = HashMap<String, f64>;

#[async_trait]
pub trait MarketGateway: Send + Sync {
    /// Lists known currencies, truncated to the configured cap.
    async fn list_currencies(&self) -> Result<Vec<Currency>>;

    async fn get_details(&self, id: &str) -> Result<CurrencyDetail>;

    /// Fetches the latest price for each symbol in a single batched request.
    /// Symbols missing from the upstream response are absent from the map.
    async fn get_live_prices(&self, symbols: &[String]) -> Result<LivePrices>;
}
