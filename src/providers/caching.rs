use crate::core::cache::TtlCache;
use crate::core::currency::{Currency, CurrencyDetail};
use crate::core::error::Result;
use crate::core::gateway::{LivePrices, MarketGateway};
use async_trait::async_trait;
use std::time::Duration;

/// Memoizes detail lookups of the wrapped gateway for the cache TTL. The
/// currency list and live prices always go to the inner gateway.
pub struct CachingGateway<T: MarketGateway> {
    inner: T,
    details: TtlCache<CurrencyDetail>,
}

impl<T: MarketGateway> CachingGateway<T> {
    pub fn new(inner: T, ttl: Duration) -> Self {
        Self {
            inner,
            details: TtlCache::new(ttl),
        }
    }
}

#[async_trait]
impl<T: MarketGateway> MarketGateway for CachingGateway<T> {
    async fn list_currencies(&self) -> Result<Vec<Currency>> {
        self.inner.list_currencies().await
    }

    async fn get_details(&self, id: &str) -> Result<CurrencyDetail> {
        self.details
            .get_or_fetch(id, || self.inner.get_details(id))
            .await
    }

    async fn get_live_prices(&self, symbols: &[String]) -> Result<LivePrices> {
        self.inner.get_live_prices(symbols).await
    }
}
