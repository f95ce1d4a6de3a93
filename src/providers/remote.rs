use super::coingecko::CoinGeckoClient;
use super::cryptocompare::CryptoCompareClient;
use crate::core::config::AppConfig;
use crate::core::currency::{Currency, CurrencyDetail};
use crate::core::error::Result;
use crate::core::gateway::{LivePrices, MarketGateway};
use async_trait::async_trait;

/// Gateway backed by the two public price APIs: CoinGecko for the coin
/// list and details, CryptoCompare for live prices.
pub struct RemoteGateway {
    coins: CoinGeckoClient,
    ticker: CryptoCompareClient,
}

impl RemoteGateway {
    pub fn new(coins: CoinGeckoClient, ticker: CryptoCompareClient) -> Self {
        Self { coins, ticker }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            CoinGeckoClient::new(
                &config.providers.coingecko.base_url,
                config.max_currencies,
            ),
            CryptoCompareClient::new(&config.providers.cryptocompare.base_url),
        )
    }
}

#[async_trait]
impl MarketGateway for RemoteGateway {
    async fn list_currencies(&self) -> Result<Vec<Currency>> {
        self.coins.list_currencies().await
    }

    async fn get_details(&self, id: &str) -> Result<CurrencyDetail> {
        self.coins.get_details(id).await
    }

    async fn get_live_prices(&self, symbols: &[String]) -> Result<LivePrices> {
        self.ticker.get_live_prices(symbols).await
    }
}
