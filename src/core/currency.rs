//! Currency data model shared by the gateway, the store and the renderer.

use serde::{Deserialize, Serialize};

/// An entry from the currency list. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

impl Currency {
    pub fn new(id: &str, symbol: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
        }
    }
}

/// Spot price in the three currencies shown in a detail panel. Upstream
/// omits a quote for some thinly traded coins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentPrice {
    pub usd: Option<f64>,
    pub eur: Option<f64>,
    pub ils: Option<f64>,
}

/// Per-currency detail shown in a card's "More Info" panel.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyDetail {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub current_price: CurrentPrice,
}
