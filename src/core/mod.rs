//! Core state, abstractions and update logic

pub mod app;
pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod gateway;
pub mod log;
pub mod poller;
pub mod route;
pub mod search;
pub mod selection;
pub mod view;

#[cfg(test)]
pub(crate) mod mock;

// Re-export main types for cleaner imports
pub use currency::{Currency, CurrencyDetail, CurrentPrice};
pub use error::GatewayError;
pub use gateway::{LivePrices, MarketGateway};
pub use route::Route;
