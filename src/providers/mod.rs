pub mod caching;
pub mod coingecko;
pub mod cryptocompare;
pub mod remote;
pub(crate) mod util;

pub use caching::CachingGateway;
pub use remote::RemoteGateway;
