//! Live price polling into bounded chart series.

use super::gateway::{LivePrices, MarketGateway};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Number of points kept per series.
pub const SERIES_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub time: DateTime<Utc>,
    pub price: f64,
}

/// Most recent prices of one symbol, oldest first.
#[derive(Debug, Clone)]
pub struct ChartSeries {
    symbol: String,
    points: VecDeque<PricePoint>,
    capacity: usize,
}

impl ChartSeries {
    pub fn new(symbol: &str, capacity: usize) -> Self {
        Self {
            symbol: symbol.to_string(),
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn push(&mut self, point: PricePoint) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn points(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One series per symbol of a poller run.
#[derive(Debug, Clone, Default)]
pub struct PriceChart {
    series: Vec<ChartSeries>,
}

impl PriceChart {
    pub fn new(symbols: &[String], capacity: usize) -> Self {
        Self {
            series: symbols
                .iter()
                .map(|s| ChartSeries::new(s, capacity))
                .collect(),
        }
    }

    pub fn series(&self) -> &[ChartSeries] {
        &self.series
    }

    pub fn get(&self, symbol: &str) -> Option<&ChartSeries> {
        self.series.iter().find(|s| s.symbol == symbol)
    }

    /// Appends a point to every series with a price in `prices`. Symbols
    /// missing from the response are left as they are. Returns the number
    /// of series that received a point.
    pub fn record(&mut self, prices: &LivePrices, time: DateTime<Utc>) -> usize {
        let mut appended = 0;
        for series in &mut self.series {
            match prices.get(&series.symbol) {
                Some(price) => {
                    series.push(PricePoint {
                        time,
                        price: *price,
                    });
                    appended += 1;
                }
                None => debug!(symbol = %series.symbol, "No price in tick"),
            }
        }
        appended
    }
}

/// Periodically fetches live prices for a fixed symbol snapshot.
///
/// The poller is either idle or running one background task. Starting a
/// run always cancels the previous one first, and the symbols are captured
/// at start: later selection changes only take effect on the next start.
pub struct PricePoller {
    gateway: Arc<dyn MarketGateway>,
    interval: Duration,
    capacity: usize,
    symbols: Vec<String>,
    chart: Arc<Mutex<PriceChart>>,
    ticks: Arc<watch::Sender<u64>>,
    task: Option<JoinHandle<()>>,
}

impl PricePoller {
    /// A zero interval or capacity falls back to the default.
    pub fn new(gateway: Arc<dyn MarketGateway>, interval: Duration, capacity: usize) -> Self {
        let interval = if interval.is_zero() {
            warn!("Poll interval must be positive, using {:?}", DEFAULT_POLL_INTERVAL);
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        let capacity = if capacity == 0 {
            warn!("Series capacity must be positive, using {}", SERIES_CAPACITY);
            SERIES_CAPACITY
        } else {
            capacity
        };
        let (ticks, _) = watch::channel(0);
        Self {
            gateway,
            interval,
            capacity,
            symbols: Vec::new(),
            chart: Arc::new(Mutex::new(PriceChart::default())),
            ticks: Arc::new(ticks),
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Symbols of the current or last run, upper-cased.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Counts successful ticks across all runs.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.ticks.subscribe()
    }

    pub async fn chart(&self) -> PriceChart {
        self.chart.lock().await.clone()
    }

    /// Starts a new run with a fresh chart. Ticks once immediately, then
    /// every interval. An empty symbol list leaves the poller idle.
    pub fn start(&mut self, symbols: &[String]) {
        self.stop();

        let mut snapshot: Vec<String> = Vec::with_capacity(symbols.len());
        for symbol in symbols.iter().map(|s| s.to_uppercase()) {
            if !snapshot.contains(&symbol) {
                snapshot.push(symbol);
            }
        }
        self.chart = Arc::new(Mutex::new(PriceChart::new(&snapshot, self.capacity)));
        self.symbols = snapshot;

        if self.symbols.is_empty() {
            debug!("No symbols to poll");
            return;
        }
        info!(symbols = ?self.symbols, interval = ?self.interval, "Starting price poller");

        let gateway = Arc::clone(&self.gateway);
        let symbols = self.symbols.clone();
        let chart = Arc::clone(&self.chart);
        let ticks = Arc::clone(&self.ticks);
        let period = self.interval;

        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                run_tick(gateway.as_ref(), &symbols, &chart, &ticks).await;
            }
        }));
    }

    /// Cancels the running task, if any. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Stopped price poller");
        }
    }
}

impl Drop for PricePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_tick(
    gateway: &dyn MarketGateway,
    symbols: &[String],
    chart: &Mutex<PriceChart>,
    ticks: &watch::Sender<u64>,
) {
    match gateway.get_live_prices(symbols).await {
        Ok(prices) => {
            let appended = chart.lock().await.record(&prices, Utc::now());
            debug!(appended, "Recorded price tick");
            ticks.send_modify(|n| *n += 1);
        }
        Err(e) => warn!(error = %e, "Price tick failed, skipping"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::MockGateway;
    use chrono::Duration as ChronoDuration;

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn poller(gateway: &Arc<MockGateway>) -> PricePoller {
        PricePoller::new(
            Arc::clone(gateway) as Arc<dyn MarketGateway>,
            DEFAULT_POLL_INTERVAL,
            SERIES_CAPACITY,
        )
    }

    #[test]
    fn test_series_evicts_oldest_beyond_capacity() {
        let mut chart = PriceChart::new(&symbols(&["BTC", "ETH"]), SERIES_CAPACITY);
        let start = Utc::now();

        for i in 0..51 {
            let prices: LivePrices = [("BTC".to_string(), i as f64), ("ETH".to_string(), 1.0)]
                .into_iter()
                .collect();
            assert_eq!(chart.record(&prices, start + ChronoDuration::seconds(i)), 2);
        }

        for series in chart.series() {
            assert_eq!(series.len(), 50);
        }
        let btc = chart.get("BTC").unwrap();
        let first = btc.points().next().unwrap();
        assert_eq!(first.price, 1.0);
        assert_eq!(first.time, start + ChronoDuration::seconds(1));
        assert_eq!(btc.latest().unwrap().price, 50.0);
    }

    #[test]
    fn test_missing_symbol_is_skipped() {
        let mut chart = PriceChart::new(&symbols(&["BTC", "ETH"]), SERIES_CAPACITY);
        let prices: LivePrices = [("BTC".to_string(), 100.0)].into_iter().collect();

        assert_eq!(chart.record(&prices, Utc::now()), 1);
        assert_eq!(chart.get("BTC").unwrap().len(), 1);
        assert!(chart.get("ETH").unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_five_ticks_fill_both_series() {
        let gateway = Arc::new(MockGateway::with_prices(&[("BTC", 100.0), ("ETH", 10.0)]));
        let mut poller = poller(&gateway);

        poller.start(&symbols(&["btc", "eth"]));
        // Immediate tick plus four interval ticks
        tokio::time::sleep(Duration::from_millis(8_100)).await;
        poller.stop();

        assert_eq!(gateway.price_calls(), 5);
        let chart = poller.chart().await;
        for series in chart.series() {
            assert_eq!(series.len(), 5);
            let times: Vec<_> = series.points().map(|p| p.time).collect();
            assert!(times.windows(2).all(|w| w[0] <= w[1]));
        }
        assert_eq!(*poller.subscribe().borrow(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_ticks() {
        let gateway = Arc::new(MockGateway::with_prices(&[("BTC", 100.0)]));
        let mut poller = poller(&gateway);

        poller.start(&symbols(&["btc"]));
        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert_eq!(gateway.price_calls(), 2);

        poller.stop();
        poller.stop();
        assert!(!poller.is_running());

        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(gateway.price_calls(), 2);
        assert_eq!(poller.chart().await.get("BTC").unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_tick_keeps_timer_alive() {
        let mut gateway = MockGateway::with_prices(&[("BTC", 100.0)]);
        gateway.failing_price_calls.insert(2);
        let gateway = Arc::new(gateway);
        let mut poller = poller(&gateway);

        poller.start(&symbols(&["btc"]));
        tokio::time::sleep(Duration::from_millis(4_100)).await;

        assert!(poller.is_running());
        assert_eq!(gateway.price_calls(), 3);
        assert_eq!(poller.chart().await.get("BTC").unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_run() {
        let gateway = Arc::new(MockGateway::with_prices(&[("BTC", 100.0), ("ETH", 10.0)]));
        let mut poller = poller(&gateway);

        poller.start(&symbols(&["btc"]));
        tokio::time::sleep(Duration::from_millis(100)).await;
        poller.start(&symbols(&["eth", "ETH"]));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(poller.symbols().to_vec(), vec!["ETH".to_string()]);
        let chart = poller.chart().await;
        assert!(chart.get("BTC").is_none());
        assert_eq!(chart.get("ETH").unwrap().len(), 1);
        assert_eq!(gateway.price_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fifty_one_ticks_evict_first_point() {
        let gateway = Arc::new(MockGateway {
            price_step: 1.0,
            ..MockGateway::with_prices(&[("BTC", 100.0), ("ETH", 10.0)])
        });
        let mut poller = poller(&gateway);

        poller.start(&symbols(&["btc", "eth"]));
        // Immediate tick plus fifty interval ticks
        tokio::time::sleep(Duration::from_millis(100_100)).await;
        poller.stop();

        assert_eq!(gateway.price_calls(), 51);
        let chart = poller.chart().await;
        let btc = chart.get("BTC").unwrap();
        let eth = chart.get("ETH").unwrap();
        assert_eq!(btc.len(), 50);
        assert_eq!(eth.len(), 50);
        // Tick n is priced base + (n - 1), so the first tick is gone
        assert_eq!(btc.points().next().unwrap().price, 101.0);
        assert_eq!(btc.latest().unwrap().price, 150.0);
        assert_eq!(eth.points().next().unwrap().price, 11.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_and_capacity_fall_back_to_defaults() {
        let gateway = Arc::new(MockGateway::with_prices(&[("BTC", 100.0)]));
        let mut poller = PricePoller::new(
            Arc::clone(&gateway) as Arc<dyn MarketGateway>,
            Duration::ZERO,
            0,
        );

        poller.start(&symbols(&["btc"]));
        tokio::time::sleep(Duration::from_millis(4_100)).await;

        assert!(poller.is_running());
        assert_eq!(gateway.price_calls(), 3);
        assert_eq!(poller.chart().await.get("BTC").unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_snapshot_stays_idle() {
        let gateway = Arc::new(MockGateway::default());
        let mut poller = poller(&gateway);

        poller.start(&[]);
        assert!(!poller.is_running());
        assert!(poller.chart().await.series().is_empty());
    }
}
