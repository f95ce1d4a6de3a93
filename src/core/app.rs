//! Application state and the user actions that drive it.

use super::config::AppConfig;
use super::currency::CurrencyDetail;
use super::error::GatewayError;
use super::gateway::MarketGateway;
use super::poller::PricePoller;
use super::route::Route;
use super::search;
use super::selection::{SelectionStore, Toggle};
use super::view::{self, Card, Page, PollerCommand};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Contents of an expanded "More Info" panel.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailPanel {
    Loaded(CurrencyDetail),
    Failed(String),
}

/// Owns everything the page needs: the selection, the current route and
/// page, open detail panels, the search query and the price poller.
pub struct App {
    gateway: Arc<dyn MarketGateway>,
    store: SelectionStore,
    poller: PricePoller,
    page: Page,
    query: String,
    panels: BTreeMap<String, DetailPanel>,
    pending_replacement: Option<String>,
}

impl App {
    /// Loads the currency list and shows the default route. A failed load
    /// is returned to the caller and nothing else is set up.
    pub async fn init(gateway: Arc<dyn MarketGateway>, config: &AppConfig) -> Result<Self, GatewayError> {
        let currencies = gateway.list_currencies().await?;
        info!(count = currencies.len(), "Loaded currency list");

        let poller = PricePoller::new(
            Arc::clone(&gateway),
            config.poll_interval(),
            config.series_capacity,
        );
        let store = SelectionStore::new(currencies);
        let page = view::render(Route::default(), store.all(), store.selected());

        Ok(Self {
            gateway,
            store,
            poller,
            page,
            query: String::new(),
            panels: BTreeMap::new(),
            pending_replacement: None,
        })
    }

    pub fn route(&self) -> Route {
        self.page.route
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn poller(&self) -> &PricePoller {
        &self.poller
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn panel(&self, id: &str) -> Option<&DetailPanel> {
        self.panels.get(id)
    }

    /// Id waiting for the user to pick which selected entry it replaces.
    pub fn pending_replacement(&self) -> Option<&str> {
        self.pending_replacement.as_deref()
    }

    /// Cards on the current page that match the search query.
    pub fn visible_cards(&self) -> Vec<&Card> {
        search::filter_cards(self.page.cards(), &self.query)
    }

    /// Shows the route named by `fragment`. Unknown fragments leave the
    /// current view untouched and return `false`.
    pub fn navigate(&mut self, fragment: &str) -> bool {
        let Some(route) = Route::from_fragment(fragment) else {
            debug!(%fragment, "Ignoring unknown route");
            return false;
        };
        info!(%route, "Navigating");
        self.page = view::render(route, self.store.all(), self.store.selected());
        match &self.page.poller {
            PollerCommand::Start(symbols) => self.poller.start(symbols),
            PollerCommand::Stop => self.poller.stop(),
        }
        true
    }

    /// Re-renders after a selection change. A running poller keeps its
    /// symbol snapshot; it only stops when the page no longer needs it.
    fn refresh(&mut self) {
        self.page = view::render(self.page.route, self.store.all(), self.store.selected());
        match &self.page.poller {
            PollerCommand::Start(symbols) if !self.poller.is_running() => {
                self.poller.start(symbols)
            }
            PollerCommand::Start(_) => {}
            PollerCommand::Stop => self.poller.stop(),
        }
    }

    /// Adds or removes `id` from the report. When the report is full the
    /// id is held as a pending replacement until [`App::replace`] or
    /// [`App::cancel_replacement`].
    pub fn toggle(&mut self, id: &str) -> Toggle {
        let outcome = self.store.toggle(id);
        match outcome {
            Toggle::Added | Toggle::Removed => {
                self.pending_replacement = None;
                self.refresh();
            }
            Toggle::Full => self.pending_replacement = Some(id.to_string()),
            Toggle::Unknown => warn!(%id, "Unknown currency"),
        }
        outcome
    }

    /// Resolves the replacement dialog by swapping `old_id` for the pending
    /// id. Without a pending id, `new_id` is used directly.
    pub fn replace(&mut self, old_id: &str, new_id: Option<&str>) -> bool {
        let Some(new_id) = new_id
            .map(str::to_string)
            .or_else(|| self.pending_replacement.clone())
        else {
            debug!("No replacement pending");
            return false;
        };
        self.pending_replacement = None;

        let replaced = self.store.replace(old_id, &new_id);
        if replaced {
            self.refresh();
        }
        replaced
    }

    pub fn cancel_replacement(&mut self) {
        self.pending_replacement = None;
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_string();
    }

    /// Collapses an open detail panel, or opens it and fetches the detail.
    /// A failed fetch is shown inside the panel.
    #[instrument(skip(self))]
    pub async fn toggle_info(&mut self, id: &str) -> Option<&DetailPanel> {
        if self.panels.remove(id).is_some() {
            debug!("Collapsed detail panel");
            return None;
        }
        if self.store.find(id).is_none() {
            warn!("Unknown currency");
            return None;
        }

        let panel = fetch_panel(self.gateway.as_ref(), id).await;
        self.panels.insert(id.to_string(), panel);
        self.panels.get(id)
    }

    /// Toggles several detail panels at once. Open panels collapse, the
    /// rest are fetched concurrently. Repeated ids count once.
    pub async fn toggle_info_many(&mut self, ids: &[String]) {
        let mut seen = HashSet::new();
        let mut to_open: Vec<&String> = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            if self.panels.remove(id.as_str()).is_some() {
                debug!(%id, "Collapsed detail panel");
            } else if self.store.find(id).is_some() {
                to_open.push(id);
            } else {
                warn!(%id, "Unknown currency");
            }
        }

        let gateway = self.gateway.as_ref();
        let panels = futures::future::join_all(
            to_open
                .iter()
                .map(|id| async move { ((*id).clone(), fetch_panel(gateway, id).await) }),
        )
        .await;
        self.panels.extend(panels);
    }

    pub fn shutdown(&mut self) {
        self.poller.stop();
    }
}

async fn fetch_panel(gateway: &dyn MarketGateway, id: &str) -> DetailPanel {
    match gateway.get_details(id).await {
        Ok(detail) => DetailPanel::Loaded(detail),
        Err(e) => {
            warn!(%id, error = %e, "Failed to load currency details");
            DetailPanel::Failed(e.to_string())
        }
    }
}
