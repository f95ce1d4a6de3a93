//! Maps navigation state and the selection to a page description.

use super::currency::Currency;
use super::route::Route;

pub const EMPTY_REPORT_MESSAGE: &str =
    "No currencies selected yet. Add up to 5 from #currencies to build a report.";

pub const ABOUT_TEXT: &str = "coinwatch lists cryptocurrencies and tracks live prices for up to \
five of them. Coin data comes from CoinGecko, live prices from CryptoCompare.";

/// A currency card. `selected` is derived from the store at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub selected: bool,
}

impl Card {
    fn from_currency(currency: &Currency, selected: bool) -> Self {
        Self {
            id: currency.id.clone(),
            symbol: currency.symbol.to_uppercase(),
            name: currency.name.clone(),
            selected,
        }
    }

    /// Text the search filter matches against.
    pub fn text(&self) -> String {
        format!("{} {}", self.name, self.symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageBody {
    Cards(Vec<Card>),
    Placeholder(&'static str),
    About(&'static str),
}

/// What the poller should do once the page is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerCommand {
    Start(Vec<String>),
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub route: Route,
    pub body: PageBody,
    pub chart_visible: bool,
    pub poller: PollerCommand,
}

impl Page {
    pub fn cards(&self) -> &[Card] {
        match &self.body {
            PageBody::Cards(cards) => cards,
            _ => &[],
        }
    }
}

pub fn render(route: Route, all: &[Currency], selected: &[Currency]) -> Page {
    match route {
        Route::Currencies => {
            let cards = all
                .iter()
                .map(|c| Card::from_currency(c, selected.iter().any(|s| s.id == c.id)))
                .collect();
            Page {
                route,
                body: PageBody::Cards(cards),
                chart_visible: false,
                poller: PollerCommand::Stop,
            }
        }
        Route::Reports if selected.is_empty() => Page {
            route,
            body: PageBody::Placeholder(EMPTY_REPORT_MESSAGE),
            chart_visible: false,
            poller: PollerCommand::Stop,
        },
        Route::Reports => Page {
            route,
            body: PageBody::Cards(
                selected
                    .iter()
                    .map(|c| Card::from_currency(c, true))
                    .collect(),
            ),
            chart_visible: true,
            poller: PollerCommand::Start(selected.iter().map(|c| c.symbol.clone()).collect()),
        },
        Route::About => Page {
            route,
            body: PageBody::About(ABOUT_TEXT),
            chart_visible: false,
            poller: PollerCommand::Stop,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::sample_currencies;

    #[test]
    fn test_currencies_marks_selected_cards() {
        let all = sample_currencies();
        let selected = vec![all[1].clone()];

        let page = render(Route::Currencies, &all, &selected);
        assert_eq!(page.cards().len(), all.len());
        assert!(!page.chart_visible);
        assert_eq!(page.poller, PollerCommand::Stop);

        let flagged: Vec<&str> = page
            .cards()
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(flagged, vec!["ethereum"]);
    }

    #[test]
    fn test_empty_report_shows_placeholder() {
        let page = render(Route::Reports, &sample_currencies(), &[]);
        assert_eq!(page.body, PageBody::Placeholder(EMPTY_REPORT_MESSAGE));
        assert!(!page.chart_visible);
        assert_eq!(page.poller, PollerCommand::Stop);
    }

    #[test]
    fn test_report_starts_poller_for_selection() {
        let all = sample_currencies();
        let selected = vec![all[0].clone(), all[1].clone()];

        let page = render(Route::Reports, &all, &selected);
        assert_eq!(page.cards().len(), 2);
        assert!(page.cards().iter().all(|c| c.selected));
        assert!(page.chart_visible);
        assert_eq!(
            page.poller,
            PollerCommand::Start(vec!["btc".to_string(), "eth".to_string()])
        );
    }

    #[test]
    fn test_about_is_static() {
        let page = render(Route::About, &sample_currencies(), &[]);
        assert_eq!(page.body, PageBody::About(ABOUT_TEXT));
        assert_eq!(page.poller, PollerCommand::Stop);
        assert!(page.cards().is_empty());
    }

    #[test]
    fn test_card_text_is_name_and_symbol() {
        let card = Card::from_currency(&Currency::new("bitcoin", "btc", "Bitcoin"), false);
        assert_eq!(card.text(), "Bitcoin BTC");
    }
}
