//! Draws the page description and the price chart to terminal text.

use super::ui;
use crate::core::app::{App, DetailPanel};
use crate::core::currency::CurrencyDetail;
use crate::core::error::GatewayError;
use crate::core::poller::{ChartSeries, PriceChart};
use crate::core::route::Route;
use crate::core::selection::SelectionStore;
use crate::core::view::{Card, PageBody};
use comfy_table::{Cell, CellAlignment, Color, Table};

const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Navigation bar with the active route highlighted.
pub fn nav_bar(active: Route) -> String {
    Route::ALL
        .iter()
        .map(|route| {
            let label = format!(" {} ", route.title());
            if *route == active {
                ui::style_text(&label, ui::StyleType::Active)
            } else {
                ui::style_text(&label, ui::StyleType::Subtle)
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn cards_table(cards: &[&Card], app: &App) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Symbol"),
        ui::header_cell("Id"),
        ui::header_cell("Report"),
    ]);

    for card in cards {
        let report = if card.selected {
            Cell::new("✓ Remove").fg(Color::Green)
        } else {
            Cell::new("Add").fg(Color::DarkGrey)
        };
        let name = if app.panel(&card.id).is_some() {
            format!("{} ▾", card.name)
        } else {
            card.name.clone()
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(&card.symbol),
            Cell::new(&card.id).fg(Color::DarkGrey),
            report.set_alignment(CellAlignment::Center),
        ]);
    }
    table
}

pub fn detail_panel(id: &str, panel: &DetailPanel) -> String {
    match panel {
        DetailPanel::Loaded(detail) => detail_table(detail),
        DetailPanel::Failed(message) => format!(
            "{} {}",
            ui::style_text(&format!("Could not load details for {id}:"), ui::StyleType::Error),
            message
        ),
    }
}

fn detail_table(detail: &CurrencyDetail) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(&detail.name),
        ui::header_cell("USD"),
        ui::header_cell("EUR"),
        ui::header_cell("ILS"),
    ]);
    let price = &detail.current_price;
    table.add_row(vec![
        Cell::new(&detail.image_url).fg(Color::DarkGrey),
        ui::format_optional_cell(price.usd, |p| format!("${p:.2}")),
        ui::format_optional_cell(price.eur, |p| format!("€{p:.2}")),
        ui::format_optional_cell(price.ils, |p| format!("₪{p:.2}")),
    ]);
    table.to_string()
}

/// Prompt shown when a sixth currency is added to a full report.
pub fn replacement_dialog(store: &SelectionStore, pending_id: &str) -> String {
    let name = store
        .find(pending_id)
        .map_or(pending_id, |c| c.name.as_str());
    let mut output = format!(
        "{}\nReports hold at most {} currencies. Pick one to replace with {}:\n",
        ui::style_text("Report is full", ui::StyleType::Title),
        store.capacity(),
        ui::style_text(name, ui::StyleType::Selected),
    );
    for currency in store.selected() {
        output.push_str(&format!(
            "  replace {:<20} {} ({})\n",
            currency.id,
            currency.name,
            currency.symbol.to_uppercase()
        ));
    }
    output.push_str("  cancel");
    output
}

pub fn error_panel(error: &GatewayError) -> String {
    format!(
        "{}\n{}",
        ui::style_text("Failed to load currencies", ui::StyleType::Error),
        error
    )
}

/// Renders the whole page: navigation, body, open panels and any
/// pending replacement prompt.
pub fn draw(app: &App) -> String {
    let page = app.page();
    let mut output = format!(
        "{}\n{}\n\n",
        ui::style_text(&ui::separator(), ui::StyleType::Subtle),
        nav_bar(page.route)
    );

    match &page.body {
        PageBody::Cards(_) => {
            let cards = app.visible_cards();
            if !app.query().is_empty() {
                output.push_str(&ui::style_text(
                    &format!("Search: \"{}\" ({} shown)\n", app.query(), cards.len()),
                    ui::StyleType::Subtle,
                ));
            }
            output.push_str(&cards_table(&cards, app).to_string());
            for card in &cards {
                if let Some(panel) = app.panel(&card.id) {
                    output.push_str("\n\n");
                    output.push_str(&detail_panel(&card.id, panel));
                }
            }
        }
        PageBody::Placeholder(message) => {
            output.push_str(&ui::style_text(message, ui::StyleType::Subtle))
        }
        PageBody::About(text) => {
            output.push_str(&ui::style_text("About", ui::StyleType::Title));
            output.push_str("\n\n");
            output.push_str(text);
        }
    }

    if let Some(pending) = app.pending_replacement() {
        output.push_str("\n\n");
        output.push_str(&replacement_dialog(app.store(), pending));
    }
    output
}

/// One-line trend of a series scaled between its min and max.
pub fn sparkline(series: &ChartSeries) -> String {
    let prices: Vec<f64> = series.points().map(|p| p.price).collect();
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    prices
        .iter()
        .map(|price| {
            if span <= f64::EPSILON {
                SPARK_BARS[0]
            } else {
                let level = ((price - min) / span * (SPARK_BARS.len() - 1) as f64).round();
                SPARK_BARS[level as usize]
            }
        })
        .collect()
}

pub fn draw_chart(chart: &PriceChart) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Price (USD)"),
        ui::header_cell("Change"),
        ui::header_cell("Trend"),
    ]);

    for series in chart.series() {
        let first = series.points().next().map(|p| p.price);
        let latest = series.latest().map(|p| p.price);
        let change = match (first, latest) {
            (Some(first), Some(latest)) if first > 0.0 => {
                ui::change_cell((latest - first) / first * 100.0)
            }
            _ => ui::format_optional_cell(None::<f64>, |_| String::new()),
        };
        table.add_row(vec![
            Cell::new(series.symbol()),
            ui::format_optional_cell(latest, |p| format!("{p:.4}")),
            change,
            Cell::new(sparkline(series)),
        ]);
    }
    table.to_string()
}
