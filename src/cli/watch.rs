//! Interactive watch loop: reads prompt commands and keeps the page,
//! search filter and live chart up to date.

use super::{page, ui};
use crate::core::app::App;
use crate::core::config::AppConfig;
use crate::core::gateway::MarketGateway;
use crate::core::search::Debouncer;
use crate::core::selection::Toggle;
use crate::providers::{CachingGateway, RemoteGateway};
use anyhow::{Context, Result, anyhow, bail};
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

const HELP: &str = "\
Commands:
  #currencies | #reports | #about   switch view
  toggle <id>                        add or remove a currency from the report
  info <id> [<id>...]                show or hide details of each id
  search [text]                      filter cards (empty clears)
  replace <old-id> [<new-id>]        swap a report entry
  cancel                             dismiss the replacement prompt
  chart                              show the live chart
  help                               show this help
  quit                               exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Navigate(String),
    Toggle(String),
    Info(Vec<String>),
    Search(String),
    Replace { old: String, new: Option<String> },
    Cancel,
    Chart,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.starts_with('#') {
            return Ok(Command::Navigate(line.to_string()));
        }

        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace();

        match verb.to_ascii_lowercase().as_str() {
            "toggle" | "add" | "remove" => args
                .next()
                .map(|id| Command::Toggle(id.to_string()))
                .ok_or_else(|| anyhow!("Usage: toggle <id>")),
            "info" => {
                let ids: Vec<String> = args.map(str::to_string).collect();
                if ids.is_empty() {
                    bail!("Usage: info <id> [<id>...]");
                }
                Ok(Command::Info(ids))
            }
            "search" | "/" => Ok(Command::Search(rest.to_string())),
            "replace" => {
                let old = args.next().ok_or_else(|| anyhow!("Usage: replace <old-id> [<new-id>]"))?;
                Ok(Command::Replace {
                    old: old.to_string(),
                    new: args.next().map(str::to_string),
                })
            }
            "cancel" => Ok(Command::Cancel),
            "chart" => Ok(Command::Chart),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "" => bail!("Empty command"),
            other => bail!("Unknown command: {other}. Type 'help' for a list of commands."),
        }
    }
}

/// Builds the remote gateway and runs the watch loop on stdin.
pub async fn run(config: &AppConfig, initial_route: Option<&str>) -> Result<()> {
    let gateway = CachingGateway::new(RemoteGateway::from_config(config), config.cache_ttl());
    let input = BufReader::new(tokio::io::stdin());
    run_with_input(Arc::new(gateway), config, initial_route, input).await
}

/// Runs the watch loop reading commands from `input` until it ends or a
/// quit command arrives.
pub async fn run_with_input<R>(
    gateway: Arc<dyn MarketGateway>,
    config: &AppConfig,
    initial_route: Option<&str>,
    input: R,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let spinner = ui::new_spinner("Loading currencies...");
    let app = App::init(gateway, config).await;
    spinner.finish_and_clear();

    let mut app = match app {
        Ok(app) => app,
        Err(e) => {
            println!("{}", page::error_panel(&e));
            return Err(e).context("Failed to load currency list");
        }
    };

    if let Some(fragment) = initial_route {
        app.navigate(fragment);
    }
    println!("{}", page::draw(&app));
    println!("{}", ui::style_text("Type 'help' for commands.", ui::StyleType::Subtle));

    let (search, mut settled_queries) = Debouncer::spawn(config.search_debounce());
    let mut ticks = app.poller().subscribe();
    let mut lines = input.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    debug!("Input closed");
                    break;
                };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        if let Some(output) = handle(&mut app, command, &search).await {
                            println!("{output}");
                        }
                    }
                    Err(e) => println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
                }
            }
            Some(query) = settled_queries.recv() => {
                app.set_query(&query);
                println!("{}", page::draw(&app));
            }
            Ok(()) = ticks.changed() => {
                if app.page().chart_visible && app.poller().is_running() {
                    println!("{}", page::draw_chart(&app.poller().chart().await));
                }
            }
        }
    }

    app.shutdown();
    info!("Watch loop finished");
    Ok(())
}

/// Applies a command and returns what to print, if anything.
async fn handle(app: &mut App, command: Command, search: &Debouncer<String>) -> Option<String> {
    match command {
        Command::Navigate(fragment) => {
            if app.navigate(&fragment) {
                Some(page::draw(app))
            } else {
                Some(ui::style_text(
                    &format!(
                        "Unknown route {fragment}, staying on {}",
                        app.route()
                    ),
                    ui::StyleType::Subtle,
                ))
            }
        }
        Command::Toggle(id) => match app.toggle(&id) {
            Toggle::Unknown => Some(ui::style_text(
                &format!("Unknown currency: {id}"),
                ui::StyleType::Error,
            )),
            _ => Some(page::draw(app)),
        },
        Command::Info(ids) => {
            app.toggle_info_many(&ids).await;
            Some(page::draw(app))
        }
        Command::Search(query) => {
            search.push(query);
            None
        }
        Command::Replace { old, new } => {
            if app.replace(&old, new.as_deref()) {
                Some(page::draw(app))
            } else {
                Some(ui::style_text("Nothing replaced", ui::StyleType::Subtle))
            }
        }
        Command::Cancel => {
            app.cancel_replacement();
            Some(page::draw(app))
        }
        Command::Chart => {
            if app.page().chart_visible {
                Some(page::draw_chart(&app.poller().chart().await))
            } else {
                Some(ui::style_text(
                    "The chart is only shown on #reports",
                    ui::StyleType::Subtle,
                ))
            }
        }
        Command::Help => Some(HELP.to_string()),
        Command::Quit => None,
    }
}
