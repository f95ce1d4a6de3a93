use anyhow::Result;
use clap::{Parser, Subcommand};
use coinwatch::core::log::init_logging;
use coinwatch::core::route::Route;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Browse currencies and watch live prices (default)
    Watch {
        /// Initial view: #currencies, #reports or #about
        #[arg(short, long)]
        route: Option<Route>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => coinwatch::cli::setup::setup(),
        Some(Commands::Watch { route }) => {
            let command = coinwatch::AppCommand::Watch {
                route: route.map(|r| r.fragment().to_string()),
            };
            coinwatch::run_command(command, cli.config_path.as_deref()).await
        }
        None => {
            let command = coinwatch::AppCommand::Watch { route: None };
            coinwatch::run_command(command, cli.config_path.as_deref()).await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
