mod types;
mod universe;
mod selection;
mod session;
mod config;
mod web;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::{AppConfig, UniverseSource};
use session::{EventBus, SessionStore};
use universe::{load_universe, provider_from_settings};
use web::{start_dashboard_server, AppState};

#[derive(Parser)]
#[command(name = "backtest-dashboard")]
#[command(version)]
#[command(about = "Web dashboard for choosing a stock universe and a backtesting strategy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "dashboard.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read the universe from a CSV file (overrides config)
    #[arg(long, global = true, conflicts_with = "universe_url")]
    universe_csv: Option<PathBuf>,

    /// Fetch the universe as JSON from a URL (overrides config)
    #[arg(long, global = true)]
    universe_url: Option<String>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(path) = &self.universe_csv {
            config.universe.source = UniverseSource::Csv { path: path.clone() };
        }
        if let Some(url) = &self.universe_url {
            config.universe.source = UniverseSource::Http { url: url.clone() };
        }
        if let Commands::Serve { port: Some(port) } = &self.command {
            config.server.port = *port;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard
    Serve {
        /// Dashboard port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the symbol, country and sector lists derived from the universe
    Universe,
    /// List the available strategies
    Strategies,
    /// Print the effective configuration as TOML
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(&cli.config)?;

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    if config.logging.json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    cli.apply_overrides(&mut config);

    config
        .validate()
        .map_err(|errors| anyhow!("invalid configuration: {}", errors.join(", ")))?;

    match cli.command {
        Commands::Serve { .. } => serve(config).await?,
        Commands::Universe => print_universe(&config).await?,
        Commands::Strategies => {
            for strategy in types::StrategyName::ALL {
                println!("{:<32} {}", strategy, strategy.description());
            }
        }
        Commands::ShowConfig => print!("{}", config.to_toml()?),
    }

    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    info!("Backtest Dashboard v{}", env!("CARGO_PKG_VERSION"));

    // The whole form depends on the universe, so a provider failure stops startup.
    let provider = provider_from_settings(&config.universe)?;
    let universe = load_universe(provider.as_ref())
        .await
        .map_err(|e| anyhow!("failed to load universe from {}: {}", provider.describe(), e))?;

    let sessions = SessionStore::new(EventBus::with_default_handlers(), config.sessions.ttl());
    let _sweeper = sessions.spawn_sweeper(config.sessions.sweep_interval());

    let state = AppState::new(universe, sessions);
    start_dashboard_server(state, &config.server.host, config.server.port, &config.server.static_dir).await
}

async fn print_universe(config: &AppConfig) -> Result<()> {
    let provider = provider_from_settings(&config.universe)?;
    let universe = load_universe(provider.as_ref()).await?;

    println!("Symbols ({}): {}", universe.symbols.len(), universe.symbols.join(", "));
    println!("Countries ({}): {}", universe.countries.len(), universe.countries.join(", "));
    println!("Sectors ({}): {}", universe.sectors.len(), universe.sectors.join(", "));
    Ok(())
}
