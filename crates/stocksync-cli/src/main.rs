//! StockSync CLI - offline-first inventory and sales client
//!
//! Records branches, users, products and sales in a local database and
//! pushes them to the StockSync server with `stocksync sync`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    branch::BranchCommand, completions::CompletionsCommand, config::ConfigCommand,
    delete::DeleteCommand, list::ListCommand, product::ProductCommand, sale::SaleCommand,
    status::StatusCommand, sync::SyncCommand, user::UserCommand,
};
use output::{get_formatter, OutputFormat};
use stocksync_core::config::{Config, LoggingConfig, API_TOKEN_ENV};
use stocksync_core::repository::RepositoryError;

#[derive(Debug, Parser)]
#[command(
    name = "stocksync",
    version,
    about = "Offline-first inventory and sales client"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage branches
    #[command(subcommand)]
    Branch(BranchCommand),
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),
    /// Manage products and stock
    #[command(subcommand)]
    Product(ProductCommand),
    /// Record and delete sales
    #[command(subcommand)]
    Sale(SaleCommand),
    /// List local records of one kind
    List(ListCommand),
    /// Delete a record
    Delete(DeleteCommand),
    /// Show how many records wait for sync
    Status(StatusCommand),
    /// Push local records to the server
    Sync(SyncCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// `RUST_LOG` wins; otherwise `-q`, then `-v`, then the configured level
fn init_tracing(cli: &Cli, logging: &LoggingConfig) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// An explicitly named or existing config file must parse; a missing
/// default file means defaults
fn load_config(cli: &Cli) -> Result<(PathBuf, Config)> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    if cli.config.is_some() || path.exists() {
        let config = Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
        Ok((path, config))
    } else {
        Ok((path, Config::default()))
    }
}

async fn run(cli: Cli, config_path: PathBuf, config: Config, format: OutputFormat) -> Result<()> {
    match cli.command {
        Commands::Branch(cmd) => cmd.execute(&config, format).await,
        Commands::User(cmd) => cmd.execute(&config, format).await,
        Commands::Product(cmd) => cmd.execute(&config, format).await,
        Commands::Sale(cmd) => cmd.execute(&config, format).await,
        Commands::List(cmd) => cmd.execute(&config, format).await,
        Commands::Delete(cmd) => cmd.execute(&config, format).await,
        Commands::Status(cmd) => cmd.execute(&config, format).await,
        Commands::Sync(cmd) => cmd.execute(&config, format).await,
        Commands::Config(cmd) => cmd.execute(&config_path, format).await,
        Commands::Completions(cmd) => cmd.execute(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let formatter = get_formatter(format.is_json());

    let (config_path, config) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(err) => {
            formatter.error(&format!("{err:#}"));
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&cli, &config.logging);

    match run(cli, config_path, config, format).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.error(&format!("{err:#}"));
            if err
                .downcast_ref::<RepositoryError>()
                .is_some_and(RepositoryError::requires_reauth)
            {
                formatter.warn(&format!(
                    "The server rejected the API token. Set {API_TOKEN_ENV} or remote.api_token"
                ));
            }
            ExitCode::FAILURE
        }
    }
}
