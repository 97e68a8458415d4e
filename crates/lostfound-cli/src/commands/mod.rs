//! CLI command definitions and dispatch.

pub mod escrow;
pub mod health;
pub mod item;
pub mod migrate;
pub mod notification;

use clap::{Parser, Subcommand};

use lostfound_core::config::{AppConfig, StoreBackend};
use lostfound_core::error::AppError;
use lostfound_service::LostAndFound;

use crate::output::OutputFormat;

/// LostFound: lost-item rewards held in escrow until the owner verifies the find
#[derive(Debug, Parser)]
#[command(name = "lostfound", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded from `config/<env>`
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Report a lost item and escrow its reward
    Report(item::ReportArgs),
    /// Submit a found-claim on an open item
    Found(item::FoundArgs),
    /// Verify a found-claim and release the reward
    Verify(item::VerifyArgs),
    /// Show one item with its escrow balance
    Item(item::ShowArgs),
    /// List items
    Items(item::ListArgs),
    /// List notifications for a recipient
    Notifications(notification::ListArgs),
    /// Mark a notification as delivered
    Deliver(notification::DeliverArgs),
    /// Show escrow totals or one item's ledger entry
    Escrow(escrow::EscrowArgs),
    /// Check that the configured store answers
    Health,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let format = self.format;
        let command = match &self.command {
            Commands::Migrate => return migrate::execute(config, format).await,
            command => command,
        };

        let app = connect(config).await?;
        match command {
            Commands::Report(args) => item::report(&app, args, format).await,
            Commands::Found(args) => item::found(&app, args, format).await,
            Commands::Verify(args) => item::verify(&app, args, format).await,
            Commands::Item(args) => item::show(&app, args, format).await,
            Commands::Items(args) => item::list(&app, args, format).await,
            Commands::Notifications(args) => notification::list(&app, args, format).await,
            Commands::Deliver(args) => notification::deliver(&app, args, format).await,
            Commands::Escrow(args) => escrow::execute(&app, args, format).await,
            Commands::Health => health::execute(&app, format).await,
            Commands::Migrate => migrate::execute(config, format).await,
        }
    }
}

/// Helper: wire the services over the configured store
async fn connect(config: &AppConfig) -> Result<LostAndFound, AppError> {
    if config.store.backend == StoreBackend::Memory {
        tracing::warn!("Using the in-memory store; nothing will outlive this command");
    }
    LostAndFound::from_config(config).await
}
