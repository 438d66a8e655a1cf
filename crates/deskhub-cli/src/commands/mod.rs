//! CLI command definitions and dispatch.

pub mod edit;
pub mod items;
pub mod watch;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use deskhub_client::HttpGateway;
use deskhub_core::config::{AppConfig, ClientConfig};
use deskhub_core::error::AppError;

/// Deskhub: virtual desktop file manager client
#[derive(Debug, Parser)]
#[command(name = "deskhub", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (`config/{env}.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Override the HTTP API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the sync channel URL
    #[arg(long)]
    pub ws_url: Option<String>,

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
    /// List every item
    Items(items::ItemsArgs),
    /// List the contents of a folder
    Folder(items::FolderArgs),
    /// Create a folder on the desktop
    Mkdir(edit::MkdirArgs),
    /// Move an item into a folder
    Mv(edit::MvArgs),
    /// Move an item out of its folder onto the desktop
    Out(edit::OutArgs),
    /// Rename an item
    Rename(edit::RenameArgs),
    /// Resize an item
    Resize(edit::ResizeArgs),
    /// Delete an item
    Rm(edit::RmArgs),
    /// Open a live view of a folder and print every change
    Watch(watch::WatchArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = self.client_config()?;
        match &self.command {
            Commands::Items(args) => items::list(args, &config, self.format).await,
            Commands::Folder(args) => items::folder(args, &config, self.format).await,
            Commands::Mkdir(args) => edit::mkdir(args, &config, self.format).await,
            Commands::Mv(args) => edit::mv(args, &config, self.format).await,
            Commands::Out(args) => edit::out(args, &config, self.format).await,
            Commands::Rename(args) => edit::rename(args, &config, self.format).await,
            Commands::Resize(args) => edit::resize(args, &config, self.format).await,
            Commands::Rm(args) => edit::rm(args, &config).await,
            Commands::Watch(args) => watch::execute(args, &config, self.format).await,
        }
    }

    /// Client settings from the config files with command-line overrides.
    fn client_config(&self) -> Result<ClientConfig, AppError> {
        let mut config = AppConfig::load(&self.env)?.client;
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(url) = &self.ws_url {
            config.ws_url = url.clone();
        }
        Ok(config)
    }
}

/// Helper: HTTP gateway for one-shot commands
pub fn gateway(config: &ClientConfig) -> Result<HttpGateway, AppError> {
    HttpGateway::new(config)
}
