//! Listing commands.

use clap::Args;
use deskhub_client::ItemGateway;
use deskhub_core::config::ClientConfig;
use deskhub_core::error::AppError;
use deskhub_core::types::ItemId;

use crate::output::{self, OutputFormat};

/// Arguments for `items`
#[derive(Debug, Args)]
pub struct ItemsArgs {
    /// Only items placed directly on the desktop
    #[arg(long)]
    pub desktop: bool,
}

/// Arguments for `folder`
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder ID
    pub folder: i64,
}

pub async fn list(
    args: &ItemsArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let gateway = super::gateway(config)?;
    let items = if args.desktop {
        gateway.desktop_items().await?
    } else {
        gateway.list_items().await?
    };
    output::print_items(&items, format);
    Ok(())
}

pub async fn folder(
    args: &FolderArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let gateway = super::gateway(config)?;
    let items = gateway.folder_items(ItemId(args.folder)).await?;
    output::print_items(&items, format);
    Ok(())
}
