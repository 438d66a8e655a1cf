//! One-shot mutations.
//!
//! Input is checked with the same rules the server applies so obvious
//! mistakes fail without a round trip.

use clap::Args;
use deskhub_client::ItemGateway;
use deskhub_core::config::ClientConfig;
use deskhub_core::error::AppError;
use deskhub_core::types::ItemId;
use deskhub_entity::item::rules;
use deskhub_entity::{Dimensions, Position};

use crate::output::{self, OutputFormat};

/// Arguments for `mkdir`
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// Folder name
    pub name: String,
    /// Desktop x coordinate
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub x: i32,
    /// Desktop y coordinate
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub y: i32,
}

/// Arguments for `mv`
#[derive(Debug, Args)]
pub struct MvArgs {
    /// Item ID
    pub item: i64,
    /// Target folder ID
    pub folder: i64,
}

/// Arguments for `out`
#[derive(Debug, Args)]
pub struct OutArgs {
    /// Item ID
    pub item: i64,
    /// New desktop x coordinate (keeps the stored position if omitted)
    #[arg(long, requires = "y", allow_hyphen_values = true)]
    pub x: Option<i32>,
    /// New desktop y coordinate
    #[arg(long, requires = "x", allow_hyphen_values = true)]
    pub y: Option<i32>,
}

/// Arguments for `rename`
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Item ID
    pub item: i64,
    /// New name
    pub name: String,
}

/// Arguments for `resize`
#[derive(Debug, Args)]
pub struct ResizeArgs {
    /// Item ID
    pub item: i64,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

/// Arguments for `rm`
#[derive(Debug, Args)]
pub struct RmArgs {
    /// Item ID
    pub item: i64,
}

pub async fn mkdir(
    args: &MkdirArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let name = rules::normalize_name(&args.name)?;
    let position = Position::new(args.x, args.y);
    rules::check_position(position)?;

    let folder = super::gateway(config)?
        .create_folder(&name, position)
        .await?;
    output::print_success(&format!("Created folder {} ({})", folder.name, folder.id));
    output::print_item(&folder, format);
    Ok(())
}

pub async fn mv(
    args: &MvArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    if args.item == args.folder {
        return Err(AppError::validation("An item cannot be moved into itself"));
    }
    let item = super::gateway(config)?
        .add_to_folder(ItemId(args.folder), ItemId(args.item))
        .await?;
    output::print_success(&format!("Moved {} into folder {}", item.name, args.folder));
    output::print_item(&item, format);
    Ok(())
}

pub async fn out(
    args: &OutArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let position = match (args.x, args.y) {
        (Some(x), Some(y)) => {
            let position = Position::new(x, y);
            rules::check_position(position)?;
            Some(position)
        }
        _ => None,
    };
    let item = super::gateway(config)?
        .remove_from_folder(ItemId(args.item), position)
        .await?;
    output::print_success(&format!("Moved {} to the desktop", item.name));
    output::print_item(&item, format);
    Ok(())
}

pub async fn rename(
    args: &RenameArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let name = rules::normalize_name(&args.name)?;
    let item = super::gateway(config)?
        .rename(ItemId(args.item), &name)
        .await?;
    output::print_success(&format!("Renamed {} to {}", args.item, item.name));
    output::print_item(&item, format);
    Ok(())
}

pub async fn resize(
    args: &ResizeArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let dimensions = Dimensions::new(args.width, args.height);
    rules::check_dimensions(dimensions)?;
    let item = super::gateway(config)?
        .update_dimensions(ItemId(args.item), dimensions)
        .await?;
    output::print_item(&item, format);
    Ok(())
}

pub async fn rm(args: &RmArgs, config: &ClientConfig) -> Result<(), AppError> {
    super::gateway(config)?
        .delete_item(ItemId(args.item))
        .await?;
    output::print_success(&format!("Deleted {}", args.item));
    Ok(())
}
