//! `deskhub watch`: a live folder view in the terminal.

use std::sync::Arc;

use clap::Args;
use deskhub_client::sync::WsConnector;
use deskhub_client::{Desktop, NoticeLevel, Rect};
use deskhub_core::config::ClientConfig;
use deskhub_core::error::AppError;
use deskhub_core::types::ItemId;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::output::{self, OutputFormat};

/// Arguments for `watch`
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Folder ID
    pub folder: i64,
}

pub async fn execute(
    args: &WatchArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let folder_id = ItemId(args.folder);
    let gateway = Arc::new(super::gateway(config)?);
    let connector = Arc::new(WsConnector::new(config.ws_url.clone()));

    let desktop = Desktop::start(config, gateway, connector).await?;
    let mut changes = desktop.changes();
    let mut notices = desktop.notices();
    let mut state = desktop.sync().watch_state();

    desktop
        .open_folder(folder_id, Rect::new(0, 0, 640, 480))
        .await?;
    let mut shown = desktop.folder_items(folder_id);
    if let Some(items) = &shown {
        output::print_items(items, format);
    }

    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = desktop.folder_items(folder_id);
                if current.is_none() {
                    output::print_warning("Folder is no longer available");
                    break;
                }
                if current != shown {
                    if let Some(items) = &current {
                        output::print_items(items, format);
                    }
                    shown = current;
                }
            }
            notice = notices.recv() => match notice {
                Ok(notice) => match notice.level {
                    NoticeLevel::Error => output::print_error(&notice.message),
                    _ => output::print_warning(&notice.message),
                },
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Notices dropped"),
                Err(RecvError::Closed) => break,
            },
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow();
                debug!(state = ?current, "Sync channel state changed");
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    desktop.shutdown();
    Ok(())
}
