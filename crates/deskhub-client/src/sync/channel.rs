//! The live sync channel and its connection worker.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use deskhub_core::config::ClientConfig;
use deskhub_core::result::AppResult;
use deskhub_core::types::ItemId;
use deskhub_entity::Item;
use deskhub_realtime::{InboundMessage, OutboundMessage};

use super::connector::{Connection, Connector, FrameSink};
use super::refresher::Refresher;
use super::status::{ChannelState, SyncStatus};
use crate::snapshot::ViewKey;
use crate::views::ViewRegistry;

enum Command {
    Refresh {
        folder_id: ItemId,
        reply: oneshot::Sender<Vec<Item>>,
    },
    Subscribe(ItemId),
    Unsubscribe(ItemId),
}

/// Handle to the sync channel. Cloning shares the same connection.
#[derive(Clone)]
pub struct LiveSyncChannel {
    commands: mpsc::UnboundedSender<Command>,
    status: Arc<SyncStatus>,
    refresher: Refresher,
    refresh_timeout: Duration,
    shutdown: Arc<watch::Sender<bool>>,
}

impl std::fmt::Debug for LiveSyncChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSyncChannel")
            .field("state", &self.status.state())
            .finish()
    }
}

impl LiveSyncChannel {
    /// Start the connection worker.
    ///
    /// The worker connects, resynchronises every open folder view, and
    /// reconnects after `reconnect_delay` whenever the connection drops.
    pub fn spawn(
        connector: Arc<dyn Connector>,
        refresher: Refresher,
        views: ViewRegistry,
        status: Arc<SyncStatus>,
        config: &ClientConfig,
    ) -> Self {
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(false);

        let handle = Self {
            commands,
            status: status.clone(),
            refresher,
            refresh_timeout: config.refresh_timeout(),
            shutdown: Arc::new(shutdown),
        };

        let worker = SyncWorker {
            connector,
            handle: handle.clone(),
            views,
            status,
            commands_rx,
            shutdown_rx,
            reconnect_delay: config.reconnect_delay(),
        };
        tokio::spawn(worker.run());

        handle
    }

    pub fn state(&self) -> ChannelState {
        self.status.state()
    }

    pub fn watch_state(&self) -> watch::Receiver<ChannelState> {
        self.status.watch()
    }

    pub fn status(&self) -> &Arc<SyncStatus> {
        &self.status
    }

    /// Tell the server this client shows `folder_id`. Best-effort.
    pub fn subscribe(&self, folder_id: ItemId) {
        let _ = self.commands.send(Command::Subscribe(folder_id));
    }

    pub fn unsubscribe(&self, folder_id: ItemId) {
        let _ = self.commands.send(Command::Unsubscribe(folder_id));
    }

    /// Fetch the authoritative contents of a folder and replace its
    /// snapshot.
    ///
    /// Goes through the channel when connected. If no answer arrives
    /// within the refresh timeout, or the channel is down, the contents are
    /// fetched over HTTP instead.
    pub async fn request_refresh(&self, folder_id: ItemId) -> AppResult<Vec<Item>> {
        let view = ViewKey::Folder(folder_id);
        let snapshots = self.refresher.snapshots();
        let ticket = snapshots.begin_refresh(view);

        if self.status.state() == ChannelState::Connected {
            let (reply, answer) = oneshot::channel();
            if self
                .commands
                .send(Command::Refresh { folder_id, reply })
                .is_ok()
            {
                match tokio::time::timeout(self.refresh_timeout, answer).await {
                    Ok(Ok(items)) => {
                        self.status.clear_timed_out(view);
                        snapshots.replace(ticket, items.clone());
                        return Ok(items);
                    }
                    Ok(Err(_)) => {
                        debug!(folder_id = %folder_id, "Refresh abandoned by channel, using HTTP");
                    }
                    Err(_) => {
                        warn!(folder_id = %folder_id, "Refresh timed out, using HTTP");
                        self.status.mark_timed_out(view);
                    }
                }
            }
        }

        let items = self.refresher.fetch(view).await?;
        snapshots.replace(ticket, items.clone());
        Ok(items)
    }

    /// Stop the worker. The connection closes and is not re-established.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    fn spawn_refresh(&self, folder_id: ItemId) {
        let channel = self.clone();
        tokio::spawn(async move {
            if let Err(e) = channel.request_refresh(folder_id).await {
                warn!(folder_id = %folder_id, error = %e, "Folder refresh failed");
            }
        });
    }

    fn spawn_desktop_refresh(&self) {
        let refresher = self.refresher.clone();
        tokio::spawn(async move {
            if let Err(e) = refresher.refresh(ViewKey::Desktop).await {
                warn!(error = %e, "Desktop refresh failed");
            }
        });
    }
}

/// Why a connected session ended.
enum SessionEnd {
    Closed,
    Shutdown,
}

struct SyncWorker {
    connector: Arc<dyn Connector>,
    handle: LiveSyncChannel,
    views: ViewRegistry,
    status: Arc<SyncStatus>,
    commands_rx: mpsc::UnboundedReceiver<Command>,
    shutdown_rx: watch::Receiver<bool>,
    reconnect_delay: Duration,
}

impl SyncWorker {
    async fn run(mut self) {
        loop {
            if *self.shutdown_rx.borrow() {
                break;
            }

            self.status.set_state(ChannelState::Connecting);
            match self.connector.connect().await {
                Ok(connection) => {
                    self.status.set_state(ChannelState::Connected);
                    info!("Sync channel connected");
                    let end = self.session(connection).await;
                    self.status.set_state(ChannelState::Disconnected);
                    if matches!(end, SessionEnd::Shutdown) {
                        break;
                    }
                    info!("Sync channel disconnected");
                }
                Err(e) => {
                    self.status.set_state(ChannelState::Disconnected);
                    warn!(error = %e, "Sync channel connect failed");
                }
            }

            if !self.wait_before_reconnect().await {
                break;
            }
        }
        self.status.set_state(ChannelState::Disconnected);
        debug!("Sync worker stopped");
    }

    /// Sleep out the reconnect delay. Refresh requests arriving meanwhile
    /// are dropped so their callers fall back to HTTP at once. Returns
    /// `false` on shutdown.
    async fn wait_before_reconnect(&mut self) -> bool {
        let delay = tokio::time::sleep(self.reconnect_delay);
        tokio::pin!(delay);
        loop {
            tokio::select! {
                _ = &mut delay => return true,
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        return false;
                    }
                }
                command = self.commands_rx.recv() => {
                    if command.is_none() {
                        return false;
                    }
                }
            }
        }
    }

    async fn session(&mut self, connection: Connection) -> SessionEnd {
        let Connection {
            mut sink,
            mut stream,
        } = connection;
        let mut waiters: Waiters = HashMap::new();

        // Nothing is replayed across reconnects; ask again for every view.
        for folder_id in self.views.open_folders() {
            if !send(&mut sink, &InboundMessage::Subscribe { folder_id }).await {
                return SessionEnd::Closed;
            }
            self.handle.spawn_refresh(folder_id);
        }
        self.handle.spawn_desktop_refresh();

        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(text)) => {
                        if !self.on_frame(&text, &mut sink, &mut waiters).await {
                            return SessionEnd::Closed;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Sync channel read failed");
                        return SessionEnd::Closed;
                    }
                    None => return SessionEnd::Closed,
                },
                command = self.commands_rx.recv() => {
                    let Some(command) = command else {
                        return SessionEnd::Shutdown;
                    };
                    let message = match command {
                        Command::Refresh { folder_id, reply } => {
                            add_waiter(&mut waiters, folder_id, reply);
                            InboundMessage::RequestFolderRefresh { folder_id }
                        }
                        Command::Subscribe(folder_id) => InboundMessage::Subscribe { folder_id },
                        Command::Unsubscribe(folder_id) => {
                            InboundMessage::Unsubscribe { folder_id }
                        }
                    };
                    if !send(&mut sink, &message).await {
                        return SessionEnd::Closed;
                    }
                }
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        let _ = sink.close().await;
                        return SessionEnd::Shutdown;
                    }
                }
            }
        }
    }

    /// Handle one server frame. Returns `false` if the connection broke.
    async fn on_frame(
        &self,
        text: &str,
        sink: &mut FrameSink,
        waiters: &mut Waiters,
    ) -> bool {
        let message = match serde_json::from_str::<OutboundMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed sync frame");
                return true;
            }
        };

        match message {
            OutboundMessage::FolderContents { folder_id, items } => {
                match waiters.remove(&folder_id) {
                    Some(replies) => {
                        for reply in replies {
                            let _ = reply.send(items.clone());
                        }
                    }
                    None if self.views.is_open(folder_id) => {
                        let snapshots = self.handle.refresher.snapshots();
                        let ticket = snapshots.begin_refresh(ViewKey::Folder(folder_id));
                        snapshots.replace(ticket, items);
                    }
                    None => {}
                }
            }
            OutboundMessage::MembershipChanged {
                folder_id,
                item_count,
            } => {
                debug!(folder_id = %folder_id, item_count, "Membership changed");
                if self.views.is_open(folder_id) {
                    self.handle.spawn_refresh(folder_id);
                }
            }
            OutboundMessage::DesktopChanged { item_count } => {
                debug!(item_count, "Desktop changed");
                self.handle.spawn_desktop_refresh();
            }
            OutboundMessage::Ping { timestamp } => {
                return send(
                    sink,
                    &InboundMessage::Pong {
                        timestamp: Some(timestamp),
                    },
                )
                .await;
            }
            OutboundMessage::Error {
                code,
                message,
                folder_id,
            } => {
                warn!(code = %code, message = %message, "Sync channel error reply");
                if let Some(folder_id) = folder_id {
                    // Dropping the replies sends the callers to HTTP.
                    waiters.remove(&folder_id);
                }
            }
        }
        true
    }
}

/// Refresh replies still owed to callers, per folder.
type Waiters = HashMap<ItemId, Vec<oneshot::Sender<Vec<Item>>>>;

/// Queue `reply` for the next contents of `folder_id`, dropping waiters
/// whose caller has already given up.
fn add_waiter(waiters: &mut Waiters, folder_id: ItemId, reply: oneshot::Sender<Vec<Item>>) {
    waiters.retain(|_, pending| {
        pending.retain(|waiter| !waiter.is_closed());
        !pending.is_empty()
    });
    waiters.entry(folder_id).or_default().push(reply);
}

async fn send(sink: &mut FrameSink, message: &InboundMessage) -> bool {
    let frame = match serde_json::to_string(message) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "Failed to encode sync frame");
            return true;
        }
    };
    match sink.send(frame).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Sync channel write failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abandoned_waiters_are_pruned() {
        let mut waiters = Waiters::new();
        let (timed_out, abandoned) = oneshot::channel();
        add_waiter(&mut waiters, ItemId(2), timed_out);
        drop(abandoned);

        let (live, mut live_rx) = oneshot::channel();
        add_waiter(&mut waiters, ItemId(3), live);
        assert!(!waiters.contains_key(&ItemId(2)));

        let (again, _again_rx) = oneshot::channel();
        add_waiter(&mut waiters, ItemId(3), again);
        assert_eq!(waiters[&ItemId(3)].len(), 2);

        for reply in waiters.remove(&ItemId(3)).unwrap() {
            let _ = reply.send(Vec::new());
        }
        assert_eq!(live_rx.try_recv().unwrap(), Vec::<Item>::new());
    }
}
