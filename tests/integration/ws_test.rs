//! Integration tests for the `/ws` sync channel, driven by the desktop
//! client's own connector and gateway against a live server.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use http::StatusCode;
use pretty_assertions::assert_eq;

use deskhub_client::sync::{Connection, Connector, WsConnector};
use deskhub_client::{ChannelState, Desktop, HttpGateway, ItemGateway, Rect};
use deskhub_core::config::ClientConfig;
use deskhub_core::types::ItemId;
use deskhub_realtime::{InboundMessage, OutboundMessage};

const WAIT: Duration = Duration::from_secs(5);

async fn next_message(connection: &mut Connection) -> OutboundMessage {
    let frame = tokio::time::timeout(WAIT, connection.stream.next())
        .await
        .expect("Timed out waiting for a frame")
        .expect("Channel closed")
        .expect("Channel error");
    serde_json::from_str(&frame).expect("Unparseable frame")
}

async fn send(connection: &mut Connection, message: InboundMessage) {
    let frame = serde_json::to_string(&message).expect("Failed to encode frame");
    connection.sink.send(frame).await.expect("Failed to send frame");
}

/// Poll `check` until it holds or the wait runs out.
async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    check()
}

async fn start_desktop(config: &ClientConfig) -> Desktop {
    let gateway = Arc::new(HttpGateway::new(config).expect("Failed to build gateway"));
    let connector = Arc::new(WsConnector::new(config.ws_url.clone()));
    Desktop::start(config, gateway, connector)
        .await
        .expect("Desktop failed to start")
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/ws", None).await;

    assert!(
        response.status == StatusCode::BAD_REQUEST
            || response.status == StatusCode::UPGRADE_REQUIRED,
        "Expected 400 or 426, got {}",
        response.status
    );
}

#[tokio::test]
async fn test_folder_refresh_over_channel() {
    let app = helpers::TestApp::seeded().await;
    let addr = app.spawn().await;
    let config = helpers::client_config(addr);

    let mut connection = WsConnector::new(config.ws_url.clone())
        .connect()
        .await
        .expect("Failed to connect");

    send(
        &mut connection,
        InboundMessage::RequestFolderRefresh {
            folder_id: ItemId(2),
        },
    )
    .await;

    match next_message(&mut connection).await {
        OutboundMessage::FolderContents { folder_id, items } => {
            assert_eq!(folder_id, ItemId(2));
            let ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();
            assert_eq!(ids, vec![ItemId(3)]);
        }
        other => panic!("Unexpected frame: {other:?}"),
    }
}

#[tokio::test]
async fn test_refresh_of_missing_folder_returns_error_frame() {
    let app = helpers::TestApp::seeded().await;
    let addr = app.spawn().await;

    let mut connection = WsConnector::new(helpers::client_config(addr).ws_url)
        .connect()
        .await
        .expect("Failed to connect");
    send(
        &mut connection,
        InboundMessage::RequestFolderRefresh {
            folder_id: ItemId(99),
        },
    )
    .await;

    match next_message(&mut connection).await {
        OutboundMessage::Error { folder_id, .. } => assert_eq!(folder_id, Some(ItemId(99))),
        other => panic!("Unexpected frame: {other:?}"),
    }
}

#[tokio::test]
async fn test_mutation_broadcasts_membership_change() {
    let app = helpers::TestApp::seeded().await;
    let addr = app.spawn().await;
    let config = helpers::client_config(addr);

    let mut connection = WsConnector::new(config.ws_url.clone())
        .connect()
        .await
        .expect("Failed to connect");
    assert!(
        eventually(|| app.state.realtime.connections.connection_count() == 1).await,
        "Connection never registered"
    );

    let gateway = HttpGateway::new(&config).expect("Failed to build gateway");
    gateway
        .add_to_folder(ItemId(2), ItemId(1))
        .await
        .expect("Move failed");

    let mut saw_folder = false;
    let mut saw_desktop = false;
    while !(saw_folder && saw_desktop) {
        match next_message(&mut connection).await {
            OutboundMessage::MembershipChanged {
                folder_id,
                item_count,
            } => {
                assert_eq!(folder_id, ItemId(2));
                assert_eq!(item_count, 2);
                saw_folder = true;
            }
            OutboundMessage::DesktopChanged { item_count } => {
                assert_eq!(item_count, 2);
                saw_desktop = true;
            }
            OutboundMessage::Ping { .. } => {}
            other => panic!("Unexpected frame: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_two_desktops_converge() {
    let app = helpers::TestApp::seeded().await;
    let addr = app.spawn().await;
    let config = helpers::client_config(addr);

    let mover = start_desktop(&config).await;
    let watcher = start_desktop(&config).await;
    assert!(eventually(|| watcher.sync_state() == ChannelState::Connected).await);

    watcher
        .open_folder(ItemId(2), Rect::new(600, 400, 300, 200))
        .await
        .expect("Failed to open folder");

    mover
        .mutator()
        .move_to_folder(ItemId(1), ItemId(2))
        .await
        .expect("Move failed");

    let converged = eventually(|| {
        let in_folder = watcher
            .folder_items(ItemId(2))
            .map(|items| items.iter().any(|i| i.id == ItemId(1)))
            .unwrap_or(false);
        let on_desktop = watcher.desktop_items().iter().any(|i| i.id == ItemId(1));
        in_folder && !on_desktop
    })
    .await;
    assert!(converged, "Watcher never saw the move");

    mover.shutdown();
    watcher.shutdown();
}
