//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use deskhub_realtime::connection::heartbeat::run_heartbeat;

use crate::state::AppState;

/// GET /ws: sync channel upgrade
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_ws_connection(state, socket))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let connections = state.realtime.connections.clone();

    let (handle, mut outbound_rx) = connections.register();
    let conn_id = handle.id;
    let mut shutdown = state.realtime.shutdown_receiver();

    // Outbound frames are forwarded by their own task.
    let outbound_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let mut heartbeat = tokio::spawn(run_heartbeat(
        handle.clone(),
        connections.heartbeat_config(),
    ));

    loop {
        tokio::select! {
            next = ws_rx.next() => match next {
                Some(Ok(Message::Text(text))) => {
                    connections
                        .handle_inbound(&conn_id, text.as_str(), state.item_service.as_ref())
                        .await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => handle.touch(),
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = &mut heartbeat => {
                debug!(conn_id = %conn_id, "Heartbeat ended, closing connection");
                break;
            }
            _ = shutdown.recv() => break,
        }
    }

    heartbeat.abort();
    connections.unregister(&conn_id);
    outbound_task.abort();

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
