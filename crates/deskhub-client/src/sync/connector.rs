//! Transport for the sync channel.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt, future};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::debug;

use deskhub_core::error::{AppError, ErrorKind};
use deskhub_core::result::AppResult;

/// Outgoing text frames.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = AppError> + Send>>;
/// Incoming text frames. The stream ends when the connection closes.
pub type FrameStream = Pin<Box<dyn Stream<Item = AppResult<String>> + Send>>;

/// One established connection.
pub struct Connection {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Opens connections for the sync channel.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self) -> AppResult<Connection>;
}

/// WebSocket connector.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

fn ws_error(err: WsError) -> AppError {
    AppError::with_source(ErrorKind::Network, format!("Sync channel error: {err}"), err)
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> AppResult<Connection> {
        let (socket, _) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Network,
                    format!("Failed to connect to {}: {e}", self.url),
                    e,
                )
            })?;
        debug!(url = %self.url, "Sync channel socket open");

        let (sink, stream) = socket.split();
        let sink = sink
            .sink_map_err(ws_error)
            .with(|frame: String| future::ready(Ok::<_, AppError>(Message::text(frame))));
        let stream = stream.filter_map(|message| {
            future::ready(match message {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(_) => None,
                Err(e) => Some(Err(ws_error(e))),
            })
        });

        Ok(Connection {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        })
    }
}
