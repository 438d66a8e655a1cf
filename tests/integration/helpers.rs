//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use deskhub_api::{AppState, build_app};
use deskhub_core::config::{AppConfig, ClientConfig};
use deskhub_core::types::ItemId;
use deskhub_database::{ItemRepository, MemoryItemRepository};
use deskhub_entity::{Item, NewItem, Position};

/// Test application context
pub struct TestApp {
    /// The Axum app for making test requests
    pub router: Router,
    /// Shared state, for reaching the services directly
    pub state: AppState,
    repo: Arc<MemoryItemRepository>,
}

impl TestApp {
    /// Create a new test application over an empty in-memory repository
    pub fn new() -> Self {
        let repo = Arc::new(MemoryItemRepository::new());
        let state = AppState::new(AppConfig::default(), repo.clone());
        let router = build_app(state.clone());
        Self {
            router,
            state,
            repo,
        }
    }

    /// Application with a file (1) and a folder (2) on the desktop, a file
    /// (3) inside the folder, and a second folder (4).
    pub async fn seeded() -> Self {
        let app = Self::new();
        app.seed(NewItem::file("notes.txt", Position::new(50, 50)))
            .await;
        app.seed(NewItem::folder("Projects", Position::new(300, 50)))
            .await;
        app.seed(NewItem::file("plan.md", Position::default()).in_folder(ItemId(2)))
            .await;
        app.seed(NewItem::folder("Archive", Position::new(50, 300)))
            .await;
        app
    }

    /// Insert an item directly into the repository
    pub async fn seed(&self, item: NewItem) -> Item {
        self.repo.create(&item).await.expect("Failed to seed item")
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the app on an ephemeral local port
    pub async fn spawn(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Test server failed");
        });
        addr
    }
}

/// Client settings pointing at a spawned test server
pub fn client_config(addr: SocketAddr) -> ClientConfig {
    ClientConfig {
        base_url: format!("http://{addr}"),
        ws_url: format!("ws://{addr}/ws"),
        ..ClientConfig::default()
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// Ids of the `items` array in a list response
    pub fn item_ids(&self) -> Vec<i64> {
        self.body["items"]
            .as_array()
            .expect("No items array in response")
            .iter()
            .map(|item| item["id"].as_i64().expect("Item without id"))
            .collect()
    }
}
