//! Shared fixtures for client tests: a scriptable gateway over the real
//! item service and an in-process connector wired to the realtime engine.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::watch;

use deskhub_client::ItemGateway;
use deskhub_client::sync::{Connection, Connector};
use deskhub_core::config::{ClientConfig, RealtimeConfig};
use deskhub_core::error::AppError;
use deskhub_core::result::AppResult;
use deskhub_core::types::ItemId;
use deskhub_database::{ItemRepository, MemoryItemRepository};
use deskhub_entity::{Dimensions, Item, NewItem, Position};
use deskhub_realtime::RealtimeEngine;
use deskhub_service::ItemService;

type Hook = Box<dyn Fn(&'static str) + Send + Sync>;

/// Gateway backed by an in-memory [`ItemService`] with failure injection.
pub struct TestGateway {
    pub service: Arc<ItemService>,
    pub realtime: RealtimeEngine,
    repo: Arc<MemoryItemRepository>,
    fail_next: Mutex<Option<AppError>>,
    calls: Mutex<Vec<&'static str>>,
    hook: Mutex<Option<Hook>>,
}

impl TestGateway {
    pub fn new() -> Arc<Self> {
        let repo = Arc::new(MemoryItemRepository::new());
        let realtime = RealtimeEngine::new(RealtimeConfig::default());
        let service = Arc::new(ItemService::new(
            repo.clone(),
            realtime.event_bridge.clone(),
        ));
        Arc::new(Self {
            service,
            realtime,
            repo,
            fail_next: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            hook: Mutex::new(None),
        })
    }

    pub async fn seed(&self, item: NewItem) -> Item {
        self.repo.create(&item).await.expect("seed item")
    }

    /// Make the next mutating call fail with `err`.
    pub fn fail_next(&self, err: AppError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    /// Run `hook` at the start of every mutating call.
    pub fn on_mutation(&self, hook: impl Fn(&'static str) + Send + Sync + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    /// Calls other than reads.
    pub fn mutations(&self) -> Vec<&'static str> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(*c, "list_items" | "folder_items"))
            .collect()
    }

    fn read(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn mutate(&self, call: &'static str) -> AppResult<()> {
        self.calls.lock().unwrap().push(call);
        if let Some(hook) = self.hook.lock().unwrap().as_ref() {
            hook(call);
        }
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ItemGateway for TestGateway {
    async fn list_items(&self) -> AppResult<Vec<Item>> {
        self.read("list_items");
        self.service.list_items().await
    }

    async fn folder_items(&self, folder_id: ItemId) -> AppResult<Vec<Item>> {
        self.read("folder_items");
        self.service.list_folder(folder_id).await
    }

    async fn update_position(&self, item_id: ItemId, position: Position) -> AppResult<Item> {
        self.mutate("update_position")?;
        self.service.update_position(item_id, position).await
    }

    async fn update_dimensions(&self, item_id: ItemId, dimensions: Dimensions) -> AppResult<Item> {
        self.mutate("update_dimensions")?;
        self.service.update_dimensions(item_id, dimensions).await
    }

    async fn rename(&self, item_id: ItemId, name: &str) -> AppResult<Item> {
        self.mutate("rename")?;
        self.service.rename(item_id, name).await
    }

    async fn add_to_folder(&self, folder_id: ItemId, item_id: ItemId) -> AppResult<Item> {
        self.mutate("add_to_folder")?;
        self.service.add_to_folder(folder_id, item_id).await
    }

    async fn remove_from_folder(
        &self,
        item_id: ItemId,
        position: Option<Position>,
    ) -> AppResult<Item> {
        self.mutate("remove_from_folder")?;
        self.service.remove_from_folder(item_id, position).await
    }

    async fn create_folder(&self, name: &str, position: Position) -> AppResult<Item> {
        self.mutate("create_folder")?;
        self.service.create_folder(name, position).await
    }

    async fn delete_item(&self, item_id: ItemId) -> AppResult<()> {
        self.mutate("delete_item")?;
        self.service.delete(item_id).await
    }
}

/// Connector that attaches each connection to the gateway's realtime
/// engine, standing in for the WebSocket route.
pub struct EngineConnector {
    gateway: Arc<TestGateway>,
    online: AtomicBool,
    answer_refresh: Arc<AtomicBool>,
    connects: AtomicUsize,
    inbound: Arc<Mutex<Vec<String>>>,
    kill: watch::Sender<u64>,
}

impl EngineConnector {
    pub fn new(gateway: Arc<TestGateway>) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            online: AtomicBool::new(true),
            answer_refresh: Arc::new(AtomicBool::new(true)),
            connects: AtomicUsize::new(0),
            inbound: Arc::new(Mutex::new(Vec::new())),
            kill: watch::Sender::new(0),
        })
    }

    pub fn offline(gateway: Arc<TestGateway>) -> Arc<Self> {
        let connector = Self::new(gateway);
        connector.set_online(false);
        connector
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Swallow refresh requests instead of answering them.
    pub fn set_answer_refresh(&self, answer: bool) {
        self.answer_refresh.store(answer, Ordering::SeqCst);
    }

    /// Close every live connection from the server side.
    pub fn drop_connections(&self) {
        self.kill.send_modify(|generation| *generation += 1);
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// `type` of every frame the server received, in order.
    pub fn inbound_types(&self) -> Vec<String> {
        self.inbound.lock().unwrap().clone()
    }

    pub fn count_inbound(&self, kind: &str) -> usize {
        self.inbound.lock().unwrap().iter().filter(|t| *t == kind).count()
    }
}

#[async_trait]
impl Connector for EngineConnector {
    async fn connect(&self) -> AppResult<Connection> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(AppError::network("server unreachable"));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);

        let connections = self.gateway.realtime.connections.clone();
        let service = self.gateway.service.clone();
        let (handle, mut outbound) = connections.register();
        let conn_id = handle.id;

        let (to_server, mut from_client) = futures::channel::mpsc::unbounded::<String>();
        let (to_client, from_server) = futures::channel::mpsc::unbounded::<AppResult<String>>();
        let answer_refresh = self.answer_refresh.clone();
        let inbound = self.inbound.clone();
        let mut kill = self.kill.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = outbound.recv() => match frame {
                        Some(frame) => {
                            if to_client.unbounded_send(Ok(frame)).is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                    frame = from_client.next() => match frame {
                        Some(text) => {
                            let kind = serde_json::from_str::<serde_json::Value>(&text)
                                .ok()
                                .and_then(|v| v["type"].as_str().map(str::to_owned))
                                .unwrap_or_default();
                            inbound.lock().unwrap().push(kind.clone());
                            if kind == "requestFolderRefresh"
                                && !answer_refresh.load(Ordering::SeqCst)
                            {
                                continue;
                            }
                            connections.handle_inbound(&conn_id, &text, service.as_ref()).await;
                        }
                        None => break,
                    },
                    _ = kill.changed() => break,
                }
            }
            connections.unregister(&conn_id);
        });

        Ok(Connection {
            sink: Box::pin(to_server.sink_map_err(|e| AppError::network(e.to_string()))),
            stream: Box::pin(from_server),
        })
    }
}

/// Seeded world used by the scenarios:
///
/// | id | item                       |
/// |----|----------------------------|
/// | 1  | file on desktop at (50,50) |
/// | 2  | folder, icon at (300,50)   |
/// | 3  | file inside folder 2       |
/// | 4  | folder, icon at (50,300)   |
/// | 5  | folder, icon at (300,300)  |
pub async fn seeded_gateway() -> Arc<TestGateway> {
    let gateway = TestGateway::new();
    gateway.seed(NewItem::file("notes.txt", Position::new(50, 50))).await;
    gateway.seed(NewItem::folder("Projects", Position::new(300, 50))).await;
    gateway
        .seed(NewItem::file("plan.md", Position::default()).in_folder(ItemId(2)))
        .await;
    gateway.seed(NewItem::folder("Archive", Position::new(50, 300))).await;
    gateway.seed(NewItem::folder("Photos", Position::new(300, 300))).await;
    gateway
}

pub fn config() -> ClientConfig {
    ClientConfig::default()
}

/// Let spawned tasks run without reaching any configured timer.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

/// Sorted raw ids, for order-insensitive comparisons.
pub fn ids(items: &[Item]) -> Vec<i64> {
    let mut ids: Vec<i64> = items.iter().map(|i| i.id.get()).collect();
    ids.sort_unstable();
    ids
}
