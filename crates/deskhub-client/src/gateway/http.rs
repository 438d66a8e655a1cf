//! [`ItemGateway`] over HTTP with `reqwest`.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use deskhub_core::config::ClientConfig;
use deskhub_core::error::{AppError, ErrorKind};
use deskhub_core::result::AppResult;
use deskhub_core::types::ItemId;
use deskhub_entity::{Dimensions, Item, Position};

use super::ItemGateway;

#[derive(Debug, Deserialize)]
struct ItemsBody {
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

/// Gateway that talks to a running Deskhub server.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "HTTP response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) if !parsed.message.is_empty() => parsed.message,
            Ok(parsed) if !parsed.error.is_empty() => parsed.error,
            _ => format!("Server responded {status}"),
        };
        Err(AppError::new(kind_for_status(status), message))
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Serialization,
                    format!("Invalid response body: {e}"),
                    e,
                )
            })
    }
}

/// Map a response status back to the error kind the server raised.
pub fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
        StatusCode::CONFLICT => ErrorKind::Conflict,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ErrorKind::Timeout,
        StatusCode::SERVICE_UNAVAILABLE => ErrorKind::ServiceUnavailable,
        _ => ErrorKind::Internal,
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::with_source(ErrorKind::Timeout, format!("Request timed out: {err}"), err)
    } else {
        AppError::with_source(ErrorKind::Network, format!("Request failed: {err}"), err)
    }
}

#[async_trait]
impl ItemGateway for HttpGateway {
    async fn list_items(&self) -> AppResult<Vec<Item>> {
        let body: ItemsBody = self.json(self.request(Method::GET, "/items")).await?;
        Ok(body.items)
    }

    async fn folder_items(&self, folder_id: ItemId) -> AppResult<Vec<Item>> {
        let body: ItemsBody = self
            .json(self.request(Method::GET, &format!("/folders/{folder_id}/items")))
            .await?;
        Ok(body.items)
    }

    async fn update_position(&self, item_id: ItemId, position: Position) -> AppResult<Item> {
        self.json(
            self.request(Method::PATCH, &format!("/items/{item_id}/position"))
                .json(&position),
        )
        .await
    }

    async fn update_dimensions(&self, item_id: ItemId, dimensions: Dimensions) -> AppResult<Item> {
        self.json(
            self.request(Method::PATCH, &format!("/items/{item_id}/dimensions"))
                .json(&dimensions),
        )
        .await
    }

    async fn rename(&self, item_id: ItemId, name: &str) -> AppResult<Item> {
        self.json(
            self.request(Method::PATCH, &format!("/items/{item_id}/name"))
                .json(&json!({ "name": name })),
        )
        .await
    }

    async fn add_to_folder(&self, folder_id: ItemId, item_id: ItemId) -> AppResult<Item> {
        self.json(self.request(Method::POST, &format!("/folders/{folder_id}/items/{item_id}")))
            .await
    }

    async fn remove_from_folder(
        &self,
        item_id: ItemId,
        position: Option<Position>,
    ) -> AppResult<Item> {
        let request = self.request(Method::DELETE, &format!("/folders/items/{item_id}"));
        let request = match position {
            Some(position) => request.json(&json!({ "position": position })),
            None => request,
        };
        self.json(request).await
    }

    async fn create_folder(&self, name: &str, position: Position) -> AppResult<Item> {
        self.json(
            self.request(Method::POST, "/folders")
                .json(&json!({ "name": name, "position": position })),
        )
        .await
    }

    async fn delete_item(&self, item_id: ItemId) -> AppResult<()> {
        self.send(self.request(Method::DELETE, &format!("/items/{item_id}")))
            .await?;
        Ok(())
    }
}
