//! Integration tests for the item and folder HTTP API.

mod helpers;

use http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["ws_connections"], 0);
}

#[tokio::test]
async fn test_list_items_returns_everything() {
    let app = helpers::TestApp::seeded().await;

    let response = app.request("GET", "/items", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.item_ids(), vec![1, 2, 3, 4]);
    assert_eq!(response.body["items"][2]["parentId"], 2);
    assert_eq!(response.body["items"][0]["position"], json!({"x": 50, "y": 50}));
}

#[tokio::test]
async fn test_folder_contents() {
    let app = helpers::TestApp::seeded().await;

    let response = app.request("GET", "/folders/2/items", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.item_ids(), vec![3]);

    let missing = app.request("GET", "/folders/99/items", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_create_folder() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "POST",
            "/folders",
            Some(json!({"name": "  Reports  ", "position": {"x": 10, "y": 20}})),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["name"], "Reports");
    assert_eq!(response.body["kind"], "folder");
    assert_eq!(response.body["position"], json!({"x": 10, "y": 20}));
}

#[tokio::test]
async fn test_create_folder_rejects_blank_name() {
    let app = helpers::TestApp::new();

    let response = app
        .request("POST", "/folders", Some(json!({"name": ""})))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_add_to_folder() {
    let app = helpers::TestApp::seeded().await;

    let response = app.request("POST", "/folders/2/items/1", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["parentId"], 2);

    // Repeating the move is a no-op.
    let again = app.request("POST", "/folders/2/items/1", None).await;
    assert_eq!(again.status, StatusCode::OK);

    let contents = app.request("GET", "/folders/2/items", None).await;
    assert_eq!(contents.item_ids(), vec![1, 3]);
}

#[tokio::test]
async fn test_add_folder_to_folder_conflicts() {
    let app = helpers::TestApp::seeded().await;

    let response = app.request("POST", "/folders/2/items/4", None).await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "CONFLICT");
    let contents = app.request("GET", "/folders/2/items", None).await;
    assert_eq!(contents.item_ids(), vec![3]);
}

#[tokio::test]
async fn test_add_to_non_folder_or_self_is_rejected() {
    let app = helpers::TestApp::seeded().await;

    let into_file = app.request("POST", "/folders/1/items/3", None).await;
    assert_eq!(into_file.status, StatusCode::BAD_REQUEST);

    let into_self = app.request("POST", "/folders/2/items/2", None).await;
    assert_eq!(into_self.status, StatusCode::BAD_REQUEST);

    let missing = app.request("POST", "/folders/2/items/42", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remove_from_folder_with_position() {
    let app = helpers::TestApp::seeded().await;

    let response = app
        .request(
            "DELETE",
            "/folders/items/3",
            Some(json!({"position": {"x": 120, "y": 80}})),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["parentId"], serde_json::Value::Null);
    assert_eq!(response.body["position"], json!({"x": 120, "y": 80}));
    let contents = app.request("GET", "/folders/2/items", None).await;
    assert!(contents.item_ids().is_empty());
}

#[tokio::test]
async fn test_remove_from_folder_without_body() {
    let app = helpers::TestApp::seeded().await;

    let response = app.request("DELETE", "/folders/items/3", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["parentId"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_update_position() {
    let app = helpers::TestApp::seeded().await;

    let response = app
        .request("PATCH", "/items/1/position", Some(json!({"x": -40, "y": 90})))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["position"], json!({"x": -40, "y": 90}));

    let off_canvas = app
        .request(
            "PATCH",
            "/items/1/position",
            Some(json!({"x": 2_000_000, "y": 0})),
        )
        .await;
    assert_eq!(off_canvas.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_dimensions_and_name() {
    let app = helpers::TestApp::seeded().await;

    let resized = app
        .request(
            "PATCH",
            "/items/2/dimensions",
            Some(json!({"width": 320, "height": 240})),
        )
        .await;
    assert_eq!(resized.status, StatusCode::OK);
    assert_eq!(resized.body["dimensions"], json!({"width": 320, "height": 240}));

    let zero = app
        .request(
            "PATCH",
            "/items/2/dimensions",
            Some(json!({"width": 0, "height": 240})),
        )
        .await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);

    let renamed = app
        .request("PATCH", "/items/1/name", Some(json!({"name": "todo.txt"})))
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["name"], "todo.txt");

    let missing = app
        .request("PATCH", "/items/77/name", Some(json!({"name": "x"})))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_folder_releases_children() {
    let app = helpers::TestApp::seeded().await;

    let response = app.request("DELETE", "/items/2", None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let items = app.request("GET", "/items", None).await;
    assert_eq!(items.item_ids(), vec![1, 3, 4]);
    assert_eq!(items.body["items"][1]["parentId"], serde_json::Value::Null);

    let gone = app.request("DELETE", "/items/2", None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = helpers::TestApp::seeded().await;

    let response = app
        .request("PATCH", "/items/1/position", Some(json!({"x": "left"})))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
