use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use recipebook::{
    build_app,
    config::AppConfig,
    storage::{Document, DocumentStore, JsonFileStore, MemoryStore},
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn spawn_app() -> (Router, AppState) {
    let state = AppState::in_memory(AppConfig::default());
    (build_app(state.clone()), state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn signup_body(email: &str) -> Value {
    json!({
        "firstName": "A",
        "lastName": "B",
        "email": email,
        "dateOfBirth": "2000-01-01",
        "password": "Abcdef1!"
    })
}

fn recipe_body() -> Value {
    json!({
        "title": "Protein bowl",
        "description": "Chicken, rice and greens",
        "image": "/img/bowl.jpg",
        "time": 25,
        "calories": 520,
        "nutrition": { "protein": 42, "carbs": 55, "fat": 14 },
        "tags": ["high-protein", "lunch"],
        "ingredients": ["chicken", "rice", "spinach"]
    })
}

#[tokio::test]
async fn root_reports_running() {
    let (app, _) = spawn_app();
    let (status, body) = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "API is running" }));
}

#[tokio::test]
async fn signup_creates_user_with_hashed_password() {
    let (app, state) = spawn_app();

    let (status, body) = send(&app, Method::POST, "/api/signup", Some(signup_body("a@b.com")), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["id"], 1);
    assert_eq!(body["user"]["email"], "a@b.com");
    assert!(body["user"].get("password").is_none());
    assert!(!body["token"].as_str().unwrap().is_empty());

    let stored = state.users.read().await.users;
    assert_eq!(stored.len(), 1);
    assert_ne!(stored[0].password_hash, "Abcdef1!");

    let (_, second) = send(&app, Method::POST, "/api/signup", Some(signup_body("c@d.com")), None).await;
    assert_eq!(second["user"]["id"], 2);
}

#[tokio::test]
async fn signup_rejects_email_differing_only_in_case() {
    let (app, _) = spawn_app();
    send(&app, Method::POST, "/api/signup", Some(signup_body("a@b.com")), None).await;

    let (status, body) = send(&app, Method::POST, "/api/signup", Some(signup_body("A@B.COM")), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User with this email already exists");
}

#[tokio::test]
async fn signup_validation_failures_are_bad_requests() {
    let (app, _) = spawn_app();

    let mut missing = signup_body("a@b.com");
    missing.as_object_mut().unwrap().remove("lastName");
    let (status, body) = send(&app, Method::POST, "/api/signup", Some(missing), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");

    let (status, body) = send(&app, Method::POST, "/api/signup", Some(signup_body("nope")), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email format");

    let mut weak = signup_body("a@b.com");
    weak["password"] = json!("password");
    let (status, _) = send(&app, Method::POST, "/api/signup", Some(weak), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (app, _) = spawn_app();
    send(&app, Method::POST, "/api/signup", Some(signup_body("a@b.com")), None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        Some(json!({ "email": "a@b.com", "password": "Wrong1!x" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        Some(json!({ "email": "ghost@b.com", "password": "Abcdef1!" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn login_token_unlocks_me() {
    let (app, _) = spawn_app();
    send(&app, Method::POST, "/api/signup", Some(signup_body("a@b.com")), None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        Some(json!({ "email": "A@b.com", "password": "Abcdef1!" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, Method::GET, "/api/me", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["email"], "a@b.com");

    let (status, _) = send(&app, Method::GET, "/api/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/me", None, Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_requires_fields() {
    let (app, _) = spawn_app();
    let (status, _) = send(&app, Method::POST, "/api/login", Some(json!({ "email": "a@b.com" })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_recipe_without_title_is_rejected() {
    let (app, _) = spawn_app();
    let mut body = recipe_body();
    body.as_object_mut().unwrap().remove("title");

    let (status, body) = send(&app, Method::POST, "/api/recipes", Some(body), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required recipe fields");
}

#[tokio::test]
async fn unknown_recipe_is_not_found() {
    let (app, _) = spawn_app();
    let (status, body) = send(&app, Method::GET, "/api/recipes/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Recipe not found");

    let (status, _) = send(&app, Method::PUT, "/api/recipes/999", Some(json!({ "title": "x" })), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/recipes/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recipe_crud_flow() {
    let (app, _) = spawn_app();

    let (status, list) = send(&app, Method::GET, "/api/recipes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!({ "recipes": [] }));

    let (status, created) = send(&app, Method::POST, "/api/recipes", Some(recipe_body()), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "Recipe created successfully");
    let recipe = created["recipe"].clone();
    assert_eq!(recipe["id"], 1);
    assert_eq!(recipe["tags"], json!(["high-protein", "lunch"]));
    assert!(recipe["createdAt"].is_string());

    let (status, fetched) = send(&app, Method::GET, "/api/recipes/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["recipe"], recipe);

    let (status, updated) = send(
        &app,
        Method::PUT,
        "/api/recipes/1",
        Some(json!({ "id": 42, "title": "Bigger bowl", "calories": "600" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["message"], "Recipe updated successfully");
    assert_eq!(updated["recipe"]["id"], 1);
    assert_eq!(updated["recipe"]["title"], "Bigger bowl");
    assert_eq!(updated["recipe"]["calories"], 600);
    assert_eq!(updated["recipe"]["description"], recipe["description"]);
    assert!(updated["recipe"]["updatedAt"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/recipes/42", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, deleted) = send(&app, Method::DELETE, "/api/recipes/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Recipe deleted successfully");

    let (status, _) = send(&app, Method::GET, "/api/recipes/1", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_requests_are_bad_requests() {
    let (app, _) = spawn_app();

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/recipes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

}

#[tokio::test]
async fn non_numeric_id_is_not_found() {
    let (app, _) = spawn_app();
    for method in [Method::GET, Method::DELETE] {
        let (status, body) = send(&app, method, "/api/recipes/abc", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Recipe not found");
    }
    let (status, _) = send(&app, Method::PUT, "/api/recipes/abc", Some(recipe_body()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hand_edited_records_are_listed_and_kept() {
    let seeded = json!({
        "recipes": [
            { "id": 1, "title": "Old A", "description": "d", "image": "a.jpg", "time": "30",
              "createdAt": "2024-01-01T00:00:00.000Z" },
            { "id": 2, "title": "Old B", "description": "d", "image": "b.jpg", "calories": 150 }
        ]
    });
    let store = Arc::new(MemoryStore::new().with_document(Document::Recipes, seeded.to_string()));
    let app = build_app(AppState::from_parts(Arc::new(AppConfig::default()), store.clone()));

    let (status, list) = send(&app, Method::GET, "/api/recipes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["recipes"].as_array().unwrap().len(), 2);
    assert_eq!(list["recipes"][0]["time"], 30);

    let (status, body) = send(&app, Method::POST, "/api/recipes", Some(recipe_body()), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["recipe"]["id"], 3);

    let on_disk = store.load(Document::Recipes).await.unwrap().unwrap();
    let on_disk = String::from_utf8(on_disk).unwrap();
    assert!(on_disk.contains("Old A") && on_disk.contains("Old B"));
}

#[tokio::test]
async fn undecodable_document_blocks_writes() {
    let store = Arc::new(MemoryStore::new().with_document(Document::Recipes, "{\"recipes\": 7}"));
    let app = build_app(AppState::from_parts(Arc::new(AppConfig::default()), store.clone()));

    let (status, list) = send(&app, Method::GET, "/api/recipes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["recipes"], json!([]));

    let (status, body) = send(&app, Method::POST, "/api/recipes", Some(recipe_body()), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");

    let on_disk = store.load(Document::Recipes).await.unwrap().unwrap();
    assert_eq!(on_disk, b"{\"recipes\": 7}");
}

struct BrokenStore;

#[async_trait]
impl DocumentStore for BrokenStore {
    async fn load(&self, _doc: Document) -> anyhow::Result<Option<Vec<u8>>> {
        anyhow::bail!("disk unavailable")
    }
    async fn save(&self, _doc: Document, _body: Vec<u8>) -> anyhow::Result<()> {
        anyhow::bail!("disk unavailable")
    }
}

#[tokio::test]
async fn storage_failure_is_internal_error() {
    let state = AppState::from_parts(Arc::new(AppConfig::default()), Arc::new(BrokenStore));
    let app = build_app(state);

    // Reads degrade to an empty collection.
    let (status, list) = send(&app, Method::GET, "/api/recipes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["recipes"], json!([]));

    let (status, body) = send(&app, Method::POST, "/api/recipes", Some(recipe_body()), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn file_store_persists_across_restarts() {
    let dir = std::env::temp_dir().join(format!("recipebook-api-{}", uuid::Uuid::new_v4()));
    let config = AppConfig {
        data_dir: dir.clone(),
        ..AppConfig::default()
    };

    let app = build_app(AppState::init(config.clone()));
    send(&app, Method::POST, "/api/recipes", Some(recipe_body()), None).await;
    send(&app, Method::POST, "/api/signup", Some(signup_body("a@b.com")), None).await;

    let users_json = std::fs::read_to_string(JsonFileStore::new(&dir).path_of(Document::Users)).unwrap();
    assert!(users_json.contains("\"users\""));
    assert!(!users_json.contains("Abcdef1!"));

    let restarted = build_app(AppState::init(config));
    let (status, body) = send(&restarted, Method::GET, "/api/recipes/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipe"]["title"], "Protein bowl");

    let (status, _) = send(
        &restarted,
        Method::POST,
        "/api/login",
        Some(json!({ "email": "a@b.com", "password": "Abcdef1!" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let _ = std::fs::remove_dir_all(dir);
}
