use super::*;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
};
use serde_json::Value;
use tower::ServiceExt;
use vigil_core::HandlerRegistry;
use vigil_protocols::{
    Check, CheckDefinition, Handler, Incident, Message, MessageType, SendError, Sender, Storage,
    StorageError,
};
use vigil_storage::MemoryStorage;

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<Message>>,
}

#[async_trait]
impl Sender for RecordingSender {
    fn kind(&self) -> &str {
        "recording"
    }

    async fn send(&self, message: &Message) -> Result<(), SendError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

struct FailingSender;

#[async_trait]
impl Sender for FailingSender {
    fn kind(&self) -> &str {
        "failing"
    }

    async fn send(&self, _message: &Message) -> Result<(), SendError> {
        Err(SendError::Request("connection refused".to_string()))
    }
}

struct BrokenStorage;

#[async_trait]
impl Storage for BrokenStorage {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn get(&self, _name: &str) -> Result<Option<Incident>, StorageError> {
        Err(StorageError::Backend("disk on fire".to_string()))
    }

    async fn get_all(&self) -> Result<Vec<Incident>, StorageError> {
        Err(StorageError::Backend("disk on fire".to_string()))
    }

    async fn set(&self, _incident: &Incident) -> Result<(), StorageError> {
        Err(StorageError::Backend("disk on fire".to_string()))
    }

    async fn update(&self, _name: &str, _incident: &Incident) -> Result<(), StorageError> {
        Err(StorageError::Backend("disk on fire".to_string()))
    }

    async fn delete(&self, _name: &str) -> Result<(), StorageError> {
        Err(StorageError::Backend("disk on fire".to_string()))
    }
}

struct HangingStorage;

#[async_trait]
impl Storage for HangingStorage {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn get(&self, _name: &str) -> Result<Option<Incident>, StorageError> {
        std::future::pending().await
    }

    async fn get_all(&self) -> Result<Vec<Incident>, StorageError> {
        std::future::pending().await
    }

    async fn set(&self, _incident: &Incident) -> Result<(), StorageError> {
        std::future::pending().await
    }

    async fn update(&self, _name: &str, _incident: &Incident) -> Result<(), StorageError> {
        std::future::pending().await
    }

    async fn delete(&self, _name: &str) -> Result<(), StorageError> {
        std::future::pending().await
    }
}

fn create_test_router(storage: Arc<dyn Storage>, registry: Arc<HandlerRegistry>) -> Router {
    create_router(Arc::new(AppState::new(storage, registry)))
}

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(app: Router, uri: &str, body: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn open_incident(name: &str, output: &str) -> Incident {
    let mut check = Check::new(CheckDefinition::new(name, "check_disk", 60), Vec::new());
    check.state.status = 2;
    check.state.output = output.to_string();
    Incident::open(&mut check)
}

#[tokio::test]
async fn test_root_endpoint() {
    let app = create_test_router(Arc::new(MemoryStorage::new()), Arc::new(HandlerRegistry::new()));
    let response = get(app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "Vigil API");
}

#[tokio::test]
async fn test_incidents_empty() {
    let app = create_test_router(Arc::new(MemoryStorage::new()), Arc::new(HandlerRegistry::new()));
    let response = get(app, "/incidents").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["incidents"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_incidents_lists_open_incidents() {
    let storage = Arc::new(MemoryStorage::new());
    let incident = open_incident("disk", "92% full");
    storage.set(&incident).await.unwrap();

    let app = create_test_router(storage, Arc::new(HandlerRegistry::new()));
    let response = get(app, "/incidents").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let incidents = body["incidents"].as_array().unwrap();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0]["id"], incident.id.as_str());
    assert_eq!(incidents[0]["name"], "disk");
    assert_eq!(incidents[0]["output"], "92% full");
}

#[tokio::test]
async fn test_incidents_storage_error() {
    let app = create_test_router(Arc::new(BrokenStorage), Arc::new(HandlerRegistry::new()));
    let response = get(app, "/incidents").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Error getting incidents"));
    assert!(error.contains("disk on fire"));
}

#[tokio::test]
async fn test_incidents_storage_deadline() {
    let state = AppState::new(Arc::new(HangingStorage), Arc::new(HandlerRegistry::new()))
        .with_storage_deadline(Duration::from_millis(50));
    let app = create_router(Arc::new(state));
    let response = get(app, "/incidents").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_stats_lists_handlers() {
    let registry = Arc::new(HandlerRegistry::new());
    registry
        .register(Handler::new("ops", Arc::new(RecordingSender::default())))
        .unwrap();
    registry
        .register(Handler::new("pager", Arc::new(FailingSender)))
        .unwrap();

    let app = create_test_router(Arc::new(MemoryStorage::new()), registry);
    let response = get(app, "/stats").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let handlers = body["handlers"].as_object().unwrap();
    assert_eq!(handlers.len(), 2);
    assert_eq!(handlers["ops"]["name"], "ops");
    assert_eq!(handlers["ops"]["type"], "recording");
    assert_eq!(handlers["pager"]["type"], "failing");
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_send_delivers_new_message() {
    let sender = Arc::new(RecordingSender::default());
    let registry = Arc::new(HandlerRegistry::new());
    registry.register(Handler::new("ops", sender.clone())).unwrap();

    let app = create_test_router(Arc::new(MemoryStorage::new()), registry);
    let response = post_json(
        app,
        "/handlers/ops/send",
        r#"{"title": "Maintenance", "body": "db01 reboot at 22:00"}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "message sent");

    let sent = sender.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Maintenance");
    assert_eq!(sent[0].body, "db01 reboot at 22:00");
    assert_eq!(sent[0].kind, MessageType::New);
}

#[tokio::test]
async fn test_send_unknown_handler() {
    let app = create_test_router(Arc::new(MemoryStorage::new()), Arc::new(HandlerRegistry::new()));
    let response = post_json(app, "/handlers/ghost/send", r#"{"title": "t", "body": "b"}"#).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("'ghost'"));
}

#[tokio::test]
async fn test_send_malformed_body() {
    let sender = Arc::new(RecordingSender::default());
    let registry = Arc::new(HandlerRegistry::new());
    registry.register(Handler::new("ops", sender.clone())).unwrap();

    let app = create_test_router(Arc::new(MemoryStorage::new()), registry);
    let response = post_json(app, "/handlers/ops/send", "{not json").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(sender.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_send_missing_fields() {
    let registry = Arc::new(HandlerRegistry::new());
    registry
        .register(Handler::new("ops", Arc::new(RecordingSender::default())))
        .unwrap();

    let app = create_test_router(Arc::new(MemoryStorage::new()), registry);
    let response = post_json(app, "/handlers/ops/send", r#"{"title": "only"}"#).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_failure() {
    let registry = Arc::new(HandlerRegistry::new());
    registry
        .register(Handler::new("pager", Arc::new(FailingSender)))
        .unwrap();

    let app = create_test_router(Arc::new(MemoryStorage::new()), registry);
    let response = post_json(app, "/handlers/pager/send", r#"{"title": "t", "body": "b"}"#).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Error sending message"));
    assert!(error.contains("connection refused"));
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_router(Arc::new(MemoryStorage::new()), Arc::new(HandlerRegistry::new()));
    let response = get(app, "/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
