// List API integration tests
// Drives the real router over the in-memory store; no database required.

use std::fmt;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use lists_api::{
    config::{Config, StorageBackend},
    constants::messages::{DUPLICATE_ITEM_ERROR, EMPTY_ITEM_ERROR, LIST_NOT_FOUND},
    database::{ListStore, MemoryListStore},
    models::ListId,
    router::build_router,
    startup::build_state,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tracing::{
    field::{Field, Visit},
    span::{Attributes, Id},
    Event, Level, Subscriber,
};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    Layer,
};

const BOUNDARY: &str = "list-item-boundary";

struct TestApp {
    router: Router,
    store: Arc<MemoryListStore>,
}

impl TestApp {
    fn new() -> Self {
        let config = Config {
            storage: StorageBackend::Memory,
            environment: "test".to_string(),
            ..Config::default()
        };
        let store = Arc::new(MemoryListStore::new());
        let state = build_state(&config, store.clone());
        Self {
            router: build_router(state),
            store,
        }
    }

    async fn create_list(&self) -> ListId {
        self.store.create_list().await.unwrap().list_id()
    }

    async fn create_item(&self, list: ListId, text: &str) -> i64 {
        self.store.insert_item(list, text).await.unwrap().id
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_form(&self, uri: &str, body: &str) -> Response {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn post_multipart(&self, uri: &str, fields: &[(&str, &str)]) -> Response {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(fields)))
                .unwrap(),
        )
        .await
    }

    async fn post_empty_input(&self) -> (ListId, Response) {
        let list = self.create_list().await;
        let response = self.post_form(&list_url(list), "text=").await;
        (list, response)
    }
}

fn list_url(list: ListId) -> String {
    format!("/api/lists/{}/", list)
}

fn multipart_body(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_get_returns_json_200() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app.get(&list_url(list)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_get_returns_items_for_correct_list() {
    let app = TestApp::new();
    let other_list = app.create_list().await;
    app.create_item(other_list, "item 1").await;
    let our_list = app.create_list().await;
    let item1 = app.create_item(our_list, "item 1").await;
    let item2 = app.create_item(our_list, "item 2").await;

    let response = app.get(&list_url(our_list)).await;

    assert_eq!(
        body_json(response).await,
        json!([
            {"id": item1, "text": "item 1"},
            {"id": item2, "text": "item 2"},
        ])
    );
}

#[tokio::test]
async fn test_get_empty_list_returns_empty_array() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app.get(&list_url(list)).await;

    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_posting_a_new_item() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app.post_form(&list_url(list), "text=new+item").await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let items = app.store.items_for_list(list).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "new item");
}

#[tokio::test]
async fn test_posted_item_is_returned() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app.post_form(&list_url(list), "text=new+item").await;
    let created = body_json(response).await;
    assert_eq!(created["text"], "new item");

    let listed = body_json(app.get(&list_url(list)).await).await;
    assert_eq!(listed, json!([created]));
}

#[tokio::test]
async fn test_for_invalid_input_nothing_saved_to_db() {
    let app = TestApp::new();
    app.post_empty_input().await;
    assert_eq!(app.store.total_items().await, 0);
}

#[tokio::test]
async fn test_for_invalid_input_returns_error_code() {
    let app = TestApp::new();
    let (_, response) = app.post_empty_input().await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": EMPTY_ITEM_ERROR}));
}

#[tokio::test]
async fn test_whitespace_only_input_is_empty() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app.post_form(&list_url(list), "text=+++").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": EMPTY_ITEM_ERROR}));
    assert_eq!(app.store.count_items(list).await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_text_field_is_empty() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app.post_form(&list_url(list), "").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": EMPTY_ITEM_ERROR}));
}

#[tokio::test]
async fn test_duplicate_items_error() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let first = app.post_form(&list_url(list), "text=thing").await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let response = app.post_form(&list_url(list), "text=thing").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": DUPLICATE_ITEM_ERROR})
    );
    assert_eq!(app.store.count_items(list).await.unwrap(), 1);
}

#[tokio::test]
async fn test_same_text_allowed_in_different_lists() {
    let app = TestApp::new();
    let list1 = app.create_list().await;
    let list2 = app.create_list().await;

    let first = app.post_form(&list_url(list1), "text=thing").await;
    let second = app.post_form(&list_url(list2), "text=thing").await;

    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(second.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_posting_json_body() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app
        .post_json(&list_url(list), json!({"text": "from json"}))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(app.store.count_items(list).await.unwrap(), 1);
}

#[tokio::test]
async fn test_null_json_text_is_empty() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app.post_json(&list_url(list), json!({"text": null})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": EMPTY_ITEM_ERROR}));
    assert_eq!(app.store.count_items(list).await.unwrap(), 0);
}

#[tokio::test]
async fn test_posting_multipart_form() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app
        .post_multipart(&list_url(list), &[("text", "new item")])
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["text"], "new item");
    assert_eq!(app.store.count_items(list).await.unwrap(), 1);
}

#[tokio::test]
async fn test_empty_multipart_text_is_rejected() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app.post_multipart(&list_url(list), &[("text", "")]).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": EMPTY_ITEM_ERROR}));
    assert_eq!(app.store.count_items(list).await.unwrap(), 0);
}

#[tokio::test]
async fn test_multipart_without_text_field_is_empty() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app
        .post_multipart(&list_url(list), &[("note", "not the text")])
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": EMPTY_ITEM_ERROR}));
}

#[tokio::test]
async fn test_duplicate_multipart_item_is_rejected() {
    let app = TestApp::new();
    let list = app.create_list().await;
    app.create_item(list, "thing").await;

    let response = app.post_multipart(&list_url(list), &[("text", "thing")]).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": DUPLICATE_ITEM_ERROR})
    );
    assert_eq!(app.store.count_items(list).await.unwrap(), 1);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri(list_url(list))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_unknown_list_is_404() {
    let app = TestApp::new();

    let response = app.get("/api/lists/999/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"error": LIST_NOT_FOUND}));

    let response = app.post_form("/api/lists/999/", "text=orphan").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.total_items().await, 0);
}

#[tokio::test]
async fn test_non_numeric_list_id_is_404() {
    let app = TestApp::new();

    let response = app.get("/api/lists/abc/").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"error": LIST_NOT_FOUND}));
}

#[tokio::test]
async fn test_path_without_trailing_slash() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app.get(&format!("/api/lists/{}", list)).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_list_endpoint() {
    let app = TestApp::new();

    let response = app.post_form("/api/lists/", "").await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["id"].as_i64().unwrap();
    assert!(app.store.find_list(ListId(id)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = TestApp::new();

    let response = app.get("/api/docs/openapi.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"]["/api/lists/{list_id}/"].is_object());
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app.get(&list_url(list)).await;

    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new();

    let response = app.get("/nope").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].is_string());
}

/// Events recorded by `CapturedLogs`, with the request id of the enclosing span
#[derive(Debug, Clone)]
struct CapturedEvent {
    level: Level,
    request_id: Option<String>,
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedLogs {
    fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.level == level)
            .cloned()
            .collect()
    }
}

struct SpanRequestId(String);

#[derive(Default)]
struct RequestIdVisitor(Option<String>);

impl Visit for RequestIdVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "request_id" {
            self.0 = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "request_id" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S> Layer<S> for CapturedLogs
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = RequestIdVisitor::default();
        attrs.record(&mut visitor);
        if let (Some(request_id), Some(span)) = (visitor.0, ctx.span(id)) {
            span.extensions_mut().insert(SpanRequestId(request_id));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut request_id = None;
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                let extensions = span.extensions();
                if let Some(SpanRequestId(id)) = extensions.get::<SpanRequestId>() {
                    request_id = Some(id.clone());
                    break;
                }
            }
        }
        self.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            request_id,
        });
    }
}

#[tokio::test]
async fn test_rejected_item_logs_one_warning_tagged_with_request_id() {
    let logs = CapturedLogs::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(logs.clone()));

    let app = TestApp::new();
    let list = app.create_list().await;

    let response = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri(list_url(list))
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header("x-request-id", "req-42")
                .body(Body::from("text="))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let warnings = logs.at_level(Level::WARN);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert_eq!(warnings[0].request_id.as_deref(), Some("req-42"));
}
