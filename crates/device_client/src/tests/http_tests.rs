use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: &'static str,
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: Option<Value>,
}

#[derive(Clone)]
struct ServerState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    fail_with: Option<(StatusCode, &'static str)>,
}

impl ServerState {
    async fn record(
        &self,
        method: &'static str,
        path: String,
        headers: &HeaderMap,
        body: Option<Value>,
    ) -> Option<Response> {
        let header_text = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().await.push(RecordedRequest {
            method,
            path,
            authorization: header_text(header::AUTHORIZATION),
            content_type: header_text(header::CONTENT_TYPE),
            body,
        });
        self.fail_with
            .map(|(status, body)| (status, body).into_response())
    }
}

async fn handle_get_device(
    State(state): State<ServerState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Some(failure) = state
        .record("GET", format!("/devices/{name}"), &headers, None)
        .await
    {
        return failure;
    }

    match name.as_str() {
        "missing" => (StatusCode::NOT_FOUND, "device not found").into_response(),
        "garbled" => (StatusCode::OK, "<html>not json</html>").into_response(),
        _ => Json(json!({
            "Id": "1",
            "Device": name.clone(),
            "Meta": { "UserDescription": "Apiary North" },
            "Annotations": [
                { "Id": "a1", "Description": "ok", "Data": { "Hives": 12 } }
            ]
        }))
        .into_response(),
    }
}

async fn handle_update_device(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = state
        .record("PUT", format!("/devices/{id}"), &headers, Some(body.clone()))
        .await
    {
        return failure;
    }

    Json(json!({
        "Id": id,
        "Device": "D1",
        "Meta": body["Meta"].clone(),
        "Annotations": []
    }))
    .into_response()
}

async fn handle_create_annotation(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(failure) = state
        .record(
            "POST",
            format!("/devices/{id}/annotations"),
            &headers,
            Some(body.clone()),
        )
        .await
    {
        return failure;
    }

    let mut annotation = body;
    annotation["Id"] = json!("a-new");
    (StatusCode::CREATED, Json(annotation)).into_response()
}

async fn spawn_device_server(
    prefix: &str,
    fail_with: Option<(StatusCode, &'static str)>,
) -> (String, Arc<Mutex<Vec<RecordedRequest>>>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        requests: requests.clone(),
        fail_with,
    };
    let routes = Router::new()
        .route(
            "/devices/:id",
            get(handle_get_device).put(handle_update_device),
        )
        .route("/devices/:id/annotations", post(handle_create_annotation))
        .with_state(state);
    let app = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(prefix, routes)
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}{prefix}"), requests)
}

#[test]
fn endpoint_keeps_base_prefix_and_encodes_segments() {
    let service = HttpDeviceService::new("http://scales.local:8888/api/", "");
    let url = service
        .endpoint(&["devices", "North Hive/2"])
        .expect("endpoint");
    assert_eq!(
        url.as_str(),
        "http://scales.local:8888/api/devices/North%20Hive%2F2"
    );

    let bare = HttpDeviceService::new("http://localhost:8888", "");
    assert_eq!(
        bare.endpoint(&["devices", "D1"]).expect("endpoint").as_str(),
        "http://localhost:8888/devices/D1"
    );
}

#[test]
fn endpoint_rejects_unusable_base() {
    let err = HttpDeviceService::new("not a url", "")
        .endpoint(&["devices"])
        .expect_err("must fail");
    assert!(matches!(err, ServiceError::InvalidUrl { .. }));

    let err = HttpDeviceService::new("mailto:ops@example.com", "")
        .endpoint(&["devices"])
        .expect_err("must fail");
    assert!(matches!(err, ServiceError::InvalidUrl { .. }));
}

#[tokio::test]
async fn get_device_sends_bearer_and_json_headers() {
    let (base, requests) = spawn_device_server("", None).await;
    let service = HttpDeviceService::new(base, "secret-key");

    let device = service.get_device("D1").await.expect("device");
    assert_eq!(device.id, DeviceId::from("1"));
    assert_eq!(device.device, "D1");
    assert_eq!(device.latest_annotation().map(|a| a.hives()), Some(12));

    let recorded = requests.lock().await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method, "GET");
    assert_eq!(recorded[0].path, "/devices/D1");
    assert_eq!(
        recorded[0].authorization.as_deref(),
        Some("Bearer secret-key")
    );
    assert_eq!(
        recorded[0].content_type.as_deref(),
        Some("application/json")
    );
}

#[tokio::test]
async fn empty_api_key_sends_no_authorization() {
    let (base, requests) = spawn_device_server("/api", None).await;
    let service = HttpDeviceService::new(base, "");

    service.get_device("North Hive").await.expect("device");

    let recorded = requests.lock().await;
    assert_eq!(recorded[0].path, "/devices/North Hive");
    assert!(recorded[0].authorization.is_none());
}

#[tokio::test]
async fn create_annotation_posts_pascal_case_body() {
    let (base, requests) = spawn_device_server("", None).await;
    let service = HttpDeviceService::new(base, "k");
    let begin = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();

    let annotation = service
        .create_annotation(
            &DeviceId::from("1"),
            &NewAnnotationRequest::new("new", 15, begin),
        )
        .await
        .expect("annotation");

    assert_eq!(annotation.id.as_str(), "a-new");
    assert_eq!(annotation.hives(), 15);
    assert_eq!(annotation.description, "new");
    assert_eq!(annotation.begin, Some(begin));

    let recorded = requests.lock().await;
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].path, "/devices/1/annotations");
    assert_eq!(
        recorded[0].body,
        Some(json!({
            "Description": "new",
            "Data": { "Hives": 15 },
            "Begin": "2024-05-01T08:30:00Z"
        }))
    );
}

#[tokio::test]
async fn update_device_puts_meta_only() {
    let (base, requests) = spawn_device_server("", None).await;
    let service = HttpDeviceService::new(base, "k");

    let device = service
        .update_device(
            &DeviceId::from("1"),
            &UpdateDeviceRequest::with_user_description("Apiary North-2"),
        )
        .await
        .expect("device");

    assert_eq!(device.user_description(), "Apiary North-2");
    let recorded = requests.lock().await;
    assert_eq!(recorded[0].method, "PUT");
    assert_eq!(
        recorded[0].body,
        Some(json!({ "Meta": { "UserDescription": "Apiary North-2" } }))
    );
}

#[tokio::test]
async fn non_success_status_maps_to_service_error() {
    let (base, _requests) =
        spawn_device_server("", Some((StatusCode::SERVICE_UNAVAILABLE, "maintenance"))).await;
    let service = HttpDeviceService::new(base, "k");

    let err = service
        .create_annotation(
            &DeviceId::from("1"),
            &NewAnnotationRequest::new("x", 1, Utc::now()),
        )
        .await
        .expect_err("must fail");

    match err {
        ServiceError::Service {
            status,
            status_text,
            body,
        } => {
            assert_eq!(status, 503);
            assert_eq!(status_text, "Service Unavailable");
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn not_found_device_carries_response_body() {
    let (base, _requests) = spawn_device_server("", None).await;
    let service = HttpDeviceService::new(base, "k");

    let err = service.get_device("missing").await.expect_err("must fail");
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("device not found"));
}

#[tokio::test]
async fn success_with_unreadable_body_is_decode_error() {
    let (base, _requests) = spawn_device_server("", None).await;
    let service = HttpDeviceService::new(base, "k");

    let err = service.get_device("garbled").await.expect_err("must fail");
    assert!(matches!(err, ServiceError::Decode { status: 200, .. }));
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let service = HttpDeviceService::new(format!("http://{addr}"), "k");
    let err = service.get_device("D1").await.expect_err("must fail");
    assert!(matches!(err, ServiceError::Transport { .. }));
    assert_eq!(err.status(), None);
}
