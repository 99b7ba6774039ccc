//! End-to-end tests against an in-process backend serving the same routes as
//! the transcription service (/ws, /status, /upload, /download, /health).

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Multipart, Path, Query, State, WebSocketUpgrade,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use nurga_client::api::{ExportFormat, UploadOptions};
use nurga_client::{ApiClient, ApiError, ClientConfig, ProgressEvent, TaskChannel, TaskHandle};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const API_KEY: &str = "test-key";

#[derive(Clone, Default)]
struct Backend {
    status_requests: Arc<AtomicU32>,
    uploaded_fields: Arc<Mutex<HashMap<String, String>>>,
}

async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/ws/{task_id}", get(ws_handler))
        .route("/status/{task_id}", get(status_handler))
        .route("/upload", post(upload_handler))
        .route("/download/{task_id}/{format}", get(download_handler))
        .route("/health", get(|| async { Json(json!({"status": "healthy", "service": "test"})) }))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), backend)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == API_KEY)
}

async fn ws_handler(
    Path(task_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    if query.get("api_key").map(String::as_str) != Some(API_KEY) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match task_id.as_str() {
        "ws-task" | "drop-task" => ws.on_upgrade(move |socket| stream_task(socket, task_id)),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn stream_task(mut socket: WebSocket, task_id: String) {
    let mut frames = vec![
        json!({"state": "CONNECTED", "message": "Connected"}),
        json!({"state": "PROGRESS", "progress": 30, "step": "Transcribing audio..."}),
    ];
    if task_id == "ws-task" {
        frames.push(json!({"state": "PROGRESS", "progress": 80, "step": "Generating summary..."}));
        frames.push(json!({"state": "SUCCESS", "result": {"summary": "short", "transcription": {"text": "hello", "segments": []}}}));
    }

    for frame in frames {
        if socket
            .send(Message::Text(frame.to_string().into()))
            .await
            .is_err()
        {
            return;
        }
    }
    // "drop-task" hangs up before the job finishes
    let _ = socket.send(Message::Close(None)).await;
}

async fn status_handler(
    State(backend): State<Backend>,
    Path(task_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid API key"}))).into_response();
    }

    let attempt = backend.status_requests.fetch_add(1, Ordering::SeqCst);
    let body = match task_id.as_str() {
        "poll-task" => match attempt {
            0 => json!({"state": "PENDING", "status": "Task is waiting..."}),
            1 => json!({"state": "PROGRESS", "progress": 45.6, "step": "Transcribing audio..."}),
            _ => json!({"state": "SUCCESS", "result": {"summary": "polled"}}),
        },
        "drop-task" => json!({"state": "SUCCESS", "result": {"summary": "after drop"}}),
        "failed-task" => json!({"state": "FAILURE", "error": "Unsupported codec"}),
        "broken-task" => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "worker crashed"})),
            )
                .into_response()
        }
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    Json(body).into_response()
}

async fn upload_handler(
    State(backend): State<Backend>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            format!("{}:{}", file_name, bytes)
        } else {
            field.text().await.unwrap_or_default()
        };
        backend.uploaded_fields.lock().insert(name, value);
    }

    Json(json!({"task_id": "poll-task", "status": "processing"})).into_response()
}

async fn download_handler(
    Path((task_id, format)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if task_id != "ws-task" {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Task not found"}))).into_response();
    }
    format!("transcript of {} as {}", task_id, format).into_response()
}

fn config(base_url: &str) -> ClientConfig {
    ClientConfig::new(base_url, API_KEY).with_poll_interval(Duration::from_millis(50))
}

async fn collect(mut events: mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut collected = Vec::new();
    let drained = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(event) = events.recv().await {
            collected.push(event);
        }
    })
    .await;
    assert!(drained.is_ok(), "channel never finished: {:?}", collected);
    collected
}

#[tokio::test]
async fn test_realtime_stream_to_success() {
    let (base_url, backend) = spawn_backend().await;
    let channel = TaskChannel::new(&config(&base_url)).unwrap();

    let (channel_ref, events) = channel
        .open_stream(TaskHandle::new("ws-task", API_KEY))
        .unwrap();
    let events = collect(events).await;

    assert_eq!(events.len(), 3, "{:?}", events);
    assert_eq!(
        events[0],
        ProgressEvent::Progress {
            percent: 30,
            label: "Transcribing audio...".to_string()
        }
    );
    assert!(matches!(events[1], ProgressEvent::Progress { percent: 80, .. }));
    match &events[2] {
        ProgressEvent::Success { result } => assert_eq!(result["summary"], "short"),
        other => panic!("expected success, got {:?}", other),
    }
    assert!(channel_ref.is_terminated());
    assert!(!channel_ref.state().using_polling);
    assert_eq!(backend.status_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_websocket_falls_back_to_polling() {
    let (base_url, backend) = spawn_backend().await;
    let channel = TaskChannel::new(&config(&base_url)).unwrap();

    let (channel_ref, events) = channel
        .open_stream(TaskHandle::new("poll-task", API_KEY))
        .unwrap();
    let events = collect(events).await;

    assert_eq!(
        events,
        vec![
            ProgressEvent::Progress {
                percent: 46,
                label: "Transcribing audio...".to_string()
            },
            ProgressEvent::Success {
                result: json!({"summary": "polled"})
            },
        ]
    );
    assert!(channel_ref.state().using_polling);
    assert_eq!(backend.status_requests.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_dropped_websocket_resumes_over_polling() {
    let (base_url, _backend) = spawn_backend().await;
    let channel = TaskChannel::new(&config(&base_url)).unwrap();

    let (_channel_ref, events) = channel
        .open_stream(TaskHandle::new("drop-task", API_KEY))
        .unwrap();
    let events = collect(events).await;

    assert_eq!(events.len(), 2, "{:?}", events);
    assert!(matches!(events[0], ProgressEvent::Progress { percent: 30, .. }));
    assert_eq!(
        events[1],
        ProgressEvent::Success {
            result: json!({"summary": "after drop"})
        }
    );
}

#[tokio::test]
async fn test_polling_failure_state() {
    let (base_url, _backend) = spawn_backend().await;
    let channel = TaskChannel::new(&config(&base_url)).unwrap();

    let (_channel_ref, events) = channel
        .open_stream(TaskHandle::new("failed-task", API_KEY))
        .unwrap();
    let events = collect(events).await;

    assert_eq!(
        events,
        vec![ProgressEvent::Failure {
            reason: "Unsupported codec".to_string()
        }]
    );
}

#[tokio::test]
async fn test_polling_http_error_is_a_channel_error() {
    let (base_url, backend) = spawn_backend().await;
    let channel = TaskChannel::new(&config(&base_url)).unwrap();

    let (_channel_ref, events) = channel
        .open_stream(TaskHandle::new("broken-task", API_KEY))
        .unwrap();
    let events = collect(events).await;

    assert_eq!(
        events,
        vec![ProgressEvent::ChannelError {
            reason: "HTTP 500: worker crashed".to_string()
        }]
    );
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(backend.status_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_wrong_credential_surfaces_as_channel_error() {
    let (base_url, _backend) = spawn_backend().await;
    let channel = TaskChannel::new(&config(&base_url)).unwrap();

    let (_channel_ref, events) = channel
        .open_stream(TaskHandle::new("ws-task", "wrong-key"))
        .unwrap();
    let events = collect(events).await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        ProgressEvent::ChannelError { reason } => assert!(reason.contains("API key"), "{}", reason),
        other => panic!("expected channel error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_backend_reports_channel_error() {
    // Nothing listens on the discard port
    let channel = TaskChannel::new(&config("http://127.0.0.1:9")).unwrap();

    let (_channel_ref, events) = channel
        .open_stream(TaskHandle::new("any-task", API_KEY))
        .unwrap();
    let events = collect(events).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ProgressEvent::ChannelError { .. }));
}

#[tokio::test]
async fn test_close_stops_polling() {
    let (base_url, backend) = spawn_backend().await;
    let channel = TaskChannel::new(
        &ClientConfig::new(&base_url, API_KEY).with_poll_interval(Duration::from_millis(200)),
    )
    .unwrap();

    let (channel_ref, events) = channel
        .open_stream(TaskHandle::new("poll-task", API_KEY))
        .unwrap();
    channel_ref.close();
    channel_ref.finished().await;

    let events = collect(events).await;
    assert!(events.is_empty());
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(backend.status_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upload_sends_form_and_returns_task_id() {
    let (base_url, backend) = spawn_backend().await;
    let client = ApiClient::new(config(&base_url)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("meeting.mp3");
    std::fs::write(&audio, vec![7u8; 1024]).unwrap();

    let options = UploadOptions::default()
        .with_language("kk")
        .with_diarization(2, 4);
    let response = client.upload(&audio, &options).await.unwrap();
    assert_eq!(response.task_id, "poll-task");

    let fields = backend.uploaded_fields.lock().clone();
    assert_eq!(fields.get("file").map(String::as_str), Some("meeting.mp3:1024"));
    assert_eq!(fields.get("language").map(String::as_str), Some("kk"));
    assert_eq!(fields.get("enable_diarization").map(String::as_str), Some("true"));
    assert_eq!(fields.get("min_speakers").map(String::as_str), Some("2"));
    assert_eq!(fields.get("max_speakers").map(String::as_str), Some("4"));
}

#[tokio::test]
async fn test_upload_streams_file_from_disk() {
    let (base_url, backend) = spawn_backend().await;
    let client = ApiClient::new(config(&base_url)).unwrap();

    // Many read chunks, still under axum's default body limit
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("lecture.wav");
    std::fs::write(&audio, vec![1u8; 1_500_000]).unwrap();

    let response = client
        .upload(&audio, &UploadOptions::default())
        .await
        .unwrap();
    assert_eq!(response.task_id, "poll-task");

    let fields = backend.uploaded_fields.lock().clone();
    assert_eq!(
        fields.get("file").map(String::as_str),
        Some("lecture.wav:1500000")
    );
    assert_eq!(fields.get("language").map(String::as_str), Some("auto"));
}

#[tokio::test]
async fn test_download_to_writes_named_file() {
    let (base_url, _backend) = spawn_backend().await;
    let client = ApiClient::new(config(&base_url)).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let path = client
        .download_to("ws-task", ExportFormat::Md, dir.path())
        .await
        .unwrap();

    assert_eq!(path.file_name().unwrap(), "transcription_ws-task.md");
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "transcript of ws-task as md");
}

#[tokio::test]
async fn test_download_missing_task() {
    let (base_url, _backend) = spawn_backend().await;
    let client = ApiClient::new(config(&base_url)).unwrap();

    let err = client
        .download("nope", ExportFormat::Txt)
        .await
        .unwrap_err();
    match err {
        ApiError::Http { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Task not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_health_and_status_helpers() {
    let (base_url, _backend) = spawn_backend().await;
    let client = ApiClient::new(config(&base_url)).unwrap();

    assert!(client.health().await.unwrap().is_healthy());

    let status: Value = client.status("failed-task").await.unwrap();
    assert_eq!(status["state"], "FAILURE");

    let bad_key = ApiClient::new(ClientConfig::new(&base_url, "nope")).unwrap();
    assert!(matches!(
        bad_key.status("failed-task").await,
        Err(ApiError::Unauthorized)
    ));
}
