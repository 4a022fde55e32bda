//! Mock fal.ai queue for integration tests
//!
//! Serves the enqueue, status and result endpoints for every known model and
//! walks each job through a scripted number of polls before completing it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Credential the mock accepts
pub const TEST_KEY: &str = "test-key";

const MODELS: [&str; 3] = ["fal-ai/fast-lightning-sdxl", "fal-ai/flux/schnell", "fal-ai/flux/dev"];
const APPS: [&str; 2] = ["fal-ai/fast-lightning-sdxl", "fal-ai/flux"];

/// A running mock queue
pub struct MockFal {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockFalState>,
}

struct MockFalState {
    base_url: String,
    /// Payload served as every job's result
    payload: Value,
    /// Polls answered before a job reports completion
    polls_before_done: u32,
    queue_position: u32,
    /// Cumulative log lines returned while in progress
    logs: Vec<String>,
    /// When set, jobs complete with this error
    job_error: Option<String>,
    next_id: AtomicU32,
    status_count: AtomicU32,
    result_count: AtomicU32,
    polls: Mutex<HashMap<String, u32>>,
    submitted: Mutex<Vec<(String, Value)>>,
}

/// Scripts the behavior of a [`MockFal`] before it starts
pub struct MockFalBuilder {
    payload: Value,
    polls_before_done: u32,
    queue_position: u32,
    logs: Vec<String>,
    job_error: Option<String>,
}

impl MockFalBuilder {
    /// Result payload for every job
    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Number of polls that report the job as queued or running
    ///
    /// The first poll reports it queued; later ones report it running.
    pub fn polls(mut self, polls: u32) -> Self {
        self.polls_before_done = polls;
        self
    }

    pub fn logs(mut self, logs: &[&str]) -> Self {
        self.logs = logs.iter().map(|line| (*line).to_owned()).collect();
        self
    }

    /// Complete every job with an error instead of a result
    pub fn job_error(mut self, error: &str) -> Self {
        self.job_error = Some(error.to_owned());
        self
    }

    pub async fn start(self) -> anyhow::Result<MockFal> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(MockFalState {
            base_url: format!("http://{addr}"),
            payload: self.payload,
            polls_before_done: self.polls_before_done,
            queue_position: self.queue_position,
            logs: self.logs,
            job_error: self.job_error,
            next_id: AtomicU32::new(1),
            status_count: AtomicU32::new(0),
            result_count: AtomicU32::new(0),
            polls: Mutex::default(),
            submitted: Mutex::default(),
        });

        let mut app = Router::new();
        for model in MODELS {
            app = app.route(&format!("/{model}"), routing::post(handle_submit));
        }
        for app_id in APPS {
            app = app
                .route(&format!("/{app_id}/requests/{{id}}/status"), routing::get(handle_status))
                .route(&format!("/{app_id}/requests/{{id}}"), routing::get(handle_result));
        }
        let app = app.with_state(Arc::clone(&state));

        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(MockFal { addr, shutdown, state })
    }
}

impl MockFal {
    /// Mock whose jobs complete immediately with a single image
    pub async fn start() -> anyhow::Result<Self> {
        Self::builder().start().await
    }

    pub fn builder() -> MockFalBuilder {
        MockFalBuilder {
            payload: json!({"images": [{"url": "https://cdn.mock/fox.png", "width": 1024, "height": 1024}]}),
            polls_before_done: 0,
            queue_position: 2,
            logs: Vec::new(),
            job_error: None,
        }
    }

    /// Queue base URL for the provider config
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every accepted submission as (model id, request body)
    pub fn submitted(&self) -> Vec<(String, Value)> {
        self.state.submitted.lock().unwrap().clone()
    }

    pub fn status_count(&self) -> u32 {
        self.state.status_count.load(Ordering::Relaxed)
    }

    pub fn result_count(&self) -> u32 {
        self.state.result_count.load(Ordering::Relaxed)
    }
}

impl Drop for MockFal {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn authorized(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Key {TEST_KEY}");

    match headers.get("authorization").and_then(|value| value.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "Invalid or missing key").into_response()),
    }
}

async fn handle_submit(
    State(state): State<Arc<MockFalState>>,
    headers: HeaderMap,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }

    let model = uri.path().trim_start_matches('/').to_owned();
    let app_id = APPS
        .iter()
        .find(|app| model.starts_with(*app))
        .copied()
        .unwrap_or_default();

    let request_id = format!("req-{}", state.next_id.fetch_add(1, Ordering::Relaxed));
    state.polls.lock().unwrap().insert(request_id.clone(), 0);
    state.submitted.lock().unwrap().push((model, body));

    let request_url = format!("{}/{app_id}/requests/{request_id}", state.base_url);

    Json(json!({
        "request_id": request_id,
        "status_url": format!("{request_url}/status"),
        "response_url": request_url,
    }))
    .into_response()
}

async fn handle_status(
    State(state): State<Arc<MockFalState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }

    state.status_count.fetch_add(1, Ordering::Relaxed);

    let poll = {
        let mut polls = state.polls.lock().unwrap();
        let Some(count) = polls.get_mut(&id) else {
            return (StatusCode::NOT_FOUND, "Request not found").into_response();
        };
        *count += 1;
        *count
    };

    let logs: Vec<Value> = state.logs.iter().map(|message| json!({"message": message})).collect();

    let body = if poll > state.polls_before_done {
        match &state.job_error {
            Some(error) => json!({"status": "COMPLETED", "error": error}),
            None => json!({"status": "COMPLETED", "logs": logs}),
        }
    } else if poll == 1 {
        json!({"status": "IN_QUEUE", "queue_position": state.queue_position})
    } else {
        json!({"status": "IN_PROGRESS", "logs": logs})
    };

    Json(body).into_response()
}

async fn handle_result(
    State(state): State<Arc<MockFalState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(rejection) = authorized(&headers) {
        return rejection;
    }

    if !state.polls.lock().unwrap().contains_key(&id) {
        return (StatusCode::NOT_FOUND, "Request not found").into_response();
    }

    state.result_count.fetch_add(1, Ordering::Relaxed);

    Json(state.payload.clone()).into_response()
}
