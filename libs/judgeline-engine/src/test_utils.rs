// Test doubles for the execution and generation backends

use crate::engine::{ExecutionBackend, ExecutionRequest};
use crate::generator::GenerationBackend;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use judgeline_common::error::{JudgeError, Result};
use judgeline_common::types::RawExecutionResult;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

type Handler = dyn Fn(&ExecutionRequest) -> Result<RawExecutionResult> + Send + Sync;

/// Scripted execution backend that records calls and tracks concurrency.
pub struct MockBackend {
    handler: Box<Handler>,
    delay: Duration,
    configured: bool,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<ExecutionRequest>>,
}

impl MockBackend {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ExecutionRequest) -> Result<RawExecutionResult> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            delay: Duration::ZERO,
            configured: true,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Backend whose program echoes stdin back.
    pub fn echo() -> Self {
        Self::new(|req| Ok(raw(&req.stdin)))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionBackend for MockBackend {
    fn ensure_configured(&self) -> Result<()> {
        if self.configured {
            Ok(())
        } else {
            Err(JudgeError::Config("mock backend has no credentials".to_string()))
        }
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<RawExecutionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let result = (self.handler)(request);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

pub fn raw(output: &str) -> RawExecutionResult {
    RawExecutionResult {
        output: output.to_string(),
        status_code: 200,
        memory: Some("1024".to_string()),
        cpu_time: Some("0.01".to_string()),
    }
}

/// Generation backend that counts calls and derives its reply from the prompt.
pub struct MockGenerator {
    calls: AtomicUsize,
    failures_left: AtomicUsize,
    delay: Duration,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail the next `n` calls with a connection error.
    pub fn failing(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(JudgeError::GenerationUnavailable("connection refused".to_string()));
        }
        Ok(format!("generated: {}", prompt))
    }
}

/// A request captured by [`MockHttpServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone)]
struct MockServerState {
    status: StatusCode,
    response: Arc<Value>,
    delay_ms: Arc<AtomicU64>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn record_and_respond(
    State(state): State<MockServerState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_string(),
        headers,
        body,
    });

    let delay = state.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    (state.status, Json(state.response.as_ref().clone()))
}

/// Local HTTP server that answers every request with one canned JSON body.
pub struct MockHttpServer {
    addr: SocketAddr,
    delay_ms: Arc<AtomicU64>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpServer {
    pub async fn start(status: StatusCode, response: Value) -> Self {
        let state = MockServerState {
            status,
            response: Arc::new(response),
            delay_ms: Arc::new(AtomicU64::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let delay_ms = state.delay_ms.clone();
        let requests = state.requests.clone();

        let app = Router::new().fallback(record_and_respond).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("mock server has no address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            delay_ms,
            requests,
        }
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}
