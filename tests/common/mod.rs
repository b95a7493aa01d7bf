// Common test utilities for integration tests
// Stub message service plus logging setup shared by every test file

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use log::{info, LevelFilter};
use tokio::net::TcpListener;

use msgboard::ClientConfig;

// Initialize logging once
static INIT_LOGGER: Once = Once::new();

/// Set up the logger for the tests
pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();
    });
}

/// A send request as the stub server saw it
#[derive(Debug, Clone)]
pub struct RecordedSend {
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct StubState {
    list_status: StatusCode,
    list_body: String,
    send_status: StatusCode,
    send_delay: Duration,
    list_hits: Arc<AtomicUsize>,
    sends: Arc<Mutex<Vec<RecordedSend>>>,
}

/// In-process stand-in for the message service
pub struct StubServer {
    pub base_url: String,
    state: StubState,
}

/// Builder for a stub server's canned answers
pub struct StubBuilder {
    list_status: u16,
    list_body: String,
    send_status: u16,
    send_delay: Duration,
}

impl StubBuilder {
    pub fn list(mut self, status: u16, body: &str) -> Self {
        self.list_status = status;
        self.list_body = body.to_string();
        self
    }

    pub fn send_status(mut self, status: u16) -> Self {
        self.send_status = status;
        self
    }

    pub fn send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    pub async fn start(self) -> StubServer {
        let state = StubState {
            list_status: StatusCode::from_u16(self.list_status).expect("valid list status"),
            list_body: self.list_body,
            send_status: StatusCode::from_u16(self.send_status).expect("valid send status"),
            send_delay: self.send_delay,
            list_hits: Arc::new(AtomicUsize::new(0)),
            sends: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/messages", get(list_messages))
            .route("/messages/send", post(send_message))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        info!("Stub message server listening on {}", addr);
        StubServer {
            base_url: format!("http://{}", addr),
            state,
        }
    }
}

impl StubServer {
    pub fn builder() -> StubBuilder {
        StubBuilder {
            list_status: 200,
            list_body: r#"{"messages": []}"#.to_string(),
            send_status: 204,
            send_delay: Duration::ZERO,
        }
    }

    /// Client settings pointing at this server, bypassing any system proxy
    pub fn config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(self.base_url.clone())
            .without_proxy()
    }

    pub fn list_hits(&self) -> usize {
        self.state.list_hits.load(Ordering::SeqCst)
    }

    pub fn sends(&self) -> Vec<RecordedSend> {
        self.state.sends.lock().unwrap().clone()
    }
}

async fn list_messages(State(state): State<StubState>) -> impl IntoResponse {
    state.list_hits.fetch_add(1, Ordering::SeqCst);
    (
        state.list_status,
        [(header::CONTENT_TYPE, "application/json")],
        state.list_body.clone(),
    )
}

async fn send_message(State(state): State<StubState>, headers: HeaderMap, body: String) -> StatusCode {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let body = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
    state.sends.lock().unwrap().push(RecordedSend { content_type, body });

    if !state.send_delay.is_zero() {
        tokio::time::sleep(state.send_delay).await;
    }
    state.send_status
}

/// Config for an address nothing listens on
pub async fn unreachable_config() -> ClientConfig {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    ClientConfig::default()
        .with_base_url(format!("http://{}", addr))
        .without_proxy()
}
