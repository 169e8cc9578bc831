// In-process fake of the remote quote link service

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned reply plus every request body the fake has received
#[derive(Clone)]
pub struct FakeService {
    status: StatusCode,
    body: String,
    delay: Duration,
    received: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl FakeService {
    pub fn replying(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.to_string(),
            delay: Duration::ZERO,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn received(&self) -> Vec<serde_json::Value> {
        self.received.lock().unwrap().clone()
    }

    /// Serve on an ephemeral local port and return the endpoint URL
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/api/ogp", post(handle))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/ogp", addr)
    }
}

async fn handle(State(fake): State<FakeService>, body: Bytes) -> (StatusCode, String) {
    if let Ok(value) = serde_json::from_slice(&body) {
        fake.received.lock().unwrap().push(value);
    }
    if !fake.delay.is_zero() {
        tokio::time::sleep(fake.delay).await;
    }
    (fake.status, fake.body.clone())
}

/// An endpoint on a port nothing listens on
pub async fn unreachable_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/ogp", addr)
}
