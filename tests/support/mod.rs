// Shared harness for integration tests: a scripted position feed and a
// dashboard bound to ephemeral ports.
#![allow(dead_code)]

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use coord_dashboard::DashboardSettings;
use coord_dashboard::interface_adapters::net::FeedSettings;
use serde_json::Value;
use std::{
    future::Future,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tempfile::TempDir;
use tokio::sync::broadcast;

// How long polling helpers wait before failing the test.
const WAIT_LIMIT: Duration = Duration::from_secs(5);

struct FeedScript {
    // Messages sent to every new connection as soon as it opens.
    greeting: Vec<String>,
    // Close each connection right after the greeting.
    close_after_greeting: bool,
    connections: AtomicUsize,
    live_tx: broadcast::Sender<String>,
}

/// A fake position feed speaking the JSON text protocol over WebSocket.
pub struct FeedServer {
    pub url: String,
    script: Arc<FeedScript>,
}

impl FeedServer {
    pub async fn start(greeting: Vec<Value>, close_after_greeting: bool) -> Self {
        let (live_tx, _live_rx) = broadcast::channel(64);
        let script = Arc::new(FeedScript {
            greeting: greeting.iter().map(Value::to_string).collect(),
            close_after_greeting,
            connections: AtomicUsize::new(0),
            live_tx,
        });

        let app = Router::new()
            .route("/", get(feed_handler))
            .with_state(script.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind feed port");
        let addr = listener.local_addr().expect("feed addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("feed server failed");
        });

        Self {
            url: format!("ws://{addr}/"),
            script,
        }
    }

    pub fn connections(&self) -> usize {
        self.script.connections.load(Ordering::SeqCst)
    }

    /// Sends one message to every open connection.
    pub fn push(&self, message: Value) {
        let _ = self.script.live_tx.send(message.to_string());
    }
}

async fn feed_handler(ws: WebSocketUpgrade, State(script): State<Arc<FeedScript>>) -> Response {
    ws.on_upgrade(move |socket| serve_feed(socket, script))
}

async fn serve_feed(mut socket: WebSocket, script: Arc<FeedScript>) {
    script.connections.fetch_add(1, Ordering::SeqCst);
    let mut live_rx = script.live_tx.subscribe();

    for message in &script.greeting {
        if socket.send(Message::Text(message.clone().into())).await.is_err() {
            return;
        }
    }
    if script.close_after_greeting {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    loop {
        tokio::select! {
            pushed = live_rx.recv() => match pushed {
                Ok(message) => {
                    if socket.send(Message::Text(message.into())).await.is_err() {
                        return;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return,
            },
            incoming = socket.recv() => {
                if !matches!(incoming, Some(Ok(_))) {
                    return;
                }
            }
        }
    }
}

/// A running dashboard with its own data directory.
pub struct TestDashboard {
    pub base_url: String,
    pub client: reqwest::Client,
}

pub fn settings(feed_url: &str, data_dir: &Path, reconnect_delay: Duration) -> DashboardSettings {
    DashboardSettings {
        feed: FeedSettings {
            url: feed_url.to_string(),
            reconnect_delay,
            connect_timeout: Duration::from_millis(500),
        },
        data_dir: data_dir.to_path_buf(),
        console: false,
        render_interval: Duration::from_secs(1),
    }
}

pub async fn spawn_dashboard(settings: DashboardSettings) -> TestDashboard {
    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        coord_dashboard::run(listener, settings)
            .await
            .expect("dashboard failed");
    });

    TestDashboard {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
    }
}

pub fn data_dir() -> TempDir {
    tempfile::tempdir().expect("temp data dir")
}

impl TestDashboard {
    pub async fn get(&self, path: &str) -> Value {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("request should succeed")
            .json()
            .await
            .expect("json body")
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> reqwest::Response {
        let request = self.client.post(format!("{}{path}", self.base_url));
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };
        request.send().await.expect("request should succeed")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("request should succeed")
    }

    /// Polls `path` until `ready` accepts the JSON body.
    pub async fn wait_for(&self, path: &str, ready: impl Fn(&Value) -> bool) -> Value {
        let ready = &ready;
        eventually(|| async move {
            let body = self.get(path).await;
            ready(&body).then_some(body)
        })
        .await
    }
}

/// Retries `probe` until it yields a value or the wait limit passes.
pub async fn eventually<T, F, Fut>(mut probe: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    loop {
        if let Some(value) = probe().await {
            return value;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not reached within {WAIT_LIMIT:?}");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
