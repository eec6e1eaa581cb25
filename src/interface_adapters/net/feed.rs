use crate::interface_adapters::protocol::decode;
use crate::use_cases::{ConnectionManager, ConnectionState, DashboardEvent};

use futures::StreamExt;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until, timeout};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{Instrument, debug, info, info_span, warn};

type FeedSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const LOG_THROTTLE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// WebSocket endpoint of the position feed.
    pub url: String,
    /// Delay before reconnecting after a close or transport error.
    pub reconnect_delay: Duration,
    /// Upper bound on a single connection attempt.
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand {
    Connect,
    Disconnect,
}

#[derive(Debug)]
enum FeedError {
    // Categorizes transport failures; all of them feed the reconnect policy.
    Connect(tungstenite::Error),
    ConnectTimeout,
    Socket(tungstenite::Error),
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::Connect(err) => write!(f, "connect failed: {err}"),
            FeedError::ConnectTimeout => write!(f, "connect timed out"),
            FeedError::Socket(err) => write!(f, "socket error: {err}"),
        }
    }
}

enum FrameOutcome {
    Continue,
    Closed,
    Failed(FeedError),
    EventsClosed,
}

/// Control handle for the feed task.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    commands_tx: mpsc::Sender<FeedCommand>,
}

impl FeedHandle {
    pub fn new(commands_tx: mpsc::Sender<FeedCommand>) -> Self {
        Self { commands_tx }
    }

    pub async fn connect(&self) -> bool {
        self.commands_tx.send(FeedCommand::Connect).await.is_ok()
    }

    pub async fn disconnect(&self) -> bool {
        self.commands_tx.send(FeedCommand::Disconnect).await.is_ok()
    }
}

/// Spawns the feed task and returns its control handle.
pub fn spawn_feed(
    settings: FeedSettings,
    events_tx: mpsc::Sender<DashboardEvent>,
    command_capacity: usize,
) -> FeedHandle {
    let (commands_tx, commands_rx) = mpsc::channel(command_capacity);
    let span = info_span!("feed", url = %settings.url);
    tokio::spawn(feed_task(settings, commands_rx, events_tx).instrument(span));
    FeedHandle::new(commands_tx)
}

/// Owns the feed socket: forwards decoded events and applies the reconnect policy.
pub async fn feed_task(
    settings: FeedSettings,
    mut commands_rx: mpsc::Receiver<FeedCommand>,
    events_tx: mpsc::Sender<DashboardEvent>,
) {
    let mut manager = ConnectionManager::new(settings.reconnect_delay);
    let mut socket: Option<FeedSocket> = None;
    let mut published = manager.state();
    let mut last_invalid_log = Instant::now() - LOG_THROTTLE;

    loop {
        let retry_at = manager.retry_deadline();
        let mut open = false;

        tokio::select! {
            command = commands_rx.recv() => match command {
                Some(FeedCommand::Connect) => {
                    open = manager.connect();
                    if !open {
                        debug!(state = %manager.state(), "connect ignored");
                    }
                }
                Some(FeedCommand::Disconnect) => {
                    if manager.disconnect() {
                        close_socket(&mut socket).await;
                    }
                    info!("disconnected by request");
                }
                None => break,
            },

            frame = next_frame(&mut socket), if socket.is_some() => {
                match handle_frame(frame, &events_tx, &mut last_invalid_log).await {
                    FrameOutcome::Continue => {}
                    FrameOutcome::Closed => {
                        socket = None;
                        manager.on_closed(Instant::now());
                        info!(retry_in_ms = settings.reconnect_delay.as_millis(), "feed closed");
                    }
                    FrameOutcome::Failed(err) => {
                        socket = None;
                        manager.on_failed(Instant::now());
                        warn!(error = %err, retry_in_ms = settings.reconnect_delay.as_millis(), "feed transport error");
                    }
                    FrameOutcome::EventsClosed => break,
                }
            }

            _ = sleep_until(retry_at.unwrap_or_else(Instant::now)), if retry_at.is_some() => {
                open = manager.on_retry_due(Instant::now());
            }
        }

        if open {
            if !publish_state(&events_tx, &mut published, manager.state()).await {
                break;
            }
            match open_socket(&settings).await {
                Ok(ws) => {
                    manager.on_opened();
                    socket = Some(ws);
                    info!(attempt = manager.attempts(), "connected to feed");
                }
                Err(err) => {
                    manager.on_failed(Instant::now());
                    warn!(
                        error = %err,
                        attempt = manager.attempts(),
                        retry_in_ms = settings.reconnect_delay.as_millis(),
                        "failed to connect to feed"
                    );
                }
            }
        }

        if !publish_state(&events_tx, &mut published, manager.state()).await {
            break;
        }
    }

    close_socket(&mut socket).await;
    debug!("feed task exiting");
}

async fn open_socket(settings: &FeedSettings) -> Result<FeedSocket, FeedError> {
    let (ws, _response) = timeout(settings.connect_timeout, connect_async(settings.url.as_str()))
        .await
        .map_err(|_| FeedError::ConnectTimeout)?
        .map_err(FeedError::Connect)?;
    Ok(ws)
}

async fn next_frame(socket: &mut Option<FeedSocket>) -> Option<Result<Message, tungstenite::Error>> {
    match socket {
        Some(ws) => ws.next().await,
        None => std::future::pending().await,
    }
}

async fn close_socket(socket: &mut Option<FeedSocket>) {
    if let Some(mut ws) = socket.take() {
        if let Err(err) = ws.close(None).await {
            debug!(error = %err, "socket close error");
        }
    }
}

async fn handle_frame(
    frame: Option<Result<Message, tungstenite::Error>>,
    events_tx: &mpsc::Sender<DashboardEvent>,
    last_invalid_log: &mut Instant,
) -> FrameOutcome {
    let message = match frame {
        None => return FrameOutcome::Closed,
        Some(Err(err)) => return FrameOutcome::Failed(FeedError::Socket(err)),
        Some(Ok(message)) => message,
    };

    match message {
        Message::Text(text) => match decode(text.as_str()) {
            Ok(event) => {
                if events_tx.send(DashboardEvent::Feed(event)).await.is_err() {
                    return FrameOutcome::EventsClosed;
                }
                FrameOutcome::Continue
            }
            Err(err) => {
                if should_log(last_invalid_log) {
                    warn!(error = %err, "dropping feed message");
                }
                FrameOutcome::Continue
            }
        },
        Message::Binary(bytes) => {
            if should_log(last_invalid_log) {
                warn!(len = bytes.len(), "binary feed messages not supported; dropping");
            }
            FrameOutcome::Continue
        }
        Message::Close(frame) => {
            debug!(?frame, "close frame received");
            FrameOutcome::Closed
        }
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => FrameOutcome::Continue,
    }
}

async fn publish_state(
    events_tx: &mpsc::Sender<DashboardEvent>,
    published: &mut ConnectionState,
    state: ConnectionState,
) -> bool {
    if *published == state {
        return true;
    }
    *published = state;
    events_tx
        .send(DashboardEvent::Connection(state))
        .await
        .is_ok()
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}
