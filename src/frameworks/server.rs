// Framework bootstrap for the dashboard runtime.

use crate::frameworks::config::{self, DashboardSettings, LogFormat};
use crate::interface_adapters::console::run_console;
use crate::interface_adapters::net::spawn_feed;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::storage::{FileBlobStore, SystemClock};
use crate::use_cases::{Dashboard, DashboardSnapshot, LocationStore, STORAGE_KEY, dashboard_task};

use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::io::BufReader;
use tokio::sync::{mpsc, watch};

/// Loads `.env` and installs the tracing subscriber. Both formats write to
/// stderr, leaving stdout to the console view.
fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match config::log_format() {
        LogFormat::Json => subscriber.json().with_current_span(true).init(),
        LogFormat::Compact => subscriber.compact().init(),
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener, settings: DashboardSettings) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state(&settings)?;

    // Open the feed right away; later connects come from the user.
    if !state.feed.connect().await {
        tracing::warn!("feed task stopped before the initial connect");
    }

    let console = settings.console.then(|| {
        let state = state.clone();
        let render_interval = settings.render_interval;
        tokio::spawn(async move {
            let input = BufReader::new(tokio::io::stdin());
            if let Err(e) = run_console(&state, input, tokio::io::stdout(), render_interval).await {
                tracing::error!(error = %e, "console failed");
            }
        })
    });

    let app = routes::app(state);
    tracing::info!(%address, feed_url = %settings.feed.url, "listening");

    // Quitting the console shuts the server down; without a console it runs until killed.
    let shutdown = async move {
        match console {
            Some(handle) => {
                let _ = handle.await;
                tracing::info!("console closed; shutting down");
            }
            None => std::future::pending::<()>().await,
        }
    };

    // Serve app and report errors rather than panicking
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, DashboardSettings::from_env()).await
}

fn build_state(settings: &DashboardSettings) -> Result<Arc<AppState>> {
    let store = FileBlobStore::new(&settings.data_dir).inspect_err(|e| {
        tracing::error!(data_dir = %settings.data_dir.display(), error = %e, "failed to open data dir");
    })?;
    let data_dir = store.dir().display().to_string();
    let locations = LocationStore::open(store, SystemClock, STORAGE_KEY)
        .map_err(|e| std::io::Error::other(format!("failed to load locations: {e}")))?;
    tracing::debug!(%data_dir, saved = locations.list().len(), "location store ready");

    // events_tx/rx: feed events and user actions all go to the single dashboard task.
    let (events_tx, events_rx) = mpsc::channel(config::EVENT_CHANNEL_CAPACITY);
    // snapshot_tx/rx: the latest read model for HTTP handlers and the console.
    let (snapshot_tx, snapshot_rx) = watch::channel(DashboardSnapshot::default());

    tokio::spawn(dashboard_task(
        Dashboard::new(locations, SystemClock),
        events_rx,
        snapshot_tx,
    ));

    let feed = spawn_feed(
        settings.feed.clone(),
        events_tx.clone(),
        config::COMMAND_CHANNEL_CAPACITY,
    );

    Ok(Arc::new(AppState {
        events_tx,
        snapshot_rx,
        feed,
    }))
}
