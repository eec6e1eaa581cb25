use crate::interface_adapters::net::FeedHandle;
use crate::use_cases::{DashboardEvent, DashboardSnapshot};
use tokio::sync::{mpsc, oneshot, watch};

#[derive(Clone)]
pub struct AppState {
    // User actions flowing into the dashboard task.
    pub events_tx: mpsc::Sender<DashboardEvent>,
    // Latest read model published by the dashboard task.
    pub snapshot_rx: watch::Receiver<DashboardSnapshot>,
    // Manual connect/disconnect for the feed.
    pub feed: FeedHandle,
}

impl AppState {
    /// Sends an event carrying a reply channel and waits for the dashboard's answer.
    /// Returns `None` once the dashboard task has stopped.
    pub async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> DashboardEvent,
    ) -> Option<T> {
        let (reply, rx) = oneshot::channel();
        self.events_tx.send(build(reply)).await.ok()?;
        rx.await.ok()
    }
}
