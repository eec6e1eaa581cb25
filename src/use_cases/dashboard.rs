// The dashboard loop: single owner of the roster and the saved-location list.
//
// Every feed event and user action arrives on one channel and is applied in
// arrival order, so no state here is ever shared or locked.

use crate::domain::ports::{BlobStore, Clock};
use crate::domain::Roster;
use crate::use_cases::location_store::LocationStore;
use crate::use_cases::types::{ConnectionState, DashboardEvent, DashboardSnapshot, FeedEvent};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

pub struct Dashboard<S, C> {
    roster: Roster,
    locations: LocationStore<S, C>,
    connection: ConnectionState,
    clock: C,
}

impl<S, C> Dashboard<S, C>
where
    S: BlobStore,
    C: Clock,
{
    pub fn new(locations: LocationStore<S, C>, clock: C) -> Self {
        Self {
            roster: Roster::new(),
            locations,
            connection: ConnectionState::Disconnected,
            clock,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn handle(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Feed(feed) => self.apply_feed(feed),
            DashboardEvent::Connection(state) => {
                if self.connection != state {
                    debug!(from = %self.connection, to = %state, "connection state changed");
                }
                self.connection = state;
            }
            DashboardEvent::Select { name, reply } => {
                let selected = self.roster.select(&name);
                if !selected {
                    debug!(player = %name, "select ignored for unknown player");
                }
                if let Some(reply) = reply {
                    let _ = reply.send(selected);
                }
            }
            DashboardEvent::PushCoordinates { position } => {
                self.roster.override_projection(position);
            }
            DashboardEvent::SaveLocation { name, reply } => {
                let position = self.roster.projection().position;
                let result = self.locations.save(&name, position);
                if let Ok(saved) = &result {
                    info!(name = %saved.name, x = saved.x, y = saved.y, z = saved.z, "location saved");
                }
                let _ = reply.send(result);
            }
            DashboardEvent::DeleteLocation {
                index,
                confirmed,
                reply,
            } => {
                let result = self.locations.delete(index, confirmed);
                if let Ok(removed) = &result {
                    info!(index, name = %removed.name, "location deleted");
                }
                let _ = reply.send(result);
            }
        }
    }

    pub fn apply_feed(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Connected { message } => {
                info!(message = message.as_deref().unwrap_or(""), "feed handshake received");
            }
            FeedEvent::Coordinates {
                player,
                position,
                world,
            } => {
                self.roster
                    .apply_position(&player, position, &world, self.clock.now());
            }
            FeedEvent::PlayerJoin { player } => {
                info!(%player, "player joined");
                self.roster.apply_join(&player);
            }
            FeedEvent::PlayerLeave { player } => {
                info!(%player, "player left");
                self.roster.apply_leave(&player);
            }
            FeedEvent::PlayerList { players } => {
                let added = self.roster.apply_snapshot(&players, self.clock.now());
                debug!(listed = players.len(), added, "player list received");
            }
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            connection: self.connection,
            projection: self.roster.projection().clone(),
            selected: self.roster.selected().map(str::to_string),
            players: self.roster.entities().into_iter().cloned().collect(),
            locations: self.locations.list().to_vec(),
        }
    }
}

/// Drains dashboard events and republishes the snapshot after each one.
pub async fn dashboard_task<S, C>(
    mut dashboard: Dashboard<S, C>,
    mut events_rx: mpsc::Receiver<DashboardEvent>,
    snapshot_tx: watch::Sender<DashboardSnapshot>,
) where
    S: BlobStore,
    C: Clock,
{
    snapshot_tx.send_replace(dashboard.snapshot());

    while let Some(event) = events_rx.recv().await {
        dashboard.handle(event);
        snapshot_tx.send_replace(dashboard.snapshot());
    }

    info!("dashboard event channel closed; dashboard task exiting");
}
