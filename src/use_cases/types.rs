// Use-case level inputs/outputs for the dashboard loop.

use crate::domain::{EntityState, LocationError, Position, Projection, SavedLocation};
use serde::Serialize;
use std::fmt;
use tokio::sync::oneshot;

/// Typed events decoded from the position feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Connected { message: Option<String> },
    Coordinates {
        player: String,
        position: Position,
        world: String,
    },
    PlayerJoin { player: String },
    PlayerLeave { player: String },
    PlayerList { players: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        };
        f.write_str(text)
    }
}

pub type LocationReply = oneshot::Sender<Result<SavedLocation, LocationError>>;

/// Everything the dashboard task reacts to, from the feed and from the user.
#[derive(Debug)]
pub enum DashboardEvent {
    Feed(FeedEvent),
    Connection(ConnectionState),
    Select {
        name: String,
        reply: Option<oneshot::Sender<bool>>,
    },
    PushCoordinates { position: Position },
    SaveLocation { name: String, reply: LocationReply },
    DeleteLocation {
        index: usize,
        confirmed: bool,
        reply: LocationReply,
    },
}

/// Read model published after every handled event.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub connection: ConnectionState,
    pub projection: Projection,
    pub selected: Option<String>,
    pub players: Vec<EntityState>,
    pub locations: Vec<SavedLocation>,
}
