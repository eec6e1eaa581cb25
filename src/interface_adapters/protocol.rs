// Wire protocol DTOs: feed messages coming in, plugin API payloads going out.

use crate::domain::{EntityState, Position, Projection};
use crate::use_cases::{ConnectionState, FeedEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const KNOWN_TYPES: [&str; 5] = [
    "connected",
    "coordinates",
    "playerJoin",
    "playerLeave",
    "playerList",
];

/// Messages the position feed sends, discriminated by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeedMessage {
    Connected {
        #[serde(default)]
        message: Option<String>,
    },
    Coordinates(CoordinatesDto),
    PlayerJoin(PlayerDto),
    PlayerLeave(PlayerDto),
    PlayerList(PlayerListDto),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatesDto {
    pub player: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub world: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerDto {
    pub player: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerListDto {
    #[serde(default)]
    pub players: Option<Vec<String>>,
}

#[derive(Debug)]
pub enum DecodeError {
    InvalidJson(serde_json::Error),
    MissingType,
    UnknownType(String),
    Malformed {
        kind: String,
        source: serde_json::Error,
    },
    BlankPlayer,
    NonFinitePosition,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidJson(err) => write!(f, "invalid json: {err}"),
            DecodeError::MissingType => write!(f, "missing string field `type`"),
            DecodeError::UnknownType(kind) => write!(f, "unknown message type `{kind}`"),
            DecodeError::Malformed { kind, source } => {
                write!(f, "malformed `{kind}` message: {source}")
            }
            DecodeError::BlankPlayer => write!(f, "player name is blank"),
            DecodeError::NonFinitePosition => write!(f, "position is not finite"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decodes one text frame from the feed into a typed event.
pub fn decode(text: &str) -> Result<FeedEvent, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(DecodeError::InvalidJson)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?
        .to_string();
    if !KNOWN_TYPES.contains(&kind.as_str()) {
        return Err(DecodeError::UnknownType(kind));
    }

    let message = serde_json::from_value::<FeedMessage>(value)
        .map_err(|source| DecodeError::Malformed { kind, source })?;
    FeedEvent::try_from(message)
}

impl TryFrom<FeedMessage> for FeedEvent {
    type Error = DecodeError;

    fn try_from(message: FeedMessage) -> Result<Self, Self::Error> {
        let event = match message {
            FeedMessage::Connected { message } => FeedEvent::Connected { message },
            FeedMessage::Coordinates(dto) => {
                let position = Position::new(dto.x, dto.y, dto.z);
                if !position.is_finite() {
                    return Err(DecodeError::NonFinitePosition);
                }
                FeedEvent::Coordinates {
                    player: player_name(dto.player)?,
                    position,
                    world: dto.world,
                }
            }
            FeedMessage::PlayerJoin(dto) => FeedEvent::PlayerJoin {
                player: player_name(dto.player)?,
            },
            FeedMessage::PlayerLeave(dto) => FeedEvent::PlayerLeave {
                player: player_name(dto.player)?,
            },
            FeedMessage::PlayerList(dto) => FeedEvent::PlayerList {
                players: dto
                    .players
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|name| !name.trim().is_empty())
                    .collect(),
            },
        };
        Ok(event)
    }
}

fn player_name(name: String) -> Result<String, DecodeError> {
    if name.trim().is_empty() {
        return Err(DecodeError::BlankPlayer);
    }
    Ok(name)
}

/// Currently displayed coordinates for the plugin API.
#[derive(Debug, Clone, Serialize)]
pub struct CoordinatesResponse {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub player: Option<String>,
    pub world: Option<String>,
}

impl From<&Projection> for CoordinatesResponse {
    fn from(projection: &Projection) -> Self {
        Self {
            x: projection.position.x,
            y: projection.position.y,
            z: projection.position.z,
            player: projection.player.clone(),
            world: projection.world.clone(),
        }
    }
}

/// Coordinates pushed in by an embedding host.
#[derive(Debug, Clone, Deserialize)]
pub struct PushCoordinatesRequest {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveLocationRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteLocationQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// One roster entry as shown in the player list.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerStateDto {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub world: String,
    pub last_update: DateTime<Utc>,
    pub seconds_since_update: i64,
    pub selected: bool,
}

impl PlayerStateDto {
    pub fn new(entity: &EntityState, selected: Option<&str>, now: DateTime<Utc>) -> Self {
        Self {
            name: entity.name.clone(),
            x: entity.position.x,
            y: entity.position.y,
            z: entity.position.z,
            world: entity.world.clone(),
            last_update: entity.last_update,
            seconds_since_update: seconds_since(entity.last_update, now),
            selected: selected == Some(entity.name.as_str()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayersResponse {
    pub selected: Option<String>,
    pub players: Vec<PlayerStateDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub connection: ConnectionState,
}

/// Whole seconds elapsed since `then`, never negative.
pub fn seconds_since(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_seconds().max(0)
}
