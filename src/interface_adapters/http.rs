// Plugin-facing HTTP handlers. Reads come from the published snapshot; writes go
// through the dashboard task.

use crate::domain::{LocationError, Position, SavedLocation};
use crate::interface_adapters::protocol::{
    CoordinatesResponse, DeleteLocationQuery, PlayerStateDto, PlayersResponse,
    PushCoordinatesRequest, SaveLocationRequest, StatusResponse,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::DashboardEvent;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    // Human-readable error string for consistent JSON error responses.
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn unavailable() -> ApiError {
    api_error(StatusCode::SERVICE_UNAVAILABLE, "dashboard unavailable")
}

fn map_location_error(err: LocationError) -> ApiError {
    let status = match err {
        LocationError::BlankName | LocationError::NotConfirmed => StatusCode::BAD_REQUEST,
        LocationError::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
        LocationError::Storage(_) => {
            warn!(error = %err, "location storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    api_error(status, err.to_string())
}

pub async fn get_coordinates(State(state): State<Arc<AppState>>) -> Json<CoordinatesResponse> {
    let snapshot = state.snapshot_rx.borrow();
    Json(CoordinatesResponse::from(&snapshot.projection))
}

pub async fn push_coordinates(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PushCoordinatesRequest>,
) -> Result<StatusCode, ApiError> {
    let position = Position::new(payload.x, payload.y, payload.z);
    if !position.is_finite() {
        return Err(api_error(StatusCode::BAD_REQUEST, "coordinates must be finite"));
    }

    state
        .events_tx
        .send(DashboardEvent::PushCoordinates { position })
        .await
        .map_err(|_| unavailable())?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_locations(State(state): State<Arc<AppState>>) -> Json<Vec<SavedLocation>> {
    Json(state.snapshot_rx.borrow().locations.clone())
}

pub async fn save_location(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SaveLocationRequest>,
) -> Result<(StatusCode, Json<SavedLocation>), ApiError> {
    let saved = state
        .request(|reply| DashboardEvent::SaveLocation {
            name: payload.name,
            reply,
        })
        .await
        .ok_or_else(unavailable)?
        .map_err(map_location_error)?;

    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn delete_location(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Query(query): Query<DeleteLocationQuery>,
) -> Result<Json<SavedLocation>, ApiError> {
    let removed = state
        .request(|reply| DashboardEvent::DeleteLocation {
            index,
            confirmed: query.confirm,
            reply,
        })
        .await
        .ok_or_else(unavailable)?
        .map_err(map_location_error)?;

    Ok(Json(removed))
}

pub async fn list_players(State(state): State<Arc<AppState>>) -> Json<PlayersResponse> {
    let now = Utc::now();
    let snapshot = state.snapshot_rx.borrow();
    let selected = snapshot.selected.as_deref();

    Json(PlayersResponse {
        selected: snapshot.selected.clone(),
        players: snapshot
            .players
            .iter()
            .map(|entity| PlayerStateDto::new(entity, selected, now))
            .collect(),
    })
}

pub async fn select_player(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let selected = state
        .request(|reply| DashboardEvent::Select {
            name: name.clone(),
            reply: Some(reply),
        })
        .await
        .ok_or_else(unavailable)?;

    if selected {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(
            StatusCode::NOT_FOUND,
            format!("player {name} is not online"),
        ))
    }
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        connection: state.snapshot_rx.borrow().connection,
    })
}

pub async fn connect(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    if state.feed.connect().await {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(unavailable())
    }
}

pub async fn disconnect(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    if state.feed.disconnect().await {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(unavailable())
    }
}
