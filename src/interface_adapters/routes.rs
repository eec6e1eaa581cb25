use crate::interface_adapters::http::{
    connect, delete_location, disconnect, get_coordinates, list_locations, list_players,
    push_coordinates, save_location, select_player, status,
};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/coordinates", get(get_coordinates).post(push_coordinates))
        .route("/locations", get(list_locations).post(save_location))
        .route("/locations/{index}", delete(delete_location))
        .route("/players", get(list_players))
        .route("/players/{name}/select", post(select_player))
        .route("/status", get(status))
        .route("/connection/connect", post(connect))
        .route("/connection/disconnect", post(disconnect))
        .with_state(state)
}
