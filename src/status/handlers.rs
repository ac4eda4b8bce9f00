use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::health::NamedStatus;
use crate::status::StatusState;

pub async fn list_nodes(State(state): State<StatusState>) -> Json<Vec<NamedStatus>> {
    Json(state.registry.snapshots(state.window_secs))
}

pub async fn get_node(
    State(state): State<StatusState>,
    Path(name): Path<String>,
) -> Result<Json<NamedStatus>, StatusCode> {
    state
        .registry
        .status(&name, state.window_secs)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
