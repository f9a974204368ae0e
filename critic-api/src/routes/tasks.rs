use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use critic_core::{TaskId, TaskStatus};
use serde::{Deserialize, Serialize};

use crate::routes::error::map_error;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusOutput {
    pub status: TaskStatus,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status/{task_id}", get(task_status))
        .route("/results/{task_id}", get(task_results))
        .with_state(state)
}

/// Always 200; unknown ids report `unknown`
pub(crate) async fn task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Json<StatusOutput> {
    let status = state.dispatcher.status(&TaskId::from(task_id)).await;
    Json(StatusOutput { status })
}

pub(crate) async fn task_results(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Response {
    match state.dispatcher.results(&TaskId::from(task_id)).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}
