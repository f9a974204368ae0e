pub mod analyze;
pub mod error;
pub mod tasks;

use axum::Router;

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(analyze::router(state.clone()))
        .merge(tasks::router(state))
}
