use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use critic_core::{AnalysisRequest, Error, TaskId, TaskStatus};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::routes::error::map_error;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzePrInput {
    pub repo_url: String,
    pub pr_number: u64,
    #[serde(default)]
    pub github_token: Option<String>,
}

impl AnalyzePrInput {
    /// Check the body and turn it into a request
    fn into_request(self) -> Result<AnalysisRequest, Error> {
        let url = url::Url::parse(&self.repo_url)
            .map_err(|e| Error::InvalidRequest(format!("repo_url is not a valid URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(Error::InvalidRequest(format!(
                "repo_url must be an http(s) URL with a host: {}",
                self.repo_url
            )));
        }
        if self.pr_number == 0 {
            return Err(Error::InvalidRequest(
                "pr_number must be a positive integer".to_string(),
            ));
        }

        Ok(AnalysisRequest::new(self.repo_url, self.pr_number).with_token(self.github_token))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskAccepted {
    pub task_id: TaskId,
    pub status: TaskStatus,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze-pr", post(analyze_pr))
        .with_state(state)
}

pub(crate) async fn analyze_pr(
    State(state): State<AppState>,
    body: Result<Json<AnalyzePrInput>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(input)) => input.into_request(),
        Err(rejection) => Err(Error::InvalidRequest(rejection.body_text())),
    };
    let request = match request {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "Rejected analysis request");
            return map_error(&err).into_response();
        }
    };

    match state.dispatcher.submit(request).await {
        Ok(task_id) => Json(TaskAccepted {
            task_id,
            status: TaskStatus::Pending,
        })
        .into_response(),
        Err(err) => map_error(&err).into_response(),
    }
}
