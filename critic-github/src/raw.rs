//! Raw file content download

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use tracing::{debug, error};

use crate::{Error, GitHubClient, Result};

impl GitHubClient {
    /// Download the contents behind a file's `raw_url`
    ///
    /// The token, when present, is sent as `Authorization: token <t>`.
    pub async fn raw_content(&self, raw_url: &str, token: Option<&str>) -> Result<String> {
        let mut request = self.http().get(raw_url).header(USER_AGENT, "critic");
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            error!(url = %raw_url, %status, "Raw content request failed");
            return Err(Error::Status {
                url: raw_url.to_string(),
                status: status.as_u16(),
            });
        }

        let content = response.text().await?;
        debug!(url = %raw_url, bytes = content.len(), "Fetched raw content");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use critic_core::SourceHost;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn router() -> Router {
        Router::new()
            .route(
                "/raw/main.py",
                get(|headers: HeaderMap| async move {
                    match headers.get("authorization") {
                        Some(value) if value == "token ghp_test" => (StatusCode::OK, "print('hi')\n"),
                        _ => (StatusCode::NOT_FOUND, "Not Found"),
                    }
                }),
            )
            .route("/raw/broken.py", get(|| async { StatusCode::BAD_GATEWAY }))
    }

    #[tokio::test]
    async fn test_raw_content_sends_token() {
        let base = serve(router()).await;
        let client = GitHubClient::default();

        let content = client
            .raw_content(&format!("{}/raw/main.py", base), Some("ghp_test"))
            .await
            .unwrap();
        assert_eq!(content, "print('hi')\n");
    }

    #[tokio::test]
    async fn test_raw_content_without_token_is_rejected_upstream() {
        let base = serve(router()).await;
        let client = GitHubClient::default();

        let err = client
            .raw_content(&format!("{}/raw/main.py", base), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_raw_maps_failure_to_upstream() {
        let base = serve(router()).await;
        let client = GitHubClient::default();

        let err = client
            .fetch_raw(&format!("{}/raw/broken.py", base), None)
            .await
            .unwrap_err();
        assert!(matches!(err, critic_core::Error::Upstream(ref m) if m.contains("502")));
    }
}
