//! GitHub API client using octocrab

use async_trait::async_trait;
use critic_core::config::GitHubConfig;
use critic_core::{FileDiff, SourceHost};
use octocrab::Octocrab;
use tracing::debug;

use crate::{Error, Result};

/// GitHub client for reading pull requests
///
/// Requests run with the token supplied per call, so one client serves
/// tasks for any number of repositories and users.
#[derive(Clone)]
pub struct GitHubClient {
    api_base: Option<String>,
    http: reqwest::Client,
}

impl GitHubClient {
    /// Create a client against github.com or the configured Enterprise base
    pub fn new(config: &GitHubConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            http: reqwest::Client::new(),
        }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Build an octocrab instance for a single call
    pub(crate) fn octocrab(&self, token: Option<&str>) -> Result<Octocrab> {
        let mut builder = Octocrab::builder();
        if let Some(ref base) = self.api_base {
            builder = builder
                .base_uri(base.as_str())
                .map_err(|e| Error::Client(format!("Invalid GitHub API base {}: {}", base, e)))?;
        }
        if let Some(token) = token {
            builder = builder.personal_token(token.to_string());
        }

        builder
            .build()
            .map_err(|e| Error::Client(format!("Failed to create GitHub client: {}", e)))
    }
}

impl Default for GitHubClient {
    fn default() -> Self {
        Self::new(&GitHubConfig::default())
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn list_pr_files(
        &self,
        repo_url: &str,
        pr_number: u64,
        token: Option<&str>,
    ) -> critic_core::Result<Vec<FileDiff>> {
        let (owner, repo) = parse_github_url(repo_url)?;
        debug!(owner = %owner, repo = %repo, pr = pr_number, "Listing pull request files");
        Ok(self.pull_request_files(&owner, &repo, pr_number, token).await?)
    }

    async fn fetch_raw(&self, raw_url: &str, token: Option<&str>) -> critic_core::Result<String> {
        Ok(self.raw_content(raw_url, token).await?)
    }
}

/// Parse a GitHub URL into owner and repo
///
/// Supports formats:
/// - owner/repo
/// - https://github.com/owner/repo
/// - git@github.com:owner/repo.git
pub fn parse_github_url(url: &str) -> Result<(String, String)> {
    let url = url.trim().trim_end_matches('/');

    // Handle shorthand: owner/repo
    if !url.contains(':') && !url.contains('/') {
        return Err(Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            url
        )));
    }

    if !url.contains("://") && !url.contains('@') {
        let parts: Vec<&str> = url.split('/').collect();
        if parts.len() == 2 && parts.iter().all(|p| !p.is_empty()) {
            return Ok((
                parts[0].to_string(),
                parts[1].trim_end_matches(".git").to_string(),
            ));
        }
        return Err(Error::Parse(format!(
            "Invalid repository format: {}. Expected owner/repo",
            url
        )));
    }

    // Handle HTTPS URL: https://github.com/owner/repo
    if url.starts_with("https://") || url.starts_with("http://") {
        let url = url::Url::parse(url).map_err(|e| Error::Parse(e.to_string()))?;
        let path = url.path().trim_start_matches('/').trim_end_matches(".git");
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() >= 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            return Ok((parts[0].to_string(), parts[1].to_string()));
        }
        return Err(Error::Parse(format!("Invalid GitHub URL path: {}", path)));
    }

    // Handle SSH URL: git@github.com:owner/repo.git
    if url.starts_with("git@") {
        if let Some(path) = url.split(':').nth(1) {
            let path = path.trim_end_matches(".git");
            let parts: Vec<&str> = path.split('/').collect();
            if parts.len() >= 2 {
                return Ok((parts[0].to_string(), parts[1].to_string()));
            }
        }
        return Err(Error::Parse(format!("Invalid SSH URL: {}", url)));
    }

    Err(Error::Parse(format!("Unrecognized URL format: {}", url)))
}
