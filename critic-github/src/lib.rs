//! Critic GitHub - pull request access for Critic
//!
//! Lists the files a pull request changes through the GitHub REST API and
//! fetches their raw contents. [`GitHubClient`] implements
//! [`critic_core::SourceHost`] so the analysis engine can use it directly.

mod client;
mod error;
mod files;
mod raw;

pub use client::{parse_github_url, GitHubClient};
pub use error::{Error, Result};
