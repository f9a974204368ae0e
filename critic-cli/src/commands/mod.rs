//! CLI command implementations

pub mod analyze;
pub mod config;
pub mod serve;

use std::sync::Arc;

use critic_core::{Analyzer, ChatCompletionClient, Config, Secrets};
use critic_github::GitHubClient;

pub use analyze::AnalyzeArgs;
pub use config::ConfigArgs;
pub use serve::ServeArgs;

/// Wire the GitHub client and the AI endpoint into an analyzer
pub(crate) fn build_analyzer(config: &Config, secrets: &Secrets) -> Analyzer {
    let api_key = secrets.ai_api_key();
    if api_key.is_none() {
        tracing::warn!(
            "No AI API key found. Set CRITIC_AI_API_KEY or OPENAI_API_KEY, \
             or add it to ~/.config/critic/secrets.toml"
        );
    }

    let github = Arc::new(GitHubClient::new(&config.github));
    let completion = Arc::new(ChatCompletionClient::new(config.ai.clone(), api_key));

    Analyzer::new(github, completion).with_default_token(secrets.github_token())
}
