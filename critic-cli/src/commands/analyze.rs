//! Analyze command - Review a single pull request inline

use clap::Args;
use critic_core::{AnalysisRequest, Config, Secrets};

use super::build_analyzer;

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Repository URL (https://github.com/owner/repo)
    #[arg(required = true)]
    pub repo_url: String,

    /// Pull request number
    #[arg(required = true)]
    pub pr_number: u64,

    /// GitHub token for private repositories (falls back to GITHUB_TOKEN)
    #[arg(long)]
    pub token: Option<String>,
}

impl AnalyzeArgs {
    /// Execute the analyze command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let secrets = Secrets::load()?;
        let analyzer = build_analyzer(config, &secrets);

        tracing::info!(repo = %self.repo_url, pr = self.pr_number, "Starting analysis");

        let request =
            AnalysisRequest::new(&self.repo_url, self.pr_number).with_token(self.token.clone());
        let result = analyzer.analyze(&request).await?;

        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }
}
