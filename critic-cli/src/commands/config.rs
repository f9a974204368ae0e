//! Config command - Show the effective configuration

use clap::Args;
use critic_core::{Config, Secrets};

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write a template secrets file (mode 0600) and exit
    #[arg(long)]
    pub init_secrets: bool,
}

impl ConfigArgs {
    /// Execute the config command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if self.init_secrets {
            let path = Secrets::create_template()?;
            println!("Created secrets template at {}", path.display());
            return Ok(());
        }

        println!("Critic Configuration");
        println!("====================");
        println!();
        println!("Server:");
        println!("  bind: {}", config.server.bind);
        println!("  workers: {}", config.server.workers);
        println!();
        println!("GitHub:");
        println!(
            "  api_base: {}",
            config.github.api_base.as_deref().unwrap_or("(github.com)")
        );
        println!();
        println!("AI:");
        println!("  endpoint: {}", config.ai.endpoint);
        println!("  model: {}", config.ai.model);
        println!("  temperature: {}", config.ai.temperature);
        println!("  max_tokens: {}", config.ai.max_tokens);
        println!();
        println!("Cache:");
        println!("  ttl: {:?}", config.cache.ttl);
        println!("  purge_interval: {:?}", config.cache.purge_interval);
        println!();
        println!("Retry:");
        println!("  max_retries: {}", config.retry.max_retries);
        println!("  delay: {:?}", config.retry.delay);
        println!();
        println!("Database:");
        println!("  path: {}", config.database.resolved_path().display());
        println!();

        if let Some(path) = Config::default_config_path() {
            println!("Config file: {}", path.display());
            if path.exists() {
                println!("  (exists)");
            } else {
                println!("  (not found - using defaults)");
            }
        }

        if let Some(path) = Secrets::default_secrets_path() {
            println!("Secrets file: {}", path.display());
            if !path.exists() {
                println!("  (not found - run `critic config --init-secrets`)");
            }
        }

        Ok(())
    }
}
