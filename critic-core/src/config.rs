//! Configuration management for Critic
//!
//! Configuration is loaded once at start-up and handed to each component
//! explicitly. Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (CRITIC_*)
//! 3. Config file (~/.config/critic/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API listens on
    pub bind: String,

    /// Number of analysis workers pulling from the queue
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            workers: 4,
        }
    }
}

/// GitHub configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base, for GitHub Enterprise installs
    pub api_base: Option<String>,
}

/// AI completion endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AiConfig {
    /// Chat completions URL
    pub endpoint: String,

    /// Model name sent with every request
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens per file
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.2,
            max_tokens: 1500,
        }
    }
}

/// Result cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a cached analysis stays valid
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    /// How often expired entries are swept from the store
    #[serde(with = "humantime_serde")]
    pub purge_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            purge_interval: Duration::from_secs(10 * 60),
        }
    }
}

/// Task retry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts allowed after the first one fails
    pub max_retries: u32,

    /// Fixed wait between attempts
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(60),
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; defaults to `~/.cache/critic/critic.db`
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Resolve the database path, falling back to the cache directory
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("critic")
                .join("critic.db")
        })
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub github: GitHubConfig,
    pub ai: AiConfig,
    pub cache: CacheConfig,
    pub retry: RetryConfig,
    pub database: DatabaseConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub workers: Option<usize>,
    pub database: Option<PathBuf>,
    pub model: Option<String>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/critic/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("critic").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - CRITIC_BIND: Listen address
    /// - CRITIC_WORKERS: Worker count
    /// - CRITIC_GITHUB_API: GitHub REST base URL
    /// - CRITIC_AI_ENDPOINT: Chat completions URL
    /// - CRITIC_MODEL: Model to use
    /// - CRITIC_DATABASE: SQLite file
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(bind) = std::env::var("CRITIC_BIND") {
            self.server.bind = bind;
        }

        if let Ok(workers) = std::env::var("CRITIC_WORKERS") {
            self.server.workers = workers
                .parse()
                .map_err(|_| Error::Config(format!("CRITIC_WORKERS is not a number: {}", workers)))?;
        }

        if let Ok(api_base) = std::env::var("CRITIC_GITHUB_API") {
            self.github.api_base = Some(api_base);
        }

        if let Ok(endpoint) = std::env::var("CRITIC_AI_ENDPOINT") {
            self.ai.endpoint = endpoint;
        }

        if let Ok(model) = std::env::var("CRITIC_MODEL") {
            self.ai.model = model;
        }

        if let Ok(path) = std::env::var("CRITIC_DATABASE") {
            self.database.path = Some(PathBuf::from(path));
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(bind) = overrides.bind {
            self.server.bind = bind;
        }

        if let Some(workers) = overrides.workers {
            self.server.workers = workers;
        }

        if let Some(path) = overrides.database {
            self.database.path = Some(path);
        }

        if let Some(model) = overrides.model {
            self.ai.model = model;
        }

        self
    }

    /// Reject values no component can work with
    pub fn validate(self) -> Result<Self> {
        if self.server.workers == 0 {
            return Err(Error::Config("server.workers must be at least 1".to_string()));
        }

        url::Url::parse(&self.ai.endpoint)
            .map_err(|e| Error::Config(format!("ai.endpoint is not a URL: {}", e)))?;

        Ok(self)
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(overrides: CliOverrides) -> Result<Self> {
        Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(overrides)
            .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.workers, 4);
        assert_eq!(config.cache.ttl, Duration::from_secs(3600));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.delay, Duration::from_secs(60));
        assert_eq!(config.ai.max_tokens, 1500);
        assert!((config.ai.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(CliOverrides {
            bind: Some("0.0.0.0:9000".to_string()),
            workers: Some(8),
            database: Some(PathBuf::from("/tmp/critic.db")),
            model: Some("gpt-4o".to_string()),
        });

        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.server.workers, 8);
        assert_eq!(config.database.resolved_path(), PathBuf::from("/tmp/critic.db"));
        assert_eq!(config.ai.model, "gpt-4o");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[server]
bind = "0.0.0.0:8080"
workers = 2

[ai]
endpoint = "https://llm.internal/v1/chat/completions"
model = "gemini-1.0"

[cache]
ttl = "30m"

[retry]
max_retries = 5
delay = "10s"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.workers, 2);
        assert_eq!(config.ai.model, "gemini-1.0");
        assert_eq!(config.cache.ttl, Duration::from_secs(30 * 60));
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.delay, Duration::from_secs(10));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[ai]
model = "gpt-4o-mini"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert_eq!(config.ai.endpoint, AiConfig::default().endpoint);
        assert_eq!(config.cache.ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = Config::default().with_cli_overrides(CliOverrides {
            workers: Some(0),
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }
}
