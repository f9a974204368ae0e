//! Critic CLI - Command line interface for Critic
//!
//! Runs the pull request review API, or a single review inline.

mod commands;

use clap::{Parser, Subcommand};
use critic_core::{CliOverrides, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{AnalyzeArgs, ConfigArgs, ServeArgs};

/// Critic: asynchronous AI review of GitHub pull requests
#[derive(Parser, Debug)]
#[command(name = "critic")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model to use (overrides config and env)
    #[arg(long, global = true, env = "CRITIC_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run the HTTP API and analysis workers
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// Review one pull request and print the result as JSON
    #[command(visible_alias = "a")]
    Analyze(AnalyzeArgs),

    /// Show current configuration
    Config(ConfigArgs),
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let mut overrides = CliOverrides {
            model: self.model.clone(),
            ..CliOverrides::default()
        };
        if let Some(Commands::Serve(ref args)) = self.command {
            overrides.bind = args.bind.clone();
            overrides.workers = args.workers;
            overrides.database = args.database.clone();
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.overrides())?;

    if cli.verbose {
        tracing::debug!(
            bind = %config.server.bind,
            workers = config.server.workers,
            model = %config.ai.model,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("critic {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Analyze(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config(args)) => {
            args.execute(&config)?;
        }
        None => {
            println!("Critic - asynchronous AI review of GitHub pull requests");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
