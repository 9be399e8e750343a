//! Reviewer CLI - assign pull request reviewers from team members
//!
//! Runs the HTTP API and offers the same operations from the command line.

mod api;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reviewer_core::{CliOverrides, Config, LogFormat};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{PrArgs, ServeArgs, TeamArgs, UserArgs};

/// Reviewer: pull request reviewer assignment for teams
#[derive(Parser, Debug)]
#[command(name = "reviewer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/reviewer/config.toml)
    #[arg(long, global = true, env = "REVIEWER_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database path (overrides config and env)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Maximum reviewers per pull request (overrides config and env)
    #[arg(long, global = true)]
    max_reviewers: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run the HTTP API
    Serve(ServeArgs),

    /// Manage teams
    Team(TeamArgs),

    /// Manage users
    User(UserArgs),

    /// Create, merge and reassign pull requests
    Pr(PrArgs),

    /// Show current configuration
    Config,
}

fn init_tracing(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration with overrides
    let config = Config::load_with_overrides(
        cli.config.as_deref(),
        CliOverrides {
            database_path: cli.database.clone(),
            max_reviewers: cli.max_reviewers,
            ..CliOverrides::default()
        },
    )?;

    init_tracing(config.log.format, cli.verbose);

    if cli.verbose {
        tracing::info!(
            database = %config.database.resolved_path().display(),
            max_reviewers = config.assignment.max_reviewers_per_pr,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("reviewer {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve(args)) => {
            args.execute(config).await?;
        }
        Some(Commands::Team(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::User(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Pr(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => {
            print_config(&config, cli.config.as_deref());
        }
        None => {
            println!("Reviewer - pull request reviewer assignment for teams");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config, explicit_path: Option<&std::path::Path>) {
    println!("Reviewer Configuration");
    println!("======================");
    println!();
    println!("Assignment:");
    println!(
        "  max_reviewers_per_pr: {}",
        config.assignment.max_reviewers_per_pr
    );
    println!(
        "  needs_more_reviewers_threshold: {}",
        config.assignment.needs_more_reviewers_threshold
    );
    println!(
        "  request_timeout: {:?}",
        config.assignment.request_timeout
    );
    println!();
    println!("Database:");
    println!("  path: {}", config.database.resolved_path().display());
    println!("  max_connections: {}", config.database.max_connections);
    println!("  busy_timeout: {:?}", config.database.busy_timeout);
    println!();
    println!("Server:");
    println!("  address: {}", config.server.bind_address());
    println!(
        "  admin_token: {}",
        if config.admin.token.is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    );
    println!();
    println!("Log format: {:?}", config.log.format);
    println!();

    let path = explicit_path
        .map(std::path::Path::to_path_buf)
        .or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
