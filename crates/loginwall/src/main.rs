//! Loginwall - turns uploaded JPEG/PNG images into login-window wallpapers.
//!
//! Uploads are re-encoded as PNGs with an alpha channel and stored under
//! the digest of the uploaded bytes, so repeated uploads share one object.
//!
//! # Usage
//!
//! ```bash
//! # Run the web service
//! loginwall serve --http-url https://walls.example.com
//!
//! # View configuration
//! loginwall config show
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use loginwall_core::Config;

mod cli;
mod logging;
mod server;

/// Loginwall - login-window wallpaper converter and host.
#[derive(Parser, Debug)]
#[command(name = "loginwall")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Read configuration from this file instead of the default location
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the upload and download web service
    Serve(cli::serve::ServeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

fn load_config(path: Option<&PathBuf>) -> loginwall_core::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let loaded = load_config(cli.config.as_ref());
    let logging_config = match &loaded {
        Ok(config) => config.clone(),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default logging settings. Check your config file with `loginwall config path`."
            );
            Config::default()
        }
    };
    logging::init_from_config(&logging_config, cli.verbose, cli.json_logs);

    tracing::debug!("Loginwall v{}", loginwall_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, loaded?).await,
        Commands::Config(args) => cli::config::execute(args, cli.config).await,
    }
}
