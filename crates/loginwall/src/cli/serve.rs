//! The `loginwall serve` command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use loginwall_core::{Config, ContentStore, Ingestor};

use crate::server::{self, AppState};

/// Arguments for the `serve` command.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// External base URL used in download links
    #[arg(long, env = "LOGINWALL_HTTP_URL", value_name = "URL")]
    pub http_url: Option<String>,

    /// Socket address to listen on
    #[arg(short, long, value_name = "ADDR")]
    pub listen: Option<String>,

    /// Directory holding stored wallpapers
    #[arg(long, value_name = "DIR")]
    pub storage_dir: Option<PathBuf>,
}

impl ServeArgs {
    /// Layer command-line overrides on top of the loaded config.
    fn apply(self, mut config: Config) -> Config {
        if let Some(url) = self.http_url {
            config.server.external_url = url;
        }
        if let Some(listen) = self.listen {
            config.server.listen_addr = listen;
        }
        if let Some(dir) = self.storage_dir {
            config.storage.dir = dir;
        }
        config
    }
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let config = args.apply(config);
    config.validate()?;

    let storage_dir = config.storage_dir();
    let store = ContentStore::open(&storage_dir)
        .await
        .with_context(|| format!("Cannot open object store at {}", storage_dir.display()))?;

    let css_dir = config.css_dir();
    if !css_dir.is_dir() {
        tracing::warn!("Stylesheet directory {:?} not found, pages will be unstyled", css_dir);
    }

    let ingestor = Ingestor::new(&config, store);
    server::serve(AppState::new(config, ingestor)).await
}
