//! CLI for osmget.

use anyhow::Result;
use clap::Parser;
use osmget_core::config::{self, OsmgetConfig};
use osmget_core::fetcher::{self, FetchOutcome};
use osmget_core::progress::{BarProgress, NoProgress};
use osmget_core::Region;
use std::path::PathBuf;

/// Download a region's OpenStreetMap extract (`<region>-latest.osm.pbf`).
///
/// With no arguments, fetches the configured default region.
#[derive(Debug, Parser)]
#[command(name = "osmget")]
#[command(about = "Download a region's OpenStreetMap .osm.pbf extract", long_about = None)]
pub struct Cli {
    /// Region name, e.g. "wyoming" (case-insensitive).
    pub region: Option<String>,

    /// HTML index page that must list the region's extract.
    #[arg(long, value_name = "URL")]
    pub index_url: Option<String>,

    /// Directory URL the extract is downloaded from.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory the extract is written to.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Accept a body shorter than its Content-Length.
    #[arg(long)]
    pub no_verify_length: bool,

    /// Hide the progress bar.
    #[arg(long, short)]
    pub quiet: bool,

    /// Log to ~/.local/state/osmget/osmget.log instead of stderr.
    #[arg(long)]
    pub log_file: bool,

    /// Config file to use instead of ~/.config/osmget/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Overlay command-line values on top of `cfg`.
    pub fn apply(&self, mut cfg: OsmgetConfig) -> OsmgetConfig {
        if let Some(region) = &self.region {
            cfg.region = region.clone();
        }
        if let Some(url) = &self.index_url {
            cfg.index_url = url.clone();
        }
        if let Some(url) = &self.base_url {
            cfg.file_base_url = url.clone();
        }
        if let Some(dir) = &self.data_dir {
            cfg.data_dir = dir.clone();
        }
        if self.no_verify_length {
            cfg.verify_length = false;
        }
        cfg
    }

    /// Run one fetch. `Ok(false)` means the fetch failed in an anticipated way
    /// (already logged).
    pub fn run(self) -> Result<bool> {
        let base = match &self.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        let cfg = self.apply(base);
        tracing::debug!("effective config: {:?}", cfg);

        let outcome = if self.quiet {
            fetcher::fetch_with(&cfg, &mut NoProgress)?
        } else {
            let label = format!("Downloading {}", Region::new(&cfg.region));
            fetcher::fetch_with(&cfg, &mut BarProgress::new(label))?
        };

        if let FetchOutcome::Success { path, .. } = &outcome {
            println!("{}", path.display());
        }
        Ok(outcome.is_success())
    }
}
