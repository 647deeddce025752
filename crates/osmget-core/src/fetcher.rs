//! Resolve and download one region's extract, end to end.
//!
//! Sequence: fetch index page, check for the region's href, build the file
//! URL from the naming convention, prepare the output directory, stream the
//! body to disk. Anticipated failures (transport errors, missing link, short
//! body) come back as a [`FetchOutcome`] and are logged at error level;
//! filesystem errors are returned as [`FetchError`].

use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::OsmgetConfig;
use crate::download::{self, DownloadError};
use crate::index;
use crate::progress::{BarProgress, Progress, TransferState};
use crate::region::Region;
use crate::transport::TransportError;

/// How a fetch ended. Only `Success` leaves a complete file behind.
#[derive(Debug)]
pub enum FetchOutcome {
    Success {
        path: PathBuf,
        bytes: u64,
    },
    IndexFetchFailed(TransportError),
    /// The index page has no `href="<region>-latest.osm.pbf"`.
    LinkNotFound {
        region: Region,
    },
    FileFetchFailed(TransportError),
    /// The body ended short of its declared length (`expected`, when the
    /// response carried one). The partial file is kept.
    Truncated {
        path: PathBuf,
        expected: Option<u64>,
        received: u64,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }
}

/// Local filesystem failure. Not contained: these reach the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fetch `region` using `index_url` and otherwise default settings, with a
/// terminal progress bar.
pub fn fetch(region: &str, index_url: &str) -> Result<FetchOutcome, FetchError> {
    let cfg = OsmgetConfig {
        region: region.to_string(),
        index_url: index_url.to_string(),
        ..OsmgetConfig::default()
    };
    let mut bar = BarProgress::new(format!("Downloading {}", Region::new(region)));
    fetch_with(&cfg, &mut bar)
}

/// Fetch `cfg.region` as configured, reporting transfer progress to `progress`.
pub fn fetch_with<P: Progress + ?Sized>(
    cfg: &OsmgetConfig,
    progress: &mut P,
) -> Result<FetchOutcome, FetchError> {
    let region = Region::new(&cfg.region);
    let opts = cfg.transport_options();

    tracing::info!("fetching index page for {} from {}", region, cfg.index_url);
    let page = match index::fetch_index(&cfg.index_url, &opts) {
        Ok(page) => page,
        Err(e) => {
            tracing::error!(url = %cfg.index_url, "index fetch failed: {}", e);
            return Ok(FetchOutcome::IndexFetchFailed(e));
        }
    };

    if !index::contains_region_link(&page, &region) {
        tracing::error!("download link for {} not found in the index page", region);
        return Ok(FetchOutcome::LinkNotFound { region });
    }
    drop(page);

    let file_url = region.file_url(&cfg.file_base_url);
    tracing::info!("found .osm.pbf file at {}", file_url);

    let path = region.output_path(&cfg.data_dir);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| FetchError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let state = match download::stream_to_file(&file_url, &path, &opts, progress) {
        Ok(state) => state,
        Err(DownloadError::Storage { path, source }) => {
            return Err(FetchError::Storage { path, source });
        }
        Err(DownloadError::Transport { source, received }) => {
            if !source.is_partial_body() {
                tracing::error!(url = %file_url, "error during download: {}", source);
                return Ok(FetchOutcome::FileFetchFailed(source));
            }
            if cfg.verify_length {
                return Ok(truncated(path, received));
            }
            tracing::debug!("length check disabled, keeping short body: {}", source);
            received
        }
    };

    if cfg.verify_length && state.is_short() {
        return Ok(truncated(path, state));
    }

    tracing::info!("download completed: {}", path.display());
    Ok(FetchOutcome::Success {
        path,
        bytes: state.bytes_done,
    })
}

fn truncated(path: PathBuf, state: TransferState) -> FetchOutcome {
    match (state.total, state.fraction()) {
        (Some(total), Some(fraction)) => tracing::error!(
            "download truncated: {} has {} of {} bytes ({:.1}%)",
            path.display(),
            state.bytes_done,
            total,
            fraction * 100.0
        ),
        _ => tracing::error!(
            "download truncated: {} has {} bytes, connection closed early",
            path.display(),
            state.bytes_done
        ),
    }
    FetchOutcome::Truncated {
        path,
        expected: state.total,
        received: state.bytes_done,
    }
}
