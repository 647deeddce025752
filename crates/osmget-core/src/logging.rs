//! Logging init: stderr, or an append-only file under the XDG state dir.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    File(PathBuf),
}

impl LogSink {
    /// `~/.local/state/osmget/osmget.log`
    pub fn state_file() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("osmget")?;
        Ok(LogSink::File(
            xdg_dirs.get_state_home().join("osmget").join("osmget.log"),
        ))
    }

    fn make_writer(&self) -> Result<BoxMakeWriter> {
        match self {
            LogSink::Stderr => Ok(BoxMakeWriter::new(std::io::stderr)),
            LogSink::File(path) => Ok(BoxMakeWriter::new(Mutex::new(open_log_file(path)?))),
        }
    }
}

/// Open `path` for appending, creating its directory first.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))
}

/// Install the global subscriber writing to `sink`. `RUST_LOG` overrides the
/// default `info` filter. Fails if the sink cannot be opened or a subscriber
/// is already installed, so the caller can fall back to stderr.
pub fn init_logging(sink: &LogSink) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(sink.make_writer()?)
        .with_ansi(false)
        .with_target(matches!(sink, LogSink::File(_)))
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    if let LogSink::File(path) = sink {
        tracing::debug!("osmget logging initialized at {}", path.display());
    }
    Ok(())
}
