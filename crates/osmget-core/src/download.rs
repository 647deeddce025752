//! Streamed single-GET download to a local file.
//!
//! The output file is created (truncating) on the first body chunk of a 2xx
//! response, or when a 2xx body ends with nothing in it, so an HTTP error
//! never touches an existing file. Data received before a mid-transfer
//! failure stays on disk; there is no cleanup.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::progress::{Progress, ProgressGuard, TransferState};
use crate::transport::{self, StreamError, TransportError, TransportOptions};

#[derive(Debug, Error)]
pub enum DownloadError {
    /// The transfer failed; `received` is what reached the file before it did.
    #[error("{source}")]
    Transport {
        #[source]
        source: TransportError,
        received: TransferState,
    },
    /// Creating, writing or flushing the output file failed.
    #[error("cannot write {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// GET `url` and write the body to `path`, reporting to `progress`.
/// Returns the declared total and the number of bytes written.
pub fn stream_to_file<P: Progress + ?Sized>(
    url: &str,
    path: &Path,
    opts: &TransportOptions,
    progress: &mut P,
) -> Result<TransferState, DownloadError> {
    let storage_err = |source| DownloadError::Storage {
        path: path.to_path_buf(),
        source,
    };

    let mut guard = ProgressGuard::new(progress);
    let mut file: Option<File> = None;

    let result = transport::get_streamed(url, opts, |head, chunk| -> io::Result<()> {
        if file.is_none() {
            guard.start(head.content_length);
            file = Some(File::create(path)?);
        }
        if let Some(f) = file.as_mut() {
            f.write_all(chunk)?;
        }
        guard.advance(chunk.len() as u64);
        Ok(())
    });

    let head = match result {
        Ok(head) => head,
        Err(StreamError::Sink(e)) => return Err(storage_err(e)),
        Err(StreamError::Transport { source, head }) => {
            // 2xx body cut off before its first byte: the (empty) partial
            // file replaces whatever was there, same as a later cut.
            if file.is_none() && head.is_success() && source.is_partial_body() {
                guard.start(head.content_length);
                File::create(path).map_err(storage_err)?;
            }
            return Err(DownloadError::Transport {
                source,
                received: guard.state(),
            });
        }
    };

    match file.as_mut() {
        Some(f) => f.flush().map_err(storage_err)?,
        None => {
            // 2xx with an empty body: still leave an (empty) file behind.
            guard.start(head.content_length);
            File::create(path).map_err(storage_err)?;
        }
    }

    Ok(guard.finish())
}
