//! Blocking HTTP GET over libcurl.
//!
//! Two shapes: [`get_text`] buffers the whole body (index page), and
//! [`get_streamed`] hands body chunks to a sink as they arrive (extract file).
//! Runs on the calling thread; there is no cancellation.

use std::cell::RefCell;
use std::convert::Infallible;
use std::str;
use std::time::Duration;
use thiserror::Error;

/// Chunk size used for streamed bodies (libcurl receive buffer).
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

const MAX_REDIRECTS: u32 = 10;

/// Knobs for a single GET.
#[derive(Debug, Clone, Copy)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    /// Upper bound on the size of each body chunk passed to the sink.
    pub chunk_size: usize,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Network-layer failure on either the index fetch or the file fetch.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// Curl reported an error (timeout, connection, early close, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Final response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
}

impl TransportError {
    /// True when the server closed the body before the declared Content-Length.
    pub fn is_partial_body(&self) -> bool {
        matches!(self, TransportError::Curl(e) if e.is_partial_file())
    }
}

/// Failure of a streamed GET: either the transfer or the caller's sink.
#[derive(Debug)]
pub enum StreamError<E> {
    /// `head` is whatever response head arrived before the failure
    /// (default when the request never got that far).
    Transport {
        source: TransportError,
        head: ResponseHead,
    },
    Sink(E),
}

impl<E> StreamError<E> {
    fn transport(source: impl Into<TransportError>, head: ResponseHead) -> Self {
        StreamError::Transport {
            source: source.into(),
            head,
        }
    }
}

impl<E> From<TransportError> for StreamError<E> {
    fn from(e: TransportError) -> Self {
        StreamError::transport(e, ResponseHead::default())
    }
}

impl<E> From<curl::Error> for StreamError<E> {
    fn from(e: curl::Error) -> Self {
        StreamError::transport(e, ResponseHead::default())
    }
}

/// Status and length of the final response (after redirects).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: Option<u32>,
    pub content_length: Option<u64>,
}

impl ResponseHead {
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }

    /// Feed one raw header line. A status line starts a fresh head, so only
    /// the last response of a redirect chain is kept.
    fn feed_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if line.starts_with("HTTP/") {
            *self = ResponseHead {
                status: line
                    .split_whitespace()
                    .nth(1)
                    .and_then(|code| code.parse().ok()),
                content_length: None,
            };
            return;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                self.content_length = value.trim().parse::<u64>().ok();
            }
        }
    }
}

/// GET `url` and return the body as text (lossy UTF-8).
pub fn get_text(url: &str, opts: &TransportOptions) -> Result<String, TransportError> {
    let mut body = Vec::new();
    let result = get_streamed(url, opts, |_, chunk| {
        body.extend_from_slice(chunk);
        Ok::<(), Infallible>(())
    });
    match result {
        Ok(_) => Ok(String::from_utf8_lossy(&body).into_owned()),
        Err(StreamError::Transport { source, .. }) => Err(source),
        Err(StreamError::Sink(never)) => match never {},
    }
}

/// Streamed GET. `on_body` receives each non-empty chunk together with the
/// final response head, and only when that head carries a 2xx status; error
/// bodies are drained without reaching the sink.
///
/// A sink error aborts the transfer and is returned as [`StreamError::Sink`].
pub fn get_streamed<E, F>(
    url: &str,
    opts: &TransportOptions,
    mut on_body: F,
) -> Result<ResponseHead, StreamError<E>>
where
    F: FnMut(&ResponseHead, &[u8]) -> Result<(), E>,
{
    url::Url::parse(url).map_err(|source| TransportError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let head = RefCell::new(ResponseHead::default());
    let mut sink_err: Option<E> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.useragent(concat!("osmget/", env!("CARGO_PKG_VERSION")))?;
    easy.follow_location(true)?;
    easy.max_redirections(MAX_REDIRECTS)?;
    easy.buffer_size(opts.chunk_size)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                head.borrow_mut().feed_line(s);
            }
            true
        })?;
        transfer.write_function(|data| {
            let h = head.borrow();
            if data.is_empty() || !h.is_success() {
                return Ok(data.len());
            }
            match on_body(&h, data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    sink_err = Some(e);
                    Ok(0) // abort transfer
                }
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = sink_err {
        return Err(StreamError::Sink(e));
    }
    let head = head.into_inner();
    if let Err(e) = performed {
        return Err(StreamError::transport(e, head));
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(StreamError::transport(TransportError::Http(code), head));
    }
    Ok(head)
}
