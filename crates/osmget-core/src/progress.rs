//! Progress reporting for a single streamed download.
//!
//! Purely cosmetic: nothing here affects what is written to disk.

use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{msg} {spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{msg} {spinner:.blue} [{elapsed_precise}] {bytes} ({bytes_per_sec})";
const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";
const BAR_CHARS: &str = "█▓▒░  ";

/// Receiver of transfer progress.
pub trait Progress {
    /// Called once, before the first chunk. `total` is the declared
    /// Content-Length, `None` when absent.
    fn start(&mut self, total: Option<u64>);
    fn advance(&mut self, bytes: u64);
    fn finish(&mut self);
    /// Early exit: the transfer stopped before completing.
    fn abandon(&mut self);
}

/// Bytes expected vs. bytes seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferState {
    pub total: Option<u64>,
    pub bytes_done: u64,
}

impl TransferState {
    /// Fraction complete in [0.0, 1.0]; `None` when the total is unknown or zero.
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(t) if t > 0 => Some((self.bytes_done as f64 / t as f64).min(1.0)),
            _ => None,
        }
    }

    /// True when a total was declared and fewer bytes arrived.
    pub fn is_short(&self) -> bool {
        matches!(self.total, Some(t) if self.bytes_done != t)
    }
}

/// Terminal progress bar (stderr) with byte counts, rate and ETA.
pub struct BarProgress {
    label: String,
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            bar: None,
        }
    }
}

impl Progress for BarProgress {
    fn start(&mut self, total: Option<u64>) {
        let (bar, template) = match total {
            Some(len) => (ProgressBar::new(len), BAR_TEMPLATE),
            None => (ProgressBar::no_length(), SPINNER_TEMPLATE),
        };
        let style = ProgressStyle::with_template(template)
            .map(|s| s.tick_chars(TICK).progress_chars(BAR_CHARS))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message(self.label.clone());
        self.bar = Some(bar);
    }

    fn advance(&mut self, bytes: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(bytes);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }

    fn abandon(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }
}

/// Reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&mut self, _total: Option<u64>) {}
    fn advance(&mut self, _bytes: u64) {}
    fn finish(&mut self) {}
    fn abandon(&mut self) {}
}

/// Finalizes the display on drop: `abandon` unless [`ProgressGuard::finish`] ran.
pub(crate) struct ProgressGuard<'a, P: Progress + ?Sized> {
    progress: &'a mut P,
    state: TransferState,
    started: bool,
    done: bool,
}

impl<'a, P: Progress + ?Sized> ProgressGuard<'a, P> {
    pub(crate) fn new(progress: &'a mut P) -> Self {
        Self {
            progress,
            state: TransferState::default(),
            started: false,
            done: false,
        }
    }

    pub(crate) fn start(&mut self, total: Option<u64>) {
        if !self.started {
            self.state.total = total;
            self.progress.start(total);
            self.started = true;
        }
    }

    pub(crate) fn advance(&mut self, bytes: u64) {
        self.state.bytes_done += bytes;
        self.progress.advance(bytes);
    }

    pub(crate) fn state(&self) -> TransferState {
        self.state
    }

    pub(crate) fn finish(mut self) -> TransferState {
        if self.started {
            self.progress.finish();
        }
        self.done = true;
        self.state
    }
}

impl<P: Progress + ?Sized> Drop for ProgressGuard<'_, P> {
    fn drop(&mut self) {
        if self.started && !self.done {
            self.progress.abandon();
        }
    }
}
