pub mod config;
pub mod logging;

pub mod download;
pub mod fetcher;
pub mod index;
pub mod progress;
pub mod region;
pub mod transport;

pub use fetcher::{fetch, fetch_with, FetchError, FetchOutcome};
pub use region::Region;
