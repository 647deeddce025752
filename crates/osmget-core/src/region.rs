//! Region naming: the lowercase token and everything derived from it.
//!
//! The download URL and output path are built from a fixed naming convention
//! (`<region>-latest.osm.pbf`), independent of the href found on the index page.

use std::fmt;
use std::path::{Path, PathBuf};

/// Suffix shared by the index link, the remote file and the local file.
pub const EXTRACT_SUFFIX: &str = "-latest.osm.pbf";

/// A caller-supplied region token, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region(String);

impl Region {
    /// Accepts any text; no validation against a known-region list.
    pub fn new(token: &str) -> Self {
        Region(token.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<region>-latest.osm.pbf`
    pub fn file_name(&self) -> String {
        format!("{}{}", self.0, EXTRACT_SUFFIX)
    }

    /// The literal substring the index page must contain.
    pub fn index_link(&self) -> String {
        format!("href=\"{}\"", self.file_name())
    }

    /// Direct file URL under `base`. A trailing slash on `base` is tolerated.
    pub fn file_url(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.file_name())
    }

    /// Local output path under `data_dir`.
    pub fn output_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.file_name())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
