//! Index page retrieval and link scan.
//!
//! The page is scanned as raw text, not parsed as HTML. A match only gates the
//! download; the href value itself is never read back.

use crate::region::Region;
use crate::transport::{self, TransportError, TransportOptions};

/// Fetch the index page listing per-region extracts.
pub fn fetch_index(url: &str, opts: &TransportOptions) -> Result<String, TransportError> {
    transport::get_text(url, opts)
}

/// True if `page` contains `href="<region>-latest.osm.pbf"` verbatim.
pub fn contains_region_link(page: &str, region: &Region) -> bool {
    page.contains(&region.index_link())
}
