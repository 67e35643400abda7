//! Source filename derivation.

use url::Url;

use crate::context::RunContext;
use crate::error::Result;
use crate::types::DocumentItem;

use super::{Stage, StageOutcome};

/// Last path segment of a URL.
///
/// # Examples
/// ```
/// use igedd_scraper::pipeline::filename_from_url;
///
/// assert_eq!(filename_from_url("https://example.org/IMG/pdf/avis_cle1.pdf?lang=fr"), "avis_cle1.pdf");
/// assert_eq!(filename_from_url("https://example.org/"), "");
/// ```
#[must_use]
pub fn filename_from_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or_default()
            .to_string(),
    }
}

/// Sets `source_filename` from `source_file_url`.
pub struct DeriveFilename;

impl Stage for DeriveFilename {
    fn name(&self) -> &'static str {
        "derive_filename"
    }

    fn process(&self, mut item: DocumentItem, _ctx: &mut RunContext) -> Result<StageOutcome> {
        item.source_filename = Some(filename_from_url(&item.source_file_url));
        Ok(StageOutcome::Keep(item))
    }
}
