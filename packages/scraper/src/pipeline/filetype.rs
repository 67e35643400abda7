//! Filetype filtering against the document host's accepted formats.

use crate::config::ALLOWED_EXTENSIONS;
use crate::context::RunContext;
use crate::error::Result;
use crate::types::DocumentItem;

use super::filename::filename_from_url;
use super::{DropReason, Stage, StageOutcome};

/// Check whether a filename has an accepted extension (case-insensitive).
///
/// # Examples
/// ```
/// use igedd_scraper::pipeline::is_supported_filename;
///
/// assert!(is_supported_filename("avis.PDF"));
/// assert!(!is_supported_filename("plan.dwg"));
/// assert!(!is_supported_filename("pdf"));
/// ```
#[must_use]
pub fn is_supported_filename(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| extension.eq_ignore_ascii_case(allowed)),
        _ => false,
    }
}

/// Drops documents whose file is not in an accepted format.
pub struct FiletypeFilter;

impl Stage for FiletypeFilter {
    fn name(&self) -> &'static str {
        "filetype_filter"
    }

    fn process(&self, item: DocumentItem, _ctx: &mut RunContext) -> Result<StageOutcome> {
        let filename = item
            .source_filename
            .clone()
            .unwrap_or_else(|| filename_from_url(&item.source_file_url));

        if is_supported_filename(&filename) {
            Ok(StageOutcome::Keep(item))
        } else {
            tracing::info!(url = %item.source_file_url, "Unsupported filetype, dropping");
            Ok(StageOutcome::Drop(DropReason::UnsupportedFiletype))
        }
    }
}
