//! Header fetcher: attaches the Last-Modified value to a draft record.

use crate::context::RunContext;
use crate::types::DocumentItem;

/// What the crawler does with a record after its metadata request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderOutcome {
    /// Send the record down the pipeline.
    Emit(DocumentItem),

    /// The upload limit was reached: stop crawling.
    Stop,
}

/// Attach the verbatim Last-Modified value to a record.
///
/// Once the upload limit has been reached the record is not emitted and the
/// crawl is told to stop.
pub fn attach_last_modified(
    mut item: DocumentItem,
    last_modified: &str,
    ctx: &RunContext,
) -> HeaderOutcome {
    if ctx.stop_requested() {
        tracing::debug!(url = %item.source_file_url, "Upload limit attained, not emitting");
        return HeaderOutcome::Stop;
    }
    item.publication_lastmodified = Some(last_modified.to_string());
    HeaderOutcome::Emit(item)
}
