//! Error flagging and access assignment.

use crate::context::RunContext;
use crate::error::Result;
use crate::types::{Access, DocumentItem, ERROR_PLACEHOLDER};

use super::{Stage, StageOutcome};

/// Check whether extraction failed for a document.
///
/// A document is erroneous when its project reads "error" (any case), or
/// could not be extracted at all, or its title contains "error". A missing
/// dossier shows through the title, so a title fixed by a correction clears it.
#[must_use]
pub fn is_erroneous(item: &DocumentItem) -> bool {
    let project_failed = item
        .project
        .as_deref()
        .map(|p| p.trim().eq_ignore_ascii_case(ERROR_PLACEHOLDER))
        .unwrap_or(true);

    project_failed
        || item
            .title
            .to_lowercase()
            .contains(&ERROR_PLACEHOLDER.to_lowercase())
}

/// Sets `error` and `access`. Erroneous documents are always private.
pub struct FlagErrors;

impl Stage for FlagErrors {
    fn name(&self) -> &'static str {
        "flag_errors"
    }

    fn process(&self, mut item: DocumentItem, ctx: &mut RunContext) -> Result<StageOutcome> {
        if is_erroneous(&item) {
            tracing::warn!(
                url = %item.source_file_url,
                title = %item.title,
                "Extraction error, document set to private"
            );
            item.error = true;
            item.access = Some(Access::Private);
        } else {
            item.error = false;
            item.access = Some(ctx.config().access);
        }
        Ok(StageOutcome::Keep(item))
    }
}
