//! Normalized category assignment.

use crate::context::RunContext;
use crate::error::Result;
use crate::types::{Category, DocumentItem};

use super::{Stage, StageOutcome};

/// Sets `category` from the site category and the project text.
///
/// Must run before [`Beautify`](super::Beautify), which strips the
/// "Cadrage préalable" prefix the rule looks for.
pub struct AssignCategory;

impl Stage for AssignCategory {
    fn name(&self) -> &'static str {
        "assign_category"
    }

    fn process(&self, mut item: DocumentItem, _ctx: &mut RunContext) -> Result<StageOutcome> {
        item.category = Some(Category::assign(
            &item.category_local,
            item.project.as_deref(),
        ));
        Ok(StageOutcome::Keep(item))
    }
}
