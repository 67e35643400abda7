//! Field normalizer: the ordered chain of stages every document passes through.
//!
//! Each stage owns a few fields of the [`DocumentItem`] and either keeps the
//! document (possibly modified) or drops it. Stages are independent; only
//! [`FlagErrors`] relies on `project` and `title` being final, which is why
//! it runs after beautification and corrections.

mod beautify;
mod category;
mod corrections;
mod dates;
mod errors;
mod filename;
mod filetype;
mod limit;

pub use beautify::{beautify_project, beautify_text, Beautify};
pub use category::AssignCategory;
pub use corrections::{ApplyCorrections, Correction, CORRECTIONS};
pub use dates::{parse_last_modified, ParseDate};
pub use errors::{is_erroneous, FlagErrors};
pub use filename::{filename_from_url, DeriveFilename};
pub use filetype::{is_supported_filename, FiletypeFilter};
pub use limit::UploadLimit;

use crate::context::RunContext;
use crate::error::Result;
use crate::types::DocumentItem;

/// Why a document left the pipeline without being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// File extension not accepted by the document host.
    UnsupportedFiletype,

    /// The run already reached its upload limit.
    UploadLimit,
}

/// Result of a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Keep(DocumentItem),
    Drop(DropReason),
}

/// A single normalization stage.
pub trait Stage {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Process one document.
    ///
    /// Only fatal conditions (malformed upstream data) are errors.
    fn process(&self, item: DocumentItem, ctx: &mut RunContext) -> Result<StageOutcome>;
}

/// Ordered chain of stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard chain, in the order the stages depend on.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_stage(ParseDate)
            .with_stage(AssignCategory)
            .with_stage(DeriveFilename)
            .with_stage(FiletypeFilter)
            .with_stage(Beautify)
            .with_stage(ApplyCorrections::builtin())
            .with_stage(FlagErrors)
            .with_stage(UploadLimit)
    }

    /// Append a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Names of the stages, in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run a document through every stage.
    ///
    /// Drops are counted in the run report.
    pub fn process(&self, mut item: DocumentItem, ctx: &mut RunContext) -> Result<StageOutcome> {
        for stage in &self.stages {
            match stage.process(item, ctx)? {
                StageOutcome::Keep(next) => item = next,
                StageOutcome::Drop(reason) => {
                    tracing::debug!(stage = stage.name(), ?reason, "Document dropped");
                    ctx.report_mut().record_drop(reason);
                    return Ok(StageOutcome::Drop(reason));
                }
            }
        }
        Ok(StageOutcome::Keep(item))
    }
}
