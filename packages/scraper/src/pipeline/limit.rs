//! Upload-limit enforcement.

use crate::context::RunContext;
use crate::error::Result;
use crate::types::DocumentItem;

use super::{DropReason, Stage, StageOutcome};

/// Lets the first `upload_limit` documents through and drops the rest.
///
/// The first drop raises the stop flag so the crawler stops issuing requests;
/// documents already in flight are dropped here.
pub struct UploadLimit;

impl Stage for UploadLimit {
    fn name(&self) -> &'static str {
        "upload_limit"
    }

    fn process(&self, item: DocumentItem, ctx: &mut RunContext) -> Result<StageOutcome> {
        let limit = ctx.config().upload_limit;
        let count = ctx.count_document();

        if limit == 0 || count <= limit {
            return Ok(StageOutcome::Keep(item));
        }

        if ctx.request_stop() {
            tracing::info!(limit, "Upload limit reached, stopping crawl");
        }
        Ok(StageOutcome::Drop(DropReason::UploadLimit))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::item;
    use super::*;
    use crate::config::RunConfig;
    use crate::events::EventData;

    #[test]
    fn test_exactly_limit_pass() {
        let mut ctx = RunContext::new(RunConfig::new(2024).with_upload_limit(3), EventData::new());

        let mut kept = 0;
        let mut stop_signals = 0;
        for _ in 0..10 {
            let was_stopped = ctx.stop_requested();
            match UploadLimit.process(item(), &mut ctx).unwrap() {
                StageOutcome::Keep(_) => kept += 1,
                StageOutcome::Drop(reason) => assert_eq!(reason, DropReason::UploadLimit),
            }
            if !was_stopped && ctx.stop_requested() {
                stop_signals += 1;
            }
        }

        assert_eq!(kept, 3);
        assert_eq!(stop_signals, 1);
    }

    #[test]
    fn test_zero_is_unlimited() {
        let mut ctx = RunContext::new(RunConfig::new(2024), EventData::new());
        for _ in 0..50 {
            assert!(matches!(
                UploadLimit.process(item(), &mut ctx).unwrap(),
                StageOutcome::Keep(_)
            ));
        }
        assert!(!ctx.stop_requested());
    }
}
