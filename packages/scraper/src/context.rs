//! Per-run mutable state, passed explicitly through every stage.

use chrono::Utc;

use crate::config::RunConfig;
use crate::events::{EventData, EventRecord};
use crate::report::RunReport;
use crate::types::DocumentItem;

/// State owned by one crawl run.
///
/// Holds the event data used for deduplication, the upload counter, the
/// stop flag polled by the crawler and the report accumulators.
#[derive(Debug)]
pub struct RunContext {
    config: RunConfig,
    events: EventData,
    documents_counted: usize,
    stop_requested: bool,
    report: RunReport,
}

impl RunContext {
    #[must_use]
    pub fn new(config: RunConfig, events: EventData) -> Self {
        let report = RunReport::new(config.run_id.clone());
        Self {
            config,
            events,
            documents_counted: 0,
            stop_requested: false,
            report,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Check whether a document URL was already handed off.
    #[must_use]
    pub fn is_seen(&self, url: &str) -> bool {
        self.events.contains_key(url)
    }

    #[must_use]
    pub fn events(&self) -> &EventData {
        &self.events
    }

    /// Remember a handed-off document so later runs skip it.
    pub fn record_event(&mut self, item: &DocumentItem) {
        let record = EventRecord {
            last_seen: Utc::now().to_rfc3339(),
            last_modified: item.publication_lastmodified.clone().unwrap_or_default(),
            run_id: self.config.run_id.clone(),
        };
        self.events.insert(item.source_file_url.clone(), record);
    }

    /// Count one more document reaching the limit check; returns the new count.
    pub fn count_document(&mut self) -> usize {
        self.documents_counted += 1;
        self.documents_counted
    }

    /// Whether the crawler must stop issuing requests.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Raise the stop flag. Returns `true` only for the call that raised it.
    pub fn request_stop(&mut self) -> bool {
        !std::mem::replace(&mut self.stop_requested, true)
    }

    #[must_use]
    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn report_mut(&mut self) -> &mut RunReport {
        &mut self.report
    }

    /// Consume the context, returning the final event data and report.
    #[must_use]
    pub fn finish(self) -> (EventData, RunReport) {
        (self.events, self.report)
    }
}
