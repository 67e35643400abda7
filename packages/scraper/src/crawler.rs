//! Crawl driver tying navigation, extraction, normalization and hand-off together.

use std::collections::VecDeque;

use crate::config::{RunConfig, START_URL};
use crate::context::RunContext;
use crate::error::Result;
use crate::events::{EventData, EventStore};
use crate::extractor::extract_documents;
use crate::fetch::PageFetcher;
use crate::headers::{attach_last_modified, HeaderOutcome};
use crate::html::Page;
use crate::navigator::{navigate, PageKind, Request};
use crate::notify::Notifier;
use crate::pipeline::{Pipeline, StageOutcome};
use crate::report::RunReport;
use crate::types::{DocumentItem, LocalCategory};
use crate::upload::{DryRunUploader, UploadRequest, Uploader};

/// Whether the crawl goes on after a listing page.
enum Flow {
    Continue,
    Stop,
}

/// One crawl run over the site.
///
/// The collaborators are borrowed so callers keep access to them (e.g. to
/// inspect an in-memory store) once the run is over.
pub struct Crawler<'a> {
    fetcher: &'a dyn PageFetcher,
    store: &'a dyn EventStore,
    uploader: &'a dyn Uploader,
    notifier: &'a dyn Notifier,
    pipeline: Pipeline,
    start_url: String,
}

impl<'a> Crawler<'a> {
    /// Create a crawler with the standard pipeline, starting from the site home.
    #[must_use]
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        store: &'a dyn EventStore,
        uploader: &'a dyn Uploader,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            fetcher,
            store,
            uploader,
            notifier,
            pipeline: Pipeline::standard(),
            start_url: START_URL.to_string(),
        }
    }

    /// Replace the normalization pipeline.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Start from another home page.
    #[must_use]
    pub fn with_start_url(mut self, url: impl Into<String>) -> Self {
        self.start_url = url.into();
        self
    }

    /// Run a full crawl and return its report.
    ///
    /// # Errors
    /// Fails when the home page cannot be fetched, the event data cannot be
    /// loaded (outside dry runs), a Last-Modified value is malformed, or an
    /// upload or the final event store write fails.
    pub fn run(&self, config: RunConfig) -> Result<RunReport> {
        let dry_run = config.dry_run;
        let events = self.load_events(dry_run)?;
        tracing::info!(
            year = config.target_year,
            known = events.len(),
            dry_run,
            "Starting crawl"
        );

        let mut ctx = RunContext::new(config, events);
        let mut queue = VecDeque::from([Request::new(self.start_url.clone(), PageKind::Home)]);

        while let Some(request) = queue.pop_front() {
            if ctx.stop_requested() {
                tracing::info!(pending = queue.len() + 1, "Stopping crawl");
                break;
            }
            if let Some(category) = request.kind.category() {
                if !ctx.config().accepts_category(category) {
                    tracing::debug!(category = %category, "Category filtered out");
                    continue;
                }
            }

            let page = match self.fetcher.fetch_page(&request.url) {
                Ok(page) => page,
                Err(e) if request.kind == PageKind::Home => return Err(e),
                Err(e) => {
                    tracing::warn!(url = %request.url, error = %e, "Failed to fetch page, skipping");
                    continue;
                }
            };

            match &request.kind {
                PageKind::Documents(category) => {
                    if let Flow::Stop = self.process_listing(&page, category, &mut ctx)? {
                        break;
                    }
                }
                kind => queue.extend(navigate(&page, kind, ctx.config().target_year)),
            }
        }

        let (events, report) = ctx.finish();
        tracing::info!(
            ok = report.ok.len(),
            errors = report.errors.len(),
            dropped_filetype = report.dropped_filetype,
            dropped_limit = report.dropped_limit,
            "Crawl finished"
        );

        if !dry_run {
            self.store.store(&events)?;
            self.notifier.notify(&report.subject(), &report.body())?;
        }

        Ok(report)
    }

    fn load_events(&self, dry_run: bool) -> Result<EventData> {
        match self.store.load() {
            Ok(events) => Ok(events),
            Err(e) if dry_run => {
                tracing::warn!(error = %e, "Could not load event data, using an empty set");
                Ok(EventData::new())
            }
            Err(e) => Err(e),
        }
    }

    fn process_listing(
        &self,
        page: &Page,
        category: &LocalCategory,
        ctx: &mut RunContext,
    ) -> Result<Flow> {
        let drafts = extract_documents(page, category, ctx);
        tracing::info!(page = page.url(), count = drafts.len(), "Extracted documents");

        for draft in drafts {
            let last_modified = match self.fetcher.fetch_last_modified(&draft.source_file_url) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(
                        url = %draft.source_file_url,
                        error = %e,
                        "Failed to fetch document headers, skipping"
                    );
                    continue;
                }
            };

            match attach_last_modified(draft, &last_modified, ctx) {
                HeaderOutcome::Emit(item) => self.handle(item, ctx)?,
                HeaderOutcome::Stop => return Ok(Flow::Stop),
            }
        }

        Ok(Flow::Continue)
    }

    fn handle(&self, item: DocumentItem, ctx: &mut RunContext) -> Result<()> {
        let StageOutcome::Keep(item) = self.pipeline.process(item, ctx)? else {
            return Ok(());
        };

        if item.error {
            tracing::warn!(
                title = %item.title,
                url = %item.source_file_url,
                "Extraction errors, uploading as private"
            );
        }

        let request = UploadRequest::from_item(&item, ctx.config().access);
        if ctx.config().dry_run {
            DryRunUploader.upload(&request)?;
        } else {
            self.uploader.upload(&request)?;
        }

        ctx.record_event(&item);
        if !ctx.config().dry_run && ctx.config().run_id.is_some() {
            self.store.store(ctx.events())?;
        }
        ctx.report_mut().record(item);
        Ok(())
    }
}
