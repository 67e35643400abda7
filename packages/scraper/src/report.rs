//! End-of-run report separating processed documents from erroneous ones.

use std::fs;
use std::path::Path;

use serde::Serialize;
use textwrap::{fill, Options};

use crate::config::REPORT_WRAP_WIDTH;
use crate::error::Result;
use crate::pipeline::DropReason;
use crate::types::DocumentItem;

/// Documents seen during a run, split by outcome.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub run_id: Option<String>,
    pub ok: Vec<DocumentItem>,
    pub errors: Vec<DocumentItem>,
    pub dropped_filetype: usize,
    pub dropped_limit: usize,
}

impl RunReport {
    #[must_use]
    pub fn new(run_id: Option<String>) -> Self {
        Self {
            run_id,
            ..Self::default()
        }
    }

    /// File a processed document under ok or errors.
    pub fn record(&mut self, item: DocumentItem) {
        if item.error {
            self.errors.push(item);
        } else {
            self.ok.push(item);
        }
    }

    /// Count a dropped document.
    pub fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::UnsupportedFiletype => self.dropped_filetype += 1,
            DropReason::UploadLimit => self.dropped_limit += 1,
        }
    }

    /// Total of processed documents.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.ok.len() + self.errors.len()
    }

    /// Mail subject summarising the run.
    #[must_use]
    pub fn subject(&self) -> String {
        format!(
            "IGEDD Scraper (Errors: {} | New: {} )",
            self.errors.len(),
            self.ok.len()
        )
    }

    /// Plain-text report body.
    ///
    /// Erroneous documents come first and carry their raw extracted text
    /// so extraction regressions can be triaged without re-running.
    #[must_use]
    pub fn body(&self) -> String {
        let start = format!(
            "IGEDD Scraper Run {}",
            self.run_id.as_deref().unwrap_or("(local)")
        );

        let errors = format!(
            "ERRORS ({})\n\n{}",
            self.errors.len(),
            self.errors
                .iter()
                .map(|item| format_item(item, true))
                .collect::<Vec<_>>()
                .join("\n\n")
        );

        let ok = format!(
            "SCRAPED ITEMS ({})\n\n{}",
            self.ok.len(),
            self.ok
                .iter()
                .map(|item| format_item(item, false))
                .collect::<Vec<_>>()
                .join("\n\n")
        );

        [start, errors, ok].join("\n\n")
    }

    /// Write the report as YAML.
    pub fn save_yaml(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml_ng::to_string(self)?;
        fs::write(path, format!("---\n{yaml}"))?;
        Ok(())
    }
}

fn format_item(item: &DocumentItem, with_full_info: bool) -> String {
    let category = item.category.map(|c| c.as_str()).unwrap_or("");
    let publication_date = item
        .publication
        .as_ref()
        .map(|p| p.date.as_str())
        .unwrap_or("");

    let mut lines = vec![
        format!("title: {}", item.title),
        format!("project: {}", item.project_or_placeholder()),
        format!("authority: {}", item.authority),
        format!("category: {category}"),
        format!("category_local: {}", item.category_local),
        format!("publication_date: {publication_date}"),
        format!("source_file_url: {}", item.source_file_url),
        format!("source_page_url: {}", item.source_page_url),
        format!("year: {}", item.year),
    ];

    if with_full_info {
        let options = Options::new(REPORT_WRAP_WIDTH)
            .initial_indent("    ")
            .subsequent_indent("    ");
        let wrapped = item
            .full_info
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| fill(l, &options))
            .collect::<Vec<_>>()
            .join("\n");
        lines.push(format!("full_info:\n{wrapped}"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocalCategory;

    fn item(title: &str, error: bool) -> DocumentItem {
        let mut item = DocumentItem::draft(
            LocalCategory::AvisRendus,
            format!("https://example.org/{title}.pdf"),
            "https://example.org/2024.html",
        );
        item.title = title.to_string();
        item.error = error;
        item.full_info = "N° ERROR\nProjet sans numéro\n".to_string();
        item
    }

    #[test]
    fn test_record_splits_by_error() {
        let mut report = RunReport::new(None);
        report.record(item("Avis 1", false));
        report.record(item("Avis ERROR", true));
        report.record_drop(DropReason::UploadLimit);

        assert_eq!(report.ok.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.dropped_limit, 1);
        assert_eq!(report.processed(), 2);
        assert_eq!(report.subject(), "IGEDD Scraper (Errors: 1 | New: 1 )");
    }

    #[test]
    fn test_body_attaches_full_info_to_errors_only() {
        let mut report = RunReport::new(Some("42".to_string()));
        report.record(item("Avis ERROR", true));
        report.record(item("Avis 1", false));

        let body = report.body();
        assert!(body.starts_with("IGEDD Scraper Run 42"));
        assert_eq!(body.matches("full_info:").count(), 1);
        assert!(body.contains("    Projet sans numéro"));

        let errors_at = body.find("ERRORS (1)").unwrap();
        let ok_at = body.find("SCRAPED ITEMS (1)").unwrap();
        assert!(errors_at < ok_at);
    }

    #[test]
    fn test_save_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.yaml");
        let mut report = RunReport::new(None);
        report.record(item("Avis 1", false));
        report.save_yaml(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("---\n"));
        assert!(content.contains("title: Avis 1"));
    }
}
