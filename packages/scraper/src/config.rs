//! Configuration constants, run configuration and validation functions.

use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

use crate::error::{Result, ScraperError};
use crate::types::{Access, LocalCategory};

/// Base URL of the IGEDD website.
pub const BASE_URL: &str = "https://www.igedd.developpement-durable.gouv.fr";

/// Home page of the environmental authority section, where every crawl starts.
pub const START_URL: &str =
    "https://www.igedd.developpement-durable.gouv.fr/l-autorite-environnementale-r145.html";

/// Source domain reported to the document host.
pub const SOURCE_DOMAIN: &str = "www.igedd.developpement-durable.gouv.fr";

/// Name of this scraper as reported in upload metadata.
pub const SOURCE_SCRAPER: &str = "IGEDD Scraper";

/// Authority issuing every document on the site.
pub const AUTHORITY: &str = "Autorité environnementale";

/// Language of the documents (ISO 639-2).
pub const DOCUMENT_LANGUAGE: &str = "fra";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// File extensions accepted by the document host.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "odt", "rtf", "txt", "xls", "xlsx", "ods", "ppt", "pptx", "odp",
];

/// Text wrap width for `full_info` blocks in the run report.
pub const REPORT_WRAP_WIDTH: usize = 100;

/// Oldest year the site publishes documents for.
const FIRST_YEAR: i32 = 2000;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("valid regex"));

/// Validate and parse a target year.
///
/// # Examples
/// ```
/// use igedd_scraper::config::validate_year;
///
/// assert_eq!(validate_year("2024").unwrap(), 2024);
/// assert!(validate_year("24").is_err());
/// assert!(validate_year("1999").is_err());
/// ```
pub fn validate_year(year: &str) -> Result<i32> {
    if !YEAR_PATTERN.is_match(year) {
        return Err(ScraperError::InvalidYear(year.to_string()));
    }

    let parsed: i32 = year
        .parse()
        .map_err(|_| ScraperError::InvalidYear(year.to_string()))?;

    let current = chrono::Utc::now().year();
    if !(FIRST_YEAR..=current).contains(&parsed) {
        return Err(ScraperError::InvalidYear(format!(
            "{year} (must be between {FIRST_YEAR} and {current})"
        )));
    }

    Ok(parsed)
}

/// Configuration for a single crawl run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Year whose documents are collected.
    pub target_year: i32,

    /// Category filters, matched case-insensitively against the site labels.
    ///
    /// Empty means every category.
    pub categories: Vec<String>,

    /// Maximum number of documents handed off per run (0 = unlimited).
    pub upload_limit: usize,

    /// Access level given to documents without extraction errors.
    pub access: Access,

    /// When set, nothing is uploaded, stored or mailed.
    pub dry_run: bool,

    /// Identifier of the run, present when launched from the hosting platform.
    pub run_id: Option<String>,
}

impl RunConfig {
    /// Create a configuration for the given year with default settings.
    #[must_use]
    pub fn new(target_year: i32) -> Self {
        Self {
            target_year,
            categories: Vec::new(),
            upload_limit: 0,
            access: Access::Public,
            dry_run: false,
            run_id: None,
        }
    }

    /// Restrict the crawl to categories whose label contains one of the filters.
    #[must_use]
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Set the upload limit (0 = unlimited).
    #[must_use]
    pub fn with_upload_limit(mut self, limit: usize) -> Self {
        self.upload_limit = limit;
        self
    }

    /// Set the default access level.
    #[must_use]
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    /// Enable or disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the run identifier.
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    /// Check whether a category passes the configured filters.
    #[must_use]
    pub fn accepts_category(&self, category: &LocalCategory) -> bool {
        if self.categories.is_empty() {
            return true;
        }
        let label = category.label().to_lowercase();
        self.categories
            .iter()
            .any(|filter| label.contains(&filter.to_lowercase()))
    }
}

/// Locations of the local files a CLI run reads and writes.
#[derive(Debug, Clone, Default)]
pub struct RunPaths {
    /// JSON file holding the event data.
    pub event_store: Option<PathBuf>,

    /// JSON-lines manifest receiving the validated records.
    pub manifest: Option<PathBuf>,

    /// YAML file receiving the run report.
    pub report: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_year_valid() {
        assert_eq!(validate_year("2024").unwrap(), 2024);
        assert_eq!(validate_year("2000").unwrap(), 2000);
    }

    #[test]
    fn test_validate_year_invalid() {
        assert!(validate_year("").is_err());
        assert!(validate_year("24").is_err());
        assert!(validate_year("20245").is_err());
        assert!(validate_year("abcd").is_err());
        assert!(validate_year("1999").is_err());
        assert!(validate_year("9999").is_err());
    }

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::new(2024);
        assert_eq!(config.target_year, 2024);
        assert_eq!(config.upload_limit, 0);
        assert_eq!(config.access, Access::Public);
        assert!(!config.dry_run);
        assert!(config.run_id.is_none());
    }

    #[test]
    fn test_accepts_category_without_filters() {
        let config = RunConfig::new(2024);
        assert!(config.accepts_category(&LocalCategory::AvisRendus));
        assert!(config.accepts_category(&LocalCategory::Saisines));
    }

    #[test]
    fn test_accepts_category_with_filters() {
        let config = RunConfig::new(2024).with_categories(["cas par cas"]);
        assert!(!config.accepts_category(&LocalCategory::AvisRendus));
        assert!(config.accepts_category(&LocalCategory::CasParCas(
            "Décisions de cas par cas sur des projets".to_string()
        )));
    }
}
