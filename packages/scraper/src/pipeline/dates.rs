//! Publication date parsing from the Last-Modified header.

use chrono::{DateTime, Utc};

use crate::context::RunContext;
use crate::error::{Result, ScraperError};
use crate::types::{DocumentItem, PublicationDate};

use super::{Stage, StageOutcome};

/// Parse an HTTP date (e.g., "Wed, 12 Jun 2024 10:00:00 GMT") into its UTC representations.
///
/// # Examples
/// ```
/// use igedd_scraper::pipeline::parse_last_modified;
///
/// let date = parse_last_modified("Wed, 12 Jun 2024 10:00:00 GMT").unwrap();
/// assert_eq!(date.date, "2024-06-12");
/// assert_eq!(date.time, "10:00:00 UTC");
/// assert!(parse_last_modified("12/06/2024").is_none());
/// ```
#[must_use]
pub fn parse_last_modified(value: &str) -> Option<PublicationDate> {
    let parsed = DateTime::parse_from_rfc2822(value.trim()).ok()?;
    let utc = parsed.with_timezone(&Utc);

    let date = utc.format("%Y-%m-%d").to_string();
    let time = utc.format("%H:%M:%S UTC").to_string();

    Some(PublicationDate {
        timestamp: utc.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        datetime: format!("{date} {time}"),
        date,
        time,
    })
}

/// Derives the publication date fields. A missing or malformed value is fatal.
pub struct ParseDate;

impl Stage for ParseDate {
    fn name(&self) -> &'static str {
        "parse_date"
    }

    fn process(&self, mut item: DocumentItem, _ctx: &mut RunContext) -> Result<StageOutcome> {
        let value = item.publication_lastmodified.clone().unwrap_or_default();
        let publication = parse_last_modified(&value).ok_or_else(|| {
            ScraperError::InvalidLastModified {
                url: item.source_file_url.clone(),
                value,
            }
        })?;
        item.publication = Some(publication);
        Ok(StageOutcome::Keep(item))
    }
}
