//! Core data types for the scraper.
//!
//! A [`DocumentItem`] is created by the extractor with partial fields,
//! enriched by the header fetcher and then completed stage by stage by the
//! [`pipeline`](crate::pipeline).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScraperError;
use crate::text::contains_folded;

/// Placeholder rendered wherever an extracted field is missing.
pub const ERROR_PLACEHOLDER: &str = "ERROR";

/// Access level of a document on the document host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Private,
    Organization,
}

impl Access {
    /// Get the string value used by the document host.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Organization => "organization",
        }
    }
}

impl FromStr for Access {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "organization" => Ok(Self::Organization),
            _ => Err(ScraperError::InvalidAccess(s.to_string())),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category as labelled on the site.
///
/// Each variant has its own navigation and extraction rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum LocalCategory {
    /// "Avis rendus": opinions, grouped by session.
    AvisRendus,

    /// "Décisions de cas par cas ...": screening decisions. Holds the full label.
    CasParCas(String),

    /// "Les saisines": referrals.
    Saisines,
}

impl LocalCategory {
    /// Label of the opinions category.
    pub const AVIS_RENDUS: &'static str = "Avis rendus";

    /// Prefix shared by the case-by-case decision categories.
    pub const CAS_PAR_CAS_PREFIX: &'static str = "Décisions de cas par cas";

    /// Label of the referrals category.
    pub const SAISINES: &'static str = "Saisines";

    /// Parse a site label into a category.
    ///
    /// Returns `None` for labels the scraper does not handle.
    ///
    /// # Examples
    /// ```
    /// use igedd_scraper::types::LocalCategory;
    ///
    /// assert_eq!(LocalCategory::from_label("Avis rendus"), Some(LocalCategory::AvisRendus));
    /// assert_eq!(LocalCategory::from_label("Les saisines"), Some(LocalCategory::Saisines));
    /// assert_eq!(LocalCategory::from_label("Actualités"), None);
    /// ```
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label == Self::AVIS_RENDUS {
            Some(Self::AvisRendus)
        } else if label.starts_with(Self::CAS_PAR_CAS_PREFIX) {
            Some(Self::CasParCas(label.to_string()))
        } else if label.eq_ignore_ascii_case(Self::SAISINES)
            || label.eq_ignore_ascii_case("Les saisines")
        {
            Some(Self::Saisines)
        } else {
            None
        }
    }

    /// Get the site label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::AvisRendus => Self::AVIS_RENDUS,
            Self::CasParCas(label) => label,
            Self::Saisines => Self::SAISINES,
        }
    }
}

impl fmt::Display for LocalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<LocalCategory> for String {
    fn from(category: LocalCategory) -> Self {
        category.label().to_string()
    }
}

impl TryFrom<String> for LocalCategory {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Self::from_label(&label).ok_or_else(|| format!("unknown category '{label}'"))
    }
}

/// Normalized category reported to the document host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Avis")]
    Avis,
    #[serde(rename = "Cadrage")]
    Cadrage,
    #[serde(rename = "Cas par cas")]
    CasParCas,
}

impl Category {
    /// Get the string value reported to the document host.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avis => "Avis",
            Self::Cadrage => "Cadrage",
            Self::CasParCas => "Cas par cas",
        }
    }

    /// Assign the normalized category from the site category and project text.
    ///
    /// Scoping opinions are published among the regular opinions and only
    /// recognisable from their project text.
    ///
    /// # Examples
    /// ```
    /// use igedd_scraper::types::{Category, LocalCategory};
    ///
    /// let category = Category::assign(&LocalCategory::AvisRendus, Some("Cadrage préalable du projet"));
    /// assert_eq!(category, Category::Cadrage);
    /// ```
    #[must_use]
    pub fn assign(local: &LocalCategory, project: Option<&str>) -> Self {
        match local {
            LocalCategory::AvisRendus => {
                let is_cadrage = project
                    .map(|p| contains_folded(p, "cadrage prealable"))
                    .unwrap_or(false);
                if is_cadrage {
                    Self::Cadrage
                } else {
                    Self::Avis
                }
            }
            LocalCategory::CasParCas(_) => Self::CasParCas,
            LocalCategory::Saisines => Self::Avis,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication date derived from the Last-Modified header, in UTC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationDate {
    /// ISO 8601 timestamp (e.g., "2024-06-12T10:00:00Z").
    pub timestamp: String,

    /// Date only (e.g., "2024-06-12").
    pub date: String,

    /// Time only (e.g., "10:00:00 UTC").
    pub time: String,

    /// Date and time (e.g., "2024-06-12 10:00:00 UTC").
    pub datetime: String,
}

/// A document discovered on the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentItem {
    /// Human title, e.g. "Avis 2024-123".
    pub title: String,

    /// Dossier number, `None` when it could not be extracted.
    pub dossier: Option<String>,

    /// Project name, `None` when it could not be extracted.
    pub project: Option<String>,

    /// Category as labelled on the site.
    pub category_local: LocalCategory,

    /// Normalized category.
    pub category: Option<Category>,

    /// Absolute URL of the document file.
    pub source_file_url: String,

    /// Last path segment of `source_file_url`.
    pub source_filename: Option<String>,

    /// URL of the listing page the document was found on.
    pub source_page_url: String,

    /// Raw text of the content block the document was extracted from.
    pub full_info: String,

    pub authority: String,

    pub year: i32,

    /// Raw Last-Modified header value.
    pub publication_lastmodified: Option<String>,

    pub publication: Option<PublicationDate>,

    /// Set when an extracted field is missing or erroneous.
    pub error: bool,

    pub access: Option<Access>,
}

impl DocumentItem {
    /// Create a draft record with the fields known at extraction time.
    #[must_use]
    pub fn draft(
        category_local: LocalCategory,
        source_file_url: impl Into<String>,
        source_page_url: impl Into<String>,
    ) -> Self {
        Self {
            title: String::new(),
            dossier: None,
            project: None,
            category_local,
            category: None,
            source_file_url: source_file_url.into(),
            source_filename: None,
            source_page_url: source_page_url.into(),
            full_info: String::new(),
            authority: crate::config::AUTHORITY.to_string(),
            year: 0,
            publication_lastmodified: None,
            publication: None,
            error: false,
            access: None,
        }
    }

    /// Project name, or the error placeholder when missing.
    #[must_use]
    pub fn project_or_placeholder(&self) -> &str {
        self.project.as_deref().unwrap_or(ERROR_PLACEHOLDER)
    }

    /// Read a textual field by name.
    ///
    /// Used by the correction table, which names fields as strings.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "dossier" => self.dossier.as_deref(),
            "project" => self.project.as_deref(),
            "source_filename" => self.source_filename.as_deref(),
            "full_info" => Some(&self.full_info),
            "authority" => Some(&self.authority),
            _ => None,
        }
    }

    /// Overwrite a textual field by name.
    ///
    /// Returns `false` when the field is unknown.
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        let value = value.to_string();
        match name {
            "title" => self.title = value,
            "dossier" => self.dossier = Some(value),
            "project" => self.project = Some(value),
            "source_filename" => self.source_filename = Some(value),
            "full_info" => self.full_info = value,
            "authority" => self.authority = value,
            _ => return false,
        }
        true
    }
}

/// Build a title from its prefix and the dossier number.
///
/// # Examples
/// ```
/// use igedd_scraper::types::build_title;
///
/// assert_eq!(build_title("Avis", Some("2024-123")), "Avis 2024-123");
/// assert_eq!(build_title("Décision", None), "Décision ERROR");
/// ```
#[must_use]
pub fn build_title(prefix: &str, dossier: Option<&str>) -> String {
    format!("{prefix} {}", dossier.unwrap_or(ERROR_PLACEHOLDER))
}
