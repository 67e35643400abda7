//! Hand-off of validated records to the document host.
//!
//! The core only builds an [`UploadRequest`] per record; delivering it is the
//! job of an [`Uploader`]. Any uploader failure aborts the run.

use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{DOCUMENT_LANGUAGE, SOURCE_DOMAIN, SOURCE_SCRAPER};
use crate::error::{Result, ScraperError};
use crate::types::{Access, DocumentItem};

/// Metadata bag stored alongside the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadData {
    pub category: String,
    pub category_local: String,
    pub source_scraper: String,
    pub source_file_url: String,
    pub source_filename: String,
    pub source_page_url: String,
    pub publication_date: String,
    pub publication_time: String,
    pub publication_datetime: String,
    pub authority: String,
    pub year: i32,
}

/// A document ready to be handed off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadRequest {
    pub file_url: String,
    pub title: String,
    pub description: String,
    pub source_domain: String,
    pub language: String,
    pub access: Access,
    pub data: UploadData,
}

impl UploadRequest {
    /// Build the request for a record that went through the whole pipeline.
    ///
    /// `default_access` only applies to records the pipeline left without one.
    #[must_use]
    pub fn from_item(item: &DocumentItem, default_access: Access) -> Self {
        let publication = item.publication.clone().unwrap_or_default();

        Self {
            file_url: item.source_file_url.clone(),
            title: item.title.clone(),
            description: item.project_or_placeholder().to_string(),
            source_domain: SOURCE_DOMAIN.to_string(),
            language: DOCUMENT_LANGUAGE.to_string(),
            access: item.access.unwrap_or(default_access),
            data: UploadData {
                category: item.category.map(|c| c.as_str().to_string()).unwrap_or_default(),
                category_local: item.category_local.label().to_string(),
                source_scraper: SOURCE_SCRAPER.to_string(),
                source_file_url: item.source_file_url.clone(),
                source_filename: item.source_filename.clone().unwrap_or_default(),
                source_page_url: item.source_page_url.clone(),
                publication_date: publication.date,
                publication_time: publication.time,
                publication_datetime: publication.datetime,
                authority: item.authority.clone(),
                year: item.year,
            },
        }
    }
}

/// Destination of validated records.
pub trait Uploader {
    fn upload(&self, request: &UploadRequest) -> Result<()>;
}

/// Logs what would be uploaded without handing anything off.
#[derive(Debug, Default)]
pub struct DryRunUploader;

impl Uploader for DryRunUploader {
    fn upload(&self, request: &UploadRequest) -> Result<()> {
        tracing::info!(
            url = %request.file_url,
            title = %request.title,
            access = %request.access,
            "Dry run, not uploading"
        );
        Ok(())
    }
}

/// Appends one JSON line per request to a manifest file read by the document host.
#[derive(Debug)]
pub struct ManifestUploader {
    path: PathBuf,
}

impl ManifestUploader {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Uploader for ManifestUploader {
    fn upload(&self, request: &UploadRequest) -> Result<()> {
        let line = serde_json::to_string(request)?;
        let fail = |e: std::io::Error| ScraperError::Upload {
            url: request.file_url.clone(),
            message: format!("{}: {e}", self.path.display()),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(fail)?;
        writeln!(file, "{line}").map_err(fail)?;

        tracing::info!(url = %request.file_url, title = %request.title, "Uploaded");
        Ok(())
    }
}

/// Keeps requests in memory.
#[derive(Debug, Default)]
pub struct MemoryUploader {
    requests: RefCell<Vec<UploadRequest>>,
}

impl MemoryUploader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<UploadRequest> {
        self.requests.borrow().clone()
    }
}

impl Uploader for MemoryUploader {
    fn upload(&self, request: &UploadRequest) -> Result<()> {
        self.requests.borrow_mut().push(request.clone());
        Ok(())
    }
}
