//! IGEDD Scraper - Collect the opinions and decisions of the French
//! environmental authority.
//!
//! This crate crawls the environmental authority section of the IGEDD
//! website, extracts one record per published document (opinions, scoping
//! opinions, case-by-case decisions and their forms, referral receipts),
//! normalizes the records and hands them off to a document host.
//!
//! # Example
//!
//! ```
//! use igedd_scraper::pipeline::parse_last_modified;
//!
//! let publication = parse_last_modified("Wed, 12 Jun 2024 10:00:00 GMT").unwrap();
//! assert_eq!(publication.date, "2024-06-12");
//! assert_eq!(publication.time, "10:00:00 UTC");
//! ```
//!
//! # Architecture
//!
//! The scraper is organized into several modules:
//!
//! - [`config`]: Configuration constants, run configuration and validation
//! - [`types`]: Core data types (DocumentItem, LocalCategory, Category, etc.)
//! - [`error`]: Error types and Result alias
//! - [`text`]: Text folding and punctuation normalization
//! - [`html`]: Parsed pages and selector helpers
//! - [`fetch`]: Page and header fetching over HTTP
//! - [`navigator`]: Category and year navigation
//! - [`extractor`]: Document extraction from listing pages
//! - [`headers`]: Last-Modified attachment and stop signal
//! - [`pipeline`]: Field normalization stages
//! - [`context`]: Per-run state
//! - [`events`]: Persistence of already processed documents
//! - [`upload`]: Hand-off to the document host
//! - [`report`]: End-of-run report
//! - [`notify`]: Report delivery
//! - [`crawler`]: Crawl driver
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod context;
pub mod crawler;
pub mod error;
pub mod events;
pub mod extractor;
pub mod fetch;
pub mod headers;
pub mod html;
pub mod navigator;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod text;
pub mod types;
pub mod upload;

// Re-export the crawl entry point
pub use crawler::Crawler;

// Re-export commonly used items
pub use config::{validate_year, RunConfig};
pub use error::{Result, ScraperError};
pub use types::{Access, Category, DocumentItem, LocalCategory};
