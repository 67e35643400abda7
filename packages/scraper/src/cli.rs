//! Command-line interface for the scraper.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{validate_year, RunConfig, RunPaths, BASE_URL};
use crate::context::RunContext;
use crate::crawler::Crawler;
use crate::error::Result;
use crate::events::{EventData, EventStore, JsonFileEventStore, MemoryEventStore};
use crate::extractor::extract_documents;
use crate::fetch::HttpFetcher;
use crate::html::Page;
use crate::notify::LogNotifier;
use crate::report::RunReport;
use crate::types::{Access, LocalCategory, ERROR_PLACEHOLDER};
use crate::upload::{DryRunUploader, ManifestUploader, Uploader};

/// IGEDD Scraper - Collect environmental authority opinions and decisions.
#[derive(Parser)]
#[command(name = "igedd-scraper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl the site and hand off the documents of a year.
    Crawl {
        /// Year of the documents (YYYY)
        #[arg(short, long, value_parser = validate_year)]
        year: i32,

        /// Only crawl categories whose label contains this text (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Maximum number of documents handed off (0 = unlimited)
        #[arg(long, default_value_t = 0)]
        upload_limit: usize,

        /// Access level of documents without extraction errors
        #[arg(long, default_value = "public")]
        access: Access,

        /// Crawl without uploading, storing or notifying
        #[arg(long)]
        dry_run: bool,

        /// Identifier of the run on the hosting platform
        #[arg(long)]
        run_id: Option<String>,

        /// JSON file holding the already processed documents
        #[arg(long, env = "IGEDD_EVENT_STORE")]
        event_store: Option<PathBuf>,

        /// JSON-lines manifest receiving the validated documents
        #[arg(long, required_unless_present = "dry_run")]
        manifest: Option<PathBuf>,

        /// Save the run report as YAML
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Extract the documents of a saved listing page.
    Extract {
        /// Saved HTML listing page
        html_file: PathBuf,

        /// Site category of the page (e.g., "Avis rendus")
        #[arg(short, long, value_parser = parse_category)]
        category: LocalCategory,

        /// Year of the documents (YYYY)
        #[arg(short, long, value_parser = validate_year)]
        year: i32,

        /// URL the page was saved from, used to resolve relative links
        #[arg(long)]
        page_url: Option<String>,
    },
}

fn parse_category(label: &str) -> std::result::Result<LocalCategory, String> {
    LocalCategory::from_label(label).ok_or_else(|| format!("unknown category '{label}'"))
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            year,
            categories,
            upload_limit,
            access,
            dry_run,
            run_id,
            event_store,
            manifest,
            report,
        } => {
            let mut config = RunConfig::new(year)
                .with_categories(categories)
                .with_upload_limit(upload_limit)
                .with_access(access)
                .with_dry_run(dry_run);
            if let Some(id) = run_id {
                config = config.with_run_id(id);
            }
            let paths = RunPaths {
                event_store,
                manifest,
                report,
            };
            crawl_command(config, &paths)
        }
        Commands::Extract {
            html_file,
            category,
            year,
            page_url,
        } => extract_command(&html_file, &category, year, page_url.as_deref()),
    }
}

/// Execute the crawl command.
fn crawl_command(config: RunConfig, paths: &RunPaths) -> Result<()> {
    println!(
        "{} documents of {}{}",
        style("Crawling").bold(),
        style(config.target_year).green(),
        if config.dry_run {
            style(" (dry run)").yellow().to_string()
        } else {
            String::new()
        }
    );
    println!();

    let store: Box<dyn EventStore> = match &paths.event_store {
        Some(path) => Box::new(JsonFileEventStore::new(path)),
        None => {
            if !config.dry_run {
                println!(
                    "{} no event store, already processed documents will be handed off again",
                    style("Warning:").yellow().bold()
                );
            }
            Box::new(MemoryEventStore::new(EventData::new()))
        }
    };
    let uploader: Box<dyn Uploader> = match &paths.manifest {
        Some(path) => Box::new(ManifestUploader::new(path)),
        None => Box::new(DryRunUploader),
    };
    let fetcher = HttpFetcher::new()?;
    let notifier = LogNotifier;

    // Create progress spinner
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Crawling site...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let crawler = Crawler::new(&fetcher, store.as_ref(), uploader.as_ref(), &notifier);
    let report = match crawler.run(config) {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();
    print_summary(&report);

    if let Some(path) = &paths.report {
        report.save_yaml(path)?;
        println!();
        println!("{} {}", style("Report saved to:").green().bold(), path.display());
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    println!("  New: {}", style(report.ok.len()).green());
    if !report.errors.is_empty() {
        println!("  Errors: {}", style(report.errors.len()).yellow().bold());
        for item in &report.errors {
            println!("    {} {}", style(&item.title).yellow(), item.source_file_url);
        }
    }
    if report.dropped_filetype > 0 {
        println!("  Unsupported files: {}", report.dropped_filetype);
    }
    if report.dropped_limit > 0 {
        println!("  Over upload limit: {}", report.dropped_limit);
    }
}

/// Execute the extract command.
fn extract_command(
    html_file: &Path,
    category: &LocalCategory,
    year: i32,
    page_url: Option<&str>,
) -> Result<()> {
    let html = std::fs::read_to_string(html_file)?;
    let base = format!("{BASE_URL}/");
    let page = Page::parse(page_url.unwrap_or(&base), &html)?;
    let ctx = RunContext::new(RunConfig::new(year), EventData::new());

    let items = extract_documents(&page, category, &ctx);

    println!(
        "{} {} documents in {}",
        style("Extracted").bold(),
        style(items.len()).green(),
        html_file.display()
    );
    println!();

    for item in &items {
        let title = if item.dossier.is_none() {
            style(&item.title).yellow()
        } else {
            style(&item.title).green()
        };
        println!("  {title}");
        println!(
            "    Project: {}",
            item.project.as_deref().unwrap_or(ERROR_PLACEHOLDER)
        );
        println!("    File: {}", item.source_file_url);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_crawl() {
        let cli = Cli::parse_from([
            "igedd-scraper",
            "crawl",
            "--year",
            "2024",
            "--manifest",
            "out.jsonl",
        ]);

        let Commands::Crawl {
            year,
            categories,
            upload_limit,
            access,
            dry_run,
            manifest,
            ..
        } = cli.command
        else {
            panic!("expected crawl");
        };
        assert_eq!(year, 2024);
        assert!(categories.is_empty());
        assert_eq!(upload_limit, 0);
        assert_eq!(access, Access::Public);
        assert!(!dry_run);
        assert_eq!(manifest, Some(PathBuf::from("out.jsonl")));
    }

    #[test]
    fn test_cli_parse_crawl_dry_run_with_filters() {
        let cli = Cli::parse_from([
            "igedd-scraper",
            "crawl",
            "-y",
            "2023",
            "--dry-run",
            "-c",
            "avis",
            "-c",
            "cas par cas",
            "--upload-limit",
            "5",
            "--access",
            "private",
        ]);

        let Commands::Crawl {
            categories,
            upload_limit,
            access,
            dry_run,
            manifest,
            ..
        } = cli.command
        else {
            panic!("expected crawl");
        };
        assert_eq!(categories, vec!["avis", "cas par cas"]);
        assert_eq!(upload_limit, 5);
        assert_eq!(access, Access::Private);
        assert!(dry_run);
        assert!(manifest.is_none());
    }

    #[test]
    fn test_cli_crawl_requires_manifest_unless_dry_run() {
        let result = Cli::try_parse_from(["igedd-scraper", "crawl", "--year", "2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_invalid_year() {
        let result = Cli::try_parse_from(["igedd-scraper", "crawl", "--year", "24", "--dry-run"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_extract() {
        let cli = Cli::parse_from([
            "igedd-scraper",
            "extract",
            "page.html",
            "--category",
            "Les saisines",
            "--year",
            "2024",
        ]);

        let Commands::Extract {
            html_file,
            category,
            year,
            page_url,
        } = cli.command
        else {
            panic!("expected extract");
        };
        assert_eq!(html_file, PathBuf::from("page.html"));
        assert_eq!(category, LocalCategory::Saisines);
        assert_eq!(year, 2024);
        assert!(page_url.is_none());
    }
}
