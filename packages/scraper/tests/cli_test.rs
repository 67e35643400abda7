use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("igedd")
        .join(name)
}

#[test]
fn test_extract_avis_page() {
    Command::cargo_bin("igedd-scraper")
        .unwrap()
        .arg("extract")
        .arg(fixture("avis-2024.html"))
        .args(["--category", "Avis rendus", "--year", "2024"])
        .args(["--page-url", "https://igedd.test/avis-2024.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cadrage préalable 2024-123"))
        .stdout(predicate::str::contains("Avis ERROR"))
        .stdout(predicate::str::contains(
            "https://igedd.test/IMG/pdf/avis_rocade_nord.pdf",
        ));
}

#[test]
fn test_extract_unknown_category() {
    Command::cargo_bin("igedd-scraper")
        .unwrap()
        .arg("extract")
        .arg(fixture("avis-2024.html"))
        .args(["--category", "Actualités", "--year", "2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown category"));
}

#[test]
fn test_extract_missing_file() {
    Command::cargo_bin("igedd-scraper")
        .unwrap()
        .arg("extract")
        .arg(fixture("absent.html"))
        .args(["--category", "Saisines", "--year", "2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_crawl_rejects_invalid_year() {
    Command::cargo_bin("igedd-scraper")
        .unwrap()
        .args(["crawl", "--year", "1999", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid year"));
}
