//! Document extractor: turns a listing page into draft [`DocumentItem`]s.
//!
//! Listing pages are a flat sequence of content elements below
//! `.texte-article`. Headings (`h2`) set a running state that applies to the
//! framed blocks (`.texteencadre-spip`) following them, and every block
//! describes one case with one or more downloadable files.
//!
//! Extraction never fails: a field that cannot be recovered is left as
//! `None` and surfaces as `ERROR` in titles and reports. Blocks without the
//! expected link are skipped.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::context::RunContext;
use crate::html::{element_text, element_text_without, find_match, first_text, href, Page};
use crate::text::{contains_folded, fold};
use crate::types::{build_title, DocumentItem, LocalCategory};

/// Marker text inserted by the site before recently published opinions.
const NEW_MARKER: &str = "NOUVEAU";

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static CONTENT_ELEMENTS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("#contenu .contenu-article .texte-article > *").expect("valid selector")
});

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static FRAMED_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".texteencadre-spip").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static DOWNLOAD_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.fr-download__link").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static EXTERNAL_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.spip_out").expect("valid selector"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static AVIS_DOSSIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)N°[ \t\x{a0}]*(?:dossier[ \t\x{a0}]+Ae)?[ \t\x{a0}]*:?[ \t\x{a0}]*(\d[^\n]*?)[ \t\x{a0}]*(?:\n|$)",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CERFA_DOSSIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)N°[ \t\x{a0}]*Ae-CERFA[ \t\x{a0}]*:[ \t\x{a0}]*(\d[^\n]*?)[ \t\x{a0}]*(?:\n|$)")
        .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PROJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t\x{a0}]*(?:projet|intitulé(?: du projet)?)[ \t\x{a0}]*:[ \t\x{a0}]*(\S[^\n]*?)[ \t\x{a0}]*$",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static FRENCH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?:er)?[ \t\x{a0}]+(janvier|février|fevrier|mars|avril|mai|juin|juillet|août|aout|septembre|octobre|novembre|décembre|decembre)[ \t\x{a0}]+(\d{4})\b|\b(\d{1,2})/(\d{1,2})/(\d{4})\b",
    )
    .expect("valid regex")
});

/// Section of a case-by-case listing, set by the headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Unknown,
    Pending,
    Decided,
}

/// Extract the draft records of a listing page.
///
/// Records whose file URL is already in the run's event data are not
/// returned, and a URL linked more than once on the page is returned once.
pub fn extract_documents(
    page: &Page,
    category: &LocalCategory,
    ctx: &RunContext,
) -> Vec<DocumentItem> {
    let target_year = ctx.config().target_year;
    let drafts = match category {
        LocalCategory::AvisRendus => extract_avis(page, target_year),
        LocalCategory::CasParCas(_) => extract_cas_par_cas(page, category, target_year),
        LocalCategory::Saisines => extract_saisines(page, target_year),
    };

    let mut emitted = HashSet::new();
    drafts
        .into_iter()
        .filter(|item| {
            if ctx.is_seen(&item.source_file_url) {
                tracing::debug!(url = %item.source_file_url, "Already processed, skipping");
                return false;
            }
            if !emitted.insert(item.source_file_url.clone()) {
                tracing::debug!(url = %item.source_file_url, "Linked twice on the page, skipping");
                return false;
            }
            true
        })
        .collect()
}

/// Dossier number of an opinion or referral block.
///
/// # Examples
/// ```
/// use igedd_scraper::extractor::avis_dossier;
///
/// assert_eq!(avis_dossier("N°dossier Ae\u{a0}: 2024-45\n").as_deref(), Some("2024-45"));
/// assert_eq!(avis_dossier("N°: 2024-123\n").as_deref(), Some("2024-123"));
/// assert_eq!(avis_dossier("Sans numéro\n"), None);
/// ```
#[must_use]
pub fn avis_dossier(full_info: &str) -> Option<String> {
    capture(&AVIS_DOSSIER, full_info)
}

/// Dossier number of a case-by-case block, taken from the CERFA reference.
#[must_use]
pub fn cerfa_dossier(full_info: &str) -> Option<String> {
    capture(&CERFA_DOSSIER, full_info)
}

/// Project name from a "Projet :" line of the raw text.
#[must_use]
pub fn project_from_text(full_info: &str) -> Option<String> {
    capture(&PROJECT_LINE, full_info)
}

/// First date written in the text, as "12 juin 2024", "1er juin 2024" or "12/06/2024".
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use igedd_scraper::extractor::first_date;
///
/// assert_eq!(first_date("Reçue le 1er juin 2024"), NaiveDate::from_ymd_opt(2024, 6, 1));
/// assert_eq!(first_date("Reçue le 03/02/2023"), NaiveDate::from_ymd_opt(2023, 2, 3));
/// assert_eq!(first_date("Sans date"), None);
/// ```
#[must_use]
pub fn first_date(text: &str) -> Option<NaiveDate> {
    FRENCH_DATE.captures_iter(text).find_map(|caps| {
        if let (Some(day), Some(month), Some(year)) = (caps.get(1), caps.get(2), caps.get(3)) {
            NaiveDate::from_ymd_opt(
                year.as_str().parse().ok()?,
                month_number(month.as_str())?,
                day.as_str().parse().ok()?,
            )
        } else {
            NaiveDate::from_ymd_opt(
                caps.get(6)?.as_str().parse().ok()?,
                caps.get(5)?.as_str().parse().ok()?,
                caps.get(4)?.as_str().parse().ok()?,
            )
        }
    })
}

fn month_number(name: &str) -> Option<u32> {
    let month = match fold(name).as_str() {
        "janvier" => 1,
        "fevrier" => 2,
        "mars" => 3,
        "avril" => 4,
        "mai" => 5,
        "juin" => 6,
        "juillet" => 7,
        "aout" => 8,
        "septembre" => 9,
        "octobre" => 10,
        "novembre" => 11,
        "decembre" => 12,
        _ => return None,
    };
    Some(month)
}

fn capture(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Build a draft for one file link of a block.
fn draft(
    page: &Page,
    link: ElementRef<'_>,
    category: &LocalCategory,
    target_year: i32,
) -> Option<DocumentItem> {
    let target = href(link)?;
    let url = match page.resolve(target) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(href = target, error = %e, "Unresolvable document link, skipping");
            return None;
        }
    };
    let mut item = DocumentItem::draft(category.clone(), url, page.url());
    item.year = target_year;
    Some(item)
}

fn extract_avis(page: &Page, target_year: i32) -> Vec<DocumentItem> {
    let mut items = Vec::new();
    let mut session: Option<String> = None;

    for element in page.select(&CONTENT_ELEMENTS) {
        if let Some(heading) = find_match(element, &HEADING) {
            session = first_text(heading).map(|t| t.replace("Séance du ", ""));
            continue;
        }
        let Some(block) = find_match(element, &FRAMED_BLOCK) else {
            continue;
        };
        let Some(link) = find_match(block, &DOWNLOAD_LINK) else {
            tracing::debug!(page = page.url(), "Opinion block without download link");
            continue;
        };
        let Some(mut item) = draft(page, link, &LocalCategory::AvisRendus, target_year) else {
            continue;
        };

        let full_info = element_text_without(block, &[NEW_MARKER]);
        item.dossier = avis_dossier(&full_info);
        item.project = first_text(link).or_else(|| project_from_text(&full_info));

        let is_cadrage = item
            .project
            .as_deref()
            .is_some_and(|p| contains_folded(p, "cadrage prealable"));
        let prefix = if is_cadrage { "Cadrage préalable" } else { "Avis" };
        item.title = build_title(prefix, item.dossier.as_deref());
        item.full_info = full_info;

        tracing::debug!(
            title = %item.title,
            session = session.as_deref().unwrap_or(""),
            "Extracted opinion"
        );
        items.push(item);
    }

    items
}

fn extract_cas_par_cas(
    page: &Page,
    category: &LocalCategory,
    target_year: i32,
) -> Vec<DocumentItem> {
    let mut items = Vec::new();
    let mut section = Section::Unknown;

    for element in page.select(&CONTENT_ELEMENTS) {
        if let Some(heading) = find_match(element, &HEADING) {
            let text = element_text(heading);
            if contains_folded(&text, "en cours") {
                section = Section::Pending;
            } else if contains_folded(&text, "decisions prises") {
                section = Section::Decided;
            }
            continue;
        }
        let Some(block) = find_match(element, &FRAMED_BLOCK) else {
            continue;
        };
        if section != Section::Decided {
            tracing::debug!(?section, "Skipping block outside decided section");
            continue;
        }

        let full_info = element_text(block);
        let dossier = cerfa_dossier(&full_info);
        let form_link = find_match(block, &EXTERNAL_LINK);
        let project = form_link
            .and_then(first_text)
            .or_else(|| project_from_text(&full_info));

        let mut links: Vec<(&str, ElementRef<'_>)> = Vec::new();
        for (index, link) in block.select(&DOWNLOAD_LINK).enumerate() {
            if index == 0 {
                links.push(("Décision", link));
            } else if contains_folded(&element_text(link), "recours") {
                links.push(("Recours", link));
            }
        }
        if let Some(link) = form_link {
            links.push(("Formulaire", link));
        }
        if links.is_empty() {
            tracing::debug!(page = page.url(), "Decision block without links");
        }

        for (prefix, link) in links {
            let Some(mut item) = draft(page, link, category, target_year) else {
                continue;
            };
            item.title = build_title(prefix, dossier.as_deref());
            item.dossier = dossier.clone();
            item.project = project.clone();
            item.full_info = full_info.clone();
            items.push(item);
        }
    }

    items
}

fn extract_saisines(page: &Page, target_year: i32) -> Vec<DocumentItem> {
    let mut items = Vec::new();

    for element in page.select(&CONTENT_ELEMENTS) {
        let Some(block) = find_match(element, &FRAMED_BLOCK) else {
            continue;
        };
        let Some(link) = find_match(block, &DOWNLOAD_LINK) else {
            tracing::debug!(page = page.url(), "Referral block without download link");
            continue;
        };

        let full_info = element_text_without(block, &[NEW_MARKER]);
        let Some(date) = first_date(&full_info) else {
            tracing::debug!(page = page.url(), "Referral block without date");
            continue;
        };
        if chrono::Datelike::year(&date) != target_year {
            continue;
        }

        let Some(mut item) = draft(page, link, &LocalCategory::Saisines, target_year) else {
            continue;
        };
        item.dossier = avis_dossier(&full_info);
        item.project = project_from_text(&full_info).or_else(|| first_text(link));
        item.title = build_title("Accusé de reception", item.dossier.as_deref());
        item.full_info = full_info;
        items.push(item);
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::events::{EventData, EventRecord};
    use pretty_assertions::assert_eq;

    const PAGE_URL: &str = "https://www.igedd.developpement-durable.gouv.fr/2024-r708.html";

    fn listing(article: &str) -> Page {
        Page::parse(
            PAGE_URL,
            &format!(
                r#"<html><body><div id="contenu"><div class="contenu-article">
                <div class="texte-article">{article}</div></div></div></body></html>"#
            ),
        )
        .unwrap()
    }

    fn ctx() -> RunContext {
        RunContext::new(RunConfig::new(2024), EventData::new())
    }

    const AVIS: &str = r#"
        <h2>Séance du 12 juin 2024</h2>
        <div><div class="texteencadre-spip"><p><span>NOUVEAU</span>
        N°: 2024-123
        <a class="fr-download__link" href="/IMG/pdf/cadrage_x.pdf">Cadrage préalable du Projet X <span>PDF - 1 Mo</span></a>
        </p></div></div>
        <div><div class="texteencadre-spip"><p>Sans numéro
        <a class="fr-download__link" href="/IMG/pdf/avis_y.pdf">Projet Y</a></p></div></div>
        <div><div class="texteencadre-spip"><p>N°dossier Ae : 2024-7
        pas de lien</p></div></div>"#;

    #[test]
    fn test_extract_avis_cadrage() {
        let items = extract_documents(&listing(AVIS), &LocalCategory::AvisRendus, &ctx());
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title, "Cadrage préalable 2024-123");
        assert_eq!(first.dossier.as_deref(), Some("2024-123"));
        assert_eq!(first.project.as_deref(), Some("Cadrage préalable du Projet X"));
        assert_eq!(
            first.source_file_url,
            "https://www.igedd.developpement-durable.gouv.fr/IMG/pdf/cadrage_x.pdf"
        );
        assert_eq!(first.source_page_url, PAGE_URL);
        assert_eq!(first.year, 2024);
        assert!(!first.full_info.contains(NEW_MARKER));
    }

    #[test]
    fn test_extract_avis_missing_dossier() {
        let items = extract_documents(&listing(AVIS), &LocalCategory::AvisRendus, &ctx());
        let second = &items[1];
        assert_eq!(second.dossier, None);
        assert_eq!(second.title, "Avis ERROR");
    }

    #[test]
    fn test_extract_skips_seen_urls() {
        let mut events = EventData::new();
        events.insert(
            "https://www.igedd.developpement-durable.gouv.fr/IMG/pdf/cadrage_x.pdf".to_string(),
            EventRecord {
                last_seen: "2024-06-13T00:00:00+00:00".to_string(),
                last_modified: "Wed, 12 Jun 2024 10:00:00 GMT".to_string(),
                run_id: None,
            },
        );
        let ctx = RunContext::new(RunConfig::new(2024), events);

        let items = extract_documents(&listing(AVIS), &LocalCategory::AvisRendus, &ctx);
        assert_eq!(items.len(), 1);
        assert!(items[0].source_file_url.ends_with("avis_y.pdf"));
    }

    const CAS_PAR_CAS: &str = r#"
        <h2>Demandes en cours d'examen</h2>
        <div><div class="texteencadre-spip">N° Ae-CERFA : 2024-900
        <a class="fr-download__link" href="/IMG/pdf/pending.pdf">Décision</a></div></div>
        <h2>Les décisions prises</h2>
        <div><div class="texteencadre-spip">N° Ae-CERFA : 2024-1001
        Pétitionnaire ou maître d’ouvrage : SNCF Réseau
        <a class="spip_out" href="https://formulaires.example.org/f1001">Aménagement de la gare</a>
        <a class="fr-download__link" href="/IMG/pdf/decision_1001.pdf">Décision du 3 juin 2024 (*)</a>
        <a class="fr-download__link" href="/IMG/pdf/recours_1001.pdf">Décision sur recours gracieux</a>
        <a class="fr-download__link" href="/IMG/pdf/annexe_1001.pdf">Annexe</a>
        </div></div>
        <div><div class="texteencadre-spip">Référence inconnue
        Projet : Parc éolien
        <a class="fr-download__link" href="/IMG/pdf/decision_x.pdf">Décision</a></div></div>"#;

    #[test]
    fn test_extract_cas_par_cas_links() {
        let category = LocalCategory::CasParCas("Décisions de cas par cas sur des projets".into());
        let items = extract_documents(&listing(CAS_PAR_CAS), &category, &ctx());

        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Décision 2024-1001",
                "Recours 2024-1001",
                "Formulaire 2024-1001",
                "Décision ERROR",
            ]
        );
        assert_eq!(items[0].project.as_deref(), Some("Aménagement de la gare"));
        assert_eq!(items[1].project, items[0].project);
        assert_eq!(items[2].source_file_url, "https://formulaires.example.org/f1001");
        assert_eq!(items[3].project.as_deref(), Some("Parc éolien"));
        assert!(items.iter().all(|i| i.category_local == category));
    }

    const SAISINES: &str = r#"
        <div><div class="texteencadre-spip">Saisine reçue le 1er juin 2024
        N°dossier Ae : 2024-55
        Projet : Ligne nouvelle
        <a class="fr-download__link" href="/IMG/pdf/ar_55.pdf">Accusé de réception</a></div></div>
        <div><div class="texteencadre-spip">Saisine reçue le 12/11/2023
        N°dossier Ae : 2023-80
        <a class="fr-download__link" href="/IMG/pdf/ar_80.pdf">Accusé de réception</a></div></div>
        <div><div class="texteencadre-spip">Sans date
        <a class="fr-download__link" href="/IMG/pdf/ar_x.pdf">Accusé</a></div></div>"#;

    #[test]
    fn test_extract_saisines_filters_year() {
        let items = extract_documents(&listing(SAISINES), &LocalCategory::Saisines, &ctx());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Accusé de reception 2024-55");
        assert_eq!(items[0].project.as_deref(), Some("Ligne nouvelle"));
    }

    #[test]
    fn test_dossier_patterns() {
        assert_eq!(avis_dossier("N°\u{a0}2024-12\nSuite").as_deref(), Some("2024-12"));
        assert_eq!(
            cerfa_dossier("N° Ae-CERFA : 2024-1001 \n").as_deref(),
            Some("2024-1001")
        );
        assert_eq!(cerfa_dossier("N°: 2024-1\n"), None);
    }

    #[test]
    fn test_dossier_on_next_line_is_not_captured() {
        assert_eq!(avis_dossier("N°dossier Ae\u{a0}:\n2024-130\n"), None);
        assert_eq!(cerfa_dossier("N° Ae-CERFA :\n2024-1001\n"), None);

        let page = listing(
            r#"<div><div class="texteencadre-spip"><p>N°dossier Ae&nbsp;:
            2024-130
            <a class="fr-download__link" href="/IMG/pdf/avis_z.pdf">Projet Z</a></p></div></div>"#,
        );
        let items = extract_documents(&page, &LocalCategory::AvisRendus, &ctx());
        assert_eq!(items[0].title, "Avis ERROR");
    }

    #[test]
    fn test_extract_returns_duplicate_link_once() {
        let page = listing(
            r#"<div><div class="texteencadre-spip"><p>N°: 2024-1
            <a class="fr-download__link" href="/IMG/pdf/a.pdf">Projet A</a></p></div></div>
            <div><div class="texteencadre-spip"><p>N°: 2024-2
            <a class="fr-download__link" href="/IMG/pdf/a.pdf">Projet A</a></p></div></div>"#,
        );
        let items = extract_documents(&page, &LocalCategory::AvisRendus, &ctx());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Avis 2024-1");
    }

    #[test]
    fn test_extract_cas_par_cas_form_sharing_decision_url() {
        let page = listing(
            r#"<h2>Les décisions prises</h2>
            <div><div class="texteencadre-spip">N° Ae-CERFA : 2024-1002
            <a class="spip_out" href="/IMG/pdf/decision_1002.pdf">Station d'épuration</a>
            <a class="fr-download__link" href="/IMG/pdf/decision_1002.pdf">Décision</a>
            </div></div>"#,
        );
        let category = LocalCategory::CasParCas("Décisions de cas par cas sur des projets".into());
        let items = extract_documents(&page, &category, &ctx());
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Décision 2024-1002"]);
    }

    #[test]
    fn test_project_from_text() {
        assert_eq!(
            project_from_text("Intitulé du projet : Rocade nord\n").as_deref(),
            Some("Rocade nord")
        );
        assert_eq!(project_from_text("Sans projet"), None);
    }

    #[test]
    fn test_first_date_rejects_invalid_day() {
        assert_eq!(first_date("le 31/02/2024 puis le 2 mars 2024"), NaiveDate::from_ymd_opt(2024, 3, 2));
    }
}
