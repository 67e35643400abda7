//! Link navigator: walks the category/year hierarchy from the home page to
//! the per-year document listings.
//!
//! Each page kind has its own rules:
//!
//! - [`PageKind::Home`]: one tile per category. "Les saisines" is followed
//!   directly, "Avis rendus" goes to the current year or the archives, the
//!   case-by-case tile links to one page per decision category.
//! - [`PageKind::CurrentOrArchives`]: follow the tile naming the target
//!   year, else the "ARCHIVES" tile.
//! - [`PageKind::YearSelection`]: follow the card for the target year, or
//!   the only card when there is just one.
//! - [`PageKind::Documents`]: handled by the [`extractor`](crate::extractor).

use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use crate::html::{find_match, first_text, has_match, href, Page};
use crate::types::LocalCategory;

/// Title of the home tile grouping the case-by-case decision categories.
const CAS_PAR_CAS_SECTION: &str = "Examen au cas par cas et autres décisions";

/// Text of the archives tile.
const ARCHIVES_LABEL: &str = "ARCHIVES";

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static HOME_SECTIONS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#contenu .liste-rubriques > div").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static SINGLE_SECTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".item-liste-rubriques-seule").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static SECTION_WITH_SUBSECTIONS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".rubrique_avec_sous-rubriques").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static TILE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".fr-tile__link").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static TILE_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".fr-tile__title").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static SUBSECTION_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".lien-sous-rubrique").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static CONTENT_TILE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#contenu .fr-tile__link").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static CONTENT_CARD_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#contenu .fr-card__link").expect("valid selector"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static YEAR_IN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"20\d\d").expect("valid regex"));

/// Kind of page, with the category it belongs to once known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    Home,
    CurrentOrArchives(LocalCategory),
    YearSelection(LocalCategory),
    Documents(LocalCategory),
}

impl PageKind {
    /// Category of the page, `None` for the home page.
    #[must_use]
    pub fn category(&self) -> Option<&LocalCategory> {
        match self {
            Self::Home => None,
            Self::CurrentOrArchives(c) | Self::YearSelection(c) | Self::Documents(c) => Some(c),
        }
    }
}

/// A page to fetch next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub kind: PageKind,
}

impl Request {
    #[must_use]
    pub fn new(url: impl Into<String>, kind: PageKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

/// Compute the links to follow from a navigation page.
///
/// Returns nothing for [`PageKind::Documents`], which the extractor handles.
pub fn navigate(page: &Page, kind: &PageKind, target_year: i32) -> Vec<Request> {
    match kind {
        PageKind::Home => parse_home(page, target_year),
        PageKind::CurrentOrArchives(category) => {
            parse_current_or_archives(page, category, target_year)
        }
        PageKind::YearSelection(category) => parse_year_selection(page, category, target_year),
        PageKind::Documents(_) => Vec::new(),
    }
}

/// Build a request from a link element, skipping links without a usable target.
fn follow(page: &Page, link: scraper::ElementRef<'_>, kind: PageKind) -> Option<Request> {
    let Some(target) = href(link) else {
        tracing::debug!(page = page.url(), "Link without href, skipping");
        return None;
    };
    match page.resolve(target) {
        Ok(url) => {
            tracing::info!(url = %url, kind = ?kind, "Following link");
            Some(Request::new(url, kind))
        }
        Err(e) => {
            tracing::warn!(href = target, error = %e, "Unresolvable link, skipping");
            None
        }
    }
}

fn parse_home(page: &Page, target_year: i32) -> Vec<Request> {
    let mut requests = Vec::new();

    for section in page.select(&HOME_SECTIONS) {
        if has_match(section, &SINGLE_SECTION) {
            let Some(link) = find_match(section, &TILE_LINK) else {
                continue;
            };
            let title = first_text(link).unwrap_or_default();
            if LocalCategory::from_label(&title) == Some(LocalCategory::Saisines) {
                requests.extend(follow(
                    page,
                    link,
                    PageKind::YearSelection(LocalCategory::Saisines),
                ));
            }
        } else if has_match(section, &SECTION_WITH_SUBSECTIONS) {
            let title = find_match(section, &TILE_TITLE)
                .and_then(first_text)
                .unwrap_or_default();
            let subsections: Vec<_> = section.select(&SUBSECTION_LINK).collect();

            if title == LocalCategory::AVIS_RENDUS {
                // First link is the current year, second the archives.
                let (Some(current), Some(archives)) = (subsections.first(), subsections.get(1))
                else {
                    tracing::debug!("Avis rendus tile without current/archives links");
                    continue;
                };
                let current_year = first_text(*current).and_then(|t| t.parse::<i32>().ok());
                let link = if current_year == Some(target_year) {
                    *current
                } else {
                    *archives
                };
                requests.extend(follow(
                    page,
                    link,
                    PageKind::YearSelection(LocalCategory::AvisRendus),
                ));
            } else if title == CAS_PAR_CAS_SECTION {
                for subsection in subsections {
                    let label = first_text(subsection).unwrap_or_default();
                    match LocalCategory::from_label(&label) {
                        Some(category) => requests.extend(follow(
                            page,
                            subsection,
                            PageKind::CurrentOrArchives(category),
                        )),
                        None => tracing::debug!(label = %label, "Unhandled decision category"),
                    }
                }
            }
        }
    }

    requests
}

fn parse_current_or_archives(
    page: &Page,
    category: &LocalCategory,
    target_year: i32,
) -> Vec<Request> {
    let year = target_year.to_string();
    let mut requests = Vec::new();
    let mut archive_link = None;

    for option in page.select(&CONTENT_TILE_LINK) {
        let text = first_text(option).unwrap_or_default();
        if text.contains(&year) {
            requests.extend(follow(
                page,
                option,
                PageKind::YearSelection(category.clone()),
            ));
        } else if text.contains(ARCHIVES_LABEL) {
            archive_link = Some(option);
        }
    }

    if requests.is_empty() {
        match archive_link {
            Some(link) => requests.extend(follow(
                page,
                link,
                PageKind::YearSelection(category.clone()),
            )),
            None => tracing::debug!(page = page.url(), "Neither year nor archives link found"),
        }
    }

    requests
}

fn parse_year_selection(page: &Page, category: &LocalCategory, target_year: i32) -> Vec<Request> {
    let cards: Vec<_> = page.select(&CONTENT_CARD_LINK).collect();

    // The site collapses single-year lists to one card.
    if let [only] = cards.as_slice() {
        return follow(page, *only, PageKind::Documents(category.clone()))
            .into_iter()
            .collect();
    }

    cards
        .into_iter()
        .filter(|card| {
            let text = first_text(*card).unwrap_or_default();
            YEAR_IN_TEXT
                .find(&text)
                .and_then(|m| m.as_str().parse::<i32>().ok())
                == Some(target_year)
        })
        .filter_map(|card| follow(page, card, PageKind::Documents(category.clone())))
        .collect()
}
