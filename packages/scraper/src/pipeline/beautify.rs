//! Beautification of titles and project names.

use crate::context::RunContext;
use crate::error::Result;
use crate::text::{capitalize, normalize_punctuation};
use crate::types::DocumentItem;

use super::{Stage, StageOutcome};

/// Boilerplate the site puts in front of project names.
const PROJECT_PREFIXES: &[&str] = &[
    "Absence de nécessité de réaliser une évaluation environnementale de la ",
    "Cadrage préalable du ",
];

/// Normalize punctuation, trim, and strip trailing periods and commas.
///
/// # Examples
/// ```
/// use igedd_scraper::pipeline::beautify_text;
///
/// assert_eq!(beautify_text("  Avis\u{a0}2024-12 ,"), "Avis 2024-12");
/// ```
#[must_use]
pub fn beautify_text(text: &str) -> String {
    normalize_punctuation(text)
        .trim()
        .trim_end_matches(['.', ','])
        .trim_end()
        .to_string()
}

/// Beautify a project name: clean it, remove boilerplate prefixes and capitalize.
///
/// # Examples
/// ```
/// use igedd_scraper::pipeline::beautify_project;
///
/// assert_eq!(beautify_project("Cadrage préalable du Projet X"), "Projet x");
/// ```
#[must_use]
pub fn beautify_project(project: &str) -> String {
    let mut project = beautify_text(project);
    for prefix in PROJECT_PREFIXES {
        if let Some(rest) = project.strip_prefix(prefix) {
            project = rest.trim().to_string();
        }
    }
    capitalize(&project)
}

/// Cleans `title` and `project`.
pub struct Beautify;

impl Stage for Beautify {
    fn name(&self) -> &'static str {
        "beautify"
    }

    fn process(&self, mut item: DocumentItem, _ctx: &mut RunContext) -> Result<StageOutcome> {
        item.title = beautify_text(&item.title);
        item.project = item
            .project
            .as_deref()
            .map(beautify_project)
            .filter(|p| !p.is_empty());
        Ok(StageOutcome::Keep(item))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{context, item, kept};
    use super::*;

    #[test]
    fn test_beautify_text_punctuation() {
        assert_eq!(
            beautify_text("Projet d\u{2019}aménagement du port."),
            "Projet d'aménagement du port"
        );
        assert_eq!(beautify_text("Avis 2024-1..."), "Avis 2024-1");
    }

    #[test]
    fn test_beautify_project_prefixes() {
        assert_eq!(
            beautify_project(
                "Absence de nécessité de réaliser une évaluation environnementale de la modification du PLU"
            ),
            "Modification du plu"
        );
        assert_eq!(beautify_project("  projet éolien  "), "Projet éolien");
    }

    #[test]
    fn test_stage_clears_blank_project() {
        let mut ctx = context();
        let mut doc = item();
        doc.project = Some(" . ".to_string());
        let done = kept(Beautify.process(doc, &mut ctx).unwrap());
        assert_eq!(done.project, None);
    }
}
