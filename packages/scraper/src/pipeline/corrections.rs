//! Manual corrections for documents the extractor persistently misparses.

use std::collections::HashMap;

use crate::context::RunContext;
use crate::error::Result;
use crate::types::DocumentItem;

use super::{Stage, StageOutcome};

/// Field overrides for one document.
#[derive(Debug, Clone, Copy)]
pub struct Correction {
    pub source_file_url: &'static str,
    pub fields: &'static [(&'static str, &'static str)],
}

/// Built-in correction table, keyed by document URL.
pub const CORRECTIONS: &[Correction] = &[
    // 2022
    Correction {
        source_file_url: "https://www.igedd.developpement-durable.gouv.fr/IMG/pdf/avis_ae_-_de_cret_clause_seance-1_cle0c156c.pdf",
        fields: &[(
            "title",
            "Projet de décret relatif à l'évaluation environnementale des projets",
        )],
    },
    Correction {
        source_file_url: "https://webissimo.developpement-durable.gouv.fr/IMG/pdf/formulaire_modification_du_sraddet_auvergne_-_rhone-alpes_cle2d75ec.pdf",
        fields: &[("project", "Modification du SRADDET Auvergne - Rhône-Alpes")],
    },
    Correction {
        source_file_url: "https://www.igedd.developpement-durable.gouv.fr/IMG/pdf/decision_sraddet_aura_cle6b2319.pdf",
        fields: &[("project", "Modification du SRADDET Auvergne - Rhône-Alpes")],
    },
];

/// Overwrites fields verbatim from a correction table.
#[derive(Debug, Clone, Default)]
pub struct ApplyCorrections {
    table: HashMap<String, Vec<(String, String)>>,
}

impl ApplyCorrections {
    /// Stage using the built-in [`CORRECTIONS`] table.
    #[must_use]
    pub fn builtin() -> Self {
        CORRECTIONS.iter().fold(Self::default(), |stage, c| {
            stage.with_entry(c.source_file_url, c.fields.iter().copied())
        })
    }

    /// Add (or extend) the overrides for a document URL.
    #[must_use]
    pub fn with_entry<'a>(
        mut self,
        url: &str,
        fields: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let entry = self.table.entry(url.to_string()).or_default();
        entry.extend(fields.into_iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }

    /// Overrides registered for a URL.
    #[must_use]
    pub fn entry(&self, url: &str) -> Option<&[(String, String)]> {
        self.table.get(url).map(Vec::as_slice)
    }

    /// Apply the overrides for the document's URL, if any.
    pub fn apply(&self, item: &mut DocumentItem) {
        let Some(fields) = self.table.get(&item.source_file_url) else {
            return;
        };
        for (field, value) in fields {
            if item.set_field(field, value) {
                tracing::info!(url = %item.source_file_url, field = field.as_str(), "Applied correction");
            } else {
                tracing::warn!(url = %item.source_file_url, field = field.as_str(), "Correction names an unknown field");
            }
        }
    }
}

impl Stage for ApplyCorrections {
    fn name(&self) -> &'static str {
        "apply_corrections"
    }

    fn process(&self, mut item: DocumentItem, _ctx: &mut RunContext) -> Result<StageOutcome> {
        self.apply(&mut item);
        Ok(StageOutcome::Keep(item))
    }
}
