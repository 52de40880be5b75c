//! Voice Catalog Module
//!
//! Upstream data source for the voiceover listing endpoint. The cache never
//! looks inside these records; it stores whatever JSON the listing produces.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::VoiceoverQuery;

/// A bookable voice-over artist as exposed by the public API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voiceover {
    pub id: String,
    pub name: String,
    pub slug: String,
    /// Talent group, e.g. `commercial` or `narration`
    pub group: String,
    pub languages: Vec<String>,
    pub available: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Source of voiceover records.
pub trait VoiceCatalog: Send + Sync {
    fn list(&self, query: &VoiceoverQuery) -> Result<Vec<Voiceover>, CatalogError>;
}

// == In-Memory Catalog ==
/// Fixed roster held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    voiceovers: Vec<Voiceover>,
}

impl InMemoryCatalog {
    pub fn new(voiceovers: Vec<Voiceover>) -> Self {
        Self { voiceovers }
    }

    /// Catalog pre-filled with the default roster.
    pub fn seeded() -> Self {
        let roster = [
            ("vo-001", "Anna de Vries", "commercial", &["nl", "en"][..], true),
            ("vo-002", "Bram Jansen", "narration", &["nl"][..], true),
            ("vo-003", "Chloe Martin", "commercial", &["fr", "en"][..], false),
            ("vo-004", "Daan Peeters", "character", &["nl", "de"][..], true),
            ("vo-005", "Eva Schmidt", "narration", &["de", "en"][..], true),
            ("vo-006", "Finn O'Brien", "character", &["en"][..], true),
        ];

        let voiceovers = roster
            .iter()
            .map(|(id, name, group, languages, available)| Voiceover {
                id: id.to_string(),
                name: name.to_string(),
                slug: slugify(name),
                group: group.to_string(),
                languages: languages.iter().map(|l| l.to_string()).collect(),
                available: *available,
            })
            .collect();

        Self::new(voiceovers)
    }
}

impl VoiceCatalog for InMemoryCatalog {
    fn list(&self, query: &VoiceoverQuery) -> Result<Vec<Voiceover>, CatalogError> {
        let group = query.group.as_deref().map(str::trim);

        Ok(self
            .voiceovers
            .iter()
            .filter(|vo| group.map_or(true, |g| vo.group.eq_ignore_ascii_case(g)))
            .take(query.effective_limit())
            .cloned()
            .collect())
    }
}

fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
