//! Identifier grammar: DOI and arXiv ID parsing and candidate extraction.

pub mod arxiv;
pub mod doi;
pub mod extract;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use arxiv::ArxivId;
pub use doi::Doi;
pub use extract::{normalize, normalize_hinted, scan_candidates};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Doi,
    Arxiv,
}

impl IdentifierKind {
    /// Label used when reporting the result, e.g. on the CLI.
    pub fn label(self) -> &'static str {
        match self {
            IdentifierKind::Doi => "DOI",
            IdentifierKind::Arxiv => "arXiv",
        }
    }
}

/// A validated bibliographic identifier in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Identifier {
    Doi(Doi),
    Arxiv(ArxivId),
}

impl Identifier {
    pub fn kind(&self) -> IdentifierKind {
        match self {
            Identifier::Doi(_) => IdentifierKind::Doi,
            Identifier::Arxiv(_) => IdentifierKind::Arxiv,
        }
    }

    /// Canonical lowercase form: `10.xxxx/suffix` for DOIs,
    /// `arxiv:<id>` for arXiv IDs.
    pub fn canonical(&self) -> String {
        match self {
            Identifier::Doi(doi) => doi.normalized.clone(),
            Identifier::Arxiv(id) => format!("arxiv:{}", id.id.to_lowercase()),
        }
    }

    pub fn url(&self) -> String {
        match self {
            Identifier::Doi(doi) => format!("https://doi.org/{}", doi.normalized),
            Identifier::Arxiv(id) => id.abs_url(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}
