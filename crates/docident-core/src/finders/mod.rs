//! Discovery strategies, tried strictly in the configured order. Each
//! strategy inspects one aspect of the document (metadata, text, file name,
//! or web-search results) and hands syntactically valid candidates to the
//! validator; the first confirmed candidate wins the run.

pub mod chars_search;
pub mod filename;
pub mod metadata;
pub mod text;
pub mod title_search;

use tracing::debug;

use crate::error::{DocidentError, Result};
use crate::identifiers::Doi;
use crate::identifiers::Identifier;
use crate::registry::RegistryRecord;
use crate::validate::Validator;

/// The five discovery strategies, in their default order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinderKind {
    DocumentInfos,
    DocumentText,
    Filename,
    TitleGoogle,
    FirstCharsGoogle,
}

impl FinderKind {
    pub const ALL: [FinderKind; 5] = [
        FinderKind::DocumentInfos,
        FinderKind::DocumentText,
        FinderKind::Filename,
        FinderKind::TitleGoogle,
        FinderKind::FirstCharsGoogle,
    ];

    /// Configuration name of the strategy.
    pub fn name(self) -> &'static str {
        match self {
            FinderKind::DocumentInfos => "document_infos",
            FinderKind::DocumentText => "document_text",
            FinderKind::Filename => "filename",
            FinderKind::TitleGoogle => "title_google",
            FinderKind::FirstCharsGoogle => "first_N_characters_google",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| DocidentError::UnknownFinder(name.to_string()))
    }

    /// Whether the strategy needs the web-search provider.
    pub fn needs_websearch(self) -> bool {
        matches!(self, FinderKind::TitleGoogle | FinderKind::FirstCharsGoogle)
    }

    /// Human-readable provenance label, reported alongside a result.
    pub fn source_label(self) -> &'static str {
        match self {
            FinderKind::DocumentInfos => "document info",
            FinderKind::DocumentText => "document text",
            FinderKind::Filename => "file name",
            FinderKind::TitleGoogle => "web search by title",
            FinderKind::FirstCharsGoogle => "web search by document text",
        }
    }
}

impl std::fmt::Display for FinderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A confirmed identifier together with where it came from.
#[derive(Debug, Clone)]
pub struct Found {
    pub identifier: Identifier,
    pub record: Option<RegistryRecord>,
    /// DOI the registry says supersedes an arXiv identifier, if any.
    pub assigned_doi: Option<Doi>,
    pub source: FinderKind,
}

/// Scan free text for candidates, in reading order, deduplicated by
/// canonical form.
pub(crate) fn scan_identifiers(text: &str) -> Vec<Identifier> {
    let mut seen = std::collections::HashSet::new();
    crate::identifiers::extract::scan_candidates(text)
        .iter()
        .filter_map(|candidate| crate::identifiers::extract::normalize(candidate))
        .filter(|identifier| seen.insert(identifier.canonical()))
        .collect()
}

/// Run candidates through the validator in order; the first confirmed one
/// becomes the strategy's result.
pub(crate) async fn confirm_first(
    candidates: &[Identifier],
    validator: &Validator,
    source: FinderKind,
) -> Option<Found> {
    for candidate in candidates {
        debug!(strategy = %source, candidate = %candidate, "checking candidate");
        if let Some(validated) = validator.validate(candidate).await {
            return Some(Found {
                identifier: validated.identifier,
                record: validated.record,
                assigned_doi: validated.assigned_doi,
                source,
            });
        }
    }
    None
}
