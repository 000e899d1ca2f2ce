//! Online registry lookups used to confirm identifier candidates.

pub mod arxiv;
pub mod doi_org;

use serde::{Deserialize, Serialize};

pub use arxiv::{ArxivClient, ArxivRecord};
pub use doi_org::DoiOrgClient;

/// Bibliographic fields returned by a successful registry lookup.
///
/// Attached to the pipeline result for downstream consumers (e.g. a renaming
/// tool); never required for validation itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegistryRecord {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub journal: Option<String>,
    pub year: Option<i32>,
    /// The raw registry payload (citeproc JSON, bibtex, or Atom-derived).
    pub raw: String,
}
