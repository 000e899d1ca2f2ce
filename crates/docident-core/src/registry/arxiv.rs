//! arXiv listing lookups via the export.arxiv.org Atom API.
//!
//! Confirms that an arXiv ID exists and reports the DOI the entry carries
//! once the paper is published — the pipeline uses that for the
//! arXiv-to-DOI substitution.

use std::time::Duration;

use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::{DocidentError, Result};
use crate::http::RateLimitedClient;
use crate::identifiers::{ArxivId, Doi};
use crate::registry::RegistryRecord;

pub struct ArxivClient {
    client: RateLimitedClient,
    base_url: String,
}

/// One Atom entry, reduced to the fields the pipeline cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct ArxivRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub doi: Option<Doi>,
    pub journal_ref: Option<String>,
    pub published_year: Option<i32>,
}

impl ArxivClient {
    pub fn new() -> Self {
        // arXiv asks for no more than one request every three seconds.
        Self::with_params("http://export.arxiv.org/api/query", Duration::from_secs(3))
    }

    pub fn with_params(base_url: &str, min_interval: Duration) -> Self {
        Self {
            client: RateLimitedClient::new(min_interval, 1, "docident/0.1"),
            base_url: base_url.to_string(),
        }
    }

    /// Fetch the listing for one ID. `Ok(None)` when arXiv does not know it.
    pub async fn fetch(&self, id: &ArxivId) -> Result<Option<ArxivRecord>> {
        let url = if self.base_url.contains('?') {
            format!("{}&id_list={}", self.base_url, id.id)
        } else {
            format!("{}?id_list={}", self.base_url, id.id)
        };
        let xml = self.client.get(&url).await?;
        let mut records = parse_atom_response(&xml)?;
        if records.is_empty() {
            return Ok(None);
        }
        Ok(Some(records.remove(0)))
    }
}

impl Default for ArxivClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ArxivRecord {
    pub fn to_registry_record(&self) -> RegistryRecord {
        RegistryRecord {
            title: Some(self.title.clone()),
            authors: self.authors.clone(),
            journal: self.journal_ref.clone(),
            year: self.published_year,
            raw: String::new(),
        }
    }
}

// ─── Atom deserialization ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: String,
    title: String,
    #[serde(default)]
    published: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
    #[serde(rename = "arxiv:doi", alias = "doi")]
    doi: Option<String>,
    #[serde(rename = "arxiv:journal_ref", alias = "journal_ref")]
    journal_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    name: String,
}

fn parse_atom_response(xml: &str) -> Result<Vec<ArxivRecord>> {
    let feed: AtomFeed =
        from_str(xml).map_err(|e| DocidentError::Parse(format!("invalid atom xml: {e}")))?;

    Ok(feed
        .entries
        .into_iter()
        // Unknown IDs come back as a pseudo-entry pointing at the error page.
        .filter(|entry| !entry.id.trim().is_empty() && !entry.id.contains("api/errors"))
        .map(|entry| {
            let published_year = entry
                .published
                .as_deref()
                .and_then(|p| p.get(..4))
                .and_then(|y| y.parse().ok());
            ArxivRecord {
                title: clean_text(&entry.title),
                authors: entry
                    .authors
                    .into_iter()
                    .map(|a| clean_text(&a.name))
                    .collect(),
                doi: entry.doi.and_then(|d| Doi::parse(d.trim()).ok()),
                journal_ref: entry.journal_ref.map(|j| clean_text(&j)),
                published_year,
            }
        })
        .collect())
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
