//! DOI resolution via doi.org content negotiation.
//!
//! A registered DOI answers with bibliographic data in the format selected
//! by the Accept header; an unregistered one answers 404. Which format we
//! ask for is the `method_dxdoiorg` setting.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::config::DxDoiOrgMode;
use crate::error::Result;
use crate::http::RateLimitedClient;
use crate::identifiers::Doi;
use crate::registry::RegistryRecord;

pub struct DoiOrgClient {
    client: RateLimitedClient,
    base_url: String,
}

impl DoiOrgClient {
    pub fn new() -> Self {
        Self::with_params("https://doi.org", Duration::from_millis(100))
    }

    pub fn with_params(base_url: &str, min_interval: Duration) -> Self {
        Self {
            client: RateLimitedClient::new(min_interval, 1, "docident/0.1"),
            base_url: base_url.to_string(),
        }
    }

    /// Look a DOI up in the registry. `Ok(Some(record))` means confirmed,
    /// `Ok(None)` means the registry definitively does not know the DOI.
    /// Transport failures and server errors bubble up as `Err`; the caller
    /// treats those as unconfirmed.
    pub async fn lookup(&self, doi: &Doi, mode: DxDoiOrgMode) -> Result<Option<RegistryRecord>> {
        let url = format!("{}/{}", self.base_url, doi.normalized);
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(mode.accept_header()));

        let (status, body) = self.client.get_with_status(&url, headers).await?;
        if !(200..300).contains(&status) {
            debug!(doi = %doi.normalized, status, "doi.org lookup did not confirm");
            return Ok(None);
        }

        let record = match mode {
            DxDoiOrgMode::CiteprocJson => parse_citeproc(&body),
            DxDoiOrgMode::Bibtex | DxDoiOrgMode::StyledBibtex => parse_bibtex(&body),
        };
        Ok(Some(record))
    }
}

impl Default for DoiOrgClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_citeproc(body: &str) -> RegistryRecord {
    let Ok(val) = serde_json::from_str::<Value>(body) else {
        // Confirmed by the registry even if the payload is not the JSON we
        // expected; descriptive fields are best-effort.
        return RegistryRecord {
            raw: body.to_string(),
            ..Default::default()
        };
    };

    let title = val["title"].as_str().map(str::to_string);
    let authors = val["author"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|a| {
                    let family = a["family"].as_str();
                    let given = a["given"].as_str();
                    match (family, given) {
                        (Some(f), Some(g)) => Some(format!("{f}, {g}")),
                        (Some(f), None) => Some(f.to_string()),
                        (None, Some(g)) => Some(g.to_string()),
                        (None, None) => a["name"].as_str().map(str::to_string),
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    let journal = val["container-title"].as_str().map(str::to_string);
    let year = val["issued"]["date-parts"][0][0]
        .as_i64()
        .or_else(|| val["published-print"]["date-parts"][0][0].as_i64())
        .map(|n| n as i32);

    RegistryRecord {
        title,
        authors,
        journal,
        year,
        raw: body.to_string(),
    }
}

static BIBTEX_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*(\w+)\s*=\s*[{"](.+?)[}"],?\s*$"#).unwrap());

fn parse_bibtex(body: &str) -> RegistryRecord {
    let mut record = RegistryRecord {
        raw: body.to_string(),
        ..Default::default()
    };
    for caps in BIBTEX_FIELD.captures_iter(body) {
        let value = caps[2].trim();
        match caps[1].to_lowercase().as_str() {
            "title" => record.title = Some(value.to_string()),
            "author" => {
                record.authors = value.split(" and ").map(|a| a.trim().to_string()).collect()
            }
            "journal" => record.journal = Some(value.to_string()),
            "year" => record.year = value.parse().ok(),
            _ => {}
        }
    }
    record
}
