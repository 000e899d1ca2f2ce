use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DocidentError, Result};

// Full-string DOI grammar: registrant code of 4-9 digits, then a suffix from
// the character set actually seen in registered DOIs.
static DOI_FULL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^10\.\d{4,9}/[-._;()/:a-z0-9]+$").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doi {
    /// The input as given, before prefix stripping.
    pub raw: String,
    /// Canonical lowercase form, e.g. `10.1103/physrev.47.777`.
    pub normalized: String,
}

impl Doi {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        let stripped = if let Some(s) = input.strip_prefix("https://doi.org/") {
            s
        } else if let Some(s) = input.strip_prefix("http://doi.org/") {
            s
        } else if let Some(s) = input.strip_prefix("https://dx.doi.org/") {
            s
        } else if let Some(s) = input.strip_prefix("http://dx.doi.org/") {
            s
        } else if let Some(s) = input.strip_prefix("doi:").or_else(|| input.strip_prefix("DOI:")) {
            s.trim_start()
        } else {
            input
        };

        // Trailing sentence punctuation is never part of a DOI suffix.
        let stripped = stripped.trim_end_matches(['.', ',', ';', ':']);

        if !DOI_FULL.is_match(stripped) {
            return Err(DocidentError::InvalidDoi(input.to_string()));
        }

        Ok(Self {
            raw: input.to_string(),
            normalized: stripped.to_lowercase(),
        })
    }
}
