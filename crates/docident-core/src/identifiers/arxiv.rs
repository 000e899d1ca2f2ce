use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DocidentError, Result};

// Modern format: YYMM.NNNNN with an optional version suffix.
static NEW_FORMAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4}\.\d{4,5})(v(\d+))?$").unwrap());

// Legacy format: category(.subcategory)?/YYMMNNN.
static OLD_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z-]+(?:\.[a-zA-Z-]+)?/\d{7})(v(\d+))?$").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArxivId {
    /// The input as given, before prefix stripping.
    pub raw: String,
    /// The bare identifier without version, e.g. `2301.04567` or
    /// `cond-mat/9901001`.
    pub id: String,
    pub version: Option<u8>,
    /// Legacy-format category, e.g. `cond-mat`.
    pub category: Option<String>,
}

impl ArxivId {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        let stripped = if let Some(s) = input.strip_prefix("https://arxiv.org/abs/") {
            s
        } else if let Some(s) = input.strip_prefix("http://arxiv.org/abs/") {
            s
        } else if let Some(s) = input.strip_prefix("https://arxiv.org/pdf/") {
            s.trim_end_matches(".pdf")
        } else if let Some(s) = input.strip_prefix("http://arxiv.org/pdf/") {
            s.trim_end_matches(".pdf")
        } else if let Some(s) = input
            .strip_prefix("arXiv:")
            .or_else(|| input.strip_prefix("arxiv:"))
        {
            s.trim_start()
        } else {
            input
        };

        if let Some(caps) = NEW_FORMAT.captures(stripped) {
            let id = caps.get(1).unwrap().as_str().to_string();
            let version = caps.get(3).and_then(|v| v.as_str().parse::<u8>().ok());
            return Ok(Self {
                raw: input.to_string(),
                id,
                version,
                category: None,
            });
        }

        if let Some(caps) = OLD_FORMAT.captures(stripped) {
            let id = caps.get(1).unwrap().as_str().to_string();
            let version = caps.get(3).and_then(|v| v.as_str().parse::<u8>().ok());
            let category = id.split('/').next().map(str::to_string);
            return Ok(Self {
                raw: input.to_string(),
                id,
                version,
                category,
            });
        }

        Err(DocidentError::InvalidArxivId(input.to_string()))
    }

    pub fn abs_url(&self) -> String {
        format!("https://arxiv.org/abs/{}", self.id)
    }
}
