use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocidentError, Result};
use crate::finders::FinderKind;

/// Pipeline configuration, loaded from `~/.config/docident/config.toml`.
///
/// One instance is shared read-only by every strategy invocation during a
/// run; mutation happens only through [`Config::set`], which validates the
/// setting name against the known set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Drives the log level of the CLI.
    pub verbose: bool,
    /// Confirm candidates against the online registries. When false,
    /// syntactic validation only.
    pub webvalidation: bool,
    /// Allow the web-search strategies to run at all.
    pub websearch: bool,
    /// How many ranked search results each web-search strategy examines.
    pub numb_results_google_search: usize,
    /// Leading-text length for the fingerprint search strategy.
    #[serde(rename = "N_characters_in_pdf")]
    pub n_characters_in_pdf: usize,
    /// Write a discovered identifier back into the document metadata.
    pub save_identifier_metadata: bool,
    /// When an arXiv ID wins and a DOI has since been assigned, report the
    /// DOI instead.
    #[serde(rename = "replace_arxivID_by_DOI_when_available")]
    pub replace_arxiv_id_by_doi_when_available: bool,
    /// Response format requested from doi.org during validation.
    pub method_dxdoiorg: DxDoiOrgMode,
    /// Ordered list of strategies to run.
    pub finders_methods: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: true,
            webvalidation: true,
            websearch: true,
            numb_results_google_search: 6,
            n_characters_in_pdf: 1000,
            save_identifier_metadata: true,
            replace_arxiv_id_by_doi_when_available: true,
            method_dxdoiorg: DxDoiOrgMode::CiteprocJson,
            finders_methods: FinderKind::ALL.iter().map(|k| k.name().to_string()).collect(),
        }
    }
}

/// Accept header sent to doi.org. The citeproc form needs no parsing and is
/// the default; the two bibtex forms exist because downstream tools have
/// historically depended on their author formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DxDoiOrgMode {
    #[default]
    #[serde(rename = "application/citeproc+json")]
    CiteprocJson,
    #[serde(rename = "application/x-bibtex")]
    Bibtex,
    #[serde(rename = "text/bibliography; style=bibtex")]
    StyledBibtex,
}

impl DxDoiOrgMode {
    pub fn accept_header(self) -> &'static str {
        match self {
            DxDoiOrgMode::CiteprocJson => "application/citeproc+json",
            DxDoiOrgMode::Bibtex => "application/x-bibtex",
            DxDoiOrgMode::StyledBibtex => "text/bibliography; style=bibtex",
        }
    }

    pub fn from_accept(value: &str) -> Option<Self> {
        match value.trim() {
            "application/citeproc+json" => Some(DxDoiOrgMode::CiteprocJson),
            "application/x-bibtex" => Some(DxDoiOrgMode::Bibtex),
            "text/bibliography; style=bibtex" => Some(DxDoiOrgMode::StyledBibtex),
            _ => None,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl Config {
    /// Standard config file path: `~/.config/docident/config.toml`.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("DOCIDENT_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("docident")
            .join("config.toml")
    }

    /// Load from disk, falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| DocidentError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str =
            toml::to_string_pretty(self).map_err(|e| DocidentError::Config(e.to_string()))?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.numb_results_google_search < 1 {
            return Err(DocidentError::InvalidSetting {
                name: "numb_results_google_search".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.n_characters_in_pdf < 1 {
            return Err(DocidentError::InvalidSetting {
                name: "N_characters_in_pdf".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        for name in &self.finders_methods {
            FinderKind::from_name(name)?;
        }
        Ok(())
    }

    // ─── Named setter boundary ─────────────────────────────

    /// Set one setting from its string representation. Unknown names are
    /// rejected, as are values that don't parse for the named setting.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "verbose" => self.verbose = parse_bool(name, value)?,
            "webvalidation" => self.webvalidation = parse_bool(name, value)?,
            "websearch" => self.websearch = parse_bool(name, value)?,
            "numb_results_google_search" => {
                self.numb_results_google_search = parse_count(name, value)?
            }
            "N_characters_in_pdf" => self.n_characters_in_pdf = parse_count(name, value)?,
            "save_identifier_metadata" => {
                self.save_identifier_metadata = parse_bool(name, value)?
            }
            "replace_arxivID_by_DOI_when_available" => {
                self.replace_arxiv_id_by_doi_when_available = parse_bool(name, value)?
            }
            "method_dxdoiorg" => {
                self.method_dxdoiorg =
                    DxDoiOrgMode::from_accept(value).ok_or_else(|| {
                        DocidentError::InvalidSetting {
                            name: name.to_string(),
                            reason: format!("unsupported response format {value:?}"),
                        }
                    })?
            }
            "finders_methods" => {
                let methods: Vec<String> = value
                    .split(',')
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect();
                for m in &methods {
                    FinderKind::from_name(m)?;
                }
                self.finders_methods = methods;
            }
            _ => return Err(DocidentError::UnknownSetting(name.to_string())),
        }
        Ok(())
    }

    /// String representation of one setting, for `config get`.
    pub fn get(&self, name: &str) -> Result<String> {
        Ok(match name {
            "verbose" => self.verbose.to_string(),
            "webvalidation" => self.webvalidation.to_string(),
            "websearch" => self.websearch.to_string(),
            "numb_results_google_search" => self.numb_results_google_search.to_string(),
            "N_characters_in_pdf" => self.n_characters_in_pdf.to_string(),
            "save_identifier_metadata" => self.save_identifier_metadata.to_string(),
            "replace_arxivID_by_DOI_when_available" => {
                self.replace_arxiv_id_by_doi_when_available.to_string()
            }
            "method_dxdoiorg" => self.method_dxdoiorg.accept_header().to_string(),
            "finders_methods" => self.finders_methods.join(","),
            _ => return Err(DocidentError::UnknownSetting(name.to_string())),
        })
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(DocidentError::InvalidSetting {
            name: name.to_string(),
            reason: format!("expected a boolean, got {value:?}"),
        }),
    }
}

fn parse_count(name: &str, value: &str) -> Result<usize> {
    let n: usize = value.parse().map_err(|_| DocidentError::InvalidSetting {
        name: name.to_string(),
        reason: format!("expected an integer, got {value:?}"),
    })?;
    if n < 1 {
        return Err(DocidentError::InvalidSetting {
            name: name.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(n)
}
