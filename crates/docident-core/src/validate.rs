//! Registry confirmation of candidate identifiers.
//!
//! Validation is fail-closed: a candidate is confirmed only by a positive
//! registry answer. Network failures, timeouts, and registry errors all
//! leave the candidate unconfirmed.

use tracing::{debug, warn};

use crate::config::Config;
use crate::identifiers::{Doi, Identifier};
use crate::registry::arxiv::ArxivClient;
use crate::registry::doi_org::DoiOrgClient;
use crate::registry::RegistryRecord;

/// A candidate the validator has accepted, with whatever the registry told
/// us about it.
#[derive(Debug, Clone)]
pub struct Validated {
    pub identifier: Identifier,
    /// Present only when the registry was consulted and answered.
    pub record: Option<RegistryRecord>,
    /// For arXiv entries: the DOI the registry says has since been
    /// assigned, when there is one.
    pub assigned_doi: Option<Doi>,
}

/// Confirms candidates against doi.org and the arXiv API according to the
/// configuration.
pub struct Validator {
    config: Config,
    doi_org: DoiOrgClient,
    arxiv: ArxivClient,
}

impl Validator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            doi_org: DoiOrgClient::new(),
            arxiv: ArxivClient::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_clients(config: Config, doi_org: DoiOrgClient, arxiv: ArxivClient) -> Self {
        Self {
            config,
            doi_org,
            arxiv,
        }
    }

    /// Confirm one syntactically valid candidate. With web validation off,
    /// every candidate passes without a registry record.
    pub async fn validate(&self, candidate: &Identifier) -> Option<Validated> {
        if !self.config.webvalidation {
            return Some(Validated {
                identifier: candidate.clone(),
                record: None,
                assigned_doi: None,
            });
        }

        match candidate {
            Identifier::Doi(doi) => {
                match self.doi_org.lookup(doi, self.config.method_dxdoiorg).await {
                    Ok(Some(record)) => {
                        debug!(doi = %doi.normalized, "doi.org confirmed candidate");
                        Some(Validated {
                            identifier: candidate.clone(),
                            record: Some(record),
                            assigned_doi: None,
                        })
                    }
                    Ok(None) => {
                        debug!(doi = %doi.normalized, "doi.org does not know this DOI");
                        None
                    }
                    Err(err) => {
                        warn!(doi = %doi.normalized, error = %err, "doi.org validation failed, treating candidate as unconfirmed");
                        None
                    }
                }
            }
            Identifier::Arxiv(arxiv_id) => match self.arxiv.fetch(arxiv_id).await {
                Ok(Some(record)) => {
                    debug!(arxiv = %arxiv_id.id, "arXiv API confirmed candidate");
                    let assigned_doi = record.doi.clone();
                    Some(Validated {
                        identifier: candidate.clone(),
                        record: Some(record.to_registry_record()),
                        assigned_doi,
                    })
                }
                Ok(None) => {
                    debug!(arxiv = %arxiv_id.id, "arXiv API does not know this ID");
                    None
                }
                Err(err) => {
                    warn!(arxiv = %arxiv_id.id, error = %err, "arXiv validation failed, treating candidate as unconfirmed");
                    None
                }
            },
        }
    }
}
