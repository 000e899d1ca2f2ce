//! The discovery pipeline: run the configured strategies in order against
//! one document, stop at the first confirmed identifier, and optionally
//! store it back into the document metadata.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::document::PdfDocument;
use crate::error::Result;
use crate::finders::{self, FinderKind, Found};
use crate::identifiers::{ArxivId, Identifier, IdentifierKind};
use crate::registry::RegistryRecord;
use crate::search::{DuckDuckGoSearch, SearchProvider};
use crate::validate::Validator;
use crate::writer;

/// Outcome of one pipeline run. `identifier` is `None` when every strategy
/// came up empty; that is a normal result, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct FindResult {
    pub identifier: Option<Identifier>,
    /// Strategy that produced the identifier, by its config name.
    pub source: Option<String>,
    /// The same strategy described for humans, e.g. "document text".
    pub source_description: Option<String>,
    pub record: Option<RegistryRecord>,
    /// Set when an arXiv identifier was replaced by its assigned DOI.
    pub superseded_arxiv: Option<ArxivId>,
    /// Whether the identifier was written back into the document.
    pub metadata_written: bool,
    /// The document's embedded metadata, as read before any write-back.
    pub metadata: Vec<(String, String)>,
}

impl FindResult {
    fn not_found(metadata: Vec<(String, String)>) -> Self {
        Self {
            identifier: None,
            source: None,
            source_description: None,
            record: None,
            superseded_arxiv: None,
            metadata_written: false,
            metadata,
        }
    }

    pub fn kind(&self) -> Option<IdentifierKind> {
        self.identifier.as_ref().map(Identifier::kind)
    }

    /// One-line report: `DOI 10.1000/xyz` or `arXiv 2101.00001`.
    pub fn summary(&self) -> Option<String> {
        self.identifier.as_ref().map(|id| match id {
            Identifier::Doi(doi) => format!("DOI {}", doi.normalized),
            Identifier::Arxiv(arxiv) => format!("arXiv {}", arxiv.id.to_lowercase()),
        })
    }
}

/// Drives the strategies against documents. One instance can process many
/// files; the registry clients' rate limiting is shared across them.
pub struct IdentifierFinder {
    config: Config,
    validator: Validator,
    search: Box<dyn SearchProvider>,
}

impl IdentifierFinder {
    pub fn new(config: Config) -> Self {
        Self {
            validator: Validator::new(config.clone()),
            search: Box::new(DuckDuckGoSearch::new()),
            config,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_parts(
        config: Config,
        validator: Validator,
        search: Box<dyn SearchProvider>,
    ) -> Self {
        Self {
            config,
            validator,
            search,
        }
    }

    /// Run the pipeline against one PDF.
    pub async fn find(&self, path: &Path) -> Result<FindResult> {
        let document = PdfDocument::load(path)?;
        let metadata = document.metadata().to_vec();

        for name in &self.config.finders_methods {
            let kind = FinderKind::from_name(name)?;
            if kind.needs_websearch() && !self.config.websearch {
                debug!(strategy = %kind, "web search disabled, skipping");
                continue;
            }
            debug!(strategy = %kind, path = %path.display(), "running strategy");

            let found = match kind {
                FinderKind::DocumentInfos => {
                    finders::metadata::find(&document, &self.validator).await
                }
                FinderKind::DocumentText => {
                    finders::text::find(&document, &self.validator).await
                }
                FinderKind::Filename => {
                    finders::filename::find(&document, &self.validator).await
                }
                FinderKind::TitleGoogle => {
                    finders::title_search::find(
                        &document,
                        &self.validator,
                        self.search.as_ref(),
                        &self.config,
                    )
                    .await
                }
                FinderKind::FirstCharsGoogle => {
                    finders::chars_search::find(
                        &document,
                        &self.validator,
                        self.search.as_ref(),
                        &self.config,
                    )
                    .await
                }
            };

            if let Some(found) = found {
                return Ok(self.finish(path, found, metadata));
            }
        }

        info!(path = %path.display(), "no identifier found");
        Ok(FindResult::not_found(metadata))
    }

    fn finish(&self, path: &Path, found: Found, metadata: Vec<(String, String)>) -> FindResult {
        let Found {
            identifier,
            record,
            assigned_doi,
            source,
        } = found;

        // Prefer the published DOI over the preprint ID once one exists.
        let (identifier, superseded_arxiv) = match (identifier, assigned_doi) {
            (Identifier::Arxiv(arxiv), Some(doi))
                if self.config.replace_arxiv_id_by_doi_when_available =>
            {
                debug!(arxiv = %arxiv.id, doi = %doi.normalized, "replacing arXiv ID with assigned DOI");
                (Identifier::Doi(doi), Some(arxiv))
            }
            (identifier, _) => (identifier, None),
        };

        info!(
            identifier = %identifier.canonical(),
            source = source.source_label(),
            "identifier found"
        );

        // Strategies that already read it from the metadata have nothing to
        // write back.
        let mut metadata_written = false;
        if self.config.save_identifier_metadata && source != FinderKind::DocumentInfos {
            match writer::write_identifier(path, &identifier) {
                Ok(written) => metadata_written = written,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to store identifier in document");
                }
            }
        }

        FindResult {
            identifier: Some(identifier),
            source: Some(source.name().to_string()),
            source_description: Some(source.source_label().to_string()),
            record,
            superseded_arxiv,
            metadata_written,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::pdf_fixtures::write_pdf;
    use crate::error::Result;
    use crate::registry::{ArxivClient, DoiOrgClient};
    use crate::search::SearchHit;
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;

    struct NoSearch;

    #[async_trait]
    impl SearchProvider for NoSearch {
        async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
            Ok(Vec::new())
        }
    }

    fn offline_finder(mut config: Config) -> IdentifierFinder {
        config.webvalidation = false;
        IdentifierFinder::with_parts(
            config.clone(),
            Validator::new(config),
            Box::new(NoSearch),
        )
    }

    #[tokio::test]
    async fn metadata_strategy_wins_without_write_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(&path, "body", &[("doi", "10.1000/from.metadata")]);

        let result = offline_finder(Config::default()).find(&path).await.unwrap();
        assert_eq!(result.summary().unwrap(), "DOI 10.1000/from.metadata");
        assert_eq!(result.source.as_deref(), Some("document_infos"));
        assert_eq!(result.source_description.as_deref(), Some("document info"));
        assert!(!result.metadata_written);
        assert!(result
            .metadata
            .iter()
            .any(|(k, v)| k == "doi" && v == "10.1000/from.metadata"));
    }

    #[tokio::test]
    async fn text_result_is_written_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(&path, "see doi:10.1000/in.the.text for details", &[]);

        let result = offline_finder(Config::default()).find(&path).await.unwrap();
        assert_eq!(result.summary().unwrap(), "DOI 10.1000/in.the.text");
        assert_eq!(result.source.as_deref(), Some("document_text"));
        assert_eq!(result.source_description.as_deref(), Some("document text"));
        assert!(result.metadata_written);

        // Next run short-circuits on the stored entry.
        let again = offline_finder(Config::default()).find(&path).await.unwrap();
        assert_eq!(again.source.as_deref(), Some("document_infos"));
        assert_eq!(again.summary().unwrap(), "DOI 10.1000/in.the.text");
    }

    #[tokio::test]
    async fn write_back_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(&path, "doi:10.1000/no.write", &[]);

        let mut config = Config::default();
        config.save_identifier_metadata = false;
        let result = offline_finder(config).find(&path).await.unwrap();
        assert!(result.identifier.is_some());
        assert!(!result.metadata_written);

        let doc = PdfDocument::load(&path).unwrap();
        assert_eq!(doc.metadata_value(writer::IDENTIFIER_KEY), None);
    }

    #[tokio::test]
    async fn strategy_order_is_respected() {
        let dir = TempDir::new().unwrap();
        // Both the name and the text carry an identifier; reordering the
        // strategies changes which one wins.
        let path = dir.path().join("2101.00001.pdf");
        write_pdf(&path, "doi:10.1000/text.doi", &[]);

        let mut config = Config::default();
        config.finders_methods = vec!["filename".to_string(), "document_text".to_string()];
        config.save_identifier_metadata = false;
        let result = offline_finder(config).find(&path).await.unwrap();
        assert_eq!(result.source.as_deref(), Some("filename"));
        assert_eq!(result.summary().unwrap(), "arXiv 2101.00001");
    }

    #[tokio::test]
    async fn nothing_found_is_a_normal_result() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.pdf");
        write_pdf(&path, "nothing identifying here", &[]);

        let mut config = Config::default();
        config.websearch = false;
        let result = offline_finder(config).find(&path).await.unwrap();
        assert!(result.identifier.is_none());
        assert!(result.summary().is_none());
        assert!(result.source.is_none());
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let finder = offline_finder(Config::default());
        assert!(finder.find(Path::new("/nonexistent/x.pdf")).await.is_err());
    }

    #[tokio::test]
    async fn arxiv_id_replaced_by_assigned_doi() {
        let mut server = mockito::Server::new_async().await;
        let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <entry>
    <id>http://arxiv.org/abs/2101.00001v1</id>
    <title>Now Published</title>
    <published>2021-01-01T00:00:00Z</published>
    <author><name>Jane Doe</name></author>
    <arxiv:doi>10.1103/PhysRevX.11.000001</arxiv:doi>
  </entry>
</feed>"#;
        let _mock = server
            .mock("GET", "/api/query")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(feed)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("2101.00001.pdf");
        write_pdf(&path, "preprint body", &[]);

        let mut config = Config::default();
        config.save_identifier_metadata = false;
        config.finders_methods = vec!["filename".to_string()];
        let validator = Validator::with_clients(
            config.clone(),
            DoiOrgClient::with_params(&server.url(), Duration::from_secs(0)),
            ArxivClient::with_params(
                &format!("{}/api/query", server.url()),
                Duration::from_secs(0),
            ),
        );
        let finder = IdentifierFinder::with_parts(config, validator, Box::new(NoSearch));

        let result = finder.find(&path).await.unwrap();
        assert_eq!(result.summary().unwrap(), "DOI 10.1103/physrevx.11.000001");
        assert_eq!(
            result.superseded_arxiv.as_ref().map(|a| a.id.as_str()),
            Some("2101.00001")
        );
    }
}
