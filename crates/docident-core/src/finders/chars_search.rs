//! Strategy `first_N_characters_google`: use the leading text of the
//! document as a verbatim search query. A last resort that works
//! surprisingly often, since abstracts are heavily indexed.

use tracing::debug;

use crate::config::Config;
use crate::document::PdfDocument;
use crate::finders::{Found, FinderKind, confirm_first, scan_identifiers};
use crate::search::SearchProvider;
use crate::validate::Validator;

pub async fn find(
    document: &PdfDocument,
    validator: &Validator,
    search: &dyn SearchProvider,
    config: &Config,
) -> Option<Found> {
    let query = match document.leading_text(config.n_characters_in_pdf) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => return None,
        Err(err) => {
            debug!(path = %document.path().display(), error = %err, "text extraction failed");
            return None;
        }
    };
    debug!(chars = query.len(), "searching by leading document text");

    let hits = match search.search(&query, config.numb_results_google_search).await {
        Ok(hits) => hits,
        Err(err) => {
            debug!(error = %err, "leading-text search failed");
            return None;
        }
    };

    let mut candidates = Vec::new();
    for hit in &hits {
        for id in scan_identifiers(&hit.scannable_text()) {
            if !candidates.contains(&id) {
                candidates.push(id);
            }
        }
    }
    confirm_first(&candidates, validator, FinderKind::FirstCharsGoogle).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::pdf_fixtures::write_pdf;
    use crate::error::Result;
    use crate::search::SearchHit;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct RecordingSearch {
        hits: Vec<SearchHit>,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SearchProvider for RecordingSearch {
        async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.hits.iter().take(max_results).cloned().collect())
        }
    }

    fn offline_validator() -> Validator {
        let mut config = Config::default();
        config.webvalidation = false;
        Validator::new(config)
    }

    #[tokio::test]
    async fn queries_with_truncated_leading_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(&path, "alpha beta gamma delta epsilon zeta", &[]);
        let document = PdfDocument::load(&path).unwrap();

        let search = RecordingSearch {
            hits: vec![SearchHit {
                url: "https://dx.doi.org/10.1000/abstract.match".to_string(),
                title: String::new(),
                snippet: String::new(),
            }],
            queries: Mutex::new(Vec::new()),
        };

        let mut config = Config::default();
        config.n_characters_in_pdf = 10;
        let found = find(&document, &offline_validator(), &search, &config)
            .await
            .unwrap();
        assert_eq!(found.identifier.canonical(), "10.1000/abstract.match");
        assert_eq!(found.source, FinderKind::FirstCharsGoogle);

        let queries = search.queries.lock().unwrap();
        assert_eq!(queries.as_slice(), ["alpha beta"]);
    }

    #[tokio::test]
    async fn empty_document_yields_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(&path, " ", &[]);
        let document = PdfDocument::load(&path).unwrap();

        let search = RecordingSearch {
            hits: vec![],
            queries: Mutex::new(Vec::new()),
        };
        assert!(
            find(&document, &offline_validator(), &search, &Config::default())
                .await
                .is_none()
        );
        assert!(search.queries.lock().unwrap().is_empty());
    }
}
