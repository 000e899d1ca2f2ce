//! Strategy `title_google`: search the web for the document title and scan
//! the top hits for identifiers.
//!
//! The title comes from the Info dictionary when it looks like a real
//! title; otherwise the first substantial line of page one is used as a
//! guess.

use tracing::debug;

use crate::config::Config;
use crate::document::PdfDocument;
use crate::finders::{Found, FinderKind, confirm_first, scan_identifiers};
use crate::search::SearchProvider;
use crate::validate::Validator;

/// Shortest string worth searching for.
const MIN_TITLE_LEN: usize = 10;

pub async fn find(
    document: &PdfDocument,
    validator: &Validator,
    search: &dyn SearchProvider,
    config: &Config,
) -> Option<Found> {
    let title = guess_title(document)?;
    debug!(title, "searching by document title");

    let query = format!("\"{title}\" doi");
    let hits = match search.search(&query, config.numb_results_google_search).await {
        Ok(hits) => hits,
        Err(err) => {
            debug!(error = %err, "title search failed");
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
    confirm_first(&candidates, validator, FinderKind::TitleGoogle).await
}

/// Info /Title when it reads like a title, else the first long-enough line
/// of the extracted text.
fn guess_title(document: &PdfDocument) -> Option<String> {
    if let Some(title) = document.metadata_value("Title") {
        let trimmed = title.trim();
        if plausible_title(trimmed) {
            return Some(trimmed.to_string());
        }
    }

    let text = document.text().ok()?;
    text.lines()
        .map(str::trim)
        .find(|line| plausible_title(line))
        .map(str::to_string)
}

fn plausible_title(s: &str) -> bool {
    s.len() >= MIN_TITLE_LEN && s.chars().any(|c| c.is_alphabetic()) && !s.ends_with(".pdf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::pdf_fixtures::write_pdf;
    use crate::error::Result;
    use crate::search::SearchHit;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct CannedSearch {
        hits: Vec<SearchHit>,
    }

    #[async_trait]
    impl SearchProvider for CannedSearch {
        async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
            Ok(self.hits.iter().take(max_results).cloned().collect())
        }
    }

    fn offline_validator() -> Validator {
        let mut config = Config::default();
        config.webvalidation = false;
        Validator::new(config)
    }

    fn doi_hit(url: &str) -> SearchHit {
        SearchHit {
            url: url.to_string(),
            title: "Some landing page".to_string(),
            snippet: String::new(),
        }
    }

    #[tokio::test]
    async fn finds_doi_in_result_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(&path, "body", &[("Title", "Entanglement in many-body systems")]);
        let document = PdfDocument::load(&path).unwrap();

        let search = CannedSearch {
            hits: vec![doi_hit("https://doi.org/10.1103/RevModPhys.80.517")],
        };
        let found = find(&document, &offline_validator(), &search, &Config::default())
            .await
            .unwrap();
        assert_eq!(found.identifier.canonical(), "10.1103/revmodphys.80.517");
        assert_eq!(found.source, FinderKind::TitleGoogle);
    }

    #[tokio::test]
    async fn falls_back_to_first_text_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        // Info title is junk; the page text carries the real one.
        write_pdf(
            &path,
            "A Study of Interesting Things",
            &[("Title", "untitled1")],
        );
        let document = PdfDocument::load(&path).unwrap();

        let search = CannedSearch {
            hits: vec![doi_hit("https://doi.org/10.1000/found.by.text.title")],
        };
        let found = find(&document, &offline_validator(), &search, &Config::default())
            .await
            .unwrap();
        assert_eq!(found.identifier.canonical(), "10.1000/found.by.text.title");
    }

    #[tokio::test]
    async fn no_title_yields_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(&path, "short", &[]);
        let document = PdfDocument::load(&path).unwrap();

        let search = CannedSearch { hits: vec![] };
        assert!(
            find(&document, &offline_validator(), &search, &Config::default())
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn empty_results_yield_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(&path, "body", &[("Title", "A Perfectly Good Title")]);
        let document = PdfDocument::load(&path).unwrap();

        let search = CannedSearch { hits: vec![] };
        assert!(
            find(&document, &offline_validator(), &search, &Config::default())
                .await
                .is_none()
        );
    }
}
