//! Strategy `document_infos`: candidates from the PDF Info dictionary.
//!
//! Keys whose names mention an identifier scheme ("doi", "arxiv") pin the
//! family of their value. Every other value is tried as a whole identifier
//! first (which covers the stored "identifier" entry), then scanned like
//! free text.

use crate::document::PdfDocument;
use crate::finders::{Found, FinderKind, confirm_first, scan_identifiers};
use crate::identifiers::{Identifier, IdentifierKind, normalize, normalize_hinted};
use crate::validate::Validator;

pub async fn find(document: &PdfDocument, validator: &Validator) -> Option<Found> {
    let mut candidates: Vec<Identifier> = Vec::new();
    let mut push = |identifier: Identifier| {
        if !candidates.contains(&identifier) {
            candidates.push(identifier);
        }
    };

    for (key, value) in document.metadata() {
        let lowered = key.to_lowercase();
        if lowered.contains("doi") {
            if let Some(id) = normalize_hinted(value, Some(IdentifierKind::Doi)) {
                push(id);
                continue;
            }
        } else if lowered.contains("arxiv") {
            if let Some(id) = normalize_hinted(value, Some(IdentifierKind::Arxiv)) {
                push(id);
                continue;
            }
        }
        // Whole-value match first (covers the stored "identifier" entry and
        // values that are exactly an identifier), then a substring scan.
        if let Some(id) = normalize(value) {
            push(id);
            continue;
        }
        for id in scan_identifiers(value) {
            push(id);
        }
    }

    confirm_first(&candidates, validator, FinderKind::DocumentInfos).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::document::pdf_fixtures::write_pdf;
    use tempfile::TempDir;

    fn offline_validator() -> Validator {
        let mut config = Config::default();
        config.webvalidation = false;
        Validator::new(config)
    }

    async fn run_on(info: &[(&str, &str)]) -> Option<Found> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(&path, "unrelated body text", info);
        let document = PdfDocument::load(&path).unwrap();
        find(&document, &offline_validator()).await
    }

    #[tokio::test]
    async fn hinted_doi_key_wins() {
        let found = run_on(&[
            ("Title", "Some Paper"),
            ("doi", "10.1103/PhysRev.47.777"),
        ])
        .await
        .unwrap();
        assert_eq!(found.identifier.canonical(), "10.1103/physrev.47.777");
        assert_eq!(found.source, FinderKind::DocumentInfos);
    }

    #[tokio::test]
    async fn arxiv_hinted_key_is_parsed_as_arxiv() {
        // A bare new-style number is ambiguous in free text but the key
        // name settles it.
        let found = run_on(&[("arxivID", "2101.00001v2")]).await.unwrap();
        assert_eq!(found.identifier.canonical(), "arxiv:2101.00001");
    }

    #[tokio::test]
    async fn stored_identifier_entry_is_recognized() {
        let found = run_on(&[("identifier", "arxiv:quant-ph/0703044")])
            .await
            .unwrap();
        assert_eq!(found.identifier.canonical(), "arxiv:quant-ph/0703044");
    }

    #[tokio::test]
    async fn unhinted_values_are_scanned() {
        let found = run_on(&[(
            "Subject",
            "Published version of https://doi.org/10.1000/xyz123",
        )])
        .await
        .unwrap();
        assert_eq!(found.identifier.canonical(), "10.1000/xyz123");
    }

    #[tokio::test]
    async fn no_candidates_yields_none() {
        assert!(run_on(&[("Title", "Nothing to see")]).await.is_none());
    }
}
