//! Strategy `document_text`: scan the full extracted text of the document.

use tracing::debug;

use crate::document::PdfDocument;
use crate::finders::{Found, FinderKind, confirm_first, scan_identifiers};
use crate::validate::Validator;

pub async fn find(document: &PdfDocument, validator: &Validator) -> Option<Found> {
    let text = match document.text() {
        Ok(text) => text,
        Err(err) => {
            debug!(path = %document.path().display(), error = %err, "text extraction failed");
            return None;
        }
    };
    let candidates = scan_identifiers(&text);
    confirm_first(&candidates, validator, FinderKind::DocumentText).await
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

    #[tokio::test]
    async fn finds_doi_in_body_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(
            &path,
            "Phys. Rev. Lett. 10, 531 doi: 10.1103/PhysRevLett.10.531 reprint",
            &[],
        );
        let document = PdfDocument::load(&path).unwrap();

        let found = find(&document, &offline_validator()).await.unwrap();
        assert_eq!(found.identifier.canonical(), "10.1103/physrevlett.10.531");
        assert_eq!(found.source, FinderKind::DocumentText);
    }

    #[tokio::test]
    async fn earlier_occurrence_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(
            &path,
            "arXiv:2101.00001 then later also doi:10.1000/second",
            &[],
        );
        let document = PdfDocument::load(&path).unwrap();

        let found = find(&document, &offline_validator()).await.unwrap();
        assert_eq!(found.identifier.canonical(), "arxiv:2101.00001");
    }

    #[tokio::test]
    async fn plain_prose_yields_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        write_pdf(&path, "no identifiers anywhere in this text", &[]);
        let document = PdfDocument::load(&path).unwrap();

        assert!(find(&document, &offline_validator()).await.is_none());
    }
}
