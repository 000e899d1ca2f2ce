//! Write a confirmed identifier back into the PDF Info dictionary so later
//! runs can short-circuit on the metadata strategy.

use std::path::Path;

use lopdf::{Dictionary, Document, Object};
use tracing::debug;

use crate::error::{DocidentError, Result};
use crate::identifiers::Identifier;

/// Info-dictionary key used for the stored identifier.
pub const IDENTIFIER_KEY: &str = "identifier";

/// Store `identifier` in the document's Info dictionary under
/// [`IDENTIFIER_KEY`], creating the dictionary if the file has none.
/// Returns `false` when the stored value already matches (no write).
pub fn write_identifier(path: &Path, identifier: &Identifier) -> Result<bool> {
    let canonical = identifier.canonical();

    let mut document = Document::load(path).map_err(|err| DocidentError::MetadataWrite {
        path: path.to_path_buf(),
        reason: format!("failed to open: {err}"),
    })?;

    if let Some(existing) = current_identifier(&document)
        && existing == canonical
    {
        debug!(path = %path.display(), "identifier already stored, skipping write");
        return Ok(false);
    }

    set_info_entry(&mut document, IDENTIFIER_KEY, &canonical).map_err(|reason| {
        DocidentError::MetadataWrite {
            path: path.to_path_buf(),
            reason,
        }
    })?;

    document.save(path).map_err(|err| DocidentError::MetadataWrite {
        path: path.to_path_buf(),
        reason: format!("failed to save: {err}"),
    })?;
    debug!(path = %path.display(), identifier = %canonical, "stored identifier in document metadata");
    Ok(true)
}

fn current_identifier(document: &Document) -> Option<String> {
    let info = match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => match document.get_object(*id).ok()? {
            Object::Dictionary(dict) => dict,
            _ => return None,
        },
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    match info.get(IDENTIFIER_KEY.as_bytes()).ok()? {
        Object::String(bytes, _) => Some(crate::document::decode_pdf_string(bytes)),
        _ => None,
    }
}

fn set_info_entry(document: &mut Document, key: &str, value: &str) -> std::result::Result<(), String> {
    match document.trailer.get(b"Info").cloned() {
        Ok(Object::Reference(id)) => {
            let object = document
                .get_object_mut(id)
                .map_err(|err| format!("broken Info reference: {err}"))?;
            let Object::Dictionary(dict) = object else {
                return Err("Info reference does not point at a dictionary".to_string());
            };
            dict.set(key.as_bytes().to_vec(), Object::string_literal(value));
        }
        Ok(Object::Dictionary(mut dict)) => {
            dict.set(key.as_bytes().to_vec(), Object::string_literal(value));
            document.trailer.set("Info", Object::Dictionary(dict));
        }
        _ => {
            let mut dict = Dictionary::new();
            dict.set(key.as_bytes().to_vec(), Object::string_literal(value));
            let info_id = document.add_object(Object::Dictionary(dict));
            document.trailer.set("Info", info_id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{PdfDocument, pdf_fixtures::write_pdf};
    use crate::identifiers::{ArxivId, Doi};
    use tempfile::TempDir;

    #[test]
    fn stores_doi_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("paper.pdf");
        write_pdf(&path, "body text", &[("Title", "A paper")]);

        let id = Identifier::Doi(Doi::parse("10.1000/xyz123").unwrap());
        assert!(write_identifier(&path, &id).unwrap());

        let doc = PdfDocument::load(&path).unwrap();
        assert_eq!(doc.metadata_value(IDENTIFIER_KEY), Some("10.1000/xyz123"));
        assert_eq!(doc.metadata_value("Title"), Some("A paper"));

        // Second write with the same value is a no-op.
        assert!(!write_identifier(&path, &id).unwrap());
    }

    #[test]
    fn creates_info_dictionary_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bare.pdf");
        write_pdf(&path, "body", &[]);

        let id = Identifier::Arxiv(ArxivId::parse("2101.00001").unwrap());
        assert!(write_identifier(&path, &id).unwrap());

        let doc = PdfDocument::load(&path).unwrap();
        assert_eq!(doc.metadata_value(IDENTIFIER_KEY), Some("arxiv:2101.00001"));
    }

    #[test]
    fn overwrites_stale_identifier() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stale.pdf");
        write_pdf(&path, "body", &[(IDENTIFIER_KEY, "10.1000/old")]);

        let id = Identifier::Doi(Doi::parse("10.1000/new").unwrap());
        assert!(write_identifier(&path, &id).unwrap());

        let doc = PdfDocument::load(&path).unwrap();
        assert_eq!(doc.metadata_value(IDENTIFIER_KEY), Some("10.1000/new"));
    }

    #[test]
    fn missing_file_is_a_metadata_write_error() {
        let id = Identifier::Doi(Doi::parse("10.1000/xyz").unwrap());
        let err = write_identifier(Path::new("/nonexistent/file.pdf"), &id).unwrap_err();
        assert!(matches!(err, DocidentError::MetadataWrite { .. }));
    }
}
