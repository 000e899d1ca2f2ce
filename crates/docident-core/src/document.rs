//! PDF document access: metadata dictionary, extracted text, and the file
//! name, in the forms the discovery strategies consume.

use std::path::{Path, PathBuf};

use lopdf::{Document, Object};
use tracing::debug;

use crate::error::{DocidentError, Result};

/// A loaded PDF plus its on-disk location.
///
/// Text extraction is done lazily per request; the metadata dictionary is
/// read once at load time since every run looks at it.
#[derive(Debug)]
pub struct PdfDocument {
    path: PathBuf,
    document: Document,
    /// Decoded Info-dictionary entries, in dictionary order.
    metadata: Vec<(String, String)>,
}

impl PdfDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let document = Document::load(path).map_err(|err| DocidentError::Document {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let metadata = read_info_dictionary(&document);
        Ok(Self {
            path: path.to_path_buf(),
            document,
            metadata,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem of the document, the way it appears on disk.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_stem().and_then(|stem| stem.to_str())
    }

    /// All decoded entries of the document Info dictionary.
    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    /// Look up one Info entry, case-insensitively.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Text of the whole document, in page order. Pages whose content
    /// streams are unparseable are skipped rather than failing the run.
    pub fn text(&self) -> Result<String> {
        let pages = self.document.get_pages();
        if pages.is_empty() {
            return Ok(String::new());
        }

        let mut out = String::new();
        for page_number in pages.keys().copied() {
            match self.document.extract_text(&[page_number]) {
                Ok(text) => {
                    out.push_str(&text);
                    out.push('\n');
                }
                Err(err) => {
                    debug!(page = page_number, error = %err, "skipping unextractable page");
                }
            }
        }
        Ok(out)
    }

    /// The first `n` characters of the document text, whitespace-flattened
    /// so it can be fed to a search engine as a fingerprint.
    pub fn leading_text(&self, n: usize) -> Result<String> {
        let text = self.text()?;
        let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
        Ok(flattened.chars().take(n).collect())
    }
}

fn read_info_dictionary(document: &Document) -> Vec<(String, String)> {
    let Ok(info_obj) = document.trailer.get(b"Info") else {
        return Vec::new();
    };

    let dict = match info_obj {
        Object::Reference(id) => match document.get_object(*id) {
            Ok(Object::Dictionary(dict)) => dict,
            _ => return Vec::new(),
        },
        Object::Dictionary(dict) => dict,
        _ => return Vec::new(),
    };

    dict.iter()
        .filter_map(|(key, value)| {
            let name = String::from_utf8_lossy(key).to_string();
            let text = match value {
                Object::String(bytes, _) => decode_pdf_string(bytes),
                _ => return None,
            };
            Some((name, text))
        })
        .collect()
}

/// Decode a PDF string object: UTF-16BE when it carries the BOM, otherwise
/// treat it as Latin-1 extended with whatever UTF-8 happens to fit.
pub(crate) fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Shared PDF builders for tests across the crate. Each document carries a
/// single page of Courier text plus an optional Info dictionary.
#[cfg(test)]
pub(crate) mod pdf_fixtures {
    use std::path::Path;

    use lopdf::content::{Content, Operation};
    use lopdf::{Dictionary, Document, Object, Stream, dictionary};

    pub(crate) fn write_pdf(path: &Path, page_text: &str, info: &[(&str, &str)]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(page_text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if !info.is_empty() {
            let mut info_dict = Dictionary::new();
            for (key, value) in info {
                info_dict.set(key.as_bytes().to_vec(), Object::string_literal(*value));
            }
            let info_id = doc.add_object(Object::Dictionary(info_dict));
            doc.trailer.set("Info", info_id);
        }

        doc.save(path).expect("save fixture pdf");
    }
}
