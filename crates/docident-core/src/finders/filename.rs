//! Strategy `filename`: scan the file name on disk.
//!
//! Catches files saved straight from a publisher or arXiv download, where
//! the identifier ends up in the name (`2101.00001v2.pdf`,
//! `10.1103_PhysRev.47.777.pdf`).

use crate::document::PdfDocument;
use crate::finders::{Found, FinderKind, confirm_first, scan_identifiers};
use crate::validate::Validator;

pub async fn find(document: &PdfDocument, validator: &Validator) -> Option<Found> {
    let name = document.file_name()?;
    // Publishers often flatten '/' to '_' in downloaded file names.
    let candidates: Vec<_> = [name.to_string(), name.replace('_', "/")]
        .iter()
        .flat_map(|variant| scan_identifiers(variant))
        .fold(Vec::new(), |mut acc, id| {
            if !acc.contains(&id) {
                acc.push(id);
            }
            acc
        });
    confirm_first(&candidates, validator, FinderKind::Filename).await
}
