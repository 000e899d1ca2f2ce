//! Candidate normalization and free-text scanning.
//!
//! `normalize` turns one noisy candidate string into an [`Identifier`] when
//! the whole string is identifier-shaped. `scan_candidates` pulls
//! identifier-shaped substrings out of arbitrary text, in reading order, for
//! the finder strategies to feed through validation one by one.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ArxivId, Doi, Identifier, IdentifierKind};

static DOI_SCAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)10\.\d{4,9}/[-._;()/:a-z0-9]+").unwrap());

static ARXIV_LABELED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)arxiv[:\s]\s*(\d{4}\.\d{4,5}(v\d+)?|[a-z-]+(\.[a-z-]+)?/\d{7}(v\d+)?)")
        .unwrap()
});

static ARXIV_BARE_NEW: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}\.\d{4,5}(v\d+)?").unwrap());

static ARXIV_BARE_OLD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[a-z][a-z-]+(\.[a-zA-Z-]+)?/\d{7}(v\d+)?\b").unwrap()
});

/// Normalize a single candidate: strip wrapping noise and accept only if the
/// remainder matches one of the identifier grammars. Idempotent — feeding a
/// canonical form back in yields the same identifier.
pub fn normalize(candidate: &str) -> Option<Identifier> {
    normalize_hinted(candidate, None)
}

/// Like [`normalize`], restricted to one identifier family when a hint is
/// given (e.g. the candidate came from a metadata key named "doi").
pub fn normalize_hinted(candidate: &str, hint: Option<IdentifierKind>) -> Option<Identifier> {
    let cleaned = strip_noise(candidate);
    if cleaned.is_empty() {
        return None;
    }
    if hint != Some(IdentifierKind::Arxiv) {
        if let Ok(doi) = Doi::parse(&cleaned) {
            return Some(Identifier::Doi(doi));
        }
    }
    if hint != Some(IdentifierKind::Doi) {
        if let Ok(id) = ArxivId::parse(&cleaned) {
            return Some(Identifier::Arxiv(id));
        }
    }
    None
}

/// Identifier-shaped substrings of `text`, in the order they appear.
///
/// When two matches overlap (a bare arXiv number inside a labeled one, an
/// old-format id inside a DOI suffix) only the earliest, longest match
/// survives. Text containing percent-escapes is additionally scanned in
/// decoded form, with those candidates appended after the raw ones.
pub fn scan_candidates(text: &str) -> Vec<String> {
    let mut out = scan_raw(text);
    if text.contains('%') {
        if let Ok(decoded) = urlencoding::decode(text) {
            for cand in scan_raw(&decoded) {
                if !out.contains(&cand) {
                    out.push(cand);
                }
            }
        }
    }
    out
}

fn scan_raw(text: &str) -> Vec<String> {
    // (start, end, candidate)
    let mut spans: Vec<(usize, usize, String)> = Vec::new();

    for m in DOI_SCAN.find_iter(text) {
        spans.push((m.start(), m.end(), m.as_str().to_string()));
    }
    for caps in ARXIV_LABELED.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let id = caps.get(1).unwrap();
        spans.push((whole.start(), whole.end(), id.as_str().to_string()));
    }
    for m in ARXIV_BARE_NEW.find_iter(text) {
        spans.push((m.start(), m.end(), m.as_str().to_string()));
    }
    for m in ARXIV_BARE_OLD.find_iter(text) {
        spans.push((m.start(), m.end(), m.as_str().to_string()));
    }

    // Reading order; on equal start the longer match wins.
    spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut out = Vec::new();
    let mut covered_to = 0usize;
    for (start, end, cand) in spans {
        if start < covered_to {
            continue;
        }
        covered_to = end;
        if !out.contains(&cand) {
            out.push(cand);
        }
    }
    out
}

/// Strip the wrapping noise commonly found around identifiers in PDF text
/// and metadata: enclosing brackets and quotes, percent-escapes, trailing
/// sentence punctuation.
pub(crate) fn strip_noise(candidate: &str) -> String {
    const PAIRS: [(char, char); 6] = [
        ('(', ')'),
        ('[', ']'),
        ('{', '}'),
        ('<', '>'),
        ('"', '"'),
        ('\'', '\''),
    ];

    let mut out = candidate.trim().to_string();
    if out.contains('%') {
        if let Ok(decoded) = urlencoding::decode(&out) {
            out = decoded.into_owned();
        }
    }

    // Brackets and trailing punctuation nest in either order ("(10.1000/x).",
    // "[doi:10.1000/x],"), so strip layers until nothing changes.
    loop {
        let before = out.clone();
        for (open, close) in PAIRS {
            if out.len() >= 2 && out.starts_with(open) && out.ends_with(close) {
                out = out[open.len_utf8()..out.len() - close.len_utf8()]
                    .trim()
                    .to_string();
            }
        }
        while out.ends_with(['.', ',', ';', ':']) {
            out.pop();
        }
        // A lone trailing close, as in "see 10.1000/xyz)".
        if out == before && out.ends_with([')', ']', '}', '"', '\'']) {
            out.pop();
        }
        if out == before {
            break;
        }
        out = out.trim().to_string();
    }
    out
}
