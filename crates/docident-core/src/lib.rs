//! Docident: find the DOI or arXiv ID of a PDF document.
//!
//! The core of the crate is [`pipeline::IdentifierFinder`], which runs a
//! configurable ordered chain of finder strategies against one document:
//! embedded metadata, body text, filename, and two web-search fallbacks.
//! Candidates are validated either syntactically or against the online
//! registries (doi.org, export.arxiv.org).

pub mod config;
pub mod document;
pub mod error;
pub mod finders;
pub mod http;
pub mod identifiers;
pub mod pipeline;
pub mod registry;
pub mod search;
pub mod validate;
pub mod writer;

pub use config::{Config, DxDoiOrgMode};
pub use error::{DocidentError, Result};
pub use identifiers::{ArxivId, Doi, Identifier, IdentifierKind};
pub use pipeline::{FindResult, IdentifierFinder};
