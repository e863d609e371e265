//! Error types for Divergloss operations.
//!
//! This module provides the main error type [`DivergError`] which wraps
//! the error conditions of loading, rendering and converting glossaries.

use std::io;

use thiserror::Error;

use divergloss_parser::{ParseError, SourceMap};

use crate::catalog::CatalogError;

/// The main error type for Divergloss operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the [`SourceMap`] of every file read while
/// loading, so the spans of its diagnostics can be shown against the
/// right source text.
#[derive(Debug, Error)]
pub enum DivergError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, sources: SourceMap },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for DivergError {
    fn from(error: crate::export::Error) -> Self {
        match error {
            crate::export::Error::Option(message) => Self::Config(message),
            other => Self::Export(Box::new(other)),
        }
    }
}

impl DivergError {
    /// Create a new `Parse` error with the sources it refers to.
    pub fn new_parse_error(err: ParseError, sources: SourceMap) -> Self {
        Self::Parse { err, sources }
    }
}
