//! Export functionality for Divergloss glossaries.
//!
//! This module provides the [`Exporter`] trait that defines the interface for
//! turning a built glossary into an output document. It is the final stage in
//! the Divergloss processing pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! Source Document
//!     ↓ load
//! Element Tree
//!     ↓ build
//! Glossary
//!     ↓ export (this module)
//! Output Document
//! ```
//!
//! # Available Backends
//!
//! - [`bidict`] - bilingual dictionary page via [`bidict::Bidict`]
//! - [`text`] - plain text listing via [`text::TextView`]
//! - [`tbx`] - terminology exchange document via [`tbx::Tbx`]
//! - [`html`] - single-page glossary view via [`html::HtmlView`]
//! - [`po`] - translation catalog via [`po::PoCatalog`]
//!
//! # Error Handling
//!
//! Export operations return [`Error`]. Options are checked against the
//! glossary before anything is rendered, so a bad option never produces a
//! partial document. [`Error`] converts into [`DivergError`] at the crate
//! boundary.
//!
//! [`DivergError`]: crate::DivergError

/// Bilingual dictionary backend.
pub mod bidict;
/// Glossary view backend.
pub mod html;
/// PO catalog backend.
pub mod po;
/// Built-in style sheets and page script.
pub mod style;
/// TBX backend.
pub mod tbx;
/// Plain text backend.
pub mod text;

use std::{collections::HashSet, fmt};

use divergloss_core::{Glossary, KeyedKind, key::Key};

use crate::textfmt::ResolutionWarning;

/// Abstraction for export backends.
///
/// Implementors carry their options and render a [`Glossary`] into a
/// [`Rendered`] document.
pub trait Exporter {
    /// Exports a glossary to the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Option`] if an option does not fit the glossary,
    /// or [`Error::Render`] if the output cannot be produced.
    fn export(&self, gloss: &Glossary) -> Result<Rendered, Error>;
}

/// A rendered document with its companion files.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    page: String,
    assets: Vec<Asset>,
    warnings: Vec<ResolutionWarning>,
}

impl Rendered {
    pub fn new(page: String, assets: Vec<Asset>, warnings: Vec<ResolutionWarning>) -> Self {
        Self {
            page,
            assets,
            warnings,
        }
    }

    /// The main document.
    pub fn page(&self) -> &str {
        &self.page
    }

    /// Files the page refers to, written next to it.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Gaps found while rendering.
    pub fn warnings(&self) -> &[ResolutionWarning] {
        &self.warnings
    }

    pub fn into_page(self) -> String {
        self.page
    }
}

/// A companion file of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    extension: &'static str,
    content: String,
}

impl Asset {
    pub fn new(extension: &'static str, content: String) -> Self {
        Self { extension, content }
    }

    /// File name extension, which the page's reference to it also uses.
    pub fn extension(&self) -> &'static str {
        self.extension
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Errors that can occur during export.
///
/// This type is converted into [`DivergError`] at the crate boundary via
/// the [`From`] implementation in [`crate::error`].
///
/// [`DivergError`]: crate::DivergError
#[derive(Debug)]
pub enum Error {
    /// An option that is unknown, malformed or names something the
    /// glossary does not declare.
    Option(String),
    /// A rendering failure described by `message`.
    Render(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Option(msg) => write!(f, "Option error: {msg}"),
            Self::Render(msg) => write!(f, "Render error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Check that an option names a declared language or environment.
fn check_declared(gloss: &Glossary, kind: KeyedKind, key: Key, option: &str) -> Result<(), Error> {
    if gloss.contains(kind, key) {
        Ok(())
    } else {
        Err(Error::Option(format!(
            "{option} `{key}` is not a {kind} declared by the glossary"
        )))
    }
}

/// The language an output is produced in: the requested one, or the
/// glossary default.
fn output_lang(gloss: &Glossary, lang: Option<Key>) -> Result<Key, Error> {
    let lang = lang
        .or_else(|| gloss.lang())
        .ok_or_else(|| Error::Option("no language given and the glossary has none".to_string()))?;
    check_declared(gloss, KeyedKind::Language, lang, "language")?;
    Ok(lang)
}

/// The environment an output is produced for: the requested one, or the
/// glossary default.
fn output_env(gloss: &Glossary, env: Option<Key>) -> Result<Option<Key>, Error> {
    match env {
        Some(env) => {
            check_declared(gloss, KeyedKind::Environment, env, "environment")?;
            Ok(Some(env))
        }
        None => Ok(gloss.default_env()),
    }
}

/// Identifiers issued on one page.
///
/// Declared keys are reserved: only the item declaring a key may use it as
/// an identifier, so derived identifiers never shadow a real anchor.
#[derive(Debug)]
pub(crate) struct UniqueIds {
    reserved: HashSet<String>,
    issued: HashSet<String>,
}

impl UniqueIds {
    pub(crate) fn new(reserved: impl IntoIterator<Item = String>) -> Self {
        Self {
            reserved: reserved.into_iter().collect(),
            issued: HashSet::new(),
        }
    }

    fn taken(&self, id: &str, owner: Option<Key>) -> bool {
        self.issued.contains(id)
            || (self.reserved.contains(id) && owner.is_none_or(|owner| owner != id))
    }

    /// Issue `candidate`, or the first free `candidate-N` from 2 on.
    pub(crate) fn issue(&mut self, candidate: String, owner: Option<Key>) -> String {
        let mut id = candidate.clone();
        let mut suffix = 2;
        while self.taken(&id, owner) {
            id = format!("{candidate}-{suffix}");
            suffix += 1;
        }
        self.issued.insert(id.clone());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fruit;

    #[test]
    fn test_unique_ids_reserve_declared_keys() {
        let mut ids = UniqueIds::new(["apple".to_string(), "pear".to_string()]);

        assert_eq!(ids.issue("apple".to_string(), Some(Key::new("apple"))), "apple");
        assert_eq!(ids.issue("apple".to_string(), Some(Key::new("apple"))), "apple-2");
        assert_eq!(ids.issue("pear".to_string(), None), "pear-2");
        assert_eq!(ids.issue("pear".to_string(), Some(Key::new("apple"))), "pear-3");
        assert_eq!(ids.issue("details-pear".to_string(), None), "details-pear");
        assert_eq!(ids.issue("details-pear".to_string(), None), "details-pear-2");
    }

    #[test]
    fn test_output_lang_and_env_defaults() {
        let gloss = fruit();
        assert_eq!(output_lang(&gloss, None).ok(), Some(Key::new("en")));
        assert_eq!(output_env(&gloss, None).ok(), Some(Some(Key::new("formal"))));
        assert!(output_env(&gloss, Some(Key::new("slang"))).is_ok());
    }

    #[test]
    fn test_undeclared_option_values() {
        let gloss = fruit();
        let err = output_lang(&gloss, Some(Key::new("de"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Option error: language `de` is not a language declared by the glossary"
        );
        assert!(matches!(
            output_env(&gloss, Some(Key::new("poetic"))),
            Err(Error::Option(_))
        ));
    }
}
