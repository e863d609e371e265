//! # Divergloss Parser
//!
//! Loader and model builder for Divergloss glossary documents. This crate
//! turns a document tree, possibly spread over several files joined by
//! `xi:include`, into a [`Glossary`].
//!
//! ## Usage
//!
//! ```
//! # use divergloss_parser::{parse, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         <glossary id="fruit" lang="en">
//!           <keydefs>
//!             <languages><language id="en"><name>English</name></language></languages>
//!           </keydefs>
//!           <concepts>
//!             <concept id="apple"><term>apple</term></concept>
//!           </concepts>
//!         </glossary>
//!     "#;
//!
//!     let gloss = parse(source)?;
//!     assert_eq!(gloss.concepts().count(), 1);
//!     Ok(())
//! }
//! ```

mod builder;
pub mod error;
mod loader;
mod markup;
mod source;
mod tree;
mod validate;

use std::{fs, path::Path};

use log::{debug, info};

use divergloss_core::Glossary;

pub use divergloss_core::span;
pub use error::{Diagnostic, ErrorCode, ParseError};
pub use source::{SourceFile, SourceMap};
pub use span::{SourceId, Span};

/// A built glossary together with the warnings raised while building it.
#[derive(Debug)]
pub struct Document {
    glossary: Glossary,
    warnings: Vec<Diagnostic>,
}

impl Document {
    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_glossary(self) -> Glossary {
        self.glossary
    }
}

/// Parse an in-memory document into a glossary.
///
/// Inclusions are resolved relative to the working directory. Warnings are
/// logged and dropped; use [`parse_document`] to keep them.
pub fn parse(source: &str) -> Result<Glossary, ParseError> {
    let mut sources = SourceMap::new();
    let id = sources.add_text("<input>", source);
    parse_document(&mut sources, id).map(Document::into_glossary)
}

/// Read and parse a glossary file.
///
/// Every file read, the main one and each included one, is added to
/// `sources`.
pub fn load_file(path: &Path, sources: &mut SourceMap) -> Result<Document, ParseError> {
    info!(path:? = path; "Reading glossary file");
    let text = fs::read_to_string(path).map_err(|err| {
        Diagnostic::error(format!("cannot read `{}`: {err}", path.display()))
            .with_code(ErrorCode::E003)
    })?;
    let id = sources.add_file(path, text);
    parse_document(sources, id)
}

/// Parse a document already registered in `sources`.
///
/// The pipeline:
///
/// 1. **Load** - Read the markup tree, expanding inclusions
/// 2. **Build** - Flatten the tree into typed nodes with inherited context
/// 3. **Check** - Verify that every referenced key is declared
pub fn parse_document(sources: &mut SourceMap, id: SourceId) -> Result<Document, ParseError> {
    // Step 1: Load
    let root = loader::load(sources, id)?;
    debug!(sources = sources.len(); "Document tree loaded");

    // Step 2: Build
    let (glossary, references, mut diagnostics) = builder::Builder::new().build(&root);

    // Step 3: Check
    validate::check_references(&glossary, &references, &mut diagnostics);

    let warnings = diagnostics.finish()?;
    info!(
        nodes = glossary.len(),
        concepts = glossary.concepts().count(),
        warnings = warnings.len();
        "Glossary built",
    );
    Ok(Document { glossary, warnings })
}
