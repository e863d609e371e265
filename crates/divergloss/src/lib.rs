//! Divergloss - publishing multilingual glossaries
//!
//! This library loads glossaries written in the Divergloss XML dialect and
//! renders them as bilingual dictionary pages, single-page HTML views,
//! plain text listings, TBX term catalogs and PO catalogs of term pairs.
//! It also converts PO translation catalogs of term pairs into glossary
//! concepts.

pub mod catalog;
pub mod collate;
pub mod config;
pub mod export;
pub mod textfmt;

mod error;
#[cfg(test)]
mod testing;

pub use divergloss_core::{Glossary, KeyedKind, NodeId, dset, gnode, key, text};
pub use divergloss_parser::{Document, SourceMap};

pub use error::DivergError;

use std::path::Path;

use log::{debug, info, warn};

use config::AppConfig;
use export::{
    Exporter, Rendered,
    bidict::{Bidict, BidictOptions},
    html::{HtmlView, HtmlViewOptions},
    po::{PoCatalog, PoOptions},
    tbx::{Tbx, TbxOptions},
    text::{TextOptions, TextView},
};
use key::Key;

/// Builder for loading and rendering Divergloss glossaries.
///
/// The configuration supplies the defaults of every rendering; options
/// passed to a render call start from them.
///
/// # Examples
///
/// ```rust,no_run
/// use divergloss::{GlossaryBuilder, config::AppConfig, key::Key};
///
/// let builder = GlossaryBuilder::new(AppConfig::default());
///
/// // Load the glossary with its inclusions
/// let document = builder.load("fruit.xml".as_ref())
///     .expect("Failed to load");
///
/// // Render an English to Serbian dictionary
/// let options = builder.bidict_options(Key::new("en"), Key::new("sr"));
/// let rendered = builder.render_bidict(document.glossary(), options)
///     .expect("Failed to render");
///
/// println!("{}", rendered.page());
/// ```
#[derive(Debug, Default)]
pub struct GlossaryBuilder {
    config: AppConfig,
}

impl GlossaryBuilder {
    /// Create a new glossary builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse an in-memory glossary document.
    ///
    /// Inclusions are resolved relative to the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`DivergError::Parse`] with the diagnostics of a malformed
    /// document.
    ///
    /// # Examples
    ///
    /// ```
    /// use divergloss::GlossaryBuilder;
    ///
    /// let source = r#"<glossary lang="en">
    ///   <keydefs><languages><language id="en"/></languages></keydefs>
    ///   <concepts><concept id="apple"><term>apple</term></concept></concepts>
    /// </glossary>"#;
    /// let document = GlossaryBuilder::default().parse(source)
    ///     .expect("Failed to parse glossary");
    /// assert_eq!(document.glossary().concepts().count(), 1);
    /// ```
    pub fn parse(&self, source: &str) -> Result<Document, DivergError> {
        let mut sources = SourceMap::new();
        let id = sources.add_text("<input>", source);
        let document = divergloss_parser::parse_document(&mut sources, id)
            .map_err(|err| DivergError::new_parse_error(err, sources))?;
        log_warnings(&document);
        Ok(document)
    }

    /// Read and parse a glossary file.
    ///
    /// # Errors
    ///
    /// Returns [`DivergError::Parse`] if the file or one of its inclusions
    /// cannot be read or is malformed.
    pub fn load(&self, path: &Path) -> Result<Document, DivergError> {
        info!(path:? = path; "Loading glossary");
        let mut sources = SourceMap::new();
        let document = divergloss_parser::load_file(path, &mut sources)
            .map_err(|err| DivergError::new_parse_error(err, sources))?;
        log_warnings(&document);
        Ok(document)
    }

    /// Dictionary options with the configured page defaults.
    pub fn bidict_options(&self, olang: Key, tlang: Key) -> BidictOptions {
        BidictOptions::from_config(self.config.bidict(), olang, tlang)
    }

    /// Text view options with the configured wrap column.
    pub fn text_options(&self) -> TextOptions {
        TextOptions::from_config(self.config.text())
    }

    /// Render a bilingual dictionary page.
    ///
    /// # Errors
    ///
    /// Returns [`DivergError::Config`] if an option does not fit the
    /// glossary, or [`DivergError::Export`] if the page cannot be rendered.
    pub fn render_bidict(
        &self,
        gloss: &Glossary,
        options: BidictOptions,
    ) -> Result<Rendered, DivergError> {
        info!(olang = options.olang().to_string(), tlang = options.tlang().to_string(); "Rendering dictionary");
        let rendered = Bidict::new(options).export(gloss)?;
        debug!(warnings = rendered.warnings().len(); "Dictionary rendered");
        Ok(rendered)
    }

    /// Render the plain text view.
    ///
    /// # Errors
    ///
    /// Returns [`DivergError::Config`] for an undeclared language or
    /// environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use divergloss::GlossaryBuilder;
    ///
    /// let source = r#"<glossary lang="en">
    ///   <keydefs><languages><language id="en"/></languages></keydefs>
    ///   <concepts><concept id="apple"><desc>A fruit.</desc><term>apple</term></concept></concepts>
    /// </glossary>"#;
    /// let builder = GlossaryBuilder::default();
    /// let document = builder.parse(source).unwrap();
    /// let rendered = builder.render_text(document.glossary(), builder.text_options()).unwrap();
    /// assert!(rendered.page().ends_with("  apple\n    A fruit.\n"));
    /// ```
    pub fn render_text(
        &self,
        gloss: &Glossary,
        options: TextOptions,
    ) -> Result<Rendered, DivergError> {
        info!("Rendering text view");
        Ok(TextView::new(options).export(gloss)?)
    }

    /// Render the glossary as a TBX document.
    ///
    /// # Errors
    ///
    /// Returns [`DivergError::Config`] for an undeclared language or
    /// environment.
    pub fn render_tbx(&self, gloss: &Glossary, options: TbxOptions) -> Result<Rendered, DivergError> {
        info!("Rendering TBX");
        Ok(Tbx::new(options).export(gloss)?)
    }

    /// Render the whole glossary as one HTML page.
    ///
    /// # Errors
    ///
    /// Returns [`DivergError::Config`] for an undeclared language or
    /// environment, or an index without columns.
    pub fn render_html(
        &self,
        gloss: &Glossary,
        options: HtmlViewOptions,
    ) -> Result<Rendered, DivergError> {
        info!("Rendering glossary view");
        let rendered = HtmlView::new(options).export(gloss)?;
        debug!(warnings = rendered.warnings().len(); "Glossary view rendered");
        Ok(rendered)
    }

    /// Render the term pairs of two languages as a PO catalog.
    ///
    /// # Errors
    ///
    /// Returns [`DivergError::Config`] for an undeclared language or
    /// environment.
    pub fn render_po(&self, gloss: &Glossary, options: PoOptions) -> Result<Rendered, DivergError> {
        info!("Rendering PO catalog");
        Ok(PoCatalog::new(options).export(gloss)?)
    }

    /// Convert a PO catalog of term pairs into a `<concepts>` fragment.
    ///
    /// # Errors
    ///
    /// Returns [`DivergError::Catalog`] for malformed catalog syntax.
    pub fn convert_catalog(
        &self,
        text: &str,
        olang: &str,
        tlang: &str,
    ) -> Result<String, DivergError> {
        info!(olang = olang, tlang = tlang; "Converting catalog");
        Ok(catalog::convert(text, olang, tlang)?)
    }
}

fn log_warnings(document: &Document) {
    for diagnostic in document.warnings() {
        warn!("{diagnostic}");
    }
}
