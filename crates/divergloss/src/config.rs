//! Configuration types for Divergloss rendering.
//!
//! This module provides configuration structures holding the per-run
//! defaults of the renderers. All types implement [`serde::Deserialize`]
//! for loading from external sources; command-line options override them.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`BidictConfig`] - Defaults of the bilingual dictionary page.
//! - [`TextConfig`] - Defaults of the plain text view.
//!
//! # Example
//!
//! ```
//! # use divergloss::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.text().wcol(), 70);
//! assert!(config.bidict().style().is_none());
//! ```

use serde::Deserialize;

/// Default wrapping column of the plain text view.
pub const DEFAULT_WCOL: usize = 70;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Dictionary page section.
    #[serde(default)]
    bidict: BidictConfig,

    /// Plain text section.
    #[serde(default)]
    text: TextConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(bidict: BidictConfig, text: TextConfig) -> Self {
        Self { bidict, text }
    }

    /// Returns the dictionary page configuration.
    pub fn bidict(&self) -> &BidictConfig {
        &self.bidict
    }

    /// Returns the plain text configuration.
    pub fn text(&self) -> &TextConfig {
        &self.text
    }
}

/// Defaults of the bilingual dictionary page.
///
/// Fields that are not set leave the page unstyled, with separate asset
/// files and descriptions in the origin language.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BidictConfig {
    /// Built-in style sheet name.
    #[serde(default)]
    style: Option<String>,

    /// Style sheet parameters, `name=value` pairs separated by commas.
    #[serde(default)]
    styleopt: Option<String>,

    /// Embed the style sheet and script in the page.
    #[serde(default)]
    allinone: bool,

    /// Language of the descriptions and page framing.
    #[serde(default)]
    describe_in: Option<String>,
}

impl BidictConfig {
    pub fn new(
        style: Option<String>,
        styleopt: Option<String>,
        allinone: bool,
        describe_in: Option<String>,
    ) -> Self {
        Self {
            style,
            styleopt,
            allinone,
            describe_in,
        }
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn styleopt(&self) -> Option<&str> {
        self.styleopt.as_deref()
    }

    pub fn allinone(&self) -> bool {
        self.allinone
    }

    pub fn describe_in(&self) -> Option<&str> {
        self.describe_in.as_deref()
    }
}

/// Defaults of the plain text view.
#[derive(Debug, Clone, Deserialize)]
pub struct TextConfig {
    /// Column at which descriptions are wrapped.
    #[serde(default = "default_wcol")]
    wcol: usize,
}

impl TextConfig {
    pub fn new(wcol: usize) -> Self {
        Self { wcol }
    }

    pub fn wcol(&self) -> usize {
        self.wcol
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { wcol: DEFAULT_WCOL }
    }
}

fn default_wcol() -> usize {
    DEFAULT_WCOL
}
