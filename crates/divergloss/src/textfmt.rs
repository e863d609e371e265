//! Text formatting.
//!
//! Glossary text is formatted against a [`Binding`]: the glossary and the
//! language and environment the output is produced for. The binding
//! resolves everything in a text that depends on that context, namely
//! cross-references to concepts and embedded environment selectors, and
//! records a [`ResolutionWarning`] whenever it has to fall back.
//!
//! - [`PlainFormatter`] - wrapped plain text
//! - [`HtmlFormatter`] - XHTML fragments

mod html;
pub(crate) mod markup;
mod plain;

pub use html::HtmlFormatter;
pub use plain::PlainFormatter;

use std::{cell::RefCell, fmt};

use log::warn;

use divergloss_core::{
    Glossary, KeyedKind, NodeId,
    dset::{Dset, LangEnv},
    gnode::Term,
    key::{Key, display_opt},
    text::{Selector, Text},
};

/// A gap found while resolving text or selecting content.
///
/// Warnings never abort rendering; they are returned with the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    /// A cross-reference names a concept that does not exist.
    DanglingReference { concept: Key },
    /// An embedded selector has no variant for the bound environment.
    UnmatchedSelector { raw: String, env: Option<Key> },
    /// A concept has no term in a language the output needs.
    UntranslatedConcept { concept: Key, lang: Key },
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingReference { concept } => {
                write!(f, "reference to undefined concept `{concept}`")
            }
            Self::UnmatchedSelector { raw, env } => write!(
                f,
                "selector `{raw}` has no variant for environment `{}`, using the first",
                display_opt(*env)
            ),
            Self::UntranslatedConcept { concept, lang } => {
                write!(f, "concept `{concept}` has no term in `{lang}`, skipped")
            }
        }
    }
}

/// What a cross-reference points at.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Target<'g> {
    /// The concept is not declared.
    Dangling,
    /// The concept has no term in the bound language and environment.
    Unnamed,
    /// The preferred term of the concept.
    Term(&'g Term),
}

/// A glossary bound to the language and environment of one output.
///
/// # Examples
///
/// ```
/// # use divergloss::textfmt::{Binding, PlainFormatter};
/// let gloss = divergloss_parser::parse(
///     r#"<glossary lang="en"><keydefs><languages><language id="en"/></languages></keydefs>
///        <concepts><concept id="apple"><desc>A <em>round</em> fruit.</desc></concept></concepts>
///        </glossary>"#,
/// ).unwrap();
///
/// let binding = Binding::with_defaults(&gloss);
/// let concept = gloss.concepts().next().unwrap().1;
/// let desc = binding.texts(&concept.desc);
/// assert_eq!(PlainFormatter::new(&binding).format(desc[0]), "A *round* fruit.");
/// assert!(binding.take_warnings().is_empty());
/// ```
#[derive(Debug)]
pub struct Binding<'g> {
    gloss: &'g Glossary,
    langenv: LangEnv,
    warnings: RefCell<Vec<ResolutionWarning>>,
}

impl<'g> Binding<'g> {
    pub fn new(gloss: &'g Glossary, lang: Option<Key>, env: Option<Key>) -> Self {
        Self {
            gloss,
            langenv: LangEnv::new(lang, env),
            warnings: RefCell::new(Vec::new()),
        }
    }

    /// Bind to the default language and environment of the glossary.
    pub fn with_defaults(gloss: &'g Glossary) -> Self {
        Self::new(gloss, gloss.lang(), gloss.default_env())
    }

    pub fn glossary(&self) -> &'g Glossary {
        self.gloss
    }

    pub fn langenv(&self) -> LangEnv {
        self.langenv
    }

    pub fn lang(&self) -> Option<Key> {
        self.langenv.lang
    }

    pub fn env(&self) -> Option<Key> {
        self.langenv.env
    }

    /// Resolve a d-set in the bound language and environment.
    pub fn resolve(&self, dset: &Dset) -> Vec<NodeId> {
        dset.resolve(self.gloss, self.langenv)
    }

    /// Texts of the resolved candidates of a d-set of text nodes.
    pub fn texts(&self, dset: &Dset) -> Vec<&'g Text> {
        self.resolve(dset)
            .into_iter()
            .filter_map(|id| self.gloss.node(id).kind().text())
            .collect()
    }

    /// Terms of the resolved candidates of a term d-set.
    pub fn terms(&self, dset: &Dset) -> Vec<&'g Term> {
        self.resolve(dset)
            .into_iter()
            .filter_map(|id| self.gloss.term(id))
            .collect()
    }

    /// The variant of an embedded selector for the bound environment.
    ///
    /// Tries the environment itself, then the environments it is close
    /// to. When no variant fits, the first one is used and a warning is
    /// recorded.
    pub fn select<'s>(&self, selector: &'s Selector) -> &'s str {
        let env = self.langenv.env;
        if let Some(text) = selector.pick(env) {
            return text;
        }
        let closeto = env
            .and_then(|env| self.gloss.environment(env))
            .map(|environment| environment.closeto.as_slice())
            .unwrap_or_default();
        if let Some(text) = closeto.iter().find_map(|close| selector.pick(*close)) {
            return text;
        }

        self.warn(ResolutionWarning::UnmatchedSelector {
            raw: selector.raw().to_string(),
            env,
        });
        selector
            .variants()
            .first()
            .map(|variant| variant.text())
            .unwrap_or_default()
    }

    /// Look up the target of a cross-reference.
    pub(crate) fn target(&self, concept: Key) -> Target<'g> {
        let Some(found) = self.gloss.concept(concept) else {
            self.warn(ResolutionWarning::DanglingReference { concept });
            return Target::Dangling;
        };
        match self.terms(&found.term).first().copied() {
            Some(term) => Target::Term(term),
            None => Target::Unnamed,
        }
    }

    /// Name of a declared key in the bound language, or the key itself.
    pub fn name_of(&self, kind: KeyedKind, key: Key) -> String {
        self.gloss
            .keydef(kind, key)
            .and_then(|def| self.texts(&def.name).first().copied())
            .map(|text| PlainFormatter::new(self).format(text))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| key.to_string())
    }

    /// Short name of a declared key in the bound language, or the key itself.
    pub fn short_name_of(&self, kind: KeyedKind, key: Key) -> String {
        self.gloss
            .keydef(kind, key)
            .and_then(|def| self.texts(&def.shortname).first().copied())
            .map(|text| PlainFormatter::new(self).format(text))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| key.to_string())
    }

    /// Record a warning; repeated warnings are recorded once.
    pub fn warn(&self, warning: ResolutionWarning) {
        let mut warnings = self.warnings.borrow_mut();
        if warnings.contains(&warning) {
            return;
        }
        warn!(
            lang = display_opt(self.langenv.lang),
            env = display_opt(self.langenv.env);
            "{warning}"
        );
        warnings.push(warning);
    }

    /// Remove and return the warnings recorded so far.
    pub fn take_warnings(&self) -> Vec<ResolutionWarning> {
        std::mem::take(&mut *self.warnings.borrow_mut())
    }
}
