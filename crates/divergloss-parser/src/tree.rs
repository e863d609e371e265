//! Generic markup tree produced by the loader.
//!
//! The tree is transient: the model builder walks it once and drops it.

use indexmap::IndexMap;

use crate::span::Span;

/// An element with ordered attributes and mixed content.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub name: String,
    pub attrs: IndexMap<String, Attribute>,
    pub content: Vec<Content>,
    pub span: Span,
}

impl Element {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            attrs: IndexMap::new(),
            content: Vec::new(),
            span,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.get(name)
    }

    /// Child elements, skipping text.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.content.iter().filter_map(|content| match content {
            Content::Element(element) => Some(element),
            Content::Text(_) => None,
        })
    }

    /// True for an XInclude element, `<xi:include href="..."/>`.
    pub fn is_include(&self) -> bool {
        self.name
            .split_once(':')
            .is_some_and(|(_, local)| local == "include")
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Attribute {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub(crate) enum Content {
    Element(Element),
    Text(TextRun),
}

/// A run of character data, entities already expanded.
#[derive(Debug, Clone)]
pub(crate) struct TextRun {
    pub value: String,
    pub span: Span,
}

/// Attributes every element may carry without being declared for it.
pub(crate) fn is_ambient_attribute(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:") || name.starts_with("xml:")
}
