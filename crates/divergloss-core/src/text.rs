//! Text markup model.
//!
//! Mixed content is kept exactly as authored: an ordered sequence of
//! [`Segment`]s, each a literal run, an embedded environment [`Selector`],
//! or a typed [`Inline`] span with its own nested [`Text`]. Formatters walk
//! the tree through the [`Visitor`] trait.
//!
//! # Example
//!
//! ```
//! use divergloss_core::{
//!     key::Key,
//!     text::{Inline, InlineKind, Segment, Text},
//! };
//!
//! // Blah <ref c="fruit">fruit</ref> blah.
//! let text = Text::new(vec![
//!     Segment::literal("Blah "),
//!     Segment::Inline(Inline::new(
//!         InlineKind::Ref { concept: Key::new("fruit") },
//!         Text::from_literal("fruit"),
//!     )),
//!     Segment::literal(" blah."),
//! ]);
//! assert_eq!(text.plain(), "Blah fruit blah.");
//! ```

use crate::key::Key;

/// An ordered sequence of text segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Text {
    segments: Vec<Segment>,
}

impl Text {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Text consisting of a single literal run.
    pub fn from_literal(value: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::literal(value)],
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// True when the text holds no segments or only whitespace literals.
    pub fn is_empty(&self) -> bool {
        self.plain().trim().is_empty()
    }

    /// True when some segment, at any depth, is an embedded selector.
    pub fn has_selectors(&self) -> bool {
        self.segments.iter().any(|segment| match segment {
            Segment::Select(_) => true,
            Segment::Inline(inline) => inline.content().has_selectors(),
            Segment::Literal(_) => false,
        })
    }

    /// Concatenated literal content, ignoring all markup.
    ///
    /// Embedded selectors contribute their first variant. Useful for
    /// logging and identifiers; formatters should be used for output.
    pub fn plain(&self) -> String {
        let mut out = String::new();
        self.collect_plain(&mut out);
        out
    }

    fn collect_plain(&self, out: &mut String) {
        for segment in &self.segments {
            match segment {
                Segment::Literal(value) => out.push_str(value),
                Segment::Select(selector) => {
                    if let Some(variant) = selector.variants().first() {
                        out.push_str(variant.text());
                    }
                }
                Segment::Inline(inline) => inline.content().collect_plain(out),
            }
        }
    }
}

/// One element of a [`Text`].
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// A literal run of characters.
    Literal(String),
    /// An embedded selector choosing a string by environment.
    Select(Selector),
    /// A typed inline span.
    Inline(Inline),
}

impl Segment {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }
}

/// A typed inline span with nested content.
#[derive(Debug, Clone, PartialEq)]
pub struct Inline {
    kind: InlineKind,
    content: Text,
}

impl Inline {
    pub fn new(kind: InlineKind, content: Text) -> Self {
        Self { kind, content }
    }

    pub fn kind(&self) -> &InlineKind {
        &self.kind
    }

    pub fn content(&self) -> &Text {
        &self.content
    }
}

/// The kinds of inline markup.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineKind {
    /// A paragraph.
    Para,
    /// A cross-reference to a concept; resolved at render time.
    Ref { concept: Key },
    /// Emphasis.
    Em,
    /// A phrase in another language, optionally shown with the language name.
    ForeignLang { lang: Option<Key>, with_lang: bool },
    /// A link to an external resource.
    Link { url: String },
    /// A list of items.
    List { ordered: bool },
    /// An item of a list.
    Item,
    /// Inline code.
    Code,
}

/// An embedded environment selector, `~env1 env2:text|env3:other~`.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    variants: Vec<Variant>,
    raw: String,
}

impl Selector {
    pub fn new(variants: Vec<Variant>, raw: impl Into<String>) -> Self {
        Self {
            variants,
            raw: raw.into(),
        }
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// The selector as written, for diagnostics.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Text of the first variant listing exactly this environment.
    pub fn pick(&self, env: Option<Key>) -> Option<&str> {
        self.variants
            .iter()
            .find(|variant| variant.envs().contains(&env))
            .map(Variant::text)
    }
}

/// One `envs:text` alternative of a [`Selector`].
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    envs: Vec<Option<Key>>,
    text: String,
}

impl Variant {
    pub fn new(envs: Vec<Option<Key>>, text: impl Into<String>) -> Self {
        Self {
            envs,
            text: text.into(),
        }
    }

    pub fn envs(&self) -> &[Option<Key>] {
        &self.envs
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Traversal over the text markup tree.
///
/// Default methods recurse in document order, so an implementor only
/// overrides the segments it renders specially.
pub trait Visitor {
    /// Visit a complete text
    fn visit_text(&mut self, text: &Text) {
        for segment in text.segments() {
            self.visit_segment(segment);
        }
    }

    /// Visit one segment
    fn visit_segment(&mut self, segment: &Segment) {
        match segment {
            Segment::Literal(value) => self.visit_literal(value),
            Segment::Select(selector) => self.visit_selector(selector),
            Segment::Inline(inline) => self.visit_inline(inline),
        }
    }

    /// Visit a literal run
    fn visit_literal(&mut self, _value: &str) {}

    /// Visit an embedded selector
    fn visit_selector(&mut self, _selector: &Selector) {}

    /// Visit an inline span
    fn visit_inline(&mut self, inline: &Inline) {
        self.visit_text(inline.content());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Text {
        Text::new(vec![
            Segment::Inline(Inline::new(
                InlineKind::Para,
                Text::new(vec![
                    Segment::literal("An "),
                    Segment::Inline(Inline::new(InlineKind::Em, Text::from_literal("edible"))),
                    Segment::literal(" "),
                    Segment::Select(Selector::new(
                        vec![
                            Variant::new(vec![Some(Key::new("formal"))], "fruit"),
                            Variant::new(vec![None], "thing"),
                        ],
                        "~formal:fruit|thing~",
                    )),
                ]),
            )),
            Segment::literal("."),
        ])
    }

    #[derive(Default)]
    struct Collect {
        events: Vec<String>,
    }

    impl Visitor for Collect {
        fn visit_literal(&mut self, value: &str) {
            self.events.push(format!("lit:{value}"));
        }

        fn visit_selector(&mut self, selector: &Selector) {
            self.events.push(format!("sel:{}", selector.raw()));
        }

        fn visit_inline(&mut self, inline: &Inline) {
            self.events.push(format!("open:{:?}", inline.kind()));
            self.visit_text(inline.content());
            self.events.push("close".to_string());
        }
    }

    #[test]
    fn test_plain_flattens_markup() {
        assert_eq!(sample().plain(), "An edible fruit.");
    }

    #[test]
    fn test_visitor_document_order() {
        let mut collect = Collect::default();
        collect.visit_text(&sample());

        assert_eq!(
            collect.events,
            vec![
                "open:Para",
                "lit:An ",
                "open:Em",
                "lit:edible",
                "close",
                "lit: ",
                "sel:~formal:fruit|thing~",
                "close",
                "lit:.",
            ]
        );
    }

    #[test]
    fn test_selector_pick() {
        let text = sample();
        let Segment::Inline(para) = &text.segments()[0] else {
            panic!("expected paragraph");
        };
        let Segment::Select(selector) = &para.content().segments()[3] else {
            panic!("expected selector");
        };

        assert_eq!(selector.pick(Some(Key::new("formal"))), Some("fruit"));
        assert_eq!(selector.pick(None), Some("thing"));
        assert_eq!(selector.pick(Some(Key::new("slang"))), None);
        assert!(text.has_selectors());
    }

    #[test]
    fn test_empty_text() {
        assert!(Text::default().is_empty());
        assert!(Text::from_literal("  \n ").is_empty());
        assert!(!Text::from_literal("x").is_empty());
    }
}
