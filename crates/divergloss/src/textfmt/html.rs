//! XHTML rendition of glossary text.

use std::collections::HashMap;

use divergloss_core::{
    KeyedKind,
    key::Key,
    text::{Inline, InlineKind, Selector, Text, Visitor},
};

use super::{
    Binding, Target,
    markup::{escape, etag, stag},
};

/// Elements laid out as blocks: no spaces around their tags, and a line
/// break after they close.
const BLOCKS: [&str; 5] = ["p", "ul", "ol", "li", "div"];

/// Formats text as an XHTML fragment.
///
/// Cross-references become `<a class='cref' href='#ANCHOR'>` links. With a
/// reference base, only concepts present in it are linked, to the anchor
/// it maps them to; without one, every existing concept is linked to its
/// key.
///
/// # Examples
///
/// ```
/// # use divergloss::textfmt::{Binding, HtmlFormatter};
/// # use divergloss_core::text::{Inline, InlineKind, Segment, Text};
/// # let gloss = divergloss_parser::parse("<glossary/>").unwrap();
/// let binding = Binding::with_defaults(&gloss);
/// let text = Text::new(vec![
///     Segment::literal("Tom & "),
///     Segment::Inline(Inline::new(InlineKind::Em, Text::from_literal("Jerry"))),
/// ]);
///
/// let formatter = HtmlFormatter::new(&binding).with_wrap_tag("p").with_pclass("bd-desc");
/// assert_eq!(formatter.format(&text), "<p class='bd-desc'>Tom &amp; <em>Jerry</em></p>");
/// ```
#[derive(Debug, Clone)]
pub struct HtmlFormatter<'b, 'g> {
    binding: &'b Binding<'g>,
    refbase: Option<&'b HashMap<Key, String>>,
    wrap_tag: Option<String>,
    pclass: Option<String>,
}

impl<'b, 'g> HtmlFormatter<'b, 'g> {
    pub fn new(binding: &'b Binding<'g>) -> Self {
        Self {
            binding,
            refbase: None,
            wrap_tag: None,
            pclass: None,
        }
    }

    /// Link cross-references only to the concepts in `refbase`, at the
    /// anchors it maps them to.
    pub fn with_refbase(mut self, refbase: &'b HashMap<Key, String>) -> Self {
        self.refbase = Some(refbase);
        self
    }

    /// Wrap the result in `tag`, unless it already starts with one.
    pub fn with_wrap_tag(mut self, tag: impl Into<String>) -> Self {
        self.wrap_tag = Some(tag.into());
        self
    }

    /// Class of the paragraphs, the wrapping one included.
    pub fn with_pclass(mut self, class: impl Into<String>) -> Self {
        self.pclass = Some(class.into());
        self
    }

    pub fn format(&self, text: &Text) -> String {
        let mut writer = Writer {
            formatter: self,
            out: String::new(),
            nested: false,
        };
        writer.visit_text(text);

        let html = tidy_blocks(&collapse_whitespace(&writer.out))
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        match &self.wrap_tag {
            Some(tag) if !html.is_empty() && !html.starts_with(&format!("<{tag}")) => {
                let attrs: Vec<(&str, &str)> = match (&self.pclass, tag.as_str()) {
                    (Some(class), "p") => vec![("class", class.as_str())],
                    _ => Vec::new(),
                };
                format!("{}{html}{}", stag(tag, &attrs), etag(tag))
            }
            _ => html,
        }
    }

    /// Anchor a cross-reference to `concept` links to, if any.
    fn anchor(&self, concept: Key) -> Option<String> {
        match self.refbase {
            Some(refbase) => refbase.get(&concept).cloned(),
            None => Some(concept.to_string()),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out.trim().to_string()
}

fn tidy_blocks(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let tag = &rest[start..=start + len];
        let block = is_block(tag);
        let before = &rest[..start];
        out.push_str(if block { before.trim_end() } else { before });
        out.push_str(tag);
        rest = &rest[start + len + 1..];
        if block {
            rest = rest.trim_start();
            if tag.starts_with("</") {
                out.push('\n');
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_block(tag: &str) -> bool {
    let name = tag
        .trim_start_matches(['<', '/'])
        .split([' ', '/', '>'])
        .next()
        .unwrap_or_default();
    BLOCKS.contains(&name)
}

struct Writer<'f, 'b, 'g> {
    formatter: &'f HtmlFormatter<'b, 'g>,
    out: String,
    /// Set while writing the term standing in for a cross-reference.
    nested: bool,
}

impl Writer<'_, '_, '_> {
    fn element(&mut self, name: &str, attrs: &[(&str, &str)], content: &Text) {
        self.out.push_str(&stag(name, attrs));
        self.visit_text(content);
        self.out.push_str(&etag(name));
    }

    fn reference(&mut self, concept: Key, content: &Text) {
        let binding = self.formatter.binding;
        let target = binding.target(concept);
        if let Target::Dangling = target {
            self.out.push_str(&escape(&format!("[?{concept}]")));
            return;
        }

        let href = self.formatter.anchor(concept).map(|anchor| format!("#{anchor}"));
        if let Some(href) = &href {
            self.out
                .push_str(&stag("a", &[("class", "cref"), ("href", href.as_str())]));
        }
        match target {
            Target::Term(term) if !self.nested => {
                self.nested = true;
                self.visit_text(&term.nom);
                self.nested = false;
            }
            _ => self.visit_text(content),
        }
        if href.is_some() {
            self.out.push_str(&etag("a"));
        }
    }
}

impl Visitor for Writer<'_, '_, '_> {
    fn visit_literal(&mut self, value: &str) {
        self.out.push_str(&escape(value));
    }

    fn visit_selector(&mut self, selector: &Selector) {
        let value = self.formatter.binding.select(selector);
        self.out.push_str(&escape(value));
    }

    fn visit_inline(&mut self, inline: &Inline) {
        let content = inline.content();
        match inline.kind() {
            InlineKind::Para => {
                let formatter = self.formatter;
                let attrs: Vec<(&str, &str)> = match &formatter.pclass {
                    Some(class) => vec![("class", class.as_str())],
                    None => Vec::new(),
                };
                self.element("p", &attrs, content);
            }
            InlineKind::Ref { concept } => self.reference(*concept, content),
            InlineKind::Em => self.element("em", &[], content),
            InlineKind::ForeignLang { lang, with_lang } => {
                if let (Some(lang), true) = (lang, with_lang) {
                    let short = self
                        .formatter
                        .binding
                        .short_name_of(KeyedKind::Language, *lang);
                    self.out.push_str(&escape(&short));
                    self.out.push(' ');
                }
                self.element("em", &[("class", "frlng")], content);
            }
            InlineKind::Link { url } => {
                self.element("a", &[("class", "ext"), ("href", url.as_str())], content)
            }
            InlineKind::List { ordered: true } => self.element("ol", &[], content),
            InlineKind::List { ordered: false } => self.element("ul", &[], content),
            InlineKind::Item => self.element("li", &[], content),
            InlineKind::Code => self.element("code", &[], content),
        }
    }
}
