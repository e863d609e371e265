//! Plain text rendition of glossary text.

use divergloss_core::{
    KeyedKind,
    text::{Inline, InlineKind, Selector, Text, Visitor},
};

use super::{Binding, Target};

/// Line break marker used while collecting text; whitespace collapsing
/// never touches it.
const BREAK: char = '\u{4}';

/// Formats text as plain text.
///
/// Paragraphs are separated by blank lines, emphasis becomes `*em*`, a
/// foreign phrase `/phrase/` (prefixed with the language short name when
/// asked for), a link `phrase (url)`, and list items start with `- ` or
/// `N. `. Runs of whitespace collapse to one space, and lines are
/// optionally wrapped and indented.
///
/// # Examples
///
/// ```
/// # use divergloss::textfmt::{Binding, PlainFormatter};
/// # use divergloss_core::text::{Inline, InlineKind, Segment, Text};
/// # let gloss = divergloss_parser::parse("<glossary/>").unwrap();
/// let binding = Binding::with_defaults(&gloss);
/// let text = Text::new(vec![
///     Segment::literal("a  very\n long "),
///     Segment::Inline(Inline::new(InlineKind::Em, Text::from_literal("line"))),
/// ]);
///
/// let formatter = PlainFormatter::new(&binding).with_wrap(10).with_indent("  ");
/// assert_eq!(formatter.format(&text), "  a very\n  long\n  *line*");
/// ```
#[derive(Debug, Clone)]
pub struct PlainFormatter<'b, 'g> {
    binding: &'b Binding<'g>,
    wrap: Option<usize>,
    indent: String,
    first_indent: Option<String>,
    prefix: String,
    suffix: String,
}

impl<'b, 'g> PlainFormatter<'b, 'g> {
    pub fn new(binding: &'b Binding<'g>) -> Self {
        Self {
            binding,
            wrap: None,
            indent: String::new(),
            first_indent: None,
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    /// Wrap lines at `width` characters, indentation included.
    pub fn with_wrap(mut self, width: usize) -> Self {
        self.wrap = Some(width);
        self
    }

    /// Indent every line.
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Indent the first line differently from the rest.
    pub fn with_first_indent(mut self, indent: impl Into<String>) -> Self {
        self.first_indent = Some(indent.into());
        self
    }

    /// Text added before the formatted text, inside the wrapping.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Text added after the formatted text, inside the wrapping.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn format(&self, text: &Text) -> String {
        let mut writer = Writer::new(self.binding);
        writer.visit_text(text);
        let raw = format!("{}{}{}", self.prefix, writer.out, self.suffix);
        self.layout(&raw)
    }

    fn layout(&self, raw: &str) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut last_blank = true;

        for line in raw.split(BREAK) {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                if !last_blank {
                    lines.push(String::new());
                    last_blank = true;
                }
                continue;
            }
            let lead = match (&self.first_indent, lines.is_empty()) {
                (Some(first), true) => first.as_str(),
                _ => self.indent.as_str(),
            };
            match self.wrap {
                Some(width) => lines.extend(wrap_words(&words, width, lead, &self.indent)),
                None => lines.push(format!("{lead}{}", words.join(" "))),
            }
            last_blank = false;
        }

        if last_blank {
            lines.pop();
        }
        lines.join("\n")
    }
}

/// Greedy fill; a word longer than the width gets a line of its own.
fn wrap_words(words: &[&str], width: usize, first: &str, rest: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = first.to_string();
    let mut filled = false;

    for word in words {
        let len = current.chars().count() + 1 + word.chars().count();
        if filled && len > width {
            lines.push(std::mem::replace(&mut current, rest.to_string()));
            filled = false;
        }
        if filled {
            current.push(' ');
        }
        current.push_str(word);
        filled = true;
    }
    lines.push(current);
    lines
}

struct Writer<'b, 'g> {
    binding: &'b Binding<'g>,
    out: String,
    /// Set while writing the term standing in for a cross-reference.
    nested: bool,
    /// Counters of the open lists; `None` for unordered ones.
    lists: Vec<Option<usize>>,
}

impl<'b, 'g> Writer<'b, 'g> {
    fn new(binding: &'b Binding<'g>) -> Self {
        Self {
            binding,
            out: String::new(),
            nested: false,
            lists: Vec::new(),
        }
    }

    fn line_break(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with(BREAK) {
            self.out.push(BREAK);
        }
    }

    fn blank_line(&mut self) {
        self.line_break();
        self.out.push(BREAK);
    }

    fn enclosed(&mut self, open: &str, content: &Text, close: &str) {
        self.out.push_str(open);
        self.visit_text(content);
        self.out.push_str(close);
    }
}

impl Visitor for Writer<'_, '_> {
    fn visit_literal(&mut self, value: &str) {
        self.out.push_str(value);
    }

    fn visit_selector(&mut self, selector: &Selector) {
        let value = self.binding.select(selector);
        self.out.push_str(value);
    }

    fn visit_inline(&mut self, inline: &Inline) {
        let content = inline.content();
        match inline.kind() {
            InlineKind::Para => {
                if !self.out.trim().is_empty() {
                    self.blank_line();
                }
                self.visit_text(content);
                self.blank_line();
            }
            InlineKind::Ref { concept } => match self.binding.target(*concept) {
                Target::Dangling => self.out.push_str(&format!("[?{concept}]")),
                Target::Term(term) if !self.nested => {
                    self.nested = true;
                    self.visit_text(&term.nom);
                    self.nested = false;
                }
                Target::Term(_) | Target::Unnamed => self.visit_text(content),
            },
            InlineKind::Em => self.enclosed("*", content, "*"),
            InlineKind::ForeignLang { lang, with_lang } => {
                if let (Some(lang), true) = (lang, with_lang) {
                    let short = self.binding.short_name_of(KeyedKind::Language, *lang);
                    self.out.push_str(&short);
                    self.out.push(' ');
                }
                self.enclosed("/", content, "/");
            }
            InlineKind::Link { url } => {
                self.visit_text(content);
                self.out.push_str(&format!(" ({url})"));
            }
            InlineKind::List { ordered } => {
                self.line_break();
                self.lists.push(ordered.then_some(0));
                self.visit_text(content);
                self.lists.pop();
                self.blank_line();
            }
            InlineKind::Item => {
                self.line_break();
                let marker = match self.lists.last_mut() {
                    Some(Some(count)) => {
                        *count += 1;
                        format!("{count}. ")
                    }
                    _ => "- ".to_string(),
                };
                self.out.push_str(&marker);
                self.visit_text(content);
                self.out.push(BREAK);
            }
            InlineKind::Code => self.enclosed("`", content, "`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use divergloss_core::{key::Key, text::Segment};

    use super::*;
    use crate::{testing::fruit, textfmt::ResolutionWarning};

    fn inline(kind: InlineKind, content: Text) -> Segment {
        Segment::Inline(Inline::new(kind, content))
    }

    fn para(text: &str) -> Segment {
        inline(InlineKind::Para, Text::from_literal(text))
    }

    #[test]
    fn test_paragraphs_separated_by_blank_line() {
        let gloss = fruit();
        let binding = Binding::with_defaults(&gloss);
        let text = Text::new(vec![para("First  one."), para("Second\none.")]);

        assert_eq!(
            PlainFormatter::new(&binding).format(&text),
            "First one.\n\nSecond one."
        );
    }

    #[test]
    fn test_inline_markup() {
        let gloss = fruit();
        let binding = Binding::with_defaults(&gloss);
        let text = Text::new(vec![
            Segment::literal("Say "),
            inline(
                InlineKind::ForeignLang {
                    lang: Some(Key::new("sr")),
                    with_lang: true,
                },
                Text::from_literal("jabuka"),
            ),
            Segment::literal(" or "),
            inline(
                InlineKind::ForeignLang {
                    lang: Some(Key::new("sr")),
                    with_lang: false,
                },
                Text::from_literal("voće"),
            ),
            Segment::literal(", run "),
            inline(InlineKind::Code, Text::from_literal("dgproc")),
            Segment::literal(", read "),
            inline(
                InlineKind::Link {
                    url: "https://example.org".to_string(),
                },
                Text::from_literal("this"),
            ),
            Segment::literal("."),
        ]);

        assert_eq!(
            PlainFormatter::new(&binding).format(&text),
            "Say sr /jabuka/ or /voće/, run `dgproc`, read this (https://example.org)."
        );
    }

    #[test]
    fn test_lists() {
        let gloss = fruit();
        let binding = Binding::with_defaults(&gloss);
        let item = |text: &str| inline(InlineKind::Item, Text::from_literal(text));
        let text = Text::new(vec![
            Segment::literal("Kinds:"),
            inline(
                InlineKind::List { ordered: true },
                Text::new(vec![item("sweet"), item("sour")]),
            ),
            inline(
                InlineKind::List { ordered: false },
                Text::new(vec![item("red")]),
            ),
        ]);

        assert_eq!(
            PlainFormatter::new(&binding).format(&text),
            "Kinds:\n1. sweet\n2. sour\n\n- red"
        );
    }

    #[test]
    fn test_reference_uses_preferred_term() {
        let gloss = fruit();
        let en = Binding::with_defaults(&gloss);
        let apple = gloss.concept(Key::new("apple")).expect("apple");
        let desc = en.texts(&apple.desc);

        assert_eq!(PlainFormatter::new(&en).format(desc[0]), "A round fruit.");

        // no Serbian term for `fruit`: the authored content stays
        let sr = Binding::new(&gloss, Some(Key::new("sr")), Some(Key::new("formal")));
        let desc = sr.texts(&apple.desc);
        assert_eq!(PlainFormatter::new(&sr).format(desc[0]), "Okruglo voće.");
        assert!(sr.take_warnings().is_empty());
    }

    #[test]
    fn test_dangling_reference_placeholder() {
        let gloss = fruit();
        let en = Binding::with_defaults(&gloss);
        let fruit = gloss.concept(Key::new("fruit")).expect("fruit");
        let desc = en.texts(&fruit.desc);

        assert_eq!(
            PlainFormatter::new(&en).format(desc[0]),
            "Seed-bearing part, see [?nothing]."
        );
        assert_eq!(
            en.take_warnings(),
            vec![ResolutionWarning::DanglingReference {
                concept: Key::new("nothing")
            }]
        );
    }

    #[test]
    fn test_wrap_with_first_indent_and_prefix() {
        let gloss = fruit();
        let binding = Binding::with_defaults(&gloss);
        let text = Text::from_literal("one two three four five six");

        let formatter = PlainFormatter::new(&binding)
            .with_wrap(16)
            .with_first_indent("  ")
            .with_indent("     ")
            .with_prefix("1. ");
        assert_eq!(
            formatter.format(&text),
            "  1. one two\n     three four\n     five six"
        );
    }

    #[test]
    fn test_long_word_keeps_own_line() {
        let lines = wrap_words(&["a", "extraordinarily", "b"], 8, "", "");
        assert_eq!(lines, ["a", "extraordinarily", "b"]);
    }

    #[test]
    fn test_language_short_name_falls_back_to_key() {
        let gloss = fruit();
        let binding = Binding::with_defaults(&gloss);
        assert_eq!(binding.short_name_of(KeyedKind::Language, Key::new("de")), "de");
    }
}
