//! Document loading.
//!
//! Reads markup into a generic [`Element`] tree, dropping comments and
//! processing instructions and expanding `xi:include` elements in place.
//! Included files are resolved relative to the including file and
//! registered in the [`SourceMap`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, trace};
use quick_xml::{Reader, events::BytesStart, events::Event};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    source::SourceMap,
    span::{SourceId, Span},
    tree::{Attribute, Content, Element, TextRun},
};

/// Load the document `id` and everything it includes.
pub(crate) fn load(sources: &mut SourceMap, id: SourceId) -> Result<Element> {
    let mut loader = Loader {
        sources,
        chain: Vec::new(),
    };
    if let Some(path) = loader.sources.get(id).and_then(|file| file.path()) {
        let key = canonical(path);
        loader.chain.push(key);
    }
    loader.read(id)
}

struct Loader<'s> {
    sources: &'s mut SourceMap,
    /// Files on the current inclusion path, for cycle detection.
    chain: Vec<PathBuf>,
}

impl Loader<'_> {
    fn read(&mut self, id: SourceId) -> Result<Element> {
        let Some(file) = self.sources.get(id) else {
            return Err(Diagnostic::error("unknown source document").with_code(ErrorCode::E004));
        };
        let text = file.text().to_string();
        let base = file.path().and_then(Path::parent).map(Path::to_path_buf);
        debug!(source = file.name(); "Loading document");

        let mut reader = Reader::from_str(&text);
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let start = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|err| {
                let at = reader.error_position() as usize;
                Diagnostic::error(format!("malformed markup: {err}"))
                    .with_code(ErrorCode::E001)
                    .with_label(Span::in_source(id, at..at + 1), "here")
            })?;
            let end = reader.buffer_position() as usize;
            let span = Span::in_source(id, start..end);

            match event {
                Event::Start(tag) => {
                    open.push(self.element(&tag, &text, span)?);
                }
                Event::Empty(tag) => {
                    let element = self.element(&tag, &text, span)?;
                    self.attach(element, &mut open, &mut root, base.as_deref())?;
                }
                Event::End(_) => {
                    let Some(mut element) = open.pop() else {
                        return Err(Diagnostic::error("closing tag without an open element")
                            .with_code(ErrorCode::E001)
                            .with_label(span, "unexpected closing tag"));
                    };
                    element.span = element.span.union(span);
                    self.attach(element, &mut open, &mut root, base.as_deref())?;
                }
                Event::Text(run) => {
                    let value = run.unescape().map_err(|err| {
                        Diagnostic::error(format!("invalid character data: {err}"))
                            .with_code(ErrorCode::E002)
                            .with_label(span, "in this text")
                    })?;
                    push_text(&mut open, value.into_owned(), span)?;
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data).into_owned();
                    push_text(&mut open, value, span)?;
                }
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(Diagnostic::error(format!("element `{}` is never closed", unclosed.name))
                .with_code(ErrorCode::E001)
                .with_label(unclosed.span, "opened here"));
        }
        root.ok_or_else(|| {
            Diagnostic::error("document has no root element")
                .with_code(ErrorCode::E004)
                .with_label(Span::in_source(id, 0..0), "empty document")
        })
    }

    fn element(&self, tag: &BytesStart<'_>, text: &str, span: Span) -> Result<Element> {
        let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
        let mut element = Element::new(name, span);
        let tag_text = text.get(span.start()..span.end()).unwrap_or_default();

        for attr in tag.attributes() {
            let attr = attr.map_err(|err| {
                Diagnostic::error(format!("malformed attribute: {err}"))
                    .with_code(ErrorCode::E001)
                    .with_label(span, "in this tag")
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|err| {
                Diagnostic::error(format!("invalid value of attribute `{key}`: {err}"))
                    .with_code(ErrorCode::E002)
                    .with_label(span, "in this tag")
            })?;
            let attr_span = attribute_span(tag_text, span, &key);
            element.attrs.insert(
                key,
                Attribute {
                    value: value.into_owned(),
                    span: attr_span,
                },
            );
        }
        Ok(element)
    }

    /// Attach a completed element to its parent, or make it the root.
    fn attach(
        &mut self,
        element: Element,
        open: &mut [Element],
        root: &mut Option<Element>,
        base: Option<&Path>,
    ) -> Result<()> {
        let element = if element.is_include() {
            self.include(&element, base)?
        } else {
            element
        };

        if let Some(parent) = open.last_mut() {
            parent.content.push(Content::Element(element));
            return Ok(());
        }
        if let Some(first) = root {
            return Err(Diagnostic::error("document has more than one root element")
                .with_code(ErrorCode::E001)
                .with_label(element.span, "second root element")
                .with_secondary_label(first.span, "first root element"));
        }
        *root = Some(element);
        Ok(())
    }

    fn include(&mut self, element: &Element, base: Option<&Path>) -> Result<Element> {
        let Some(href) = element.attr("href") else {
            return Err(Diagnostic::error("inclusion without `href`")
                .with_code(ErrorCode::E003)
                .with_label(element.span, "missing `href`"));
        };
        let path = match base {
            Some(base) => base.join(&href.value),
            None => PathBuf::from(&href.value),
        };
        let key = canonical(&path);
        if self.chain.contains(&key) {
            return Err(
                Diagnostic::error(format!("`{}` includes itself", path.display()))
                    .with_code(ErrorCode::E005)
                    .with_label(href.span, "recursive inclusion"),
            );
        }

        trace!(path:? = path; "Including document");
        let text = fs::read_to_string(&path).map_err(|err| {
            Diagnostic::error(format!("cannot include `{}`: {err}", path.display()))
                .with_code(ErrorCode::E003)
                .with_label(href.span, "included here")
        })?;
        let id = self.sources.add_file(path, text);

        self.chain.push(key);
        let included = self.read(id);
        self.chain.pop();
        included
    }
}

fn push_text(open: &mut [Element], value: String, span: Span) -> Result<()> {
    match open.last_mut() {
        Some(parent) => {
            parent.content.push(Content::Text(TextRun { value, span }));
            Ok(())
        }
        None if value.trim().is_empty() => Ok(()),
        None => Err(Diagnostic::error("text outside the root element")
            .with_code(ErrorCode::E001)
            .with_label(span, "stray text")),
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Span of `key="value"` inside a start tag, or the whole tag when the
/// attribute cannot be located.
fn attribute_span(tag_text: &str, tag: Span, key: &str) -> Span {
    let mut from = 0;
    while let Some(pos) = tag_text[from..].find(key) {
        let at = from + pos;
        let after_key = at + key.len();
        let preceded = tag_text[..at].ends_with(char::is_whitespace);
        let rest = &tag_text[after_key..];
        let trimmed = rest.trim_start();
        if preceded && trimmed.starts_with('=') {
            let value = trimmed[1..].trim_start();
            let value_at = tag_text.len() - value.len();
            let end = value
                .chars()
                .next()
                .filter(|quote| *quote == '"' || *quote == '\'')
                .and_then(|quote| value[1..].find(quote).map(|len| value_at + len + 2))
                .unwrap_or(after_key);
            return Span::in_source(tag.source(), tag.start() + at..tag.start() + end);
        }
        from = after_key;
    }
    tag
}
