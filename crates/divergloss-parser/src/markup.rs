//! Text markup building.
//!
//! Mixed content becomes a [`Text`]: character data is split into literal
//! runs and embedded environment selectors, and the inline elements become
//! typed [`Inline`] spans. Which inline elements may nest in which follows
//! the tables below.

use divergloss_core::{
    KeyedKind,
    key::Key,
    text::{Inline, InlineKind, Segment, Selector, Text, Variant},
};

use crate::{
    builder::Builder,
    error::{Diagnostic, ErrorCode},
    span::Span,
    tree::{Content, Element, TextRun},
    validate::Reference,
};

const TOP: &[&str] = &["para", "ref", "em", "ol", "link", "list", "code"];
const PARA: &[&str] = &["ref", "em", "ol", "link", "list", "code"];
const REF: &[&str] = &["em", "ol"];
const EM: &[&str] = &["ref", "em", "ol", "link", "code"];
const OL: &[&str] = &["ref", "em", "ol"];
const LINK: &[&str] = &["em", "ol"];
const LIST: &[&str] = &["item"];
const ITEM: &[&str] = &["para", "ref", "em", "ol", "link", "code"];
const CODE: &[&str] = &[];

impl Builder {
    /// Build the mixed content of `el`.
    ///
    /// Selector variants without an environment prefix apply to
    /// `owner_env`, the environments of the node owning the text.
    pub(crate) fn build_text(&mut self, el: &Element, owner_env: &[Option<Key>]) -> Text {
        self.build_content(el, TOP, owner_env)
    }

    fn build_content(&mut self, el: &Element, allowed: &[&str], owner_env: &[Option<Key>]) -> Text {
        let mut text = Text::default();
        for content in &el.content {
            match content {
                Content::Text(run) => self.split_selectors(run, owner_env, &mut text),
                Content::Element(child) if allowed.contains(&child.name.as_str()) => {
                    if let Some(inline) = self.build_inline(child, owner_env) {
                        text.push(Segment::Inline(inline));
                    }
                }
                Content::Element(child) => self.misplaced(child, el),
            }
        }
        text
    }

    fn build_inline(&mut self, el: &Element, owner_env: &[Option<Key>]) -> Option<Inline> {
        let (kind, allowed) = match el.name.as_str() {
            "para" => {
                self.check_attributes(el, &[]);
                (InlineKind::Para, PARA)
            }
            "ref" => {
                self.check_attributes(el, &["c"]);
                let concept = Key::new(self.required_attr(el, "c")?.trim());
                (InlineKind::Ref { concept }, REF)
            }
            "em" => {
                self.check_attributes(el, &[]);
                (InlineKind::Em, EM)
            }
            "ol" => {
                self.check_attributes(el, &["lang", "wl"]);
                let lang = self.key_attr(el, "lang", KeyedKind::Language);
                let with_lang = self.flag_attr(el, "wl");
                (InlineKind::ForeignLang { lang, with_lang }, OL)
            }
            "link" => {
                self.check_attributes(el, &["url"]);
                let url = self.required_attr(el, "url")?.trim().to_string();
                (InlineKind::Link { url }, LINK)
            }
            "list" => {
                self.check_attributes(el, &["type"]);
                (InlineKind::List { ordered: self.list_type(el) }, LIST)
            }
            "item" => {
                self.check_attributes(el, &[]);
                (InlineKind::Item, ITEM)
            }
            "code" => {
                self.check_attributes(el, &[]);
                (InlineKind::Code, CODE)
            }
            _ => return None,
        };
        let content = self.build_content(el, allowed, owner_env);
        Some(Inline::new(kind, content))
    }

    /// Split character data at `~...~` selectors; `~~` stands for a tilde.
    fn split_selectors(&mut self, run: &TextRun, owner_env: &[Option<Key>], text: &mut Text) {
        let mut literal = String::new();
        let mut rest = run.value.as_str();

        while let Some(pos) = rest.find('~') {
            literal.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            if let Some(escaped) = after.strip_prefix('~') {
                literal.push('~');
                rest = escaped;
                continue;
            }
            let Some(close) = after.find('~') else {
                self.diagnostics.emit(
                    Diagnostic::warning("embedded selector is never closed")
                        .with_code(ErrorCode::E300)
                        .with_label(run.span, "unterminated `~`")
                        .with_help("close the selector with `~`, or write `~~` for a tilde"),
                );
                literal.push_str(&rest[pos..]);
                rest = "";
                break;
            };
            if !literal.is_empty() {
                text.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            let selector = self.parse_selector(&after[..close], owner_env, run.span);
            text.push(Segment::Select(selector));
            rest = &after[close + 1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            text.push(Segment::Literal(literal));
        }
    }

    /// Parse the body of `~env1 env2:text|env3:other|fallback~`.
    fn parse_selector(&mut self, body: &str, owner_env: &[Option<Key>], span: Span) -> Selector {
        let mut variants = Vec::new();
        let mut seen: Vec<Option<Key>> = Vec::new();

        for part in body.split('|') {
            let (mut envs, value) = match part.split_once(':') {
                Some((names, value)) => {
                    let envs: Vec<Option<Key>> = names
                        .split_whitespace()
                        .map(|name| {
                            let key = Key::new(name);
                            self.references.push(Reference {
                                kind: KeyedKind::Environment,
                                key,
                                attr: None,
                                span,
                            });
                            Some(key)
                        })
                        .collect();
                    (envs, value)
                }
                None => (Vec::new(), part),
            };
            if envs.is_empty() {
                envs = owner_env.to_vec();
            }

            for env in &envs {
                if seen.contains(env) {
                    self.diagnostics.emit(
                        Diagnostic::warning(format!(
                            "environment `{}` appears more than once in `~{body}~`",
                            divergloss_core::key::display_opt(*env)
                        ))
                        .with_code(ErrorCode::E301)
                        .with_label(span, "the first variant wins"),
                    );
                } else {
                    seen.push(*env);
                }
            }
            variants.push(Variant::new(envs, value));
        }

        Selector::new(variants, format!("~{body}~"))
    }

    fn required_attr<'e>(&mut self, el: &'e Element, name: &str) -> Option<&'e str> {
        match el.attr(name) {
            Some(attr) => Some(attr.value.as_str()),
            None => {
                self.diagnostics.emit(
                    Diagnostic::error(format!("`{}` requires attribute `{name}`", el.name))
                        .with_code(ErrorCode::E103)
                        .with_label(el.span, format!("missing `{name}`")),
                );
                None
            }
        }
    }

    fn flag_attr(&mut self, el: &Element, name: &str) -> bool {
        let Some(attr) = el.attr(name) else {
            return false;
        };
        match attr.value.trim() {
            "" | "1" | "yes" | "true" => true,
            "0" | "no" | "false" => false,
            other => {
                self.diagnostics.emit(
                    Diagnostic::error(format!("`{other}` is not a valid value of `{name}`"))
                        .with_code(ErrorCode::E105)
                        .with_label(attr.span, "expected `0` or `1`"),
                );
                false
            }
        }
    }

    fn list_type(&mut self, el: &Element) -> bool {
        let Some(attr) = el.attr("type") else {
            return false;
        };
        match attr.value.trim() {
            "ordered" => true,
            "unordered" => false,
            other => {
                self.diagnostics.emit(
                    Diagnostic::error(format!("`{other}` is not a list type"))
                        .with_code(ErrorCode::E105)
                        .with_label(attr.span, "expected `ordered` or `unordered`"),
                );
                false
            }
        }
    }
}
