//! PO catalog view of a glossary.
//!
//! Every concept with terms in both languages becomes one message: the
//! origin terms joined by `|` in `msgid`, the target terms in `msgstr` and
//! the concept key in `msgctxt`. Translator comments carry a description
//! and the target declensions. Messages are ordered by the first origin
//! term.

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use divergloss_core::{
    Glossary, KeyedKind,
    gnode::{Concept, Kind, NodeId, Term},
    key::Key,
};

use super::{Error, Exporter, Rendered, check_declared, output_env};
use crate::{
    collate::SortKey,
    textfmt::{Binding, PlainFormatter},
};

/// Separator of synonyms inside `msgid` and `msgstr`.
pub const SYNONYM_DELIMITER: &str = "|";

const WRAP_COLUMN: usize = 79;
const DESC_LABEL: &str = "# desc: ";
const DECL_LABEL: &str = "# decl: ";

/// Options of the PO view.
#[derive(Debug, Clone)]
pub struct PoOptions {
    olang: Key,
    tlang: Key,
    env: Option<Key>,
    condesc: bool,
}

impl PoOptions {
    pub fn new(olang: Key, tlang: Key) -> Self {
        Self {
            olang,
            tlang,
            env: None,
            condesc: false,
        }
    }

    /// Environment to render for, instead of the glossary default.
    pub fn with_env(mut self, env: Option<Key>) -> Self {
        self.env = env;
        self
    }

    /// Describe only concepts sharing a term with another concept.
    pub fn with_condesc(mut self, condesc: bool) -> Self {
        self.condesc = condesc;
        self
    }
}

/// The PO catalog exporter.
///
/// # Examples
///
/// ```
/// # use divergloss::export::{Exporter, po::{PoCatalog, PoOptions}};
/// # use divergloss_core::key::Key;
/// let gloss = divergloss_parser::parse(
///     r#"<glossary id="fruit" lang="en"><keydefs><languages>
///          <language id="en"><name>English</name></language>
///          <language id="fr"><name>French</name></language>
///        </languages></keydefs>
///        <concepts><concept id="apple">
///          <term>apple</term><term lang="fr">pomme</term>
///        </concept></concepts></glossary>"#,
/// ).unwrap();
///
/// let po = PoCatalog::new(PoOptions::new(Key::new("en"), Key::new("fr")));
/// let page = po.export(&gloss).unwrap().into_page();
/// assert!(page.ends_with("msgctxt \"apple\"\nmsgid \"apple\"\nmsgstr \"pomme\"\n"));
/// ```
#[derive(Debug, Clone)]
pub struct PoCatalog {
    options: PoOptions,
}

impl PoCatalog {
    pub fn new(options: PoOptions) -> Self {
        Self { options }
    }
}

/// A concept with its terms on both sides.
struct Message<'g> {
    concept: &'g Concept,
    oterms: Vec<&'g Term>,
    tterms: Vec<&'g Term>,
}

impl Exporter for PoCatalog {
    fn export(&self, gloss: &Glossary) -> Result<Rendered, Error> {
        let options = &self.options;
        check_declared(gloss, KeyedKind::Language, options.olang, "origin language")?;
        check_declared(gloss, KeyedKind::Language, options.tlang, "target language")?;
        let env = output_env(gloss, options.env)?;

        let origin = Binding::new(gloss, Some(options.olang), env);
        let target = Binding::new(gloss, Some(options.tlang), env);
        let onom = PlainFormatter::new(&origin);
        let tnom = PlainFormatter::new(&target);

        let mut keyed: Vec<(SortKey, Message<'_>)> = Vec::new();
        for (_, concept) in gloss.concepts() {
            let oterms = origin.terms(&concept.term);
            let tterms = target.terms(&concept.term);
            let Some(first) = oterms.first() else {
                continue;
            };
            if tterms.is_empty() {
                debug!(concept = concept.id.to_string(); "No target term, skipped");
                continue;
            }
            let sort_key = SortKey::new(&onom.format(&first.nom), concept.id, 0);
            keyed.push((
                sort_key,
                Message {
                    concept,
                    oterms,
                    tterms,
                },
            ));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        let messages: Vec<Message<'_>> = keyed.into_iter().map(|(_, message)| message).collect();
        if messages.is_empty() {
            info!(
                olang = options.olang.to_string(),
                tlang = options.tlang.to_string();
                "No concept has terms in both languages"
            );
        }

        let conflicted = if options.condesc {
            Some(conflicted(&messages, &onom, &tnom))
        } else {
            None
        };

        let mut out = header(gloss, options.olang, &target);
        for message in &messages {
            out.push('\n');
            let describe = conflicted
                .as_ref()
                .is_none_or(|conflicted| conflicted.contains(&message.concept.id));
            write_message(&mut out, gloss, message, describe, &origin, &target);
        }

        info!(
            olang = options.olang.to_string(),
            tlang = options.tlang.to_string(),
            messages = messages.len();
            "Rendered PO catalog"
        );
        let mut warnings = origin.take_warnings();
        for warning in target.take_warnings() {
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
        }
        Ok(Rendered::new(out, Vec::new(), warnings))
    }
}

/// Concepts naming a term, in either language, that another concept
/// names too.
fn conflicted(
    messages: &[Message<'_>],
    onom: &PlainFormatter<'_, '_>,
    tnom: &PlainFormatter<'_, '_>,
) -> HashSet<Key> {
    let mut by_term: HashMap<String, Vec<Key>> = HashMap::new();
    for message in messages {
        let noms = message
            .oterms
            .iter()
            .map(|term| onom.format(&term.nom))
            .chain(message.tterms.iter().map(|term| tnom.format(&term.nom)));
        for nom in noms {
            let concepts = by_term.entry(nom).or_default();
            if !concepts.contains(&message.concept.id) {
                concepts.push(message.concept.id);
            }
        }
    }
    by_term
        .into_values()
        .filter(|concepts| concepts.len() > 1)
        .flatten()
        .collect()
}

fn header(gloss: &Glossary, olang: Key, target: &Binding<'_>) -> String {
    let plain = PlainFormatter::new(target);
    let title = target
        .texts(&gloss.meta().title)
        .first()
        .map(|text| plain.format(text))
        .filter(|title| !title.is_empty())
        .or_else(|| gloss.meta().id.clone())
        .unwrap_or_default();
    let tlang = target
        .lang()
        .map(|lang| target.name_of(KeyedKind::Language, lang))
        .unwrap_or_default();
    let mut langenv = format!(
        "languages: {}->{tlang}",
        target.name_of(KeyedKind::Language, olang)
    );
    if let Some(env) = target.env() {
        langenv.push_str(&format!(
            ", environment: {}",
            target.name_of(KeyedKind::Environment, env)
        ));
    }

    let mut out = format!("# PO view of a Divergloss glossary: {title}\n");
    out.push_str(&format!("# {langenv}\n"));
    out.push_str("# ===== AUTOGENERATED FILE, DO NOT EDIT =====\n");
    out.push_str("msgid \"\"\nmsgstr \"\"\n");

    let id = gloss.meta().id.clone().unwrap_or_default();
    let mut fields = vec![format!("Project-Id-Version: {id}")];
    if let Some(date) = gloss.meta().date.and_then(|date| date_text(gloss, target, date)) {
        fields.push(format!("POT-Creation-Date: {date}"));
        fields.push(format!("PO-Revision-Date: {date}"));
    }
    fields.extend(
        [
            "Last-Translator: n/a",
            "Language-Team: n/a",
            "MIME-Version: 1.0",
            "Content-Type: text/plain; charset=UTF-8",
            "Content-Transfer-Encoding: 8bit",
        ]
        .map(str::to_string),
    );
    for field in fields {
        out.push_str(&format!("\"{}\\n\"\n", po_escape(&field)));
    }
    out
}

fn write_message<'g>(
    out: &mut String,
    gloss: &'g Glossary,
    message: &Message<'g>,
    describe: bool,
    origin: &Binding<'g>,
    target: &Binding<'g>,
) {
    if describe {
        // Target language descriptions win over origin language ones.
        let desc = target
            .texts(&message.concept.desc)
            .first()
            .map(|text| (*text, target))
            .or_else(|| {
                origin
                    .texts(&message.concept.desc)
                    .first()
                    .map(|text| (*text, origin))
            });
        if let Some((text, binding)) = desc {
            let indent = format!("#{}", " ".repeat(DESC_LABEL.len() - 1));
            let formatted = PlainFormatter::new(binding)
                .with_first_indent(DESC_LABEL)
                .with_indent(indent)
                .with_wrap(WRAP_COLUMN)
                .format(text);
            for line in formatted.lines() {
                if line.is_empty() {
                    out.push_str("#\n");
                } else {
                    out.push_str(line.trim_end());
                    out.push('\n');
                }
            }
        }
    }

    let plain = PlainFormatter::new(target);
    for term in &message.tterms {
        for decl in term
            .decl
            .iter()
            .filter_map(|id| gloss.node(*id).kind().as_decl())
        {
            let form = plain.format(&decl.text);
            let line = match decl.gr {
                Some(gr) => format!("{} {form}", target.short_name_of(KeyedKind::Gramm, gr)),
                None => form,
            };
            out.push_str(&format!("{DECL_LABEL}{line}\n"));
        }
    }

    let onom = PlainFormatter::new(origin);
    let msgid: Vec<String> = message.oterms.iter().map(|term| onom.format(&term.nom)).collect();
    let msgstr: Vec<String> = message.tterms.iter().map(|term| plain.format(&term.nom)).collect();
    out.push_str(&format!("msgctxt \"{}\"\n", po_escape(&message.concept.id.to_string())));
    out.push_str(&format!("msgid \"{}\"\n", po_escape(&msgid.join(SYNONYM_DELIMITER))));
    out.push_str(&format!("msgstr \"{}\"\n", po_escape(&msgstr.join(SYNONYM_DELIMITER))));
}

/// Escape a string for a quoted PO field.
fn po_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// The glossary date as plain text.
fn date_text(gloss: &Glossary, binding: &Binding<'_>, id: NodeId) -> Option<String> {
    match gloss.node(id).kind() {
        Kind::Date(text) => Some(PlainFormatter::new(binding).format(text)),
        _ => None,
    }
    .filter(|date| !date.is_empty())
}
