//! TBX (TermBase eXchange) export.
//!
//! Writes a MARTIF document with one `termEntry` per concept that has a
//! term in the pivotal language and environment. Entries are ordered by
//! concept key; the terms of each language go in one `langSet`, the
//! pivotal language first.

use log::info;

use divergloss_core::{Glossary, KeyedKind, dset::Dset, gnode::Concept, key::Key};

use super::{Error, Exporter, Rendered, output_env, output_lang};
use crate::textfmt::{
    Binding, PlainFormatter,
    markup::{LineAccumulator, escape, etag, stag, wtext},
};

const INDENT: &str = "  ";

/// Title used when the glossary has none in the pivotal language.
const UNNAMED: &str = "Unnamed";

/// Options of the TBX export.
#[derive(Debug, Clone, Default)]
pub struct TbxOptions {
    lang: Option<Key>,
    env: Option<Key>,
}

impl TbxOptions {
    /// Pivotal language, instead of the glossary default.
    pub fn with_lang(mut self, lang: Option<Key>) -> Self {
        self.lang = lang;
        self
    }

    /// Pivotal environment, instead of the glossary default.
    pub fn with_env(mut self, env: Option<Key>) -> Self {
        self.env = env;
        self
    }
}

/// The TBX exporter.
#[derive(Debug, Clone, Default)]
pub struct Tbx {
    options: TbxOptions,
}

impl Tbx {
    pub fn new(options: TbxOptions) -> Self {
        Self { options }
    }
}

impl Exporter for Tbx {
    fn export(&self, gloss: &Glossary) -> Result<Rendered, Error> {
        let lang = output_lang(gloss, self.options.lang)?;
        let env = output_env(gloss, self.options.env)?;
        let binding = Binding::new(gloss, Some(lang), env);

        let mut concepts: Vec<&Concept> = gloss
            .concepts()
            .map(|(_, concept)| concept)
            .filter(|concept| !binding.terms(&concept.term).is_empty())
            .collect();
        concepts.sort_by_key(|concept| concept.id);

        let mut accl = LineAccumulator::new(INDENT);
        write_prologue(&mut accl, gloss, &binding);
        accl.push(2, stag("body", &[]));
        accl.blank();
        for concept in &concepts {
            write_entry(&mut accl, gloss, concept, &binding);
            accl.blank();
        }
        accl.push(2, etag("body"));
        accl.push(1, etag("text"));
        accl.push(0, etag("martif"));

        info!(lang = lang.to_string(), entries = concepts.len(); "Rendered TBX");
        Ok(Rendered::new(accl.finish(), Vec::new(), binding.take_warnings()))
    }
}

/// First text of a d-set in the pivotal langenv, as plain text.
fn first_text(binding: &Binding<'_>, dset: &Dset) -> Option<String> {
    binding
        .texts(dset)
        .first()
        .map(|text| PlainFormatter::new(binding).format(text))
        .filter(|text| !text.is_empty())
}

fn write_prologue(accl: &mut LineAccumulator, gloss: &Glossary, binding: &Binding<'_>) {
    let lang = binding.lang().map(|lang| lang.to_string()).unwrap_or_default();

    accl.push(0, "<?xml version='1.0' encoding='UTF-8'?>");
    accl.push(
        0,
        "<!DOCTYPE martif PUBLIC 'ISO 12200:1999A//DTD MARTIF core (DXFcdV04)//EN' \
         'TBXcdv04.dtd' >",
    );
    accl.push(0, "<!-- ===== AUTOGENERATED FILE, DO NOT EDIT ===== -->");
    accl.push(0, stag("martif", &[("type", "TBX"), ("xml:lang", lang.as_str())]));

    let mut title = first_text(binding, &gloss.meta().title).unwrap_or_else(|| UNNAMED.to_string());
    let env_name = binding
        .env()
        .and_then(|env| gloss.keydef(KeyedKind::Environment, env))
        .and_then(|def| first_text(binding, &def.name));
    if let Some(env_name) = env_name {
        title = format!("{title} ({env_name})");
    }

    accl.push(1, stag("martifHeader", &[]));
    accl.push(2, stag("fileDesc", &[]));
    accl.push(3, stag("titleStmt", &[]));
    accl.push(4, wtext(&escape(&title), "title", &[]));
    accl.push(3, etag("titleStmt"));
    accl.push(2, etag("fileDesc"));
    accl.push(1, etag("martifHeader"));
    accl.push(1, stag("text", &[]));
}

fn write_entry(accl: &mut LineAccumulator, gloss: &Glossary, concept: &Concept, binding: &Binding<'_>) {
    let id = concept.id.to_string();
    accl.push(3, stag("termEntry", &[("id", id.as_str())]));

    if let Some(desc) = first_text(binding, &concept.desc) {
        accl.push(4, wtext(&escape(&desc), "descrip", &[("type", "definition")]));
    }
    for topic in &concept.topic {
        let name = gloss
            .keydef(KeyedKind::Topic, *topic)
            .and_then(|def| first_text(binding, &def.name));
        if let Some(name) = name {
            accl.push(4, wtext(&escape(&name), "descrip", &[("type", "subjectField")]));
        }
    }

    let pivotal = binding.lang();
    let mut langs: Vec<Key> = concept
        .term
        .langs(gloss)
        .into_iter()
        .flatten()
        .filter(|lang| Some(*lang) != pivotal)
        .collect();
    langs.sort();
    langs.dedup();
    if let Some(pivotal) = pivotal {
        langs.insert(0, pivotal);
    }

    for lang in langs {
        let local = Binding::new(gloss, Some(lang), binding.env());
        let terms = local.terms(&concept.term);
        if terms.is_empty() {
            continue;
        }
        let code = lang.to_string();
        accl.push(4, stag("langSet", &[("xml:lang", code.as_str())]));
        for term in terms {
            accl.push(5, stag("ntig", &[]));
            accl.push(6, stag("termGrp", &[]));
            let nom = PlainFormatter::new(&local).format(&term.nom);
            accl.push(7, wtext(&escape(&nom), "term", &[]));
            let part_of_speech = term
                .gr
                .and_then(|gr| gloss.keydef(KeyedKind::Gramm, gr))
                .and_then(|def| first_text(binding, &def.shortname));
            if let Some(part_of_speech) = part_of_speech {
                accl.push(
                    7,
                    wtext(&escape(&part_of_speech), "termNote", &[("type", "partOfSpeech")]),
                );
            }
            accl.push(6, etag("termGrp"));
            accl.push(5, etag("ntig"));
        }
        accl.push(4, etag("langSet"));
    }

    accl.push(3, etag("termEntry"));
}
