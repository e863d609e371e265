//! Single-page HTML view of a glossary.
//!
//! The page is bound to one pivotal language and environment. It opens
//! with the glossary title, its descriptions and a table of contents, then
//! lists every concept that has a term in the pivotal langenv, in
//! alphabetical divisions. An index of terms per language and the about
//! sections (environments, editors, sources, topics) close the page.
//! Anchors of declared items are their keys; generated section anchors
//! never shadow one.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info};

use divergloss_core::{
    Glossary, KeyedKind, NodeId,
    dset::Dset,
    gnode::{Concept, Kind, Note, Term},
    key::Key,
    text::Text,
};

use super::{Asset, Error, Exporter, Rendered, UniqueIds, output_env, output_lang, style::VIEW_STYLE};
use crate::{
    collate::{OTHER_BUCKET, SortKey, bucket, fold},
    textfmt::{
        Binding, HtmlFormatter, PlainFormatter, ResolutionWarning,
        markup::{LineAccumulator, empty_tag, escape, etag, stag, wtext},
    },
};

const INDENT: &str = "  ";

/// Columns of the index of terms when none are given.
pub const DEFAULT_INDEX_COLUMNS: usize = 4;

/// Stem of the style sheet file name when none is given.
pub const DEFAULT_ASSET_STEM: &str = "glossary";

/// Options of the glossary view.
#[derive(Debug, Clone)]
pub struct HtmlViewOptions {
    lang: Option<Key>,
    env: Option<Key>,
    no_term_olang: bool,
    no_term_oenv: bool,
    indcols: usize,
    asset_stem: String,
}

impl Default for HtmlViewOptions {
    fn default() -> Self {
        Self {
            lang: None,
            env: None,
            no_term_olang: false,
            no_term_oenv: false,
            indcols: DEFAULT_INDEX_COLUMNS,
            asset_stem: DEFAULT_ASSET_STEM.to_string(),
        }
    }
}

impl HtmlViewOptions {
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

    /// Leave out terms in the other languages.
    pub fn with_no_term_olang(mut self, skip: bool) -> Self {
        self.no_term_olang = skip;
        self
    }

    /// Leave out terms in the other environments.
    pub fn with_no_term_oenv(mut self, skip: bool) -> Self {
        self.no_term_oenv = skip;
        self
    }

    pub fn with_indcols(mut self, indcols: usize) -> Self {
        self.indcols = indcols;
        self
    }

    /// Stem of the style sheet file name the page refers to.
    pub fn with_asset_stem(mut self, stem: impl Into<String>) -> Self {
        self.asset_stem = stem.into();
        self
    }
}

/// The glossary view exporter.
///
/// # Examples
///
/// ```
/// # use divergloss::export::{Exporter, html::{HtmlView, HtmlViewOptions}};
/// let gloss = divergloss_parser::parse(
///     r#"<glossary lang="en"><keydefs><languages>
///          <language id="en"><name>English</name></language>
///        </languages></keydefs>
///        <concepts><concept id="apple">
///          <term>apple</term>
///        </concept></concepts></glossary>"#,
/// ).unwrap();
///
/// let rendered = HtmlView::new(HtmlViewOptions::default()).export(&gloss).unwrap();
/// assert!(rendered.page().contains("<div class='concept' id='apple'>"));
/// assert_eq!(rendered.assets()[0].extension(), "css");
/// ```
#[derive(Debug, Clone, Default)]
pub struct HtmlView {
    options: HtmlViewOptions,
}

impl HtmlView {
    pub fn new(options: HtmlViewOptions) -> Self {
        Self { options }
    }
}

/// A concept on the page with its pivotal terms.
struct Entry<'g> {
    concept: &'g Concept,
    terms: Vec<&'g Term>,
    bucket: String,
}

/// An alphabetical division of the concept list.
struct Division {
    alpha: String,
    id: String,
    first: usize,
}

/// An about section listing the declarations of one kind.
struct About {
    kind: KeyedKind,
    id: String,
    link: &'static str,
    title: &'static str,
}

const ABOUT: [(KeyedKind, &str, &str); 4] = [
    (KeyedKind::Environment, "environments", "About: Environments"),
    (KeyedKind::Editor, "editors", "About: Editors"),
    (KeyedKind::Source, "sources", "About: Sources"),
    (KeyedKind::Topic, "topics", "About: Topics"),
];

/// Everything the page sections share.
struct View<'v, 'g> {
    gloss: &'g Glossary,
    binding: &'v Binding<'g>,
    options: &'v HtmlViewOptions,
    /// Bindings of the other languages, in the pivotal environment
    langs: IndexMap<Key, Binding<'g>>,
    /// Bindings of the other environments, in the pivotal language
    envs: IndexMap<Key, Binding<'g>>,
    /// Environments by descending weight, then by name
    env_order: Vec<Key>,
    refbase: HashMap<Key, String>,
    anchors: HashMap<(KeyedKind, Key), String>,
}

impl Exporter for HtmlView {
    fn export(&self, gloss: &Glossary) -> Result<Rendered, Error> {
        let options = &self.options;
        let lang = output_lang(gloss, options.lang)?;
        let env = output_env(gloss, options.env)?;
        if options.indcols == 0 {
            return Err(Error::Option(
                "the index of terms needs at least one column".to_string(),
            ));
        }
        let binding = Binding::new(gloss, Some(lang), env);

        let entries = select_entries(gloss, &binding);
        let mut ids = UniqueIds::new(
            KeyedKind::ALL
                .iter()
                .flat_map(|kind| gloss.keyed(*kind).keys())
                .map(Key::to_string),
        );

        let refbase: HashMap<Key, String> = entries
            .iter()
            .map(|entry| {
                let id = entry.concept.id;
                (id, ids.issue(id.to_string(), Some(id)))
            })
            .collect();
        let mut anchors = HashMap::new();
        let abouts: Vec<About> = ABOUT
            .iter()
            .filter(|(kind, _, _)| !gloss.keyed(*kind).is_empty())
            .map(|(kind, link, title)| {
                for key in gloss.keyed(*kind).keys() {
                    anchors.insert((*kind, *key), ids.issue(key.to_string(), Some(*key)));
                }
                About {
                    kind: *kind,
                    id: ids.issue(format!("about-{link}"), None),
                    link: *link,
                    title: *title,
                }
            })
            .collect();

        let mut divisions: Vec<Division> = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            if divisions.last().is_none_or(|last| last.alpha != entry.bucket) {
                let id = ids.issue(format!("cdiv-{}", divisions.len()), None);
                divisions.push(Division {
                    alpha: entry.bucket.clone(),
                    id,
                    first: index,
                });
            }
        }
        let top_id = ids.issue("top".to_string(), None);
        let concepts_id = ids.issue("concepts".to_string(), None);
        let index_id = ids.issue("terms".to_string(), None);

        let langs: IndexMap<Key, Binding<'_>> = gloss
            .keyed(KeyedKind::Language)
            .keys()
            .filter(|other| **other != lang)
            .map(|other| (*other, Binding::new(gloss, Some(*other), env)))
            .collect();
        let envs: IndexMap<Key, Binding<'_>> = gloss
            .keyed(KeyedKind::Environment)
            .keys()
            .filter(|other| Some(**other) != env)
            .map(|other| (*other, Binding::new(gloss, Some(lang), Some(*other))))
            .collect();

        let mut view = View {
            gloss,
            binding: &binding,
            options,
            langs,
            envs,
            env_order: Vec::new(),
            refbase,
            anchors,
        };
        view.env_order = view.sorted_environments();

        let mut accl = LineAccumulator::new(INDENT);
        view.write_prologue(&mut accl);
        view.write_top(&mut accl, &top_id, &entries, &divisions, &index_id, &abouts);
        view.write_concepts(&mut accl, &concepts_id, &top_id, &entries, &divisions);
        view.write_index(&mut accl, &index_id, &top_id, &entries);
        for about in &abouts {
            view.write_about(&mut accl, about, &top_id);
        }
        accl.push(1, etag("body"));
        accl.push(0, etag("html"));

        info!(
            lang = lang.to_string(),
            concepts = entries.len(),
            about = abouts.len();
            "Rendered glossary view"
        );
        let warnings = view.take_warnings();
        Ok(Rendered::new(
            accl.finish(),
            vec![Asset::new("css", VIEW_STYLE.to_string())],
            warnings,
        ))
    }
}

/// Concepts with a term in the pivotal langenv, by their first term.
fn select_entries<'g>(gloss: &'g Glossary, binding: &Binding<'g>) -> Vec<Entry<'g>> {
    let plain = PlainFormatter::new(binding);
    let mut keyed: Vec<(SortKey, Entry<'g>)> = Vec::new();
    for (_, concept) in gloss.concepts() {
        let terms = binding.terms(&concept.term);
        let Some(first) = terms.first() else {
            debug!(concept = concept.id.to_string(); "No pivotal term, skipped");
            continue;
        };
        let first = plain.format(&first.nom);
        if first.is_empty() {
            continue;
        }
        keyed.push((
            SortKey::new(&first, concept.id, 0),
            Entry {
                concept,
                terms,
                bucket: bucket(&first),
            },
        ));
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, entry)| entry).collect()
}

fn section_header(accl: &mut LineAccumulator, top_id: &str, title: &str) {
    let href = format!("#{top_id}");
    accl.push(
        3,
        wtext(
            &wtext("[top]", "a", &[("class", "page-nav"), ("href", href.as_str())]),
            "div",
            &[("class", "page-navs")],
        ),
    );
    accl.push(3, wtext(&escape(title), "h2", &[("class", "page-subtitle")]));
}

impl<'g> View<'_, 'g> {
    fn html(&self) -> HtmlFormatter<'_, 'g> {
        HtmlFormatter::new(self.binding).with_refbase(&self.refbase)
    }

    fn paras(&self, text: &Text, class: &str) -> String {
        self.html()
            .with_wrap_tag("p")
            .with_pclass(class)
            .format(text)
    }

    fn first_text(&self, dset: &Dset) -> Option<&'g Text> {
        self.binding.texts(dset).first().copied()
    }

    /// Short name of a declared key as markup, or its name, or the key.
    fn label(&self, kind: KeyedKind, key: Key) -> String {
        self.gloss
            .keydef(kind, key)
            .and_then(|def| {
                self.first_text(&def.shortname)
                    .or_else(|| self.first_text(&def.name))
            })
            .map(|text| self.html().format(text))
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| escape(&key.to_string()))
    }

    /// Name of a declared key as markup, or the key.
    fn name(&self, kind: KeyedKind, key: Key) -> String {
        self.gloss
            .keydef(kind, key)
            .and_then(|def| self.first_text(&def.name))
            .map(|text| self.html().format(text))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| escape(&key.to_string()))
    }

    /// Link to the about entry of a declared key.
    fn about_link(&self, kind: KeyedKind, key: Key, content: &str) -> String {
        match self.anchors.get(&(kind, key)) {
            Some(anchor) => {
                let href = format!("#{anchor}");
                wtext(content, "a", &[("href", href.as_str())])
            }
            None => content.to_string(),
        }
    }

    /// Plain text of a single-text node such as an email or a URL.
    fn node_text(&self, id: Option<NodeId>) -> Option<String> {
        let text = self.gloss.node(id?).kind().text()?;
        let text = PlainFormatter::new(self.binding).format(text);
        (!text.is_empty()).then_some(text)
    }

    fn sorted_environments(&self) -> Vec<Key> {
        let mut envs: Vec<(i64, String, Key)> = self
            .gloss
            .environments()
            .map(|(key, env)| {
                let weight = env
                    .weight
                    .as_deref()
                    .and_then(|weight| weight.trim().parse::<i64>().ok())
                    .unwrap_or_default();
                (-weight, fold(&self.label(KeyedKind::Environment, key)), key)
            })
            .collect();
        envs.sort();
        envs.into_iter().map(|(_, _, key)| key).collect()
    }

    fn take_warnings(&self) -> Vec<ResolutionWarning> {
        let mut warnings = self.binding.take_warnings();
        for binding in self.langs.values().chain(self.envs.values()) {
            for warning in binding.take_warnings() {
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }
        }
        warnings
    }

    /// Glossary title with the pivotal environment, as markup.
    fn title_line(&self) -> String {
        let title = self
            .first_text(&self.gloss.meta().title)
            .map(|text| self.html().format(text))
            .or_else(|| self.gloss.meta().id.as_deref().map(escape))
            .unwrap_or_default();
        let title = wtext(&title, "span", &[("class", "page-gloss")]);
        match self.binding.env() {
            Some(env) => {
                let name = self.name(KeyedKind::Environment, env);
                format!("{title} ({})", wtext(&name, "span", &[("class", "page-env")]))
            }
            None => title,
        }
    }

    fn write_prologue(&self, accl: &mut LineAccumulator) {
        let lang = self
            .binding
            .lang()
            .map(|lang| lang.to_string())
            .unwrap_or_default();
        let href = format!("{}.css", self.options.asset_stem);
        let title = self
            .first_text(&self.gloss.meta().title)
            .map(|text| PlainFormatter::new(self.binding).format(text))
            .or_else(|| self.gloss.meta().id.clone())
            .unwrap_or_default();

        accl.push(0, "<?xml version='1.0' encoding='UTF-8'?>");
        accl.push(
            0,
            "<!DOCTYPE html PUBLIC '-//W3C//DTD XHTML 1.0 Strict//EN' \
             'http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd'>",
        );
        accl.push(0, "<!-- ===== AUTOGENERATED FILE, DO NOT EDIT ===== -->");
        accl.push(
            0,
            stag(
                "html",
                &[
                    ("xmlns", "http://www.w3.org/1999/xhtml"),
                    ("lang", lang.as_str()),
                    ("xml:lang", lang.as_str()),
                ],
            ),
        );
        accl.push(1, stag("head", &[]));
        accl.push(
            2,
            empty_tag(
                "meta",
                &[
                    ("http-equiv", "Content-type"),
                    ("content", "text/html; charset=UTF-8"),
                ],
            ),
        );
        accl.push(
            2,
            empty_tag(
                "link",
                &[("rel", "stylesheet"), ("type", "text/css"), ("href", href.as_str())],
            ),
        );
        accl.push(2, wtext(&escape(&title), "title", &[]));
        accl.push(1, etag("head"));
        accl.push(1, stag("body", &[]));
        accl.blank();
    }

    fn write_top(
        &self,
        accl: &mut LineAccumulator,
        top_id: &str,
        entries: &[Entry<'g>],
        divisions: &[Division],
        index_id: &str,
        abouts: &[About],
    ) {
        accl.push(2, stag("div", &[("class", "tpage-header"), ("id", top_id)]));
        accl.push(3, wtext(&self.title_line(), "p", &[("class", "tpage-title")]));
        accl.push(2, etag("div"));

        accl.push(2, stag("div", &[("class", "tpage-body")]));
        for desc in self.binding.texts(&self.gloss.meta().desc) {
            accl.extend(3, &self.paras(desc, "tpage-desc"));
        }

        let count = match entries.len() {
            1 => "one concept".to_string(),
            n => format!("{n} concepts"),
        };
        let summary = match self.binding.env() {
            Some(env) => format!(
                "This view of the glossary has been specialized for the <em>{}</em> \
                 environment, and contains {count}.",
                self.name(KeyedKind::Environment, env)
            ),
            None => format!("This view of the glossary contains {count}."),
        };
        accl.push(3, wtext(&summary, "p", &[]));

        accl.push(
            3,
            wtext("Table of Contents", "p", &[("class", "tpage-content-header")]),
        );
        let alphas: Vec<String> = divisions
            .iter()
            .map(|division| {
                let href = format!("#{}", division.id);
                wtext(
                    &escape(&division.alpha),
                    "a",
                    &[("class", "page-to-alpha"), ("href", href.as_str())],
                )
            })
            .collect();
        accl.push(
            3,
            wtext(
                &format!("Concepts: {}", alphas.join(" ")),
                "p",
                &[("class", "tpage-content")],
            ),
        );
        let href = format!("#{index_id}");
        accl.push(
            3,
            wtext(
                &wtext("Index of Terms", "a", &[("href", href.as_str())]),
                "p",
                &[("class", "tpage-content")],
            ),
        );
        if !abouts.is_empty() {
            let links: Vec<String> = abouts
                .iter()
                .map(|about| {
                    let href = format!("#{}", about.id);
                    wtext(about.link, "a", &[("href", href.as_str())])
                })
                .collect();
            accl.push(
                3,
                wtext(
                    &format!("About the glossary: {}", links.join(", ")),
                    "p",
                    &[("class", "tpage-content")],
                ),
            );
        }
        accl.push(2, etag("div"));
        accl.blank();
    }

    fn write_concepts(
        &self,
        accl: &mut LineAccumulator,
        concepts_id: &str,
        top_id: &str,
        entries: &[Entry<'g>],
        divisions: &[Division],
    ) {
        accl.push(2, stag("div", &[("class", "concepts"), ("id", concepts_id)]));
        section_header(accl, top_id, "Concepts");
        accl.blank();

        let mut divisions = divisions.iter().peekable();
        for (index, entry) in entries.iter().enumerate() {
            if let Some(division) = divisions.next_if(|division| division.first == index) {
                accl.push(
                    3,
                    stag("div", &[("class", "concept-div"), ("id", division.id.as_str())]),
                );
                accl.push(
                    4,
                    wtext(
                        &escape(&division.alpha),
                        "span",
                        &[("class", "concept-div-alpha")],
                    ),
                );
                accl.push(3, etag("div"));
            }

            let anchor = self
                .refbase
                .get(&entry.concept.id)
                .cloned()
                .unwrap_or_else(|| entry.concept.id.to_string());
            accl.push(3, stag("div", &[("class", "concept"), ("id", anchor.as_str())]));
            self.write_concept(accl, entry);
            accl.push(3, etag("div"));
            accl.blank();
        }

        accl.push(2, etag("div"));
        accl.blank();
    }

    fn write_concept(&self, accl: &mut LineAccumulator, entry: &Entry<'g>) {
        let concept = entry.concept;
        accl.push(4, wtext(&self.terms_line(entry), "p", &[("class", "terms")]));

        let descs = self.binding.texts(&concept.desc);
        for (index, desc) in descs.iter().enumerate() {
            let mut para = self.paras(desc, "desc-para");
            if descs.len() > 1 {
                let number = wtext(&format!("#{})", index + 1), "span", &[("class", "desc-no")]);
                para = para.replacen('>', &format!(">{number} "), 1);
            }
            accl.push(4, stag("div", &[("class", "desc")]));
            accl.extend(5, &para);
            accl.push(4, etag("div"));
        }

        if !self.options.no_term_oenv {
            if let Some(line) = self.other_env_terms(entry) {
                accl.push(4, wtext(&line, "p", &[("class", "terms-sec")]));
            }
        }
        if let Some(line) = self.details_line(concept) {
            accl.push(4, wtext(&line, "p", &[("class", "details")]));
        }
        if let Some(line) = self.related_line(concept) {
            accl.push(4, wtext(&line, "p", &[("class", "related")]));
        }
        self.write_comments(accl, entry);
    }

    /// Pivotal terms with their grammar, the terms in other languages,
    /// topics and declensions:
    /// `terms (other languages) [topics] -- declensions`.
    fn terms_line(&self, entry: &Entry<'g>) -> String {
        let terms: Vec<String> = entry
            .terms
            .iter()
            .map(|term| {
                let mut fterm = wtext(&self.html().format(&term.nom), "span", &[("class", "term-tt")]);
                if let Some(gr) = term.gr {
                    let gr = wtext(&self.label(KeyedKind::Gramm, gr), "span", &[("class", "gr")]);
                    fterm = format!("{fterm} {gr}");
                }
                fterm
            })
            .collect();
        let mut line = terms.join(", ");

        if !self.options.no_term_olang {
            let others: Vec<String> = self
                .langs
                .iter()
                .filter_map(|(lang, binding)| {
                    let terms = binding.terms(&entry.concept.term);
                    if terms.is_empty() {
                        return None;
                    }
                    let plain = PlainFormatter::new(binding);
                    let terms: Vec<String> = terms
                        .iter()
                        .map(|term| {
                            wtext(&escape(&plain.format(&term.nom)), "span", &[("class", "term-ol")])
                        })
                        .collect();
                    Some(format!(
                        "{} {}",
                        self.label(KeyedKind::Language, *lang),
                        terms.join(", ")
                    ))
                })
                .collect();
            if !others.is_empty() {
                line.push_str(&format!(" ({})", others.join("; ")));
            }
        }

        let topics: Vec<String> = entry
            .concept
            .topic
            .iter()
            .map(|topic| {
                let name = wtext(&self.label(KeyedKind::Topic, *topic), "span", &[("class", "topic")]);
                self.about_link(KeyedKind::Topic, *topic, &name)
            })
            .collect();
        if !topics.is_empty() {
            line.push_str(&format!(" [{}]", topics.join(", ")));
        }

        let decls: Vec<String> = entry
            .terms
            .iter()
            .map(|term| {
                let forms: Vec<String> = term
                    .decl
                    .iter()
                    .filter_map(|id| self.gloss.node(*id).kind().as_decl())
                    .map(|decl| {
                        let form = wtext(&self.html().format(&decl.text), "span", &[("class", "decl")]);
                        match decl.gr {
                            Some(gr) => {
                                let gr = self.label(KeyedKind::Gramm, gr);
                                format!("{} {form}", wtext(&gr, "span", &[("class", "gr")]))
                            }
                            None => form,
                        }
                    })
                    .collect();
                forms.join(", ")
            })
            .filter(|forms| !forms.is_empty())
            .collect();
        if !decls.is_empty() {
            line.push_str(&format!(" -- {}", decls.join("; ")));
        }
        line
    }

    /// Terms the concept has in the other environments, grouped by the
    /// environments using them.
    fn other_env_terms(&self, entry: &Entry<'g>) -> Option<String> {
        let plain = PlainFormatter::new(self.binding);
        let pivotal: Vec<String> = entry.terms.iter().map(|term| plain.format(&term.nom)).collect();

        let mut by_term: IndexMap<String, Vec<Key>> = IndexMap::new();
        for env in &self.env_order {
            let Some(binding) = self.envs.get(env) else {
                continue;
            };
            let plain = PlainFormatter::new(binding);
            for term in binding.terms(&entry.concept.term) {
                let nom = plain.format(&term.nom);
                if nom.is_empty() || pivotal.contains(&nom) {
                    continue;
                }
                let envs = by_term.entry(nom).or_default();
                if !envs.contains(env) {
                    envs.push(*env);
                }
            }
        }
        if by_term.is_empty() {
            return None;
        }

        // Terms of the same environments collapse into one group.
        let mut groups: Vec<(Vec<String>, Vec<Key>)> = Vec::new();
        for (nom, envs) in by_term {
            let term = wtext(&escape(&nom), "span", &[("class", "term-oe")]);
            match groups.last_mut() {
                Some((terms, last)) if *last == envs => terms.push(term),
                _ => groups.push((vec![term], envs)),
            }
        }
        let groups: Vec<String> = groups
            .into_iter()
            .map(|(terms, envs)| format!("{} ({})", terms.join(", "), self.env_list(&envs)))
            .collect();
        Some(format!("In other environments: {}", groups.join("; ")))
    }

    /// Linked environment names joined by `/`. An environment close to
    /// one listed before it is left out, and the list marked `etc.`.
    fn env_list(&self, envs: &[Key]) -> String {
        let mut links = Vec::new();
        for (index, key) in envs.iter().enumerate() {
            let Some(env) = self.gloss.environment(*key) else {
                continue;
            };
            let shadowed = envs[..index]
                .iter()
                .any(|prev| env.closeto.contains(&Some(*prev)));
            if shadowed {
                continue;
            }
            let class = if env.meta.is_some() { "env-meta" } else { "env" };
            let name = wtext(&self.label(KeyedKind::Environment, *key), "span", &[("class", class)]);
            links.push(self.about_link(KeyedKind::Environment, *key, &name));
        }
        let omitted = links.len() < envs.len();
        let list = links.join("/");
        if omitted { format!("{list} etc.") } else { list }
    }

    fn details_line(&self, concept: &Concept) -> Option<String> {
        let details: Vec<String> = self
            .binding
            .resolve(&concept.details)
            .into_iter()
            .filter_map(|id| match self.gloss.node(id).kind() {
                Kind::Details(attachment) => Some(attachment),
                _ => None,
            })
            .filter_map(|attachment| {
                let root = self.gloss.lookup(KeyedKind::Extroot, attachment.root?)?;
                let Kind::Extroot(extroot) = self.gloss.node(root).kind() else {
                    return None;
                };
                let base = self.node_text(extroot.rooturl)?;
                let link = match &attachment.rel {
                    Some(rel) => format!("{}/{rel}", base.trim_end_matches('/')),
                    None => base,
                };
                let name = match self.first_text(&extroot.def.name) {
                    Some(name) => wtext(&self.html().format(name), "span", &[("class", "detail")]),
                    None => escape(&link),
                };
                let mut detail = wtext(&name, "a", &[("class", "ext"), ("href", link.as_str())]);
                let text = self.html().format(&attachment.text);
                if !text.is_empty() {
                    detail.push_str(&format!(" ({text})"));
                }
                Some(detail)
            })
            .collect();
        (!details.is_empty()).then(|| format!("Details: {}", details.join(", ")))
    }

    fn related_line(&self, concept: &Concept) -> Option<String> {
        let related: Vec<String> = concept
            .related
            .iter()
            .filter_map(|key| {
                let anchor = self.refbase.get(key)?;
                let term = self
                    .gloss
                    .concept(*key)
                    .and_then(|related| self.binding.terms(&related.term).first().copied())?;
                let name = wtext(&self.html().format(&term.nom), "span", &[("class", "term")]);
                let href = format!("#{anchor}");
                Some(wtext(&name, "a", &[("href", href.as_str())]))
            })
            .collect();
        (!related.is_empty()).then(|| format!("See also: {}", related.join(", ")))
    }

    fn notes(&self, dset: &Dset) -> Vec<&'g Note> {
        self.binding
            .resolve(dset)
            .into_iter()
            .filter_map(|id| match self.gloss.node(id).kind() {
                Kind::Comment(note) => Some(note),
                _ => None,
            })
            .collect()
    }

    fn write_comments(&self, accl: &mut LineAccumulator, entry: &Entry<'g>) {
        let mut comments: Vec<(String, &'g Note)> = Vec::new();
        for note in self.notes(&entry.concept.comment) {
            let label = match note.by {
                Some(editor) => format!("{} on the concept:", self.editor_link(editor)),
                None => "On the concept:".to_string(),
            };
            comments.push((label, note));
        }
        for term in &entry.terms {
            let nom = wtext(&self.html().format(&term.nom), "span", &[("class", "comment-term")]);
            for note in self.notes(&term.comment) {
                let label = match note.by {
                    Some(editor) => format!("{} on {nom}:", self.editor_link(editor)),
                    None => format!("On {nom}:"),
                };
                comments.push((label, note));
            }
        }
        if comments.is_empty() {
            return;
        }

        accl.push(4, stag("div", &[("class", "comments")]));
        accl.push(5, wtext("Comments:", "p", &[("class", "comments-header")]));
        for (label, note) in comments {
            accl.push(5, stag("div", &[("class", "comment")]));
            accl.push(6, wtext(&label, "p", &[("class", "comment-label")]));
            accl.extend(6, &self.paras(&note.text, "comment-para"));
            accl.push(5, etag("div"));
        }
        accl.push(4, etag("div"));
    }

    fn editor_link(&self, editor: Key) -> String {
        self.about_link(KeyedKind::Editor, editor, &self.label(KeyedKind::Editor, editor))
    }

    /// Terms of each language with the anchors of the concepts they name,
    /// the pivotal language first and the others by name.
    fn index_terms(&self, entries: &[Entry<'g>]) -> Vec<(String, Vec<(String, Vec<String>)>)> {
        let collect = |binding: &Binding<'g>| {
            let plain = PlainFormatter::new(binding);
            let mut terms: IndexMap<String, Vec<String>> = IndexMap::new();
            for entry in entries {
                let Some(anchor) = self.refbase.get(&entry.concept.id) else {
                    continue;
                };
                for term in binding.terms(&entry.concept.term) {
                    let nom = plain.format(&term.nom);
                    if nom.is_empty() {
                        continue;
                    }
                    let anchors = terms.entry(nom).or_default();
                    if !anchors.contains(anchor) {
                        anchors.push(anchor.clone());
                    }
                }
            }
            terms
        };

        let mut pivotal = collect(self.binding);
        let mut others: Vec<(Key, IndexMap<String, Vec<String>>)> = Vec::new();
        if !self.options.no_term_olang {
            for (lang, binding) in &self.langs {
                let terms = collect(binding);
                if !terms.is_empty() {
                    others.push((*lang, terms));
                }
            }
        }

        // A pivotal term spelled and linked like one in another language
        // is listed there only.
        pivotal.retain(|nom, anchors| {
            !others
                .iter()
                .any(|(_, terms)| terms.get(nom).is_some_and(|other| other == anchors))
        });

        let sorted = |terms: IndexMap<String, Vec<String>>| {
            let mut terms: Vec<(String, Vec<String>)> = terms.into_iter().collect();
            terms.sort_by_cached_key(|(nom, _)| (fold(nom), nom.clone()));
            terms
        };
        let mut others: Vec<(String, Vec<(String, Vec<String>)>)> = others
            .into_iter()
            .map(|(lang, terms)| (self.name(KeyedKind::Language, lang), sorted(terms)))
            .collect();
        others.sort_by_cached_key(|(name, _)| fold(name));

        let mut languages = Vec::with_capacity(others.len() + 1);
        if let Some(lang) = self.binding.lang() {
            languages.push((self.name(KeyedKind::Language, lang), sorted(pivotal)));
        }
        languages.extend(others);
        languages.retain(|(_, terms)| !terms.is_empty());
        languages
    }

    fn write_index(
        &self,
        accl: &mut LineAccumulator,
        index_id: &str,
        top_id: &str,
        entries: &[Entry<'g>],
    ) {
        let languages = self.index_terms(entries);

        accl.push(2, stag("div", &[("class", "index"), ("id", index_id)]));
        section_header(accl, top_id, "Index of Terms");
        let several = languages.len() > 1;
        for (name, terms) in &languages {
            accl.push(3, stag("div", &[("class", "index-lang-sect")]));
            if several {
                accl.push(4, wtext(name, "p", &[("class", "index-lang-header")]));
            }

            let mut current: Option<String> = None;
            let mut chunk: Vec<&(String, Vec<String>)> = Vec::new();
            for term in terms {
                let alpha = bucket(&term.0);
                if alpha != OTHER_BUCKET && current.as_ref() != Some(&alpha) {
                    self.write_term_table(accl, &chunk);
                    chunk.clear();
                    accl.push(4, wtext(&escape(&alpha), "p", &[("class", "index-alpha-div")]));
                    current = Some(alpha);
                }
                chunk.push(term);
            }
            self.write_term_table(accl, &chunk);

            accl.push(3, etag("div"));
        }
        accl.push(2, etag("div"));
        accl.blank();
    }

    /// Terms laid out column by column.
    fn write_term_table(&self, accl: &mut LineAccumulator, terms: &[&(String, Vec<String>)]) {
        if terms.is_empty() {
            return;
        }
        let columns = self.options.indcols;
        let per_column = terms.len().div_ceil(columns);
        let width = format!("{}%", (100 + columns / 2) / columns);

        let mut rows: Vec<Vec<String>> = vec![Vec::new(); per_column];
        for (index, (nom, anchors)) in terms.iter().map(|term| (&term.0, &term.1)).enumerate() {
            let cell = match anchors.as_slice() {
                [anchor] => {
                    let href = format!("#{anchor}");
                    wtext(&escape(nom), "a", &[("class", "index-term"), ("href", href.as_str())])
                }
                several => {
                    let links: Vec<String> = several
                        .iter()
                        .enumerate()
                        .map(|(number, anchor)| {
                            let href = format!("#{anchor}");
                            wtext(
                                &(number + 1).to_string(),
                                "a",
                                &[("class", "index-term-refnum"), ("href", href.as_str())],
                            )
                        })
                        .collect();
                    format!("{} {}", escape(nom), links.join(" "))
                }
            };
            rows[index % per_column].push(cell);
        }

        accl.push(4, stag("div", &[("class", "index-alpha-sect")]));
        accl.push(5, stag("table", &[("class", "index-term-table")]));
        for mut cells in rows {
            cells.resize(columns, String::new());
            accl.push(6, stag("tr", &[("class", "index-term-row")]));
            for cell in cells {
                accl.push(
                    7,
                    wtext(
                        &cell,
                        "td",
                        &[("class", "index-term-cell"), ("width", width.as_str())],
                    ),
                );
            }
            accl.push(6, etag("tr"));
        }
        accl.push(5, etag("table"));
        accl.push(4, etag("div"));
    }

    fn write_about(&self, accl: &mut LineAccumulator, about: &About, top_id: &str) {
        let mut keys: Vec<Key> = if about.kind == KeyedKind::Environment {
            self.env_order.clone()
        } else {
            let mut keys: Vec<(String, Key)> = self
                .gloss
                .keyed(about.kind)
                .keys()
                .map(|key| (fold(&self.name(about.kind, *key)), *key))
                .collect();
            keys.sort();
            keys.into_iter().map(|(_, key)| key).collect()
        };
        keys.dedup();

        accl.push(2, stag("div", &[("class", "about"), ("id", about.id.as_str())]));
        section_header(accl, top_id, about.title);
        accl.blank();
        for key in keys {
            let Some(id) = self.gloss.lookup(about.kind, key) else {
                continue;
            };
            let anchor = self
                .anchors
                .get(&(about.kind, key))
                .cloned()
                .unwrap_or_else(|| key.to_string());
            accl.push(3, stag("div", &[("class", "about-entry"), ("id", anchor.as_str())]));
            self.write_about_entry(accl, self.gloss.node(id).kind(), key);
            accl.push(3, etag("div"));
            accl.blank();
        }
        accl.push(2, etag("div"));
        accl.blank();
    }

    /// Name, short name, email and web address of a declaration, its
    /// description and, for editors, the affiliation.
    fn write_about_entry(&self, accl: &mut LineAccumulator, kind: &Kind, key: Key) {
        let Some(def) = kind.keydef() else {
            return;
        };
        let meta = matches!(kind, Kind::Environment(env) if env.meta.is_some());
        let class = if meta { "about-entry-name-meta" } else { "about-entry-name" };
        let mut header = wtext(&self.name(keyed_kind(kind), key), "span", &[("class", class)]);

        if let Some(short) = self.first_text(&def.shortname) {
            let short = wtext(&self.html().format(short), "span", &[("class", "about-entry-shname")]);
            header.push_str(&format!(" (short: {short})"));
        }
        let (email, url) = match kind {
            Kind::Editor(editor) => (self.node_text(editor.email), None),
            Kind::Source(source) => (self.node_text(source.email), self.node_text(source.url)),
            _ => (None, None),
        };
        if let Some(email) = email {
            let href = format!("mailto:{email}");
            let link = wtext(&escape(&email), "a", &[("class", "email"), ("href", href.as_str())]);
            header.push_str(&format!(" &lt;{link}&gt;"));
        }
        if let Some(url) = url {
            let (text, href) = match url.find("://") {
                Some(at) => (url[at + 3..].to_string(), url.clone()),
                None => (url.clone(), format!("http://{url}")),
            };
            let link = wtext(&escape(&text), "a", &[("class", "ext"), ("href", href.as_str())]);
            header.push_str(&format!(" -- {link}"));
        }
        accl.push(4, wtext(&header, "p", &[("class", "about-entry-header")]));

        if let Some(desc) = self.first_text(&def.desc) {
            accl.extend(4, &self.paras(desc, "about-desc-para"));
        }
        if let Kind::Editor(editor) = kind {
            let affiliations: Vec<String> = self
                .binding
                .texts(&editor.affiliation)
                .into_iter()
                .map(|text| self.html().format(text))
                .collect();
            if !affiliations.is_empty() {
                accl.push(
                    4,
                    wtext(
                        &format!("Affiliation: {}", affiliations.join("; ")),
                        "p",
                        &[("class", "about-affiliation")],
                    ),
                );
            }
        }
    }
}

fn keyed_kind(kind: &Kind) -> KeyedKind {
    match kind {
        Kind::Environment(_) => KeyedKind::Environment,
        Kind::Editor(_) => KeyedKind::Editor,
        Kind::Source(_) => KeyedKind::Source,
        Kind::Language(_) => KeyedKind::Language,
        Kind::Level(_) => KeyedKind::Level,
        Kind::Gramm(_) => KeyedKind::Gramm,
        Kind::Extroot(_) => KeyedKind::Extroot,
        _ => KeyedKind::Topic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fruit;

    const STAFF: &str = r#"
        <glossary id="staff" lang="en">
          <metadata><title>Staff</title></metadata>
          <keydefs>
            <languages>
              <language id="en"><name>English</name></language>
            </languages>
            <editors>
              <editor id="ana">
                <name>Ana Ilić</name>
                <email>ana@example.org</email>
                <affiliation>Orchard Team</affiliation>
              </editor>
            </editors>
            <sources>
              <source id="atlas">
                <name>Fruit Atlas</name>
                <shortname>FA</shortname>
                <url>https://atlas.example.org</url>
              </source>
            </sources>
            <extroots>
              <extroot id="wiki">
                <name>Wiki</name>
                <rooturl>https://wiki.example.org/</rooturl>
              </extroot>
            </extroots>
          </keydefs>
          <concepts>
            <concept id="terms">
              <desc>Words naming concepts.</desc>
              <desc>Also a section of this page.</desc>
              <term>terms</term>
              <details root="wiki" rel="Terms">more</details>
              <comment by="ana">Keep it short.</comment>
            </concept>
            <concept id="top" related="terms">
              <term>top</term>
            </concept>
          </concepts>
        </glossary>
    "#;

    fn render(gloss: &Glossary, options: HtmlViewOptions) -> Rendered {
        HtmlView::new(options).export(gloss).expect("rendered")
    }

    fn ids(page: &str) -> Vec<&str> {
        page.split(" id='")
            .skip(1)
            .filter_map(|rest| rest.split('\'').next())
            .collect()
    }

    #[test]
    fn test_fruit_concepts() {
        let gloss = fruit();
        let rendered = render(&gloss, HtmlViewOptions::default());
        let page = rendered.page();

        assert!(page.contains(
            "<p class='terms'><span class='term-tt'>apple</span> <span class='gr'>noun</span> \
             (sr <span class='term-ol'>jabuka</span>) \
             [<a href='#food'><span class='topic'>Food</span></a>]</p>"
        ), "{page}");
        assert!(page.contains(
            "<p class='desc-para'>A round <a class='cref' href='#fruit'>fruit</a>.</p>"
        ));
        assert!(page.contains(
            "<p class='terms-sec'>In other environments: <span class='term-oe'>fruity</span> \
             (<a href='#slang'><span class='env'>Slang</span></a>)</p>"
        ));
        assert!(page.contains(
            "specialized for the <em>Formal</em> environment, and contains 2 concepts."
        ));
        assert!(!page.contains("<div class='concept' id='pear'>"));
        assert!(rendered.warnings().contains(&ResolutionWarning::DanglingReference {
            concept: Key::new("nothing")
        }));
    }

    #[test]
    fn test_page_links_style_sheet() {
        let gloss = fruit();
        let rendered = render(&gloss, HtmlViewOptions::default().with_asset_stem("orchard"));

        assert!(rendered.page().starts_with("<?xml version='1.0' encoding='UTF-8'?>\n"));
        assert!(rendered.page().contains(
            "<link href='orchard.css' rel='stylesheet' type='text/css'/>"
        ));
        assert!(rendered.page().contains("<title>Fruit</title>"));
        let assets = rendered.assets();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].extension(), "css");
    }

    #[test]
    fn test_alphabet_divisions_and_index() {
        let gloss = fruit();
        let page = render(&gloss, HtmlViewOptions::default().with_indcols(2)).into_page();

        assert!(page.contains("<div class='concept-div' id='cdiv-0'>"));
        assert!(page.contains("<span class='concept-div-alpha'>F</span>"));
        assert!(page.contains("<p class='index-lang-header'>English</p>"));
        assert!(page.contains("<p class='index-lang-header'>Serbian</p>"));
        assert!(page.contains("<a class='index-term' href='#apple'>jabuka</a>"));
        assert!(page.contains("<td class='index-term-cell' width='50%'>"));
        assert!(!page.contains("kruška"), "{page}");
    }

    #[test]
    fn test_other_terms_can_be_left_out() {
        let gloss = fruit();
        let options = HtmlViewOptions::default()
            .with_no_term_olang(true)
            .with_no_term_oenv(true);
        let page = render(&gloss, options).into_page();

        assert!(!page.contains("term-ol"));
        assert!(!page.contains("terms-sec"));
        assert!(!page.contains("index-lang-header"));
    }

    #[test]
    fn test_view_in_other_langenv() {
        let gloss = fruit();
        let options = HtmlViewOptions::default()
            .with_lang(Some(Key::new("sr")))
            .with_env(Some(Key::new("slang")));
        let page = render(&gloss, options).into_page();

        assert!(page.contains("<html lang='sr' xml:lang='sr' xmlns='http://www.w3.org/1999/xhtml'>"));
        assert!(page.contains("<title>Voće</title>"));
        assert!(page.contains("<div class='concept' id='pear'>"));
        assert!(page.contains("<span class='term-tt'>kruška</span>"));
    }

    #[test]
    fn test_section_ids_never_shadow_concepts() {
        let gloss = divergloss_parser::parse(STAFF).expect("valid glossary");
        let page = render(&gloss, HtmlViewOptions::default()).into_page();

        let ids = ids(&page);
        let mut unique = ids.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(ids.len(), unique.len(), "{ids:?}");

        assert!(page.contains("<div class='concept' id='terms'>"));
        assert!(page.contains("<div class='concept' id='top'>"));
        assert!(page.contains("<div class='index' id='terms-2'>"));
        assert!(page.contains("<a class='page-nav' href='#top-2'>[top]</a>"));
        assert!(page.contains(
            "<p class='related'>See also: <a href='#terms'><span class='term'>terms</span></a></p>"
        ));
    }

    #[test]
    fn test_details_comments_and_about() {
        let gloss = divergloss_parser::parse(STAFF).expect("valid glossary");
        let page = render(&gloss, HtmlViewOptions::default()).into_page();

        assert!(page.contains("<span class='desc-no'>#2)</span> Also a section"), "{page}");
        assert!(page.contains(
            "<p class='details'>Details: <a class='ext' href='https://wiki.example.org/Terms'>\
             <span class='detail'>Wiki</span></a> (more)</p>"
        ));
        assert!(page.contains(
            "<p class='comment-label'><a href='#ana'>Ana Ilić</a> on the concept:</p>"
        ));
        assert!(page.contains(
            "<span class='about-entry-name'>Ana Ilić</span> \
             &lt;<a class='email' href='mailto:ana@example.org'>ana@example.org</a>&gt;"
        ));
        assert!(page.contains("<p class='about-affiliation'>Affiliation: Orchard Team</p>"));
        assert!(page.contains(
            "(short: <span class='about-entry-shname'>FA</span>) \
             -- <a class='ext' href='https://atlas.example.org'>atlas.example.org</a>"
        ));
        assert!(page.contains("<a href='#about-editors'>editors</a>"));
        assert!(!page.contains("about-environments"));
    }

    #[test]
    fn test_bad_options_rejected() {
        let gloss = fruit();
        let view = HtmlView::new(HtmlViewOptions::default().with_indcols(0));
        assert!(matches!(view.export(&gloss), Err(Error::Option(_))));

        let view = HtmlView::new(HtmlViewOptions::default().with_env(Some(Key::new("court"))));
        assert!(matches!(view.export(&gloss), Err(Error::Option(_))));
    }
}
