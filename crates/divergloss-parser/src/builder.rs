//! Model building.
//!
//! This module walks the loaded element tree top-down and turns it into a
//! flat [`Glossary`]. Grouping containers (`metadata`, `keydefs` and its
//! plural wrappers, `concepts`) are flattened away; every other element
//! becomes a typed node whose language and environments are inherited
//! from the nearest ancestor unless given explicitly. Children that vary by
//! language and environment are collected into the d-sets of their owner.

use std::collections::HashMap;

use log::{debug, info, trace};

use divergloss_core::{
    Glossary, KeyedKind, NodeId,
    dset::Dset,
    gnode::{
        Attachment, Concept, Decl, Editor, Environment, Extroot, GlossaryMeta, Gnode, Keydef,
        Kind, Note, Source, Term,
    },
    key::Key,
    text::Text,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::Span,
    tree::{Content, Element, is_ambient_attribute},
    validate::Reference,
};

/// Every element name of the dialect.
const ELEMENTS: &[&str] = &[
    "glossary",
    "metadata",
    "keydefs",
    "concepts",
    "languages",
    "language",
    "environments",
    "environment",
    "editors",
    "editor",
    "sources",
    "source",
    "topics",
    "topic",
    "levels",
    "level",
    "grammar",
    "gramm",
    "extroots",
    "extroot",
    "concept",
    "term",
    "eterm",
    "nom",
    "stem",
    "decl",
    "desc",
    "ldesc",
    "origin",
    "lorigin",
    "comment",
    "lcomment",
    "details",
    "media",
    "title",
    "version",
    "date",
    "name",
    "shortname",
    "affiliation",
    "email",
    "url",
    "rooturl",
    "browseurl",
    "para",
    "ref",
    "em",
    "ol",
    "link",
    "list",
    "item",
    "code",
];

/// Plural wrappers under `keydefs`, with their member element.
const KEYDEF_GROUPS: [(&str, &str, KeyedKind); 8] = [
    ("languages", "language", KeyedKind::Language),
    ("environments", "environment", KeyedKind::Environment),
    ("editors", "editor", KeyedKind::Editor),
    ("sources", "source", KeyedKind::Source),
    ("topics", "topic", KeyedKind::Topic),
    ("levels", "level", KeyedKind::Level),
    ("grammar", "gramm", KeyedKind::Gramm),
    ("extroots", "extroot", KeyedKind::Extroot),
];

type Context = (Option<Key>, Vec<Option<Key>>);

pub(crate) struct Builder {
    gloss: Glossary,
    pub(crate) references: Vec<Reference>,
    pub(crate) diagnostics: DiagnosticCollector,
    /// Every declared identifier, shared by all keyed kinds.
    ids: HashMap<String, Span>,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            gloss: Glossary::new(GlossaryMeta::default(), None, Vec::new(), Span::default()),
            references: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
            ids: HashMap::new(),
        }
    }

    // ============================================================================
    // Main Entry Method
    // ============================================================================

    pub fn build(mut self, root: &Element) -> (Glossary, Vec<Reference>, DiagnosticCollector) {
        debug!("Building glossary model");
        if root.name != "glossary" {
            self.diagnostics.emit(
                Diagnostic::error(format!("root element is `{}`, expected `glossary`", root.name))
                    .with_code(ErrorCode::E004)
                    .with_label(root.span, "not a glossary"),
            );
            return (self.gloss, self.references, self.diagnostics);
        }

        self.check_attributes(root, &["id", "lang", "env"]);
        self.expect_no_text(root);
        let lang = self.key_attr(root, "lang", KeyedKind::Language);
        let env = self.env_attr(root).unwrap_or_default();
        let id = root.attr("id").map(|attr| {
            self.claim_id(&attr.value, attr.span);
            attr.value.clone()
        });
        let meta = GlossaryMeta {
            id,
            ..GlossaryMeta::default()
        };
        self.gloss = Glossary::new(meta, lang, env, root.span);

        for child in root.children() {
            match child.name.as_str() {
                "metadata" => self.build_metadata(child),
                "keydefs" => self.build_keydefs(child),
                "concepts" => self.build_concepts(child),
                _ => self.misplaced(child, root),
            }
        }

        info!(
            nodes = self.gloss.len(),
            references = self.references.len();
            "Glossary model built",
        );
        (self.gloss, self.references, self.diagnostics)
    }

    // ============================================================================
    // Containers
    // ============================================================================

    fn build_metadata(&mut self, el: &Element) {
        self.check_attributes(el, &[]);
        self.expect_no_text(el);
        let mut meta = std::mem::take(self.gloss.meta_mut());
        for child in el.children() {
            match child.name.as_str() {
                "title" => meta.title.push(self.build_plain(child, NodeId::ROOT, Kind::Title)),
                "desc" | "ldesc" => meta
                    .desc
                    .push(self.build_note(child, NodeId::ROOT, Kind::Desc, true)),
                "version" => meta
                    .version
                    .push(self.build_plain(child, NodeId::ROOT, Kind::Version)),
                "date" => {
                    let node = self.build_plain(child, NodeId::ROOT, Kind::Date);
                    self.set_single(&mut meta.date, node, child);
                }
                _ => self.misplaced(child, el),
            }
        }
        *self.gloss.meta_mut() = meta;
    }

    fn build_keydefs(&mut self, el: &Element) {
        self.check_attributes(el, &[]);
        self.expect_no_text(el);
        for group in el.children() {
            let Some(&(_, member, kind)) = KEYDEF_GROUPS
                .iter()
                .find(|(wrapper, _, _)| *wrapper == group.name)
            else {
                self.misplaced(group, el);
                continue;
            };
            self.check_attributes(group, &[]);
            self.expect_no_text(group);
            for child in group.children() {
                if child.name == member {
                    self.build_keydef(child, kind);
                } else {
                    self.misplaced(child, group);
                }
            }
        }
    }

    fn build_concepts(&mut self, el: &Element) {
        self.check_attributes(el, &[]);
        self.expect_no_text(el);
        for child in el.children() {
            match child.name.as_str() {
                "concept" => self.build_concept(child),
                _ => self.misplaced(child, el),
            }
        }
    }

    // ============================================================================
    // Keyed Nodes
    // ============================================================================

    fn build_keydef(&mut self, el: &Element, keyed: KeyedKind) {
        let allowed: &[&str] = match keyed {
            KeyedKind::Environment => &["id", "weight", "meta", "closeto"],
            _ => &["id"],
        };
        self.check_attributes(el, allowed);
        self.expect_no_text(el);
        let Some(key) = self.id_attr(el) else {
            return;
        };

        let def = Keydef::new(key);
        let mut kind = match keyed {
            KeyedKind::Language => Kind::Language(def),
            KeyedKind::Environment => Kind::Environment(Environment {
                def,
                weight: attr_value(el, "weight"),
                meta: attr_value(el, "meta"),
                closeto: self.closeto_attr(el),
            }),
            KeyedKind::Editor => Kind::Editor(Editor {
                def,
                affiliation: Dset::default(),
                email: None,
            }),
            KeyedKind::Source => Kind::Source(Source {
                def,
                url: None,
                email: None,
            }),
            KeyedKind::Topic => Kind::Topic(def),
            KeyedKind::Level => Kind::Level(def),
            KeyedKind::Gramm => Kind::Gramm(def),
            KeyedKind::Extroot => Kind::Extroot(Extroot {
                def,
                rooturl: None,
                browseurl: None,
            }),
            KeyedKind::Concept => Kind::Concept(Concept::new(key)),
        };

        let (lang, env) = self.inherited(NodeId::ROOT);
        let id = self.gloss.push(Gnode::new(
            kind.clone(),
            Some(NodeId::ROOT),
            lang,
            env,
            el.span,
        ));
        trace!(kind:% = keyed, key:% = key; "Building key definition");

        for child in el.children() {
            match child.name.as_str() {
                "name" => {
                    let node = self.build_plain(child, id, Kind::Name);
                    if let Some(def) = kind.keydef_mut() {
                        def.name.push(node);
                    }
                }
                "shortname" => {
                    let node = self.build_plain(child, id, Kind::Shortname);
                    if let Some(def) = kind.keydef_mut() {
                        def.shortname.push(node);
                    }
                }
                "desc" | "ldesc" => {
                    let node = self.build_note(child, id, Kind::Desc, true);
                    if let Some(def) = kind.keydef_mut() {
                        def.desc.push(node);
                    }
                }
                _ => self.build_keydef_detail(child, el, id, &mut kind),
            }
        }

        *self.gloss.node_mut(id).kind_mut() = kind;
        self.gloss.insert_keyed(keyed, key, id);
    }

    /// Children only some keyed kinds have: contact data and addresses.
    fn build_keydef_detail(&mut self, child: &Element, el: &Element, id: NodeId, kind: &mut Kind) {
        match (child.name.as_str(), kind) {
            ("affiliation", Kind::Editor(editor)) => {
                editor
                    .affiliation
                    .push(self.build_plain(child, id, Kind::Affiliation));
            }
            ("email", Kind::Editor(Editor { email, .. }))
            | ("email", Kind::Source(Source { email, .. })) => {
                let node = self.build_plain(child, id, Kind::Email);
                self.set_single(email, node, child);
            }
            ("url", Kind::Source(source)) => {
                let node = self.build_plain(child, id, Kind::Url);
                self.set_single(&mut source.url, node, child);
            }
            ("rooturl", Kind::Extroot(extroot)) => {
                let node = self.build_plain(child, id, Kind::RootUrl);
                self.set_single(&mut extroot.rooturl, node, child);
            }
            ("browseurl", Kind::Extroot(extroot)) => {
                let node = self.build_plain(child, id, Kind::BrowseUrl);
                self.set_single(&mut extroot.browseurl, node, child);
            }
            _ => self.misplaced(child, el),
        }
    }

    fn build_concept(&mut self, el: &Element) {
        self.check_attributes(el, &["id", "topic", "level", "related"]);
        self.expect_no_text(el);
        let Some(key) = self.id_attr(el) else {
            return;
        };

        let mut concept = Concept::new(key);
        concept.topic = self.keys_attr(el, "topic", KeyedKind::Topic);
        concept.level = self.keys_attr(el, "level", KeyedKind::Level);
        concept.related = self.keys_attr(el, "related", KeyedKind::Concept);

        let (lang, env) = self.inherited(NodeId::ROOT);
        let id = self.gloss.push(Gnode::new(
            Kind::Concept(concept.clone()),
            Some(NodeId::ROOT),
            lang,
            env,
            el.span,
        ));
        trace!(concept:% = key; "Building concept");

        for child in el.children() {
            match child.name.as_str() {
                "desc" | "ldesc" => concept.desc.push(self.build_note(child, id, Kind::Desc, true)),
                "term" => concept.term.push(self.build_term(child, id)),
                "eterm" => concept.term.push(self.build_eterm(child, id)),
                "details" => concept
                    .details
                    .push(self.build_attachment(child, id, Kind::Details)),
                "media" => concept
                    .media
                    .push(self.build_attachment(child, id, Kind::Media)),
                "origin" | "lorigin" => concept
                    .origin
                    .push(self.build_note(child, id, Kind::Origin, true)),
                "comment" | "lcomment" => concept
                    .comment
                    .push(self.build_note(child, id, Kind::Comment, false)),
                _ => self.misplaced(child, el),
            }
        }

        *self.gloss.node_mut(id).kind_mut() = Kind::Concept(concept);
        self.gloss.insert_keyed(KeyedKind::Concept, key, id);
    }

    // ============================================================================
    // Terms
    // ============================================================================

    /// `<term>nominal form</term>`
    fn build_term(&mut self, el: &Element, parent: NodeId) -> NodeId {
        self.check_attributes(el, &["lang", "env", "by", "src", "gr"]);
        let (lang, env) = self.context(el, parent);
        let mut term = self.term_attrs(el);
        term.nom = self.build_text(el, &env);
        self.gloss
            .push(Gnode::new(Kind::Term(term), Some(parent), lang, env, el.span))
    }

    /// `<eterm><nom>..</nom><stem>..</stem><decl>..</decl>...</eterm>`
    fn build_eterm(&mut self, el: &Element, parent: NodeId) -> NodeId {
        self.check_attributes(el, &["lang", "env", "by", "src", "gr"]);
        self.expect_no_text(el);
        let (lang, env) = self.context(el, parent);
        let mut term = self.term_attrs(el);
        let id = self.gloss.push(Gnode::new(
            Kind::Term(term.clone()),
            Some(parent),
            lang,
            env.clone(),
            el.span,
        ));

        let mut nom_span: Option<Span> = None;
        let mut stem_span: Option<Span> = None;
        for child in el.children() {
            match child.name.as_str() {
                "nom" => {
                    self.check_attributes(child, &[]);
                    let text = self.build_text(child, &env);
                    if self.first_of(&mut nom_span, child) {
                        term.nom = text;
                    }
                }
                "stem" => {
                    self.check_attributes(child, &[]);
                    let text = self.build_text(child, &env);
                    if self.first_of(&mut stem_span, child) {
                        term.stem = Some(text);
                    }
                }
                "decl" => term.decl.push(self.build_decl(child, id)),
                "origin" | "lorigin" => term.origin.push(self.build_note(child, id, Kind::Origin, true)),
                "comment" | "lcomment" => {
                    term.comment
                        .push(self.build_note(child, id, Kind::Comment, false));
                }
                _ => self.misplaced(child, el),
            }
        }

        if nom_span.is_none() {
            self.diagnostics.emit(
                Diagnostic::error("`eterm` has no `nom` child")
                    .with_code(ErrorCode::E108)
                    .with_label(el.span, "missing nominal form")
                    .with_help("give the nominal form in <nom>...</nom>"),
            );
        }

        *self.gloss.node_mut(id).kind_mut() = Kind::Term(term);
        id
    }

    fn term_attrs(&mut self, el: &Element) -> Term {
        Term {
            by: self.key_attr(el, "by", KeyedKind::Editor),
            src: self.key_attr(el, "src", KeyedKind::Source),
            gr: self.key_attr(el, "gr", KeyedKind::Gramm),
            ..Term::default()
        }
    }

    fn build_decl(&mut self, el: &Element, parent: NodeId) -> NodeId {
        self.check_attributes(el, &["lang", "env", "gr"]);
        let (lang, env) = self.context(el, parent);
        let gr = self.key_attr(el, "gr", KeyedKind::Gramm);
        let text = self.build_text(el, &env);
        self.gloss.push(Gnode::new(
            Kind::Decl(Decl { gr, text }),
            Some(parent),
            lang,
            env,
            el.span,
        ))
    }

    // ============================================================================
    // Text-bearing Nodes
    // ============================================================================

    /// Elements holding only text: titles, names, addresses and the like.
    fn build_plain(&mut self, el: &Element, parent: NodeId, kind: fn(Text) -> Kind) -> NodeId {
        self.check_attributes(el, &["lang", "env"]);
        let (lang, env) = self.context(el, parent);
        let text = self.build_text(el, &env);
        self.gloss
            .push(Gnode::new(kind(text), Some(parent), lang, env, el.span))
    }

    /// Descriptions, origins and comments; comments take no source.
    fn build_note(
        &mut self,
        el: &Element,
        parent: NodeId,
        kind: fn(Note) -> Kind,
        with_src: bool,
    ) -> NodeId {
        let allowed: &[&str] = if with_src {
            &["lang", "env", "by", "src"]
        } else {
            &["lang", "env", "by"]
        };
        self.check_attributes(el, allowed);
        let (lang, env) = self.context(el, parent);
        let note = Note {
            by: self.key_attr(el, "by", KeyedKind::Editor),
            src: self.key_attr(el, "src", KeyedKind::Source),
            text: self.build_text(el, &env),
        };
        self.gloss
            .push(Gnode::new(kind(note), Some(parent), lang, env, el.span))
    }

    fn build_attachment(
        &mut self,
        el: &Element,
        parent: NodeId,
        kind: fn(Attachment) -> Kind,
    ) -> NodeId {
        self.check_attributes(el, &["lang", "env", "by", "root", "rel"]);
        let (lang, env) = self.context(el, parent);
        let attachment = Attachment {
            by: self.key_attr(el, "by", KeyedKind::Editor),
            root: self.key_attr(el, "root", KeyedKind::Extroot),
            rel: attr_value(el, "rel"),
            text: self.build_text(el, &env),
        };
        self.gloss
            .push(Gnode::new(kind(attachment), Some(parent), lang, env, el.span))
    }

    // ============================================================================
    // Context and Attributes
    // ============================================================================

    fn inherited(&self, parent: NodeId) -> Context {
        let node = self.gloss.node(parent);
        (node.lang(), node.env().to_vec())
    }

    /// Language and environments of `el`: explicit attributes replace the
    /// values inherited from `parent`.
    fn context(&mut self, el: &Element, parent: NodeId) -> Context {
        let (lang, env) = self.inherited(parent);
        let lang = if el.attr("lang").is_some() {
            self.key_attr(el, "lang", KeyedKind::Language)
        } else {
            lang
        };
        let env = self.env_attr(el).unwrap_or(env);
        (lang, env)
    }

    fn env_attr(&mut self, el: &Element) -> Option<Vec<Option<Key>>> {
        el.attr("env")?;
        Some(
            self.keys_attr(el, "env", KeyedKind::Environment)
                .into_iter()
                .map(Some)
                .collect(),
        )
    }

    /// The `closeto` list of an environment, terminated by "no environment".
    fn closeto_attr(&mut self, el: &Element) -> Vec<Option<Key>> {
        let mut closeto: Vec<Option<Key>> = self
            .keys_attr(el, "closeto", KeyedKind::Environment)
            .into_iter()
            .map(Some)
            .collect();
        closeto.push(None);
        closeto
    }

    /// A single key; the key is recorded for the reference check.
    pub(crate) fn key_attr(&mut self, el: &Element, name: &'static str, kind: KeyedKind) -> Option<Key> {
        let attr = el.attr(name)?;
        let value = attr.value.trim();
        if value.is_empty() {
            return None;
        }
        if value.contains(char::is_whitespace) {
            self.diagnostics.emit(
                Diagnostic::error(format!("attribute `{name}` takes a single {kind} key"))
                    .with_code(ErrorCode::E105)
                    .with_label(attr.span, "several keys given"),
            );
            return None;
        }
        let key = Key::new(value);
        self.references.push(Reference {
            kind,
            key,
            attr: Some(name),
            span: attr.span,
        });
        Some(key)
    }

    /// A whitespace-separated list of keys, each recorded for the check.
    fn keys_attr(&mut self, el: &Element, name: &'static str, kind: KeyedKind) -> Vec<Key> {
        let Some(attr) = el.attr(name) else {
            return Vec::new();
        };
        let keys: Vec<Key> = attr.value.split_whitespace().map(Key::new).collect();
        self.references.extend(keys.iter().map(|key| Reference {
            kind,
            key: *key,
            attr: Some(name),
            span: attr.span,
        }));
        keys
    }

    /// The declared identifier of a keyed element.
    fn id_attr(&mut self, el: &Element) -> Option<Key> {
        let Some(attr) = el.attr("id") else {
            self.diagnostics.emit(
                Diagnostic::error(format!("`{}` has no `id` attribute", el.name))
                    .with_code(ErrorCode::E103)
                    .with_label(el.span, "missing `id`"),
            );
            return None;
        };
        let value = attr.value.trim();
        if value.is_empty() || value.contains(char::is_whitespace) {
            self.diagnostics.emit(
                Diagnostic::error(format!("invalid identifier `{}`", attr.value))
                    .with_code(ErrorCode::E105)
                    .with_label(attr.span, "identifiers are single words"),
            );
            return None;
        }
        self.claim_id(value, attr.span);
        Some(Key::new(value))
    }

    fn claim_id(&mut self, value: &str, span: Span) {
        if let Some(first) = self.ids.get(value) {
            self.diagnostics.emit(
                Diagnostic::error(format!("identifier `{value}` is declared multiple times"))
                    .with_code(ErrorCode::E104)
                    .with_label(span, "duplicate declaration")
                    .with_secondary_label(*first, "first declared here")
                    .with_help("identifiers must be unique across the whole glossary"),
            );
            return;
        }
        self.ids.insert(value.to_string(), span);
    }

    /// Fail elements carrying attributes outside `allowed`.
    pub(crate) fn check_attributes(&mut self, el: &Element, allowed: &[&str]) {
        for (name, attr) in &el.attrs {
            if allowed.contains(&name.as_str()) || is_ambient_attribute(name) {
                continue;
            }
            let mut diag = Diagnostic::error(format!(
                "unknown attribute `{name}` on `{}`",
                el.name
            ))
            .with_code(ErrorCode::E101)
            .with_label(attr.span, "unknown attribute");
            if !allowed.is_empty() {
                diag = diag.with_help(format!("`{}` accepts: {}", el.name, allowed.join(", ")));
            }
            self.diagnostics.emit(diag);
        }
    }

    // ============================================================================
    // Structure Checks
    // ============================================================================

    fn expect_no_text(&mut self, el: &Element) {
        for content in &el.content {
            let Content::Text(run) = content else {
                continue;
            };
            if !run.value.trim().is_empty() {
                self.diagnostics.emit(
                    Diagnostic::error(format!("`{}` cannot contain text", el.name))
                        .with_code(ErrorCode::E107)
                        .with_label(run.span, "unexpected text"),
                );
            }
        }
    }

    /// Report a child that is not allowed where it appears.
    pub(crate) fn misplaced(&mut self, child: &Element, parent: &Element) {
        let diag = if ELEMENTS.contains(&child.name.as_str()) {
            Diagnostic::error(format!(
                "`{}` is not allowed inside `{}`",
                child.name, parent.name
            ))
            .with_code(ErrorCode::E102)
            .with_label(child.span, "misplaced element")
        } else {
            Diagnostic::error(format!("unknown element `{}`", child.name))
                .with_code(ErrorCode::E100)
                .with_label(child.span, "not a Divergloss element")
        };
        self.diagnostics.emit(diag);
    }

    fn set_single(&mut self, slot: &mut Option<NodeId>, node: NodeId, el: &Element) {
        match slot {
            Some(first) => {
                let first_span = self.gloss.node(*first).span();
                self.repeated(el, first_span);
            }
            None => *slot = Some(node),
        }
    }

    /// Record the first occurrence of a single child; false on repeats.
    fn first_of(&mut self, seen: &mut Option<Span>, el: &Element) -> bool {
        match seen {
            Some(first) => {
                let first = *first;
                self.repeated(el, first);
                false
            }
            None => {
                *seen = Some(el.span);
                true
            }
        }
    }

    fn repeated(&mut self, el: &Element, first: Span) {
        self.diagnostics.emit(
            Diagnostic::error(format!("`{}` may appear only once here", el.name))
                .with_code(ErrorCode::E106)
                .with_label(el.span, "repeated")
                .with_secondary_label(first, "first given here"),
        );
    }
}

fn attr_value(el: &Element, name: &str) -> Option<String> {
    el.attr(name).map(|attr| attr.value.clone())
}
