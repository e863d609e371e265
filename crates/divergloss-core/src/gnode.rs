//! Typed glossary nodes.
//!
//! Every element kind of the Divergloss dialect maps to one variant of
//! [`Kind`]. The fields shared by all kinds (parent handle, inherited
//! language and environments, source span) live on [`Gnode`]. Nodes are
//! stored in the arena owned by [`Glossary`](crate::Glossary) and refer to
//! each other through [`NodeId`] handles, so a parent link never owns
//! anything.
//!
//! Optional attributes and children are always present on the payload
//! structs: `None` for scalars, empty vectors and d-sets for sequences.

use crate::{dset::Dset, key::Key, span::Span, text::Text};

/// Handle of a node in the glossary arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The glossary root is always the first node.
    pub const ROOT: NodeId = NodeId(0);

    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A typed glossary node.
#[derive(Debug, Clone)]
pub struct Gnode {
    kind: Kind,
    parent: Option<NodeId>,
    lang: Option<Key>,
    env: Vec<Option<Key>>,
    span: Span,
}

impl Gnode {
    /// Creates a node.
    ///
    /// An empty environment list is normalized to "no environment", so
    /// [`env`](Self::env) is never empty.
    pub fn new(
        kind: Kind,
        parent: Option<NodeId>,
        lang: Option<Key>,
        mut env: Vec<Option<Key>>,
        span: Span,
    ) -> Self {
        if env.is_empty() {
            env.push(None);
        }
        Self {
            kind,
            parent,
            lang,
            env,
            span,
        }
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Mutable access to the payload, used while building.
    pub fn kind_mut(&mut self) -> &mut Kind {
        &mut self.kind
    }

    /// The enclosing node; `None` only for the glossary root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Language of this node, inherited when not set on the element.
    pub fn lang(&self) -> Option<Key> {
        self.lang
    }

    /// Environments of this node, inherited when not set on the element.
    pub fn env(&self) -> &[Option<Key>] {
        &self.env
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// Payload of a node, one variant per element kind.
#[derive(Debug, Clone)]
pub enum Kind {
    Glossary(GlossaryMeta),
    Language(Keydef),
    Environment(Environment),
    Editor(Editor),
    Source(Source),
    Topic(Keydef),
    Level(Keydef),
    Gramm(Keydef),
    Extroot(Extroot),
    Concept(Concept),
    Term(Term),
    Desc(Note),
    Origin(Note),
    Comment(Note),
    Details(Attachment),
    Media(Attachment),
    Decl(Decl),
    Title(Text),
    Version(Text),
    Name(Text),
    Shortname(Text),
    Affiliation(Text),
    Date(Text),
    Email(Text),
    Url(Text),
    RootUrl(Text),
    BrowseUrl(Text),
}

impl Kind {
    /// The element name this kind is read from.
    ///
    /// Dual elements report their short name (`desc` for `ldesc`, `term`
    /// for `eterm`, ...).
    pub fn element_name(&self) -> &'static str {
        match self {
            Kind::Glossary(_) => "glossary",
            Kind::Language(_) => "language",
            Kind::Environment(_) => "environment",
            Kind::Editor(_) => "editor",
            Kind::Source(_) => "source",
            Kind::Topic(_) => "topic",
            Kind::Level(_) => "level",
            Kind::Gramm(_) => "gramm",
            Kind::Extroot(_) => "extroot",
            Kind::Concept(_) => "concept",
            Kind::Term(_) => "term",
            Kind::Desc(_) => "desc",
            Kind::Origin(_) => "origin",
            Kind::Comment(_) => "comment",
            Kind::Details(_) => "details",
            Kind::Media(_) => "media",
            Kind::Decl(_) => "decl",
            Kind::Title(_) => "title",
            Kind::Version(_) => "version",
            Kind::Name(_) => "name",
            Kind::Shortname(_) => "shortname",
            Kind::Affiliation(_) => "affiliation",
            Kind::Date(_) => "date",
            Kind::Email(_) => "email",
            Kind::Url(_) => "url",
            Kind::RootUrl(_) => "rooturl",
            Kind::BrowseUrl(_) => "browseurl",
        }
    }

    /// The identity block of key-declaring kinds.
    pub fn keydef(&self) -> Option<&Keydef> {
        match self {
            Kind::Language(def) | Kind::Topic(def) | Kind::Level(def) | Kind::Gramm(def) => {
                Some(def)
            }
            Kind::Environment(env) => Some(&env.def),
            Kind::Editor(editor) => Some(&editor.def),
            Kind::Source(source) => Some(&source.def),
            Kind::Extroot(extroot) => Some(&extroot.def),
            _ => None,
        }
    }

    pub fn keydef_mut(&mut self) -> Option<&mut Keydef> {
        match self {
            Kind::Language(def) | Kind::Topic(def) | Kind::Level(def) | Kind::Gramm(def) => {
                Some(def)
            }
            Kind::Environment(env) => Some(&mut env.def),
            Kind::Editor(editor) => Some(&mut editor.def),
            Kind::Source(source) => Some(&mut source.def),
            Kind::Extroot(extroot) => Some(&mut extroot.def),
            _ => None,
        }
    }

    /// The text carried by text-bearing kinds.
    pub fn text(&self) -> Option<&Text> {
        match self {
            Kind::Desc(note) | Kind::Origin(note) | Kind::Comment(note) => Some(&note.text),
            Kind::Details(att) | Kind::Media(att) => Some(&att.text),
            Kind::Decl(decl) => Some(&decl.text),
            Kind::Title(text)
            | Kind::Version(text)
            | Kind::Name(text)
            | Kind::Shortname(text)
            | Kind::Affiliation(text)
            | Kind::Date(text)
            | Kind::Email(text)
            | Kind::Url(text)
            | Kind::RootUrl(text)
            | Kind::BrowseUrl(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_glossary(&self) -> Option<&GlossaryMeta> {
        match self {
            Kind::Glossary(meta) => Some(meta),
            _ => None,
        }
    }

    pub fn as_glossary_mut(&mut self) -> Option<&mut GlossaryMeta> {
        match self {
            Kind::Glossary(meta) => Some(meta),
            _ => None,
        }
    }

    pub fn as_environment(&self) -> Option<&Environment> {
        match self {
            Kind::Environment(env) => Some(env),
            _ => None,
        }
    }

    pub fn as_concept(&self) -> Option<&Concept> {
        match self {
            Kind::Concept(concept) => Some(concept),
            _ => None,
        }
    }

    pub fn as_concept_mut(&mut self) -> Option<&mut Concept> {
        match self {
            Kind::Concept(concept) => Some(concept),
            _ => None,
        }
    }

    pub fn as_term(&self) -> Option<&Term> {
        match self {
            Kind::Term(term) => Some(term),
            _ => None,
        }
    }

    pub fn as_term_mut(&mut self) -> Option<&mut Term> {
        match self {
            Kind::Term(term) => Some(term),
            _ => None,
        }
    }

    pub fn as_decl(&self) -> Option<&Decl> {
        match self {
            Kind::Decl(decl) => Some(decl),
            _ => None,
        }
    }
}

/// Root metadata: the flattened content of `<metadata>`.
#[derive(Debug, Clone, Default)]
pub struct GlossaryMeta {
    pub id: Option<String>,
    pub title: Dset,
    pub desc: Dset,
    pub version: Dset,
    pub date: Option<NodeId>,
}

/// Identity and naming shared by every key-declaring kind.
#[derive(Debug, Clone)]
pub struct Keydef {
    pub id: Key,
    pub name: Dset,
    pub shortname: Dset,
    pub desc: Dset,
}

impl Keydef {
    pub fn new(id: Key) -> Self {
        Self {
            id,
            name: Dset::default(),
            shortname: Dset::default(),
            desc: Dset::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Environment {
    pub def: Keydef,
    pub weight: Option<String>,
    pub meta: Option<String>,
    /// Environments to fall back to, in order, always ending with `None`.
    pub closeto: Vec<Option<Key>>,
}

#[derive(Debug, Clone)]
pub struct Editor {
    pub def: Keydef,
    pub affiliation: Dset,
    pub email: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Source {
    pub def: Keydef,
    pub url: Option<NodeId>,
    pub email: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Extroot {
    pub def: Keydef,
    pub rooturl: Option<NodeId>,
    pub browseurl: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Concept {
    pub id: Key,
    pub topic: Vec<Key>,
    pub level: Vec<Key>,
    pub related: Vec<Key>,
    pub desc: Dset,
    pub term: Dset,
    pub details: Dset,
    pub media: Dset,
    pub origin: Dset,
    pub comment: Dset,
}

impl Concept {
    pub fn new(id: Key) -> Self {
        Self {
            id,
            topic: Vec::new(),
            level: Vec::new(),
            related: Vec::new(),
            desc: Dset::default(),
            term: Dset::default(),
            details: Dset::default(),
            media: Dset::default(),
            origin: Dset::default(),
            comment: Dset::default(),
        }
    }
}

/// A term; `<term>text</term>` and `<eterm><nom>text</nom>...</eterm>`
/// both produce one with the nominal form in [`nom`](Self::nom).
#[derive(Debug, Clone, Default)]
pub struct Term {
    pub by: Option<Key>,
    pub src: Option<Key>,
    pub gr: Option<Key>,
    pub nom: Text,
    pub stem: Option<Text>,
    pub decl: Vec<NodeId>,
    pub origin: Dset,
    pub comment: Dset,
}

/// Descriptions, origins and comments. Comments carry no `src`.
#[derive(Debug, Clone, Default)]
pub struct Note {
    pub by: Option<Key>,
    pub src: Option<Key>,
    pub text: Text,
}

/// Details and media, optionally relative to an external root.
#[derive(Debug, Clone, Default)]
pub struct Attachment {
    pub by: Option<Key>,
    pub root: Option<Key>,
    pub rel: Option<String>,
    pub text: Text,
}

/// A declension of a term in one grammatical class.
#[derive(Debug, Clone, Default)]
pub struct Decl {
    pub gr: Option<Key>,
    pub text: Text,
}
