//! The glossary arena and its keyed indices.

use std::fmt;

use indexmap::IndexMap;

use crate::{
    dset::LangEnv,
    gnode::{Concept, Environment, Gnode, GlossaryMeta, Keydef, Kind, Term},
    key::Key,
    span::Span,
    NodeId,
};

/// The collections of key-declaring nodes exposed on the glossary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyedKind {
    Language,
    Environment,
    Editor,
    Source,
    Topic,
    Level,
    Gramm,
    Extroot,
    Concept,
}

impl KeyedKind {
    pub const ALL: [KeyedKind; 9] = [
        KeyedKind::Language,
        KeyedKind::Environment,
        KeyedKind::Editor,
        KeyedKind::Source,
        KeyedKind::Topic,
        KeyedKind::Level,
        KeyedKind::Gramm,
        KeyedKind::Extroot,
        KeyedKind::Concept,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for KeyedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyedKind::Language => "language",
            KeyedKind::Environment => "environment",
            KeyedKind::Editor => "editor",
            KeyedKind::Source => "source",
            KeyedKind::Topic => "topic",
            KeyedKind::Level => "level",
            KeyedKind::Gramm => "grammar class",
            KeyedKind::Extroot => "external root",
            KeyedKind::Concept => "concept",
        };
        write!(f, "{name}")
    }
}

/// A built glossary.
///
/// Owns every node in a flat arena; the root is [`NodeId::ROOT`]. Keyed
/// collections map declared identifiers to nodes in document order. The
/// mutating methods exist for the model builder; once built, a glossary is
/// only read.
#[derive(Debug, Clone)]
pub struct Glossary {
    nodes: Vec<Gnode>,
    keyed: [IndexMap<Key, NodeId>; 9],
}

impl Glossary {
    /// Creates a glossary holding only its root node.
    pub fn new(meta: GlossaryMeta, lang: Option<Key>, env: Vec<Option<Key>>, span: Span) -> Self {
        let root = Gnode::new(Kind::Glossary(meta), None, lang, env, span);
        Self {
            nodes: vec![root],
            keyed: Default::default(),
        }
    }

    /// Appends a node to the arena.
    pub fn push(&mut self, node: Gnode) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Registers a key-declaring node.
    ///
    /// When the key is already taken the index is left untouched and the
    /// node holding it is returned.
    pub fn insert_keyed(&mut self, kind: KeyedKind, key: Key, node: NodeId) -> Option<NodeId> {
        let map = &mut self.keyed[kind.slot()];
        if let Some(existing) = map.get(&key) {
            return Some(*existing);
        }
        map.insert(key, node);
        None
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this glossary.
    pub fn node(&self, id: NodeId) -> &Gnode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Gnode {
        &mut self.nodes[id.index()]
    }

    /// All nodes with their handles, in creation (document) order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Gnode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId::new(idx), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &Gnode {
        self.node(NodeId::ROOT)
    }

    pub fn meta(&self) -> &GlossaryMeta {
        match self.root().kind() {
            Kind::Glossary(meta) => meta,
            _ => unreachable!("root node is always a glossary"),
        }
    }

    pub fn meta_mut(&mut self) -> &mut GlossaryMeta {
        match self.node_mut(NodeId::ROOT).kind_mut() {
            Kind::Glossary(meta) => meta,
            _ => unreachable!("root node is always a glossary"),
        }
    }

    /// Default language of the glossary.
    pub fn lang(&self) -> Option<Key> {
        self.root().lang()
    }

    /// Environments of the glossary; `[None]` when none were given.
    pub fn env(&self) -> &[Option<Key>] {
        self.root().env()
    }

    /// The default environment, the first of [`env`](Self::env).
    pub fn default_env(&self) -> Option<Key> {
        self.env().first().copied().flatten()
    }

    /// The default query context of a node: its own inherited langenv.
    pub fn langenv_of(&self, id: NodeId) -> LangEnv {
        let node = self.node(id);
        LangEnv::new(node.lang(), node.env().first().copied().flatten())
    }

    /// The keyed collection of the given kind.
    pub fn keyed(&self, kind: KeyedKind) -> &IndexMap<Key, NodeId> {
        &self.keyed[kind.slot()]
    }

    pub fn lookup(&self, kind: KeyedKind, key: Key) -> Option<NodeId> {
        self.keyed(kind).get(&key).copied()
    }

    pub fn contains(&self, kind: KeyedKind, key: Key) -> bool {
        self.keyed(kind).contains_key(&key)
    }

    /// Identity block of a declared key of any keyed kind but concepts.
    pub fn keydef(&self, kind: KeyedKind, key: Key) -> Option<&Keydef> {
        self.lookup(kind, key)
            .and_then(|id| self.node(id).kind().keydef())
    }

    pub fn environment(&self, key: Key) -> Option<&Environment> {
        self.lookup(KeyedKind::Environment, key)
            .and_then(|id| self.node(id).kind().as_environment())
    }

    /// Declared environments in document order.
    pub fn environments(&self) -> impl Iterator<Item = (Key, &Environment)> {
        self.keyed(KeyedKind::Environment)
            .iter()
            .filter_map(|(key, id)| self.node(*id).kind().as_environment().map(|env| (*key, env)))
    }

    pub fn concept(&self, key: Key) -> Option<&Concept> {
        self.lookup(KeyedKind::Concept, key)
            .and_then(|id| self.node(id).kind().as_concept())
    }

    /// Concepts in document order.
    pub fn concepts(&self) -> impl Iterator<Item = (NodeId, &Concept)> {
        self.keyed(KeyedKind::Concept)
            .values()
            .filter_map(|id| self.node(*id).kind().as_concept().map(|concept| (*id, concept)))
    }

    pub fn term(&self, id: NodeId) -> Option<&Term> {
        self.node(id).kind().as_term()
    }
}
