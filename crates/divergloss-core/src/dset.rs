//! Diversity sets.
//!
//! A [`Dset`] is the ordered collection of sibling nodes that vary by
//! language and environment (terms, descriptions, names, ...). It is
//! queried with a [`LangEnv`] and answers with the matching nodes in
//! document order. Querying never mutates anything, so repeating a query
//! yields the same result.

use log::trace;

use crate::{Glossary, NodeId, key::Key};

/// A (language, environment) query context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LangEnv {
    pub lang: Option<Key>,
    pub env: Option<Key>,
}

impl LangEnv {
    pub fn new(lang: Option<Key>, env: Option<Key>) -> Self {
        Self { lang, env }
    }
}

/// Ordered candidates distinguished by language and environment.
#[derive(Debug, Clone, Default)]
pub struct Dset {
    items: Vec<NodeId>,
}

impl Dset {
    /// Adds a candidate, used while building.
    pub fn push(&mut self, node: NodeId) {
        self.items.push(node);
    }

    /// All candidates, in document order.
    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Candidates for the given language and environment.
    ///
    /// A candidate matches when its language equals the query language and
    /// its environments contain the query environment. When nothing matches
    /// exactly, the environments the query environment is close to are
    /// tried in order; this chain always ends with "no environment", so
    /// untagged candidates serve any environment that has no own variant.
    ///
    /// # Examples
    ///
    /// See the crate level example.
    pub fn resolve(&self, gloss: &Glossary, query: LangEnv) -> Vec<NodeId> {
        let exact = self.matching(gloss, query.lang, query.env);
        if !exact.is_empty() {
            return exact;
        }

        let Some(environment) = query.env.and_then(|env| gloss.environment(env)) else {
            return exact;
        };

        for close in &environment.closeto {
            let found = self.matching(gloss, query.lang, *close);
            if !found.is_empty() {
                trace!(
                    env:? = query.env,
                    close:? = close;
                    "Resolved d-set through close environment"
                );
                return found;
            }
        }

        Vec::new()
    }

    /// Languages present among the candidates, in first-seen order.
    pub fn langs(&self, gloss: &Glossary) -> Vec<Option<Key>> {
        let mut langs = Vec::new();
        for item in &self.items {
            let lang = gloss.node(*item).lang();
            if !langs.contains(&lang) {
                langs.push(lang);
            }
        }
        langs
    }

    /// Environments the candidates of a language can be resolved in.
    ///
    /// Besides the environments the candidates are tagged with, this lists
    /// every declared environment that is close to one of them.
    pub fn envs(&self, gloss: &Glossary, lang: Option<Key>) -> Vec<Option<Key>> {
        let mut envs = Vec::new();
        for item in &self.items {
            let node = gloss.node(*item);
            if node.lang() != lang {
                continue;
            }
            for env in node.env() {
                if !envs.contains(env) {
                    envs.push(*env);
                }
                for (key, environment) in gloss.environments() {
                    if environment.closeto.contains(env) && !envs.contains(&Some(key)) {
                        envs.push(Some(key));
                    }
                }
            }
        }
        envs
    }

    fn matching(&self, gloss: &Glossary, lang: Option<Key>, env: Option<Key>) -> Vec<NodeId> {
        self.items
            .iter()
            .copied()
            .filter(|item| {
                let node = gloss.node(*item);
                node.lang() == lang && node.env().contains(&env)
            })
            .collect()
    }
}
