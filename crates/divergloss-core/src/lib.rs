//! # Divergloss Core
//!
//! The in-memory glossary model shared by the parser and the renderers:
//!
//! - [`key`] - interned identifiers
//! - [`gnode`] - typed nodes, one variant per element kind
//! - [`Glossary`] - the node arena and its keyed collections
//! - [`dset`] - diversity sets and their (language, environment) resolution
//! - [`text`] - the text markup tree and its visitor
//!
//! ## Example
//!
//! ```
//! use divergloss_core::{
//!     Glossary, NodeId,
//!     dset::{Dset, LangEnv},
//!     gnode::{Gnode, GlossaryMeta, Kind, Note},
//!     key::Key,
//!     span::Span,
//!     text::Text,
//! };
//!
//! let en = Key::new("en");
//! let mut gloss = Glossary::new(GlossaryMeta::default(), Some(en), vec![None], Span::default());
//!
//! let desc = gloss.push(Gnode::new(
//!     Kind::Desc(Note { text: Text::from_literal("A round fruit."), ..Note::default() }),
//!     Some(NodeId::ROOT),
//!     Some(en),
//!     vec![None],
//!     Span::default(),
//! ));
//! let mut dset = Dset::default();
//! dset.push(desc);
//!
//! let found = dset.resolve(&gloss, LangEnv::new(Some(en), None));
//! assert_eq!(found, vec![desc]);
//! ```

pub mod dset;
pub mod glossary;
pub mod gnode;
pub mod key;
pub mod span;
pub mod text;

pub use glossary::{Glossary, KeyedKind};
pub use gnode::NodeId;
