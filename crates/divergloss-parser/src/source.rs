//! Loaded source texts.
//!
//! Every document read while loading a glossary, the main one and each
//! included one, is kept in a [`SourceMap`] so that diagnostics can show
//! the offending snippet from the right file.

use std::path::{Path, PathBuf};

use crate::span::SourceId;

/// One loaded document.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    path: Option<PathBuf>,
    text: String,
}

impl SourceFile {
    /// Display name, the path as given or a placeholder for in-memory text.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// All documents loaded for one glossary.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds in-memory text that has no file behind it.
    pub fn add_text(&mut self, name: impl Into<String>, text: impl Into<String>) -> SourceId {
        self.push(SourceFile {
            name: name.into(),
            path: None,
            text: text.into(),
        })
    }

    /// Adds the text read from a file.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> SourceId {
        let path = path.into();
        self.push(SourceFile {
            name: path.display().to_string(),
            path: Some(path),
            text: text.into(),
        })
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(idx, file)| (SourceId::new(idx), file))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn push(&mut self, file: SourceFile) -> SourceId {
        let id = SourceId::new(self.files.len());
        self.files.push(file);
        id
    }
}
