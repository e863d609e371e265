//! Alphabetical ordering of terms.
//!
//! Terms are compared by a folded form: canonically decomposed, stripped of
//! combining marks and lowercased, so `Éclair`, `eclair` and `ECLAIR` sort
//! together. The first folded character also names the alphabetical
//! bucket a term is listed under.

use std::cmp::Ordering;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use divergloss_core::key::Key;

/// Bucket of terms that do not start with a letter.
pub const OTHER_BUCKET: &str = "#";

/// Fold a string for case and diacritic insensitive comparison.
pub fn fold(value: &str) -> String {
    let lower: String = value.chars().flat_map(char::to_lowercase).collect();
    lower.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// The alphabetical bucket of a term: its folded first letter in upper
/// case, or [`OTHER_BUCKET`].
pub fn bucket(value: &str) -> String {
    match fold(value.trim_start()).chars().next() {
        Some(first) if first.is_alphabetic() => first.to_uppercase().collect(),
        _ => OTHER_BUCKET.to_string(),
    }
}

/// Sort key of one term listed for a concept.
///
/// Orders the [`OTHER_BUCKET`] first, then by folded form, the form as
/// written, the concept key and the position of the term in the concept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    lettered: bool,
    folded: String,
    nom: String,
    concept: Key,
    position: usize,
}

impl SortKey {
    pub fn new(nom: &str, concept: Key, position: usize) -> Self {
        Self {
            lettered: bucket(nom) != OTHER_BUCKET,
            folded: fold(nom),
            nom: nom.to_string(),
            concept,
            position,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lettered
            .cmp(&other.lettered)
            .then_with(|| self.folded.cmp(&other.folded))
            .then_with(|| self.nom.cmp(&other.nom))
            .then_with(|| self.concept.cmp(&other.concept))
            .then_with(|| self.position.cmp(&other.position))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
