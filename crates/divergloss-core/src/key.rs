//! Interned keys for glossary identifiers.
//!
//! Every identifier declared in a glossary (language, environment, editor,
//! concept, ...) and every attribute that points at one is stored as a
//! [`Key`]. Keys are interned in a process-wide table, so copying and
//! equality are cheap while ordering still follows the textual value.

use std::{
    cmp::Ordering,
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for glossary keys.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// An interned glossary key.
///
/// # Examples
///
/// ```
/// use divergloss_core::key::Key;
///
/// let en = Key::new("en");
/// let again: Key = "en".into();
/// assert_eq!(en, again);
/// assert_eq!(en, "en");
/// assert!(Key::new("apple") < Key::new("banana"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(DefaultSymbol);

impl Key {
    /// Creates a `Key` from its textual value.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Returns the textual value of the key as an owned string.
    pub fn as_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_string()
        });
        write!(f, "{value}")
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            return Ordering::Equal;
        }
        with_interner(|interner| {
            let lhs = interner
                .resolve(self.0)
                .expect("Symbol should exist in interner");
            let rhs = interner
                .resolve(other.0)
                .expect("Symbol should exist in interner");
            lhs.cmp(rhs)
        })
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Key {
    /// Allows direct comparison with string slices: `key == "en"`
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .is_some_and(|value| value == other)
        })
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// Formats an optional key, with `-` standing for "no key".
pub fn display_opt(key: Option<Key>) -> String {
    key.map_or_else(|| "-".to_string(), |key| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_interning() {
        let a = Key::new("concept_a");
        let b = Key::new("concept_a");
        let c = Key::new("concept_c");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_key_display() {
        let key = Key::new("sr-latin");
        assert_eq!(key.to_string(), "sr-latin");
        assert_eq!(key.as_string(), "sr-latin");
    }

    #[test]
    fn test_key_ordering_is_textual() {
        // Intern in reverse order so symbol order differs from text order.
        let z = Key::new("zz_order");
        let a = Key::new("aa_order");

        assert!(a < z);
        let mut keys = vec![z, a];
        keys.sort();
        assert_eq!(keys, vec![a, z]);
    }

    #[test]
    fn test_key_str_comparison() {
        let key = Key::new("editor");
        assert!(key == "editor");
        assert!(key != "editors");
    }

    #[test]
    fn test_display_opt() {
        assert_eq!(display_opt(None), "-");
        assert_eq!(display_opt(Some(Key::new("web"))), "web");
    }
}
