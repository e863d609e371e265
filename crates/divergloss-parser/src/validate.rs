//! Reference checking.
//!
//! Keys can be used before the element declaring them, so the builder only
//! records each key-valued attribute as a [`Reference`]; they are checked
//! here once the whole glossary is built.

use log::debug;

use divergloss_core::{Glossary, KeyedKind, key::Key};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::Span,
};

/// A key used by an attribute, to be checked against a keyed collection.
#[derive(Debug, Clone)]
pub(crate) struct Reference {
    pub kind: KeyedKind,
    pub key: Key,
    /// The attribute holding the key; `None` for an embedded selector.
    pub attr: Option<&'static str>,
    pub span: Span,
}

/// Report every reference whose key is not declared.
pub(crate) fn check_references(
    gloss: &Glossary,
    references: &[Reference],
    diagnostics: &mut DiagnosticCollector,
) {
    debug!(references = references.len(); "Checking key references");
    for reference in references {
        if gloss.contains(reference.kind, reference.key) {
            continue;
        }
        let message = match reference.attr {
            Some(attr) => format!(
                "attribute `{attr}` names an undefined {} `{}`",
                reference.kind, reference.key
            ),
            None => format!(
                "embedded selector names an undefined {} `{}`",
                reference.kind, reference.key
            ),
        };
        diagnostics.emit(
            Diagnostic::error(message)
                .with_code(undefined_code(reference.kind))
                .with_label(reference.span, format!("undefined {}", reference.kind))
                .with_help(declaration_help(reference.kind)),
        );
    }
}

fn undefined_code(kind: KeyedKind) -> ErrorCode {
    match kind {
        KeyedKind::Language => ErrorCode::E200,
        KeyedKind::Environment => ErrorCode::E201,
        KeyedKind::Editor => ErrorCode::E202,
        KeyedKind::Source => ErrorCode::E203,
        KeyedKind::Gramm => ErrorCode::E204,
        KeyedKind::Extroot => ErrorCode::E205,
        KeyedKind::Topic => ErrorCode::E206,
        KeyedKind::Level => ErrorCode::E207,
        KeyedKind::Concept => ErrorCode::E208,
    }
}

fn declaration_help(kind: KeyedKind) -> &'static str {
    match kind {
        KeyedKind::Language => "declare the language under <keydefs><languages>",
        KeyedKind::Environment => "declare the environment under <keydefs><environments>",
        KeyedKind::Editor => "declare the editor under <keydefs><editors>",
        KeyedKind::Source => "declare the source under <keydefs><sources>",
        KeyedKind::Gramm => "declare the grammar class under <keydefs><grammar>",
        KeyedKind::Extroot => "declare the external root under <keydefs><extroots>",
        KeyedKind::Topic => "declare the topic under <keydefs><topics>",
        KeyedKind::Level => "declare the level under <keydefs><levels>",
        KeyedKind::Concept => "declare the concept under <concepts>",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use divergloss_core::{
        NodeId,
        gnode::{GlossaryMeta, Gnode, Keydef, Kind},
    };

    #[test]
    fn test_undefined_keys_are_reported() {
        let mut gloss = Glossary::new(GlossaryMeta::default(), None, Vec::new(), Span::default());
        let en = gloss.push(Gnode::new(
            Kind::Language(Keydef::new(Key::new("en"))),
            Some(NodeId::ROOT),
            None,
            Vec::new(),
            Span::default(),
        ));
        gloss.insert_keyed(KeyedKind::Language, Key::new("en"), en);

        let references = vec![
            Reference {
                kind: KeyedKind::Language,
                key: Key::new("en"),
                attr: Some("lang"),
                span: Span::new(0..4),
            },
            Reference {
                kind: KeyedKind::Editor,
                key: Key::new("jdoe"),
                attr: Some("by"),
                span: Span::new(10..19),
            },
        ];
        let mut diagnostics = DiagnosticCollector::new();
        check_references(&gloss, &references, &mut diagnostics);

        let err = diagnostics.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E202));
        assert_eq!(diag.message(), "attribute `by` names an undefined editor `jdoe`");
        assert_eq!(diag.primary_span(), Some(Span::new(10..19)));
    }
}
