//! Error adapter for converting DivergError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! When a [`divergloss_parser::ParseError`] contains multiple diagnostics,
//! each diagnostic is rendered independently, against the source file its
//! primary label points into.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, NamedSource, SourceSpan};

use divergloss::DivergError;
use divergloss_parser::{Diagnostic, SourceId, SourceMap};

/// Adapter for a single glossary diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// Source the primary label points into, if it is known
    src: Option<(SourceId, NamedSource<String>)>,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter, looking the source text up in `sources`.
    pub fn new(diag: &'a Diagnostic, sources: &SourceMap) -> Self {
        let src = diag.primary_span().and_then(|span| {
            let file = sources.get(span.source())?;
            let named = NamedSource::new(file.name(), file.text().to_string());
            Some((span.source(), named))
        });
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        if self.diag.severity().is_warning() {
            Some(miette::Severity::Warning)
        } else {
            Some(miette::Severity::Error)
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.src
            .as_ref()
            .map(|(_, named)| named as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let (source, _) = self.src.as_ref()?;
        let source = *source;

        // Labels in other files cannot be drawn against this source
        Some(Box::new(
            self.diag
                .labels()
                .iter()
                .filter(move |label| label.span().source() == source)
                .map(|label| {
                    let span = span_to_miette(label.span());
                    let message = Some(label.message().to_string());
                    if label.is_primary() {
                        LabeledSpan::new_primary_with_span(message, span)
                    } else {
                        LabeledSpan::new_with_span(message, span)
                    }
                }),
        ))
    }
}

/// Adapter for non-diagnostic [`DivergError`] variants.
pub struct ErrorAdapter<'a>(pub &'a DivergError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            DivergError::Io(_) => "divergloss::io",
            DivergError::Parse { .. } => return None,
            DivergError::Config(_) => "divergloss::config",
            DivergError::Catalog(_) => "divergloss::catalog",
            DivergError::Export(_) => "divergloss::export",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A rich diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => std::error::Error::source(e),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a glossary [`Span`](divergloss_parser::Span) to a miette [`SourceSpan`].
fn span_to_miette(span: divergloss_parser::Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Convert a [`DivergError`] into a list of reportable errors.
///
/// For [`DivergError::Parse`], this returns one [`Reportable`] for each
/// diagnostic in the error. For other error variants, this returns a
/// single [`Reportable`].
pub fn to_reportables(err: &DivergError) -> Vec<Reportable<'_>> {
    match err {
        DivergError::Parse {
            err: parse_err,
            sources,
        } => parse_err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, sources)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use divergloss_parser::{ErrorCode, ParseError, Span};

    use super::*;

    fn sources() -> (SourceMap, SourceId, SourceId) {
        let mut sources = SourceMap::new();
        let main = sources.add_text("main.xml", "<glossary><concepts/></glossary>");
        let part = sources.add_text("part.xml", "<concepts><concept/></concepts>");
        (sources, main, part)
    }

    #[test]
    fn test_single_diagnostic() {
        let (sources, main, _) = sources();
        let diag = Diagnostic::error("test error")
            .with_code(ErrorCode::E100)
            .with_label(Span::in_source(main, 0..5), "here")
            .with_help("try this");
        let err = DivergError::new_parse_error(ParseError::from(diag), sources);

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        match &reportables[0] {
            Reportable::Diagnostic(d) => {
                assert_eq!(d.to_string(), "test error");
                assert_eq!(d.code().map(|c| c.to_string()).as_deref(), Some("E100"));
            }
            Reportable::Error(_) => panic!("Expected Diagnostic"),
        }
    }

    #[test]
    fn test_multiple_diagnostics() {
        let (sources, main, part) = sources();
        let diags = vec![
            Diagnostic::error("first error").with_label(Span::in_source(main, 0..5), "first"),
            Diagnostic::error("second error")
                .with_code(ErrorCode::E103)
                .with_label(Span::in_source(part, 10..19), "second"),
            Diagnostic::error("third error"),
        ];
        let err = DivergError::new_parse_error(ParseError::new(diags), sources);

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 3);
        assert_eq!(reportables[0].to_string(), "first error");
        assert_eq!(reportables[1].to_string(), "second error");
        assert_eq!(reportables[2].to_string(), "third error");
        assert!(reportables[2].source_code().is_none());
    }

    #[test]
    fn test_labels_from_other_sources_dropped() {
        let (sources, main, part) = sources();
        let diag = Diagnostic::error("duplicate identifier")
            .with_label(Span::in_source(part, 11..18), "second definition")
            .with_secondary_label(Span::in_source(main, 10..20), "first definition");

        let adapter = DiagnosticAdapter::new(&diag, &sources);
        let labels: Vec<_> = adapter.labels().expect("labels").collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].label(), Some("second definition"));
        assert!(labels[0].primary());
    }

    #[test]
    fn test_primary_flag_on_labels() {
        let (sources, main, _) = sources();
        let diag = Diagnostic::error("error with labels")
            .with_label(Span::in_source(main, 0..5), "primary")
            .with_secondary_label(Span::in_source(main, 10..15), "secondary");

        let adapter = DiagnosticAdapter::new(&diag, &sources);
        let labels: Vec<_> = adapter.labels().expect("labels").collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert!(!labels[1].primary());
    }

    #[test]
    fn test_warning_severity() {
        let (sources, main, _) = sources();
        let diag = Diagnostic::warning("unterminated embedded selector")
            .with_code(ErrorCode::E300)
            .with_label(Span::in_source(main, 0..3), "here");
        let adapter = DiagnosticAdapter::new(&diag, &sources);
        assert_eq!(adapter.severity(), Some(miette::Severity::Warning));
    }

    #[test]
    fn test_non_parse_error() {
        let err = DivergError::Config("unknown style `fancy`".to_string());

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Configuration error: unknown style `fancy`");
                assert_eq!(
                    e.code().map(|c| c.to_string()).as_deref(),
                    Some("divergloss::config")
                );
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }
}
