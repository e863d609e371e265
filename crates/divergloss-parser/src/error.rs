//! Error and diagnostic system for the Divergloss parser.
//!
//! Problems found while loading and building a glossary are reported as
//! [`Diagnostic`]s: a message with an [`ErrorCode`], labeled source spans
//! and optional help. All diagnostics of one document are collected and
//! returned together in a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use divergloss_parser::error::{Diagnostic, ErrorCode};
//! # use divergloss_parser::Span;
//!
//! let diag = Diagnostic::error("identifier `apple` is declared multiple times")
//!     .with_code(ErrorCode::E104)
//!     .with_label(Span::new(100..120), "duplicate declaration")
//!     .with_secondary_label(Span::new(50..70), "first declared here")
//!     .with_help("identifiers must be unique across the whole glossary");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;
pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
