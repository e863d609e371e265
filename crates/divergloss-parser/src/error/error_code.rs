//! Error codes for the Divergloss diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Loader errors
//! - `E1xx` - Structure errors
//! - `E2xx` - Reference errors
//! - `E3xx` - Text markup warnings

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Loader Errors (E0xx)
    // =========================================================================
    /// Malformed markup.
    ///
    /// The document is not well-formed: unclosed or mismatched tags,
    /// broken attribute syntax, and the like.
    E001,

    /// Invalid character or entity reference.
    E002,

    /// Inclusion failed.
    ///
    /// An `xi:include` element has no `href`, or the referenced file
    /// cannot be read.
    E003,

    /// Missing root element.
    E004,

    /// Recursive inclusion.
    ///
    /// A document includes itself, directly or through other documents.
    E005,

    // =========================================================================
    // Structure Errors (E1xx)
    // =========================================================================
    /// Unknown element.
    ///
    /// The element name is not part of the Divergloss dialect.
    E100,

    /// Unknown attribute.
    ///
    /// The attribute is not defined for this element.
    E101,

    /// Misplaced element.
    ///
    /// The element is known but not allowed inside its parent.
    E102,

    /// Missing required attribute.
    E103,

    /// Duplicate identifier.
    ///
    /// Two elements declare the same `id`.
    E104,

    /// Invalid attribute value.
    E105,

    /// Repeated single child.
    ///
    /// A child that may appear at most once appears several times.
    E106,

    /// Unexpected text content.
    ///
    /// Non-whitespace text appears in an element that holds only elements.
    E107,

    /// Missing required child.
    ///
    /// An element lacks a child it cannot do without, like `nom` in `eterm`.
    E108,

    // =========================================================================
    // Reference Errors (E2xx)
    // =========================================================================
    /// Undefined language key.
    E200,

    /// Undefined environment key.
    E201,

    /// Undefined editor key.
    E202,

    /// Undefined source key.
    E203,

    /// Undefined grammar class key.
    E204,

    /// Undefined external root key.
    E205,

    /// Undefined topic key.
    E206,

    /// Undefined level key.
    E207,

    /// Undefined concept key.
    E208,

    // =========================================================================
    // Text Markup Warnings (E3xx)
    // =========================================================================
    /// Unterminated embedded selector.
    ///
    /// A `~` opening an embedded selector has no closing `~`; the rest of
    /// the text is kept literally.
    E300,

    /// Repeated environment in an embedded selector.
    E301,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Loader errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            // Structure errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E106 => "E106",
            ErrorCode::E107 => "E107",
            ErrorCode::E108 => "E108",
            // Reference errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
            ErrorCode::E207 => "E207",
            ErrorCode::E208 => "E208",
            // Text markup warnings
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Loader errors
            ErrorCode::E001 => "malformed markup",
            ErrorCode::E002 => "invalid character or entity reference",
            ErrorCode::E003 => "inclusion failed",
            ErrorCode::E004 => "missing root element",
            ErrorCode::E005 => "recursive inclusion",
            // Structure errors
            ErrorCode::E100 => "unknown element",
            ErrorCode::E101 => "unknown attribute",
            ErrorCode::E102 => "misplaced element",
            ErrorCode::E103 => "missing required attribute",
            ErrorCode::E104 => "duplicate identifier",
            ErrorCode::E105 => "invalid attribute value",
            ErrorCode::E106 => "repeated single child",
            ErrorCode::E107 => "unexpected text content",
            ErrorCode::E108 => "missing required child",
            // Reference errors
            ErrorCode::E200 => "undefined language",
            ErrorCode::E201 => "undefined environment",
            ErrorCode::E202 => "undefined editor",
            ErrorCode::E203 => "undefined source",
            ErrorCode::E204 => "undefined grammar class",
            ErrorCode::E205 => "undefined external root",
            ErrorCode::E206 => "undefined topic",
            ErrorCode::E207 => "undefined level",
            ErrorCode::E208 => "undefined concept",
            // Text markup warnings
            ErrorCode::E300 => "unterminated embedded selector",
            ErrorCode::E301 => "repeated environment in embedded selector",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E200.to_string(), "E200");
        assert_eq!(ErrorCode::E300.to_string(), "E300");
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::E005.as_str(), "E005");
        assert_eq!(ErrorCode::E208.as_str(), "E208");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "malformed markup");
        assert_eq!(ErrorCode::E104.description(), "duplicate identifier");
        assert_eq!(ErrorCode::E208.description(), "undefined concept");
    }
}
