//! Conversion of translation catalogs into glossary concepts.
//!
//! A PO catalog of term pairs becomes a `<concepts>` fragment: every entry
//! turns into one concept with the source and target strings as terms and
//! the translator comments as description. The fragment is meant to be
//! included into a glossary that declares the two languages.
//!
//! ```
//! # use divergloss::catalog::{convert, CatalogError};
//! let po = "# A round fruit.\nmsgid \"Apple\"\nmsgstr \"苹果\"\n";
//! let fragment = convert(po, "en", "zh")?;
//! assert!(fragment.contains("<concept id='apple'>"));
//! assert!(fragment.contains("<term lang='zh'>苹果</term>"));
//! # Ok::<(), CatalogError>(())
//! ```

use std::collections::HashSet;

use log::{debug, info};
use thiserror::Error;
use winnow::{
    Parser as _,
    ascii::{digit1, space0, space1},
    combinator::{alt, cut_err, delimited, eof, opt, preceded, repeat, separated_pair, terminated},
    error::{ContextError, ModalResult, StrContext},
    token::{none_of, rest},
};

use crate::textfmt::markup::{LineAccumulator, escape, etag, stag, wtext};

/// Errors of reading a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// One message of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Translator comments, one per line.
    pub comments: Vec<String>,
    pub msgctxt: Option<String>,
    pub msgid: String,
    pub msgstr: String,
}

/// Read a catalog and convert it in one go.
pub fn convert(text: &str, olang: &str, tlang: &str) -> Result<String, CatalogError> {
    let entries = parse_catalog(text)?;
    Ok(to_divergloss(&entries, olang, tlang))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Msgctxt,
    Msgid,
    MsgidPlural,
    Msgstr(Option<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    /// `# text`
    Comment(&'a str),
    /// Flags, references, extracted and obsolete lines.
    Other,
    Keyword(Keyword, String),
    Continuation(String),
}

type IResult<O> = ModalResult<O, ContextError>;

fn escape_char(input: &mut &str) -> IResult<char> {
    preceded(
        '\\',
        cut_err(alt((
            'n'.value('\n'),
            't'.value('\t'),
            'r'.value('\r'),
            '"'.value('"'),
            '\\'.value('\\'),
        )))
        .context(StrContext::Label("escape sequence")),
    )
    .parse_next(input)
}

fn quoted(input: &mut &str) -> IResult<String> {
    preceded(
        '"',
        cut_err(terminated(
            repeat(0.., alt((escape_char, none_of(['"', '\\'])))),
            '"',
        ))
        .context(StrContext::Label("string")),
    )
    .parse_next(input)
}

fn keyword(input: &mut &str) -> IResult<Keyword> {
    alt((
        "msgctxt".value(Keyword::Msgctxt),
        "msgid_plural".value(Keyword::MsgidPlural),
        "msgid".value(Keyword::Msgid),
        preceded(
            "msgstr",
            opt(delimited('[', digit1.try_map(str::parse::<usize>), ']')),
        )
        .map(Keyword::Msgstr),
    ))
    .parse_next(input)
}

fn comment<'a>(input: &mut &'a str) -> IResult<Line<'a>> {
    preceded(
        '#',
        alt((
            preceded(' ', rest).map(|text: &str| Line::Comment(text.trim())),
            eof.value(Line::Comment("")),
            rest.value(Line::Other),
        )),
    )
    .parse_next(input)
}

fn parse_line<'a>(input: &mut &'a str) -> IResult<Line<'a>> {
    alt((
        (space0, eof).value(Line::Blank),
        preceded(space0, comment),
        terminated(
            preceded(space0, separated_pair(keyword, space1, quoted)),
            (space0, eof),
        )
        .map(|(keyword, value)| Line::Keyword(keyword, value)),
        terminated(preceded(space0, quoted), (space0, eof)).map(Line::Continuation),
    ))
    .parse_next(input)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Msgctxt,
    Msgid,
    Msgstr,
    Skipped,
}

/// An entry being read.
#[derive(Debug, Default)]
struct Pending {
    comments: Vec<String>,
    msgctxt: Option<String>,
    msgid: Option<String>,
    msgstr: Option<String>,
    /// Line of the `msgid`.
    line: usize,
}

impl Pending {
    fn field(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Msgctxt => self.msgctxt.as_mut(),
            Field::Msgid => self.msgid.as_mut(),
            Field::Msgstr => self.msgstr.as_mut(),
            Field::Skipped => None,
        }
    }

    /// Move a complete entry out, leaving an empty one.
    fn flush(&mut self, entries: &mut Vec<CatalogEntry>) -> Result<(), CatalogError> {
        let pending = std::mem::take(self);
        match (pending.msgid, pending.msgstr) {
            (Some(msgid), Some(msgstr)) => {
                entries.push(CatalogEntry {
                    comments: pending.comments,
                    msgctxt: pending.msgctxt,
                    msgid,
                    msgstr,
                });
                Ok(())
            }
            (Some(_), None) => Err(CatalogError::Syntax {
                line: pending.line,
                message: "msgid without msgstr".to_string(),
            }),
            // trailing comments
            (None, _) => Ok(()),
        }
    }
}

/// Read the messages of a PO catalog.
///
/// Plural forms keep the singular `msgid` and the first `msgstr`.
///
/// # Errors
///
/// Returns [`CatalogError::Syntax`] for a line that is not part of the PO
/// syntax or does not fit where it stands.
pub fn parse_catalog(text: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    let mut entries = Vec::new();
    let mut pending = Pending::default();
    let mut field: Option<Field> = None;

    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let syntax = |message: String| CatalogError::Syntax {
            line: number,
            message,
        };
        let parsed = parse_line
            .parse(raw)
            .map_err(|_| syntax(format!("unrecognized line `{}`", raw.trim())))?;

        match parsed {
            Line::Blank => {}
            Line::Comment(text) => {
                if pending.msgstr.is_some() {
                    pending.flush(&mut entries)?;
                    field = None;
                }
                if !text.is_empty() {
                    pending.comments.push(text.to_string());
                }
            }
            Line::Other => {
                if pending.msgstr.is_some() {
                    pending.flush(&mut entries)?;
                    field = None;
                }
            }
            Line::Keyword(Keyword::Msgctxt, value) => {
                if pending.msgstr.is_some() {
                    pending.flush(&mut entries)?;
                }
                pending.msgctxt = Some(value);
                field = Some(Field::Msgctxt);
            }
            Line::Keyword(Keyword::Msgid, value) => {
                if pending.msgstr.is_some() {
                    pending.flush(&mut entries)?;
                }
                if pending.msgid.is_some() {
                    return Err(syntax("msgid without msgstr before it".to_string()));
                }
                pending.msgid = Some(value);
                pending.line = number;
                field = Some(Field::Msgid);
            }
            Line::Keyword(Keyword::MsgidPlural, _) => field = Some(Field::Skipped),
            Line::Keyword(Keyword::Msgstr(index), value) => {
                if pending.msgid.is_none() {
                    return Err(syntax("msgstr without msgid".to_string()));
                }
                if index.unwrap_or(0) == 0 && pending.msgstr.is_none() {
                    pending.msgstr = Some(value);
                    field = Some(Field::Msgstr);
                } else {
                    field = Some(Field::Skipped);
                }
            }
            Line::Continuation(value) => {
                let Some(current) = field else {
                    return Err(syntax("string continuation outside of a message".to_string()));
                };
                if let Some(target) = pending.field(current) {
                    target.push_str(&value);
                }
            }
        }
    }
    pending.flush(&mut entries)?;

    debug!(entries = entries.len(); "Catalog read");
    Ok(entries)
}

/// Identifier of concepts whose source string has no word characters.
pub const FALLBACK_CONCEPT_ID: &str = "concept";

/// Concept identifier derived from a source string: lowercased, spaces
/// turned into underscores, other non-word characters dropped.
///
/// Falls back to [`FALLBACK_CONCEPT_ID`] when nothing but underscores
/// would remain.
pub fn concept_id(source: &str) -> String {
    let id: String = source
        .chars()
        .flat_map(char::to_lowercase)
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_alphanumeric() || c == '_' => Some(c),
            _ => None,
        })
        .collect();
    if id.chars().all(|c| c == '_') {
        FALLBACK_CONCEPT_ID.to_string()
    } else {
        id
    }
}

/// Write catalog entries as a `<concepts>` fragment.
///
/// The header entry and untranslated entries are left out. Identifiers
/// that repeat get a counter appended: `apple`, `apple1`, `apple2`.
pub fn to_divergloss(entries: &[CatalogEntry], olang: &str, tlang: &str) -> String {
    let mut accl = LineAccumulator::new("  ");
    let mut used: HashSet<String> = HashSet::new();
    let mut converted = 0;

    accl.push(0, stag("concepts", &[]));
    for entry in entries {
        if entry.msgid.is_empty() {
            continue;
        }
        if entry.msgstr.is_empty() {
            info!(msgid = entry.msgid.as_str(); "Untranslated entry skipped");
            continue;
        }

        let base = concept_id(&entry.msgid);
        let mut id = base.clone();
        let mut counter = 0;
        while used.contains(&id) {
            counter += 1;
            id = format!("{base}{counter}");
        }
        used.insert(id.clone());

        accl.push(1, stag("concept", &[("id", id.as_str())]));
        match entry.comments.as_slice() {
            [] => {}
            [single] => accl.push(2, wtext(&escape(single), "desc", &[("lang", olang)])),
            several => {
                accl.push(2, stag("ldesc", &[("lang", olang)]));
                for comment in several {
                    accl.push(3, wtext(&escape(comment), "para", &[]));
                }
                accl.push(2, etag("ldesc"));
            }
        }
        accl.push(2, wtext(&escape(&entry.msgid), "term", &[("lang", olang)]));
        accl.push(2, wtext(&escape(&entry.msgstr), "term", &[("lang", tlang)]));
        accl.push(1, etag("concept"));
        converted += 1;
    }
    accl.push(0, etag("concepts"));

    info!(olang = olang, tlang = tlang, concepts = converted; "Catalog converted");
    accl.finish()
}
