//! Built-in style sheets and the page script of the bilingual dictionary,
//! and the style sheet of the glossary view.
//!
//! Style sheets carry `@name@` placeholders, filled from style options
//! given as `name=value,name=value`.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use winnow::{
    Parser as _,
    ascii::space0,
    combinator::{delimited, separated, separated_pair},
    error::{ContextError, ModalResult, StrContext},
    token::take_while,
};

use super::Error;

/// Style options: name, default value, description.
pub const STYLE_OPTIONS: [(&str, &str, &str); 1] = [(
    "oterm_col_width",
    "10em",
    "width of the column with origin terms, as a CSS length",
)];

/// Script toggling the detail blocks of dictionary rows.
pub const SCRIPT: &str = "\
function show_hide(ctl, id) {
    var el = document.getElementById(id);
    if (el.style.display == 'none') {
        el.style.display = 'block';
        ctl.innerHTML = '[&#8722;]';
        ctl.title = 'Hide details';
    } else {
        el.style.display = 'none';
        ctl.innerHTML = '[+]';
        ctl.title = 'Show details';
    }
    return false;
}
";

/// Style sheet of the single-page glossary view.
pub const VIEW_STYLE: &str = "\
body { font-family: serif; margin: 1em 2em; }
p.tpage-title { font-size: 180%; font-weight: bold; }
span.page-env { font-style: italic; }
p.tpage-content-header, h2.page-subtitle { font-weight: bold; margin-top: 1.5em; }
div.page-navs { float: right; }
a.page-nav { margin-left: 0.5em; text-decoration: none; }
div.concept-div { margin-top: 1em; border-bottom: 1px solid black; }
span.concept-div-alpha { font-size: 150%; font-weight: bold; }
div.concept { margin: 0.8em 0; }
p.terms { margin: 0; }
span.term-tt { font-weight: bold; }
span.gr, span.topic, span.env, span.env-meta { font-style: italic; }
div.desc { margin-left: 1.5em; }
p.desc-para, p.comment-para, p.about-desc-para { margin: 0.2em 0; }
span.desc-no { font-weight: bold; }
p.terms-sec, p.details, p.related { margin: 0.2em 0 0.2em 1.5em; font-size: 90%; }
div.comments { margin-left: 1.5em; font-size: 90%; }
p.comments-header, p.comment-label { margin: 0.2em 0; font-style: italic; }
p.index-lang-header { font-size: 130%; font-weight: bold; }
p.index-alpha-div { font-weight: bold; border-bottom: 1px solid black; }
table.index-term-table { width: 100%; }
td.index-term-cell { vertical-align: top; }
a.cref, a.index-term, a.index-term-refnum { text-decoration: none; border-bottom: 1px dotted; }
span.about-entry-name { font-weight: bold; }
span.about-entry-name-meta { font-weight: bold; font-style: italic; }
em.frlng { font-style: italic; }
";

const PLAIN: &str = "\
body { font-family: serif; margin: 1em 2em; }
table.bd-table { border-collapse: collapse; width: 100%; }
th.bd-header-ol, th.bd-header-tl { text-align: left; border-bottom: 1px solid black; }
th.bd-header-ol, td.bd-oterm { width: @oterm_col_width@; }
td { vertical-align: top; padding: 0.2em 0.5em; }
td.bd-alsep-al { font-weight: bold; padding-top: 1em; }
p.bd-otline, p.bd-ttline { margin: 0; }
div.bd-ttgroup { margin: 0 0 0.3em 0; }
div.bd-edctl { float: right; }
a.bd-edctl { text-decoration: none; font-family: monospace; }
p.bd-desc { margin: 0.3em 0 0.3em 1em; font-size: 90%; }
a.cref { text-decoration: none; border-bottom: 1px dotted; }
em.frlng { font-style: italic; }
";

const IGLOO: &str = "\
body { font-family: sans-serif; margin: 1em 2em; background: #f4f8fb; color: #1d2a33; }
table.bd-table { border-collapse: collapse; width: 100%; background: white; }
th.bd-header-ol, th.bd-header-tl { text-align: left; background: #3d6f94; color: white; padding: 0.4em 0.5em; }
th.bd-header-ol, td.bd-oterm { width: @oterm_col_width@; }
td { vertical-align: top; padding: 0.25em 0.5em; }
tr.bd-entry-odd { background: #ffffff; }
tr.bd-entry-even { background: #e9f1f7; }
td.bd-alsep-al { font-size: 120%; font-weight: bold; color: #3d6f94; padding-top: 1em; border-bottom: 2px solid #3d6f94; }
td.bd-oterm { font-weight: bold; }
p.bd-otline, p.bd-ttline { margin: 0; }
div.bd-ttgroup { margin: 0 0 0.3em 0; }
div.bd-edctl { float: right; }
a.bd-edctl { text-decoration: none; font-family: monospace; color: #3d6f94; }
p.bd-desc { margin: 0.3em 0 0.3em 1em; font-size: 90%; color: #46586a; }
a.cref { color: #1d5c8a; text-decoration: none; border-bottom: 1px dotted #1d5c8a; }
a.ext { color: #1d5c8a; }
em.frlng { font-style: italic; }
";

/// A built-in style sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Igloo,
}

impl Style {
    pub const ALL: [Style; 2] = [Style::Plain, Style::Igloo];

    pub fn name(self) -> &'static str {
        match self {
            Style::Plain => "plain",
            Style::Igloo => "igloo",
        }
    }

    fn template(self) -> &'static str {
        match self {
            Style::Plain => PLAIN,
            Style::Igloo => IGLOO,
        }
    }

    /// The style sheet with its placeholders filled from `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the sheet uses a placeholder no style
    /// option provides.
    pub fn render(self, options: &StyleOptions) -> Result<String, Error> {
        fill_placeholders(self.template(), options)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|style| style.name()).collect();
                Error::Option(format!(
                    "unknown style `{s}`, expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}

/// Values of the style options, defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleOptions {
    values: IndexMap<&'static str, String>,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            values: STYLE_OPTIONS
                .iter()
                .map(|(name, default, _)| (*name, (*default).to_string()))
                .collect(),
        }
    }
}

impl StyleOptions {
    /// Parse `name=value` pairs separated by commas over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Option`] for a malformed list or an unknown name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use divergloss::export::style::StyleOptions;
    /// let options = StyleOptions::parse("oterm_col_width=33%").unwrap();
    /// assert_eq!(options.get("oterm_col_width"), Some("33%"));
    /// assert!(StyleOptions::parse("columns=2").is_err());
    /// ```
    pub fn parse(spec: &str) -> Result<Self, Error> {
        let mut options = Self::default();
        let spec = spec.trim();
        if spec.is_empty() {
            return Ok(options);
        }

        let pairs = option_list
            .parse(spec)
            .map_err(|e| Error::Option(format!("malformed style options `{spec}`:\n{e}")))?;
        for (name, value) in pairs {
            let Some(slot) = options.values.get_mut(name) else {
                return Err(Error::Option(format!("unknown style option `{name}`")));
            };
            *slot = value.to_string();
        }
        Ok(options)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

type IResult<O> = ModalResult<O, ContextError>;

fn option_name<'a>(input: &mut &'a str) -> IResult<&'a str> {
    delimited(
        space0,
        take_while(1.., |c: char| c.is_alphanumeric() || c == '_'),
        space0,
    )
    .context(StrContext::Label("option name"))
    .parse_next(input)
}

fn option_value<'a>(input: &mut &'a str) -> IResult<&'a str> {
    take_while(1.., |c: char| c != ',')
        .map(str::trim)
        .verify(|value: &str| !value.is_empty())
        .context(StrContext::Label("option value"))
        .parse_next(input)
}

fn option_list<'a>(input: &mut &'a str) -> IResult<Vec<(&'a str, &'a str)>> {
    separated(1.., separated_pair(option_name, '=', option_value), ',').parse_next(input)
}

fn fill_placeholders(template: &str, options: &StyleOptions) -> Result<String, Error> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('@') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let name_len = after
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if name_len == 0 || !after[name_len..].starts_with('@') {
            out.push('@');
            rest = after;
            continue;
        }

        let name = &after[..name_len];
        let value = options.get(name).ok_or_else(|| {
            Error::Render(format!("style sheet requests unknown style option `{name}`"))
        })?;
        out.push_str(value);
        rest = &after[name_len + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_names() {
        assert_eq!("igloo".parse::<Style>().ok(), Some(Style::Igloo));
        let err = "neon".parse::<Style>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Option error: unknown style `neon`, expected one of: plain, igloo"
        );
    }

    #[test]
    fn test_defaults_fill_sheet() {
        let css = Style::Plain.render(&StyleOptions::default()).unwrap();
        assert!(css.contains("td.bd-oterm { width: 10em; }"));
        assert!(!css.contains('@'));
    }

    #[test]
    fn test_options_override_defaults() {
        let options = StyleOptions::parse(" oterm_col_width = 33% ").unwrap();
        let css = Style::Igloo.render(&options).unwrap();
        assert!(css.contains("width: 33%;"));
    }

    #[test]
    fn test_malformed_and_unknown_options() {
        assert!(matches!(StyleOptions::parse("oterm_col_width"), Err(Error::Option(_))));
        assert!(matches!(StyleOptions::parse("=3em"), Err(Error::Option(_))));
        assert!(matches!(
            StyleOptions::parse("oterm_col_width=3em,colour=red"),
            Err(Error::Option(msg)) if msg == "unknown style option `colour`"
        ));
        assert_eq!(StyleOptions::parse("  ").unwrap(), StyleOptions::default());
    }

    #[test]
    fn test_placeholders() {
        let options = StyleOptions::default();
        assert_eq!(
            fill_placeholders("a@b c @oterm_col_width@ x@", &options).unwrap(),
            "a@b c 10em x@"
        );
        assert!(matches!(
            fill_placeholders("@missing@", &options),
            Err(Error::Render(_))
        ));
    }
}
