//! Plain text view of a glossary.
//!
//! Lists the concepts that have a term in one language and environment,
//! alphabetically by their first term, each with its terms in the other
//! languages and its descriptions wrapped to a column.

use log::info;

use divergloss_core::{Glossary, KeyedKind, key::Key};

use super::{Error, Exporter, Rendered, output_env, output_lang};
use crate::{
    collate::SortKey,
    config::{DEFAULT_WCOL, TextConfig},
    textfmt::{Binding, PlainFormatter},
};

const TERM_INDENT: &str = "  ";
const DESC_INDENT: &str = "    ";

/// Options of the plain text view.
#[derive(Debug, Clone)]
pub struct TextOptions {
    lang: Option<Key>,
    env: Option<Key>,
    wcol: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            lang: None,
            env: None,
            wcol: DEFAULT_WCOL,
        }
    }
}

impl TextOptions {
    /// Options with the wrap column of a configuration.
    pub fn from_config(config: &TextConfig) -> Self {
        Self {
            wcol: config.wcol(),
            ..Self::default()
        }
    }

    /// Language to list, instead of the glossary default.
    pub fn with_lang(mut self, lang: Option<Key>) -> Self {
        self.lang = lang;
        self
    }

    /// Environment to list, instead of the glossary default.
    pub fn with_env(mut self, env: Option<Key>) -> Self {
        self.env = env;
        self
    }

    /// Column to wrap descriptions at.
    pub fn with_wcol(mut self, wcol: usize) -> Self {
        self.wcol = wcol;
        self
    }
}

/// The plain text exporter.
#[derive(Debug, Clone, Default)]
pub struct TextView {
    options: TextOptions,
}

impl TextView {
    pub fn new(options: TextOptions) -> Self {
        Self { options }
    }
}

impl Exporter for TextView {
    fn export(&self, gloss: &Glossary) -> Result<Rendered, Error> {
        let lang = output_lang(gloss, self.options.lang)?;
        let env = output_env(gloss, self.options.env)?;
        let binding = Binding::new(gloss, Some(lang), env);
        let plain = PlainFormatter::new(&binding);

        let mut listed: Vec<_> = gloss
            .concepts()
            .filter_map(|(_, concept)| {
                let terms = binding.terms(&concept.term);
                let first = plain.format(&terms.first()?.nom);
                Some((SortKey::new(&first, concept.id, 0), concept, terms))
            })
            .collect();
        listed.sort_by(|a, b| a.0.cmp(&b.0));

        let others: Vec<Binding<'_>> = gloss
            .keyed(KeyedKind::Language)
            .keys()
            .filter(|other| **other != lang)
            .map(|other| Binding::new(gloss, Some(*other), env))
            .collect();

        let mut entries = Vec::with_capacity(listed.len());
        for (_, concept, terms) in &listed {
            let names: Vec<String> = terms.iter().map(|term| plain.format(&term.nom)).collect();
            let mut entry = format!("{TERM_INDENT}{}", names.join(", "));

            let foreign: Vec<String> = others
                .iter()
                .filter_map(|other| {
                    let terms = other.terms(&concept.term);
                    if terms.is_empty() {
                        return None;
                    }
                    let names: Vec<String> =
                        terms.iter().map(|term| plain.format(&term.nom)).collect();
                    let short = binding.short_name_of(KeyedKind::Language, other.lang()?);
                    Some(format!("{short} /{}/", names.join(", ")))
                })
                .collect();
            if !foreign.is_empty() {
                entry.push_str(&format!(" ({})", foreign.join("; ")));
            }

            let descs = binding.texts(&concept.desc);
            let numbered = descs.len() > 1;
            let descs: Vec<String> = descs
                .iter()
                .enumerate()
                .map(|(i, desc)| {
                    let formatter = PlainFormatter::new(&binding)
                        .with_wrap(self.options.wcol)
                        .with_indent(DESC_INDENT);
                    let formatter = if numbered {
                        formatter.with_prefix(format!("{}. ", i + 1))
                    } else {
                        formatter
                    };
                    formatter.format(desc)
                })
                .filter(|desc| !desc.is_empty())
                .collect();
            if !descs.is_empty() {
                entry.push('\n');
                entry.push_str(&descs.join("\n\n"));
            }
            entries.push(entry);
        }

        let title = title(gloss, &binding);
        let rule = "-".repeat(title.chars().count());
        let mut page = format!("{title}\n{rule}\n\n");
        page.push_str(&entries.join("\n\n"));
        page.push('\n');

        info!(lang = lang.to_string(), concepts = entries.len(); "Rendered text view");
        Ok(Rendered::new(page, Vec::new(), binding.take_warnings()))
    }
}

fn title(gloss: &Glossary, binding: &Binding<'_>) -> String {
    let title = binding
        .texts(&gloss.meta().title)
        .first()
        .map(|text| PlainFormatter::new(binding).format(text))
        .or_else(|| gloss.meta().id.clone())
        .unwrap_or_default();
    match binding.env() {
        Some(env) => format!("{title} ({})", binding.name_of(KeyedKind::Environment, env)),
        None => title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{testing::fruit, textfmt::ResolutionWarning};

    fn render(gloss: &Glossary, options: TextOptions) -> Rendered {
        TextView::new(options).export(gloss).expect("rendered")
    }

    #[test]
    fn test_default_language_view() {
        let gloss = fruit();
        let rendered = render(&gloss, TextOptions::default());

        assert_eq!(
            rendered.page(),
            "Fruit (Formal)\n\
             --------------\n\
             \n\
             \x20 apple (sr /jabuka/)\n\
             \x20   A round fruit.\n\
             \n\
             \x20 fruit\n\
             \x20   Seed-bearing part, see [?nothing].\n"
        );
        assert_eq!(
            rendered.warnings(),
            &[ResolutionWarning::DanglingReference {
                concept: Key::new("nothing")
            }]
        );
    }

    #[test]
    fn test_other_language_view() {
        let gloss = fruit();
        let rendered = render(&gloss, TextOptions::default().with_lang(Some(Key::new("sr"))));

        assert_eq!(
            rendered.page(),
            "Voće (formalno)\n\
             ---------------\n\
             \n\
             \x20 jabuka (en /apple/)\n\
             \x20   Okruglo voće.\n\
             \n\
             \x20 kruška\n"
        );
    }

    #[test]
    fn test_descriptions_numbered_and_wrapped() {
        let gloss = divergloss_parser::parse(
            r#"<glossary lang="en">
                 <keydefs><languages><language id="en"/></languages></keydefs>
                 <concepts><concept id="car">
                   <desc>A road vehicle with an engine and four wheels.</desc>
                   <desc>A railway carriage.</desc>
                   <term>car</term>
                 </concept></concepts>
               </glossary>"#,
        )
        .expect("valid glossary");
        let rendered = render(&gloss, TextOptions::default().with_wcol(30));

        assert_eq!(
            rendered.page(),
            "\n\n\
             \x20 car\n\
             \x20   1. A road vehicle with an\n\
             \x20   engine and four wheels.\n\
             \n\
             \x20   2. A railway carriage.\n"
        );
    }

    #[test]
    fn test_undeclared_language() {
        let gloss = fruit();
        let result = TextView::new(TextOptions::default().with_lang(Some(Key::new("de"))))
            .export(&gloss);
        assert!(matches!(result, Err(Error::Option(_))));
    }

    #[test]
    fn test_from_config() {
        let options = TextOptions::from_config(&TextConfig::new(40));
        assert_eq!(options.wcol, 40);
        assert_eq!(TextOptions::default().wcol, DEFAULT_WCOL);
    }
}
