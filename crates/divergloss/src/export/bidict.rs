//! Bilingual dictionary pages.
//!
//! A dictionary lists every origin-language term of the glossary once,
//! next to the target-language terms of all concepts it names, in
//! alphabetical order with a separator row per initial letter. Target terms
//! of the same concepts form a term group; the descriptions of a group are
//! collapsed under it and expanded by the page script.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use indexmap::IndexMap;
use log::{debug, info};

use divergloss_core::{Glossary, KeyedKind, gnode::Term, key::Key};

use super::{
    Asset, Error, Exporter, Rendered, UniqueIds, check_declared, output_env,
    style::{SCRIPT, Style, StyleOptions},
};
use crate::{
    collate::{SortKey, bucket, fold},
    config::BidictConfig,
    textfmt::{
        Binding, HtmlFormatter, PlainFormatter, ResolutionWarning,
        markup::{LineAccumulator, empty_tag, escape, etag, stag, wtext},
    },
};

const INDENT: &str = "  ";

/// Stem of the asset file names when none is given.
pub const DEFAULT_ASSET_STEM: &str = "gloss";

/// Options of a bilingual dictionary page.
#[derive(Debug, Clone)]
pub struct BidictOptions {
    olang: Key,
    tlang: Key,
    env: Option<Key>,
    style: Option<String>,
    styleopt: Option<String>,
    allinone: bool,
    header: Option<String>,
    footer: Option<String>,
    describe_in: Option<Key>,
    asset_stem: String,
}

impl BidictOptions {
    pub fn new(olang: Key, tlang: Key) -> Self {
        Self {
            olang,
            tlang,
            env: None,
            style: None,
            styleopt: None,
            allinone: false,
            header: None,
            footer: None,
            describe_in: None,
            asset_stem: DEFAULT_ASSET_STEM.to_string(),
        }
    }

    /// Options with the page defaults of a configuration.
    pub fn from_config(config: &BidictConfig, olang: Key, tlang: Key) -> Self {
        Self {
            style: config.style().map(str::to_string),
            styleopt: config.styleopt().map(str::to_string),
            allinone: config.allinone(),
            describe_in: config.describe_in().map(Key::new),
            ..Self::new(olang, tlang)
        }
    }

    /// Environment to render for, instead of the glossary default.
    pub fn with_env(mut self, env: Option<Key>) -> Self {
        self.env = env;
        self
    }

    /// Built-in style sheet, by name.
    pub fn with_style(mut self, style: Option<String>) -> Self {
        self.style = style;
        self
    }

    pub fn with_styleopt(mut self, styleopt: Option<String>) -> Self {
        self.styleopt = styleopt;
        self
    }

    /// Embed the script and style sheet instead of referring to them.
    pub fn with_allinone(mut self, allinone: bool) -> Self {
        self.allinone = allinone;
        self
    }

    /// Page header replacing the generated one.
    pub fn with_header(mut self, header: Option<String>) -> Self {
        self.header = header;
        self
    }

    /// Page footer replacing the generated one.
    pub fn with_footer(mut self, footer: Option<String>) -> Self {
        self.footer = footer;
        self
    }

    /// Language of descriptions and page framing; the origin language by
    /// default.
    pub fn with_describe_in(mut self, lang: Option<Key>) -> Self {
        self.describe_in = lang;
        self
    }

    /// Stem of the asset file names the page refers to.
    pub fn with_asset_stem(mut self, stem: impl Into<String>) -> Self {
        self.asset_stem = stem.into();
        self
    }

    pub fn olang(&self) -> Key {
        self.olang
    }

    pub fn tlang(&self) -> Key {
        self.tlang
    }
}

/// The bilingual dictionary exporter.
///
/// # Examples
///
/// ```
/// # use divergloss::export::{Exporter, bidict::{Bidict, BidictOptions}};
/// # use divergloss_core::key::Key;
/// let gloss = divergloss_parser::parse(
///     r#"<glossary lang="en"><keydefs><languages>
///          <language id="en"><name>English</name></language>
///          <language id="fr"><name>French</name></language>
///        </languages></keydefs>
///        <concepts><concept id="apple">
///          <term>apple</term><term lang="fr">pomme</term>
///        </concept></concepts></glossary>"#,
/// ).unwrap();
///
/// let bidict = Bidict::new(BidictOptions::new(Key::new("en"), Key::new("fr")));
/// let rendered = bidict.export(&gloss).unwrap();
/// assert!(rendered.page().contains("<p class='bd-ttline'>pomme</p>"));
/// assert_eq!(rendered.assets()[0].extension(), "js");
/// ```
#[derive(Debug, Clone)]
pub struct Bidict {
    options: BidictOptions,
}

impl Bidict {
    pub fn new(options: BidictOptions) -> Self {
        Self { options }
    }
}

/// The three bindings of a page.
struct Bindings<'g> {
    origin: Binding<'g>,
    target: Binding<'g>,
    page: Binding<'g>,
}

impl Bindings<'_> {
    fn take_warnings(&self) -> Vec<ResolutionWarning> {
        let mut warnings = Vec::new();
        for binding in [&self.origin, &self.target, &self.page] {
            for warning in binding.take_warnings() {
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }
        }
        warnings
    }
}

impl Exporter for Bidict {
    fn export(&self, gloss: &Glossary) -> Result<Rendered, Error> {
        let options = &self.options;
        check_declared(gloss, KeyedKind::Language, options.olang, "origin language")?;
        check_declared(gloss, KeyedKind::Language, options.tlang, "target language")?;
        let env = output_env(gloss, options.env)?;
        let page_lang = options.describe_in.unwrap_or(options.olang);
        check_declared(gloss, KeyedKind::Language, page_lang, "description language")?;

        let style = options
            .style
            .as_deref()
            .map(str::parse::<Style>)
            .transpose()?;
        let styleopt = StyleOptions::parse(options.styleopt.as_deref().unwrap_or_default())?;
        let css = style.map(|style| style.render(&styleopt)).transpose()?;

        let bindings = Bindings {
            origin: Binding::new(gloss, Some(options.olang), env),
            target: Binding::new(gloss, Some(options.tlang), env),
            page: Binding::new(gloss, Some(page_lang), env),
        };

        let rows = collect_rows(gloss, &bindings);
        if rows.is_empty() {
            info!(
                olang = options.olang.to_string(),
                tlang = options.tlang.to_string();
                "No concept has terms in both languages"
            );
        }

        let mut accl = LineAccumulator::new(INDENT);
        match &options.header {
            Some(header) => accl.extend(0, header),
            None => self.default_header(&mut accl, gloss, &bindings.page, style.is_some()),
        }
        if options.allinone {
            embed_assets(&mut accl, css.as_deref());
        }
        write_table(&mut accl, gloss, &rows, &bindings);
        match &options.footer {
            Some(footer) => accl.extend(0, footer),
            None => {
                accl.push(1, etag("body"));
                accl.push(0, etag("html"));
            }
        }

        let mut assets = Vec::new();
        if !options.allinone {
            assets.push(Asset::new("js", SCRIPT.to_string()));
            if let Some(css) = css {
                assets.push(Asset::new("css", css));
            }
        }

        info!(
            olang = options.olang.to_string(),
            tlang = options.tlang.to_string(),
            rows = rows.len();
            "Rendered bilingual dictionary"
        );
        Ok(Rendered::new(accl.finish(), assets, bindings.take_warnings()))
    }
}

impl Bidict {
    fn default_header(
        &self,
        accl: &mut LineAccumulator,
        gloss: &Glossary,
        page: &Binding<'_>,
        styled: bool,
    ) {
        let lang = page.lang().map(|lang| lang.to_string()).unwrap_or_default();
        let stem = &self.options.asset_stem;

        accl.push(0, "<?xml version='1.0' encoding='UTF-8'?>");
        accl.push(
            0,
            "<!DOCTYPE html PUBLIC '-//W3C//DTD XHTML 1.0 Strict//EN' \
             'http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd'>",
        );
        accl.push(0, "<!-- ===== AUTOGENERATED FILE, DO NOT EDIT ===== -->");
        accl.push(
            0,
            stag(
                "html",
                &[
                    ("xmlns", "http://www.w3.org/1999/xhtml"),
                    ("lang", lang.as_str()),
                    ("xml:lang", lang.as_str()),
                ],
            ),
        );
        accl.push(1, stag("head", &[]));
        accl.push(
            2,
            empty_tag(
                "meta",
                &[
                    ("http-equiv", "Content-type"),
                    ("content", "text/html; charset=UTF-8"),
                ],
            ),
        );
        if !self.options.allinone {
            if styled {
                let href = format!("{stem}.css");
                accl.push(
                    2,
                    empty_tag(
                        "link",
                        &[("rel", "stylesheet"), ("type", "text/css"), ("href", href.as_str())],
                    ),
                );
            }
            let src = format!("{stem}.js");
            accl.push(
                2,
                wtext("", "script", &[("type", "text/javascript"), ("src", src.as_str())]),
            );
        }
        accl.push(2, wtext(&escape(&page_title(gloss, page)), "title", &[]));
        accl.push(1, etag("head"));
        accl.push(1, stag("body", &[]));
        accl.blank();
    }
}

/// Title of the glossary in the page language, with the environment name.
fn page_title(gloss: &Glossary, page: &Binding<'_>) -> String {
    let title = page
        .texts(&gloss.meta().title)
        .first()
        .map(|text| PlainFormatter::new(page).format(text))
        .or_else(|| gloss.meta().id.clone())
        .unwrap_or_default();
    match page.env() {
        Some(env) => format!("{title} ({})", page.name_of(KeyedKind::Environment, env)),
        None => title,
    }
}

fn embed_assets(accl: &mut LineAccumulator, css: Option<&str>) {
    accl.push(2, "<script type='text/javascript'>");
    accl.extend(2, SCRIPT);
    accl.push(2, "</script>");
    accl.blank();
    if let Some(css) = css {
        accl.push(2, "<style type='text/css'>");
        accl.extend(2, css);
        accl.push(2, "</style>");
        accl.blank();
    }
}

/// One line of the dictionary: an origin term with the target terms of
/// every concept it names.
#[derive(Debug)]
struct Row<'g> {
    sort_key: SortKey,
    oterm: String,
    /// First concept listing the origin term, which names the row anchor
    primary: Key,
    /// Position of the origin term among the primary concept's terms
    position: usize,
    anchor: String,
    groups: Vec<TermGroup<'g>>,
}

/// Target terms shared by exactly the same concepts.
#[derive(Debug)]
struct TermGroup<'g> {
    concepts: Vec<Key>,
    terms: Vec<TargetTerm<'g>>,
    details_id: String,
    descs: Vec<String>,
}

/// A target nominal form with every term it stands for.
#[derive(Debug)]
struct TargetTerm<'g> {
    nom: String,
    forms: Vec<&'g Term>,
}

/// Target nominal forms of one origin term while rows are collected.
#[derive(Debug)]
struct Entry<'g> {
    primary: Key,
    position: usize,
    targets: IndexMap<String, (BTreeSet<Key>, Vec<&'g Term>)>,
}

/// Rows of every origin term whose concept has target terms, sorted, with
/// anchors, details and descriptions filled in.
fn collect_rows<'g>(gloss: &'g Glossary, bindings: &Bindings<'g>) -> Vec<Row<'g>> {
    let origin = PlainFormatter::new(&bindings.origin);
    let target = PlainFormatter::new(&bindings.target);

    let mut entries: IndexMap<String, Entry<'g>> = IndexMap::new();
    for (_, concept) in gloss.concepts() {
        let oterms = bindings.origin.terms(&concept.term);
        if oterms.is_empty() {
            debug!(concept = concept.id.to_string(); "No origin term, skipped");
            continue;
        }
        let tterms = bindings.target.terms(&concept.term);
        if tterms.is_empty() {
            if let Some(lang) = bindings.target.lang() {
                bindings.target.warn(ResolutionWarning::UntranslatedConcept {
                    concept: concept.id,
                    lang,
                });
            }
            continue;
        }

        for (position, oterm) in oterms.iter().enumerate() {
            let entry = entries
                .entry(origin.format(&oterm.nom))
                .or_insert_with(|| Entry {
                    primary: concept.id,
                    position,
                    targets: IndexMap::new(),
                });
            for tterm in &tterms {
                let (concepts, forms) = entry.targets.entry(target.format(&tterm.nom)).or_default();
                concepts.insert(concept.id);
                if !forms.iter().any(|form| std::ptr::eq(*form, *tterm)) {
                    forms.push(*tterm);
                }
            }
        }
    }

    let mut rows: Vec<Row<'g>> = entries
        .into_iter()
        .map(|(oterm, entry)| Row {
            sort_key: SortKey::new(&oterm, entry.primary, entry.position),
            oterm,
            primary: entry.primary,
            position: entry.position,
            anchor: String::new(),
            groups: term_groups(entry.targets),
        })
        .collect();
    rows.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));

    let mut ids = UniqueIds::new(gloss.concepts().map(|(_, concept)| concept.id.to_string()));
    assign_anchors(&mut rows, &mut ids);
    describe(gloss, &mut rows, &bindings.page, &mut ids);
    rows
}

/// Group target nominal forms by the set of concepts they translate.
///
/// Forms sort alphabetically inside a group and groups by their first form.
fn term_groups<'g>(targets: IndexMap<String, (BTreeSet<Key>, Vec<&'g Term>)>) -> Vec<TermGroup<'g>> {
    let mut grouped: BTreeMap<Vec<Key>, Vec<TargetTerm<'g>>> = BTreeMap::new();
    for (nom, (concepts, forms)) in targets {
        grouped
            .entry(concepts.into_iter().collect())
            .or_default()
            .push(TargetTerm { nom, forms });
    }

    let mut groups: Vec<TermGroup<'g>> = grouped
        .into_iter()
        .map(|(concepts, mut terms)| {
            terms.sort_by_cached_key(|term| (fold(&term.nom), term.nom.clone()));
            TermGroup {
                concepts,
                terms,
                details_id: String::new(),
                descs: Vec::new(),
            }
        })
        .collect();
    groups.sort_by_cached_key(|group| {
        group
            .terms
            .first()
            .map(|term| (fold(&term.nom), term.nom.clone()))
    });
    groups
}

/// Anchor each row by its primary concept: the bare key when the concept
/// heads a single row, `KEY-N` for its N-th origin term otherwise.
fn assign_anchors(rows: &mut [Row<'_>], ids: &mut UniqueIds) {
    let mut headed: HashMap<Key, usize> = HashMap::new();
    for row in rows.iter() {
        *headed.entry(row.primary).or_default() += 1;
    }

    for row in rows.iter_mut() {
        let candidate = if headed.get(&row.primary).copied().unwrap_or_default() > 1 {
            format!("{}-{}", row.primary, row.position + 1)
        } else {
            row.primary.to_string()
        };
        row.anchor = ids.issue(candidate, Some(row.primary));
    }
}

/// Fill in details identifiers and descriptions of every term group.
///
/// Cross-references link to the first row listing the concept.
fn describe(gloss: &Glossary, rows: &mut [Row<'_>], page: &Binding<'_>, ids: &mut UniqueIds) {
    let mut refbase: HashMap<Key, String> = HashMap::new();
    for row in rows.iter() {
        for concept in row.groups.iter().flat_map(|group| &group.concepts) {
            refbase.entry(*concept).or_insert_with(|| row.anchor.clone());
        }
    }
    let html = HtmlFormatter::new(page)
        .with_refbase(&refbase)
        .with_wrap_tag("p")
        .with_pclass("bd-desc");

    for row in rows.iter_mut() {
        let several = row.groups.len() > 1;
        for (index, group) in row.groups.iter_mut().enumerate() {
            let candidate = if several {
                format!("details-{}-{}", row.anchor, index + 1)
            } else {
                format!("details-{}", row.anchor)
            };
            group.details_id = ids.issue(candidate, None);
            group.descs = numbered(
                group
                    .concepts
                    .iter()
                    .filter_map(|key| gloss.concept(*key))
                    .flat_map(|concept| page.texts(&concept.desc))
                    .map(|text| html.format(text))
                    .filter(|desc| !desc.is_empty())
                    .collect(),
            );
        }
    }
}

/// Number descriptions inside their first element when there are several.
fn numbered(descs: Vec<String>) -> Vec<String> {
    if descs.len() < 2 {
        return descs;
    }
    descs
        .into_iter()
        .enumerate()
        .map(|(i, desc)| desc.replacen('>', &format!(">{}. ", i + 1), 1))
        .collect()
}

fn write_table(
    accl: &mut LineAccumulator,
    gloss: &Glossary,
    rows: &[Row<'_>],
    bindings: &Bindings<'_>,
) {
    let page = &bindings.page;
    accl.push(2, stag("table", &[("class", "bd-table")]));
    accl.blank();

    accl.push(3, stag("tr", &[("class", "bd-header")]));
    for (lang, class) in [
        (bindings.origin.lang(), "bd-header-ol"),
        (bindings.target.lang(), "bd-header-tl"),
    ] {
        let name = lang
            .map(|lang| page.name_of(KeyedKind::Language, lang))
            .unwrap_or_default();
        accl.push(4, wtext(&escape(&name), "th", &[("class", class)]));
    }
    accl.push(3, etag("tr"));
    accl.blank();

    let mut current_bucket: Option<String> = None;
    let mut in_bucket = 0;
    for row in rows {
        let row_bucket = bucket(&row.oterm);
        if current_bucket.as_ref() != Some(&row_bucket) {
            accl.push(3, stag("tr", &[("class", "bd-alsep")]));
            accl.push(
                4,
                wtext(
                    &escape(&row_bucket),
                    "td",
                    &[("class", "bd-alsep-al"), ("colspan", "2")],
                ),
            );
            accl.push(3, etag("tr"));
            current_bucket = Some(row_bucket);
            in_bucket = 0;
        }
        in_bucket += 1;

        let parity = if in_bucket % 2 == 1 {
            "bd-entry-odd"
        } else {
            "bd-entry-even"
        };
        accl.push(3, stag("tr", &[("class", parity)]));
        write_row(accl, gloss, row, &bindings.target);
        accl.push(3, etag("tr"));
        accl.blank();
    }

    accl.push(2, etag("table"));
    accl.blank();
}

fn write_row(accl: &mut LineAccumulator, gloss: &Glossary, row: &Row<'_>, target: &Binding<'_>) {
    accl.push(4, stag("td", &[("class", "bd-oterm")]));
    accl.push(5, empty_tag("span", &[("id", row.anchor.as_str())]));
    accl.push(5, wtext(&escape(&row.oterm), "p", &[("class", "bd-otline")]));
    accl.push(4, etag("td"));

    accl.push(4, stag("td", &[("class", "bd-tterms")]));
    let several = row.groups.len() > 1;
    for (index, group) in row.groups.iter().enumerate() {
        accl.push(5, stag("div", &[("class", "bd-ttgroup")]));

        if !group.descs.is_empty() {
            let onclick = format!("return show_hide(this, '{}')", group.details_id);
            accl.push(6, stag("div", &[("class", "bd-edctl")]));
            accl.push(
                7,
                wtext(
                    "[+]",
                    "a",
                    &[
                        ("class", "bd-edctl"),
                        ("href", "#"),
                        ("onclick", onclick.as_str()),
                        ("title", "Show details"),
                    ],
                ),
            );
            accl.push(6, etag("div"));
        }

        let tline: Vec<String> = group
            .terms
            .iter()
            .map(|term| target_term(gloss, term, target))
            .collect();
        let mut tline = tline.join(", ");
        if several {
            tline = format!("{}. {tline}", index + 1);
        }
        accl.push(6, wtext(&tline, "p", &[("class", "bd-ttline")]));

        if !group.descs.is_empty() {
            accl.push(
                6,
                stag(
                    "div",
                    &[("id", group.details_id.as_str()), ("style", "display: none;")],
                ),
            );
            for desc in &group.descs {
                accl.extend(7, desc);
            }
            accl.push(6, etag("div"));
        }

        accl.push(5, etag("div"));
    }
    accl.push(4, etag("td"));
    debug!(
        oterm = row.oterm.as_str(),
        anchor = row.anchor.as_str(),
        groups = row.groups.len();
        "Row written"
    );
}

/// A target term as markup, followed by the declensions of all its forms
/// grouped by grammar class: `term (<i>gen.</i> v1, v2; <i>dat.</i> v3)`.
fn target_term(gloss: &Glossary, term: &TargetTerm<'_>, target: &Binding<'_>) -> String {
    let plain = PlainFormatter::new(target);
    let mut groups: IndexMap<Option<Key>, Vec<String>> = IndexMap::new();
    for decl in term
        .forms
        .iter()
        .flat_map(|form| &form.decl)
        .filter_map(|id| gloss.node(*id).kind().as_decl())
    {
        let form = escape(&plain.format(&decl.text));
        let forms = groups.entry(decl.gr).or_default();
        if !form.is_empty() && !forms.contains(&form) {
            forms.push(form);
        }
    }
    groups.retain(|_, forms| !forms.is_empty());

    let nom = escape(&term.nom);
    if groups.is_empty() {
        return nom;
    }
    let decls: Vec<String> = groups
        .into_iter()
        .map(|(gr, forms)| match gr {
            Some(gr) => {
                let name = escape(&target.short_name_of(KeyedKind::Gramm, gr));
                format!("<i>{name}</i> {}", forms.join(", "))
            }
            None => forms.join(", "),
        })
        .collect();
    format!("{nom} ({})", decls.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fruit;

    const CARS: &str = r#"
        <glossary id="cars" lang="en">
          <metadata><title>Cars</title></metadata>
          <keydefs>
            <languages>
              <language id="en"><name>English</name></language>
              <language id="sr"><name>Serbian</name></language>
            </languages>
          </keydefs>
          <concepts>
            <concept id="car">
              <desc>A road vehicle.</desc>
              <desc>See also <ref c="wheel">wheels</ref>.</desc>
              <term>car</term>
              <term>automobile</term>
              <term lang="sr">auto</term>
              <term lang="sr">kola</term>
            </concept>
            <concept id="wheel">
              <term>wheel</term>
              <term>4x4 wheel</term>
              <term lang="sr">točak</term>
            </concept>
            <concept id="axle">
              <term>axle</term>
              <term lang="sr">osovina</term>
            </concept>
          </concepts>
        </glossary>
    "#;

    fn render(gloss: &Glossary, options: BidictOptions) -> Rendered {
        Bidict::new(options).export(gloss).expect("rendered")
    }

    fn en_sr() -> BidictOptions {
        BidictOptions::new(Key::new("en"), Key::new("sr"))
    }

    #[test]
    fn test_row_with_declensions_and_details() {
        let gloss = fruit();
        let rendered = render(&gloss, en_sr());
        let page = rendered.page();

        let expected = "\
      <tr class='bd-alsep'>
        <td class='bd-alsep-al' colspan='2'>A</td>
      </tr>
      <tr class='bd-entry-odd'>
        <td class='bd-oterm'>
          <span id='apple'/>
          <p class='bd-otline'>apple</p>
        </td>
        <td class='bd-tterms'>
          <div class='bd-ttgroup'>
            <div class='bd-edctl'>
              <a class='bd-edctl' href='#' onclick='return show_hide(this, &apos;details-apple&apos;)' title='Show details'>[+]</a>
            </div>
            <p class='bd-ttline'>jabuka (<i>gen.</i> jabuke)</p>
            <div id='details-apple' style='display: none;'>
              <p class='bd-desc'>A round fruit.</p>
            </div>
          </div>
        </td>
      </tr>
";
        assert!(page.contains(expected), "{page}");
        assert!(page.contains("<th class='bd-header-ol'>English</th>"));
        assert!(page.contains("<th class='bd-header-tl'>Serbian</th>"));
    }

    #[test]
    fn test_concepts_without_terms_skipped() {
        let gloss = fruit();
        let rendered = render(&gloss, en_sr());

        // pear has no English term, fruit has no Serbian one
        assert!(!rendered.page().contains("kruška"));
        assert!(!rendered.page().contains("span id='fruit'"));
        assert_eq!(
            rendered.warnings(),
            &[ResolutionWarning::UntranslatedConcept {
                concept: Key::new("fruit"),
                lang: Key::new("sr"),
            }]
        );
    }

    #[test]
    fn test_default_header_and_assets() {
        let gloss = fruit();
        let options = en_sr()
            .with_style(Some("plain".to_string()))
            .with_asset_stem("fruit-sr");
        let rendered = render(&gloss, options);
        let page = rendered.page();

        assert!(page.starts_with("<?xml version='1.0' encoding='UTF-8'?>\n<!DOCTYPE html"));
        assert!(page.contains(
            "<html lang='en' xml:lang='en' xmlns='http://www.w3.org/1999/xhtml'>"
        ));
        assert!(page.contains("    <link href='fruit-sr.css' rel='stylesheet' type='text/css'/>"));
        assert!(page.contains("    <script src='fruit-sr.js' type='text/javascript'></script>"));
        assert!(page.contains("    <title>Fruit (Formal)</title>"));
        assert!(page.ends_with("  </body>\n</html>\n"));

        let extensions: Vec<_> = rendered.assets().iter().map(Asset::extension).collect();
        assert_eq!(extensions, ["js", "css"]);
    }

    #[test]
    fn test_allinone_embeds_assets() {
        let gloss = fruit();
        let options = en_sr()
            .with_style(Some("igloo".to_string()))
            .with_styleopt(Some("oterm_col_width=25%".to_string()))
            .with_allinone(true);
        let rendered = render(&gloss, options);

        assert!(rendered.assets().is_empty());
        assert!(rendered.page().contains("    <script type='text/javascript'>\n    function show_hide"));
        assert!(rendered.page().contains("width: 25%;"));
        assert!(!rendered.page().contains("<link"));
    }

    #[test]
    fn test_user_header_and_footer() {
        let gloss = fruit();
        let options = en_sr()
            .with_header(Some("<html><body>\n".to_string()))
            .with_footer(Some("</body></html>\n".to_string()));
        let page = render(&gloss, options).into_page();

        assert!(page.starts_with("<html><body>\n    <table class='bd-table'>"));
        assert!(page.ends_with("    </table>\n\n</body></html>\n"));
    }

    #[test]
    fn test_describe_in_target_language() {
        let gloss = fruit();
        let options = en_sr().with_describe_in(Some(Key::new("sr")));
        let page = render(&gloss, options).into_page();

        assert!(page.contains("<p class='bd-desc'>Okruglo voće.</p>"));
        assert!(page.contains("<th class='bd-header-ol'>engleski</th>"));
        assert!(page.contains("<title>Voće (formalno)</title>"));
    }

    #[test]
    fn test_synonyms_get_one_row_each() {
        let gloss = divergloss_parser::parse(CARS).expect("valid glossary");
        let page = render(&gloss, en_sr()).into_page();

        for anchor in ["car-1", "car-2", "wheel-1", "wheel-2", "axle"] {
            assert!(page.contains(&format!("<span id='{anchor}'/>")), "{anchor}");
        }
        assert_eq!(page.matches("<p class='bd-ttline'>auto, kola</p>").count(), 2);

        let order: Vec<usize> = ["4x4 wheel", "automobile", "axle", "car", "wheel"]
            .iter()
            .map(|term| {
                let line = format!("<p class='bd-otline'>{term}</p>");
                page.find(&line).expect(term)
            })
            .collect();
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "{page}");

        assert!(page.contains("colspan='2'>#</td>"));
        assert!(page.contains(
            "<tr class='bd-entry-odd'>\n        <td class='bd-oterm'>\n          <span id='car-2'/>"
        ));
        assert!(page.contains(
            "<tr class='bd-entry-even'>\n        <td class='bd-oterm'>\n          <span id='axle'/>"
        ));
    }

    #[test]
    fn test_descriptions_numbered_and_linked() {
        let gloss = divergloss_parser::parse(CARS).expect("valid glossary");
        let page = render(&gloss, en_sr()).into_page();

        assert!(page.contains("<p class='bd-desc'>1. A road vehicle.</p>"));
        assert!(page.contains(
            "<p class='bd-desc'>2. See also <a class='cref' href='#wheel-2'>wheel</a>.</p>"
        ));
    }

    const HOMONYMS: &str = r#"
        <glossary id="banks" lang="en">
          <keydefs>
            <languages>
              <language id="en"><name>English</name></language>
              <language id="sr"><name>Serbian</name></language>
            </languages>
          </keydefs>
          <concepts>
            <concept id="bank-money">
              <desc>A financial institution.</desc>
              <term>bank</term>
              <term lang="sr">banka</term>
            </concept>
            <concept id="bank-river">
              <desc>The edge of a river.</desc>
              <term>bank</term>
              <term lang="sr">obala</term>
              <term lang="sr">breg</term>
            </concept>
            <concept id="shore">
              <term>shore</term>
              <term lang="sr">obala</term>
            </concept>
          </concepts>
        </glossary>
    "#;

    /// Every `id` attribute value on a page.
    fn ids(page: &str) -> Vec<&str> {
        page.split(" id='")
            .skip(1)
            .filter_map(|rest| rest.split('\'').next())
            .collect()
    }

    #[test]
    fn test_homonyms_share_one_row() {
        let gloss = divergloss_parser::parse(HOMONYMS).expect("valid glossary");
        let page = render(&gloss, en_sr()).into_page();

        assert_eq!(page.matches("<p class='bd-otline'>bank</p>").count(), 1, "{page}");
        assert_eq!(page.matches("<div class='bd-ttgroup'>").count(), 3);

        let expected = "\
        <td class='bd-tterms'>
          <div class='bd-ttgroup'>
            <div class='bd-edctl'>
              <a class='bd-edctl' href='#' onclick='return show_hide(this, &apos;details-bank-money-1&apos;)' title='Show details'>[+]</a>
            </div>
            <p class='bd-ttline'>1. banka</p>
            <div id='details-bank-money-1' style='display: none;'>
              <p class='bd-desc'>A financial institution.</p>
            </div>
          </div>
          <div class='bd-ttgroup'>
            <div class='bd-edctl'>
              <a class='bd-edctl' href='#' onclick='return show_hide(this, &apos;details-bank-money-2&apos;)' title='Show details'>[+]</a>
            </div>
            <p class='bd-ttline'>2. breg, obala</p>
            <div id='details-bank-money-2' style='display: none;'>
              <p class='bd-desc'>The edge of a river.</p>
            </div>
          </div>
        </td>
";
        assert!(page.contains(expected), "{page}");
        assert!(page.contains("<span id='bank-money'/>"));
        assert!(page.contains("<p class='bd-ttline'>obala</p>"));
    }

    #[test]
    fn test_anchors_never_shadow_concept_keys() {
        let gloss = divergloss_parser::parse(
            r#"<glossary id="vehicles" lang="en">
                 <keydefs><languages>
                   <language id="en"><name>English</name></language>
                   <language id="sr"><name>Serbian</name></language>
                 </languages></keydefs>
                 <concepts>
                   <concept id="car">
                     <desc>A road vehicle.</desc>
                     <term>car</term><term>auto</term><term lang="sr">kola</term>
                   </concept>
                   <concept id="car-1">
                     <desc>A horse-drawn vehicle.</desc>
                     <term>carriage</term><term lang="sr">kočija</term>
                   </concept>
                 </concepts>
               </glossary>"#,
        )
        .expect("valid glossary");
        let page = render(&gloss, en_sr()).into_page();

        let mut all = ids(&page);
        let count = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), count, "{page}");

        assert_eq!(page.matches("id='car-1'").count(), 1);
        let carriage = page.find("<p class='bd-otline'>carriage</p>").expect("carriage row");
        assert!(page[..carriage].ends_with("<span id='car-1'/>\n          "), "{page}");
        assert!(page.contains("<span id='car-2'/>\n          <p class='bd-otline'>auto</p>"));
        assert!(page.contains("<span id='car-1-2'/>\n          <p class='bd-otline'>car</p>"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let gloss = divergloss_parser::parse(CARS).expect("valid glossary");
        let first = render(&gloss, en_sr()).into_page();
        let second = render(&gloss, en_sr()).into_page();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bad_options_fail_before_rendering() {
        let gloss = fruit();
        let bad = [
            BidictOptions::new(Key::new("de"), Key::new("sr")),
            en_sr().with_env(Some(Key::new("poetic"))),
            en_sr().with_describe_in(Some(Key::new("fr"))),
            en_sr().with_style(Some("neon".to_string())),
            en_sr()
                .with_style(Some("plain".to_string()))
                .with_styleopt(Some("width".to_string())),
        ];
        for options in bad {
            assert!(matches!(
                Bidict::new(options).export(&gloss),
                Err(Error::Option(_))
            ));
        }
    }

    #[test]
    fn test_from_config() {
        let config = BidictConfig::new(
            Some("igloo".to_string()),
            None,
            true,
            Some("sr".to_string()),
        );
        let options = BidictOptions::from_config(&config, Key::new("en"), Key::new("sr"));
        assert_eq!(options.style.as_deref(), Some("igloo"));
        assert!(options.allinone);
        assert_eq!(options.describe_in, Some(Key::new("sr")));
        assert_eq!(options.asset_stem, DEFAULT_ASSET_STEM);
    }
}
