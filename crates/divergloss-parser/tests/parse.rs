use std::fs;

use proptest::prelude::*;

use divergloss_core::{
    KeyedKind, NodeId,
    dset::LangEnv,
    gnode::Kind,
    key::Key,
    text::{InlineKind, Segment},
};
use divergloss_parser::{ErrorCode, ParseError, SourceMap, load_file, parse, parse_document};

const KEYDEFS: &str = r#"
  <keydefs>
    <languages>
      <language id="en"><name>English</name><shortname>en</shortname></language>
      <language id="sr"><name lang="sr">srpski</name></language>
    </languages>
    <environments>
      <environment id="formal"><name>formal usage</name></environment>
      <environment id="slang" closeto="formal"><name>slang</name></environment>
    </environments>
    <editors>
      <editor id="jdoe"><name>Jane Doe</name><email>jane@example.org</email></editor>
    </editors>
    <grammar>
      <gramm id="n"><name>noun</name><shortname>n</shortname></gramm>
      <gramm id="gen"><name>genitive</name></gramm>
    </grammar>
    <topics><topic id="food"><name>food</name></topic></topics>
  </keydefs>
"#;

fn glossary(concepts: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<glossary id="fruit" lang="en">
  <metadata>
    <title>Fruit</title>
    <version>1.0</version>
    <date>2026-01-01</date>
  </metadata>
  {KEYDEFS}
  <concepts>
    {concepts}
  </concepts>
</glossary>"#
    )
}

fn codes(err: &ParseError) -> Vec<ErrorCode> {
    err.diagnostics().iter().filter_map(|diag| diag.code()).collect()
}

#[test]
fn test_simple_glossary() {
    let source = glossary(
        r#"<concept id="apple" topic="food">
             <desc>A round fruit.</desc>
             <term gr="n">apple</term>
             <term lang="sr" gr="n">jabuka</term>
           </concept>"#,
    );

    let gloss = parse(&source).expect("Failed to parse");

    assert_eq!(gloss.meta().id.as_deref(), Some("fruit"));
    assert_eq!(gloss.lang(), Some(Key::new("en")));
    assert_eq!(gloss.env(), &[None]);
    assert_eq!(gloss.keyed(KeyedKind::Language).len(), 2);
    assert_eq!(gloss.keyed(KeyedKind::Gramm).len(), 2);
    assert!(gloss.meta().date.is_some());

    let apple = gloss.concept(Key::new("apple")).expect("apple concept");
    assert_eq!(apple.topic, vec![Key::new("food")]);
    assert_eq!(apple.term.len(), 2);
    assert_eq!(apple.desc.len(), 1);

    let sr_terms = apple
        .term
        .resolve(&gloss, LangEnv::new(Some(Key::new("sr")), None));
    assert_eq!(sr_terms.len(), 1);
    let term = gloss.term(sr_terms[0]).expect("term node");
    assert_eq!(term.nom.plain(), "jabuka");
    assert_eq!(term.gr, Some(Key::new("n")));
}

#[test]
fn test_containers_are_flattened() {
    let gloss = parse(&glossary(r#"<concept id="apple"><term>apple</term></concept>"#))
        .expect("Failed to parse");

    for (_, node) in gloss.nodes() {
        let name = node.kind().element_name();
        assert!(!["metadata", "keydefs", "concepts", "languages"].contains(&name));
    }
    let en = gloss
        .lookup(KeyedKind::Language, Key::new("en"))
        .expect("en declared");
    assert_eq!(gloss.node(en).parent(), Some(NodeId::ROOT));
}

#[test]
fn test_lang_and_env_are_inherited() {
    let source = r#"<glossary lang="en" env="formal">
      <keydefs>
        <languages><language id="en"/><language id="sr"/></languages>
        <environments>
          <environment id="formal"/>
          <environment id="slang"/>
        </environments>
      </keydefs>
      <concepts>
        <concept id="apple">
          <eterm lang="sr">
            <nom>jabuka</nom>
            <origin>od praslovenskog</origin>
            <comment env="slang">colloquial</comment>
          </eterm>
          <desc>A round fruit.</desc>
        </concept>
      </concepts>
    </glossary>"#;

    let gloss = parse(source).expect("Failed to parse");
    let apple = gloss.concept(Key::new("apple")).expect("apple concept");

    let desc = gloss.node(apple.desc.items()[0]);
    assert_eq!(desc.lang(), Some(Key::new("en")));
    assert_eq!(desc.env(), &[Some(Key::new("formal"))]);

    let term_id = apple.term.items()[0];
    let term = gloss.term(term_id).expect("term node");
    let origin = gloss.node(term.origin.items()[0]);
    assert_eq!(origin.lang(), Some(Key::new("sr")));
    assert_eq!(origin.parent(), Some(term_id));

    // An explicit env replaces the inherited list.
    let comment = gloss.node(term.comment.items()[0]);
    assert_eq!(comment.env(), &[Some(Key::new("slang"))]);
}

#[test]
fn test_closeto_chain_and_resolution() {
    let source = glossary(
        r#"<concept id="apple">
             <desc env="formal">A pome fruit.</desc>
             <desc>A round fruit.</desc>
           </concept>"#,
    );
    let gloss = parse(&source).expect("Failed to parse");

    let slang = gloss.environment(Key::new("slang")).expect("slang declared");
    assert_eq!(slang.closeto, vec![Some(Key::new("formal")), None]);
    let formal = gloss.environment(Key::new("formal")).expect("formal declared");
    assert_eq!(formal.closeto, vec![None]);

    let apple = gloss.concept(Key::new("apple")).expect("apple concept");
    let en = Some(Key::new("en"));

    let found = apple.desc.resolve(&gloss, LangEnv::new(en, Some(Key::new("slang"))));
    assert_eq!(found.len(), 1);
    let text = gloss.node(found[0]).kind().text().expect("desc text");
    assert_eq!(text.plain(), "A pome fruit.");

    let found = apple.desc.resolve(&gloss, LangEnv::new(en, None));
    let text = gloss.node(found[0]).kind().text().expect("desc text");
    assert_eq!(text.plain(), "A round fruit.");
}

#[test]
fn test_eterm_with_declensions() {
    let source = glossary(
        r#"<concept id="apple">
             <eterm lang="sr" gr="n">
               <nom>jabuka</nom>
               <stem>jabuk-</stem>
               <decl gr="gen">jabuke</decl>
             </eterm>
           </concept>"#,
    );
    let gloss = parse(&source).expect("Failed to parse");
    let apple = gloss.concept(Key::new("apple")).expect("apple concept");
    let term = gloss.term(apple.term.items()[0]).expect("term node");

    assert_eq!(term.nom.plain(), "jabuka");
    assert_eq!(term.stem.as_ref().map(|stem| stem.plain()), Some("jabuk-".to_string()));
    assert_eq!(term.decl.len(), 1);
    let decl = gloss.node(term.decl[0]).kind().as_decl().expect("decl node");
    assert_eq!(decl.gr, Some(Key::new("gen")));
    assert_eq!(decl.text.plain(), "jabuke");
}

#[test]
fn test_inline_markup() {
    let source = glossary(
        r#"<concept id="apple">
             <ldesc>
               <para>Fruit of the <ref c="tree">apple tree</ref>, <em>very</em> common.</para>
               <para>Called <ol lang="sr" wl="1">jabuka</ol>, see <link url="https://example.org">this</link>.</para>
             </ldesc>
           </concept>
           <concept id="tree"><term>tree</term></concept>"#,
    );
    let gloss = parse(&source).expect("Failed to parse");
    let apple = gloss.concept(Key::new("apple")).expect("apple concept");
    let text = gloss
        .node(apple.desc.items()[0])
        .kind()
        .text()
        .expect("desc text");

    let paras: Vec<_> = text
        .segments()
        .iter()
        .filter_map(|segment| match segment {
            Segment::Inline(inline) => Some(inline),
            _ => None,
        })
        .collect();
    assert_eq!(paras.len(), 2);
    assert_eq!(paras[0].kind(), &InlineKind::Para);

    let kinds: Vec<&InlineKind> = paras[1]
        .content()
        .segments()
        .iter()
        .filter_map(|segment| match segment {
            Segment::Inline(inline) => Some(inline.kind()),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            &InlineKind::ForeignLang {
                lang: Some(Key::new("sr")),
                with_lang: true
            },
            &InlineKind::Link {
                url: "https://example.org".to_string()
            },
        ]
    );
}

#[test]
fn test_embedded_selector() {
    let source = glossary(
        r#"<concept id="apple">
             <desc env="formal slang">An ~formal:edible|slang:tasty~ fruit, 5~~10 cm.</desc>
           </concept>"#,
    );
    let gloss = parse(&source).expect("Failed to parse");
    let apple = gloss.concept(Key::new("apple")).expect("apple concept");
    let text = gloss
        .node(apple.desc.items()[0])
        .kind()
        .text()
        .expect("desc text");

    assert!(text.has_selectors());
    let segments = text.segments();
    assert_eq!(segments.len(), 3);
    match &segments[1] {
        Segment::Select(selector) => {
            assert_eq!(selector.pick(Some(Key::new("slang"))), Some("tasty"));
            assert_eq!(selector.pick(Some(Key::new("formal"))), Some("edible"));
            assert_eq!(selector.raw(), "~formal:edible|slang:tasty~");
        }
        other => panic!("Expected selector, got {other:?}"),
    }
    assert_eq!(segments[2], Segment::literal(" fruit, 5~10 cm."));
}

#[test]
fn test_unterminated_selector_is_a_warning() {
    let source = glossary(
        r#"<concept id="apple"><desc>About ~formal:five cm.</desc></concept>"#,
    );
    let mut sources = SourceMap::new();
    let id = sources.add_text("<test>", source);
    let document = parse_document(&mut sources, id).expect("warnings do not fail");

    assert_eq!(document.warnings().len(), 1);
    assert_eq!(document.warnings()[0].code(), Some(ErrorCode::E300));

    let gloss = document.glossary();
    let apple = gloss.concept(Key::new("apple")).expect("apple concept");
    let text = gloss
        .node(apple.desc.items()[0])
        .kind()
        .text()
        .expect("desc text");
    assert_eq!(text.plain(), "About ~formal:five cm.");
}

#[test]
fn test_dangling_text_reference_is_accepted() {
    let source = glossary(
        r#"<concept id="apple"><desc>See <ref c="pear">pears</ref>.</desc></concept>"#,
    );
    assert!(parse(&source).is_ok());
}

#[test]
fn test_undefined_keys_are_errors() {
    let source = glossary(
        r#"<concept id="apple" related="pear" level="basic">
             <desc by="nobody" lang="de">Ein Apfel.</desc>
             <term env="poetic">apple</term>
           </concept>"#,
    );
    let err = parse(&source).unwrap_err();
    let codes = codes(&err);

    assert!(codes.contains(&ErrorCode::E208));
    assert!(codes.contains(&ErrorCode::E207));
    assert!(codes.contains(&ErrorCode::E202));
    assert!(codes.contains(&ErrorCode::E200));
    assert!(codes.contains(&ErrorCode::E201));
}

#[test]
fn test_duplicate_identifier() {
    let source = glossary(
        r#"<concept id="apple"><term>apple</term></concept>
           <concept id="apple"><term>pomme</term></concept>"#,
    );
    let err = parse(&source).unwrap_err();

    let diag = err
        .diagnostics()
        .iter()
        .find(|diag| diag.code() == Some(ErrorCode::E104))
        .expect("duplicate reported");
    assert_eq!(diag.labels().len(), 2);
    assert!(diag.primary_span().is_some_and(|span| span.start() > 0));
}

#[test]
fn test_structure_errors() {
    let source = glossary(
        r#"<concept id="apple" colour="red">
             <trem>apple</trem>
             <title>Apple</title>
             <eterm><stem>app-</stem></eterm>
           </concept>
           <concept><term>nameless</term></concept>"#,
    );
    let err = parse(&source).unwrap_err();
    let codes = codes(&err);

    assert!(codes.contains(&ErrorCode::E101));
    assert!(codes.contains(&ErrorCode::E100));
    assert!(codes.contains(&ErrorCode::E102));
    assert!(codes.contains(&ErrorCode::E108));
    assert!(codes.contains(&ErrorCode::E103));
}

#[test]
fn test_wrong_root_element() {
    let err = parse("<dictionary/>").unwrap_err();
    assert_eq!(codes(&err), vec![ErrorCode::E004]);
}

#[test]
fn test_malformed_document() {
    let err = parse("<glossary><concepts></glossary>").unwrap_err();
    assert_eq!(codes(&err), vec![ErrorCode::E001]);
}

#[test]
fn test_load_file_with_inclusion() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(
        dir.path().join("keydefs.xml"),
        r#"<keydefs><languages><language id="en"/></languages></keydefs>"#,
    )
    .expect("write keydefs");
    let main = dir.path().join("fruit.xml");
    fs::write(
        &main,
        r#"<glossary lang="en" xmlns:xi="http://www.w3.org/2001/XInclude">
             <xi:include href="keydefs.xml"/>
             <concepts><concept id="apple"><term>apple</term></concept></concepts>
           </glossary>"#,
    )
    .expect("write main");

    let mut sources = SourceMap::new();
    let document = load_file(&main, &mut sources).expect("Failed to load");

    assert_eq!(sources.len(), 2);
    assert!(document.warnings().is_empty());
    let gloss = document.glossary();
    assert!(gloss.contains(KeyedKind::Language, Key::new("en")));
    assert!(matches!(
        gloss.node(gloss.lookup(KeyedKind::Concept, Key::new("apple")).expect("apple")).kind(),
        Kind::Concept(_)
    ));
}

proptest! {
    #[test]
    fn prop_term_language_is_inherited_or_explicit(
        nom in "[a-z]{1,12}",
        explicit in proptest::option::of(prop_oneof![Just("en"), Just("sr")]),
    ) {
        let lang_attr = explicit
            .map(|lang| format!(r#" lang="{lang}""#))
            .unwrap_or_default();
        let source = glossary(&format!(
            r#"<concept id="item"><term{lang_attr}>{nom}</term></concept>"#
        ));
        let gloss = parse(&source).expect("Failed to parse");
        let item = gloss.concept(Key::new("item")).expect("item concept");
        let term_id = item.term.items()[0];

        prop_assert_eq!(gloss.node(term_id).lang(), Some(Key::new(explicit.unwrap_or("en"))));
        prop_assert_eq!(gloss.node(term_id).parent(), Some(gloss.lookup(KeyedKind::Concept, Key::new("item")).expect("indexed")));
        let term = gloss.term(term_id).expect("term node");
        prop_assert_eq!(term.nom.plain(), nom);
    }
}
