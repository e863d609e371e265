//! Shared glossary fixtures for unit tests.

use divergloss_core::Glossary;

/// English and Serbian terms in a formal environment, with a slang
/// environment close to it. `fruit` has no Serbian term and its
/// description refers to an undefined concept; `pear` has no English term.
pub(crate) const FRUIT: &str = r#"
    <glossary id="orchard" lang="en" env="formal">
      <metadata><title>Fruit</title><title lang="sr">Voće</title></metadata>
      <keydefs>
        <languages>
          <language id="en"><name>English</name><name lang="sr">engleski</name><shortname>en</shortname></language>
          <language id="sr"><name>Serbian</name><name lang="sr">srpski</name><shortname>sr</shortname></language>
        </languages>
        <environments>
          <environment id="formal"><name>Formal</name><name lang="sr">formalno</name></environment>
          <environment id="slang" closeto="formal"><name>Slang</name></environment>
        </environments>
        <grammar>
          <gramm id="gen"><shortname lang="sr">gen.</shortname></gramm>
          <gramm id="n"><shortname>noun</shortname></gramm>
        </grammar>
        <topics>
          <topic id="food"><name>Food</name></topic>
        </topics>
      </keydefs>
      <concepts>
        <concept id="apple" topic="food">
          <desc>A round <ref c="fruit">thing</ref>.</desc>
          <desc lang="sr">Okruglo <ref c="fruit">voće</ref>.</desc>
          <term gr="n">apple</term>
          <eterm lang="sr"><nom>jabuka</nom><decl gr="gen">jabuke</decl></eterm>
        </concept>
        <concept id="fruit">
          <desc>Seed-bearing part, see <ref c="nothing">this</ref>.</desc>
          <term env="slang">fruity</term>
          <term>fruit</term>
        </concept>
        <concept id="pear">
          <term lang="sr">kruška</term>
        </concept>
      </concepts>
    </glossary>
"#;

pub(crate) fn fruit() -> Glossary {
    divergloss_parser::parse(FRUIT).expect("valid glossary")
}
