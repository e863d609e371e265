use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use divergloss_cli::{
    Args, BatchArgs, BidictArgs, Command, HtmlArgs, Po2dgArgs, PoArgs, StyleArgs, TbxArgs,
    TextArgs, run,
};

/// Demos are at workspace root, relative to workspace not the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all .xml files from a directory
fn collect_xml_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("xml")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(command: Command) -> Args {
    Args {
        command,
        config: None,
        log_level: "off".to_string(),
    }
}

fn bidict(input: &Path, output: &Path) -> Command {
    Command::Bidict(BidictArgs {
        input: input.to_string_lossy().to_string(),
        olang: "en".to_string(),
        tlang: "sr".to_string(),
        env: None,
        output: output.to_string_lossy().to_string(),
        style: StyleArgs::default(),
        header: None,
        footer: None,
    })
}

fn html(input: &Path, output: &Path) -> Command {
    Command::Html(HtmlArgs {
        input: input.to_string_lossy().to_string(),
        lang: None,
        env: None,
        output: output.to_string_lossy().to_string(),
        no_term_olang: false,
        no_term_oenv: false,
        indcols: 4,
    })
}

fn po(input: &Path, output: &Path) -> Command {
    Command::Po(PoArgs {
        input: input.to_string_lossy().to_string(),
        olang: "en".to_string(),
        tlang: "sr".to_string(),
        env: None,
        condesc: false,
        output: Some(output.to_string_lossy().to_string()),
    })
}

fn text(input: &Path, output: &Path) -> Command {
    Command::Text(TextArgs {
        input: input.to_string_lossy().to_string(),
        lang: None,
        env: None,
        wcol: None,
        output: Some(output.to_string_lossy().to_string()),
    })
}

fn tbx(input: &Path, output: &Path) -> Command {
    Command::Tbx(TbxArgs {
        input: input.to_string_lossy().to_string(),
        lang: None,
        env: None,
        output: Some(output.to_string_lossy().to_string()),
    })
}

fn batch(input: &Path, tlang: &[&str], header_dir: &Path, out_dir: &Path) -> Command {
    Command::Batch(BatchArgs {
        input: input.to_string_lossy().to_string(),
        olang: "en".to_string(),
        tlang: tlang.iter().map(|lang| lang.to_string()).collect(),
        env: None,
        header_dir: header_dir.to_string_lossy().to_string(),
        out_dir: out_dir.to_string_lossy().to_string(),
        style: StyleArgs::default(),
    })
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_demos = collect_xml_files(demos_path());
    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let stem = demo_path.file_stem().unwrap().to_string_lossy().to_string();
        let commands = [
            bidict(demo_path, &temp_dir.path().join(format!("{stem}.html"))),
            html(demo_path, &temp_dir.path().join(format!("{stem}-view.html"))),
            po(demo_path, &temp_dir.path().join(format!("{stem}.po"))),
            text(demo_path, &temp_dir.path().join(format!("{stem}.txt"))),
            tbx(demo_path, &temp_dir.path().join(format!("{stem}.tbx"))),
        ];
        for command in commands {
            if let Err(e) = run(&args(command)) {
                failed_demos.push((demo_path.clone(), e));
            }
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo run(s) failed unexpectedly", failed_demos.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_demos = collect_xml_files(demos_path().join("errors"));
    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_filename = format!(
            "error_{}.html",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        if run(&args(bidict(demo_path, &output_path))).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_bidict_writes_page_and_assets() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("fruit-en-sr.html");

    let failed = run(&args(bidict(&demos_path().join("fruit.xml"), &output))).expect("rendered");
    assert_eq!(failed, 0);

    let page = fs::read_to_string(&output).expect("page written");
    assert!(page.contains("<script src='fruit-en-sr.js' type='text/javascript'></script>"));
    assert!(page.contains("<p class='bd-otline'>apple</p>"));
    assert!(page.contains("pomorandža"));
    assert!(temp_dir.path().join("fruit-en-sr.js").is_file());
    assert!(!temp_dir.path().join("fruit-en-sr.css").exists());
}

#[test]
fn e2e_html_writes_page_and_style_sheet() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("orchard.html");

    run(&args(html(&demos_path().join("fruit.xml"), &output))).expect("rendered");

    let page = fs::read_to_string(&output).expect("page written");
    assert!(page.contains("<link href='orchard.css' rel='stylesheet' type='text/css'/>"));
    assert!(page.contains("<div class='concept' id='apple'>"));
    let style = fs::read_to_string(temp_dir.path().join("orchard.css")).expect("style written");
    assert!(style.contains("div.concept"));
}

#[test]
fn e2e_po_export_reads_back() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let catalog = temp_dir.path().join("fruit-en-sr.po");
    let fragment = temp_dir.path().join("fruit-back.xml");

    run(&args(po(&demos_path().join("fruit.xml"), &catalog))).expect("exported");
    let text = fs::read_to_string(&catalog).expect("catalog written");
    assert!(text.starts_with("# PO view of a Divergloss glossary: "));
    assert!(text.contains("msgid \"apple\"\n"));

    let command = Command::Po2dg(Po2dgArgs {
        catalog: catalog.to_string_lossy().to_string(),
        olang: "en".to_string(),
        tlang: "sr".to_string(),
        output: Some(fragment.to_string_lossy().to_string()),
    });
    run(&args(command)).expect("converted");
    let fragment = fs::read_to_string(fragment).expect("written");
    assert!(fragment.contains("<term lang='sr'>jabuka</term>"));
}

#[test]
fn e2e_text_output_is_stable() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("fruit.xml");
    let first = temp_dir.path().join("first.txt");
    let second = temp_dir.path().join("second.txt");

    run(&args(text(&input, &first))).expect("rendered");
    run(&args(text(&input, &second))).expect("rendered");

    let first = fs::read_to_string(first).expect("written");
    assert!(first.starts_with("Fruit (Formal)\n"));
    assert_eq!(first, fs::read_to_string(second).expect("written"));
}

#[test]
fn e2e_po2dg_converts_catalog() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("fruit-po.xml");

    let command = Command::Po2dg(Po2dgArgs {
        catalog: demos_path().join("fruit.po").to_string_lossy().to_string(),
        olang: "en".to_string(),
        tlang: "sr".to_string(),
        output: Some(output.to_string_lossy().to_string()),
    });
    run(&args(command)).expect("converted");

    let fragment = fs::read_to_string(output).expect("written");
    assert!(fragment.starts_with("<concepts>\n"));
    assert!(fragment.contains("<concept id='sour_cherry'>"));
    assert!(fragment.contains("<term lang='sr'>kruška</term>"));
    assert!(!fragment.contains("quince"));
}

#[test]
fn e2e_batch_skips_languages_without_header() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let out_dir = temp_dir.path().join("out");

    let command = batch(
        &demos_path().join("fruit.xml"),
        &["sr", "de"],
        &demos_path().join("headers"),
        &out_dir,
    );
    let failed = run(&args(command)).expect("batch ran");
    assert_eq!(failed, 0);

    let page = fs::read_to_string(out_dir.join("en-sr.html")).expect("page written");
    assert!(page.starts_with("<?xml version='1.0' encoding='UTF-8'?>\n"));
    assert!(page.contains("<h1>Fruit: English to Serbian</h1>"));
    assert!(page.contains("<p>Maintained by the orchard translation team.</p>"));
    assert!(!out_dir.join("en-de.html").exists());
}

#[test]
fn e2e_batch_counts_failures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let header_dir = temp_dir.path().join("headers");
    fs::create_dir(&header_dir).expect("create header dir");
    for lang in ["sr", "xx"] {
        fs::write(header_dir.join(format!("{lang}.header.html")), "<html><body>\n")
            .expect("write header");
    }

    let out_dir = temp_dir.path().join("out");
    let command = batch(&demos_path().join("fruit.xml"), &["xx", "sr"], &header_dir, &out_dir);
    let failed = run(&args(command)).expect("batch ran");

    assert_eq!(failed, 1);
    assert!(out_dir.join("en-sr.html").is_file());
    assert!(!out_dir.join("en-xx.html").exists());
}

#[test]
fn e2e_missing_input_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let result = run(&args(bidict(
        &temp_dir.path().join("absent.xml"),
        &temp_dir.path().join("absent.html"),
    )));
    assert!(result.is_err());
}
