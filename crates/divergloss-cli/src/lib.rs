//! Divergloss CLI library
//!
//! This module contains the core CLI logic of `dgproc`, the Divergloss
//! glossary processor.

pub mod error_adapter;

mod args;
mod config;

pub use args::{
    Args, BatchArgs, BidictArgs, Command, HtmlArgs, Po2dgArgs, PoArgs, StyleArgs, TbxArgs,
    TextArgs,
};

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{error, info, warn};

use divergloss::{
    DivergError, Glossary, GlossaryBuilder,
    export::{
        Rendered,
        bidict::{BidictOptions, DEFAULT_ASSET_STEM},
        html::HtmlViewOptions,
        po::PoOptions,
        tbx::TbxOptions,
    },
    key::Key,
};

/// Run the Divergloss CLI application
///
/// Loads the configuration, then runs the selected subcommand.
///
/// # Returns
///
/// The number of batch units that failed; always zero outside `batch`.
///
/// # Errors
///
/// Returns `DivergError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Option and rendering errors
/// - Catalog syntax errors
pub fn run(args: &Args) -> Result<usize, DivergError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let builder = GlossaryBuilder::new(app_config);

    match &args.command {
        Command::Bidict(cmd) => run_bidict(&builder, cmd).map(|()| 0),
        Command::Html(cmd) => run_html(&builder, cmd).map(|()| 0),
        Command::Text(cmd) => run_text(&builder, cmd).map(|()| 0),
        Command::Tbx(cmd) => run_tbx(&builder, cmd).map(|()| 0),
        Command::Po(cmd) => run_po(&builder, cmd).map(|()| 0),
        Command::Po2dg(cmd) => run_po2dg(&builder, cmd).map(|()| 0),
        Command::Batch(cmd) => run_batch(&builder, cmd),
    }
}

fn run_bidict(builder: &GlossaryBuilder, cmd: &BidictArgs) -> Result<(), DivergError> {
    info!(
        input_path = cmd.input,
        output_path = cmd.output;
        "Processing dictionary"
    );

    let document = builder.load(Path::new(&cmd.input))?;
    let header = cmd.header.as_ref().map(fs::read_to_string).transpose()?;
    let footer = cmd.footer.as_ref().map(fs::read_to_string).transpose()?;

    let output = Path::new(&cmd.output);
    let options = bidict_options(builder, &cmd.olang, &cmd.tlang, cmd.env.as_deref(), &cmd.style)
        .with_header(header)
        .with_footer(footer)
        .with_asset_stem(asset_stem(output));
    let rendered = builder.render_bidict(document.glossary(), options)?;
    write_page(output, &rendered)?;

    info!(output_file = cmd.output; "Dictionary exported successfully");
    Ok(())
}

fn run_html(builder: &GlossaryBuilder, cmd: &HtmlArgs) -> Result<(), DivergError> {
    info!(
        input_path = cmd.input,
        output_path = cmd.output;
        "Processing glossary view"
    );

    let document = builder.load(Path::new(&cmd.input))?;
    let output = Path::new(&cmd.output);
    let options = HtmlViewOptions::default()
        .with_lang(cmd.lang.as_deref().map(Key::new))
        .with_env(cmd.env.as_deref().map(Key::new))
        .with_no_term_olang(cmd.no_term_olang)
        .with_no_term_oenv(cmd.no_term_oenv)
        .with_indcols(cmd.indcols)
        .with_asset_stem(asset_stem(output));
    let rendered = builder.render_html(document.glossary(), options)?;
    write_page(output, &rendered)?;

    info!(output_file = cmd.output; "Glossary view exported successfully");
    Ok(())
}

fn run_text(builder: &GlossaryBuilder, cmd: &TextArgs) -> Result<(), DivergError> {
    info!(input_path = cmd.input; "Processing text view");

    let document = builder.load(Path::new(&cmd.input))?;
    let mut options = builder
        .text_options()
        .with_lang(cmd.lang.as_deref().map(Key::new))
        .with_env(cmd.env.as_deref().map(Key::new));
    if let Some(wcol) = cmd.wcol {
        options = options.with_wcol(wcol);
    }
    let rendered = builder.render_text(document.glossary(), options)?;
    write_output(cmd.output.as_deref(), rendered.page())
}

fn run_tbx(builder: &GlossaryBuilder, cmd: &TbxArgs) -> Result<(), DivergError> {
    info!(input_path = cmd.input; "Processing TBX export");

    let document = builder.load(Path::new(&cmd.input))?;
    let options = TbxOptions::default()
        .with_lang(cmd.lang.as_deref().map(Key::new))
        .with_env(cmd.env.as_deref().map(Key::new));
    let rendered = builder.render_tbx(document.glossary(), options)?;
    write_output(cmd.output.as_deref(), rendered.page())
}

fn run_po(builder: &GlossaryBuilder, cmd: &PoArgs) -> Result<(), DivergError> {
    info!(input_path = cmd.input; "Processing PO export");

    let document = builder.load(Path::new(&cmd.input))?;
    let options = PoOptions::new(Key::new(&cmd.olang), Key::new(&cmd.tlang))
        .with_env(cmd.env.as_deref().map(Key::new))
        .with_condesc(cmd.condesc);
    let rendered = builder.render_po(document.glossary(), options)?;
    write_output(cmd.output.as_deref(), rendered.page())
}

fn run_po2dg(builder: &GlossaryBuilder, cmd: &Po2dgArgs) -> Result<(), DivergError> {
    info!(input_path = cmd.catalog; "Processing catalog");

    let text = fs::read_to_string(&cmd.catalog)?;
    let fragment = builder.convert_catalog(&text, &cmd.olang, &cmd.tlang)?;
    write_output(cmd.output.as_deref(), &fragment)
}

/// Render one dictionary per target language that has a header fragment.
///
/// A failing language is logged and counted; the others still render.
fn run_batch(builder: &GlossaryBuilder, cmd: &BatchArgs) -> Result<usize, DivergError> {
    info!(
        input_path = cmd.input,
        languages = cmd.tlang.len();
        "Processing dictionary batch"
    );

    let document = builder.load(Path::new(&cmd.input))?;
    fs::create_dir_all(&cmd.out_dir)?;

    let header_dir = Path::new(&cmd.header_dir);
    let mut rendered = 0;
    let mut failed = 0;
    for tlang in &cmd.tlang {
        let header = header_dir.join(format!("{tlang}.header.html"));
        if !header.is_file() {
            info!(tlang = tlang, header:? = header; "No page header, skipping language");
            continue;
        }

        match render_batch_unit(builder, document.glossary(), cmd, tlang, &header) {
            Ok(path) => {
                info!(tlang = tlang, output:? = path; "Dictionary exported");
                rendered += 1;
            }
            Err(err) => {
                error!(tlang = tlang; "Failed to render dictionary: {err}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        warn!(rendered, failed; "Dictionary batch finished with failures");
    } else {
        info!(rendered; "Dictionary batch finished");
    }
    Ok(failed)
}

fn render_batch_unit(
    builder: &GlossaryBuilder,
    gloss: &Glossary,
    cmd: &BatchArgs,
    tlang: &str,
    header: &Path,
) -> Result<PathBuf, DivergError> {
    let header = fs::read_to_string(header)?;
    let footer_path = Path::new(&cmd.header_dir).join(format!("{tlang}.footer.html"));
    let footer = if footer_path.is_file() {
        Some(fs::read_to_string(&footer_path)?)
    } else {
        None
    };

    let output = Path::new(&cmd.out_dir).join(format!("{}-{tlang}.html", cmd.olang));
    let options = bidict_options(builder, &cmd.olang, tlang, cmd.env.as_deref(), &cmd.style)
        .with_header(Some(header))
        .with_footer(footer)
        .with_asset_stem(asset_stem(&output));
    let rendered = builder.render_bidict(gloss, options)?;
    write_page(&output, &rendered)?;
    Ok(output)
}

/// Configured dictionary options with the command-line overrides applied.
fn bidict_options(
    builder: &GlossaryBuilder,
    olang: &str,
    tlang: &str,
    env: Option<&str>,
    style: &StyleArgs,
) -> BidictOptions {
    let mut options = builder
        .bidict_options(Key::new(olang), Key::new(tlang))
        .with_env(env.map(Key::new));
    if let Some(name) = &style.style {
        options = options.with_style(Some(name.clone()));
    }
    if let Some(spec) = &style.styleopt {
        options = options.with_styleopt(Some(spec.clone()));
    }
    if style.allinone {
        options = options.with_allinone(true);
    }
    if let Some(lang) = &style.describe_in {
        options = options.with_describe_in(Some(Key::new(lang)));
    }
    options
}

fn asset_stem(output: &Path) -> String {
    output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_ASSET_STEM.to_string())
}

/// Write a page, with its assets next to it as `<stem>.<extension>`.
fn write_page(output: &Path, rendered: &Rendered) -> Result<(), DivergError> {
    fs::write(output, rendered.page())?;

    let stem = asset_stem(output);
    for asset in rendered.assets() {
        let path = output.with_file_name(format!("{stem}.{}", asset.extension()));
        fs::write(&path, asset.content())?;
        info!(path:? = path; "Asset written");
    }
    Ok(())
}

/// Write to a file, or to standard output without one.
fn write_output(output: Option<&str>, text: &str) -> Result<(), DivergError> {
    match output {
        Some(path) => {
            fs::write(path, text)?;
            info!(output_file = path; "Output written");
        }
        None => io::stdout().lock().write_all(text.as_bytes())?,
    }
    Ok(())
}
