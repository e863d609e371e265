//! Command-line argument definitions for `dgproc`.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Each subcommand selects one output of the glossary;
//! configuration file selection and logging verbosity are global.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Divergloss processor
#[derive(Parser, Debug)]
#[command(name = "dgproc", author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a bilingual dictionary page
    Bidict(BidictArgs),

    /// Render the whole glossary as one HTML page
    Html(HtmlArgs),

    /// Render a plain text view of the glossary
    Text(TextArgs),

    /// Export the glossary as TBX
    Tbx(TbxArgs),

    /// Export the term pairs of two languages as a PO catalog
    Po(PoArgs),

    /// Convert a PO catalog of term pairs into glossary concepts
    Po2dg(Po2dgArgs),

    /// Render one dictionary page per target language
    Batch(BatchArgs),
}

/// Page styling shared by the dictionary subcommands.
#[derive(clap::Args, Debug, Default)]
pub struct StyleArgs {
    /// Built-in style sheet (plain, igloo)
    #[arg(long)]
    pub style: Option<String>,

    /// Style sheet parameters, `name=value` pairs separated by commas
    #[arg(long)]
    pub styleopt: Option<String>,

    /// Embed the style sheet and script in the page
    #[arg(long)]
    pub allinone: bool,

    /// Language of descriptions and page framing
    #[arg(long)]
    pub describe_in: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct BidictArgs {
    /// Path to the input glossary
    pub input: String,

    /// Origin language
    #[arg(long)]
    pub olang: String,

    /// Target language
    #[arg(long)]
    pub tlang: String,

    /// Environment to render for
    #[arg(long)]
    pub env: Option<String>,

    /// Path to the output HTML page
    #[arg(short, long)]
    pub output: String,

    #[command(flatten)]
    pub style: StyleArgs,

    /// File with the page header to use instead of the generated one
    #[arg(long)]
    pub header: Option<String>,

    /// File with the page footer to use instead of the generated one
    #[arg(long)]
    pub footer: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct HtmlArgs {
    /// Path to the input glossary
    pub input: String,

    /// Pivotal language
    #[arg(long)]
    pub lang: Option<String>,

    /// Pivotal environment
    #[arg(long)]
    pub env: Option<String>,

    /// Path to the output HTML page
    #[arg(short, long)]
    pub output: String,

    /// Leave out terms in other languages
    #[arg(long)]
    pub no_term_olang: bool,

    /// Leave out terms in other environments
    #[arg(long)]
    pub no_term_oenv: bool,

    /// Number of columns in the index of terms
    #[arg(long, default_value_t = 4)]
    pub indcols: usize,
}

#[derive(clap::Args, Debug)]
pub struct TextArgs {
    /// Path to the input glossary
    pub input: String,

    /// Language to list
    #[arg(long)]
    pub lang: Option<String>,

    /// Environment to list
    #[arg(long)]
    pub env: Option<String>,

    /// Column to wrap descriptions at
    #[arg(long)]
    pub wcol: Option<usize>,

    /// Path to the output file, standard output if omitted
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct TbxArgs {
    /// Path to the input glossary
    pub input: String,

    /// Pivotal language
    #[arg(long)]
    pub lang: Option<String>,

    /// Pivotal environment
    #[arg(long)]
    pub env: Option<String>,

    /// Path to the output file, standard output if omitted
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PoArgs {
    /// Path to the input glossary
    pub input: String,

    /// Language of the messages
    #[arg(long)]
    pub olang: String,

    /// Language of the translations
    #[arg(long)]
    pub tlang: String,

    /// Environment to export for
    #[arg(long)]
    pub env: Option<String>,

    /// Describe only concepts whose messages clash
    #[arg(long)]
    pub condesc: bool,

    /// Path to the output catalog, standard output if omitted
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct Po2dgArgs {
    /// Path to the PO catalog
    pub catalog: String,

    /// Language of the catalog messages
    #[arg(long)]
    pub olang: String,

    /// Language of the catalog translations
    #[arg(long)]
    pub tlang: String,

    /// Path to the output fragment, standard output if omitted
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct BatchArgs {
    /// Path to the input glossary
    pub input: String,

    /// Origin language
    #[arg(long)]
    pub olang: String,

    /// Target languages
    #[arg(long, num_args = 1.., required = true)]
    pub tlang: Vec<String>,

    /// Environment to render for
    #[arg(long)]
    pub env: Option<String>,

    /// Directory with the `<lang>.header.html` and `<lang>.footer.html` fragments
    #[arg(long)]
    pub header_dir: String,

    /// Directory to write the pages into
    #[arg(long)]
    pub out_dir: String,

    #[command(flatten)]
    pub style: StyleArgs,
}
