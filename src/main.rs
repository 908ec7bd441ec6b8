// src/main.rs
//
// html2text: HTML to Markdown-structured text
//
// - Reads the whole input (a file, or stdin when FILE is absent or "-") before
//   converting; an unreadable input exits non-zero without writing anything.
// - Markdown goes to stdout, diagnostics to stderr (filtered by RUST_LOG,
//   default "warn").
// - Numeric options are clamped: a width of 0 or less disables wrapping,
//   non-positive indents fall back to their defaults with a warning.
//
// CLI flags mirror the `Config` fields; boolean defaults are flipped by the
// flag that names the non-default behaviour (`--keep-internal-links`,
// `--reference-links`).

use anyhow::Result;
use clap::{ArgAction, Parser};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use html2text::config::{
    body_width_from, indent_from, DEFAULT_BODY_WIDTH, DEFAULT_GOOGLE_LIST_INDENT,
    DEFAULT_LIST_INDENT,
};
use html2text::Config;

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Use Unicode characters instead of their ASCII pseudo-replacements
    #[arg(long = "unicode-snob", action = ArgAction::SetTrue)]
    unicode_snob: bool,

    /// Escape all Markdown-significant characters in text
    #[arg(long = "escape-all", action = ArgAction::SetTrue)]
    escape_all: bool,

    /// Don't include any formatting for links
    #[arg(long = "ignore-links", action = ArgAction::SetTrue)]
    ignore_links: bool,

    /// Don't include any formatting for images
    #[arg(long = "ignore-images", action = ArgAction::SetTrue)]
    ignore_images: bool,

    /// Don't include any formatting for emphasis
    #[arg(long = "ignore-emphasis", action = ArgAction::SetTrue)]
    ignore_emphasis: bool,

    /// Keep links to anchors within the document
    #[arg(long = "keep-internal-links", action = ArgAction::SetTrue)]
    keep_internal_links: bool,

    /// Use reference-style links instead of inline links
    #[arg(long = "reference-links", action = ArgAction::SetTrue)]
    reference_links: bool,

    /// Put reference definitions after each paragraph instead of at the end
    #[arg(long = "links-after-para", action = ArgAction::SetTrue)]
    links_after_para: bool,

    /// Number of columns to wrap text to (0 or less: no wrapping)
    #[arg(
        short = 'b',
        long = "body-width",
        value_name = "N",
        default_value_t = DEFAULT_BODY_WIDTH as i64,
        allow_negative_numbers = true
    )]
    body_width: i64,

    /// Number of pixels Google indents nested lists
    #[arg(
        short = 'i',
        long = "google-list-indent",
        value_name = "N",
        default_value_t = DEFAULT_GOOGLE_LIST_INDENT as i64,
        allow_negative_numbers = true
    )]
    google_list_indent: i64,

    /// Convert an HTML export of a Google Doc
    #[arg(short = 'g', long = "google-doc", action = ArgAction::SetTrue)]
    google_doc: bool,

    /// Use a dash rather than a star for unordered list items
    #[arg(short = 'd', long = "dash-unordered-list", action = ArgAction::SetTrue)]
    dash_unordered_list: bool,

    /// Hide strike-through text
    #[arg(short = 's', long = "hide-strikethrough", action = ArgAction::SetTrue)]
    hide_strikethrough: bool,

    /// Base URL relative links and images are resolved against
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,

    /// Spaces each nested list level is indented by
    #[arg(
        long = "list-indent",
        value_name = "N",
        default_value_t = DEFAULT_LIST_INDENT as i64,
        allow_negative_numbers = true
    )]
    list_indent: i64,

    /// Indent preformatted blocks by four spaces instead of fencing them
    #[arg(long = "indented-code", action = ArgAction::SetTrue)]
    indented_code: bool,

    /// Only let an end tag close the innermost open element
    #[arg(long = "strict-tags", action = ArgAction::SetTrue)]
    strict_tags: bool,

    /// Input file (default: stdin)
    file: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            unicode_snob: self.unicode_snob,
            escape_snob: self.escape_all,
            ignore_links: self.ignore_links,
            ignore_images: self.ignore_images,
            ignore_emphasis: self.ignore_emphasis,
            skip_internal_links: !self.keep_internal_links,
            inline_links: !self.reference_links,
            links_each_paragraph: self.links_after_para,
            body_width: body_width_from(self.body_width),
            google_list_indent: indent_from(
                "google-list-indent",
                self.google_list_indent,
                DEFAULT_GOOGLE_LIST_INDENT,
            ),
            google_doc: self.google_doc,
            dash_unordered_list: self.dash_unordered_list,
            hide_strikethrough: self.hide_strikethrough,
            base_url: self.base_url.clone(),
            list_indent: indent_from("list-indent", self.list_indent, DEFAULT_LIST_INDENT),
            indented_code: self.indented_code,
            strict_tags: self.strict_tags,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    let input = html2text::read_input(cli.file.as_deref())?;
    let markdown = html2text::convert_bytes(&input, &config);
    html2text::write_output(io::stdout().lock(), &markdown)?;
    Ok(())
}
