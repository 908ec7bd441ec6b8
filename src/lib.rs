// src/lib.rs
//
// html2text: turn HTML into Markdown-structured plain text.
//
// - `convert` runs the whole pipeline on a string: tokenizer events drive the
//   renderer, whose blocks are wrapped to `Config::body_width` at the end.
// - Conversion never fails; malformed markup and unknown references degrade
//   to plain text. Only reading the input can fail.

pub mod config;
pub mod entities;
pub mod error;
pub mod render;
pub mod stack;
pub mod tokenizer;
pub mod wrap;

use std::borrow::Cow;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

pub use config::Config;
pub use error::{Error, Result};

use render::Renderer;
use tokenizer::Tokenizer;

/// Convert an HTML document to Markdown.
pub fn convert(html: &str, config: &Config) -> String {
    let html: Cow<'_, str> = if html.contains('\r') {
        Cow::Owned(html.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(html)
    };

    let mut renderer = Renderer::new(config);
    for event in Tokenizer::new(&html) {
        renderer.handle(event);
    }
    let markdown = renderer.finish();

    tracing::debug!(
        input_bytes = html.len(),
        output_bytes = markdown.len(),
        "converted document"
    );
    markdown
}

/// Convert raw bytes, replacing invalid UTF-8 sequences.
pub fn convert_bytes(html: &[u8], config: &Config) -> String {
    convert(&String::from_utf8_lossy(html), config)
}

/// Read the whole input: the named file, or standard input for `None`/`-`.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => fs::read(path).map_err(|source| Error::ReadInput {
            path: path.to_path_buf(),
            source,
        }),
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .map_err(Error::ReadStdin)?;
            Ok(buf)
        }
    }
}

/// Write `markdown` followed by a newline, unless it is empty.
pub fn write_output<W: Write>(mut out: W, markdown: &str) -> Result<()> {
    if !markdown.is_empty() {
        out.write_all(markdown.as_bytes())
            .and_then(|()| out.write_all(b"\n"))
            .map_err(Error::WriteOutput)?;
    }
    out.flush().map_err(Error::WriteOutput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quickcheck_macros::quickcheck;

    #[test]
    fn converts_a_small_document() {
        let html = "<html><head><title>T</title></head><body>\r\n\
                    <h1>Title</h1>\r\n<p>Some <em>text</em>.</p>\r\n</body></html>";
        assert_eq!(convert(html, &Config::default()), "# Title\n\nSome *text*.");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(
            convert_bytes(b"<p>a\xffb</p>", &Config::default()),
            "a\u{fffd}b"
        );
    }

    #[test]
    fn long_paragraphs_wrap_to_body_width() {
        let config = Config {
            body_width: 20,
            ..Config::default()
        };
        assert_eq!(
            convert("<p>one two three four five six seven</p>", &config),
            "one two three four\nfive six seven"
        );
    }

    #[test]
    fn reads_named_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<p>x</p>").unwrap();
        assert_eq!(read_input(Some(file.path())).unwrap(), b"<p>x</p>");
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = read_input(Some(Path::new("/definitely/not/here.html"))).unwrap_err();
        assert!(matches!(err, Error::ReadInput { .. }));
        assert!(err.to_string().contains("/definitely/not/here.html"));
    }

    #[test]
    fn output_gets_a_trailing_newline() {
        let mut buf = Vec::new();
        write_output(&mut buf, "# x").unwrap();
        assert_eq!(buf, b"# x\n");

        let mut empty = Vec::new();
        write_output(&mut empty, "").unwrap();
        assert!(empty.is_empty());
    }

    #[quickcheck]
    fn conversion_is_deterministic(html: String) -> bool {
        let config = Config::default();
        convert(&html, &config) == convert(&html, &config)
    }
}
