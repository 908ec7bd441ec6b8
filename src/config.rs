// src/config.rs
//
// Conversion options. A `Config` is resolved once, before conversion starts,
// and only ever read afterwards.

/// Default column width for wrapped paragraphs.
pub const DEFAULT_BODY_WIDTH: usize = 78;

/// Pixels Google Docs indents each nested list level by.
pub const DEFAULT_GOOGLE_LIST_INDENT: usize = 36;

/// Spaces per nested list level.
pub const DEFAULT_LIST_INDENT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Keep entities as Unicode instead of ASCII approximations.
    pub unicode_snob: bool,
    /// Backslash-escape Markdown-significant characters in text.
    pub escape_snob: bool,
    pub ignore_links: bool,
    pub ignore_images: bool,
    pub ignore_emphasis: bool,
    /// Drop link syntax for `#fragment` links to anchors already seen.
    pub skip_internal_links: bool,
    /// `[text](url)` when set, `[text][n]` plus definitions otherwise.
    pub inline_links: bool,
    /// Emit reference definitions after every paragraph instead of at the end.
    pub links_each_paragraph: bool,
    /// Wrap column; `0` disables wrapping.
    pub body_width: usize,
    pub google_list_indent: usize,
    pub google_doc: bool,
    pub dash_unordered_list: bool,
    pub hide_strikethrough: bool,
    /// Base for relative `href`/`src`. Falls back to the document's `<base>`.
    pub base_url: Option<String>,
    pub list_indent: usize,
    /// Indent `<pre>` blocks by four spaces instead of fencing them.
    pub indented_code: bool,
    /// Only pop an end tag if it closes the innermost open element.
    pub strict_tags: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unicode_snob: false,
            escape_snob: false,
            ignore_links: false,
            ignore_images: false,
            ignore_emphasis: false,
            skip_internal_links: true,
            inline_links: true,
            links_each_paragraph: false,
            body_width: DEFAULT_BODY_WIDTH,
            google_list_indent: DEFAULT_GOOGLE_LIST_INDENT,
            google_doc: false,
            dash_unordered_list: false,
            hide_strikethrough: false,
            base_url: None,
            list_indent: DEFAULT_LIST_INDENT,
            indented_code: false,
            strict_tags: false,
        }
    }
}

impl Config {
    pub fn bullet(&self) -> char {
        if self.dash_unordered_list {
            '-'
        } else {
            '*'
        }
    }
}

/* ============================ Value clamping ============================ */

/// Width for wrapping. Anything at or below zero turns wrapping off.
pub fn body_width_from(value: i64) -> usize {
    if value <= 0 {
        0
    } else {
        usize::try_from(value).unwrap_or(usize::MAX)
    }
}

/// Clamp a pixel/space indent to a usable value, warning when the input is
/// not strictly positive.
pub fn indent_from(option: &'static str, value: i64, default: usize) -> usize {
    match usize::try_from(value) {
        Ok(v) if v > 0 => v,
        _ => {
            tracing::warn!(option, value, default, "invalid indent, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.body_width, 78);
        assert_eq!(config.google_list_indent, 36);
        assert!(config.inline_links);
        assert!(config.skip_internal_links);
        assert_eq!(config.bullet(), '*');
    }

    #[test]
    fn dash_bullet() {
        let config = Config {
            dash_unordered_list: true,
            ..Config::default()
        };
        assert_eq!(config.bullet(), '-');
    }

    #[test]
    fn non_positive_width_disables_wrapping() {
        assert_eq!(body_width_from(0), 0);
        assert_eq!(body_width_from(-5), 0);
        assert_eq!(body_width_from(40), 40);
    }

    #[test]
    fn bad_indent_falls_back_to_default() {
        assert_eq!(indent_from("google_list_indent", -3, 36), 36);
        assert_eq!(indent_from("google_list_indent", 0, 36), 36);
        assert_eq!(indent_from("list_indent", 4, 2), 4);
    }
}
