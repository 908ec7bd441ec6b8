// src/render/inline.rs
//
// Inline rendering: emphasis markers, code spans, links, images, hard breaks
// and the whitespace-collapsing text writer.

use std::borrow::Cow;

use url::Url;

use super::Renderer;
use crate::stack::Attributes;

/// Characters backslash-escaped in literal text when `escape_snob` is set.
const ESCAPED: &[char] = &[
    '\\', '`', '*', '_', '{', '}', '[', ']', '(', ')', '#', '+', '-', '.', '!',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Emphasis,
    Strong,
    Strike,
    Code,
}

impl Marker {
    pub const ALL: [Marker; 4] = [
        Marker::Emphasis,
        Marker::Strong,
        Marker::Strike,
        Marker::Code,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Marker::Emphasis => "*",
            Marker::Strong => "**",
            Marker::Strike => "~~",
            Marker::Code => "`",
        }
    }

    /// Delimiter used right after a closed `*` run, where `*` would merge
    /// into one ambiguous delimiter run.
    fn alternate(self) -> &'static str {
        match self {
            Marker::Emphasis => "_",
            Marker::Strong => "__",
            _ => self.as_str(),
        }
    }

    /// Elements that open this marker outside Google Docs spans.
    fn elements(self) -> &'static [&'static str] {
        match self {
            Marker::Emphasis => &["em", "i", "cite", "dfn", "var"],
            Marker::Strong => &["strong", "b"],
            Marker::Strike => &["del", "s", "strike"],
            Marker::Code => &["code", "tt", "kbd", "samp"],
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// An `<a>` whose text is being collected.
#[derive(Debug)]
pub struct OpenLink {
    ordinal: usize,
    /// Offset in the target where the link text starts.
    pub(super) start: usize,
    href: Option<String>,
    title: Option<String>,
}

/// Reference-style link definitions, numbered from 1 in order of first use.
#[derive(Debug, Default)]
pub struct LinkRefs {
    entries: Vec<(String, Option<String>)>,
    emitted: usize,
}

impl LinkRefs {
    pub fn register(&mut self, url: String, title: Option<&str>) -> usize {
        let title = title.map(str::to_string);
        if let Some(idx) = self
            .entries
            .iter()
            .position(|(u, t)| *u == url && *t == title)
        {
            return idx + 1;
        }
        self.entries.push((url, title));
        self.entries.len()
    }

    /// Definition lines for every reference registered since the last call.
    pub fn take_pending(&mut self) -> Vec<String> {
        let lines = self.entries[self.emitted..]
            .iter()
            .enumerate()
            .map(|(idx, (url, title))| {
                format!(
                    "   [{}]: {}{}",
                    self.emitted + idx + 1,
                    destination(url),
                    title_suffix(title.as_deref())
                )
            })
            .collect();
        self.emitted = self.entries.len();
        lines
    }
}

impl Renderer<'_> {
    /// Where inline output goes: the open table cell, else the current line.
    pub(super) fn target(&mut self) -> &mut String {
        match self.table.as_mut().and_then(|t| t.cell_mut()) {
            Some(cell) => cell,
            None => &mut self.line,
        }
    }

    pub(super) fn in_cell(&self) -> bool {
        self.table.as_ref().is_some_and(|t| t.has_open_cell())
    }

    /// Write the owed space, placing it before any markers opened since the
    /// last content so `<b> x</b>` becomes ` **x**`.
    fn flush_space(&mut self) {
        if !std::mem::take(&mut self.pending_space) {
            return;
        }
        let fresh = self.fresh_markers.first().map(|&(_, start)| start);
        let target = self.target();
        let at = fresh.unwrap_or(target.len());
        if at == 0 || target[..at].ends_with([' ', '\n']) {
            return;
        }
        target.insert(at, ' ');
        for run in &mut self.fresh_markers {
            run.1 += 1;
        }
        if let Some(code) = self.code_start.as_mut() {
            if *code >= at {
                *code += 1;
            }
        }
        if let Some(link) = self.link.as_mut() {
            if link.start >= at {
                link.start += 1;
            }
        }
    }

    fn push_content(&mut self, content: &str) {
        self.reopen_runs();
        self.flush_space();
        self.target().push_str(content);
        self.fresh_markers.clear();
        self.last_close = None;
    }

    /// Collapse ASCII whitespace runs to single spaces and append the words.
    pub(super) fn push_inline_text(&mut self, text: &str) {
        let escape =
            self.config.escape_snob && self.marker_depth[Marker::Code.index()] == 0;
        for (idx, word) in text.split(|c: char| c.is_ascii_whitespace()).enumerate() {
            if idx > 0 {
                self.pending_space = true;
            }
            if word.is_empty() {
                continue;
            }
            if escape {
                let escaped = escape_markdown(word);
                self.push_content(&escaped);
            } else {
                self.push_content(word);
            }
        }
    }

    /* =========================== Emphasis =========================== */

    pub(super) fn open_marker(&mut self, marker: Marker) {
        let i = marker.index();
        self.marker_depth[i] += 1;
        if self.marker_depth[i] > 1 {
            return;
        }
        if marker == Marker::Strike && self.config.hide_strikethrough {
            self.hidden_depth += 1;
            return;
        }
        if self.pre.is_some()
            || self.hidden_depth > 0
            || (self.config.ignore_emphasis && marker != Marker::Code)
        {
            return;
        }

        // `<b>a</b><b>b</b>`: reopen the run that just closed.
        if !self.pending_space {
            if let Some((last, end)) = self.last_close {
                let len = self.marker_text[i].len();
                let target = self.target();
                if last == marker && end == target.len() {
                    target.truncate(end - len);
                    self.last_close = None;
                    self.marker_written[i] = true;
                    return;
                }
            }
        }
        self.reopen_runs();
        self.write_open(marker);
    }

    /// Write the opening delimiter of `marker` and return its offset.
    fn write_open(&mut self, marker: Marker) -> usize {
        let i = marker.index();
        self.flush_space();
        let last_close = self.last_close;
        let target = self.target();
        let after_star_run =
            last_close.is_some_and(|(_, end)| end == target.len()) && target.ends_with('*');
        let text = if after_star_run {
            marker.alternate()
        } else {
            marker.as_str()
        };
        let start = target.len();
        target.push_str(text);
        self.fresh_markers.push((marker, start));
        self.marker_text[i] = text;
        self.marker_written[i] = true;
        self.last_close = None;
        if marker == Marker::Code {
            self.code_start = Some(start);
        }
        start
    }

    pub(super) fn close_marker(&mut self, marker: Marker) {
        let i = marker.index();
        if self.marker_depth[i] == 0 {
            return;
        }
        self.marker_depth[i] -= 1;
        if self.marker_depth[i] > 0 {
            return;
        }
        self.reopen.retain(|&m| m != marker);
        if marker == Marker::Strike && self.config.hide_strikethrough {
            self.hidden_depth = self.hidden_depth.saturating_sub(1);
            return;
        }
        if !std::mem::take(&mut self.marker_written[i]) {
            return;
        }

        // Nothing was written since the opening marker: drop it instead.
        if let Some(&(last, start)) = self.fresh_markers.last() {
            let end = start + self.marker_text[i].len();
            let target = self.target();
            if last == marker && end == target.len() {
                target.truncate(start);
                self.fresh_markers.pop();
                if let Some(link) = self.link.as_mut() {
                    link.start = link.start.min(start);
                }
                return;
            }
        }
        self.write_close(marker);
    }

    fn write_close(&mut self, marker: Marker) {
        let end = if marker == Marker::Code {
            self.close_code_span()
        } else {
            let text = self.marker_text[marker.index()];
            let target = self.target();
            target.push_str(text);
            Some(target.len())
        };
        self.fresh_markers.clear();
        self.last_close = end.map(|end| (marker, end));
    }

    /// Close the current code span. Content holding backticks gets a longer
    /// delimiter, padded with spaces when it starts or ends with one; such a
    /// span is never merged with the next, so no end offset is returned.
    fn close_code_span(&mut self) -> Option<usize> {
        let code_start = self.code_start;
        let target = self.target();
        let start = code_start
            .filter(|&s| target.is_char_boundary(s) && target[s..].starts_with('`'))
            .filter(|&s| target[s + 1..].contains('`'));
        let Some(start) = start else {
            target.push('`');
            return Some(target.len());
        };

        let content = target.split_off(start + 1);
        target.truncate(start);
        let longest_run = content
            .split(|c| c != '`')
            .map(str::len)
            .max()
            .unwrap_or(0);
        let fence = "`".repeat(longest_run + 1);
        let pad = if content.starts_with('`') || content.ends_with('`') {
            " "
        } else {
            ""
        };
        target.push_str(&fence);
        target.push_str(pad);
        target.push_str(&content);
        target.push_str(pad);
        target.push_str(&fence);

        let grown = fence.len() - 1 + pad.len();
        if let Some(link) = self.link.as_mut() {
            if link.start > start {
                link.start += grown;
            }
        }
        None
    }

    pub(super) fn open_code(&mut self, attrs: &Attributes) {
        if let Some(pre) = self.pre.as_mut() {
            pre.take_language(attrs);
        }
        self.open_marker(Marker::Code);
    }

    pub(super) fn close_code(&mut self) {
        self.close_marker(Marker::Code);
    }

    /* ======================= Block boundaries ======================= */

    /// Close the runs still open at a block or cell boundary so each block
    /// carries balanced delimiters, wrapping an open link around its text.
    /// The runs are reopened before the next piece of content.
    pub(super) fn break_inline_runs(&mut self) {
        // Openers with nothing after them move on unwritten.
        if let Some(&(_, start)) = self.fresh_markers.first() {
            self.target().truncate(start);
            if let Some(link) = self.link.as_mut() {
                link.start = link.start.min(start);
            }
        }
        let mut reopen = std::mem::take(&mut self.reopen);
        for (marker, _) in std::mem::take(&mut self.fresh_markers) {
            self.marker_written[marker.index()] = false;
            reopen.push(marker);
        }

        let mut open: Vec<(usize, Marker)> = Marker::ALL
            .into_iter()
            .filter(|m| self.marker_written[m.index()])
            .map(|m| (self.marker_frame(m), m))
            .collect();
        open.sort_by(|a, b| b.0.cmp(&a.0));

        let link = self.link.take();
        let link_at = link
            .as_ref()
            .map_or(usize::MAX, |l| self.frame_index(l.ordinal));
        let mut link_pending = link.is_some();
        for (at, marker) in open {
            if link_pending && at < link_at {
                if let Some(link) = &link {
                    self.emit_link(link);
                }
                link_pending = false;
            }
            self.marker_written[marker.index()] = false;
            self.write_close(marker);
            reopen.push(marker);
        }
        if link_pending {
            if let Some(link) = &link {
                self.emit_link(link);
            }
        }
        self.link = link;

        reopen.sort_by_key(|&m| self.marker_frame(m));
        reopen.dedup();
        self.reopen = reopen;
    }

    /// Reopen runs carried over a block boundary, outermost first. Runs from
    /// outside an open link stay in front of the link text.
    fn reopen_runs(&mut self) {
        if self.reopen.is_empty() {
            return;
        }
        let link_at = self.link.as_ref().map(|l| self.frame_index(l.ordinal));
        for marker in std::mem::take(&mut self.reopen) {
            let outside_link = link_at.is_some_and(|at| self.marker_frame(marker) < at);
            let start = self.write_open(marker);
            if outside_link {
                let end = start + self.marker_text[marker.index()].len();
                if let Some(link) = self.link.as_mut() {
                    if link.start == start {
                        link.start = end;
                    }
                }
            }
        }
    }

    /// Stack position of the outermost open element that opened `marker`.
    fn marker_frame(&self, marker: Marker) -> usize {
        let names = marker.elements();
        self.stack
            .frames()
            .iter()
            .position(|f| {
                names.contains(&f.name.as_str())
                    || self
                        .google_markers
                        .get(&f.ordinal)
                        .is_some_and(|markers| markers.contains(&marker))
            })
            .unwrap_or(usize::MAX)
    }

    fn frame_index(&self, ordinal: usize) -> usize {
        self.stack
            .frames()
            .iter()
            .position(|f| f.ordinal == ordinal)
            .unwrap_or(usize::MAX)
    }

    pub(super) fn quote_mark(&mut self, opening: bool) {
        if self.hidden_depth > 0 {
            return;
        }
        if let Some(pre) = self.pre.as_mut() {
            pre.body.push('"');
            return;
        }
        let mark = match (self.config.unicode_snob, opening) {
            (true, true) => "\u{201c}",
            (true, false) => "\u{201d}",
            (false, _) => "\"",
        };
        if opening {
            self.push_content(mark);
        } else {
            self.target().push_str(mark);
            self.fresh_markers.clear();
            self.last_close = None;
        }
    }

    /* ============================ Breaks ============================ */

    pub(super) fn line_break(&mut self) {
        if self.hidden_depth > 0 {
            return;
        }
        if let Some(pre) = self.pre.as_mut() {
            pre.body.push('\n');
            return;
        }
        if self.in_cell() {
            self.pending_space = true;
            return;
        }
        if self.line.trim_matches(' ').is_empty() {
            return;
        }
        self.pending_space = false;
        self.line.push('\n');
        self.fresh_markers.clear();
        self.last_close = None;
    }

    /* ============================= Links ============================ */

    pub(super) fn open_link(&mut self, ordinal: usize, attrs: &Attributes) {
        if self.link.is_some() || self.pre.is_some() || self.hidden_depth > 0 {
            return;
        }
        self.flush_space();
        let start = self.target().len();
        self.last_close = None;
        self.link = Some(OpenLink {
            ordinal,
            start,
            href: attrs.get("href").cloned(),
            title: attrs.get("title").cloned(),
        });
    }

    pub(super) fn close_link(&mut self, ordinal: usize) {
        if !self.link.as_ref().is_some_and(|l| l.ordinal == ordinal) {
            return;
        }
        if let Some(link) = self.link.take() {
            self.emit_link(&link);
        }
    }

    /// Replace the text collected since `link.start` with link markup.
    fn emit_link(&mut self, link: &OpenLink) {
        let target = self.target();
        let mut start = link.start.min(target.len());
        if !target.is_char_boundary(start) {
            start = 0;
        }
        let text = target.split_off(start);
        let text = text.trim_matches(' ');
        if text.is_empty() {
            return;
        }

        let markup = match link.href.as_deref().map(str::trim) {
            Some(href) if !href.is_empty() => {
                self.link_markup(text, href, link.title.as_deref())
            }
            _ => text.to_string(),
        };
        self.target().push_str(&markup);
        self.fresh_markers.clear();
        self.last_close = None;
    }

    fn link_markup(&mut self, text: &str, href: &str, title: Option<&str>) -> String {
        if self.config.ignore_links {
            return text.to_string();
        }
        if self.config.skip_internal_links {
            if let Some(fragment) = href.strip_prefix('#') {
                if fragment.is_empty() || self.anchors.contains(fragment) {
                    return text.to_string();
                }
            }
        }
        let url = self.resolve_url(href);
        if !self.config.inline_links {
            let n = self.refs.register(url, title);
            return format!("[{text}][{n}]");
        }
        if title.is_none() && text == url && is_autolinkable(&url) {
            return format!("<{url}>");
        }
        format!("[{text}]({}{})", destination(&url), title_suffix(title))
    }

    pub(super) fn image(&mut self, attrs: &Attributes) {
        if self.pre.is_some() || self.hidden_depth > 0 {
            return;
        }
        let alt = attrs
            .get("alt")
            .map(|alt| alt.split_ascii_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        let src = attrs.get("src").map(|s| s.trim()).filter(|s| !s.is_empty());
        let Some(src) = src.filter(|_| !self.config.ignore_images) else {
            self.push_inline_text(&alt);
            return;
        };

        let url = self.resolve_url(src);
        let alt = alt.replace('[', "\\[").replace(']', "\\]");
        let title = attrs.get("title").map(String::as_str);
        let markup = if self.config.inline_links {
            format!("![{alt}]({}{})", destination(&url), title_suffix(title))
        } else {
            let n = self.refs.register(url, title);
            format!("![{alt}][{n}]")
        };
        self.push_content(&markup);
    }

    /// Resolve `href` against the base URL; absolute and unresolvable
    /// references are kept as written.
    pub(super) fn resolve_url(&self, href: &str) -> String {
        let href = href.trim();
        match &self.base {
            Some(base) if Url::parse(href).is_err() => base
                .join(href)
                .map(String::from)
                .unwrap_or_else(|_| href.to_string()),
            _ => href.to_string(),
        }
    }

    /// Emit reference definitions collected so far. Unless `force` is set
    /// this only happens in per-paragraph mode.
    pub(super) fn flush_link_defs(&mut self, force: bool) {
        if self.config.inline_links || !(force || self.config.links_each_paragraph) {
            return;
        }
        let lines = self.refs.take_pending();
        if lines.is_empty() {
            return;
        }
        self.out.break_line(2);
        self.push_lines(&lines);
        self.out.break_line(2);
    }
}

fn escape_markdown(word: &str) -> Cow<'_, str> {
    if !word.contains(ESCAPED) {
        return Cow::Borrowed(word);
    }
    let mut out = String::with_capacity(word.len() + 4);
    for c in word.chars() {
        if ESCAPED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Link destination, angle-bracketed when it would not survive bare.
fn destination(url: &str) -> Cow<'_, str> {
    let mut depth = 0i32;
    let balanced = url.chars().all(|c| {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        depth >= 0
    }) && depth == 0;
    if balanced && !url.contains([' ', '<', '>']) {
        Cow::Borrowed(url)
    } else {
        Cow::Owned(format!("<{}>", url.replace('<', "%3C").replace('>', "%3E")))
    }
}

fn title_suffix(title: Option<&str>) -> String {
    match title {
        Some(title) if !title.is_empty() => format!(" \"{}\"", title.replace('"', "\\\"")),
        _ => String::new(),
    }
}

fn is_autolinkable(url: &str) -> bool {
    !url.contains([' ', '<', '>']) && Url::parse(url).is_ok()
}
