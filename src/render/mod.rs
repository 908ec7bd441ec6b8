// src/render/mod.rs
//
// Single-pass streaming formatter: consumes tokenizer events, keeps the open
// element context on a `TagStack`, and appends finished blocks to an
// `OutputBuffer`.
//
// - Inline content accumulates in `line` (or the open table cell) until a
//   block boundary flushes it with the prefixes of the enclosing containers.
// - Block separation is requested, never written directly: the buffer merges
//   requests and materializes them only between two real blocks.
// - End tags are matched against the stack first; unmatched ones are dropped.

mod block;
mod google;
mod inline;
mod output;

use std::collections::{HashMap, HashSet};

use url::Url;

use crate::config::Config;
use crate::entities;
use crate::stack::{Attributes, StackMode, TagFrame, TagStack};
use crate::tokenizer::{Event, StartTag};

use block::{ItemMarker, ListState, PreBlock, Table};
use google::Style;
use inline::{LinkRefs, Marker, OpenLink};
use output::OutputBuffer;

/// Elements that never have content or an end tag.
const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text never reaches the output.
const DROPPED: &[&str] = &["script", "style", "title", "noscript", "template"];

/// Blocks separated from their neighbours by a single line break.
const LINE_BLOCKS: &[&str] = &[
    "div", "section", "article", "header", "footer", "nav", "main", "aside", "figure",
    "figcaption", "dl", "dt", "dd", "address", "form", "fieldset", "caption",
];

/// Blocks separated from their neighbours by a blank line.
const PARAGRAPH_BLOCKS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote"];

fn is_block(name: &str) -> bool {
    LINE_BLOCKS.contains(&name)
        || PARAGRAPH_BLOCKS.contains(&name)
        || matches!(name, "ul" | "ol" | "li" | "pre" | "table" | "hr")
}

fn heading_level(name: &str) -> Option<usize> {
    match name.as_bytes() {
        [b'h', d @ b'1'..=b'6'] => Some(usize::from(d - b'0')),
        _ => None,
    }
}

pub struct Renderer<'c> {
    config: &'c Config,
    stack: TagStack,
    out: OutputBuffer,

    /// Inline text of the block being built.
    line: String,
    /// Whitespace was seen and a single space is owed before the next word.
    pending_space: bool,
    /// Markers opened since the last piece of content, with their offsets.
    fresh_markers: Vec<(Marker, usize)>,
    /// Marker closed last and the target length right after it.
    last_close: Option<(Marker, usize)>,

    /// Open count per `Marker`, and whether its opening marker was written.
    marker_depth: [usize; 4],
    marker_written: [bool; 4],
    /// Delimiter each written marker opened with.
    marker_text: [&'static str; 4],
    /// Runs closed at a block or cell boundary, reopened before new content.
    reopen: Vec<Marker>,
    /// Offset of the opening backtick of the current code span.
    code_start: Option<usize>,
    /// Struck-through content being hidden.
    hidden_depth: usize,

    pre: Option<PreBlock>,
    link: Option<OpenLink>,
    table: Option<Table>,
    lists: HashMap<usize, ListState>,
    items: HashMap<usize, ItemMarker>,

    refs: LinkRefs,
    anchors: HashSet<String>,
    base: Option<Url>,

    css: HashMap<String, Style>,
    styles: HashMap<usize, Style>,
    google_markers: HashMap<usize, Vec<Marker>>,
}

impl<'c> Renderer<'c> {
    pub fn new(config: &'c Config) -> Self {
        let mode = if config.strict_tags {
            StackMode::Strict
        } else {
            StackMode::Tolerant
        };
        let base = config.base_url.as_deref().and_then(|raw| match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(err) => {
                tracing::warn!(base_url = raw, %err, "ignoring unparsable base URL");
                None
            }
        });
        Self {
            config,
            stack: TagStack::new(mode),
            out: OutputBuffer::new(),
            line: String::new(),
            pending_space: false,
            fresh_markers: Vec::new(),
            last_close: None,
            marker_depth: [0; 4],
            marker_written: [false; 4],
            marker_text: Marker::ALL.map(Marker::as_str),
            reopen: Vec::new(),
            code_start: None,
            hidden_depth: 0,
            pre: None,
            link: None,
            table: None,
            lists: HashMap::new(),
            items: HashMap::new(),
            refs: LinkRefs::default(),
            anchors: HashSet::new(),
            base,
            css: HashMap::new(),
            styles: HashMap::new(),
            google_markers: HashMap::new(),
        }
    }

    pub fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::StartTag(tag) => self.start_tag(tag),
            Event::EndTag(name) => self.end_tag(&name),
            Event::Text(text) => self.text(text),
            Event::EntityRef(reference) => {
                let resolved = entities::resolve(reference, self.config.unicode_snob);
                self.text(&resolved);
            }
        }
    }

    /// Close everything still open and produce the final Markdown.
    pub fn finish(mut self) -> String {
        while let Some(name) = self.stack.top().map(|f| f.name.clone()) {
            self.end_tag(&name);
        }
        self.finish_block();
        self.flush_link_defs(true);
        self.out.finish(self.config.body_width)
    }

    /* ============================== Tags ============================== */

    fn start_tag(&mut self, tag: StartTag) {
        let StartTag {
            name,
            attrs,
            self_closing,
        } = tag;

        for key in ["id", "name"] {
            if let Some(anchor) = attrs.get(key) {
                self.anchors.insert(anchor.clone());
            }
        }
        self.implicit_closes(&name);
        // Text before a block belongs to the containers already open.
        if is_block(&name) {
            self.finish_block();
        }

        if VOID.contains(&name.as_str()) {
            self.void_element(&name, &attrs);
            return;
        }

        let style = self.config.google_doc.then(|| {
            let parent = self.stack.top().and_then(|f| self.styles.get(&f.ordinal));
            google::element_style(&attrs, &self.css, parent)
        });
        let ordinal = self.stack.push(&name, attrs.clone());
        if let Some(style) = style {
            self.styles.insert(ordinal, style);
        }
        self.open(&name, &attrs, ordinal);

        // XHTML-style `<div/>`: nothing can be inside, close it right away.
        if self_closing {
            self.end_tag(&name);
        }
    }

    fn implicit_closes(&mut self, name: &str) {
        let open_p = |stack: &TagStack| {
            stack
                .nearest(&["p", "li", "blockquote", "td", "th", "div"])
                .is_some_and(|f| f.name == "p")
        };
        if is_block(name) && open_p(&self.stack) {
            self.end_tag("p");
        }
        match name {
            "li" => {
                if self
                    .stack
                    .nearest(&["li", "ul", "ol"])
                    .is_some_and(|f| f.name == "li")
                {
                    self.end_tag("li");
                }
            }
            "td" | "th" => {
                if let Some(cell) = self
                    .stack
                    .nearest(&["td", "th", "tr", "table"])
                    .filter(|f| f.name == "td" || f.name == "th")
                    .map(|f| f.name.clone())
                {
                    self.end_tag(&cell);
                }
            }
            "tr" => {
                if self
                    .stack
                    .nearest(&["tr", "table"])
                    .is_some_and(|f| f.name == "tr")
                {
                    self.end_tag("tr");
                }
            }
            "body" => {
                if self.stack.is_open("head") {
                    self.end_tag("head");
                }
            }
            _ => {}
        }
    }

    fn void_element(&mut self, name: &str, attrs: &Attributes) {
        match name {
            "br" => self.line_break(),
            "img" => self.image(attrs),
            "hr" => self.rule(),
            "base" => {
                if self.base.is_none() {
                    self.base = attrs.get("href").and_then(|href| Url::parse(href).ok());
                }
            }
            _ => {}
        }
    }

    fn open(&mut self, name: &str, attrs: &Attributes, ordinal: usize) {
        if self.config.google_doc && name == "span" {
            self.google_span(ordinal);
        }
        match name {
            "em" | "i" | "cite" | "dfn" | "var" => self.open_marker(Marker::Emphasis),
            "strong" | "b" => self.open_marker(Marker::Strong),
            "del" | "s" | "strike" => self.open_marker(Marker::Strike),
            "code" | "tt" | "kbd" | "samp" => self.open_code(attrs),
            "q" => self.quote_mark(true),
            "a" => self.open_link(ordinal, attrs),
            "ul" | "ol" => self.open_list(name, attrs, ordinal),
            "li" => self.open_item(ordinal),
            "pre" => self.open_pre(attrs),
            "table" => self.open_table(),
            "tr" => {
                if let Some(table) = self.outer_table() {
                    table.start_row();
                } else {
                    self.cell_separator();
                }
            }
            "td" | "th" => {
                if let Some(table) = self.outer_table() {
                    table.start_cell();
                    self.reset_inline();
                } else {
                    self.cell_separator();
                }
            }
            _ if PARAGRAPH_BLOCKS.contains(&name) => self.block_break(2),
            _ if LINE_BLOCKS.contains(&name) => self.block_break(1),
            _ => {}
        }
    }

    fn end_tag(&mut self, name: &str) {
        self.close_children(name);
        let Some(frame) = self.stack.matching(name).cloned() else {
            tracing::trace!(tag = name, "ignoring unmatched end tag");
            return;
        };
        // Flush while the frame still contributes its prefix.
        if is_block(name) {
            self.finish_block();
        }
        self.stack.pop(name);
        self.close(&frame);
        self.styles.remove(&frame.ordinal);
    }

    fn close(&mut self, frame: &TagFrame) {
        if let Some(markers) = self.google_markers.remove(&frame.ordinal) {
            for marker in markers.into_iter().rev() {
                self.close_marker(marker);
            }
        }
        let name = frame.name.as_str();
        match name {
            "em" | "i" | "cite" | "dfn" | "var" => self.close_marker(Marker::Emphasis),
            "strong" | "b" => self.close_marker(Marker::Strong),
            "del" | "s" | "strike" => self.close_marker(Marker::Strike),
            "code" | "tt" | "kbd" | "samp" => self.close_code(),
            "q" => self.quote_mark(false),
            "a" => self.close_link(frame.ordinal),
            "ul" | "ol" => self.close_list(frame.ordinal),
            "li" => {
                self.items.remove(&frame.ordinal);
                self.block_break(1);
            }
            "pre" => self.close_pre(),
            "table" => self.close_table(),
            "tr" => {
                if let Some(table) = self.outer_table() {
                    table.end_row();
                }
            }
            "td" | "th" => {
                if self.outer_table().is_some() {
                    self.break_inline_runs();
                    if let Some(table) = self.outer_table() {
                        table.end_cell();
                    }
                    self.reset_inline();
                }
            }
            _ if PARAGRAPH_BLOCKS.contains(&name) => self.block_break(2),
            _ if LINE_BLOCKS.contains(&name) => self.block_break(1),
            _ => {}
        }
    }

    /// Close the open children of the element an end tag named `name` is
    /// about to close: items of a list, cells of a row, rows of a table.
    fn close_children(&mut self, name: &str) {
        let (children, scope): (&[&str], &[&str]) = match name {
            "ul" | "ol" => (&["li"], &["li", "ul", "ol"]),
            "tr" => (&["td", "th"], &["td", "th", "tr"]),
            "table" => (&["td", "th", "tr"], &["td", "th", "tr", "table"]),
            _ => return,
        };
        if !self.stack.is_open(name) {
            return;
        }
        while let Some(child) = self
            .stack
            .nearest(scope)
            .filter(|f| children.contains(&f.name.as_str()))
            .map(|f| f.name.clone())
        {
            if self.stack.matching(&child).is_none() {
                break;
            }
            self.end_tag(&child);
        }
    }

    /* ============================== Text ============================== */

    fn text(&mut self, text: &str) {
        if self.stack.top().is_some_and(|f| f.name == "style") {
            if self.config.google_doc {
                google::parse_css(text, &mut self.css);
            }
            return;
        }
        if DROPPED.iter().any(|name| self.stack.is_open(name)) || self.hidden_depth > 0 {
            return;
        }
        if let Some(pre) = self.pre.as_mut() {
            pre.body.push_str(text);
            return;
        }
        self.push_inline_text(text);
    }

    /* ============================ Blocks ============================= */

    /// Request `n` newlines before the next block. Inside a table cell this
    /// only separates words; right after a list marker it does nothing so the
    /// first block of an item shares the marker line.
    fn block_break(&mut self, n: usize) {
        if self.in_cell() {
            self.pending_space = true;
            return;
        }
        if self.innermost_item().is_some_and(|item| !item.used) {
            return;
        }
        self.out.break_line(n);
    }

    /// Flush the inline line as a block with the current container prefixes.
    /// Inside a table cell blocks only separate words.
    fn finish_block(&mut self) {
        if self.in_cell() {
            return;
        }
        self.break_inline_runs();
        let raw = std::mem::take(&mut self.line);
        self.reset_inline();

        let parts: Vec<&str> = raw
            .split('\n')
            .map(|part| part.trim_matches(' '))
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            return;
        }

        let heading = self
            .stack
            .nearest(&["h1", "h2", "h3", "h4", "h5", "h6"])
            .and_then(|f| heading_level(&f.name));
        let (first, rest) = self.prefixes();
        let mut text = String::new();
        match heading {
            Some(level) => {
                text.push_str(&first);
                text.push_str(&"#".repeat(level));
                text.push(' ');
                text.push_str(&parts.join(" "));
            }
            None => {
                for (idx, part) in parts.iter().enumerate() {
                    if idx > 0 {
                        text.push_str("  \n");
                        text.push_str(&rest);
                    } else {
                        text.push_str(&first);
                    }
                    text.push_str(part);
                }
            }
        }
        self.out
            .push(text, heading.is_none(), self.stack.depth_of("blockquote"));
        if self.config.links_each_paragraph {
            self.flush_link_defs(false);
        }
    }

    /// Push pre-rendered lines as one verbatim block under the current prefixes.
    fn push_lines(&mut self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        let (first, rest) = self.prefixes();
        let mut text = String::new();
        for (idx, line) in lines.iter().enumerate() {
            if idx > 0 {
                text.push('\n');
            }
            let prefix = if idx == 0 { &first } else { &rest };
            if line.is_empty() {
                text.push_str(prefix.trim_end());
            } else {
                text.push_str(prefix);
                text.push_str(line);
            }
        }
        self.out.push(text, false, self.stack.depth_of("blockquote"));
    }

    /// Prefixes for the first and the following lines of a block: quote
    /// markers, item indentation and the innermost item's marker. Marks that
    /// marker as used.
    fn prefixes(&mut self) -> (String, String) {
        let innermost = self.innermost_item_ordinal();
        let google_level = innermost
            .and_then(|ordinal| self.items.get(&ordinal))
            .and_then(|item| item.level);
        let indent = " ".repeat(self.config.list_indent);

        let mut first = String::new();
        let mut rest = String::new();
        if let Some(level) = google_level {
            first.push_str(&indent.repeat(level));
            rest.push_str(&indent.repeat(level));
        }
        for frame in self.stack.frames() {
            match frame.name.as_str() {
                "blockquote" => {
                    first.push_str("> ");
                    rest.push_str("> ");
                }
                "li" => {
                    let Some(item) = self.items.get_mut(&frame.ordinal) else {
                        continue;
                    };
                    if Some(frame.ordinal) == innermost {
                        let pad = " ".repeat(item.marker.len() + 1);
                        if item.used {
                            first.push_str(&pad);
                        } else {
                            first.push_str(&item.marker);
                            first.push(' ');
                            item.used = true;
                        }
                        rest.push_str(&pad);
                        continue;
                    }
                    // An item opening with a nested list shares its first line.
                    if !item.used {
                        let lead = format!("{} ", item.marker);
                        first.push_str(&format!("{lead:<width$}", width = indent.len()));
                        item.used = true;
                    } else if google_level.is_none() {
                        first.push_str(&indent);
                    }
                    if google_level.is_none() {
                        rest.push_str(&indent);
                    }
                }
                _ => {}
            }
        }
        (first, rest)
    }

    fn innermost_item_ordinal(&self) -> Option<usize> {
        self.stack
            .frames()
            .iter()
            .rev()
            .find(|f| f.name == "li" && self.items.contains_key(&f.ordinal))
            .map(|f| f.ordinal)
    }

    fn innermost_item(&self) -> Option<&ItemMarker> {
        self.innermost_item_ordinal()
            .and_then(|ordinal| self.items.get(&ordinal))
    }

    /// Forget inline state tied to the current target.
    fn reset_inline(&mut self) {
        self.pending_space = false;
        self.fresh_markers.clear();
        self.last_close = None;
        // The target starts over; an open link keeps collecting from there.
        if let Some(link) = self.link.as_mut() {
            link.start = 0;
        }
    }

    /* ============================ Google ============================= */

    fn google_span(&mut self, ordinal: usize) {
        let Some(style) = self.styles.get(&ordinal) else {
            return;
        };
        let parent = self
            .stack
            .frames()
            .iter()
            .rev()
            .nth(1)
            .and_then(|f| self.styles.get(&f.ordinal));
        let newly = |check: fn(&Style) -> bool| check(style) && !parent.is_some_and(check);

        let mut markers = Vec::new();
        if newly(google::is_strikethrough) {
            markers.push(Marker::Strike);
        }
        if newly(google::is_bold) {
            markers.push(Marker::Strong);
        }
        if newly(google::is_italic) {
            markers.push(Marker::Emphasis);
        }
        if newly(google::is_fixed_width) {
            markers.push(Marker::Code);
        }
        for &marker in &markers {
            self.open_marker(marker);
        }
        if !markers.is_empty() {
            self.google_markers.insert(ordinal, markers);
        }
    }

    /// Nesting level of a Google Docs list item, from its own or its list's
    /// left margin.
    fn google_item_level(&self, ordinal: usize) -> Option<usize> {
        if !self.config.google_doc {
            return None;
        }
        let indent = self.config.google_list_indent.max(1);
        let own = self
            .styles
            .get(&ordinal)
            .map(|style| google::list_nest_level(style, indent))
            .unwrap_or(0);
        let list = self
            .stack
            .nearest(&["ul", "ol"])
            .and_then(|f| self.styles.get(&f.ordinal))
            .map(|style| google::list_nest_level(style, indent))
            .unwrap_or(0);
        let level = own.max(list);
        (level > 0).then(|| level - 1)
    }
}

#[cfg(test)]
mod tests;
