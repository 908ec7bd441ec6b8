// src/tokenizer.rs
//
// A forgiving, pull-based HTML scanner.
//
// - Yields start tags (with entity-decoded attributes), end tags, text runs and
//   character references, strictly in document order.
// - Comments, doctypes and processing instructions are skipped.
// - RAW-TEXT elements (script, style) yield their body as one text event with
//   no reference splitting, up to the matching end tag.
// - Anything that does not scan as markup is passed through as text; the
//   scanner never fails.

use memchr::{memchr, memchr2};

use crate::entities;
use crate::stack::Attributes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attrs: Attributes,
    pub self_closing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    StartTag(StartTag),
    EndTag(String),
    Text(&'a str),
    /// Body of a character reference: `amp`, `#8212`, `#x2014`.
    EntityRef(&'a str),
}

pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    /// RAW-TEXT element whose body comes next.
    raw: Option<String>,
    /// End tag owed after a RAW-TEXT body.
    pending_end: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            raw: None,
            pending_end: None,
        }
    }

    fn raw_text(&mut self, name: String) -> Option<Event<'a>> {
        let src = self.src;
        let bytes = src.as_bytes();
        let start = self.pos;
        let (body_end, resume, closed) = find_raw_text_end(bytes, start, &name);
        self.pos = resume;
        if closed {
            self.pending_end = Some(name);
        }
        if body_end > start {
            Some(Event::Text(&src[start..body_end]))
        } else {
            self.pending_end.take().map(Event::EndTag)
        }
    }

    fn markup(&mut self) -> Option<Event<'a>> {
        let src = self.src;
        let bytes = src.as_bytes();
        let i = self.pos;
        let rest = &bytes[i..];

        if rest.starts_with(b"<!--") {
            self.pos = scan_comment(bytes, i);
            return None;
        }

        match rest.get(1) {
            Some(b'!' | b'?') => {
                self.pos = memchr(b'>', &rest[1..]).map_or(bytes.len(), |p| i + p + 2);
                None
            }
            Some(b'/') if rest.get(2).is_some_and(|c| !c.is_ascii_alphabetic()) => {
                // `</ >`, `</3>`: bogus comments.
                self.pos = memchr(b'>', rest).map_or(bytes.len(), |p| i + p + 1);
                None
            }
            Some(c) if *c == b'/' || c.is_ascii_alphabetic() => {
                let Some(j) = find_tag_end(bytes, i) else {
                    self.pos = i + 1;
                    return Some(Event::Text(&src[i..i + 1]));
                };
                self.pos = j + 1;
                let tag = &src[i..=j];
                let info = parse_tag_info(tag.as_bytes());
                let name = String::from_utf8_lossy(info.name).to_ascii_lowercase();
                if info.is_end {
                    return Some(Event::EndTag(name));
                }
                if is_raw_text(&name) && !info.self_closing {
                    self.raw = Some(name.clone());
                }
                Some(Event::StartTag(StartTag {
                    attrs: parse_attributes(tag),
                    name,
                    self_closing: info.self_closing,
                }))
            }
            _ => {
                self.pos = i + 1;
                Some(Event::Text(&src[i..i + 1]))
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        if let Some(name) = self.pending_end.take() {
            return Some(Event::EndTag(name));
        }
        if let Some(name) = self.raw.take() {
            if let Some(event) = self.raw_text(name) {
                return Some(event);
            }
        }

        let src = self.src;
        let bytes = src.as_bytes();
        while self.pos < bytes.len() {
            let i = self.pos;
            match bytes[i] {
                b'<' => {
                    if let Some(event) = self.markup() {
                        return Some(event);
                    }
                }
                b'&' => {
                    if let Some((body, len)) = entities::scan_reference(bytes, i) {
                        self.pos = i + len;
                        return Some(Event::EntityRef(body));
                    }
                    self.pos = i + 1;
                    return Some(Event::Text(&src[i..i + 1]));
                }
                _ => {
                    let end = memchr2(b'<', b'&', &bytes[i..]).map_or(bytes.len(), |off| i + off);
                    self.pos = end;
                    return Some(Event::Text(&src[i..end]));
                }
            }
        }
        None
    }
}

/* =============================== Core sets =============================== */

fn is_raw_text(name: &str) -> bool {
    matches!(name, "script" | "style")
}

/* ============================ Utility predicates ========================= */

#[inline]
fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

#[inline]
fn is_ws(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' || b == b'\x0c'
}

/* =============================== Tag parsing ============================= */

#[derive(Clone, Copy, Debug)]
struct TagInfo<'a> {
    name: &'a [u8],
    is_end: bool,
    self_closing: bool,
}

/// Find the '>' for a tag starting at `i` (s[i] == '<'), being quote-aware.
fn find_tag_end(s: &[u8], mut i: usize) -> Option<usize> {
    let n = s.len();
    i += 1;
    let mut quote: u8 = 0;
    while i < n {
        let b = s[i];
        if quote != 0 {
            if b == quote {
                quote = 0;
            }
        } else if b == b'"' || b == b'\'' {
            quote = b;
        } else if b == b'>' {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Extract tag name, end/self-closing flags from raw `<...>` bytes.
fn parse_tag_info(tag: &[u8]) -> TagInfo<'_> {
    let n = tag.len();
    let mut i = 1;

    let mut is_end = false;
    if i < n && tag[i] == b'/' {
        is_end = true;
        i += 1;
    }
    while i < n && is_ws(tag[i]) {
        i += 1;
    }
    let start = i;
    while i < n && is_name_char(tag[i]) {
        i += 1;
    }
    let name = &tag[start..i];

    // self-closing? check before '>'
    let mut j = n - 1;
    while j > 0 && is_ws(tag[j - 1]) {
        j -= 1;
    }
    let self_closing = !is_end && j >= 2 && tag[j - 1] == b'/';

    TagInfo {
        name,
        is_end,
        self_closing,
    }
}

/* =========================== Attribute scanning ========================== */

/// Collect `name ( '=' value )?` pairs from a start tag. Names are lowercased,
/// values may be quoted or unquoted and are entity-decoded. The first of
/// several same-named attributes wins.
fn parse_attributes(tag: &str) -> Attributes {
    let bytes = tag.as_bytes();
    let len = bytes.len();
    let mut attrs = Attributes::new();

    // Skip '<' and the tag name.
    let mut i = 1usize;
    while i < len && is_name_char(bytes[i]) {
        i += 1;
    }

    while i < len && bytes[i] != b'>' {
        // skip whitespace and slashes
        while i < len && (is_ws(bytes[i]) || bytes[i] == b'/') {
            i += 1;
        }
        if i >= len || bytes[i] == b'>' {
            break;
        }

        let name_start = i;
        while i < len && !is_ws(bytes[i]) && !matches!(bytes[i], b'=' | b'>' | b'/') {
            i += 1;
        }
        if i == name_start {
            // Stray '='; advance to avoid infinite loops.
            i += 1;
            continue;
        }
        let name = tag[name_start..i].to_ascii_lowercase();

        while i < len && is_ws(bytes[i]) {
            i += 1;
        }

        let mut value = "";
        if i < len && bytes[i] == b'=' {
            i += 1;
            while i < len && is_ws(bytes[i]) {
                i += 1;
            }
            if i < len && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let q = bytes[i];
                i += 1;
                let value_start = i;
                while i < len && bytes[i] != q {
                    i += 1;
                }
                value = &tag[value_start..i];
                if i < len {
                    i += 1;
                }
            } else {
                let value_start = i;
                while i < len && !is_ws(bytes[i]) && bytes[i] != b'>' {
                    i += 1;
                }
                value = &tag[value_start..i];
            }
        }

        attrs
            .entry(name)
            .or_insert_with(|| entities::decode(value).into_owned());
    }
    attrs
}

/* ============================== Comments ================================ */

/// Index just past the `-->` closing the comment that starts at `i`, or the
/// end of input when the comment is unterminated.
fn scan_comment(s: &[u8], i: usize) -> usize {
    let mut k = i + 4;
    while k < s.len() {
        let Some(p) = memchr(b'-', &s[k..]) else {
            break;
        };
        let j = k + p;
        if s[j..].starts_with(b"-->") {
            return j + 3;
        }
        k = j + 1;
    }
    s.len()
}

/* ============================ Raw-text scanning ========================= */

/// Scan from `i` to the end tag matching RAW-TEXT element `name`.
/// Returns (body_end, index_after_end_tag, closed_found).
fn find_raw_text_end(src: &[u8], i: usize, name: &str) -> (usize, usize, bool) {
    let n = src.len();
    let mut j = i;
    loop {
        let Some(pos) = memchr(b'<', &src[j..]).map(|off| j + off) else {
            return (n, n, false);
        };
        if pos + 2 >= n || src[pos + 1] != b'/' {
            j = pos + 1;
            continue;
        }
        let Some(end) = find_tag_end(src, pos) else {
            return (n, n, false);
        };
        let ti = parse_tag_info(&src[pos..=end]);
        if ti.name.eq_ignore_ascii_case(name.as_bytes()) {
            return (pos, end + 1, true);
        }
        j = end + 1;
    }
}
