// src/wrap.rs
//
// Markdown-aware line wrapping.
//
// - Works on one line at a time and never joins lines, so hard breaks and
//   block structure survive untouched.
// - Lines that already fit are returned byte-for-byte.
// - Breaks only at spaces, never inside `[..](..)`/`![..](..)`/`[..][..]`
//   spans or backtick code spans; a unit wider than the column stands alone.
// - Continuation lines repeat the structural prefix of the line (indentation
//   and `>` markers), with any list marker blanked out.
// - Never breaks before something that would start a new block (`-`, `1.`,
//   `#`, `>`), which keeps the output stable under re-wrapping.
// - Fenced code, table rows, ATX headings and link definitions pass through.

use unicode_width::UnicodeWidthStr;

/// Wrap `text` to `width` columns. `width == 0` returns the text unchanged.
pub fn wrap(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut fence: Option<Fence> = None;

    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let (prefix_len, continuation) = split_prefix(line);
        let body = &line[prefix_len..];

        if let Some(open) = fence {
            if open.closes(body) {
                fence = None;
            }
            out.push_str(line);
            continue;
        }
        if let Some(open) = Fence::open(body) {
            fence = Some(open);
            out.push_str(line);
            continue;
        }
        if is_unwrappable(body) || line.trim_end_matches(' ').width() <= width {
            out.push_str(line);
            continue;
        }

        wrap_line(&line[..prefix_len], &continuation, body, width, &mut out);
    }
    out
}

fn wrap_line(prefix: &str, continuation: &str, body: &str, width: usize, out: &mut String) {
    let hard_break = body.ends_with("  ");
    let units = split_units(body.trim_end_matches(' '));

    let mut current = String::from(prefix);
    let mut current_width = prefix.width();
    let mut line_has_unit = false;

    for unit in units {
        let unit_width = unit.width();
        if line_has_unit
            && current_width + 1 + unit_width > width
            && !starts_block(unit)
        {
            out.push_str(&current);
            out.push('\n');
            current.clear();
            current.push_str(continuation);
            current_width = continuation.width();
            line_has_unit = false;
        }
        if line_has_unit {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(unit);
        current_width += unit_width;
        line_has_unit = true;
    }

    out.push_str(&current);
    if hard_break {
        out.push_str("  ");
    }
}

/* =========================== Structural prefix ========================== */

/// Length of the leading indentation / quote / list-marker run, and the
/// prefix continuation lines should use instead.
fn split_prefix(line: &str) -> (usize, String) {
    let bytes = line.as_bytes();
    let mut i = 0usize;
    let mut continuation = String::new();

    loop {
        let start = i;
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        continuation.push_str(&line[start..i]);

        if i < bytes.len() && bytes[i] == b'>' {
            i += 1;
            continuation.push('>');
            if i < bytes.len() && bytes[i] == b' ' {
                i += 1;
                continuation.push(' ');
            }
            continue;
        }

        if let Some(marker_len) = list_marker_len(&bytes[i..]) {
            i += marker_len;
            continuation.push_str(&" ".repeat(marker_len));
            continue;
        }

        break;
    }
    (i, continuation)
}

/// `* `, `- `, `+ `, `12. `, `3) ` at the start of `s`, including the space.
fn list_marker_len(s: &[u8]) -> Option<usize> {
    match s {
        [b'*' | b'-' | b'+', b' ', ..] => Some(2),
        _ => {
            let digits = s.iter().take_while(|b| b.is_ascii_digit()).count();
            if (1..=9).contains(&digits)
                && matches!(s.get(digits), Some(b'.' | b')'))
                && s.get(digits + 1) == Some(&b' ')
            {
                Some(digits + 2)
            } else {
                None
            }
        }
    }
}

/// Would `unit` at the start of a continuation line be read as a new block?
fn starts_block(unit: &str) -> bool {
    if matches!(unit, "-" | "*" | "+")
        || unit.starts_with(['>', '#', '|'])
        || unit.starts_with("```")
        || unit.starts_with("~~~")
    {
        return true;
    }
    let digits = unit.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && digits + 1 == unit.len() && (unit.ends_with('.') || unit.ends_with(')'))
}

fn is_unwrappable(body: &str) -> bool {
    if body.starts_with('|') {
        return true;
    }
    let hashes = body.bytes().take_while(|&b| b == b'#').count();
    if (1..=6).contains(&hashes) && matches!(body.as_bytes().get(hashes), None | Some(b' ')) {
        return true;
    }
    // Link definitions: `[1]: http://...`
    body.starts_with('[')
        && body
            .find("]:")
            .is_some_and(|p| !body[..p].contains(' '))
}

/* ================================ Fences ================================ */

#[derive(Clone, Copy)]
struct Fence {
    ch: u8,     // '`' or '~'
    min: usize, // min count
}

impl Fence {
    fn open(body: &str) -> Option<Fence> {
        let ch = *body.as_bytes().first()?;
        if ch != b'`' && ch != b'~' {
            return None;
        }
        let min = body.bytes().take_while(|&b| b == ch).count();
        (min >= 3).then_some(Fence { ch, min })
    }

    fn closes(self, body: &str) -> bool {
        let run = body.bytes().take_while(|&b| b == self.ch).count();
        run >= self.min && body[run..].trim().is_empty()
    }
}

/* =========================== Breakable units ============================ */

/// Split `body` at spaces that are outside protected spans.
fn split_units(body: &str) -> Vec<&str> {
    let protected = protected_spans(body);
    let bytes = body.as_bytes();
    let mut units = Vec::new();
    let mut unit_start: Option<usize> = None;
    let mut span_idx = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        while span_idx < protected.len() && protected[span_idx].1 <= i {
            span_idx += 1;
        }
        let in_span = protected
            .get(span_idx)
            .is_some_and(|&(start, end)| start <= i && i < end);

        if b == b' ' && !in_span {
            if let Some(start) = unit_start.take() {
                units.push(&body[start..i]);
            }
        } else if unit_start.is_none() {
            unit_start = Some(i);
        }
    }
    if let Some(start) = unit_start {
        units.push(&body[start..]);
    }
    units
}

/// Byte ranges of code spans and link/image syntax, in order.
fn protected_spans(body: &str) -> Vec<(usize, usize)> {
    let bytes = body.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
                match find_backtick_run(bytes, i + run, run) {
                    Some(close) => {
                        spans.push((i, close + run));
                        i = close + run;
                    }
                    None => i += run,
                }
            }
            b'[' => match link_end(bytes, i) {
                Some(end) => {
                    spans.push((i, end));
                    i = end;
                }
                None => i += 1,
            },
            _ => i += 1,
        }
    }
    spans
}

fn find_backtick_run(bytes: &[u8], mut i: usize, run: usize) -> Option<usize> {
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let len = bytes[i..].iter().take_while(|&&b| b == b'`').count();
            if len == run {
                return Some(i);
            }
            i += len;
        } else {
            i += 1;
        }
    }
    None
}

/// End (exclusive) of `[text](target)` or `[text][label]` starting at `i`.
fn link_end(bytes: &[u8], i: usize) -> Option<usize> {
    let close = matching(bytes, i, b'[', b']')?;
    match bytes.get(close + 1) {
        Some(b'(') => matching(bytes, close + 1, b'(', b')').map(|e| e + 1),
        Some(b'[') => matching(bytes, close + 1, b'[', b']').map(|e| e + 1),
        _ => None,
    }
}

/// Index of the delimiter closing the one at `i`, honouring nesting and
/// backslash escapes.
fn matching(bytes: &[u8], i: usize, open: u8, close: u8) -> Option<usize> {
    let mut depth = 0usize;
    let mut j = i;
    while j < bytes.len() {
        let b = bytes[j];
        if b == b'\\' {
            j += 2;
            continue;
        }
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(j);
            }
        }
        j += 1;
    }
    None
}
