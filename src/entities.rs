// src/entities.rs
//
// Character references: named (`&mdash;`) and numeric (`&#8212;`, `&#x2014;`).
// Resolution never fails: unknown names come back verbatim, undecodable code
// points come back as `?`.

use lazy_static::lazy_static;
use memchr::memchr;
use std::borrow::Cow;
use std::collections::HashMap;

/// Longest entity name we bother looking for before giving up.
const MAX_NAME_LEN: usize = 32;

/// Named references the converter knows about, mapped to their Unicode text.
const NAMED: &[(&str, &str)] = &[
    ("amp", "&"), ("lt", "<"), ("gt", ">"), ("quot", "\""), ("apos", "'"),
    ("nbsp", "\u{a0}"), ("iexcl", "¡"), ("cent", "¢"), ("pound", "£"), ("curren", "¤"),
    ("yen", "¥"), ("brvbar", "¦"), ("sect", "§"), ("uml", "¨"), ("copy", "©"),
    ("ordf", "ª"), ("laquo", "«"), ("not", "¬"), ("shy", "\u{ad}"), ("reg", "®"),
    ("macr", "¯"), ("deg", "°"), ("plusmn", "±"), ("sup2", "²"), ("sup3", "³"),
    ("acute", "´"), ("micro", "µ"), ("para", "¶"), ("middot", "·"), ("cedil", "¸"),
    ("sup1", "¹"), ("ordm", "º"), ("raquo", "»"), ("frac14", "¼"), ("frac12", "½"),
    ("frac34", "¾"), ("iquest", "¿"), ("times", "×"), ("divide", "÷"),
    ("Agrave", "À"), ("Aacute", "Á"), ("Acirc", "Â"), ("Atilde", "Ã"), ("Auml", "Ä"),
    ("Aring", "Å"), ("AElig", "Æ"), ("Ccedil", "Ç"), ("Egrave", "È"), ("Eacute", "É"),
    ("Ecirc", "Ê"), ("Euml", "Ë"), ("Igrave", "Ì"), ("Iacute", "Í"), ("Icirc", "Î"),
    ("Iuml", "Ï"), ("ETH", "Ð"), ("Ntilde", "Ñ"), ("Ograve", "Ò"), ("Oacute", "Ó"),
    ("Ocirc", "Ô"), ("Otilde", "Õ"), ("Ouml", "Ö"), ("Oslash", "Ø"), ("Ugrave", "Ù"),
    ("Uacute", "Ú"), ("Ucirc", "Û"), ("Uuml", "Ü"), ("Yacute", "Ý"), ("THORN", "Þ"),
    ("szlig", "ß"), ("agrave", "à"), ("aacute", "á"), ("acirc", "â"), ("atilde", "ã"),
    ("auml", "ä"), ("aring", "å"), ("aelig", "æ"), ("ccedil", "ç"), ("egrave", "è"),
    ("eacute", "é"), ("ecirc", "ê"), ("euml", "ë"), ("igrave", "ì"), ("iacute", "í"),
    ("icirc", "î"), ("iuml", "ï"), ("eth", "ð"), ("ntilde", "ñ"), ("ograve", "ò"),
    ("oacute", "ó"), ("ocirc", "ô"), ("otilde", "õ"), ("ouml", "ö"), ("oslash", "ø"),
    ("ugrave", "ù"), ("uacute", "ú"), ("ucirc", "û"), ("uuml", "ü"), ("yacute", "ý"),
    ("thorn", "þ"), ("yuml", "ÿ"), ("OElig", "Œ"), ("oelig", "œ"), ("Scaron", "Š"),
    ("scaron", "š"), ("Yuml", "Ÿ"), ("fnof", "ƒ"), ("circ", "ˆ"), ("tilde", "˜"),
    ("ensp", "\u{2002}"), ("emsp", "\u{2003}"), ("thinsp", "\u{2009}"),
    ("zwnj", "\u{200c}"), ("zwj", "\u{200d}"), ("lrm", "\u{200e}"), ("rlm", "\u{200f}"),
    ("ndash", "–"), ("mdash", "—"), ("lsquo", "‘"), ("rsquo", "’"), ("sbquo", "‚"),
    ("ldquo", "“"), ("rdquo", "”"), ("bdquo", "„"), ("dagger", "†"), ("Dagger", "‡"),
    ("bull", "•"), ("hellip", "…"), ("permil", "‰"), ("prime", "′"), ("Prime", "″"),
    ("lsaquo", "‹"), ("rsaquo", "›"), ("oline", "‾"), ("frasl", "⁄"), ("euro", "€"),
    ("trade", "™"), ("larr", "←"), ("uarr", "↑"), ("rarr", "→"), ("darr", "↓"),
    ("harr", "↔"), ("lArr", "⇐"), ("rArr", "⇒"), ("hArr", "⇔"), ("minus", "−"),
    ("lowast", "∗"), ("radic", "√"), ("infin", "∞"), ("ne", "≠"), ("le", "≤"),
    ("ge", "≥"), ("asymp", "≈"), ("equiv", "≡"), ("sum", "∑"), ("prod", "∏"),
    ("part", "∂"), ("nabla", "∇"), ("isin", "∈"), ("forall", "∀"), ("exist", "∃"),
    ("empty", "∅"), ("and", "∧"), ("or", "∨"), ("cap", "∩"), ("cup", "∪"),
    ("int", "∫"), ("there4", "∴"), ("sim", "∼"), ("sub", "⊂"), ("sup", "⊃"),
    ("Alpha", "Α"), ("Beta", "Β"), ("Gamma", "Γ"), ("Delta", "Δ"), ("Theta", "Θ"),
    ("Lambda", "Λ"), ("Pi", "Π"), ("Sigma", "Σ"), ("Phi", "Φ"), ("Psi", "Ψ"),
    ("Omega", "Ω"), ("alpha", "α"), ("beta", "β"), ("gamma", "γ"), ("delta", "δ"),
    ("epsilon", "ε"), ("zeta", "ζ"), ("eta", "η"), ("theta", "θ"), ("iota", "ι"),
    ("kappa", "κ"), ("lambda", "λ"), ("mu", "μ"), ("nu", "ν"), ("xi", "ξ"),
    ("omicron", "ο"), ("pi", "π"), ("rho", "ρ"), ("sigmaf", "ς"), ("sigma", "σ"),
    ("tau", "τ"), ("upsilon", "υ"), ("phi", "φ"), ("chi", "χ"), ("psi", "ψ"),
    ("omega", "ω"), ("loz", "◊"), ("spades", "♠"), ("clubs", "♣"), ("hearts", "♥"),
    ("diams", "♦"),
];

/// ASCII stand-ins used unless the caller asked for literal Unicode.
const UNIFIABLE: &[(&str, &str)] = &[
    ("rsquo", "'"), ("lsquo", "'"), ("rdquo", "\""), ("ldquo", "\""),
    ("copy", "(C)"), ("mdash", "--"), ("nbsp", " "), ("rarr", "->"),
    ("larr", "<-"), ("middot", "*"), ("ndash", "-"), ("oelig", "oe"),
    ("aelig", "ae"), ("agrave", "a"), ("aacute", "a"), ("acirc", "a"),
    ("atilde", "a"), ("auml", "a"), ("aring", "a"), ("egrave", "e"),
    ("eacute", "e"), ("ecirc", "e"), ("euml", "e"), ("igrave", "i"),
    ("iacute", "i"), ("icirc", "i"), ("iuml", "i"), ("ograve", "o"),
    ("oacute", "o"), ("ocirc", "o"), ("otilde", "o"), ("ouml", "o"),
    ("ugrave", "u"), ("uacute", "u"), ("ucirc", "u"), ("uuml", "u"),
    ("lrm", ""), ("rlm", ""),
];

/// Windows-1252 code points browsers substitute for numeric references in the
/// C1 control range (`&#150;` is an en dash, not U+0096).
const C1_REPLACEMENTS: [char; 32] = [
    '€', '\u{81}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{8d}', 'Ž',
    '\u{8f}', '\u{90}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ',
    '\u{9d}', 'ž', 'Ÿ',
];

lazy_static! {
    static ref NAMED_MAP: HashMap<&'static str, &'static str> = NAMED.iter().copied().collect();
    static ref UNIFIABLE_MAP: HashMap<&'static str, &'static str> =
        UNIFIABLE.iter().copied().collect();
    static ref UNIFIABLE_BY_CHAR: HashMap<char, &'static str> = UNIFIABLE
        .iter()
        .filter_map(|&(name, ascii)| {
            let text = NAMED_MAP.get(name)?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some((c, ascii)),
                _ => None,
            }
        })
        .collect();
}

/// Resolve a reference body (the part between `&` and `;`) to text.
///
/// Numeric references start with `#`. With `unicode_snob` unset, characters
/// that have an ASCII approximation are replaced by it.
pub fn resolve(reference: &str, unicode_snob: bool) -> String {
    if let Some(number) = reference.strip_prefix('#') {
        return match decode_code_point(number) {
            Some(c) => {
                if !unicode_snob {
                    if let Some(ascii) = UNIFIABLE_BY_CHAR.get(&c) {
                        return (*ascii).to_string();
                    }
                }
                c.to_string()
            }
            None => "?".to_string(),
        };
    }

    if !unicode_snob {
        if let Some(ascii) = UNIFIABLE_MAP.get(reference) {
            return (*ascii).to_string();
        }
    }
    match NAMED_MAP.get(reference) {
        Some(text) => (*text).to_string(),
        None => {
            tracing::trace!(entity = reference, "unknown entity, passing through");
            format!("&{reference};")
        }
    }
}

fn decode_code_point(number: &str) -> Option<char> {
    let value = match number.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => number.parse::<u32>().ok()?,
    };
    match value {
        0 => None,
        0x80..=0x9F => Some(C1_REPLACEMENTS[(value - 0x80) as usize]),
        _ => char::from_u32(value),
    }
}

/// Find a character reference starting at `at` (which must hold `&`).
///
/// Returns the reference body and the total byte length consumed, including
/// the `&` and the optional `;`. Named references need their `;`; numeric
/// ones may omit it.
pub fn scan_reference(s: &[u8], at: usize) -> Option<(&str, usize)> {
    debug_assert_eq!(s.get(at), Some(&b'&'));
    let body_start = at + 1;
    let mut i = body_start;

    if s.get(i) == Some(&b'#') {
        i += 1;
        let hex = matches!(s.get(i), Some(b'x' | b'X'));
        if hex {
            i += 1;
        }
        let digits_start = i;
        while i < s.len() && i - digits_start < 8 {
            let is_digit = if hex {
                s[i].is_ascii_hexdigit()
            } else {
                s[i].is_ascii_digit()
            };
            if !is_digit {
                break;
            }
            i += 1;
        }
        if i == digits_start {
            return None;
        }
        let body = std::str::from_utf8(&s[body_start..i]).ok()?;
        let len = if s.get(i) == Some(&b';') { i + 1 - at } else { i - at };
        return Some((body, len));
    }

    while i < s.len() && s[i].is_ascii_alphanumeric() && i - body_start < MAX_NAME_LEN {
        i += 1;
    }
    if i == body_start || s.get(i) != Some(&b';') {
        return None;
    }
    let body = std::str::from_utf8(&s[body_start..i]).ok()?;
    Some((body, i + 1 - at))
}

/// Decode every reference in an attribute value to Unicode.
pub fn decode(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..first]);
    let mut i = first;
    while i < bytes.len() {
        if bytes[i] == b'&' {
            if let Some((body, len)) = scan_reference(bytes, i) {
                out.push_str(&resolve(body, true));
                i += len;
                continue;
            }
            out.push('&');
            i += 1;
            continue;
        }
        let next = memchr(b'&', &bytes[i..]).map_or(bytes.len(), |off| i + off);
        out.push_str(&text[i..next]);
        i = next;
    }
    Cow::Owned(out)
}
