// src/render/google.rs
//
// Heuristics for HTML exported from Google Docs, which expresses emphasis and
// list nesting through CSS instead of markup.

use std::collections::{BTreeMap, HashMap};

use crate::stack::Attributes;

/// CSS property name -> value, both lowercased and trimmed.
pub type Style = BTreeMap<String, String>;

/// Parse a declaration list: `font-weight: bold; margin-left: 36pt`.
pub fn parse_declarations(text: &str) -> Style {
    text.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_ascii_lowercase();
            (!name.is_empty() && !value.is_empty()).then_some((name, value))
        })
        .collect()
}

/// Collect class rules (`.c1 { ... }`) from a stylesheet, keyed by class name.
/// Other selectors are ignored; later rules override earlier ones.
pub fn parse_css(css: &str, classes: &mut HashMap<String, Style>) {
    for rule in css.split('}') {
        let Some((selectors, body)) = rule.split_once('{') else {
            continue;
        };
        let declarations = parse_declarations(body);
        for selector in selectors.split(',') {
            let Some(class) = selector.trim().strip_prefix('.') else {
                continue;
            };
            if class.is_empty() || class.contains([' ', ':', '.', '>']) {
                continue;
            }
            classes
                .entry(class.to_string())
                .or_default()
                .extend(declarations.clone());
        }
    }
}

/// Effective style of an element: inherited parent style, then its classes,
/// then its inline `style` attribute.
pub fn element_style(
    attrs: &Attributes,
    classes: &HashMap<String, Style>,
    parent: Option<&Style>,
) -> Style {
    let mut style = parent.cloned().unwrap_or_default();
    if let Some(class_list) = attrs.get("class") {
        for class in class_list.split_whitespace() {
            if let Some(rules) = classes.get(class) {
                style.extend(rules.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
    }
    if let Some(inline) = attrs.get("style") {
        style.extend(parse_declarations(inline));
    }
    style
}

pub fn is_bold(style: &Style) -> bool {
    match style.get("font-weight").map(String::as_str) {
        Some("bold" | "bolder") => true,
        Some(weight) => weight.parse::<u32>().is_ok_and(|w| w >= 700),
        None => false,
    }
}

pub fn is_italic(style: &Style) -> bool {
    style.get("font-style").is_some_and(|s| s == "italic")
}

pub fn is_strikethrough(style: &Style) -> bool {
    style
        .get("text-decoration")
        .is_some_and(|s| s.contains("line-through"))
}

pub fn is_fixed_width(style: &Style) -> bool {
    style.get("font-family").is_some_and(|family| {
        ["courier new", "consolas", "monospace"]
            .iter()
            .any(|fixed| family.contains(fixed))
    })
}

/// Deepest list nesting taken from a margin.
const MAX_NEST_LEVEL: usize = 16;

/// Nesting level of a list item from its left margin, in units of
/// `indent` pixels (points are treated as pixels, as Docs exports them).
pub fn list_nest_level(style: &Style, indent: usize) -> usize {
    let Some(margin) = style.get("margin-left") else {
        return 0;
    };
    let number = margin.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    match number.trim().parse::<f64>() {
        Ok(px) if px > 0.0 => ((px / indent.max(1) as f64) as usize).min(MAX_NEST_LEVEL),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_are_normalized() {
        let style = parse_declarations(" Font-Weight : BOLD ;margin-left:72pt;; broken");
        assert_eq!(style.get("font-weight").map(String::as_str), Some("bold"));
        assert_eq!(style.get("margin-left").map(String::as_str), Some("72pt"));
        assert_eq!(style.len(), 2);
    }

    #[test]
    fn class_rules_merge_with_inline_style() {
        let mut classes = HashMap::new();
        parse_css(
            ".c1{font-weight:700}.c2,.c3{font-style:italic} p.c9{color:red}",
            &mut classes,
        );
        assert!(classes.contains_key("c3"));
        assert!(!classes.contains_key("c9"));

        let mut attrs = Attributes::new();
        attrs.insert("class".to_string(), "c1 c2".to_string());
        attrs.insert("style".to_string(), "text-decoration: line-through".to_string());
        let style = element_style(&attrs, &classes, None);
        assert!(is_bold(&style));
        assert!(is_italic(&style));
        assert!(is_strikethrough(&style));
        assert!(!is_fixed_width(&style));
    }

    #[test]
    fn parent_style_is_inherited() {
        let parent = parse_declarations("font-family: 'Courier New'");
        let style = element_style(&Attributes::new(), &HashMap::new(), Some(&parent));
        assert!(is_fixed_width(&style));
    }

    #[test]
    fn nest_level_from_margin() {
        assert_eq!(list_nest_level(&parse_declarations("margin-left: 72pt"), 36), 2);
        assert_eq!(list_nest_level(&parse_declarations("margin-left: 36px"), 36), 1);
        assert_eq!(list_nest_level(&parse_declarations("margin-left: 10px"), 36), 0);
        assert_eq!(list_nest_level(&Style::new(), 36), 0);
        assert_eq!(list_nest_level(&parse_declarations("margin-left: 12px"), 0), 12);
        assert_eq!(list_nest_level(&parse_declarations("margin-left: 9e99px"), 36), 16);
    }
}
