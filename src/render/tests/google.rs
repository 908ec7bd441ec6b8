//! Google Docs exports: emphasis and list nesting expressed through CSS.

use super::render_with;
use crate::config::Config;
use pretty_assertions::assert_eq;

fn google() -> Config {
    Config {
        google_doc: true,
        ..Config::default()
    }
}

#[test]
fn class_styles_become_emphasis() {
    let html = "<style>.c1{font-weight:700}.c2{font-style:italic}.c3{font-family:\"Courier New\"}</style>\
                <p><span class=\"c1\">bold</span> <span class=\"c2\">it</span> <span class=\"c3\">mono</span></p>";
    assert_eq!(render_with(html, &google()), "**bold** *it* `mono`");
}

#[test]
fn inherited_style_does_not_reopen_markers() {
    let html = "<p><span style=\"font-weight:bold\">a <span style=\"font-weight:bold\">b</span></span></p>";
    assert_eq!(render_with(html, &google()), "**a b**");
}

#[test]
fn styles_are_ignored_outside_google_mode() {
    let html = "<p><span style=\"font-weight:bold\">a</span></p>";
    assert_eq!(render_with(html, &Config::default()), "a");
}

#[test]
fn line_through_can_be_hidden() {
    let html = "<p><span style=\"text-decoration:line-through\">x</span>y</p>";
    assert_eq!(render_with(html, &google()), "~~x~~y");
    let config = Config {
        hide_strikethrough: true,
        ..google()
    };
    assert_eq!(render_with(html, &config), "y");
}

#[test]
fn list_nesting_from_margins() {
    let html = "<ul><li style=\"margin-left:36pt\">a</li></ul>\
                <ul><li style=\"margin-left:72pt\">b</li></ul>\
                <ul><li style=\"margin-left:36pt\">c</li></ul>";
    assert_eq!(render_with(html, &google()), "* a\n  * b\n* c");
}

#[test]
fn list_nesting_uses_google_list_indent() {
    let html = "<ul style=\"margin-left:40px\"><li>a</li></ul><ul style=\"margin-left:80px\"><li>b</li></ul>";
    let config = Config {
        google_list_indent: 40,
        ..google()
    };
    assert_eq!(render_with(html, &config), "* a\n  * b");
}
