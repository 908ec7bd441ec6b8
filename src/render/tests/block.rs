//! Block rendering: headings, paragraphs, lists, quotes, pre, tables.

use super::{render, render_with};
use crate::config::Config;
use pretty_assertions::assert_eq;

#[test]
fn headings_and_paragraphs() {
    assert_eq!(
        render("<h1>Title</h1><p>Body text</p><h3>Sub <em>head</em></h3>"),
        "# Title\n\nBody text\n\n### Sub *head*"
    );
}

#[test]
fn headings_are_never_wrapped() {
    let config = Config {
        body_width: 10,
        ..Config::default()
    };
    assert_eq!(
        render_with("<h2>a heading<br>that is long</h2><p>wrap this text now</p>", &config),
        "## a heading that is long\n\nwrap this\ntext now"
    );
}

#[test]
fn unmatched_end_tags_are_ignored() {
    assert_eq!(render("<p>a</b>b</p>"), "ab");
}

#[test]
fn paragraphs_close_implicitly() {
    assert_eq!(render("<p>one<p>two"), "one\n\ntwo");
    assert_eq!(render("<p>one<div>two</div>"), "one\n\ntwo");
}

#[test]
fn divs_are_separated_by_line_breaks() {
    assert_eq!(render("<div>a</div><div>b</div>"), "a\nb");
}

#[test]
fn tolerant_and_strict_stacks() {
    let html = "<div><p>a</div>b";
    assert_eq!(render(html), "a\nb");
    let config = Config {
        strict_tags: true,
        ..Config::default()
    };
    assert_eq!(render_with(html, &config), "ab");
}

#[test]
fn unordered_list() {
    let html = "<ul><li>one</li><li>two</li></ul>";
    assert_eq!(render(html), "* one\n* two");
    let config = Config {
        dash_unordered_list: true,
        ..Config::default()
    };
    assert_eq!(render_with(html, &config), "- one\n- two");
}

#[test]
fn ordered_list_honours_start() {
    assert_eq!(render("<ol start=\"3\"><li>a<li>b</ol>"), "3. a\n4. b");
    assert_eq!(render("<ol><li>a</li></ol><ol><li>b</li></ol>"), "1. a\n\n1. b");
}

#[test]
fn nested_lists_indent_by_list_indent() {
    let html = "<ul><li>a<ul><li>b<ol><li>c</li></ol></li></ul></li><li>d</li></ul>";
    assert_eq!(render(html), "* a\n  * b\n    1. c\n* d");
    let config = Config {
        list_indent: 4,
        ..Config::default()
    };
    assert_eq!(render_with(html, &config), "* a\n    * b\n        1. c\n* d");
}

#[test]
fn lists_are_set_off_by_blank_lines() {
    assert_eq!(
        render("<p>x</p><ul><li>a</li></ul><p>y</p>"),
        "x\n\n* a\n\ny"
    );
}

#[test]
fn paragraphs_inside_items() {
    assert_eq!(
        render("<ul><li><p>a</p><p>more</p></li><li><p>b</p></li></ul>"),
        "* a\n\n  more\n* b"
    );
}

#[test]
fn item_continuation_lines_align_with_text() {
    let config = Config {
        body_width: 13,
        ..Config::default()
    };
    assert_eq!(
        render_with("<ol><li>alpha beta gamma</li></ol>", &config),
        "1. alpha beta\n   gamma"
    );
}

#[test]
fn blockquotes_prefix_every_line() {
    assert_eq!(
        render("<blockquote><p>a</p><p>b</p></blockquote>"),
        "> a\n>\n> b"
    );
    assert_eq!(
        render("<blockquote>a<blockquote>b</blockquote>c</blockquote><p>d</p>"),
        "> a\n>\n> > b\n>\n> c\n\nd"
    );
}

#[test]
fn list_inside_blockquote() {
    assert_eq!(
        render("<blockquote><ul><li>a</li><li>b</li></ul></blockquote>"),
        "> * a\n> * b"
    );
}

#[test]
fn pre_is_verbatim_and_unwrapped() {
    let config = Config {
        body_width: 10,
        ..Config::default()
    };
    let html = "<p>before</p><pre>\n  line one is long\n    indented &lt;x&gt;\n</pre>";
    assert_eq!(
        render_with(html, &config),
        "before\n\n```\n  line one is long\n    indented <x>\n```"
    );
}

#[test]
fn pre_language_and_indented_form() {
    let html = "<pre><code class=\"language-rust\">fn main() {}</code></pre>";
    assert_eq!(render(html), "```rust\nfn main() {}\n```");
    let config = Config {
        indented_code: true,
        ..Config::default()
    };
    assert_eq!(render_with("<pre>a\n\nb</pre>", &config), "    a\n\n    b");
}

#[test]
fn pre_keeps_markup_inside_as_text() {
    assert_eq!(render("<pre>a <b>b</b><br>c</pre>"), "```\na b\nc\n```");
}

#[test]
fn horizontal_rule() {
    assert_eq!(render("<p>a</p><hr><p>b</p>"), "a\n\n* * *\n\nb");
}

#[test]
fn simple_table() {
    assert_eq!(
        render("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>"),
        "| a | b |\n| --- | --- |\n| c | d |"
    );
}

#[test]
fn table_rows_are_padded() {
    assert_eq!(
        render("<table><tr><th>h1</th><th>h2</th></tr><tr><td>x</td></tr></table>"),
        "| h1 | h2 |\n| --- | --- |\n| x |  |"
    );
}

#[test]
fn table_cells_close_implicitly() {
    assert_eq!(
        render("<table><tr><td>a<td>b<tr><td>c</table><p>after</p>"),
        "| a | b |\n| --- | --- |\n| c |  |\n\nafter"
    );
}

#[test]
fn table_cells_escape_pipes_and_flatten_breaks() {
    assert_eq!(
        render("<table><tr><td>a|b</td><td>c<br>d<p>e</p></td></tr></table>"),
        "| a\\|b | c d e |\n| --- | --- |"
    );
}

#[test]
fn nested_tables_render_inline() {
    assert_eq!(
        render("<table><tr><td>a<table><tr><td>b</td><td>c</td></tr></table></td></tr></table>"),
        "| a b c |\n| --- |"
    );
}

#[test]
fn scripts_styles_and_titles_are_dropped() {
    assert_eq!(
        render("<head><title>T</title><style>p{}</style></head><body><p>a<script>var x = \"<p>\";</script>b</p></body>"),
        "ab"
    );
}

#[test]
fn comments_are_skipped() {
    assert_eq!(render("<p>a<!-- <b>x</b> -->b</p>"), "ab");
}

#[test]
fn text_before_a_block_keeps_the_outer_prefixes() {
    assert_eq!(
        render("<div>outside<blockquote>in</blockquote></div>"),
        "outside\n\n> in"
    );
    assert_eq!(
        render("<blockquote>a<blockquote>b</blockquote></blockquote>"),
        "> a\n>\n> > b"
    );
}

#[test]
fn item_opening_with_a_nested_list_keeps_its_marker() {
    assert_eq!(
        render("<ul><li><ul><li>b</li></ul></li><li>c</li></ul>"),
        "* * b\n* c"
    );
}

#[test]
fn emphasis_around_blocks_is_balanced_per_block() {
    assert_eq!(
        render("<p>x</p><em><div>alpha</div></em><p>y</p>"),
        "x\n\n*alpha*\n\ny"
    );
    assert_eq!(render("<b><p>a</p><p>b</p></b>"), "**a**\n\n**b**");
}

#[test]
fn emphasis_left_open_does_not_span_cells() {
    assert_eq!(
        render("<table><tr><td><b>a</td><td>b</b></td></tr></table>"),
        "| **a** | **b** |\n| --- | --- |"
    );
}
