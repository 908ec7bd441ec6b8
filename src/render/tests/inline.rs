//! Inline rendering: emphasis, code, links, images, breaks and text.

use super::{render, render_with};
use crate::config::Config;
use pretty_assertions::assert_eq;

#[test]
fn strong_and_emphasis() {
    assert_eq!(render("<strong>x</strong>"), "**x**");
    assert_eq!(render("<b>x</b>"), "**x**");
    assert_eq!(render("<em>x</em>"), "*x*");
    assert_eq!(render("<i>x</i>"), "*x*");
    assert_eq!(render("<strong><em>x</em></strong>"), "***x***");
}

#[test]
fn nested_identical_emphasis_emits_outer_markers_only() {
    assert_eq!(render("<b>a <b>b</b> c</b>"), "**a b c**");
}

#[test]
fn adjacent_identical_runs_collapse() {
    assert_eq!(render("<b>a</b><b>b</b>"), "**ab**");
    assert_eq!(render("<b>a</b> <b>b</b>"), "**a** **b**");
}

#[test]
fn spaces_move_outside_markers() {
    assert_eq!(render("a<b> x </b>y"), "a **x** y");
    assert_eq!(render("<p><em> lead</em></p>"), "*lead*");
}

#[test]
fn empty_emphasis_disappears() {
    assert_eq!(render("<p>a<b></b>c</p>"), "ac");
    assert_eq!(render("<p>a<b><i></i></b>c</p>"), "ac");
}

#[test]
fn ignore_emphasis_keeps_text() {
    let config = Config {
        ignore_emphasis: true,
        ..Config::default()
    };
    assert_eq!(render_with("<b>x</b> <i>y</i> <code>z</code>", &config), "x y `z`");
}

#[test]
fn strikethrough_shown_or_hidden() {
    assert_eq!(render("<del>gone</del> kept"), "~~gone~~ kept");
    let config = Config {
        hide_strikethrough: true,
        ..Config::default()
    };
    assert_eq!(render_with("<p><s>gone <b>too</b></s> kept</p>", &config), "kept");
}

#[test]
fn code_spans_are_not_escaped() {
    let config = Config {
        escape_snob: true,
        ..Config::default()
    };
    assert_eq!(
        render_with("<p>a*b_c <code>x*y</code></p>", &config),
        "a\\*b\\_c `x*y`"
    );
    assert_eq!(render("<p>a*b <kbd>Ctrl</kbd></p>"), "a*b `Ctrl`");
}

#[test]
fn whitespace_collapses() {
    assert_eq!(render("<p>  a \n\t b  </p>"), "a b");
}

#[test]
fn entities_resolve_to_ascii_or_unicode() {
    let html = "<p>a &amp; b &mdash; c&nbsp;d &bogus; AT&T</p>";
    assert_eq!(render(html), "a & b -- c d &bogus; AT&T");
    let config = Config {
        unicode_snob: true,
        ..Config::default()
    };
    assert_eq!(
        render_with(html, &config),
        "a & b \u{2014} c\u{a0}d &bogus; AT&T"
    );
}

#[test]
fn line_breaks() {
    assert_eq!(render("<p>a<br>b</p>"), "a  \nb");
    assert_eq!(render("<p><br>a<br><br>b<br></p>"), "a  \nb");
}

#[test]
fn inline_quotes() {
    assert_eq!(render("<p>say <q>hi</q></p>"), "say \"hi\"");
}

#[test]
fn inline_links() {
    assert_eq!(render("<a href=\"http://x\">text</a>"), "[text](http://x)");
    assert_eq!(
        render("<a href=\"/a\" title=\"The &quot;A&quot;\">t</a>"),
        "[t](/a \"The \\\"A\\\"\")"
    );
    assert_eq!(
        render("<a href=\"http://x.org/\">http://x.org/</a>"),
        "<http://x.org/>"
    );
    assert_eq!(render("see <a href=\"/x\"> here </a>now"), "see [here](/x) now");
}

#[test]
fn ignore_links_keeps_text_only() {
    let config = Config {
        ignore_links: true,
        ..Config::default()
    };
    assert_eq!(render_with("<a href=\"http://x\">text</a>", &config), "text");
}

#[test]
fn links_without_target_are_plain_text() {
    assert_eq!(render("<a>x</a> <a href=\"\">y</a>"), "x y");
}

#[test]
fn nested_anchors_never_nest_link_syntax() {
    assert_eq!(
        render("<a href=\"/1\">a<a href=\"/2\">b</a>c</a>"),
        "[abc](/1)"
    );
}

#[test]
fn internal_links_to_seen_anchors_are_skipped() {
    let html = "<h2 id=\"s\">S</h2><p><a href=\"#s\">go</a> <a href=\"#later\">on</a></p>";
    assert_eq!(render(html), "## S\n\ngo [on](#later)");
    let config = Config {
        skip_internal_links: false,
        ..Config::default()
    };
    assert_eq!(render_with(html, &config), "## S\n\n[go](#s) [on](#later)");
}

#[test]
fn relative_urls_resolve_against_base() {
    let config = Config {
        base_url: Some("http://example.com/dir/".to_string()),
        ..Config::default()
    };
    assert_eq!(
        render_with("<a href=\"page.html\">p</a> <a href=\"https://o.org/x\">o</a>", &config),
        "[p](http://example.com/dir/page.html) [o](https://o.org/x)"
    );
    assert_eq!(
        render("<base href=\"http://e.com/x/\"><a href=\"y\">y</a>"),
        "[y](http://e.com/x/y)"
    );
}

#[test]
fn reference_links_are_numbered_once() {
    let config = Config {
        inline_links: false,
        ..Config::default()
    };
    let html = "<p><a href=\"http://a\">one</a> and <a href=\"http://b\">two</a></p>\
                <p><a href=\"http://a\">again</a></p>";
    assert_eq!(
        render_with(html, &config),
        "[one][1] and [two][2]\n\n[again][1]\n\n   [1]: http://a\n   [2]: http://b"
    );
}

#[test]
fn reference_definitions_after_each_paragraph() {
    let config = Config {
        inline_links: false,
        links_each_paragraph: true,
        ..Config::default()
    };
    assert_eq!(
        render_with("<p><a href=\"http://a\">one</a></p><p>two</p>", &config),
        "[one][1]\n\n   [1]: http://a\n\ntwo"
    );
}

#[test]
fn images() {
    assert_eq!(
        render("<img src=\"/i.png\" alt=\"An  image\" title=\"T\">"),
        "![An image](/i.png \"T\")"
    );
    assert_eq!(
        render("<a href=\"/big\"><img src=\"/small\" alt=\"pic\"></a>"),
        "[![pic](/small)](/big)"
    );
    let config = Config {
        ignore_images: true,
        ..Config::default()
    };
    assert_eq!(
        render_with("<p>a <img src=\"/i.png\" alt=\"An image\"> b</p>", &config),
        "a An image b"
    );
}

#[test]
fn links_around_blocks_wrap_each_block() {
    assert_eq!(
        render("<a href=\"http://x\"><div>text</div></a>"),
        "[text](http://x)"
    );
    assert_eq!(
        render("<a href=\"/x\"><div>one</div><div>two</div></a>"),
        "[one](/x)\n[two](/x)"
    );
    assert_eq!(
        render("<b><a href=\"/x\"><div>y</div></a></b>"),
        "**[y](/x)**"
    );
}

#[test]
fn code_spans_outgrow_backticks_in_their_content() {
    assert_eq!(render("<p><code>a`b</code></p>"), "``a`b``");
    assert_eq!(render("<p><code>`x</code></p>"), "`` `x ``");
    assert_eq!(render("<p><code>a</code><code>b</code></p>"), "`ab`");
}

#[test]
fn adjacent_different_runs_use_distinct_delimiters() {
    assert_eq!(render("<b>a</b><i>b</i>"), "**a**_b_");
    assert_eq!(render("<i>a</i><b>b</b>"), "*a*__b__");
}
