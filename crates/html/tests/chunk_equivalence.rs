//! Output must not depend on where the input was split.

mod common;

use std::sync::Arc;

use common::{
    policy, policy_from_toml, sanitize_fixtures, sanitize_whole, sanitize_with_plan,
};
use html::{ConverterConfig, SanitizePolicy};
use html_test_support::{
    BoundaryPolicy, build_chunk_plans, diff_markup, escape_text, fuzz_seed,
    shrink_chunk_plan_with_stats,
};

const FUZZ_RUNS: usize = 16;

fn assert_chunk_equivalence(name: &str, policy: &Arc<SanitizePolicy>, input: &str) {
    let expected = sanitize_whole(policy, input);
    let seed = fuzz_seed();
    for boundary in [BoundaryPolicy::Utf8Aligned, BoundaryPolicy::ByteStream] {
        for case in build_chunk_plans(input, FUZZ_RUNS, seed, boundary) {
            let actual = sanitize_with_plan(policy, input, &case.plan);
            if actual == expected {
                continue;
            }
            let (minimal, stats) = shrink_chunk_plan_with_stats(input, &case.plan, |plan| {
                sanitize_with_plan(policy, input, plan) != expected
            });
            let minimal_out = sanitize_with_plan(policy, input, &minimal);
            panic!(
                "chunked output differs for '{name}' [{}]\nplan: {}\nminimal plan: {minimal} \
                 ({} -> {} cuts, {} checks)\ninput: \"{}\"\n{}",
                case.label,
                case.plan,
                stats.original_cuts,
                stats.minimized_cuts,
                stats.checks,
                escape_text(input),
                diff_markup(&expected, &minimal_out)
            );
        }
    }
}

#[test]
fn fixtures_are_chunk_invariant() {
    for case in sanitize_fixtures() {
        let policy = policy_from_toml(&case.config, &case.name);
        assert_chunk_equivalence(&case.name, &policy, &case.input);
    }
}

const DOCUMENT: &str = "<!DOCTYPE html>\n<html lang=en><head>\
    <meta charset=\"utf-8\"><meta http-equiv=refresh content=\"1;url=/next\">\
    <title>Caf\u{e9} &amp; cr\u{e8}me</title>\
    <style type=\"text/css\">\n  body { margin: 0 } .note, #main > p { color: #333; background: url(bg.png) }\n\
    @font-face { font-family: x } p:first-line{font-weight:bold}</style>\
    <script type=\"text/javascript\">if (a < b && c > d) { document.write('<b>') }</script>\
    </head>\n<body bgcolor=\"#fafafa\" onload=\"init()\">\
    <div id=\"main\" class=\"note wide\" style=\"position: relative; margin-left: -4px; color: navy\">\
    <p>Line one &mdash; \u{1F600} emoji &#x263A; and &#9731;</p>\
    <a href=\"https://example.com/\u{e4}?q=1&amp;r=2#frag\">link</a> \
    <a href=\"#main\">anchor</a> <a href=\"JaVaScRiPt:evil()\">bad</a>\
    <img src=\"img/\u{65e5}\u{672c}.png\" alt='single &apos;quoted&apos;' width=10 height=\"20\">\
    <table><tr><td bgcolor=red>cell</td><td headers=\"a b\">two</td></tr></table>\
    <form action=\"/post\"><input name=q value=\"a&quot;b\"><textarea>x &lt; y</textarea></form>\
    <ul><li>one<li>two</ul><pre>  keep   spacing\n</pre>\
    <iframe src=\"https://example.com\">nested <b>content</b></iframe>\
    <marquee>rolling</marquee><!-- comment <script> --><![CDATA[ data ]]>\
    </div></body></html>";

#[test]
fn document_is_chunk_invariant_in_both_modes() {
    for config in [ConverterConfig::default(), ConverterConfig::fragment()] {
        let label = format!("document {:?}", config.output_mode);
        assert_chunk_equivalence(&label, &policy(config), DOCUMENT);
    }
}

#[test]
fn unterminated_constructs_are_chunk_invariant() {
    let inputs = [
        "<p title=\"never closed",
        "<style>a{color:red",
        "<script>alert(1)",
        "text <",
        "<a href='x",
        "&am",
        "<!-- open comment",
        "<textarea>abc",
    ];
    for config in [ConverterConfig::default(), ConverterConfig::fragment()] {
        let policy = policy(config);
        for input in inputs {
            assert_chunk_equivalence(input, &policy, input);
        }
    }
}

#[test]
fn tiny_limits_are_chunk_invariant() {
    let config = ConverterConfig {
        max_attribute_size: 8,
        max_css_property_size: 8,
        small_css_block_threshold: Some(20),
        max_line_length: Some(16),
        ..ConverterConfig::fragment()
    };
    let input = "<p title=\"0123456789abcdef\" style=\"color:red;background-color:blue\" \
                 class=\"alpha beta gamma\">\u{e9}\u{e9}\u{e9} text that wraps</p>\
                 <style>.a{color:red} .b{color:green} .c{color:blue}</style>";
    assert_chunk_equivalence("tiny limits", &policy(config), input);
}
