//! Known injection vectors. Every output must be free of active content in
//! both output modes, and the known-exact cases must match byte for byte.

mod common;

use common::{policy, sanitize_whole};
use html::ConverterConfig;

const VECTORS: &[&str] = &[
    "<img src=x onerror=alert(1)>",
    "<IMG SRC=\"jav&#x09;ascript:alert(1)\">",
    "<a href=\"&#106;avascript:alert(1)\">x</a>",
    "<a href=\" javascript:alert(1)\">x</a>",
    "<a href=\"java\nscript:alert(1)\">x</a>",
    "<a href=\"vbscript:msgbox(1)\">x</a>",
    "<svg onload=alert(1)>",
    "<body onload=alert(1)>",
    "<div style=\"background:url(javascript:alert(1))\">x</div>",
    "<div style=\"background:url('javascript:alert(1)')\">x</div>",
    "<div style=\"width: expression(alert(1))\">x</div>",
    "<div style=\"-moz-binding:url(x.xml#xss)\">x</div>",
    "<div style=\"behavior: url(x.htc)\">x</div>",
    "<style>body{background:url(\"javascript:alert(1)\")}</style>",
    "<style>@import 'javascript:alert(1)';</style>",
    "<style>a{x:expression(alert(1))}</style>",
    "<style></style><script>alert(1)</script>",
    "<style>a{content:'</style><script>alert(1)</script>'}</style>",
    "<scr<script>ipt>alert(1)</scr</script>ipt>",
    "<<script>script>alert(1)<</script>/script>",
    "<!--<script>alert(1)</script>-->",
    "<iframe src=\"javascript:alert(1)\"></iframe>",
    "<object data=\"javascript:alert(1)\"></object>",
    "<embed src=\"javascript:alert(1)\">",
    "<form action=\"javascript:alert(1)\"><input type=submit></form>",
    "<math><mi xlink:href=\"javascript:alert(1)\">x</mi></math>",
    "<p title=\"&quot; onmouseover=alert(1) x=&quot;\">x</p>",
    "<p title='\" onmouseover=alert(1) x=\"'>x</p>",
    "<a href=\"//evil.example/\">x</a>",
    "<a href=\" //evil.example/\">x</a>",
    "<a href=\"&#9;//evil.example/\">x</a>",
    "<img src=\" //evil.example/x.png\">",
    "<div style=\"background:url( ' //evil.example/x.png' )\">x</div>",
    "<script\n>alert(1)</script\n>",
    "<SCRIPT SRC=//evil.example/x.js></SCRIPT>",
];

fn assert_inert(input: &str, out: &str) {
    let lower = out.to_ascii_lowercase();
    for needle in [
        "<script",
        "<iframe",
        "<object",
        "<embed",
        "<svg",
        "javascript:",
        "vbscript:",
        "expression(",
        "-moz-binding",
        "behavior",
        "onerror",
        "onload",
        "@import",
        "//evil",
    ] {
        assert!(
            !lower.contains(needle),
            "output for {input:?} contains {needle:?}: {out:?}"
        );
    }
}

#[test]
fn injection_vectors_are_neutralized() {
    for config in [ConverterConfig::default(), ConverterConfig::fragment()] {
        let policy = policy(config);
        for input in VECTORS {
            let out = sanitize_whole(&policy, input);
            assert_inert(input, &out);
        }
    }
}

#[test]
fn quoted_attribute_breakout_stays_inside_the_value() {
    let policy = policy(ConverterConfig::default());
    assert_eq!(
        sanitize_whole(&policy, "<p title='\" onmouseover=x'>t</p>"),
        "<p title=\"&quot; onmouseover=x\">t</p>"
    );
}

#[test]
fn style_element_breakout_is_escaped() {
    let policy = policy(ConverterConfig::default());
    let out = sanitize_whole(&policy, "<style>a{content:\"<b>\"}</style>");
    assert_eq!(out, "<style>a{content:\"\\3c b>\";}</style>");
}

#[test]
fn protocol_relative_urls_need_a_callback() {
    let policy = policy(ConverterConfig::default());
    assert_eq!(
        sanitize_whole(&policy, "<a href=\"//evil.example/\">x</a>"),
        "<a href=\"\">x</a>"
    );
}

#[test]
fn padded_protocol_relative_urls_need_a_callback_too() {
    let policy = policy(ConverterConfig::default());
    for href in [" //x", "&#9;//x", "&#10;\\\\x", "\t//x", " \r\n/\\x"] {
        let input = format!("<a href=\"{href}\">x</a>");
        assert_eq!(sanitize_whole(&policy, &input), "<a href=\"\">x</a>", "{href:?}");
    }
}

#[test]
fn refresh_is_removed_in_any_case() {
    let policy = policy(ConverterConfig::default());
    for value in ["refresh", "REFRESH", " Refresh ", "set-cookie"] {
        let input = format!("<meta http-equiv=\"{value}\" content=\"0\">");
        assert_eq!(sanitize_whole(&policy, &input), "<meta content=\"0\">", "{value}");
    }
}
