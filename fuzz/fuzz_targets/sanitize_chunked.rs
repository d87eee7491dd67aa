#![no_main]

use std::sync::{Arc, OnceLock};

use html::{ConverterConfig, HtmlToHtmlConverter, SanitizePolicy};
use libfuzzer_sys::fuzz_target;

fn policies() -> &'static [Arc<SanitizePolicy>; 2] {
    static POLICIES: OnceLock<[Arc<SanitizePolicy>; 2]> = OnceLock::new();
    POLICIES.get_or_init(|| {
        let build = |config: ConverterConfig| Arc::new(config.build().expect("valid config"));
        [
            build(ConverterConfig::default()),
            build(ConverterConfig::fragment()),
        ]
    })
}

fn run(policy: &Arc<SanitizePolicy>, chunks: &[&str]) -> Option<String> {
    let mut converter = HtmlToHtmlConverter::new(Arc::clone(policy));
    let mut out = String::new();
    for chunk in chunks {
        // Attribute-count overflow is a legitimate error, not a finding.
        converter.push_str(chunk).ok()?;
        out.push_str(&converter.take_output());
    }
    converter.finish().ok()?;
    out.push_str(&converter.take_output());
    Some(out)
}

/// Output with `<xmp>` contents removed; those are raw text and may hold
/// markup-looking characters verbatim.
fn outside_raw_text(lower: &str) -> String {
    let mut out = String::with_capacity(lower.len());
    let mut rest = lower;
    while let Some(open) = rest.find("<xmp") {
        out.push_str(&rest[..open]);
        rest = match rest[open..].find("</xmp") {
            Some(close) => &rest[open + close..],
            None => "",
        };
    }
    out.push_str(rest);
    out
}

// First byte picks the split stride; the rest is the document.
fuzz_target!(|data: &[u8]| {
    let Some((&stride, rest)) = data.split_first() else {
        return;
    };
    let decoded = String::from_utf8_lossy(rest);
    let input: &str = &decoded;
    let stride = usize::from(stride % 16) + 1;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < input.len() {
        let mut end = (start + stride).min(input.len());
        while !input.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(&input[start..end]);
        start = end;
    }

    for policy in policies() {
        let Some(whole) = run(policy, &[input]) else {
            continue;
        };
        let visible = outside_raw_text(&whole.to_ascii_lowercase());
        assert!(!visible.contains("<script"), "raw script tag in output: {whole:?}");
        let chunked = run(policy, &chunks).expect("chunked run failed where whole run succeeded");
        assert_eq!(chunked, whole, "chunked output differs (stride {stride})");
    }
});
