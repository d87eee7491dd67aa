#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use html::{ConverterConfig, HtmlToHtmlConverter, SanitizePolicy};
use html_test_support::{ChunkPlan, SanitizeFixture, load_fixtures};
use tools::Utf8ChunkDecoder;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn sanitize_fixtures() -> Vec<SanitizeFixture> {
    let path = fixture_path("sanitize.toml");
    let cases = load_fixtures(&path);
    assert!(!cases.is_empty(), "no cases in {}", path.display());
    cases
}

pub fn policy_from_toml(config: &str, case: &str) -> Arc<SanitizePolicy> {
    let config = ConverterConfig::from_toml_str(config)
        .unwrap_or_else(|err| panic!("bad config for '{case}': {err}"));
    Arc::new(
        config
            .build()
            .unwrap_or_else(|err| panic!("invalid policy for '{case}': {err}")),
    )
}

pub fn policy(config: ConverterConfig) -> Arc<SanitizePolicy> {
    Arc::new(config.build().expect("valid config"))
}

/// Sanitize text pushed chunk by chunk, draining output after every push.
pub fn sanitize_str_chunks<'a>(
    policy: &Arc<SanitizePolicy>,
    chunks: impl IntoIterator<Item = &'a str>,
) -> String {
    let mut converter = HtmlToHtmlConverter::new(Arc::clone(policy));
    let mut out = String::new();
    for chunk in chunks {
        converter.push_str(chunk).expect("push_str failed");
        out.push_str(&converter.take_output());
    }
    converter.finish().expect("finish failed");
    out.push_str(&converter.take_output());
    out
}

pub fn sanitize_whole(policy: &Arc<SanitizePolicy>, input: &str) -> String {
    sanitize_str_chunks(policy, [input])
}

/// Sanitize `input` split by `plan`. Byte-stream plans go through a UTF-8
/// chunk decoder the way a reader over a file would.
pub fn sanitize_with_plan(policy: &Arc<SanitizePolicy>, input: &str, plan: &ChunkPlan) -> String {
    let mut converter = HtmlToHtmlConverter::new(Arc::clone(policy));
    let mut decoder = Utf8ChunkDecoder::new();
    let mut out = String::new();
    let mut text = String::new();
    plan.for_each_chunk(input, |bytes| {
        text.clear();
        decoder.decode(bytes, &mut text);
        converter.push_str(&text).expect("push_str failed");
        out.push_str(&converter.take_output());
    });
    text.clear();
    decoder.finish(&mut text);
    converter.push_str(&text).expect("push_str failed");
    converter.finish().expect("finish failed");
    out.push_str(&converter.take_output());
    out
}
