//! Test helpers shared by the sanitizer crates: chunk plans, plan shrinking,
//! output diffs and TOML fixtures.

pub mod chunks;
pub mod fixtures;

pub use chunks::{
    BoundaryPolicy, ChunkPlan, ChunkPlanCase, ShrinkStats, build_chunk_plans, fuzz_seed,
    shrink_chunk_plan, shrink_chunk_plan_with_stats,
};
pub use fixtures::{SanitizeFixture, load_fixtures, parse_fixtures};

use std::fmt::Write;

/// Escape control characters and quotes so a value prints on one line.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch.is_control() => {
                let _ = write!(out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Split serialized HTML after every `>` so a diff reads one tag per line.
pub fn markup_lines(html: &str) -> Vec<String> {
    html.split_inclusive('>').map(escape_text).collect()
}

/// Human-readable report of the first difference between two outputs.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    const MISSING: &str = "<missing>";
    let max = expected.len().max(actual.len());
    let line = |lines: &'_ [String], i: usize| -> String {
        lines.get(i).cloned().unwrap_or_else(|| MISSING.to_string())
    };
    let mut out = String::new();
    let first = (0..max).find(|&i| expected.get(i) != actual.get(i));
    if let Some(i) = first {
        let start = i.saturating_sub(2);
        let end = (i + 3).min(max);
        let _ = writeln!(out, "first mismatch at line {}:", i + 1);
        for idx in start..end {
            let marker = if idx == i { ">" } else { " " };
            let _ = writeln!(out, "{marker} {:>4}  expected: {}", idx + 1, line(expected, idx));
            let _ = writeln!(out, "{marker} {:>4}    actual: {}", idx + 1, line(actual, idx));
        }
    }
    let _ = writeln!(
        out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}

/// [`diff_lines`] over two serialized outputs.
pub fn diff_markup(expected: &str, actual: &str) -> String {
    diff_lines(&markup_lines(expected), &markup_lines(actual))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_lines_split_after_tags() {
        assert_eq!(
            markup_lines("<p>a\n</p>b"),
            vec!["<p>".to_string(), "a\\n</p>".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn diff_points_at_first_mismatch() {
        let report = diff_markup("<p>a</p><b>x</b>", "<p>a</p><i>x</i>");
        assert!(report.contains("first mismatch at line 3"), "{report}");
        assert!(report.contains("expected: <b>"), "{report}");
        assert!(report.contains("actual: <i>"), "{report}");
    }

    #[test]
    fn diff_of_equal_outputs_only_counts() {
        let report = diff_markup("<p>", "<p>");
        assert_eq!(report, "expected 1 lines, actual 1 lines\n");
    }
}
