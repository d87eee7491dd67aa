//! CSS escape decoding (`\` + up to six hex digits).
//!
//! The sanitizer never rewrites escapes in its output; it decodes them only
//! to inspect what a value would mean to a browser, so the consumed length of
//! every escape has to match what a browser consumes.

const REPLACEMENT: char = '\u{FFFD}';

/// Decode a hex escape at the start of `text`.
///
/// `text` must start with `\`. Returns the decoded character and the number
/// of bytes consumed, or `None` when the backslash is not followed by a hex
/// digit. One whitespace character after the digits belongs to the escape;
/// a CR is consumed together with an immediately following LF, and a CR not
/// followed by LF is consumed alone.
pub fn attempt_unescape(text: &str) -> Option<(char, usize)> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'\\') {
        return None;
    }
    let mut pos = 1;
    let mut value: u32 = 0;
    while pos < bytes.len() && pos <= 6 && bytes[pos].is_ascii_hexdigit() {
        value = value * 16 + char::from(bytes[pos]).to_digit(16).unwrap_or(0);
        pos += 1;
    }
    if pos == 1 {
        return None;
    }
    match bytes.get(pos) {
        Some(b' ' | b'\t' | b'\n' | b'\x0c') => pos += 1,
        Some(b'\r') => {
            pos += 1;
            if bytes.get(pos) == Some(&b'\n') {
                pos += 1;
            }
        }
        _ => {}
    }
    let ch = match value {
        0 => REPLACEMENT,
        v => char::from_u32(v).unwrap_or(REPLACEMENT),
    };
    Some((ch, pos))
}

/// Canonical form of a CSS value for security screening.
///
/// Escapes are decoded, comments removed, whitespace and control characters
/// dropped, and ASCII letters lowercased. The result is never written out.
pub fn normalize_for_screening(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(ch) = rest.chars().next() {
        if ch == '\\' {
            if let Some((decoded, used)) = attempt_unescape(rest) {
                push_screened(&mut out, decoded);
                rest = &rest[used..];
                continue;
            }
            let mut tail = rest[1..].chars();
            match tail.next() {
                // Escaped newline is a line continuation.
                Some('\n' | '\r' | '\x0c') => rest = tail.as_str(),
                Some(literal) => {
                    push_screened(&mut out, literal);
                    rest = tail.as_str();
                }
                None => rest = "",
            }
            continue;
        }
        if rest.starts_with("/*") {
            rest = match rest[2..].find("*/") {
                Some(end) => &rest[2 + end + 2..],
                None => "",
            };
            continue;
        }
        push_screened(&mut out, ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

fn push_screened(out: &mut String, ch: char) {
    if ch.is_whitespace() || ch.is_control() {
        return;
    }
    out.push(ch.to_ascii_lowercase());
}
