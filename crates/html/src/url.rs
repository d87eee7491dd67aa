//! URL classification for URL-bearing attributes and CSS `url(...)`.
//!
//! The scan looks at characters in order and stops at the first separator:
//! a path separator or query/fragment/parameter mark before any colon means
//! the value is relative, so a scheme can never be smuggled in after it.
//! The scan runs on the value as a browser resolves it: leading spaces and
//! C0 controls are skipped, and tabs and line breaks are removed throughout.

use std::borrow::Cow;

use crate::config::SanitizePolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UrlCheck {
    Safe,
    Unsafe,
    /// No separator was found; the caller decides by length.
    Inconclusive,
    /// Same-document anchor (`#name`).
    LocalHyperlink,
}

const MAX_SCHEME_LEN: usize = 32;

/// Placeholder schemes produced by trusted content converters.
const PLACEHOLDER_SCHEMES: &[&str] = &["objattph", "rtfimage"];

/// Classify `value`. `callback_requested` widens the safe set to values a
/// tag callback is expected to vet (protocol-relative URLs, drive paths,
/// placeholder schemes).
pub fn check_url(value: &str, callback_requested: bool, policy: &SanitizePolicy) -> UrlCheck {
    if value.starts_with('#') {
        return UrlCheck::LocalHyperlink;
    }
    let resolved = significant(value);
    let value = resolved.as_ref();
    let bytes = value.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'/' | b'\\' => {
                let doubled = i == 0 && matches!(bytes.get(1), Some(b'/' | b'\\'));
                if doubled && !callback_requested {
                    return UrlCheck::Unsafe;
                }
                return UrlCheck::Safe;
            }
            b'?' | b'#' | b';' => return UrlCheck::Safe,
            b':' => return check_scheme(&value[..i], &bytes[i + 1..], callback_requested, policy),
            _ => {}
        }
    }
    UrlCheck::Inconclusive
}

fn significant(value: &str) -> Cow<'_, str> {
    let trimmed = value.trim_start_matches(|c: char| c <= ' ');
    if trimmed.contains(['\t', '\n', '\r']) {
        Cow::Owned(
            trimmed
                .chars()
                .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
                .collect(),
        )
    } else {
        Cow::Borrowed(trimmed)
    }
}

fn check_scheme(
    scheme: &str,
    after: &[u8],
    callback_requested: bool,
    policy: &SanitizePolicy,
) -> UrlCheck {
    if scheme.len() > 1 && scheme.len() <= MAX_SCHEME_LEN {
        let lower = scheme.to_ascii_lowercase();
        if policy.is_safe_scheme(&lower) {
            return UrlCheck::Safe;
        }
        if callback_requested && PLACEHOLDER_SCHEMES.contains(&lower.as_str()) {
            return UrlCheck::Safe;
        }
        return UrlCheck::Unsafe;
    }
    let drive_letter = scheme.len() == 1
        && scheme.as_bytes()[0].is_ascii_alphabetic()
        && matches!(after.first(), Some(b'/' | b'\\'));
    if callback_requested && drive_letter {
        return UrlCheck::Safe;
    }
    UrlCheck::Unsafe
}

/// Final verdict for a value whose check came back `Inconclusive`.
pub fn accept_inconclusive(value: &str, truncated: bool, policy: &SanitizePolicy) -> bool {
    !truncated && value.len() <= policy.config().inconclusive_url_limit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConverterConfig;

    fn policy() -> SanitizePolicy {
        SanitizePolicy::default()
    }

    #[test]
    fn classic_cases() {
        let p = policy();
        assert_eq!(check_url("javascript:alert(1)", false, &p), UrlCheck::Unsafe);
        assert_eq!(check_url("http://example.com", false, &p), UrlCheck::Safe);
        assert_eq!(check_url("#section1", false, &p), UrlCheck::LocalHyperlink);
        assert_eq!(check_url("relative/path", false, &p), UrlCheck::Safe);
        assert_eq!(check_url("//evil.com", false, &p), UrlCheck::Unsafe);
        assert_eq!(check_url("//evil.com", true, &p), UrlCheck::Safe);
    }

    #[test]
    fn separators_before_colon_make_value_relative() {
        let p = policy();
        assert_eq!(check_url("a?javascript:x", false, &p), UrlCheck::Safe);
        assert_eq!(check_url("page;x:y", false, &p), UrlCheck::Safe);
        assert_eq!(check_url("/x", false, &p), UrlCheck::Safe);
        assert_eq!(check_url("\\\\host\\share", false, &p), UrlCheck::Unsafe);
        assert_eq!(check_url("/\\evil", false, &p), UrlCheck::Unsafe);
        assert_eq!(check_url("page.html", false, &p), UrlCheck::Inconclusive);
        assert_eq!(check_url("", false, &p), UrlCheck::Inconclusive);
    }

    #[test]
    fn scheme_lookup_is_case_insensitive_and_exact() {
        let p = policy();
        assert_eq!(check_url("HTTPS://x", false, &p), UrlCheck::Safe);
        assert_eq!(check_url("MailTo:a@b", false, &p), UrlCheck::Safe);
        assert_eq!(check_url("vbscript:x", false, &p), UrlCheck::Unsafe);
        assert_eq!(check_url("java\tscript:x", false, &p), UrlCheck::Unsafe);
        assert_eq!(check_url(" javascript:x", false, &p), UrlCheck::Unsafe);
        assert_eq!(check_url("data:text/html,x", false, &p), UrlCheck::Unsafe);
        assert_eq!(check_url(":x", false, &p), UrlCheck::Unsafe);
    }

    #[test]
    fn leading_whitespace_does_not_hide_protocol_relative_urls() {
        let p = policy();
        for value in [" //x", "\t//x", "\n\\\\x", "\u{1}//x", "  \r\n/\\x", "/\t/x"] {
            assert_eq!(check_url(value, false, &p), UrlCheck::Unsafe, "{value:?}");
            assert_eq!(check_url(value, true, &p), UrlCheck::Safe, "{value:?}");
        }
    }

    #[test]
    fn embedded_line_breaks_do_not_split_a_scheme() {
        let p = policy();
        assert_eq!(check_url("ja\nva\rscript:x", false, &p), UrlCheck::Unsafe);
        assert_eq!(check_url(" \thttps://x", false, &p), UrlCheck::Safe);
        assert_eq!(check_url(" /path", false, &p), UrlCheck::Safe);
        assert_eq!(check_url("   ", false, &p), UrlCheck::Inconclusive);
    }

    #[test]
    fn only_a_leading_hash_is_a_local_anchor() {
        let p = policy();
        assert_eq!(check_url("#top", false, &p), UrlCheck::LocalHyperlink);
        assert_eq!(check_url(" #top", false, &p), UrlCheck::Safe);
    }

    #[test]
    fn callback_widens_drive_letters_and_placeholders() {
        let p = policy();
        assert_eq!(check_url("c:\\file.txt", false, &p), UrlCheck::Unsafe);
        assert_eq!(check_url("c:\\file.txt", true, &p), UrlCheck::Safe);
        assert_eq!(check_url("c:x", true, &p), UrlCheck::Unsafe);
        assert_eq!(check_url("objattph:1", false, &p), UrlCheck::Unsafe);
        assert_eq!(check_url("rtfimage:1", true, &p), UrlCheck::Safe);
    }

    #[test]
    fn inconclusive_acceptance_is_bounded() {
        let p = ConverterConfig {
            inconclusive_url_limit: 8,
            ..ConverterConfig::default()
        }
        .build()
        .expect("valid");
        assert!(accept_inconclusive("a.html", false, &p));
        assert!(!accept_inconclusive("a.html", true, &p));
        assert!(!accept_inconclusive("abcdefghi", false, &p));
    }
}
