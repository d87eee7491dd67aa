//! Golden sanitizer fixtures stored as TOML.
//!
//! ```toml
//! [[case]]
//! name = "script dropped"
//! config = "output_mode = \"fragment\""
//! input = "<script>x</script>ok"
//! expected = "ok"
//! ```

use std::path::Path;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SanitizeFixture {
    pub name: String,
    /// Converter configuration as a TOML document; empty for defaults.
    #[serde(default)]
    pub config: String,
    pub input: String,
    pub expected: String,
    /// Skip the output-is-a-fixed-point check for this case.
    #[serde(default)]
    pub not_idempotent: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureFile {
    #[serde(default)]
    case: Vec<SanitizeFixture>,
}

pub fn parse_fixtures(text: &str) -> Result<Vec<SanitizeFixture>, toml::de::Error> {
    let file: FixtureFile = toml::from_str(text)?;
    Ok(file.case)
}

/// Load a fixture file, panicking with the path on any failure.
pub fn load_fixtures(path: &Path) -> Vec<SanitizeFixture> {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
    let cases = parse_fixtures(&text)
        .unwrap_or_else(|err| panic!("failed to parse {}: {err}", path.display()));
    let mut names = std::collections::HashSet::new();
    for case in &cases {
        assert!(
            names.insert(case.name.as_str()),
            "duplicate fixture name {:?} in {}",
            case.name,
            path.display()
        );
    }
    cases
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cases_with_defaults() {
        let cases = parse_fixtures(
            r#"
            [[case]]
            name = "a"
            input = "<b>x</b>"
            expected = "<b>x</b>"

            [[case]]
            name = "b"
            config = "filter_html = false"
            input = "y"
            expected = "y"
            not_idempotent = true
            "#,
        )
        .expect("valid fixtures");
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].config, "");
        assert!(!cases[0].not_idempotent);
        assert_eq!(cases[1].config, "filter_html = false");
        assert!(cases[1].not_idempotent);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_fixtures("[[case]]\nname='a'\ninput=''\nexpected=''\nextra=1").is_err());
    }
}
