//! Converter configuration and the immutable policy built from it.
//!
//! `ConverterConfig` is the serde-facing surface (TOML). `SanitizePolicy` is
//! the validated form handed to converters; it is never mutated after
//! construction and is shared through `Arc`.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::filter::OutputMode;

pub const DEFAULT_SAFE_SCHEMES: &[&str] = &[
    "http", "https", "ftp", "file", "mailto", "news", "gopher", "about", "wais", "cid", "mhtml",
    "ipp", "msdaipp", "meet", "tel", "sip", "sips", "im", "conf", "callto", "notes", "onenote",
    "groove", "mms",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeListMode {
    /// Extend the built-in scheme list.
    #[default]
    Add,
    /// Replace the built-in scheme list.
    Override,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UrlSchemeConfig {
    pub mode: SchemeListMode,
    pub schemes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    pub output_mode: OutputMode,
    /// When false every tag and attribute is kept; output is only normalized.
    pub filter_html: bool,
    pub preserve_display_none: bool,
    /// Cap attribute values handed to the tag callback at `max_attribute_size`.
    pub truncate_for_callback: bool,
    /// Style element text beyond this many bytes is dropped.
    pub small_css_block_threshold: Option<usize>,
    pub max_attribute_size: usize,
    pub max_css_property_size: usize,
    /// Prefix applied to ids, names, classes and local anchors in fragment mode.
    pub name_prefix: String,
    pub max_line_length: Option<usize>,
    pub escape_non_ascii: bool,
    /// Longest scheme-less URL accepted when no separator is found.
    pub inconclusive_url_limit: usize,
    pub url_schemes: UrlSchemeConfig,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            output_mode: OutputMode::Document,
            filter_html: true,
            preserve_display_none: false,
            truncate_for_callback: true,
            small_css_block_threshold: None,
            max_attribute_size: 4096,
            max_css_property_size: 4096,
            name_prefix: "x_".to_string(),
            max_line_length: None,
            escape_non_ascii: false,
            inconclusive_url_limit: 256,
            url_schemes: UrlSchemeConfig::default(),
        }
    }
}

impl ConverterConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn fragment() -> Self {
        Self {
            output_mode: OutputMode::Fragment,
            ..Self::default()
        }
    }

    /// Validate and freeze into a policy.
    pub fn build(self) -> Result<SanitizePolicy, ConfigError> {
        if self.max_attribute_size == 0 {
            return Err(ConfigError::InvalidLimit("max_attribute_size"));
        }
        if self.max_css_property_size == 0 {
            return Err(ConfigError::InvalidLimit("max_css_property_size"));
        }
        if self.max_line_length == Some(0) {
            return Err(ConfigError::InvalidLimit("max_line_length"));
        }
        if !is_valid_prefix(&self.name_prefix) {
            return Err(ConfigError::InvalidPrefix(self.name_prefix));
        }

        let mut schemes: HashSet<String> = match self.url_schemes.mode {
            SchemeListMode::Add => DEFAULT_SAFE_SCHEMES.iter().map(|s| s.to_string()).collect(),
            SchemeListMode::Override => HashSet::new(),
        };
        for scheme in &self.url_schemes.schemes {
            if !is_valid_scheme(scheme) {
                return Err(ConfigError::InvalidScheme(scheme.clone()));
            }
            schemes.insert(scheme.to_ascii_lowercase());
        }

        log::debug!(
            target: "html.config",
            "policy built: mode={:?} schemes={} filter_html={}",
            self.output_mode,
            schemes.len(),
            self.filter_html
        );
        Ok(SanitizePolicy {
            config: self,
            safe_schemes: schemes,
        })
    }
}

fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Validated, immutable sanitizing policy.
#[derive(Clone, Debug)]
pub struct SanitizePolicy {
    config: ConverterConfig,
    safe_schemes: HashSet<String>,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self {
            config: ConverterConfig::default(),
            safe_schemes: DEFAULT_SAFE_SCHEMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SanitizePolicy {
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn output_mode(&self) -> OutputMode {
        self.config.output_mode
    }

    pub fn is_fragment(&self) -> bool {
        self.config.output_mode == OutputMode::Fragment
    }

    pub fn name_prefix(&self) -> &str {
        &self.config.name_prefix
    }

    /// `scheme` must already be lowercase.
    pub fn is_safe_scheme(&self, scheme: &str) -> bool {
        self.safe_schemes.contains(scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let policy = ConverterConfig::default().build().expect("default config is valid");
        assert!(policy.is_safe_scheme("https"));
        assert!(!policy.is_safe_scheme("javascript"));
        assert_eq!(policy.config().max_attribute_size, 4096);
        assert_eq!(policy.config().inconclusive_url_limit, 256);
        assert_eq!(policy.name_prefix(), "x_");
        assert!(!policy.is_fragment());
    }

    #[test]
    fn toml_overrides_schemes() {
        let config = ConverterConfig::from_toml_str(
            r#"
            output_mode = "fragment"
            small_css_block_threshold = 1024

            [url_schemes]
            mode = "override"
            schemes = ["HTTPS", "data"]
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.output_mode, OutputMode::Fragment);
        assert_eq!(config.small_css_block_threshold, Some(1024));
        let policy = config.build().expect("valid policy");
        assert!(policy.is_safe_scheme("https"));
        assert!(policy.is_safe_scheme("data"));
        assert!(!policy.is_safe_scheme("http"));
    }

    #[test]
    fn unknown_keys_and_bad_values_are_rejected() {
        assert!(matches!(
            ConverterConfig::from_toml_str("bogus = 1"),
            Err(ConfigError::Toml(_))
        ));
        let bad_scheme = ConverterConfig {
            url_schemes: UrlSchemeConfig {
                mode: SchemeListMode::Add,
                schemes: vec!["java script".to_string()],
            },
            ..ConverterConfig::default()
        };
        assert!(matches!(bad_scheme.build(), Err(ConfigError::InvalidScheme(_))));
        let bad_prefix = ConverterConfig {
            name_prefix: "1x".to_string(),
            ..ConverterConfig::default()
        };
        assert!(matches!(bad_prefix.build(), Err(ConfigError::InvalidPrefix(_))));
        let zero = ConverterConfig {
            max_attribute_size: 0,
            ..ConverterConfig::default()
        };
        assert!(matches!(zero.build(), Err(ConfigError::InvalidLimit(_))));
    }
}
