/// Fatal tokenizer conditions. Malformed markup is never an error; only a
/// structurally abnormal document is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("tag has more than {limit} attributes")]
    TooManyAttributes { limit: usize },
}

/// Conversion failures. Policy outcomes (dropped tags, emptied URLs) are not
/// errors and never show up here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("attribute index overflow: more than {limit} attributes in one tag")]
    TooManyAttributes { limit: usize },

    #[error("tokenizer failed: {0}")]
    Parse(#[from] ParseError),
}

/// Errors building a [`crate::SanitizePolicy`] from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid URL scheme \"{0}\"")]
    InvalidScheme(String),

    #[error("invalid name prefix \"{0}\"")]
    InvalidPrefix(String),

    #[error("limit `{0}` must be greater than zero")]
    InvalidLimit(&'static str),
}
