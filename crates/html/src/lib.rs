//! Streaming HTML sanitizer.
//!
//! Input is decoded text pushed in arbitrary chunks. [`HtmlParser`] turns it
//! into tokens (tag parts, text runs, structural markers);
//! [`HtmlToHtmlConverter`] filters every token against an immutable
//! [`SanitizePolicy`] and re-serializes what survives through an
//! [`HtmlWriter`]. Output is identical however the input was chunked.

pub mod config;
pub mod converter;
pub mod error;
pub mod filter;
pub mod names;
pub mod parser;
pub mod token;
pub mod url;
pub mod writer;

mod entities;

pub use crate::config::{ConverterConfig, SanitizePolicy, SchemeListMode, UrlSchemeConfig};
pub use crate::converter::{
    AttributeValueSource, BufferedAttribute, ConverterStats, CopyPendingState, FilteredValue,
    HtmlToHtmlConverter, TagCallback, TagContext, sanitize,
};
pub use crate::error::{ConfigError, ConvertError, ParseError};
pub use crate::filter::{BaseAction, FilterAction, OutputMode};
pub use crate::names::{HtmlName, TextKind};
pub use crate::parser::{HtmlParser, ParseStep, ParserStats, TokenSource};
pub use crate::token::{AttrParts, HtmlAttribute, HtmlToken, HtmlTokenId, TagParts};
pub use crate::url::{UrlCheck, check_url};
pub use crate::writer::{EntityFallback, EscapeContext, EscapeFallback, HtmlWriter};
