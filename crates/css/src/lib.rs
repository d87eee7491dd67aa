//! CSS support for the sanitizer: property names, the incremental
//! rule/declaration parser, number parsing and escape decoding.

pub mod names;
pub mod number;
pub mod parser;
pub mod token;
pub mod unescape;

pub use names::CssProperty;
pub use number::{CssNumber, CssUnit, MAX_VALUE, parse_number};
pub use parser::{CssParseMode, CssParser, CssParserStats, CssStep};
pub use token::{
    Combinator, CssParts, CssPropertyEntry, CssSelector, CssToken, CssTokenId, SelectorClassKind,
};
pub use unescape::{attempt_unescape, normalize_for_screening};
