//! Shared building blocks for the HTML and CSS sanitizers.

pub mod entries;
pub mod fragment;
pub mod names;
pub mod utf8;

pub use entries::{EntryCursor, EntryList, SoftDelete};
pub use fragment::{Fragment, FragmentReader, FragmentSink, TokenBuffer};
pub use utf8::Utf8ChunkDecoder;
