//! CSS token model: a selector list and a property list over one shared
//! [`TokenBuffer`].
//!
//! A rule set is exposed in parts. The `BEGIN` part carries the complete
//! selector list; every part carries zero or more complete properties; the
//! `END` part is produced at the closing brace (or end of input). Properties
//! are never split across parts.

use tools::{EntryCursor, EntryList, Fragment, SoftDelete, TokenBuffer};

use crate::names::CssProperty;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CssTokenId {
    None,
    /// An `@` rule was consumed. It carries no content.
    AtRule,
    /// Part of a bare declaration list (`style` attribute).
    Declarations,
    /// Part of a rule set (`selectors { declarations }`).
    RuleSet,
    EndOfFile,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CssParts(u8);

impl CssParts {
    pub const BEGIN: CssParts = CssParts(1);
    pub const END: CssParts = CssParts(2);

    pub fn contains(self, other: CssParts) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: CssParts) {
        self.0 |= other.0;
    }

    pub fn is_begin(self) -> bool {
        self.contains(Self::BEGIN)
    }

    pub fn is_end(self) -> bool {
        self.contains(Self::END)
    }
}

/// How a simple selector relates to the entry that follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// Last entry of a comma-separated selector.
    None,
    Descendant,
    /// `>`
    Child,
    /// `+`
    Adjacent,
    /// `~`
    Sibling,
    /// Next entry is part of the same compound selector (`a.b`, `.b#c`).
    Compound,
}

impl Combinator {
    pub fn as_css(self) -> &'static str {
        match self {
            Combinator::None | Combinator::Compound => "",
            Combinator::Descendant => " ",
            Combinator::Child => ">",
            Combinator::Adjacent => "+",
            Combinator::Sibling => "~",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorClassKind {
    None,
    Class,
    Id,
    Pseudo,
    /// Syntax the sanitizer does not pass through (attribute selectors,
    /// functional pseudo-classes, stray punctuation).
    Invalid,
}

#[derive(Clone, Copy, Debug)]
pub struct CssSelector {
    /// Element name (or `*`); empty when the simple selector has none.
    pub name: Fragment,
    pub class_kind: SelectorClassKind,
    /// Class, id or pseudo name without its sigil.
    pub class: Fragment,
    pub combinator: Combinator,
    pub deleted: bool,
}

impl SoftDelete for CssSelector {
    fn is_deleted(&self) -> bool {
        self.deleted
    }
    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CssPropertyEntry {
    pub name_index: CssProperty,
    pub name: Fragment,
    pub value: Fragment,
    /// The value exceeded the size limit and was cut.
    pub truncated: bool,
    pub deleted: bool,
}

impl SoftDelete for CssPropertyEntry {
    fn is_deleted(&self) -> bool {
        self.deleted
    }
    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}

#[derive(Debug)]
pub struct CssToken {
    pub(crate) id: CssTokenId,
    pub(crate) parts: CssParts,
    pub(crate) buffer: TokenBuffer,
    pub(crate) selectors: EntryList<CssSelector>,
    pub(crate) properties: EntryList<CssPropertyEntry>,
}

impl Default for CssToken {
    fn default() -> Self {
        Self {
            id: CssTokenId::None,
            parts: CssParts::default(),
            buffer: TokenBuffer::new(),
            selectors: EntryList::new(),
            properties: EntryList::new(),
        }
    }
}

impl CssToken {
    pub fn id(&self) -> CssTokenId {
        self.id
    }

    pub fn parts(&self) -> CssParts {
        self.parts
    }

    pub fn buffer(&self) -> &TokenBuffer {
        &self.buffer
    }

    pub fn selectors(&self) -> &EntryList<CssSelector> {
        &self.selectors
    }

    pub fn properties(&self) -> &EntryList<CssPropertyEntry> {
        &self.properties
    }

    pub fn delete_selector(&mut self, cursor: EntryCursor) {
        self.selectors.set_deleted(cursor, true);
    }

    pub fn delete_property(&mut self, cursor: EntryCursor) {
        self.properties.set_deleted(cursor, true);
    }

    pub fn property_text(&self, cursor: EntryCursor) -> (String, String) {
        let entry = self.properties.get(cursor);
        (
            self.buffer.to_string_of(entry.name),
            self.buffer.to_string_of(entry.value),
        )
    }

    /// Start a new part. Fragments and cursors from the previous part die.
    pub(crate) fn reset(&mut self, id: CssTokenId) {
        self.id = id;
        self.parts = CssParts::default();
        self.buffer.reset();
        self.selectors.clear();
        self.properties.clear();
    }
}
