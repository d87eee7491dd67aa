//! HTML token model.
//!
//! A token is one tokenizer step: a text run, one part of a tag, or a
//! structural marker (end of file, overlap recovery, injection bounds). All
//! text lives in the token's [`TokenBuffer`]; names, values and text are
//! [`Fragment`]s over it.
//!
//! A start tag may be exposed in several parts when the input ends inside
//! it. Each part carries only what arrived since the previous part:
//! - `TagParts::BEGIN` is set on the first part, `TagParts::END` on the part
//!   that saw `>` (or end of input).
//! - The tag name is complete in the part flagged `NAME_COMPLETE`; known
//!   names always arrive complete, an over-long (unknown) name may stream.
//! - Attributes are complete except possibly the last one of a part, whose
//!   `AttrParts` lack `END`. That attribute continues as the first entry of
//!   the next part, without `BEGIN`.
//!
//! End tags are always exposed in a single part.

use tools::{EntryCursor, EntryList, Fragment, SoftDelete, TokenBuffer};

use crate::names::{HtmlName, TextKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HtmlTokenId {
    None,
    Text,
    Tag,
    EndOfFile,
    /// The input declared a different character encoding.
    EncodingChange,
    /// Discard output produced so far and start over.
    Restart,
    /// `argument()` levels are closed temporarily to let a misnested end tag
    /// through; an `OverlappedReopen` with the same count follows.
    OverlappedClose,
    OverlappedReopen,
    /// Start of trusted markup injected by the host; it bypasses the filter.
    InjectionBegin,
    InjectionEnd,
}

macro_rules! part_flags {
    ($name:ident { $($flag:ident = $bit:expr),* $(,)? }) => {
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name(u8);

        impl $name {
            $(pub const $flag: $name = $name($bit);)*

            pub fn contains(self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }

            pub fn insert(&mut self, other: $name) {
                self.0 |= other.0;
            }

            pub fn is_empty(self) -> bool {
                self.0 == 0
            }
        }
    };
}

part_flags!(TagParts {
    BEGIN = 1,
    NAME = 2,
    NAME_COMPLETE = 4,
    ATTRIBUTES = 8,
    END = 16,
});

part_flags!(AttrParts {
    BEGIN = 1,
    NAME = 2,
    NAME_END = 4,
    VALUE_BEGIN = 8,
    VALUE = 16,
    END = 32,
});

impl TagParts {
    pub fn is_begin(self) -> bool {
        self.contains(Self::BEGIN)
    }

    pub fn is_end(self) -> bool {
        self.contains(Self::END)
    }

    pub fn is_complete(self) -> bool {
        self.contains(Self::BEGIN) && self.contains(Self::END)
    }
}

impl AttrParts {
    pub fn is_begin(self) -> bool {
        self.contains(Self::BEGIN)
    }

    pub fn is_end(self) -> bool {
        self.contains(Self::END)
    }

    pub fn has_name(self) -> bool {
        self.contains(Self::NAME)
    }

    pub fn has_value(self) -> bool {
        self.contains(Self::VALUE)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HtmlAttribute {
    pub name_index: HtmlName,
    /// Raw (lowercased) name text in this part.
    pub name: Fragment,
    /// Decoded value text in this part.
    pub value: Fragment,
    pub parts: AttrParts,
    pub deleted: bool,
}

impl SoftDelete for HtmlAttribute {
    fn is_deleted(&self) -> bool {
        self.deleted
    }
    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}

#[derive(Debug)]
pub struct HtmlToken {
    pub(crate) id: HtmlTokenId,
    pub(crate) buffer: TokenBuffer,
    pub(crate) tag: HtmlName,
    pub(crate) is_end_tag: bool,
    pub(crate) tag_parts: TagParts,
    pub(crate) name: Fragment,
    pub(crate) self_closing: bool,
    pub(crate) attributes: EntryList<HtmlAttribute>,
    pub(crate) text: Fragment,
    pub(crate) text_kind: TextKind,
    pub(crate) argument: usize,
}

impl Default for HtmlToken {
    fn default() -> Self {
        Self {
            id: HtmlTokenId::None,
            buffer: TokenBuffer::new(),
            tag: HtmlName::Unknown,
            is_end_tag: false,
            tag_parts: TagParts::default(),
            name: Fragment::EMPTY,
            self_closing: false,
            attributes: EntryList::new(),
            text: Fragment::EMPTY,
            text_kind: TextKind::Data,
            argument: 0,
        }
    }
}

impl HtmlToken {
    pub fn id(&self) -> HtmlTokenId {
        self.id
    }

    pub fn buffer(&self) -> &TokenBuffer {
        &self.buffer
    }

    pub fn tag(&self) -> HtmlName {
        self.tag
    }

    pub fn is_end_tag(&self) -> bool {
        self.is_end_tag
    }

    pub fn tag_parts(&self) -> TagParts {
        self.tag_parts
    }

    pub fn name(&self) -> Fragment {
        self.name
    }

    pub fn self_closing(&self) -> bool {
        self.self_closing
    }

    pub fn attributes(&self) -> &EntryList<HtmlAttribute> {
        &self.attributes
    }

    pub fn attribute(&self, cursor: EntryCursor) -> &HtmlAttribute {
        self.attributes.get(cursor)
    }

    pub fn text(&self) -> Fragment {
        self.text
    }

    /// Content model the text was read under.
    pub fn text_kind(&self) -> TextKind {
        self.text_kind
    }

    /// Level count of an overlapped close/reopen.
    pub fn argument(&self) -> usize {
        self.argument
    }

    pub fn text_string(&self) -> String {
        self.buffer.to_string_of(self.text)
    }

    pub fn name_string(&self) -> String {
        self.buffer.to_string_of(self.name)
    }

    /// Start a new token or token part. Earlier fragments and cursors die.
    pub(crate) fn reset(&mut self, id: HtmlTokenId) {
        self.id = id;
        self.buffer.reset();
        self.tag_parts = TagParts::default();
        self.name = Fragment::EMPTY;
        self.self_closing = false;
        self.attributes.clear();
        self.text = Fragment::EMPTY;
        self.text_kind = TextKind::Data;
        self.argument = 0;
    }

    pub(crate) fn start_text(&mut self, kind: TextKind) {
        self.reset(HtmlTokenId::Text);
        self.text_kind = kind;
        self.text = self.buffer.begin_fragment();
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.buffer.push_str(&mut self.text, text);
    }

    pub(crate) fn push_text_char(&mut self, ch: char) {
        self.buffer.push_char(&mut self.text, ch);
    }

    /// Start a tag part. `tag` and `is_end_tag` persist across parts.
    pub(crate) fn start_tag_part(&mut self, tag: HtmlName, is_end_tag: bool) {
        self.reset(HtmlTokenId::Tag);
        self.tag = tag;
        self.is_end_tag = is_end_tag;
    }

    pub(crate) fn push_name(&mut self, text: &str) {
        self.tag_parts.insert(TagParts::NAME);
        self.buffer.push_str(&mut self.name, text);
    }

    pub(crate) fn set_marker(&mut self, id: HtmlTokenId, argument: usize) {
        self.reset(id);
        self.argument = argument;
    }

    /// Open an attribute entry in the current part. `continued` marks the
    /// in-flight attribute of an earlier part.
    pub(crate) fn open_attribute(&mut self, name_index: HtmlName, continued: bool) -> bool {
        if self.attributes.is_full() {
            return false;
        }
        let mut parts = AttrParts::default();
        if !continued {
            parts.insert(AttrParts::BEGIN);
        }
        self.attributes.push(HtmlAttribute {
            name_index,
            name: Fragment::EMPTY,
            value: Fragment::EMPTY,
            parts,
            deleted: false,
        });
        self.tag_parts.insert(TagParts::ATTRIBUTES);
        true
    }

    fn last_attribute(&mut self) -> &mut HtmlAttribute {
        match self.attributes.last_mut() {
            Some(attr) => attr,
            None => panic!("attribute text pushed with no open attribute"),
        }
    }

    pub(crate) fn push_attribute_name(&mut self, text: &str) {
        let mut name = self.last_attribute().name;
        self.buffer.push_str(&mut name, text);
        let attr = self.last_attribute();
        attr.name = name;
        attr.parts.insert(AttrParts::NAME);
    }

    pub(crate) fn mark_attribute(&mut self, flag: AttrParts) {
        self.last_attribute().parts.insert(flag);
    }

    pub(crate) fn push_attribute_value(&mut self, text: &str) {
        let mut value = self.last_attribute().value;
        self.buffer.push_str(&mut value, text);
        let attr = self.last_attribute();
        attr.value = value;
        attr.parts.insert(AttrParts::VALUE);
    }

    pub(crate) fn push_attribute_value_char(&mut self, ch: char) {
        let mut utf8 = [0u8; 4];
        self.push_attribute_value(ch.encode_utf8(&mut utf8));
    }
}
