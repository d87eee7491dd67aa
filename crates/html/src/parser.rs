//! Incremental HTML tokenizer with tag balancing.
//!
//! Text is appended with `push_str`; `finish` marks end of input. Each
//! `parse` call returns at most one token (or token part) and never blocks.
//!
//! Contract:
//! - Chunk-equivalence: any split of the same input yields the same
//!   flattened token stream. Constructs that cannot be decided yet (a `<`
//!   at the end of input, a cut character reference, a partial `</script`)
//!   are held back until more input or `finish` arrives.
//! - Tag and attribute names resolve to a name index before they are
//!   exposed. A name longer than any known name resolves early to `Unknown`
//!   and then streams.
//! - End tags are balanced against an open-element stack: unmatched end tags
//!   are discarded, elements left open above a match are closed implicitly
//!   (or, when they are all formatting elements, bracketed by
//!   `OverlappedClose` / `OverlappedReopen`), and everything still open is
//!   closed at end of input. Void elements never open a level.
//! - Comments, doctypes and processing instructions are consumed silently.

use std::collections::VecDeque;

use memchr::{memchr, memchr2};
use tools::entries::MAX_ENTRIES;

use crate::entities::{Reference, decode_reference};
use crate::error::ParseError;
use crate::names::{HtmlName, TextKind};
use crate::token::{AttrParts, HtmlToken, HtmlTokenId, TagParts};

/// Deepest element nesting kept open; a start tag beyond it closes the
/// innermost element first.
pub const NESTING_LIMIT: usize = 4096;

/// Longest unknown element name kept for end-tag matching.
const MAX_KEY_LEN: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseStep {
    Token(HtmlTokenId),
    NeedMoreInput,
}

/// Anything that yields HTML tokens to the converter.
pub trait TokenSource {
    fn push_str(&mut self, text: &str);
    fn finish(&mut self);
    fn parse(&mut self) -> Result<ParseStep, ParseError>;
    fn token(&self) -> &HtmlToken;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParserStats {
    pub tokens: u64,
    pub tags: u64,
    pub comments: u64,
    pub implicit_end_tags: u64,
    pub discarded_end_tags: u64,
    pub overlapped: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Data,
    RawText,
    Plaintext,
    TagName,
    BeforeAttrName,
    SelfClosingStart,
    AttrName,
    AfterAttrName,
    BeforeAttrValue,
    AttrValueQuoted(u8),
    AttrValueUnquoted,
    AfterAttrValueQuoted,
    Comment,
    BogusComment,
}

impl State {
    fn in_tag(self) -> bool {
        matches!(
            self,
            State::TagName
                | State::BeforeAttrName
                | State::SelfClosingStart
                | State::AttrName
                | State::AfterAttrName
                | State::BeforeAttrValue
                | State::AttrValueQuoted(_)
                | State::AttrValueUnquoted
                | State::AfterAttrValueQuoted
        )
    }
}

enum Scan {
    /// Not enough input to decide; wait for more.
    Wait,
    Emit(HtmlTokenId),
    /// Synthesized tokens were queued.
    Flush,
    Fail(ParseError),
    Exhausted,
}

enum Queued {
    EndTag { tag: HtmlName, key: String },
    Marker(HtmlTokenId, usize),
}

enum RawEnd {
    Undecided,
    NoMatch,
    /// Byte length of `</name`.
    Match(usize),
}

struct OpenElement {
    tag: HtmlName,
    /// Lowercased name, kept only for unknown elements.
    key: String,
}

fn is_tag_name_delimiter(c: char) -> bool {
    c.is_ascii_whitespace() || c == '/' || c == '>'
}

fn is_attr_name_delimiter(c: char) -> bool {
    c.is_ascii_whitespace() || c == '/' || c == '>' || c == '='
}

fn push_capped(buf: &mut String, piece: &str) {
    for ch in piece.chars() {
        if buf.len() + ch.len_utf8() > MAX_KEY_LEN {
            return;
        }
        buf.push(ch);
    }
}

pub struct HtmlParser {
    input: String,
    pos: usize,
    finished: bool,
    eof_emitted: bool,
    failed: Option<ParseError>,
    state: State,
    content: TextKind,
    raw_end: HtmlName,
    token: HtmlToken,
    part_stale: bool,
    part_has_content: bool,
    queue: VecDeque<Queued>,
    stack: Vec<OpenElement>,
    tag: HtmlName,
    tag_is_end: bool,
    tag_begin_pending: bool,
    name_buf: String,
    name_streaming: bool,
    self_closing: bool,
    attr_name_buf: String,
    attr_streaming: bool,
    attr_open: bool,
    attr_index: HtmlName,
    attr_count: usize,
    comment_fresh: bool,
    stats: ParserStats,
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlParser {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            pos: 0,
            finished: false,
            eof_emitted: false,
            failed: None,
            state: State::Data,
            content: TextKind::Data,
            raw_end: HtmlName::Unknown,
            token: HtmlToken::default(),
            part_stale: true,
            part_has_content: false,
            queue: VecDeque::new(),
            stack: Vec::new(),
            tag: HtmlName::Unknown,
            tag_is_end: false,
            tag_begin_pending: false,
            name_buf: String::new(),
            name_streaming: false,
            self_closing: false,
            attr_name_buf: String::new(),
            attr_streaming: false,
            attr_open: false,
            attr_index: HtmlName::Unknown,
            attr_count: 0,
            comment_fresh: false,
            stats: ParserStats::default(),
        }
    }

    /// Reuse the parser for a new document, keeping allocations.
    pub fn reset(&mut self) {
        self.input.clear();
        self.pos = 0;
        self.finished = false;
        self.eof_emitted = false;
        self.failed = None;
        self.state = State::Data;
        self.content = TextKind::Data;
        self.raw_end = HtmlName::Unknown;
        self.token.reset(HtmlTokenId::None);
        self.part_stale = true;
        self.part_has_content = false;
        self.queue.clear();
        self.stack.clear();
        self.name_buf.clear();
        self.attr_name_buf.clear();
        self.attr_open = false;
        self.stats = ParserStats::default();
    }

    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn token(&self) -> &HtmlToken {
        &self.token
    }

    pub fn push_str(&mut self, text: &str) {
        assert!(!self.finished, "push_str after finish");
        if self.pos > 0 {
            self.input.drain(..self.pos);
            self.pos = 0;
        }
        self.input.push_str(text);
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn parse(&mut self) -> Result<ParseStep, ParseError> {
        let step = self.step()?;
        if let ParseStep::Token(_id) = step {
            self.stats.tokens += 1;
            #[cfg(any(test, feature = "debug-stats"))]
            log::trace!(target: "html.parser", "token {:?} depth={}", _id, self.stack.len());
        }
        Ok(step)
    }

    fn step(&mut self) -> Result<ParseStep, ParseError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        if let Some(id) = self.pop_queued() {
            return Ok(ParseStep::Token(id));
        }
        if self.eof_emitted {
            return Ok(ParseStep::Token(HtmlTokenId::EndOfFile));
        }
        match self.scan() {
            Scan::Emit(id) => return Ok(ParseStep::Token(id)),
            Scan::Flush => {
                if let Some(id) = self.pop_queued() {
                    return Ok(ParseStep::Token(id));
                }
            }
            Scan::Fail(err) => return Err(self.fail(err)),
            Scan::Wait | Scan::Exhausted => {}
        }
        if self.finished {
            match self.finish_pending() {
                Ok(Some(id)) => return Ok(ParseStep::Token(id)),
                Ok(None) => {}
                Err(err) => return Err(self.fail(err)),
            }
            self.eof_emitted = true;
            self.token.reset(HtmlTokenId::EndOfFile);
            self.part_stale = true;
            return Ok(ParseStep::Token(HtmlTokenId::EndOfFile));
        }
        if self.part_has_content {
            return Ok(ParseStep::Token(self.emit_part()));
        }
        Ok(ParseStep::NeedMoreInput)
    }

    fn fail(&mut self, err: ParseError) -> ParseError {
        log::debug!(target: "html.parser", "fatal: {err}");
        self.failed = Some(err.clone());
        err
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    /// True when `pattern` cannot yet be ruled in or out at the cursor.
    fn undecided(&self, pattern: &str) -> bool {
        let rest = self.rest();
        !self.finished && rest.len() < pattern.len() && pattern.starts_with(rest)
    }

    fn emit_part(&mut self) -> HtmlTokenId {
        self.part_stale = true;
        self.part_has_content = false;
        self.token.id()
    }

    fn pop_queued(&mut self) -> Option<HtmlTokenId> {
        let queued = self.queue.pop_front()?;
        let id = match queued {
            Queued::EndTag { tag, key } => {
                self.token.start_tag_part(tag, true);
                let name = if tag.is_unknown() {
                    key.as_str()
                } else {
                    tag.as_str()
                };
                self.token.push_name(name);
                let parts = &mut self.token.tag_parts;
                parts.insert(TagParts::BEGIN);
                parts.insert(TagParts::NAME_COMPLETE);
                parts.insert(TagParts::END);
                self.stats.tags += 1;
                HtmlTokenId::Tag
            }
            Queued::Marker(id, count) => {
                self.token.set_marker(id, count);
                id
            }
        };
        self.part_stale = true;
        self.part_has_content = false;
        Some(id)
    }

    fn ensure_text_part(&mut self) {
        if self.part_stale || self.token.id() != HtmlTokenId::Text {
            self.token.start_text(self.content);
            self.part_stale = false;
        }
        self.part_has_content = true;
    }

    fn ensure_tag_part(&mut self) {
        if self.part_stale {
            self.token.start_tag_part(self.tag, false);
            if std::mem::take(&mut self.tag_begin_pending) {
                self.token.tag_parts.insert(TagParts::BEGIN);
            }
            if self.attr_open {
                self.token.open_attribute(self.attr_index, true);
            }
            self.part_stale = false;
        }
        self.part_has_content = true;
    }

    fn push_text_to(&mut self, end: usize) {
        if end > self.pos {
            self.ensure_text_part();
            self.token.push_text(&self.input[self.pos..end]);
        }
        self.pos = end;
    }

    fn push_literal_text(&mut self, text: &str) {
        self.ensure_text_part();
        self.token.push_text(text);
        self.pos += text.len();
    }

    fn push_value_to(&mut self, end: usize) {
        if end > self.pos && !self.tag_is_end {
            self.ensure_tag_part();
            self.token.push_attribute_value(&self.input[self.pos..end]);
        }
        self.pos = end;
    }

    fn scan(&mut self) -> Scan {
        loop {
            let Some(ch) = self.rest().chars().next() else {
                return Scan::Exhausted;
            };
            let step = match self.state {
                State::Data => self.scan_data(),
                State::RawText => self.scan_raw_text(),
                State::Plaintext => {
                    let end = self.input.len();
                    self.push_text_to(end);
                    None
                }
                State::TagName => self.scan_tag_name(ch),
                State::BeforeAttrName => self.scan_before_attr_name(ch),
                State::SelfClosingStart => self.scan_self_closing(ch),
                State::AttrName => self.scan_attr_name(ch),
                State::AfterAttrName => self.scan_after_attr_name(ch),
                State::BeforeAttrValue => self.scan_before_attr_value(ch),
                State::AttrValueQuoted(quote) => self.scan_quoted_value(quote),
                State::AttrValueUnquoted => self.scan_unquoted_value(),
                State::AfterAttrValueQuoted => self.scan_after_quoted_value(ch),
                State::Comment => self.scan_comment(),
                State::BogusComment => self.scan_bogus_comment(),
            };
            match step {
                None | Some(Scan::Exhausted) => continue,
                Some(done) => return done,
            }
        }
    }

    fn scan_data(&mut self) -> Option<Scan> {
        let bytes = &self.input.as_bytes()[self.pos..];
        match memchr2(b'<', b'&', bytes) {
            None => {
                let end = self.input.len();
                self.push_text_to(end);
                None
            }
            Some(0) if bytes[0] == b'&' => self.scan_text_reference(),
            Some(0) => self.scan_markup(),
            Some(i) => {
                self.push_text_to(self.pos + i);
                None
            }
        }
    }

    fn scan_text_reference(&mut self) -> Option<Scan> {
        match decode_reference(self.rest(), self.finished) {
            Reference::Incomplete => Some(Scan::Wait),
            Reference::Literal => {
                self.push_literal_text("&");
                None
            }
            Reference::Decoded { ch, len } => {
                self.ensure_text_part();
                self.token.push_text_char(ch);
                self.pos += len;
                None
            }
        }
    }

    fn scan_value_reference(&mut self) -> Option<Scan> {
        match decode_reference(self.rest(), self.finished) {
            Reference::Incomplete => Some(Scan::Wait),
            Reference::Literal => {
                self.push_value_to(self.pos + 1);
                None
            }
            Reference::Decoded { ch, len } => {
                if !self.tag_is_end {
                    self.ensure_tag_part();
                    self.token.push_attribute_value_char(ch);
                }
                self.pos += len;
                None
            }
        }
    }

    /// `<` in data.
    fn scan_markup(&mut self) -> Option<Scan> {
        let mut chars = self.rest().chars();
        chars.next();
        let next = chars.next();
        let after = chars.next();
        match next {
            None if !self.finished => Some(Scan::Wait),
            Some(c) if c.is_ascii_alphabetic() => {
                if self.part_has_content {
                    return Some(Scan::Emit(self.emit_part()));
                }
                if self.stack.len() >= NESTING_LIMIT {
                    self.close_innermost(true);
                    return Some(Scan::Flush);
                }
                self.pos += 1;
                self.begin_tag(false);
                None
            }
            Some('/') => match after {
                None if !self.finished => Some(Scan::Wait),
                Some(c) if c.is_ascii_alphabetic() => {
                    if self.part_has_content {
                        return Some(Scan::Emit(self.emit_part()));
                    }
                    self.pos += 2;
                    self.begin_tag(true);
                    None
                }
                Some('>') => {
                    self.pos += 3;
                    None
                }
                Some(_) => {
                    self.pos += 2;
                    self.stats.comments += 1;
                    self.state = State::BogusComment;
                    None
                }
                None => {
                    self.push_literal_text("</");
                    None
                }
            },
            Some('!') => {
                if self.undecided("<!--") {
                    return Some(Scan::Wait);
                }
                self.stats.comments += 1;
                if self.rest().starts_with("<!--") {
                    self.pos += 4;
                    self.comment_fresh = true;
                    self.state = State::Comment;
                } else {
                    self.pos += 2;
                    self.state = State::BogusComment;
                }
                None
            }
            Some('?') => {
                self.pos += 2;
                self.stats.comments += 1;
                self.state = State::BogusComment;
                None
            }
            _ => {
                self.push_literal_text("<");
                None
            }
        }
    }

    fn close_innermost(&mut self, implicit: bool) {
        if let Some(open) = self.stack.pop() {
            if implicit {
                self.stats.implicit_end_tags += 1;
            }
            self.queue.push_back(Queued::EndTag {
                tag: open.tag,
                key: open.key,
            });
        }
    }

    fn scan_raw_text(&mut self) -> Option<Scan> {
        let bytes = &self.input.as_bytes()[self.pos..];
        let hit = if self.content == TextKind::Rcdata {
            memchr2(b'<', b'&', bytes)
        } else {
            memchr(b'<', bytes)
        };
        match hit {
            None => {
                let end = self.input.len();
                self.push_text_to(end);
                None
            }
            Some(0) if bytes[0] == b'&' => self.scan_text_reference(),
            Some(0) => match self.raw_end_match() {
                RawEnd::Undecided => Some(Scan::Wait),
                RawEnd::NoMatch => {
                    self.push_literal_text("<");
                    None
                }
                RawEnd::Match(len) => {
                    if self.part_has_content {
                        return Some(Scan::Emit(self.emit_part()));
                    }
                    self.pos += len;
                    self.begin_tag(true);
                    self.name_buf.push_str(self.raw_end.as_str());
                    self.content = TextKind::Data;
                    self.state = State::BeforeAttrName;
                    None
                }
            },
            Some(i) => {
                self.push_text_to(self.pos + i);
                None
            }
        }
    }

    /// Does `</name` followed by a delimiter start at the cursor?
    fn raw_end_match(&self) -> RawEnd {
        let rest = &self.input.as_bytes()[self.pos..];
        let name = self.raw_end.as_str().as_bytes();
        let want = 2 + name.len();
        let prefix_ok = |n: usize| {
            (0..n).all(|k| {
                let expected = match k {
                    0 => b'<',
                    1 => b'/',
                    _ => name[k - 2],
                };
                rest[k].eq_ignore_ascii_case(&expected)
            })
        };
        if rest.len() <= want {
            if !prefix_ok(rest.len()) {
                return RawEnd::NoMatch;
            }
            if !self.finished {
                return RawEnd::Undecided;
            }
            return if rest.len() == want {
                RawEnd::Match(want)
            } else {
                RawEnd::NoMatch
            };
        }
        if !prefix_ok(want) {
            return RawEnd::NoMatch;
        }
        match rest[want] {
            b'/' | b'>' => RawEnd::Match(want),
            b if b.is_ascii_whitespace() => RawEnd::Match(want),
            _ => RawEnd::NoMatch,
        }
    }

    fn begin_tag(&mut self, is_end: bool) {
        self.tag = HtmlName::Unknown;
        self.tag_is_end = is_end;
        self.tag_begin_pending = !is_end;
        self.name_buf.clear();
        self.name_streaming = false;
        self.self_closing = false;
        self.attr_open = false;
        self.attr_streaming = false;
        self.attr_count = 0;
        self.state = State::TagName;
    }

    fn scan_tag_name(&mut self, ch: char) -> Option<Scan> {
        if is_tag_name_delimiter(ch) {
            self.complete_tag_name();
            self.state = State::BeforeAttrName;
            return None;
        }
        let rest = self.rest();
        let end = rest.find(is_tag_name_delimiter).unwrap_or(rest.len());
        let piece = rest[..end].to_ascii_lowercase();
        self.pos += end;
        self.append_tag_name(&piece);
        None
    }

    fn append_tag_name(&mut self, piece: &str) {
        if self.tag_is_end {
            push_capped(&mut self.name_buf, piece);
            return;
        }
        if self.name_streaming {
            self.ensure_tag_part();
            self.token.push_name(piece);
            push_capped(&mut self.name_buf, piece);
            return;
        }
        self.name_buf.push_str(piece);
        if self.name_buf.len() > HtmlName::MAX_LEN {
            self.name_streaming = true;
            self.tag = HtmlName::Unknown;
            self.ensure_tag_part();
            self.token.push_name(&self.name_buf);
            if self.name_buf.len() > MAX_KEY_LEN {
                let full = std::mem::take(&mut self.name_buf);
                push_capped(&mut self.name_buf, &full);
            }
        }
    }

    fn complete_tag_name(&mut self) {
        if self.tag_is_end {
            return;
        }
        if !self.name_streaming {
            self.tag = HtmlName::from_name(&self.name_buf);
            self.ensure_tag_part();
            self.token.push_name(&self.name_buf);
        } else {
            self.ensure_tag_part();
        }
        self.token.tag_parts.insert(TagParts::NAME_COMPLETE);
        if !self.tag.is_unknown() {
            self.name_buf.clear();
        }
    }

    fn scan_before_attr_name(&mut self, ch: char) -> Option<Scan> {
        match ch {
            c if c.is_ascii_whitespace() => {
                self.pos += 1;
                None
            }
            '/' => {
                self.pos += 1;
                self.state = State::SelfClosingStart;
                None
            }
            '>' => {
                self.pos += 1;
                self.finish_tag()
            }
            _ => {
                self.attr_name_buf.clear();
                self.attr_streaming = false;
                self.state = State::AttrName;
                if ch == '=' {
                    self.pos += 1;
                    self.attr_name_buf.push('=');
                }
                None
            }
        }
    }

    fn scan_self_closing(&mut self, ch: char) -> Option<Scan> {
        if ch == '>' {
            self.pos += 1;
            self.self_closing = true;
            return self.finish_tag();
        }
        self.state = State::BeforeAttrName;
        None
    }

    fn scan_attr_name(&mut self, ch: char) -> Option<Scan> {
        if is_attr_name_delimiter(ch) {
            self.state = State::AfterAttrName;
            return self.complete_attr_name();
        }
        let rest = self.rest();
        let end = rest.find(is_attr_name_delimiter).unwrap_or(rest.len());
        let piece = rest[..end].to_ascii_lowercase();
        self.pos += end;
        self.append_attr_name(&piece)
    }

    fn open_attribute(&mut self, index: HtmlName) -> Option<Scan> {
        let overflow = Scan::Fail(ParseError::TooManyAttributes { limit: MAX_ENTRIES });
        if self.attr_count >= MAX_ENTRIES {
            return Some(overflow);
        }
        self.ensure_tag_part();
        if !self.token.open_attribute(index, false) {
            return Some(overflow);
        }
        self.attr_count += 1;
        self.attr_open = true;
        self.attr_index = index;
        None
    }

    fn append_attr_name(&mut self, piece: &str) -> Option<Scan> {
        if self.tag_is_end {
            return None;
        }
        if self.attr_streaming {
            self.ensure_tag_part();
            self.token.push_attribute_name(piece);
            return None;
        }
        self.attr_name_buf.push_str(piece);
        if self.attr_name_buf.len() > HtmlName::MAX_LEN {
            if let Some(fail) = self.open_attribute(HtmlName::Unknown) {
                return Some(fail);
            }
            self.attr_streaming = true;
            self.token.push_attribute_name(&self.attr_name_buf);
        }
        None
    }

    fn complete_attr_name(&mut self) -> Option<Scan> {
        if self.tag_is_end {
            return None;
        }
        if self.attr_streaming {
            self.ensure_tag_part();
        } else {
            let index = HtmlName::from_name(&self.attr_name_buf);
            if let Some(fail) = self.open_attribute(index) {
                return Some(fail);
            }
            self.token.push_attribute_name(&self.attr_name_buf);
        }
        self.token.mark_attribute(AttrParts::NAME_END);
        None
    }

    fn end_attribute(&mut self) {
        if self.tag_is_end || !self.attr_open {
            return;
        }
        self.ensure_tag_part();
        self.token.mark_attribute(AttrParts::END);
        self.attr_open = false;
        self.attr_streaming = false;
    }

    fn mark_value_begin(&mut self) {
        if !self.tag_is_end {
            self.ensure_tag_part();
            self.token.mark_attribute(AttrParts::VALUE_BEGIN);
        }
    }

    fn scan_after_attr_name(&mut self, ch: char) -> Option<Scan> {
        match ch {
            c if c.is_ascii_whitespace() => self.pos += 1,
            '=' => {
                self.pos += 1;
                self.state = State::BeforeAttrValue;
            }
            _ => {
                self.end_attribute();
                self.state = State::BeforeAttrName;
            }
        }
        None
    }

    fn scan_before_attr_value(&mut self, ch: char) -> Option<Scan> {
        match ch {
            c if c.is_ascii_whitespace() => self.pos += 1,
            '"' | '\'' => {
                self.pos += 1;
                self.mark_value_begin();
                self.state = State::AttrValueQuoted(ch as u8);
            }
            '>' => {
                self.end_attribute();
                self.state = State::BeforeAttrName;
            }
            _ => {
                self.mark_value_begin();
                self.state = State::AttrValueUnquoted;
            }
        }
        None
    }

    fn scan_quoted_value(&mut self, quote: u8) -> Option<Scan> {
        let bytes = &self.input.as_bytes()[self.pos..];
        match memchr2(quote, b'&', bytes) {
            None => {
                let end = self.input.len();
                self.push_value_to(end);
                None
            }
            Some(0) if bytes[0] == quote => {
                self.pos += 1;
                self.end_attribute();
                self.state = State::AfterAttrValueQuoted;
                None
            }
            Some(0) => self.scan_value_reference(),
            Some(i) => {
                self.push_value_to(self.pos + i);
                None
            }
        }
    }

    fn scan_unquoted_value(&mut self) -> Option<Scan> {
        let bytes = &self.input.as_bytes()[self.pos..];
        let stop = bytes
            .iter()
            .position(|&b| b.is_ascii_whitespace() || b == b'>' || b == b'&');
        match stop {
            None => {
                let end = self.input.len();
                self.push_value_to(end);
                None
            }
            Some(0) if bytes[0] == b'&' => self.scan_value_reference(),
            Some(0) => {
                self.end_attribute();
                self.state = State::BeforeAttrName;
                None
            }
            Some(i) => {
                self.push_value_to(self.pos + i);
                None
            }
        }
    }

    fn scan_after_quoted_value(&mut self, ch: char) -> Option<Scan> {
        match ch {
            c if c.is_ascii_whitespace() => {
                self.pos += 1;
                self.state = State::BeforeAttrName;
                None
            }
            '/' => {
                self.pos += 1;
                self.state = State::SelfClosingStart;
                None
            }
            '>' => {
                self.pos += 1;
                self.finish_tag()
            }
            _ => {
                self.state = State::BeforeAttrName;
                None
            }
        }
    }

    fn scan_comment(&mut self) -> Option<Scan> {
        if self.comment_fresh {
            if self.undecided("->") {
                return Some(Scan::Wait);
            }
            // `<!-->` and `<!--->` are complete comments.
            if self.rest().starts_with('>') {
                self.pos += 1;
                self.state = State::Data;
                return None;
            }
            if self.rest().starts_with("->") {
                self.pos += 2;
                self.state = State::Data;
                return None;
            }
            self.comment_fresh = false;
        }
        let rest = self.rest();
        if let Some(end) = rest.find("-->") {
            self.pos += end + 3;
            self.state = State::Data;
            return None;
        }
        let keep = if self.finished {
            0
        } else {
            (rest.len() - rest.trim_end_matches('-').len()).min(2)
        };
        self.pos = self.input.len() - keep;
        Some(Scan::Wait)
    }

    fn scan_bogus_comment(&mut self) -> Option<Scan> {
        let bytes = &self.input.as_bytes()[self.pos..];
        match memchr(b'>', bytes) {
            Some(i) => {
                self.pos += i + 1;
                self.state = State::Data;
                None
            }
            None => {
                self.pos = self.input.len();
                Some(Scan::Wait)
            }
        }
    }

    fn finish_tag(&mut self) -> Option<Scan> {
        self.state = State::Data;
        if self.tag_is_end {
            return self.finish_end_tag();
        }
        self.end_attribute();
        self.ensure_tag_part();
        self.token.tag_parts.insert(TagParts::END);
        self.token.self_closing = self.self_closing;
        self.stats.tags += 1;

        let tag = self.tag;
        if !tag.is_void() {
            let key = if tag.is_unknown() {
                std::mem::take(&mut self.name_buf)
            } else {
                String::new()
            };
            if self.self_closing && matches!(tag, HtmlName::Svg | HtmlName::Math) {
                self.queue.push_back(Queued::EndTag { tag, key });
            } else {
                self.stack.push(OpenElement { tag, key });
                match tag.text_kind() {
                    TextKind::Data => {}
                    TextKind::Plaintext => {
                        self.content = TextKind::Plaintext;
                        self.state = State::Plaintext;
                    }
                    kind => {
                        self.content = kind;
                        self.raw_end = tag;
                        self.state = State::RawText;
                    }
                }
            }
        }
        Some(Scan::Emit(self.emit_part()))
    }

    fn finish_end_tag(&mut self) -> Option<Scan> {
        let tag = HtmlName::from_name(&self.name_buf);
        let key = std::mem::take(&mut self.name_buf);
        let found = self
            .stack
            .iter()
            .rposition(|open| open.tag == tag && (!tag.is_unknown() || open.key == key));
        let Some(index) = found else {
            self.stats.discarded_end_tags += 1;
            #[cfg(any(test, feature = "debug-stats"))]
            log::trace!(target: "html.parser", "discard unmatched end tag {key:?}");
            return None;
        };

        let above = self.stack.len() - index - 1;
        if above == 0 {
            self.close_innermost(false);
        } else if self.stack[index + 1..].iter().all(|open| open.tag.is_formatting()) {
            let open = self.stack.remove(index);
            self.stats.overlapped += 1;
            self.queue
                .push_back(Queued::Marker(HtmlTokenId::OverlappedClose, above));
            self.queue.push_back(Queued::EndTag {
                tag: open.tag,
                key: open.key,
            });
            self.queue
                .push_back(Queued::Marker(HtmlTokenId::OverlappedReopen, above));
        } else {
            while self.stack.len() > index + 1 {
                self.close_innermost(true);
            }
            self.close_innermost(false);
        }
        Some(Scan::Flush)
    }

    fn finish_pending(&mut self) -> Result<Option<HtmlTokenId>, ParseError> {
        if self.state.in_tag() {
            match self.state {
                State::TagName => self.complete_tag_name(),
                State::AttrName => {
                    if let Some(Scan::Fail(err)) = self.complete_attr_name() {
                        return Err(err);
                    }
                }
                _ => {}
            }
            match self.finish_tag() {
                Some(Scan::Emit(id)) => return Ok(Some(id)),
                Some(Scan::Flush) => return Ok(self.pop_queued()),
                _ => {}
            }
        }
        if matches!(self.state, State::Comment | State::BogusComment) {
            self.state = State::Data;
        }
        if self.part_has_content {
            return Ok(Some(self.emit_part()));
        }
        if !self.stack.is_empty() {
            while !self.stack.is_empty() {
                self.close_innermost(false);
            }
            return Ok(self.pop_queued());
        }
        Ok(None)
    }
}

impl TokenSource for HtmlParser {
    fn push_str(&mut self, text: &str) {
        HtmlParser::push_str(self, text);
    }

    fn finish(&mut self) {
        HtmlParser::finish(self);
    }

    fn parse(&mut self) -> Result<ParseStep, ParseError> {
        HtmlParser::parse(self)
    }

    fn token(&self) -> &HtmlToken {
        &self.token
    }
}

#[cfg(test)]
mod tests;
