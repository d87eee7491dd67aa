//! Incremental CSS sub-parser.
//!
//! Two modes share one state machine:
//! - `StyleTag`: the content of a `<style>` element, a sequence of rule sets
//!   and at-rules. Rule sets are exposed as `RuleSet` token parts.
//! - `StyleAttribute`: a bare declaration list, exposed as `Declarations`
//!   token parts.
//!
//! Contract:
//! - Text is appended with `push_str`; `finish` marks end of input. After
//!   `finish`, `parse` eventually returns `EndOfFile` forever.
//! - A declaration is held back until its terminator is seen, so a property
//!   is always complete when exposed. Values longer than the configured
//!   maximum are cut at a character boundary and flagged `truncated`; the rest
//!   of the value is consumed without being stored.
//! - Comments are removed everywhere. At-rules, including their blocks, are
//!   consumed and reported as a content-free `AtRule` token.
//! - A value with an unterminated string or unbalanced parentheses is
//!   discarded.

use crate::names::CssProperty;
use crate::token::{
    Combinator, CssParts, CssPropertyEntry, CssSelector, CssToken, CssTokenId, SelectorClassKind,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CssParseMode {
    StyleTag,
    StyleAttribute,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CssStep {
    Token(CssTokenId),
    NeedMoreInput,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CssParserStats {
    pub rule_sets: u32,
    pub at_rules: u32,
    pub properties: u32,
    pub truncated_values: u32,
    pub discarded_values: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    TopLevel,
    Prelude,
    AtRule,
    SkipBlock,
    DeclStart,
    DeclName,
    AfterName,
    DeclValue,
    SkipDecl,
    Comment,
}

/// Longest property name kept; anything longer cannot be a known property.
const MAX_NAME_LEN: usize = 64;

enum Scan {
    /// Not enough input to decide; wait for more.
    Wait,
    Emit(CssTokenId),
    Exhausted,
}

pub struct CssParser {
    mode: CssParseMode,
    max_property_size: usize,
    input: String,
    pos: usize,
    finished: bool,
    eof_emitted: bool,
    state: State,
    comment_return: State,
    quote: Option<char>,
    paren_depth: u32,
    block_depth: u32,
    in_rule: bool,
    name: String,
    value: String,
    value_truncated: bool,
    value_bad: bool,
    prelude: String,
    prelude_overflow: bool,
    token: CssToken,
    part_id: CssTokenId,
    part_stale: bool,
    part_has_content: bool,
    declarations_begun: bool,
    declarations_ended: bool,
    stats: CssParserStats,
}

impl CssParser {
    pub fn new(mode: CssParseMode, max_property_size: usize) -> Self {
        assert!(max_property_size > 0, "max_property_size must be positive");
        let mut parser = Self {
            mode,
            max_property_size,
            input: String::new(),
            pos: 0,
            finished: false,
            eof_emitted: false,
            state: State::TopLevel,
            comment_return: State::TopLevel,
            quote: None,
            paren_depth: 0,
            block_depth: 0,
            in_rule: false,
            name: String::new(),
            value: String::new(),
            value_truncated: false,
            value_bad: false,
            prelude: String::new(),
            prelude_overflow: false,
            token: CssToken::default(),
            part_id: CssTokenId::None,
            part_stale: true,
            part_has_content: false,
            declarations_begun: false,
            declarations_ended: false,
            stats: CssParserStats::default(),
        };
        parser.reset(mode);
        parser
    }

    /// Reuse the parser for a new input, keeping allocations.
    pub fn reset(&mut self, mode: CssParseMode) {
        self.mode = mode;
        self.input.clear();
        self.pos = 0;
        self.finished = false;
        self.eof_emitted = false;
        self.state = match mode {
            CssParseMode::StyleTag => State::TopLevel,
            CssParseMode::StyleAttribute => State::DeclStart,
        };
        self.comment_return = self.state;
        self.quote = None;
        self.paren_depth = 0;
        self.block_depth = 0;
        self.in_rule = false;
        self.name.clear();
        self.value.clear();
        self.value_truncated = false;
        self.value_bad = false;
        self.prelude.clear();
        self.prelude_overflow = false;
        self.token.reset(CssTokenId::None);
        self.part_id = match mode {
            CssParseMode::StyleTag => CssTokenId::RuleSet,
            CssParseMode::StyleAttribute => CssTokenId::Declarations,
        };
        self.part_stale = true;
        self.part_has_content = false;
        self.declarations_begun = false;
        self.declarations_ended = false;
        self.stats = CssParserStats::default();
    }

    pub fn mode(&self) -> CssParseMode {
        self.mode
    }

    pub fn stats(&self) -> CssParserStats {
        self.stats
    }

    pub fn token(&self) -> &CssToken {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut CssToken {
        &mut self.token
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

    pub fn parse(&mut self) -> CssStep {
        if self.eof_emitted {
            return CssStep::Token(CssTokenId::EndOfFile);
        }
        match self.scan() {
            Scan::Emit(id) => return CssStep::Token(id),
            Scan::Wait | Scan::Exhausted => {}
        }
        if self.finished {
            if let Some(id) = self.finish_pending() {
                return CssStep::Token(id);
            }
            self.eof_emitted = true;
            self.token.reset(CssTokenId::EndOfFile);
            self.part_stale = true;
            return CssStep::Token(CssTokenId::EndOfFile);
        }
        if self.part_has_content {
            return CssStep::Token(self.emit_part(false));
        }
        CssStep::NeedMoreInput
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    /// True when `pattern` cannot yet be ruled in or out at the cursor.
    fn undecided(&self, pattern: &str) -> bool {
        let rest = self.rest();
        !self.finished && rest.len() < pattern.len() && pattern.starts_with(rest)
    }

    fn part(&mut self) -> &mut CssToken {
        if self.part_stale {
            self.token.reset(self.part_id);
            self.part_stale = false;
        }
        &mut self.token
    }

    fn emit_part(&mut self, end: bool) -> CssTokenId {
        let id = self.part_id;
        let begin = match id {
            CssTokenId::Declarations => !std::mem::replace(&mut self.declarations_begun, true),
            _ => false,
        };
        let token = self.part();
        if begin {
            token.parts.insert(CssParts::BEGIN);
        }
        if end {
            token.parts.insert(CssParts::END);
        }
        self.part_stale = true;
        self.part_has_content = false;
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(
            target: "css.parser",
            "emit {:?} parts={:?} properties={}",
            id,
            self.token.parts,
            self.token.properties.len()
        );
        id
    }

    fn emit_at_rule(&mut self) -> CssTokenId {
        self.token.reset(CssTokenId::AtRule);
        self.token.parts.insert(CssParts::BEGIN);
        self.token.parts.insert(CssParts::END);
        self.part_stale = true;
        self.state = State::TopLevel;
        self.stats.at_rules = self.stats.at_rules.saturating_add(1);
        CssTokenId::AtRule
    }

    /// Enter a comment if one starts at the cursor.
    fn try_comment(&mut self, resume: State) -> Option<Scan> {
        if self.undecided("/*") {
            return Some(Scan::Wait);
        }
        if self.rest().starts_with("/*") {
            self.pos += 2;
            self.comment_return = resume;
            self.state = State::Comment;
            return Some(Scan::Exhausted);
        }
        None
    }

    fn scan(&mut self) -> Scan {
        loop {
            let Some(ch) = self.rest().chars().next() else {
                return Scan::Exhausted;
            };
            let step = match self.state {
                State::Comment => self.scan_comment(),
                State::TopLevel => self.scan_top_level(ch),
                State::Prelude => self.scan_prelude(ch),
                State::AtRule | State::SkipBlock => self.scan_at_rule(ch),
                State::DeclStart => self.scan_decl_start(ch),
                State::DeclName => self.scan_decl_name(ch),
                State::AfterName => self.scan_after_name(ch),
                State::DeclValue => self.scan_value(ch),
                State::SkipDecl => self.scan_skip_decl(ch),
            };
            match step {
                None | Some(Scan::Exhausted) => continue,
                Some(done) => return done,
            }
        }
    }

    fn scan_comment(&mut self) -> Option<Scan> {
        let rest = self.rest();
        if let Some(end) = rest.find("*/") {
            self.pos += end + 2;
            self.state = self.comment_return;
            return None;
        }
        let keep = usize::from(rest.ends_with('*') && !self.finished);
        self.pos = self.input.len() - keep;
        Some(Scan::Wait)
    }

    fn scan_top_level(&mut self, ch: char) -> Option<Scan> {
        match ch {
            c if c.is_whitespace() || c == ';' || c == '}' => {
                self.pos += c.len_utf8();
                None
            }
            '/' => self.try_comment(State::TopLevel).or_else(|| {
                self.begin_prelude();
                None
            }),
            '<' => {
                if self.undecided("<!--") {
                    return Some(Scan::Wait);
                }
                if self.rest().starts_with("<!--") {
                    self.pos += 4;
                } else {
                    self.begin_prelude();
                }
                None
            }
            '-' => {
                if self.undecided("-->") {
                    return Some(Scan::Wait);
                }
                if self.rest().starts_with("-->") {
                    self.pos += 3;
                } else {
                    self.begin_prelude();
                }
                None
            }
            '@' => {
                self.pos += 1;
                self.block_depth = 0;
                self.quote = None;
                self.state = State::AtRule;
                None
            }
            _ => {
                self.begin_prelude();
                None
            }
        }
    }

    fn begin_prelude(&mut self) {
        self.prelude.clear();
        self.prelude_overflow = false;
        self.quote = None;
        self.state = State::Prelude;
    }

    /// Shared handling of quotes and escapes in skipped or stored text.
    /// Returns the number of bytes the construct at the cursor spans, or
    /// `Err(())` when more input is needed.
    fn quoted_span(&self, ch: char) -> Result<Option<usize>, ()> {
        if ch == '\\' {
            let mut chars = self.rest().chars();
            chars.next();
            return match chars.next() {
                Some(next) => Ok(Some(1 + next.len_utf8())),
                None if !self.finished => Err(()),
                None => Ok(Some(1)),
            };
        }
        Ok(None)
    }

    fn scan_prelude(&mut self, ch: char) -> Option<Scan> {
        if self.quote.is_none() && ch == '/' {
            if let Some(scan) = self.try_comment(State::Prelude) {
                return Some(scan);
            }
        }
        let span = match self.quoted_span(ch) {
            Err(()) => return Some(Scan::Wait),
            Ok(Some(len)) => len,
            Ok(None) => {
                match (self.quote, ch) {
                    (Some(q), c) if c == q || c == '\n' => self.quote = None,
                    (Some(_), _) => {}
                    (None, '"' | '\'') => self.quote = Some(ch),
                    (None, '{') => {
                        self.pos += 1;
                        self.begin_rule();
                        return None;
                    }
                    (None, _) => {}
                }
                ch.len_utf8()
            }
        };
        let piece = &self.input[self.pos..self.pos + span];
        if self.prelude.len() + piece.len() > self.max_property_size {
            self.prelude_overflow = true;
        } else if !self.prelude_overflow {
            self.prelude.push_str(piece);
        }
        self.pos += span;
        None
    }

    fn begin_rule(&mut self) {
        self.in_rule = true;
        self.state = State::DeclStart;
        self.stats.rule_sets = self.stats.rule_sets.saturating_add(1);
        let prelude = std::mem::take(&mut self.prelude);
        let overflow = self.prelude_overflow;
        let token = self.part();
        token.parts.insert(CssParts::BEGIN);
        if overflow {
            push_invalid_selector(token);
        } else {
            parse_selectors(prelude.trim(), token);
        }
        self.prelude = prelude;
        self.prelude.clear();
        self.part_has_content = true;
    }

    fn scan_at_rule(&mut self, ch: char) -> Option<Scan> {
        if self.quote.is_none() && ch == '/' {
            if let Some(scan) = self.try_comment(self.state) {
                return Some(scan);
            }
        }
        match self.quoted_span(ch) {
            Err(()) => return Some(Scan::Wait),
            Ok(Some(len)) => {
                self.pos += len;
                return None;
            }
            Ok(None) => {}
        }
        self.pos += ch.len_utf8();
        if let Some(q) = self.quote {
            if ch == q || ch == '\n' {
                self.quote = None;
            }
            return None;
        }
        match (self.state, ch) {
            (_, '"' | '\'') => self.quote = Some(ch),
            (State::AtRule, ';') => return Some(Scan::Emit(self.emit_at_rule())),
            (State::AtRule, '{') => {
                self.block_depth = 1;
                self.state = State::SkipBlock;
            }
            (State::AtRule, '}') => return Some(Scan::Emit(self.emit_at_rule())),
            (State::SkipBlock, '{') => self.block_depth += 1,
            (State::SkipBlock, '}') => {
                self.block_depth -= 1;
                if self.block_depth == 0 {
                    return Some(Scan::Emit(self.emit_at_rule()));
                }
            }
            _ => {}
        }
        None
    }

    fn scan_decl_start(&mut self, ch: char) -> Option<Scan> {
        match ch {
            c if c.is_whitespace() || c == ';' => {
                self.pos += c.len_utf8();
                None
            }
            '/' => self.try_comment(State::DeclStart).or_else(|| {
                self.pos += 1;
                self.state = State::SkipDecl;
                None
            }),
            '}' => {
                self.pos += 1;
                if self.mode == CssParseMode::StyleTag {
                    self.in_rule = false;
                    self.state = State::TopLevel;
                    return Some(Scan::Emit(self.emit_part(true)));
                }
                None
            }
            _ => {
                self.name.clear();
                self.state = State::DeclName;
                None
            }
        }
    }

    fn scan_decl_name(&mut self, ch: char) -> Option<Scan> {
        match ch {
            c if c.is_whitespace() => {
                self.state = State::AfterName;
                None
            }
            ':' => {
                self.pos += 1;
                self.begin_value();
                None
            }
            ';' | '}' => {
                self.state = State::DeclStart;
                None
            }
            '/' => self.try_comment(State::AfterName).or_else(|| {
                self.state = State::SkipDecl;
                None
            }),
            '{' | '"' | '\'' => {
                self.state = State::SkipDecl;
                None
            }
            _ => {
                if self.name.len() >= MAX_NAME_LEN {
                    self.state = State::SkipDecl;
                    return None;
                }
                self.name.push(ch);
                self.pos += ch.len_utf8();
                None
            }
        }
    }

    fn scan_after_name(&mut self, ch: char) -> Option<Scan> {
        match ch {
            c if c.is_whitespace() => {
                self.pos += c.len_utf8();
                None
            }
            ':' => {
                self.pos += 1;
                self.begin_value();
                None
            }
            '/' => self.try_comment(State::AfterName).or_else(|| {
                self.state = State::SkipDecl;
                None
            }),
            _ => {
                self.state = State::SkipDecl;
                None
            }
        }
    }

    fn begin_value(&mut self) {
        self.value.clear();
        self.value_truncated = false;
        self.value_bad = false;
        self.quote = None;
        self.paren_depth = 0;
        self.state = State::DeclValue;
    }

    fn push_value(&mut self, span: usize) {
        let piece = &self.input[self.pos..self.pos + span];
        if self.value_truncated || self.value.len() + piece.len() > self.max_property_size {
            self.value_truncated = true;
        } else {
            self.value.push_str(piece);
        }
        self.pos += span;
    }

    fn scan_value(&mut self, ch: char) -> Option<Scan> {
        if self.quote.is_none() && ch == '/' {
            if let Some(scan) = self.try_comment(State::DeclValue) {
                return Some(scan);
            }
        }
        match self.quoted_span(ch) {
            Err(()) => return Some(Scan::Wait),
            Ok(Some(len)) => {
                self.push_value(len);
                return None;
            }
            Ok(None) => {}
        }
        if let Some(q) = self.quote {
            if ch == q {
                self.quote = None;
            } else if ch == '\n' {
                self.quote = None;
                self.value_bad = true;
            }
            self.push_value(ch.len_utf8());
            return None;
        }
        match ch {
            '"' | '\'' => self.quote = Some(ch),
            '(' => self.paren_depth += 1,
            ')' => {
                if self.paren_depth == 0 {
                    self.value_bad = true;
                } else {
                    self.paren_depth -= 1;
                }
            }
            ';' if self.paren_depth == 0 => {
                self.pos += 1;
                self.complete_property();
                return None;
            }
            '}' => {
                self.complete_property();
                return None;
            }
            _ => {}
        }
        self.push_value(ch.len_utf8());
        None
    }

    fn scan_skip_decl(&mut self, ch: char) -> Option<Scan> {
        if self.quote.is_none() && ch == '/' {
            if let Some(scan) = self.try_comment(State::SkipDecl) {
                return Some(scan);
            }
        }
        match self.quoted_span(ch) {
            Err(()) => return Some(Scan::Wait),
            Ok(Some(len)) => {
                self.pos += len;
                return None;
            }
            Ok(None) => {}
        }
        if let Some(q) = self.quote {
            if ch == q || ch == '\n' {
                self.quote = None;
            }
            self.pos += ch.len_utf8();
            return None;
        }
        match ch {
            '"' | '\'' => self.quote = Some(ch),
            ';' => {
                self.pos += 1;
                self.state = State::DeclStart;
                return None;
            }
            '}' => {
                self.state = State::DeclStart;
                return None;
            }
            _ => {}
        }
        self.pos += ch.len_utf8();
        None
    }

    fn complete_property(&mut self) {
        self.state = State::DeclStart;
        let bad = self.value_bad || self.quote.is_some() || self.paren_depth != 0;
        self.quote = None;
        let value = self.value.trim();
        if bad || self.name.is_empty() || value.is_empty() {
            self.stats.discarded_values = self.stats.discarded_values.saturating_add(1);
            #[cfg(any(test, feature = "debug-stats"))]
            log::trace!(target: "css.parser", "discard declaration {:?}", self.name);
            return;
        }
        let name = std::mem::take(&mut self.name);
        let value = self.value.trim().to_string();
        let truncated = self.value_truncated;
        let token = self.part();
        if token.properties.is_full() {
            self.name = name;
            return;
        }
        let mut name_fragment = token.buffer.begin_fragment();
        token.buffer.push_str(&mut name_fragment, &name);
        let mut value_fragment = token.buffer.begin_fragment();
        token.buffer.push_str(&mut value_fragment, &value);
        token.properties.push(CssPropertyEntry {
            name_index: CssProperty::from_name(&name),
            name: name_fragment,
            value: value_fragment,
            truncated,
            deleted: false,
        });
        self.name = name;
        self.name.clear();
        self.part_has_content = true;
        self.stats.properties = self.stats.properties.saturating_add(1);
        if truncated {
            self.stats.truncated_values = self.stats.truncated_values.saturating_add(1);
        }
    }

    /// Close whatever construct end of input interrupted.
    fn finish_pending(&mut self) -> Option<CssTokenId> {
        if self.state == State::Comment {
            self.state = self.comment_return;
        }
        match self.state {
            State::DeclValue => self.complete_property(),
            State::DeclName | State::AfterName | State::SkipDecl => self.state = State::DeclStart,
            State::AtRule | State::SkipBlock => {
                self.state = State::TopLevel;
                return Some(self.emit_at_rule());
            }
            State::Prelude => self.state = State::TopLevel,
            State::TopLevel | State::DeclStart | State::Comment => {}
        }
        let open = match self.mode {
            CssParseMode::StyleTag => std::mem::replace(&mut self.in_rule, false),
            CssParseMode::StyleAttribute => !std::mem::replace(&mut self.declarations_ended, true),
        };
        if open {
            return Some(self.emit_part(true));
        }
        None
    }
}

fn push_invalid_selector(token: &mut CssToken) {
    token.selectors.push(CssSelector {
        name: tools::Fragment::EMPTY,
        class_kind: SelectorClassKind::Invalid,
        class: tools::Fragment::EMPTY,
        combinator: Combinator::None,
        deleted: false,
    });
}

#[derive(Default)]
struct SimpleSelector {
    name: String,
    kind: Option<SelectorClassKind>,
    class: String,
}

impl SimpleSelector {
    fn is_empty(&self) -> bool {
        self.name.is_empty() && self.kind.is_none()
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

/// Read an identifier (with raw escapes) starting at `chars[at]`.
fn read_ident(chars: &[char], mut at: usize, out: &mut String) -> usize {
    while at < chars.len() {
        let ch = chars[at];
        if ch == '\\' && at + 1 < chars.len() {
            out.push(ch);
            out.push(chars[at + 1]);
            at += 2;
        } else if is_ident_char(ch) {
            out.push(ch);
            at += 1;
        } else {
            break;
        }
    }
    at
}

/// Skip a bracketed construct starting at an opening `open`.
fn skip_balanced(chars: &[char], mut at: usize, open: char, close: char) -> usize {
    let mut depth = 0u32;
    while at < chars.len() {
        if chars[at] == open {
            depth += 1;
        } else if chars[at] == close {
            depth -= 1;
            if depth == 0 {
                return at + 1;
            }
        }
        at += 1;
    }
    at
}

fn parse_selectors(text: &str, token: &mut CssToken) {
    let chars: Vec<char> = text.chars().collect();
    let mut entries: Vec<(SimpleSelector, Combinator)> = Vec::new();
    let mut current = SimpleSelector::default();
    let mut pending_space = false;
    let mut i = 0;

    // Finish `current` and link it to what follows with `combinator`.
    let finish = |current: &mut SimpleSelector,
                  entries: &mut Vec<(SimpleSelector, Combinator)>,
                  combinator: Combinator| {
        if current.is_empty() {
            match entries.last_mut() {
                Some((_, last)) if *last == Combinator::Descendant => *last = combinator,
                Some((_, last)) if combinator == Combinator::None && *last == Combinator::None => {}
                _ => {
                    entries.push((
                        SimpleSelector {
                            kind: Some(SelectorClassKind::Invalid),
                            ..SimpleSelector::default()
                        },
                        combinator,
                    ));
                }
            }
            return;
        }
        entries.push((std::mem::take(current), combinator));
    };

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    pending_space = true;
                }
                i += 1;
            }
            ',' => {
                finish(&mut current, &mut entries, Combinator::None);
                pending_space = false;
                i += 1;
            }
            '>' | '+' | '~' => {
                let combinator = match ch {
                    '>' => Combinator::Child,
                    '+' => Combinator::Adjacent,
                    _ => Combinator::Sibling,
                };
                finish(&mut current, &mut entries, combinator);
                pending_space = false;
                i += 1;
            }
            '.' | '#' | ':' => {
                if pending_space {
                    finish(&mut current, &mut entries, Combinator::Descendant);
                    pending_space = false;
                } else if current.kind.is_some() {
                    finish(&mut current, &mut entries, Combinator::Compound);
                }
                let mut at = i + 1;
                let mut class = String::new();
                let kind = match ch {
                    '.' => SelectorClassKind::Class,
                    '#' => SelectorClassKind::Id,
                    _ => {
                        if chars.get(at) == Some(&':') {
                            class.push(':');
                            at += 1;
                        }
                        SelectorClassKind::Pseudo
                    }
                };
                at = read_ident(&chars, at, &mut class);
                let valid = !class.trim_start_matches(':').is_empty() && chars.get(at) != Some(&'(');
                if chars.get(at) == Some(&'(') {
                    at = skip_balanced(&chars, at, '(', ')');
                }
                current.kind = Some(if valid { kind } else { SelectorClassKind::Invalid });
                current.class = class;
                i = at;
            }
            '*' => {
                if pending_space {
                    finish(&mut current, &mut entries, Combinator::Descendant);
                    pending_space = false;
                }
                if !current.is_empty() {
                    current.kind = Some(SelectorClassKind::Invalid);
                }
                current.name.push('*');
                i += 1;
            }
            c if is_ident_char(c) || c == '\\' => {
                if pending_space {
                    finish(&mut current, &mut entries, Combinator::Descendant);
                    pending_space = false;
                }
                if !current.is_empty() {
                    current.kind = Some(SelectorClassKind::Invalid);
                }
                let mut name = String::new();
                i = read_ident(&chars, i, &mut name);
                if name.is_empty() {
                    // Lone trailing backslash.
                    current.kind = Some(SelectorClassKind::Invalid);
                    i += 1;
                }
                current.name.push_str(&name);
            }
            '[' => {
                pending_space = false;
                current.kind = Some(SelectorClassKind::Invalid);
                i = skip_balanced(&chars, i, '[', ']');
            }
            _ => {
                current.kind = Some(SelectorClassKind::Invalid);
                i += 1;
            }
        }
    }
    finish(&mut current, &mut entries, Combinator::None);
    if let Some((_, last)) = entries.last_mut() {
        if *last != Combinator::None {
            // Dangling combinator (`a >`).
            entries.push((
                SimpleSelector {
                    kind: Some(SelectorClassKind::Invalid),
                    ..SimpleSelector::default()
                },
                Combinator::None,
            ));
        }
    }

    for (simple, combinator) in entries {
        if token.selectors.is_full() {
            break;
        }
        let mut name = token.buffer.begin_fragment();
        token.buffer.push_str(&mut name, &simple.name);
        let mut class = token.buffer.begin_fragment();
        token.buffer.push_str(&mut class, &simple.class);
        token.selectors.push(CssSelector {
            name,
            class_kind: simple.kind.unwrap_or(SelectorClassKind::None),
            class,
            combinator,
            deleted: false,
        });
    }
}
