//! HTML-to-HTML conversion engine.
//!
//! The converter pulls tokens from a [`TokenSource`], decides the fate of
//! every tag, attribute and style property from the filter tables, and
//! re-serializes what survives through an [`HtmlWriter`].
//!
//! Level model:
//! - `current_level` counts elements open as far as the converter knows. It
//!   rises at the first part of a start tag and falls when the element
//!   closes (its end tag, or the end of a void start tag).
//! - `drop_level` is the lowest level whose content is suppressed, or
//!   `NOT_DROPPING`. Tags and text at or above it never reach the writer.
//! - `end_tag_actions` records, for open levels whose end tag cannot be
//!   decided from the drop level alone, whether the end tag is dropped and
//!   whether it goes to the callback.
//! - Overlapped close/reopen markers move `current_level` without tokens of
//!   their own. While levels are suspended, closing an element below them
//!   renumbers the stack entries (and the drop level) above it in place.
//!
//! Policy outcomes are never errors. The only failure is an attribute count
//! beyond what a token can index.

mod attributes;
mod callback;
mod style;
mod tags;


use std::sync::Arc;

use css::{CssParseMode, CssParser};

use crate::config::SanitizePolicy;
use crate::error::ConvertError;
use crate::names::TextKind;
use crate::parser::{HtmlParser, ParseStep, TokenSource};
use crate::token::{HtmlToken, HtmlTokenId};
use crate::writer::HtmlWriter;

pub use attributes::AttributeValueSource;
pub use callback::{BufferedAttribute, FilteredValue, TagCallback, TagContext};

const NOT_DROPPING: usize = usize::MAX;

/// Which piece of a partially exposed tag is still in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyPendingState {
    NotPending,
    /// Start tag written up to its attributes; more parts follow.
    TagCopyPending,
    /// Start tag being buffered for the callback.
    TagContentCopyPending,
    /// Streamed (unknown) tag name not yet complete.
    TagNameCopyPending,
    /// Attribute name complete, value not started.
    AttributeCopyPending,
    AttributeNameCopyPending,
    AttributeValueCopyPending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct EndTagAction {
    level: usize,
    drop: bool,
    callback: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConverterStats {
    pub tags_written: u64,
    pub tags_dropped: u64,
    pub attributes_dropped: u64,
    pub urls_rejected: u64,
    pub css_properties_dropped: u64,
    pub css_rules_dropped: u64,
    pub text_bytes_dropped: u64,
    pub callbacks: u64,
}

pub(crate) struct Engine {
    policy: Arc<SanitizePolicy>,
    writer: HtmlWriter,
    style_css: CssParser,
    attr_css: CssParser,
    callback: Option<Box<dyn TagCallback>>,
    current_level: usize,
    drop_level: usize,
    suspended: usize,
    end_tag_actions: Vec<EndTagAction>,
    copy_pending: CopyPendingState,
    trusted_depth: usize,
    raw_written: bool,
    style: style::StyleBlock,
    tag: tags::TagState,
    attr: attributes::AttrState,
    buffered: callback::BufferedTag,
    /// Virtualized attribute values of the current start tag.
    scratch: String,
    stats: ConverterStats,
}

impl Engine {
    fn new(policy: Arc<SanitizePolicy>) -> Self {
        let config = policy.config();
        let writer = HtmlWriter::new(config.max_line_length, config.escape_non_ascii);
        let max_property = config.max_css_property_size;
        Self {
            writer,
            style_css: CssParser::new(CssParseMode::StyleTag, max_property),
            attr_css: CssParser::new(CssParseMode::StyleAttribute, max_property),
            callback: None,
            current_level: 0,
            drop_level: NOT_DROPPING,
            suspended: 0,
            end_tag_actions: Vec::new(),
            copy_pending: CopyPendingState::NotPending,
            trusted_depth: 0,
            raw_written: false,
            style: style::StyleBlock::default(),
            tag: tags::TagState::default(),
            attr: attributes::AttrState::default(),
            buffered: callback::BufferedTag::default(),
            scratch: String::new(),
            stats: ConverterStats::default(),
            policy,
        }
    }

    /// Filter tables apply: filtering is enabled and no trusted injection is
    /// open.
    fn filtering(&self) -> bool {
        self.policy.config().filter_html && self.trusted_depth == 0
    }

    fn dropping(&self) -> bool {
        self.current_level >= self.drop_level
    }

    fn on_token(&mut self, id: HtmlTokenId, token: &HtmlToken) -> Result<(), ConvertError> {
        match id {
            HtmlTokenId::Text => self.on_text(token),
            HtmlTokenId::Tag if token.is_end_tag() => self.on_end_tag(token),
            HtmlTokenId::Tag => self.on_start_tag_part(token)?,
            HtmlTokenId::OverlappedClose => {
                self.assert_between_constructs("overlapped close");
                let levels = token.argument();
                self.current_level = match self.current_level.checked_sub(levels) {
                    Some(level) => level,
                    None => panic!("overlapped close of {levels} levels below level zero"),
                };
                self.suspended += levels;
            }
            HtmlTokenId::OverlappedReopen => {
                self.assert_between_constructs("overlapped reopen");
                let levels = token.argument();
                self.suspended = match self.suspended.checked_sub(levels) {
                    Some(rest) => rest,
                    None => panic!("overlapped reopen of {levels} levels that were never closed"),
                };
                self.current_level += levels;
            }
            HtmlTokenId::InjectionBegin => self.trusted_depth += 1,
            HtmlTokenId::InjectionEnd => {
                assert!(self.trusted_depth > 0, "injection end without injection begin");
                self.trusted_depth -= 1;
            }
            HtmlTokenId::Restart => self.restart(),
            HtmlTokenId::EncodingChange => {
                log::debug!(target: "html.converter", "input encoding changed; output continues")
            }
            HtmlTokenId::EndOfFile => self.on_end_of_file(),
            HtmlTokenId::None => {}
        }
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(
            target: "html.converter",
            "{id:?}: level={} drop={} suspended={} pending={:?}",
            self.current_level,
            self.drop_level,
            self.suspended,
            self.copy_pending
        );
        Ok(())
    }

    fn assert_between_constructs(&self, what: &str) {
        assert_eq!(
            self.copy_pending,
            CopyPendingState::NotPending,
            "{what} while a start tag is pending"
        );
    }

    fn on_text(&mut self, token: &HtmlToken) {
        self.assert_between_constructs("text");
        let buffer = token.buffer();
        if self.dropping() {
            self.stats.text_bytes_dropped += buffer.len_of(token.text()) as u64;
            return;
        }
        if self.style.active {
            for run in buffer.runs_of(token.text()) {
                self.feed_style_text(run);
            }
            return;
        }
        if self.raw_written && token.text_kind() == TextKind::RawText {
            for run in buffer.runs_of(token.text()) {
                self.writer.write_raw_text(run);
            }
            return;
        }
        buffer
            .reader(token.text())
            .write_to(&mut self.writer.text_sink());
    }

    fn on_end_of_file(&mut self) {
        self.assert_between_constructs("end of file");
        if self.style.active {
            self.finish_style_block();
        }
        log::debug!(
            target: "html.converter",
            "done: {} tags written, {} dropped, {} attributes dropped, {} urls rejected",
            self.stats.tags_written,
            self.stats.tags_dropped,
            self.stats.attributes_dropped,
            self.stats.urls_rejected
        );
    }

    fn restart(&mut self) {
        log::debug!(target: "html.converter", "restart: discarding {} bytes of output", self.writer.output().len());
        self.writer.clear();
        self.current_level = 0;
        self.drop_level = NOT_DROPPING;
        self.suspended = 0;
        self.end_tag_actions.clear();
        self.copy_pending = CopyPendingState::NotPending;
        self.trusted_depth = 0;
        self.raw_written = false;
        self.style = style::StyleBlock::default();
        self.scratch.clear();
    }

    /// Close the element at `level`, which must be the innermost open one.
    fn close_level(&mut self, level: usize) {
        debug_assert_eq!(level, self.current_level);
        if let Some(pos) = self.end_tag_actions.iter().rposition(|a| a.level == level) {
            self.end_tag_actions.remove(pos);
        }
        // Suspended levels above slide down into the closed slot.
        for action in &mut self.end_tag_actions {
            if action.level > level {
                action.level -= 1;
            }
        }
        self.current_level = level - 1;
        if self.drop_level == level {
            if self.suspended == 0 {
                self.drop_level = NOT_DROPPING;
            }
        } else if self.drop_level != NOT_DROPPING && self.drop_level > level {
            self.drop_level -= 1;
        }
    }
}

/// Streaming sanitizer over a token source (by default the incremental
/// [`HtmlParser`]).
pub struct HtmlToHtmlConverter<S: TokenSource = HtmlParser> {
    source: S,
    engine: Engine,
    done: bool,
}

impl HtmlToHtmlConverter<HtmlParser> {
    pub fn new(policy: Arc<SanitizePolicy>) -> Self {
        Self::with_source(HtmlParser::new(), policy)
    }
}

impl<S: TokenSource> HtmlToHtmlConverter<S> {
    pub fn with_source(source: S, policy: Arc<SanitizePolicy>) -> Self {
        Self {
            source,
            engine: Engine::new(policy),
            done: false,
        }
    }

    /// Route tags whose filter action carries `CALLBACK` to `callback`.
    pub fn set_callback<C: TagCallback + 'static>(&mut self, callback: C) {
        self.engine.callback = Some(Box::new(callback));
    }

    pub fn policy(&self) -> &SanitizePolicy {
        &self.engine.policy
    }

    pub fn stats(&self) -> ConverterStats {
        self.engine.stats
    }

    pub fn is_finished(&self) -> bool {
        self.done
    }

    /// Feed decoded input and convert as much of it as possible.
    pub fn push_str(&mut self, text: &str) -> Result<(), ConvertError> {
        self.source.push_str(text);
        self.pump()
    }

    /// Mark the end of input and convert the remainder.
    pub fn finish(&mut self) -> Result<(), ConvertError> {
        self.source.finish();
        self.pump()
    }

    /// Output produced since the last call.
    pub fn take_output(&mut self) -> String {
        self.engine.writer.take_output()
    }

    fn pump(&mut self) -> Result<(), ConvertError> {
        while !self.done {
            match self.source.parse()? {
                ParseStep::NeedMoreInput => break,
                ParseStep::Token(id) => {
                    self.engine.on_token(id, self.source.token())?;
                    self.done = id == HtmlTokenId::EndOfFile;
                }
            }
        }
        Ok(())
    }
}

/// Sanitize a complete document in one call.
pub fn sanitize(input: &str, policy: &Arc<SanitizePolicy>) -> Result<String, ConvertError> {
    let mut converter = HtmlToHtmlConverter::new(Arc::clone(policy));
    converter.push_str(input)?;
    converter.finish()?;
    Ok(converter.take_output())
}
