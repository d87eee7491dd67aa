//! Attribute filtering and virtualization.
//!
//! Plain kept attributes stream straight to the writer. Every attribute that
//! needs its whole value before a decision (URLs, prefixed names, style,
//! `bgcolor`, `http-equiv`, unknown names) is accumulated, resolved into an
//! [`AttributeValueSource`], and written (or buffered for the callback) when
//! its last part arrives.

use std::ops::Range;

use tools::entries::MAX_ENTRIES;
use tools::{Fragment, TokenBuffer};

use crate::error::ConvertError;
use crate::filter::{self, BaseAction, FilterAction};
use crate::names::HtmlName;
use crate::token::{AttrParts, HtmlAttribute, HtmlToken};
use crate::url::{UrlCheck, accept_inconclusive, check_url};

use super::callback::{BufferedAttribute, FilteredValue};
use super::style::filter_style_attribute;
use super::tags::TagMode;
use super::{CopyPendingState, Engine};

/// Where the written value of an attribute comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeValueSource {
    /// The original (decoded) value.
    PassThrough,
    /// A rewritten value in the converter's scratch buffer.
    Virtual(Range<usize>),
    /// Keep the attribute with `=""`.
    EmptyValue,
    /// Keep the attribute name without a value.
    NameOnly,
    /// Declarations merged into the tag's `style` attribute.
    FilteredStyle(Range<usize>),
    Omitted,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) enum AttrMode {
    #[default]
    Skip,
    Stream,
    Accumulate,
}

/// Longest attribute name accumulated for an unknown attribute.
const MAX_ATTRIBUTE_NAME: usize = 256;

/// `http-equiv` values that cannot redirect or script the page.
const BENIGN_HTTP_EQUIV: &[&str] = &["content-type", "content-language", "content-style-type"];

#[derive(Debug)]
pub(super) struct AttrState {
    pub(super) index: HtmlName,
    pub(super) action: FilterAction,
    pub(super) mode: AttrMode,
    pub(super) name: String,
    pub(super) name_ended: bool,
    pub(super) value: String,
    pub(super) has_value: bool,
    pub(super) truncated: bool,
    /// Bytes of value already streamed.
    pub(super) written: usize,
}

impl Default for AttrState {
    fn default() -> Self {
        Self {
            index: HtmlName::Unknown,
            action: FilterAction::new(BaseAction::Drop),
            mode: AttrMode::Skip,
            name: String::new(),
            name_ended: false,
            value: String::new(),
            has_value: false,
            truncated: false,
            written: 0,
        }
    }
}

/// Names the writer can emit without breaking the tag apart.
fn is_writable_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_ATTRIBUTE_NAME
        && !name
            .chars()
            .any(|c| matches!(c, '"' | '\'' | '<' | '>' | '=' | '/' | '`') || c.is_control() || c.is_whitespace())
}

fn is_benign_http_equiv(value: &str) -> bool {
    let value = value.trim();
    BENIGN_HTTP_EQUIV
        .iter()
        .any(|benign| value.eq_ignore_ascii_case(benign))
}

fn is_plain_color(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '#')
}

impl Engine {
    fn attribute_action_for(&self, index: HtmlName) -> FilterAction {
        if !self.filtering() {
            return FilterAction::new(BaseAction::Keep);
        }
        if index.is_unknown() {
            return FilterAction::new(BaseAction::Drop);
        }
        filter::attribute_action(self.tag.name, self.tag.action, index, self.policy.output_mode())
    }

    /// Value cap while accumulating.
    fn accumulate_cap(&self) -> usize {
        let config = self.policy.config();
        if self.tag.mode == TagMode::Buffer && !config.truncate_for_callback {
            usize::MAX
        } else {
            config.max_attribute_size
        }
    }

    fn begin_attribute(&mut self, index: HtmlName) {
        let action = self.attribute_action_for(index);
        let mode = match (self.tag.mode, action.base()) {
            (TagMode::Skip, _) => AttrMode::Skip,
            (TagMode::Buffer, _) => AttrMode::Accumulate,
            (_, BaseAction::Drop) => AttrMode::Skip,
            (_, BaseAction::Keep) if !index.is_unknown() => AttrMode::Stream,
            _ => AttrMode::Accumulate,
        };
        let attr = &mut self.attr;
        attr.index = index;
        attr.action = action;
        attr.mode = mode;
        attr.name.clear();
        attr.name_ended = false;
        attr.value.clear();
        attr.has_value = false;
        attr.truncated = false;
        attr.written = 0;
    }

    pub(super) fn on_attribute(
        &mut self,
        token: &HtmlToken,
        attr: &HtmlAttribute,
    ) -> Result<(), ConvertError> {
        let buffer = token.buffer();
        let parts = attr.parts;
        if parts.is_begin() {
            self.begin_attribute(attr.name_index);
        } else {
            assert!(
                self.attribute_in_flight(),
                "attribute continued with nothing pending"
            );
        }
        if parts.contains(AttrParts::NAME_END) {
            self.attr.name_ended = true;
        }
        let value_begins = parts.contains(AttrParts::VALUE_BEGIN);
        if value_begins {
            self.attr.has_value = true;
        }

        match self.attr.mode {
            AttrMode::Skip => {}
            AttrMode::Stream => {
                if parts.is_begin() {
                    self.writer.write_attribute_name(self.attr.index.as_str());
                }
                if value_begins {
                    self.writer.write_attribute_value("");
                }
                if parts.has_value() {
                    self.stream_value(buffer, attr.value);
                }
            }
            AttrMode::Accumulate => {
                if self.inspect_complete_http_equiv(buffer, attr) {
                    self.copy_pending = self.tag_pending_state();
                    return Ok(());
                }
                if parts.has_name() {
                    let room = MAX_ATTRIBUTE_NAME.saturating_sub(self.attr.name.len()) + 1;
                    let (text, _) = buffer.reader(attr.name).get_string(room);
                    self.attr.name.push_str(&text);
                }
                if parts.has_value() {
                    let room = self.accumulate_cap().saturating_sub(self.attr.value.len());
                    let (text, cut) = buffer.reader(attr.value).get_string(room);
                    self.attr.value.push_str(&text);
                    self.note_truncation(cut);
                }
            }
        }

        if parts.is_end() {
            self.end_attribute()?;
            self.copy_pending = self.tag_pending_state();
        } else {
            self.copy_pending = if self.attr.has_value {
                CopyPendingState::AttributeValueCopyPending
            } else if !self.attr.name_ended {
                CopyPendingState::AttributeNameCopyPending
            } else {
                CopyPendingState::AttributeCopyPending
            };
        }
        Ok(())
    }

    fn note_truncation(&mut self, cut: bool) {
        if cut && !self.attr.truncated {
            log::debug!(
                target: "html.converter",
                "attribute {} truncated at {} bytes",
                self.attr.index.as_str(),
                self.policy.config().max_attribute_size
            );
        }
        self.attr.truncated |= cut;
    }

    fn stream_value(&mut self, buffer: &TokenBuffer, value: Fragment) {
        let room = self
            .policy
            .config()
            .max_attribute_size
            .saturating_sub(self.attr.written);
        let len = buffer.len_of(value);
        if len <= room {
            buffer
                .reader(value)
                .write_to(&mut self.writer.attribute_value_sink());
            self.attr.written += len;
        } else {
            let (text, _) = buffer.reader(value).get_string(room);
            self.writer.write_attribute_value(&text);
            self.attr.written += text.len();
            self.note_truncation(true);
        }
    }

    /// `http-equiv` seen whole in one part: inspect it, rewind, copy.
    fn inspect_complete_http_equiv(&mut self, buffer: &TokenBuffer, attr: &HtmlAttribute) -> bool {
        let complete = attr.parts.is_begin() && attr.parts.is_end();
        if self.attr.action.base() != BaseAction::CheckContent
            || self.tag.mode != TagMode::Write
            || !complete
            || buffer.len_of(attr.value) > self.accumulate_cap()
        {
            return false;
        }
        let mut reader = buffer.reader(attr.value);
        let (value, _) = reader.get_string(self.accumulate_cap());
        if self.attr.has_value && is_benign_http_equiv(&value) {
            reader.rewind();
            self.writer.write_attribute_name(self.attr.index.as_str());
            self.writer.write_attribute_value("");
            reader.write_to(&mut self.writer.attribute_value_sink());
            self.writer.end_attribute();
        } else {
            self.stats.attributes_dropped += 1;
            log::debug!(target: "html.converter", "http-equiv {value:?} removed");
        }
        true
    }

    fn end_attribute(&mut self) -> Result<(), ConvertError> {
        match self.attr.mode {
            AttrMode::Skip => {
                if self.tag.mode != TagMode::Skip {
                    self.stats.attributes_dropped += 1;
                }
            }
            AttrMode::Stream => self.writer.end_attribute(),
            AttrMode::Accumulate => {
                let source = self.resolve_attribute();
                if self.tag.mode == TagMode::Buffer {
                    self.buffer_attribute(source)?;
                } else {
                    self.write_attribute_source(source);
                }
            }
        }
        Ok(())
    }

    fn push_scratch(&mut self, text: &str) -> Range<usize> {
        let start = self.scratch.len();
        self.scratch.push_str(text);
        start..self.scratch.len()
    }

    /// Decide the written form of the accumulated attribute.
    fn resolve_attribute(&mut self) -> AttributeValueSource {
        if self.attr.index.is_unknown() && !is_writable_attribute_name(&self.attr.name) {
            return AttributeValueSource::Omitted;
        }
        match self.attr.action.base() {
            BaseAction::Keep => {
                if self.attr.has_value {
                    AttributeValueSource::PassThrough
                } else {
                    AttributeValueSource::NameOnly
                }
            }
            BaseAction::SanitizeUrl => self.resolve_url(),
            BaseAction::PrefixName => {
                let prefix = self.policy.name_prefix();
                if !self.attr.has_value {
                    AttributeValueSource::NameOnly
                } else if self.attr.value.is_empty() || self.attr.value.starts_with(prefix) {
                    AttributeValueSource::PassThrough
                } else {
                    let prefixed = format!("{prefix}{}", self.attr.value);
                    AttributeValueSource::Virtual(self.push_scratch(&prefixed))
                }
            }
            BaseAction::PrefixNameList => {
                if !self.attr.has_value {
                    return AttributeValueSource::NameOnly;
                }
                let prefix = self.policy.name_prefix();
                let mut list = String::with_capacity(self.attr.value.len() + prefix.len());
                for name in self.attr.value.split_ascii_whitespace() {
                    if !list.is_empty() {
                        list.push(' ');
                    }
                    if !name.starts_with(prefix) {
                        list.push_str(prefix);
                    }
                    list.push_str(name);
                }
                if list.is_empty() {
                    AttributeValueSource::EmptyValue
                } else {
                    AttributeValueSource::Virtual(self.push_scratch(&list))
                }
            }
            BaseAction::FilterStyleAttribute => {
                let (filtered, dropped) = filter_style_attribute(
                    &mut self.attr_css,
                    &self.policy,
                    &self.attr.value,
                    self.attr.truncated,
                );
                self.stats.css_properties_dropped += dropped;
                if filtered.is_empty() {
                    AttributeValueSource::Omitted
                } else {
                    AttributeValueSource::FilteredStyle(self.push_scratch(&filtered))
                }
            }
            BaseAction::ConvertBgcolorIntoStyle => {
                let color = self.attr.value.trim();
                if self.attr.truncated || !is_plain_color(color) {
                    return AttributeValueSource::Omitted;
                }
                let declaration = format!("background-color:{color}");
                AttributeValueSource::FilteredStyle(self.push_scratch(&declaration))
            }
            BaseAction::CheckContent => {
                if self.attr.has_value && !self.attr.truncated && is_benign_http_equiv(&self.attr.value) {
                    AttributeValueSource::PassThrough
                } else {
                    AttributeValueSource::Omitted
                }
            }
            BaseAction::Drop | BaseAction::DropKeepContent | BaseAction::KeepDropContent => {
                AttributeValueSource::Omitted
            }
        }
    }

    fn resolve_url(&mut self) -> AttributeValueSource {
        if !self.attr.has_value {
            return AttributeValueSource::Omitted;
        }
        let truncated =
            self.attr.truncated || self.attr.value.len() > self.policy.config().max_attribute_size;
        if truncated {
            self.stats.urls_rejected += 1;
            return AttributeValueSource::Omitted;
        }
        let callback_requested = self.callback.is_some()
            && self.attr.action.has_callback()
            && self.tag.action.has_callback()
            && !self.tag.action.has(FilterAction::IGNORE_ATTR_CALLBACKS);
        match check_url(&self.attr.value, callback_requested, &self.policy) {
            UrlCheck::Safe => AttributeValueSource::PassThrough,
            UrlCheck::LocalHyperlink => {
                let prefix = self.policy.name_prefix();
                let anchor = &self.attr.value[1..];
                if !self.policy.is_fragment() || anchor.is_empty() || anchor.starts_with(prefix) {
                    AttributeValueSource::PassThrough
                } else {
                    let rewritten = format!("#{prefix}{anchor}");
                    AttributeValueSource::Virtual(self.push_scratch(&rewritten))
                }
            }
            UrlCheck::Inconclusive => {
                if accept_inconclusive(&self.attr.value, false, &self.policy) {
                    AttributeValueSource::PassThrough
                } else {
                    self.stats.urls_rejected += 1;
                    AttributeValueSource::Omitted
                }
            }
            UrlCheck::Unsafe => {
                self.stats.urls_rejected += 1;
                log::debug!(
                    target: "html.converter",
                    "unsafe url in {} emptied",
                    self.attr.index.as_str()
                );
                AttributeValueSource::EmptyValue
            }
        }
    }

    fn write_attribute_source(&mut self, source: AttributeValueSource) {
        let name: &str = if self.attr.index.is_unknown() {
            &self.attr.name
        } else {
            self.attr.index.as_str()
        };
        match source {
            AttributeValueSource::PassThrough => {
                self.writer.write_attribute(name, Some(&self.attr.value))
            }
            AttributeValueSource::Virtual(range) => {
                self.writer.write_attribute(name, Some(&self.scratch[range]))
            }
            AttributeValueSource::EmptyValue => self.writer.write_attribute(name, Some("")),
            AttributeValueSource::NameOnly => self.writer.write_attribute(name, None),
            AttributeValueSource::FilteredStyle(range) => self.tag.styles.push(range),
            AttributeValueSource::Omitted => self.stats.attributes_dropped += 1,
        }
    }

    fn buffer_attribute(&mut self, source: AttributeValueSource) -> Result<(), ConvertError> {
        if self.buffered.attributes.len() >= MAX_ENTRIES {
            return Err(ConvertError::TooManyAttributes { limit: MAX_ENTRIES });
        }
        let filtered = match source {
            AttributeValueSource::PassThrough => FilteredValue::Value(self.attr.value.clone()),
            AttributeValueSource::Virtual(range) => {
                FilteredValue::Value(self.scratch[range].to_string())
            }
            AttributeValueSource::EmptyValue => FilteredValue::Value(String::new()),
            AttributeValueSource::NameOnly => FilteredValue::NameOnly,
            AttributeValueSource::FilteredStyle(range) => {
                FilteredValue::Style(self.scratch[range].to_string())
            }
            AttributeValueSource::Omitted => FilteredValue::Omitted,
        };
        let name = if self.attr.index.is_unknown() {
            self.attr.name.clone()
        } else {
            self.attr.index.as_str().to_string()
        };
        self.buffered.attributes.push(BufferedAttribute {
            index: self.attr.index,
            name,
            original: self.attr.has_value.then(|| self.attr.value.clone()),
            truncated: self.attr.truncated,
            filtered,
        });
        Ok(())
    }
}
