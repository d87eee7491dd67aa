//! Tag callback surface.
//!
//! Tags whose filter action carries `CALLBACK` are buffered whole (name and
//! every attribute, already resolved against the policy) and handed to the
//! registered [`TagCallback`]. The callback may write the tag as filtered,
//! rewrite it attribute by attribute, or delete it, and may ask to see the
//! matching end tag.

use crate::names::HtmlName;
use crate::writer::HtmlWriter;

/// Policy-approved form of a buffered attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilteredValue {
    /// The policy removes the attribute.
    Omitted,
    NameOnly,
    Value(String),
    /// Declarations destined for the merged `style` attribute.
    Style(String),
}

#[derive(Clone, Debug)]
pub struct BufferedAttribute {
    pub(super) index: HtmlName,
    pub(super) name: String,
    pub(super) original: Option<String>,
    pub(super) truncated: bool,
    pub(super) filtered: FilteredValue,
}

impl BufferedAttribute {
    pub fn index(&self) -> HtmlName {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decoded value as it appeared in the input; `None` for a bare name.
    pub fn original_value(&self) -> Option<&str> {
        self.original.as_deref()
    }

    pub fn filtered(&self) -> &FilteredValue {
        &self.filtered
    }

    /// Value the policy would write, if any.
    pub fn filtered_value(&self) -> Option<&str> {
        match &self.filtered {
            FilteredValue::Value(value) | FilteredValue::Style(value) => Some(value),
            FilteredValue::Omitted | FilteredValue::NameOnly => None,
        }
    }

    /// The original value was capped at `max_attribute_size`.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

#[derive(Debug)]
pub(super) struct BufferedTag {
    pub(super) tag: HtmlName,
    pub(super) name: String,
    pub(super) is_end_tag: bool,
    pub(super) level: usize,
    pub(super) attributes: Vec<BufferedAttribute>,
}

impl Default for BufferedTag {
    fn default() -> Self {
        Self {
            tag: HtmlName::Unknown,
            name: String::new(),
            is_end_tag: false,
            level: 0,
            attributes: Vec::new(),
        }
    }
}

impl BufferedTag {
    pub(super) fn reset(&mut self, tag: HtmlName, name: &str, is_end_tag: bool, level: usize) {
        self.tag = tag;
        self.name.clear();
        self.name.push_str(name);
        self.is_end_tag = is_end_tag;
        self.level = level;
        self.attributes.clear();
    }

    /// Write the tag begin and, if asked, its filtered attributes. The caller
    /// closes the tag.
    pub(super) fn write_tag(&self, writer: &mut HtmlWriter, copy_attributes: bool) {
        let block = self.tag.is_block();
        writer.write_tag_begin(self.tag, &self.name, self.is_end_tag, block, block);
        if !copy_attributes || self.is_end_tag {
            return;
        }
        let mut style = String::new();
        for attr in &self.attributes {
            match &attr.filtered {
                FilteredValue::Omitted => {}
                FilteredValue::NameOnly => writer.write_attribute(&attr.name, None),
                FilteredValue::Value(value) => writer.write_attribute(&attr.name, Some(value)),
                FilteredValue::Style(declarations) => {
                    if !style.is_empty() {
                        style.push(';');
                    }
                    style.push_str(declarations);
                }
            }
        }
        if !style.is_empty() {
            writer.write_attribute("style", Some(&style));
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(super) struct CallbackOutcome {
    pub(super) written: bool,
    pub(super) deleted: bool,
    pub(super) delete_inner_content: bool,
    pub(super) delete_end_tag: bool,
    pub(super) end_tag_callback: bool,
}

/// View of the buffered tag handed to a [`TagCallback`].
///
/// If the callback neither writes nor deletes the tag, the converter writes
/// it as the policy filtered it.
pub struct TagContext<'a> {
    tag: &'a BufferedTag,
    outcome: CallbackOutcome,
}

impl<'a> TagContext<'a> {
    pub(super) fn new(tag: &'a BufferedTag) -> Self {
        Self {
            tag,
            outcome: CallbackOutcome::default(),
        }
    }

    pub fn tag(&self) -> HtmlName {
        self.tag.tag
    }

    /// Lowercased tag name as written.
    pub fn tag_name(&self) -> &str {
        &self.tag.name
    }

    pub fn is_end_tag(&self) -> bool {
        self.tag.is_end_tag
    }

    pub fn level(&self) -> usize {
        self.tag.level
    }

    pub fn attribute_count(&self) -> usize {
        self.tag.attributes.len()
    }

    pub fn attribute(&self, index: usize) -> &'a BufferedAttribute {
        &self.tag.attributes[index]
    }

    pub fn attributes(&self) -> impl Iterator<Item = &'a BufferedAttribute> + 'a {
        self.tag.attributes.iter()
    }

    pub fn find_attribute(&self, index: HtmlName) -> Option<&'a BufferedAttribute> {
        self.tag.attributes.iter().find(|attr| attr.index == index)
    }

    /// Write the tag begin, optionally followed by every attribute the policy
    /// keeps. More attributes may be added before the callback returns.
    pub fn write_tag(&mut self, writer: &mut HtmlWriter, copy_attributes: bool) {
        assert!(!self.outcome.written, "tag written twice by callback");
        assert!(!self.outcome.deleted, "tag written after it was deleted");
        self.tag.write_tag(writer, copy_attributes);
        self.outcome.written = true;
    }

    /// Write attribute `index` as the policy filtered it.
    pub fn write_attribute(&mut self, writer: &mut HtmlWriter, index: usize) {
        assert!(self.outcome.written, "attribute written before the tag");
        let attr = &self.tag.attributes[index];
        match &attr.filtered {
            FilteredValue::Omitted => {}
            FilteredValue::NameOnly => writer.write_attribute(&attr.name, None),
            FilteredValue::Value(value) => writer.write_attribute(&attr.name, Some(value)),
            FilteredValue::Style(value) => writer.write_attribute("style", Some(value)),
        }
    }

    /// Write an attribute of the callback's choosing. The value is escaped
    /// but not filtered.
    pub fn write_custom_attribute(&mut self, writer: &mut HtmlWriter, name: &str, value: Option<&str>) {
        assert!(self.outcome.written, "attribute written before the tag");
        writer.write_attribute(name, value);
    }

    /// Drop the tag. Its content is kept unless `delete_inner_content` is
    /// also called.
    pub fn delete_tag(&mut self) {
        assert!(!self.outcome.written, "tag deleted after it was written");
        self.outcome.deleted = true;
    }

    pub fn delete_inner_content(&mut self) {
        self.outcome.delete_inner_content = true;
    }

    pub fn delete_end_tag(&mut self) {
        self.outcome.delete_end_tag = true;
    }

    /// Route the matching end tag to the callback as well.
    pub fn invoke_callback_for_end_tag(&mut self) {
        self.outcome.end_tag_callback = true;
    }

    pub(super) fn outcome(&self) -> CallbackOutcome {
        self.outcome
    }
}

/// Receives tags routed by the filter tables.
pub trait TagCallback {
    fn on_tag(&mut self, context: &mut TagContext<'_>, writer: &mut HtmlWriter);
}

impl<F> TagCallback for F
where
    F: FnMut(&mut TagContext<'_>, &mut HtmlWriter),
{
    fn on_tag(&mut self, context: &mut TagContext<'_>, writer: &mut HtmlWriter) {
        self(context, writer)
    }
}
