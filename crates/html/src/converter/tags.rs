use std::ops::Range;

use crate::error::ConvertError;
use crate::filter::{self, BaseAction, FilterAction};
use crate::names::{HtmlName, TextKind};
use crate::token::{HtmlToken, TagParts};

use super::callback::TagContext;
use super::{CopyPendingState, Engine, EndTagAction};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) enum TagMode {
    /// Markup is not written; attributes are ignored.
    #[default]
    Skip,
    Write,
    /// Buffered whole for the tag callback.
    Buffer,
}

#[derive(Debug)]
pub(super) struct TagState {
    pub(super) name: HtmlName,
    pub(super) action: FilterAction,
    pub(super) mode: TagMode,
    pub(super) level: usize,
    pub(super) name_complete: bool,
    /// Filtered style declarations (scratch ranges) merged into one `style`
    /// attribute at the end of the tag.
    pub(super) styles: Vec<Range<usize>>,
}

impl Default for TagState {
    fn default() -> Self {
        Self {
            name: HtmlName::Unknown,
            action: FilterAction::new(BaseAction::Drop),
            mode: TagMode::Skip,
            level: 0,
            name_complete: false,
            styles: Vec::new(),
        }
    }
}

impl Engine {
    fn tag_action_for(&self, tag: HtmlName) -> FilterAction {
        let table = filter::tag_action(tag, self.policy.output_mode());
        if self.filtering() {
            return table;
        }
        let keep = FilterAction::new(BaseAction::Keep);
        if self.trusted_depth == 0 && table.has_callback() {
            keep.with(FilterAction::CALLBACK)
        } else {
            keep
        }
    }

    /// Pending state to record when a start tag part ends between
    /// attributes.
    pub(super) fn tag_pending_state(&self) -> CopyPendingState {
        match self.tag.mode {
            TagMode::Buffer => CopyPendingState::TagContentCopyPending,
            _ if !self.tag.name_complete => CopyPendingState::TagNameCopyPending,
            _ => CopyPendingState::TagCopyPending,
        }
    }

    pub(super) fn attribute_in_flight(&self) -> bool {
        matches!(
            self.copy_pending,
            CopyPendingState::AttributeCopyPending
                | CopyPendingState::AttributeNameCopyPending
                | CopyPendingState::AttributeValueCopyPending
        )
    }

    pub(super) fn on_start_tag_part(&mut self, token: &HtmlToken) -> Result<(), ConvertError> {
        let parts = token.tag_parts();
        if parts.is_begin() {
            self.begin_start_tag(token);
        } else {
            assert_ne!(
                self.copy_pending,
                CopyPendingState::NotPending,
                "start tag continued with nothing pending"
            );
            if parts.contains(TagParts::NAME) {
                self.continue_tag_name(token);
            }
        }
        if parts.contains(TagParts::NAME_COMPLETE) {
            self.tag.name_complete = true;
        }
        if !self.attribute_in_flight() {
            self.copy_pending = self.tag_pending_state();
        }

        for attr in token.attributes().iter() {
            self.on_attribute(token, attr)?;
        }

        if parts.is_end() {
            self.end_start_tag();
        }
        Ok(())
    }

    fn begin_start_tag(&mut self, token: &HtmlToken) {
        assert_eq!(
            self.copy_pending,
            CopyPendingState::NotPending,
            "start tag began while another tag is pending"
        );
        self.current_level += 1;
        self.scratch.clear();

        let tag = token.tag();
        let level = self.current_level;
        let dropping = self.dropping();
        let action = self.tag_action_for(tag);
        let mode = if dropping {
            TagMode::Skip
        } else if action.has_callback() && self.callback.is_some() {
            TagMode::Buffer
        } else {
            match action.base() {
                BaseAction::Drop | BaseAction::DropKeepContent => TagMode::Skip,
                _ => TagMode::Write,
            }
        };
        self.tag.name = tag;
        self.tag.action = action;
        self.tag.mode = mode;
        self.tag.level = level;
        self.tag.name_complete = false;
        self.tag.styles.clear();

        match mode {
            TagMode::Skip if dropping => {}
            TagMode::Skip => {
                self.stats.tags_dropped += 1;
                if action.base() == BaseAction::Drop {
                    self.drop_level = level;
                    log::debug!(target: "html.converter", "dropping <{}> and its content", token.name_string());
                } else {
                    self.end_tag_actions.push(EndTagAction {
                        level,
                        drop: true,
                        callback: false,
                    });
                }
            }
            TagMode::Write => {
                let block = tag.is_block();
                let name = token.name_string();
                self.writer.write_tag_begin(tag, &name, false, block, block);
            }
            TagMode::Buffer => {
                self.buffered.reset(tag, &token.name_string(), false, level);
            }
        }
    }

    fn continue_tag_name(&mut self, token: &HtmlToken) {
        let buffer = token.buffer();
        match self.tag.mode {
            TagMode::Skip => {}
            TagMode::Write => {
                for run in buffer.runs_of(token.name()) {
                    self.writer.write_tag_name_continue(run);
                }
            }
            TagMode::Buffer => {
                for run in buffer.runs_of(token.name()) {
                    self.buffered.name.push_str(run);
                }
            }
        }
    }

    fn end_start_tag(&mut self) {
        assert!(
            matches!(
                self.copy_pending,
                CopyPendingState::TagCopyPending
                    | CopyPendingState::TagContentCopyPending
                    | CopyPendingState::TagNameCopyPending
            ),
            "start tag ended inside an attribute"
        );
        match self.tag.mode {
            TagMode::Skip => {}
            TagMode::Write => {
                self.flush_pending_style();
                self.writer.write_tag_end();
                self.stats.tags_written += 1;
                self.after_start_tag_written(self.tag.action.base());
            }
            TagMode::Buffer => self.invoke_start_callback(),
        }
        self.copy_pending = CopyPendingState::NotPending;
        if self.tag.name.is_void() {
            self.close_level(self.tag.level);
        }
    }

    /// Level bookkeeping for a start tag that reached the output.
    fn after_start_tag_written(&mut self, base: BaseAction) {
        let level = self.tag.level;
        if base == BaseAction::KeepDropContent {
            self.drop_level = level;
            self.end_tag_actions.push(EndTagAction {
                level,
                drop: false,
                callback: false,
            });
        }
        if self.tag.name == HtmlName::Style && self.filtering() {
            self.begin_style_block();
        } else if self.tag.name.text_kind() == TextKind::RawText {
            self.raw_written = true;
        }
    }

    fn flush_pending_style(&mut self) {
        if self.tag.styles.is_empty() {
            return;
        }
        let mut merged = String::new();
        for range in self.tag.styles.drain(..) {
            if !merged.is_empty() {
                merged.push(';');
            }
            merged.push_str(&self.scratch[range]);
        }
        self.writer.write_attribute("style", Some(&merged));
    }

    fn invoke_start_callback(&mut self) {
        let level = self.tag.level;
        let base = self.tag.action.base();
        let mut context = TagContext::new(&self.buffered);
        if let Some(callback) = self.callback.as_mut() {
            callback.on_tag(&mut context, &mut self.writer);
        }
        let mut outcome = context.outcome();
        self.stats.callbacks += 1;

        if !outcome.written && !outcome.deleted {
            match base {
                BaseAction::Drop | BaseAction::DropKeepContent => {}
                _ => {
                    self.buffered.write_tag(&mut self.writer, true);
                    outcome.written = true;
                }
            }
            if base == BaseAction::Drop {
                outcome.delete_inner_content = true;
            }
        }

        if outcome.written {
            self.writer.write_tag_end();
            self.stats.tags_written += 1;
            if base == BaseAction::KeepDropContent {
                outcome.delete_inner_content = true;
            }
        } else {
            self.stats.tags_dropped += 1;
        }
        if outcome.delete_inner_content && level < self.drop_level {
            self.drop_level = level;
        }
        if !self.buffered.tag.is_void() {
            self.end_tag_actions.push(EndTagAction {
                level,
                drop: !outcome.written || outcome.delete_end_tag,
                callback: outcome.end_tag_callback,
            });
        }
    }

    pub(super) fn on_end_tag(&mut self, token: &HtmlToken) {
        self.assert_between_constructs("end tag");
        let level = self.current_level;
        assert!(level > 0, "end tag with no open element");
        let tag = token.tag();
        if self.style.active {
            self.finish_style_block();
        }
        self.raw_written = false;

        let action = self
            .end_tag_actions
            .iter()
            .rev()
            .take_while(|a| a.level >= level)
            .find(|a| a.level == level)
            .copied();
        let write = match action {
            Some(action) => !action.drop,
            None => !self.dropping(),
        };

        if action.is_some_and(|a| a.callback) {
            self.buffered.reset(tag, &token.name_string(), true, level);
            let mut context = TagContext::new(&self.buffered);
            if let Some(callback) = self.callback.as_mut() {
                callback.on_tag(&mut context, &mut self.writer);
            }
            let outcome = context.outcome();
            self.stats.callbacks += 1;
            let written = if !outcome.written && !outcome.deleted && write {
                self.buffered.write_tag(&mut self.writer, false);
                true
            } else {
                outcome.written
            };
            if written {
                self.writer.write_tag_end();
            }
        } else if write {
            let block = tag.is_block();
            let name = token.name_string();
            self.writer.write_tag_begin(tag, &name, true, block, block);
            self.writer.write_tag_end();
        }
        self.close_level(level);
    }
}
