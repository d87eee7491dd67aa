//! CSS filtering for `<style>` blocks and `style` attributes.

use css::{
    Combinator, CssParseMode, CssParser, CssProperty, CssStep, CssTokenId, SelectorClassKind,
    normalize_for_screening, parse_number,
};
use tools::EntryCursor;

use crate::config::SanitizePolicy;
use crate::filter::{BaseAction, css_property_action};
use crate::url::{UrlCheck, accept_inconclusive, check_url};

use super::Engine;

/// Substrings that disqualify a property value once normalized.
const BANNED_VALUE_PATTERNS: &[&str] = &[
    "expression(",
    "javascript:",
    "vbscript:",
    "livescript:",
    "-moz-binding",
    "behavior",
    "@import",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum RuleState {
    #[default]
    Idle,
    /// Selectors written, declarations follow.
    Open,
    /// Every selector group was rejected; the rule produces nothing.
    Dropped,
}

#[derive(Debug, Default)]
pub(super) struct StyleBlock {
    pub(super) active: bool,
    bytes: usize,
    over_threshold: bool,
    rule: RuleState,
}

impl Engine {
    pub(super) fn begin_style_block(&mut self) {
        self.style_css.reset(CssParseMode::StyleTag);
        self.style = StyleBlock {
            active: true,
            ..StyleBlock::default()
        };
    }

    pub(super) fn feed_style_text(&mut self, text: &str) {
        if self.style.over_threshold {
            self.stats.text_bytes_dropped += text.len() as u64;
            return;
        }
        let mut text = text;
        if let Some(threshold) = self.policy.config().small_css_block_threshold {
            let room = threshold.saturating_sub(self.style.bytes);
            if text.len() > room {
                let mut cut = room;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                log::debug!(
                    target: "html.converter",
                    "style block over {threshold} bytes; remainder dropped"
                );
                self.stats.text_bytes_dropped += (text.len() - cut) as u64;
                self.style.over_threshold = true;
                text = &text[..cut];
            }
        }
        self.style.bytes += text.len();
        self.style_css.push_str(text);
        self.drain_style_block();
    }

    pub(super) fn finish_style_block(&mut self) {
        self.style_css.finish();
        self.drain_style_block();
        if self.style.rule == RuleState::Open {
            self.writer.write_style_text("}");
        }
        self.style = StyleBlock::default();
    }

    fn drain_style_block(&mut self) {
        loop {
            let id = match self.style_css.parse() {
                CssStep::NeedMoreInput => return,
                CssStep::Token(id) => id,
            };
            match id {
                CssTokenId::EndOfFile => return,
                CssTokenId::AtRule => {
                    self.stats.css_rules_dropped += 1;
                    log::debug!(target: "html.converter", "at-rule dropped from style block");
                }
                CssTokenId::RuleSet => self.on_rule_set_part(),
                CssTokenId::Declarations | CssTokenId::None => {}
            }
        }
    }

    fn on_rule_set_part(&mut self) {
        let parts = self.style_css.token().parts();
        if parts.is_begin() {
            self.open_rule();
        }
        if self.style.rule == RuleState::Open {
            let token = self.style_css.token();
            let buffer = token.buffer();
            for entry in token.properties().iter() {
                let value = buffer.to_string_of(entry.value);
                if keep_css_property(entry.name_index, &value, entry.truncated, &self.policy) {
                    self.writer.write_style_text(entry.name_index.as_str());
                    self.writer.write_style_text(":");
                    self.writer.write_style_text(&value);
                    self.writer.write_style_text(";");
                } else {
                    self.stats.css_properties_dropped += 1;
                }
            }
        }
        if parts.is_end() {
            if self.style.rule == RuleState::Open {
                self.writer.write_style_text("}");
            }
            self.style.rule = RuleState::Idle;
        }
    }

    /// Screen the selector groups of a new rule and write the survivors.
    fn open_rule(&mut self) {
        let fragment = self.policy.is_fragment();
        let mut rejected: Vec<EntryCursor> = Vec::new();
        let mut group: Vec<EntryCursor> = Vec::new();
        let mut group_valid = true;
        let mut group_named = false;
        let mut kept_groups = 0;
        {
            let selectors = self.style_css.token().selectors();
            for cursor in selectors.cursors() {
                let selector = selectors.get(cursor);
                group.push(cursor);
                match selector.class_kind {
                    SelectorClassKind::Invalid => group_valid = false,
                    SelectorClassKind::Class | SelectorClassKind::Id => group_named = true,
                    SelectorClassKind::None | SelectorClassKind::Pseudo => {}
                }
                if selector.combinator == Combinator::None {
                    if group_valid && (group_named || !fragment) {
                        kept_groups += 1;
                    } else {
                        rejected.append(&mut group);
                    }
                    group.clear();
                    group_valid = true;
                    group_named = false;
                }
            }
        }
        rejected.extend(group);
        let token = self.style_css.token_mut();
        for cursor in rejected {
            token.delete_selector(cursor);
        }

        if kept_groups == 0 {
            self.stats.css_rules_dropped += 1;
            self.style.rule = RuleState::Dropped;
            return;
        }

        let token = self.style_css.token();
        let buffer = token.buffer();
        let prefix = self.policy.name_prefix();
        let mut text = String::new();
        let mut group_done = false;
        for selector in token.selectors().iter() {
            if group_done {
                text.push(',');
            }
            text.push_str(&buffer.to_string_of(selector.name));
            let class = buffer.to_string_of(selector.class);
            match selector.class_kind {
                SelectorClassKind::Class | SelectorClassKind::Id => {
                    text.push(if selector.class_kind == SelectorClassKind::Class {
                        '.'
                    } else {
                        '#'
                    });
                    if fragment && !class.starts_with(prefix) {
                        text.push_str(prefix);
                    }
                    text.push_str(&class);
                }
                SelectorClassKind::Pseudo => {
                    text.push(':');
                    text.push_str(&class);
                }
                SelectorClassKind::None | SelectorClassKind::Invalid => {}
            }
            text.push_str(selector.combinator.as_css());
            group_done = selector.combinator == Combinator::None;
        }
        text.push('{');
        self.writer.write_style_text(&text);
        self.style.rule = RuleState::Open;
    }
}

/// Whether a CSS value is free of script and unsafe URLs.
pub(crate) fn screen_css_value(value: &str, policy: &SanitizePolicy) -> bool {
    let normalized = normalize_for_screening(value);
    if BANNED_VALUE_PATTERNS
        .iter()
        .any(|pattern| normalized.contains(pattern))
    {
        return false;
    }
    let mut rest = normalized.as_str();
    while let Some(start) = rest.find("url(") {
        let after = &rest[start + 4..];
        let Some(end) = after.find(')') else {
            return false;
        };
        let target = after[..end]
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .trim();
        let safe = match check_url(target, false, policy) {
            UrlCheck::Safe | UrlCheck::LocalHyperlink => true,
            UrlCheck::Inconclusive => accept_inconclusive(target, false, policy),
            UrlCheck::Unsafe => false,
        };
        if !safe {
            return false;
        }
        rest = &after[end + 1..];
    }
    true
}

fn is_negative_length(value: &str) -> bool {
    if normalize_for_screening(value).starts_with('-') {
        return true;
    }
    value
        .split_ascii_whitespace()
        .filter_map(|part| parse_number(part, false))
        .any(|number| number.value < 0)
}

/// Decide whether one property survives filtering.
pub(crate) fn keep_css_property(
    property: CssProperty,
    value: &str,
    truncated: bool,
    policy: &SanitizePolicy,
) -> bool {
    if truncated {
        return false;
    }
    let config = policy.config();
    match css_property_action(property).base() {
        BaseAction::Keep => {}
        BaseAction::CheckContent => {
            let normalized = normalize_for_screening(value);
            let allowed = match property {
                CssProperty::Display => {
                    config.preserve_display_none || !normalized.starts_with("none")
                }
                CssProperty::Position => {
                    !policy.is_fragment()
                        || !["absolute", "relative", "fixed", "sticky"]
                            .iter()
                            .any(|p| normalized.starts_with(p))
                }
                CssProperty::Margin
                | CssProperty::MarginTop
                | CssProperty::MarginRight
                | CssProperty::MarginBottom
                | CssProperty::MarginLeft
                | CssProperty::TextIndent => !policy.is_fragment() || !is_negative_length(value),
                _ => true,
            };
            if !allowed {
                return false;
            }
        }
        _ => return false,
    }
    screen_css_value(value, policy)
}

/// Filter a `style` attribute value. Returns the surviving declarations
/// joined with `;` and the number of properties dropped.
pub(crate) fn filter_style_attribute(
    parser: &mut CssParser,
    policy: &SanitizePolicy,
    value: &str,
    truncated: bool,
) -> (String, u64) {
    // A cut value may end inside a declaration; keep only whole ones.
    let value = if truncated {
        value.rfind(';').map_or("", |end| &value[..end])
    } else {
        value
    };
    parser.reset(CssParseMode::StyleAttribute);
    parser.push_str(value);
    parser.finish();

    let mut filtered = String::new();
    let mut dropped = 0;
    while let CssStep::Token(id) = parser.parse() {
        if id == CssTokenId::EndOfFile {
            break;
        }
        if id != CssTokenId::Declarations {
            continue;
        }
        let token = parser.token();
        let buffer = token.buffer();
        for entry in token.properties().iter() {
            let text = buffer.to_string_of(entry.value);
            if keep_css_property(entry.name_index, &text, entry.truncated, policy) {
                if !filtered.is_empty() {
                    filtered.push(';');
                }
                filtered.push_str(entry.name_index.as_str());
                filtered.push(':');
                filtered.push_str(&text);
            } else {
                dropped += 1;
            }
        }
    }
    (filtered, dropped)
}
