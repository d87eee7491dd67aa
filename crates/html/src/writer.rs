//! Sequential HTML writer.
//!
//! The writer accepts output strictly in document order: a tag is opened,
//! attributes are written one at a time, the tag is closed, text follows.
//! Calling out of sequence is a programming error and panics.
//!
//! Every character of text and attribute values goes through an ASCII
//! bitmap; characters flagged there (and non-ASCII characters that need it)
//! are handed to an [`EscapeFallback`], which substitutes an entity. Raw
//! `<`, `>` and `&` therefore never reach the output from escaped paths.
//!
//! Optional line wrapping breaks lines between attributes, at spaces of
//! non-preformatted text, and around block-level tags.

use tools::FragmentSink;

use crate::names::HtmlName;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscapeContext {
    Text,
    AttributeValue,
}

/// Entity substitution for characters the writer will not emit as-is.
pub trait EscapeFallback {
    /// Append a replacement for `ch` to `out`, or return false to keep it.
    fn escape(&self, ch: char, context: EscapeContext, out: &mut String) -> bool;
}

/// Named entities for markup characters, numeric references for controls
/// and (optionally) for all non-ASCII characters.
#[derive(Clone, Copy, Debug, Default)]
pub struct EntityFallback {
    pub escape_non_ascii: bool,
}

impl EscapeFallback for EntityFallback {
    fn escape(&self, ch: char, context: EscapeContext, out: &mut String) -> bool {
        let named = match ch {
            '<' => "&lt;",
            '>' => "&gt;",
            '&' => "&amp;",
            '"' if context == EscapeContext::AttributeValue => "&quot;",
            '\u{00A0}' => "&nbsp;",
            '\0' => "\u{FFFD}",
            c if (c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
                || (self.escape_non_ascii && !c.is_ascii()) =>
            {
                out.push_str(&format!("&#{};", c as u32));
                return true;
            }
            _ => return false,
        };
        out.push_str(named);
        true
    }
}

const fn build_unsafe_ascii() -> [bool; 128] {
    let mut table = [false; 128];
    let mut i = 0;
    while i < 0x20 {
        table[i] = !matches!(i as u8, b'\t' | b'\n' | b'\r');
        i += 1;
    }
    table[0x7f] = true;
    table[b'<' as usize] = true;
    table[b'>' as usize] = true;
    table[b'&' as usize] = true;
    table[b'"' as usize] = true;
    table
}

static UNSAFE_ASCII: [bool; 128] = build_unsafe_ascii();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WriterState {
    Text,
    TagOpen,
    AttributeName,
    AttributeValue,
}

pub struct HtmlWriter {
    output: String,
    state: WriterState,
    fallback: Box<dyn EscapeFallback>,
    escape_non_ascii: bool,
    max_line_length: Option<usize>,
    line_length: usize,
    pre_depth: usize,
    allow_wsp_right: bool,
    scratch: String,
}

impl std::fmt::Debug for HtmlWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlWriter")
            .field("state", &self.state)
            .field("output_len", &self.output.len())
            .field("line_length", &self.line_length)
            .finish()
    }
}

impl HtmlWriter {
    pub fn new(max_line_length: Option<usize>, escape_non_ascii: bool) -> Self {
        Self::with_fallback(
            max_line_length,
            escape_non_ascii,
            Box::new(EntityFallback { escape_non_ascii }),
        )
    }

    pub fn with_fallback(
        max_line_length: Option<usize>,
        escape_non_ascii: bool,
        fallback: Box<dyn EscapeFallback>,
    ) -> Self {
        Self {
            output: String::new(),
            state: WriterState::Text,
            fallback,
            escape_non_ascii,
            max_line_length,
            line_length: 0,
            pre_depth: 0,
            allow_wsp_right: false,
            scratch: String::new(),
        }
    }

    /// Discard everything written and return to the initial state.
    pub fn clear(&mut self) {
        self.output.clear();
        self.state = WriterState::Text;
        self.line_length = 0;
        self.pre_depth = 0;
        self.allow_wsp_right = false;
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Hand over everything written so far. Writer state is kept, so a tag
    /// may be open across calls.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Move buffered output into `sink`.
    pub fn flush(&mut self, sink: &mut dyn FragmentSink) {
        if !self.output.is_empty() {
            sink.write_run(&self.output);
            self.output.clear();
        }
    }

    pub fn is_tag_open(&self) -> bool {
        self.state != WriterState::Text
    }

    fn line_full(&self) -> bool {
        self.max_line_length
            .is_some_and(|max| self.line_length >= max)
    }

    fn push_raw(&mut self, text: &str) {
        self.output.push_str(text);
        match text.rfind('\n') {
            Some(nl) => self.line_length = text.len() - nl - 1,
            None => self.line_length += text.len(),
        }
    }

    fn break_line(&mut self) {
        self.output.push('\n');
        self.line_length = 0;
    }

    pub fn write_tag_begin(
        &mut self,
        name: HtmlName,
        raw_name: &str,
        is_end_tag: bool,
        allow_wsp_left: bool,
        allow_wsp_right: bool,
    ) {
        assert_eq!(
            self.state,
            WriterState::Text,
            "tag begin while another tag is open"
        );
        if allow_wsp_left && self.line_full() {
            self.break_line();
        }
        self.push_raw(if is_end_tag { "</" } else { "<" });
        self.push_raw(if name.is_unknown() {
            raw_name
        } else {
            name.as_str()
        });
        if name.is_preformatted() {
            if is_end_tag {
                self.pre_depth = self.pre_depth.saturating_sub(1);
            } else {
                self.pre_depth += 1;
            }
        }
        self.allow_wsp_right = allow_wsp_right;
        self.state = WriterState::TagOpen;
    }

    /// Continue a streamed (unknown) tag name.
    pub fn write_tag_name_continue(&mut self, raw: &str) {
        assert_eq!(self.state, WriterState::TagOpen, "tag name outside a tag");
        self.push_raw(raw);
    }

    pub fn write_attribute_name(&mut self, name: &str) {
        assert_eq!(
            self.state,
            WriterState::TagOpen,
            "attribute name outside a tag or inside another attribute"
        );
        if self.line_full() {
            self.break_line();
        } else {
            self.push_raw(" ");
        }
        self.push_raw(name);
        self.state = WriterState::AttributeName;
    }

    pub fn write_attribute_name_continue(&mut self, raw: &str) {
        assert_eq!(
            self.state,
            WriterState::AttributeName,
            "attribute name continued outside an attribute name"
        );
        self.push_raw(raw);
    }

    /// Append to the current attribute's value. The first call opens the
    /// quoted value; an empty first call still produces `=""`.
    pub fn write_attribute_value(&mut self, text: &str) {
        match self.state {
            WriterState::AttributeName => {
                self.push_raw("=\"");
                self.state = WriterState::AttributeValue;
            }
            WriterState::AttributeValue => {}
            _ => panic!("attribute value without an attribute name"),
        }
        self.write_escaped(text, EscapeContext::AttributeValue);
    }

    pub fn end_attribute(&mut self) {
        match self.state {
            WriterState::AttributeName => {}
            WriterState::AttributeValue => self.push_raw("\""),
            _ => panic!("end_attribute without an open attribute"),
        }
        self.state = WriterState::TagOpen;
    }

    /// Write one complete attribute.
    pub fn write_attribute(&mut self, name: &str, value: Option<&str>) {
        self.write_attribute_name(name);
        if let Some(value) = value {
            self.write_attribute_value(value);
        }
        self.end_attribute();
    }

    pub fn write_tag_end(&mut self) {
        assert_eq!(
            self.state,
            WriterState::TagOpen,
            "tag end without an open tag (or with an attribute still open)"
        );
        self.push_raw(">");
        self.state = WriterState::Text;
        if self.allow_wsp_right && self.line_full() {
            self.break_line();
        }
    }

    /// Escaped character data.
    pub fn write_text(&mut self, text: &str) {
        assert_eq!(self.state, WriterState::Text, "text inside an open tag");
        self.write_escaped(text, EscapeContext::Text);
    }

    /// Verbatim content of a raw-text element.
    pub fn write_raw_text(&mut self, text: &str) {
        assert_eq!(self.state, WriterState::Text, "text inside an open tag");
        self.push_raw(text);
    }

    /// CSS inside `<style>`: `<` becomes the CSS escape `\3c ` so the block
    /// cannot be closed from within.
    pub fn write_style_text(&mut self, text: &str) {
        assert_eq!(self.state, WriterState::Text, "text inside an open tag");
        let mut rest = text;
        while let Some(lt) = rest.find('<') {
            self.push_raw(&rest[..lt]);
            self.push_raw("\\3c ");
            rest = &rest[lt + 1..];
        }
        self.push_raw(rest);
    }

    fn needs_escape(&self, ch: char) -> bool {
        if ch.is_ascii() {
            UNSAFE_ASCII[ch as usize]
        } else {
            self.escape_non_ascii || ch == '\u{00A0}' || ch.is_control()
        }
    }

    fn write_escaped(&mut self, text: &str, context: EscapeContext) {
        let wrap_at = match self.max_line_length {
            Some(max) if context == EscapeContext::Text && self.pre_depth == 0 => max,
            _ => usize::MAX,
        };
        let mut run_start = 0;
        for (i, ch) in text.char_indices() {
            let break_here = ch == ' ' && self.line_length + (i - run_start) >= wrap_at;
            if !break_here && !self.needs_escape(ch) {
                continue;
            }
            self.push_raw(&text[run_start..i]);
            run_start = i + ch.len_utf8();
            if break_here {
                self.break_line();
                continue;
            }
            self.scratch.clear();
            if self.fallback.escape(ch, context, &mut self.scratch) {
                let replacement = std::mem::take(&mut self.scratch);
                self.push_raw(&replacement);
                self.scratch = replacement;
            } else {
                let mut utf8 = [0u8; 4];
                self.push_raw(ch.encode_utf8(&mut utf8));
            }
        }
        self.push_raw(&text[run_start..]);
    }

    /// Sink writing escaped text.
    pub fn text_sink(&mut self) -> TextSink<'_> {
        TextSink { writer: self }
    }

    /// Sink appending to the current attribute value.
    pub fn attribute_value_sink(&mut self) -> AttributeValueSink<'_> {
        AttributeValueSink { writer: self }
    }
}

pub struct TextSink<'w> {
    writer: &'w mut HtmlWriter,
}

impl FragmentSink for TextSink<'_> {
    fn write_run(&mut self, text: &str) {
        self.writer.write_text(text);
    }
}

pub struct AttributeValueSink<'w> {
    writer: &'w mut HtmlWriter,
}

impl FragmentSink for AttributeValueSink<'_> {
    fn write_run(&mut self, text: &str) {
        self.writer.write_attribute_value(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_with_attributes() {
        let mut w = HtmlWriter::new(None, false);
        w.write_tag_begin(HtmlName::A, "", false, false, false);
        w.write_attribute("href", Some("/x?a=1&b=\"2\""));
        w.write_attribute("download", None);
        w.write_attribute("title", Some(""));
        w.write_tag_end();
        w.write_text("a < b & c > d");
        w.write_tag_begin(HtmlName::A, "", true, false, false);
        w.write_tag_end();
        assert_eq!(
            w.take_output(),
            "<a href=\"/x?a=1&amp;b=&quot;2&quot;\" download title=\"\">a &lt; b &amp; c &gt; d</a>"
        );
    }

    #[test]
    fn controls_and_non_ascii() {
        let mut w = HtmlWriter::new(None, false);
        w.write_text("a\u{1}b\0c\u{A0}é\t");
        assert_eq!(w.take_output(), "a&#1;b\u{FFFD}c&nbsp;é\t");

        let mut w = HtmlWriter::new(None, true);
        w.write_text("é'");
        assert_eq!(w.take_output(), "&#233;'");
    }

    #[test]
    fn raw_and_style_text() {
        let mut w = HtmlWriter::new(None, false);
        w.write_raw_text("a<b&c");
        w.write_style_text("p{content:'</style>'}");
        assert_eq!(w.take_output(), "a<b&cp{content:'\\3c /style>'}");
    }

    #[test]
    fn unknown_names_are_written_from_raw_text() {
        let mut w = HtmlWriter::new(None, false);
        w.write_tag_begin(HtmlName::Unknown, "my-", false, false, false);
        w.write_tag_name_continue("element");
        w.write_attribute_name("data-");
        w.write_attribute_name_continue("x");
        w.write_attribute_value("1");
        w.end_attribute();
        w.write_tag_end();
        assert_eq!(w.take_output(), "<my-element data-x=\"1\">");
    }

    #[test]
    fn wrapping_breaks_between_attributes_and_at_spaces() {
        let mut w = HtmlWriter::new(Some(10), false);
        w.write_tag_begin(HtmlName::P, "", false, true, true);
        w.write_attribute("class", Some("abcdef"));
        w.write_attribute("id", Some("x"));
        w.write_tag_end();
        w.write_text("one two three");
        let out = w.take_output();
        assert_eq!(out, "<p class=\"abcdef\"\nid=\"x\">one\ntwo three");
    }

    #[test]
    fn preformatted_text_is_not_wrapped() {
        let mut w = HtmlWriter::new(Some(4), false);
        w.write_tag_begin(HtmlName::Pre, "", false, false, false);
        w.write_tag_end();
        w.write_text("aaaa bbbb cccc");
        w.write_tag_begin(HtmlName::Pre, "", true, false, false);
        w.write_tag_end();
        assert_eq!(w.take_output(), "<pre>aaaa bbbb cccc</pre>");
    }

    #[test]
    #[should_panic(expected = "tag begin while another tag is open")]
    fn nested_tag_begin_panics() {
        let mut w = HtmlWriter::new(None, false);
        w.write_tag_begin(HtmlName::P, "", false, false, false);
        w.write_tag_begin(HtmlName::B, "", false, false, false);
    }

    #[test]
    #[should_panic(expected = "attribute value without an attribute name")]
    fn value_without_name_panics() {
        let mut w = HtmlWriter::new(None, false);
        w.write_tag_begin(HtmlName::P, "", false, false, false);
        w.write_attribute_value("x");
    }

    #[test]
    #[should_panic(expected = "text inside an open tag")]
    fn text_inside_tag_panics() {
        let mut w = HtmlWriter::new(None, false);
        w.write_tag_begin(HtmlName::P, "", false, false, false);
        w.write_text("x");
    }

    #[test]
    fn sinks_route_fragments() {
        let mut buffer = tools::TokenBuffer::new();
        let mut frag = buffer.begin_fragment();
        buffer.push_str(&mut frag, "a<b");
        let mut w = HtmlWriter::new(None, false);
        buffer.reader(frag).write_to(&mut w.text_sink());
        w.write_tag_begin(HtmlName::Img, "", false, false, false);
        w.write_attribute_name("alt");
        buffer.reader(frag).write_to(&mut w.attribute_value_sink());
        w.end_attribute();
        w.write_tag_end();
        assert_eq!(w.take_output(), "a&lt;b<img alt=\"a&lt;b\">");
    }
}
