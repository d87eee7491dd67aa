use super::{HtmlParser, NESTING_LIMIT, ParseStep};
use crate::error::ParseError;
use crate::names::{HtmlName, TextKind};
use crate::token::{AttrParts, HtmlToken, HtmlTokenId};

/// Flattens token parts into whole-construct events so differently chunked
/// runs compare equal.
#[derive(Default)]
struct Flattener {
    events: Vec<String>,
    text: String,
    text_kind: Option<TextKind>,
    tag: String,
}

impl Flattener {
    fn flush_text(&mut self) {
        if let Some(kind) = self.text_kind.take() {
            let label = match kind {
                TextKind::Data => "text",
                TextKind::RawText => "raw",
                TextKind::Rcdata => "rcdata",
                TextKind::Plaintext => "plaintext",
            };
            self.events
                .push(format!("{label} {}", std::mem::take(&mut self.text)));
        }
    }

    fn observe(&mut self, id: HtmlTokenId, token: &HtmlToken) {
        assert_eq!(token.id(), id);
        if id != HtmlTokenId::Text {
            self.flush_text();
        }
        match id {
            HtmlTokenId::Text => {
                if self.text_kind.is_some_and(|kind| kind != token.text_kind()) {
                    self.flush_text();
                }
                self.text_kind = Some(token.text_kind());
                self.text.push_str(&token.text_string());
            }
            HtmlTokenId::Tag => self.observe_tag(token),
            HtmlTokenId::OverlappedClose => {
                self.events.push(format!("overlap-close {}", token.argument()))
            }
            HtmlTokenId::OverlappedReopen => {
                self.events.push(format!("overlap-reopen {}", token.argument()))
            }
            HtmlTokenId::EndOfFile => self.events.push("eof".to_string()),
            other => self.events.push(format!("{other:?}")),
        }
    }

    fn observe_tag(&mut self, token: &HtmlToken) {
        let parts = token.tag_parts();
        let buffer = token.buffer();
        if parts.is_begin() {
            self.tag = if token.is_end_tag() { "end " } else { "start " }.to_string();
        }
        self.tag.push_str(&buffer.to_string_of(token.name()));
        for attr in token.attributes().iter() {
            if attr.parts.is_begin() {
                self.tag.push(' ');
            }
            self.tag.push_str(&buffer.to_string_of(attr.name));
            if attr.parts.contains(AttrParts::VALUE_BEGIN) {
                self.tag.push('=');
            }
            self.tag.push_str(&buffer.to_string_of(attr.value));
        }
        if parts.is_end() {
            if token.self_closing() {
                self.tag.push_str(" /");
            }
            if token.tag().is_unknown() {
                self.tag.push_str(" ?");
            }
            self.events.push(std::mem::take(&mut self.tag));
        }
    }
}

fn drain(parser: &mut HtmlParser, flat: &mut Flattener) -> Result<bool, ParseError> {
    loop {
        match parser.parse()? {
            ParseStep::NeedMoreInput => return Ok(false),
            ParseStep::Token(id) => {
                flat.observe(id, parser.token());
                if id == HtmlTokenId::EndOfFile {
                    return Ok(true);
                }
            }
        }
    }
}

fn run_chunks(chunks: &[&str]) -> Vec<String> {
    let mut parser = HtmlParser::new();
    let mut flat = Flattener::default();
    for chunk in chunks {
        parser.push_str(chunk);
        assert!(!drain(&mut parser, &mut flat).expect("parse"), "eof before finish");
    }
    parser.finish();
    assert!(drain(&mut parser, &mut flat).expect("parse"), "no eof after finish");
    flat.events
}

fn run(input: &str) -> Vec<String> {
    run_chunks(&[input])
}

#[test]
fn tags_text_and_references() {
    assert_eq!(
        run("<P Class=a id='b'>Hi &amp; bye&#33;</p>"),
        vec!["start p class=a id=b", "text Hi & bye!", "end p", "eof"]
    );
}

#[test]
fn attribute_without_value_differs_from_empty_value() {
    assert_eq!(
        run("<input disabled value=\"\" title=a&quot;b>"),
        vec!["start input disabled value= title=a\"b", "eof"]
    );
}

#[test]
fn comments_doctype_and_processing_instructions_vanish() {
    assert_eq!(
        run("<!DOCTYPE html><!-- c -->a<?xml x?>b<!-->c<!--->d</ x>e</>f"),
        vec!["text abcdef", "eof"]
    );
}

#[test]
fn raw_text_runs_until_matching_end_tag() {
    assert_eq!(
        run("<script>if (a<b) x=\"</p>\" &amp;</SCRIPT >after"),
        vec![
            "start script",
            "raw if (a<b) x=\"</p>\" &amp;",
            "end script",
            "text after",
            "eof"
        ]
    );
}

#[test]
fn rcdata_decodes_references() {
    assert_eq!(
        run("<title>a&lt;b</title>"),
        vec!["start title", "rcdata a<b", "end title", "eof"]
    );
}

#[test]
fn plaintext_swallows_the_rest() {
    assert_eq!(
        run("<plaintext><b>&amp;"),
        vec!["start plaintext", "plaintext <b>&amp;", "end plaintext", "eof"]
    );
}

#[test]
fn end_tag_closes_non_formatting_elements_implicitly() {
    assert_eq!(
        run("<div><p>x</div>"),
        vec!["start div", "start p", "text x", "end p", "end div", "eof"]
    );
}

#[test]
fn misnested_formatting_elements_are_overlapped() {
    assert_eq!(
        run("<p><b><i>x</p>y</i></b>"),
        vec![
            "start p",
            "start b",
            "start i",
            "text x",
            "overlap-close 2",
            "end p",
            "overlap-reopen 2",
            "text y",
            "end i",
            "end b",
            "eof"
        ]
    );
}

#[test]
fn unmatched_end_tags_are_discarded() {
    assert_eq!(run("a</span>b</br>c"), vec!["text abc", "eof"]);
}

#[test]
fn end_of_input_closes_open_elements() {
    assert_eq!(
        run("<div><span>x"),
        vec!["start div", "start span", "text x", "end span", "end div", "eof"]
    );
}

#[test]
fn void_and_self_closing_elements() {
    assert_eq!(
        run("<br><img src=a><div/>x<svg/>y"),
        vec![
            "start br",
            "start img src=a",
            "start div /",
            "text x",
            "start svg /",
            "end svg",
            "text y",
            "end div",
            "eof"
        ]
    );
}

#[test]
fn end_of_input_inside_tag_completes_it() {
    assert_eq!(
        run("<a href=\"x&am"),
        vec!["start a href=x&am", "end a", "eof"]
    );
    assert_eq!(run("<di"), vec!["start di ?", "end di ?", "eof"]);
    assert_eq!(run("x<"), vec!["text x<", "eof"]);
}

#[test]
fn long_unknown_names_stream_and_still_match() {
    let name = "x".repeat(80);
    let input = format!("<{name} {name}=1>t</{name}>");
    let events = run(&input);
    assert_eq!(
        events,
        vec![
            format!("start {name} {name}=1 ?"),
            "text t".to_string(),
            format!("end {name} ?"),
            "eof".to_string()
        ]
    );
}

#[test]
fn attributes_of_end_tags_are_dropped() {
    assert_eq!(
        run("<b>x</b class=y>"),
        vec!["start b", "text x", "end b", "eof"]
    );
}

#[test]
fn nesting_is_bounded() {
    let input = "<div>".repeat(NESTING_LIMIT + 10);
    let mut parser = HtmlParser::new();
    parser.push_str(&input);
    parser.finish();
    let mut depth: i64 = 0;
    let mut max_depth = 0;
    loop {
        match parser.parse().expect("parse") {
            ParseStep::Token(HtmlTokenId::EndOfFile) => break,
            ParseStep::Token(HtmlTokenId::Tag) => {
                let token = parser.token();
                if token.is_end_tag() {
                    depth -= 1;
                } else if token.tag_parts().is_begin() {
                    depth += 1;
                }
                max_depth = max_depth.max(depth);
            }
            ParseStep::Token(_) => {}
            ParseStep::NeedMoreInput => panic!("finished parser asked for input"),
        }
    }
    assert_eq!(depth, 0);
    assert_eq!(max_depth as usize, NESTING_LIMIT);
    assert!(parser.stats().implicit_end_tags >= 10);
}

#[test]
fn too_many_attributes_is_fatal() {
    let mut input = String::from("<p");
    for _ in 0..(u16::MAX as usize + 1) {
        input.push_str(" a");
    }
    input.push('>');
    let mut parser = HtmlParser::new();
    parser.push_str(&input);
    parser.finish();
    let err = loop {
        match parser.parse() {
            Ok(ParseStep::Token(HtmlTokenId::EndOfFile)) => panic!("expected failure"),
            Ok(_) => {}
            Err(err) => break err,
        }
    };
    assert_eq!(
        err,
        ParseError::TooManyAttributes {
            limit: u16::MAX as usize
        }
    );
    assert!(parser.parse().is_err(), "parser stays failed");
}

#[test]
fn names_resolve_to_indices() {
    let mut parser = HtmlParser::new();
    parser.push_str("<A HREF=x onclick=y>");
    parser.finish();
    assert_eq!(
        parser.parse().expect("parse"),
        ParseStep::Token(HtmlTokenId::Tag)
    );
    let token = parser.token();
    assert_eq!(token.tag(), HtmlName::A);
    let names: Vec<HtmlName> = token.attributes().iter().map(|a| a.name_index).collect();
    assert_eq!(names, vec![HtmlName::Href, HtmlName::Unknown]);
}

#[test]
fn partial_tag_keeps_one_attribute_in_flight() {
    let mut parser = HtmlParser::new();
    parser.push_str("<a title=one href=\"ab");
    assert_eq!(
        parser.parse().expect("parse"),
        ParseStep::Token(HtmlTokenId::Tag)
    );
    {
        let token = parser.token();
        assert!(token.tag_parts().is_begin());
        assert!(!token.tag_parts().is_end());
        let attrs: Vec<_> = token.attributes().iter().collect();
        assert_eq!(attrs.len(), 2);
        assert!(attrs[0].parts.is_end());
        assert!(!attrs[1].parts.is_end());
    }
    assert_eq!(parser.parse().expect("parse"), ParseStep::NeedMoreInput);
    parser.push_str("c\">");
    assert_eq!(
        parser.parse().expect("parse"),
        ParseStep::Token(HtmlTokenId::Tag)
    );
    let token = parser.token();
    assert!(!token.tag_parts().is_begin());
    assert!(token.tag_parts().is_end());
    let attr = token.attributes().iter().next().expect("continued attribute");
    assert!(!attr.parts.is_begin());
    assert!(attr.parts.is_end());
    assert_eq!(attr.name_index, HtmlName::Href);
    assert_eq!(token.buffer().to_string_of(attr.value), "c");
}

const SPLIT_INPUT: &str = "<!doctype html><html><head><title>T&amp;t</title>\
    <style>p{color:red}</style></head><body bgcolor=#fff>\
    <p class=\"a b\" id=x onclick='evil()'>Hello &#x41;&lt; <b>world<i>!</p>\
    <!-- note --><script>if(a</b)</script><a href=\"/x?a=1&amp;b=2\">l</a>\
    <textarea>&lt;/textarea&gt;</textarea></body></html>";

#[test]
fn two_chunk_split_matches_single_chunk() {
    let expected = run(SPLIT_INPUT);
    for (split, _) in SPLIT_INPUT.char_indices().skip(1) {
        let (a, b) = SPLIT_INPUT.split_at(split);
        assert_eq!(run_chunks(&[a, b]), expected, "split at {split}: {a:?} | {b:?}");
    }
}

#[test]
fn char_by_char_matches_single_chunk() {
    let expected = run(SPLIT_INPUT);
    let pieces: Vec<String> = SPLIT_INPUT.chars().map(String::from).collect();
    let chunks: Vec<&str> = pieces.iter().map(String::as_str).collect();
    assert_eq!(run_chunks(&chunks), expected);
}

#[test]
#[should_panic(expected = "push_str after finish")]
fn push_after_finish_panics() {
    let mut parser = HtmlParser::new();
    parser.finish();
    parser.push_str("<p>");
}
