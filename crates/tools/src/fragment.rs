//! Run-list fragments over a per-token character buffer.
//!
//! A token owns one [`TokenBuffer`]: decoded text is appended to a single
//! `String`, and every field of the token (a tag name, an attribute value, a
//! CSS property value) is a [`Fragment`], a half-open range `[head, tail)`
//! over the buffer's run list. A run is a contiguous byte range of the text.
//!
//! Invariants:
//! - Runs are appended in order and never reordered; a fragment only grows at
//!   its tail, and only while it is the most recently extended fragment.
//! - `reset()` invalidates every fragment issued before it. The buffer
//!   generation changes so stale readers can be detected.
//! - Run endpoints are always UTF-8 boundaries of `text`.

use std::fmt;

/// Contiguous byte range of a [`TokenBuffer`]'s text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Run {
    pub start: u32,
    pub end: u32,
}

impl Run {
    pub fn len(self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

/// Half-open range of runs making up one token field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    pub head: u32,
    pub tail: u32,
}

impl Fragment {
    pub const EMPTY: Fragment = Fragment { head: 0, tail: 0 };

    pub fn is_empty(self) -> bool {
        self.head == self.tail
    }

    pub fn run_count(self) -> usize {
        (self.tail - self.head) as usize
    }
}

/// Destination for fragment text.
///
/// Readers hand text to a sink one run at a time; a sink that escapes
/// characters does so per run without ever seeing the token buffer.
pub trait FragmentSink {
    fn write_run(&mut self, text: &str);
}

impl FragmentSink for String {
    fn write_run(&mut self, text: &str) {
        self.push_str(text);
    }
}

/// Shared character storage for one token.
#[derive(Default)]
pub struct TokenBuffer {
    text: String,
    runs: Vec<Run>,
    generation: u32,
}

impl fmt::Debug for TokenBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBuffer")
            .field("generation", &self.generation)
            .field("runs", &self.runs.len())
            .field("text_len", &self.text.len())
            .finish()
    }
}

impl TokenBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all text and runs. Fragments issued before this call are stale.
    pub fn reset(&mut self) {
        self.text.clear();
        self.runs.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// An empty fragment positioned at the end of the run list.
    pub fn begin_fragment(&self) -> Fragment {
        let at = self.runs.len() as u32;
        Fragment { head: at, tail: at }
    }

    /// Append `text` to `fragment`.
    ///
    /// Contiguous appends to the fragment that owns the last run extend that
    /// run instead of opening a new one.
    pub fn push_str(&mut self, fragment: &mut Fragment, text: &str) {
        if text.is_empty() {
            return;
        }
        let start = self.text.len() as u32;
        self.text.push_str(text);
        let end = self.text.len() as u32;
        let runs_len = self.runs.len() as u32;
        if fragment.is_empty() {
            // An empty fragment may be re-anchored at the end of the run list.
            fragment.head = runs_len;
            fragment.tail = runs_len;
        }
        assert_eq!(
            fragment.tail, runs_len,
            "only the most recently extended fragment may grow"
        );
        match self.runs.last_mut() {
            Some(last) if !fragment.is_empty() && last.end == start => last.end = end,
            _ => {
                self.runs.push(Run { start, end });
                fragment.tail += 1;
            }
        }
    }

    pub fn push_char(&mut self, fragment: &mut Fragment, ch: char) {
        let mut utf8 = [0u8; 4];
        self.push_str(fragment, ch.encode_utf8(&mut utf8));
    }

    /// Total byte length of the fragment's text.
    pub fn len_of(&self, fragment: Fragment) -> usize {
        self.runs_of(fragment).map(str::len).sum()
    }

    /// Iterate the fragment's runs as string slices.
    pub fn runs_of(&self, fragment: Fragment) -> impl Iterator<Item = &str> + '_ {
        debug_assert!(fragment.tail as usize <= self.runs.len());
        self.runs[fragment.head as usize..fragment.tail as usize]
            .iter()
            .map(move |run| &self.text[run.start as usize..run.end as usize])
    }

    /// Materialize the fragment into a new `String`.
    pub fn to_string_of(&self, fragment: Fragment) -> String {
        let mut out = String::with_capacity(self.len_of(fragment));
        for run in self.runs_of(fragment) {
            out.push_str(run);
        }
        out
    }

    /// ASCII case-insensitive comparison against a literal.
    pub fn eq_ignore_ascii_case(&self, fragment: Fragment, other: &str) -> bool {
        let mut rest = other.as_bytes();
        for run in self.runs_of(fragment) {
            let bytes = run.as_bytes();
            if bytes.len() > rest.len() || !bytes.eq_ignore_ascii_case(&rest[..bytes.len()]) {
                return false;
            }
            rest = &rest[bytes.len()..];
        }
        rest.is_empty()
    }

    pub fn reader(&self, fragment: Fragment) -> FragmentReader<'_> {
        FragmentReader {
            buffer: self,
            fragment,
            generation: self.generation,
            run: fragment.head,
            offset: 0,
        }
    }
}

/// Cursor over one fragment.
///
/// Reading advances an internal position; `rewind` returns to the fragment
/// start without touching the buffer, so a field can be inspected and then
/// copied.
pub struct FragmentReader<'b> {
    buffer: &'b TokenBuffer,
    fragment: Fragment,
    generation: u32,
    run: u32,
    offset: u32,
}

impl<'b> FragmentReader<'b> {
    fn assert_fresh(&self) {
        assert_eq!(
            self.generation, self.buffer.generation,
            "fragment reader used after its token buffer was reset"
        );
    }

    pub fn rewind(&mut self) {
        self.run = self.fragment.head;
        self.offset = 0;
    }

    fn current_run(&self) -> Option<&'b str> {
        if self.run >= self.fragment.tail {
            return None;
        }
        let run = self.buffer.runs[self.run as usize];
        Some(&self.buffer.text[(run.start + self.offset) as usize..run.end as usize])
    }

    fn advance(&mut self, bytes: usize) {
        let run = self.buffer.runs[self.run as usize];
        self.offset += bytes as u32;
        if run.start + self.offset >= run.end {
            self.run += 1;
            self.offset = 0;
        }
    }

    /// Read one character and advance.
    pub fn read_char(&mut self) -> Option<char> {
        self.assert_fresh();
        loop {
            let rest = self.current_run()?;
            match rest.chars().next() {
                Some(ch) => {
                    self.advance(ch.len_utf8());
                    return Some(ch);
                }
                None => {
                    self.run += 1;
                    self.offset = 0;
                }
            }
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.assert_fresh();
        let mut run = self.run;
        let mut offset = self.offset;
        while run < self.fragment.tail {
            let r = self.buffer.runs[run as usize];
            let text = &self.buffer.text[(r.start + offset) as usize..r.end as usize];
            if let Some(ch) = text.chars().next() {
                return Some(ch);
            }
            run += 1;
            offset = 0;
        }
        None
    }

    /// Copy the unread remainder into `sink` and leave the reader at the end.
    pub fn write_to(&mut self, sink: &mut dyn FragmentSink) {
        self.assert_fresh();
        while let Some(rest) = self.current_run() {
            if !rest.is_empty() {
                sink.write_run(rest);
            }
            self.run += 1;
            self.offset = 0;
        }
    }

    /// Materialize at most `max_size` bytes of the unread remainder.
    ///
    /// Returns the text and whether it was cut short. The cut always falls on
    /// a character boundary, so the result may be slightly below `max_size`.
    pub fn get_string(&mut self, max_size: usize) -> (String, bool) {
        self.assert_fresh();
        let mut out = String::new();
        while let Some(rest) = self.current_run() {
            let room = max_size - out.len();
            if rest.len() <= room {
                out.push_str(rest);
                self.run += 1;
                self.offset = 0;
                continue;
            }
            let mut cut = room;
            while !rest.is_char_boundary(cut) {
                cut -= 1;
            }
            out.push_str(&rest[..cut]);
            self.advance(cut);
            return (out, true);
        }
        (out, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_pushes_share_one_run() {
        let mut buffer = TokenBuffer::new();
        let mut frag = buffer.begin_fragment();
        buffer.push_str(&mut frag, "hel");
        buffer.push_str(&mut frag, "lo");
        assert_eq!(frag.run_count(), 1);
        assert_eq!(buffer.to_string_of(frag), "hello");
    }

    #[test]
    fn interleaved_fragments_keep_their_own_runs() {
        let mut buffer = TokenBuffer::new();
        let mut name = buffer.begin_fragment();
        buffer.push_str(&mut name, "href");
        let mut value = buffer.begin_fragment();
        buffer.push_str(&mut value, "a&");
        buffer.push_char(&mut value, 'b');
        assert_eq!(buffer.to_string_of(name), "href");
        assert_eq!(buffer.to_string_of(value), "a&b");
        assert!(buffer.eq_ignore_ascii_case(name, "HREF"));
        assert!(!buffer.eq_ignore_ascii_case(name, "hre"));
    }

    #[test]
    #[should_panic(expected = "only the most recently extended fragment may grow")]
    fn growing_an_older_fragment_panics() {
        let mut buffer = TokenBuffer::new();
        let mut first = buffer.begin_fragment();
        buffer.push_str(&mut first, "a");
        let mut second = buffer.begin_fragment();
        buffer.push_str(&mut second, "b");
        buffer.push_str(&mut first, "c");
    }

    #[test]
    fn reader_rewinds_without_rereading_storage() {
        let mut buffer = TokenBuffer::new();
        let mut frag = buffer.begin_fragment();
        buffer.push_str(&mut frag, "Refresh");
        let mut reader = buffer.reader(frag);
        let (inspected, truncated) = reader.get_string(64);
        assert_eq!(inspected, "Refresh");
        assert!(!truncated);
        assert_eq!(reader.read_char(), None);
        reader.rewind();
        let mut copy = String::new();
        reader.write_to(&mut copy);
        assert_eq!(copy, "Refresh");
    }

    #[test]
    fn get_string_truncates_on_char_boundary() {
        let mut buffer = TokenBuffer::new();
        let mut frag = buffer.begin_fragment();
        buffer.push_str(&mut frag, "aé");
        let mut reader = buffer.reader(frag);
        let (text, truncated) = reader.get_string(2);
        assert_eq!(text, "a");
        assert!(truncated);
        assert_eq!(reader.read_char(), Some('é'));
    }

    #[test]
    #[should_panic(expected = "used after its token buffer was reset")]
    fn stale_reader_is_rejected() {
        let mut buffer = TokenBuffer::new();
        let mut frag = buffer.begin_fragment();
        buffer.push_str(&mut frag, "x");
        let generation_before = buffer.generation();
        buffer.reset();
        assert_ne!(generation_before, buffer.generation());
        // Rebuild a reader by hand against the old generation.
        let reader = FragmentReader {
            buffer: &buffer,
            fragment: frag,
            generation: generation_before,
            run: 0,
            offset: 0,
        };
        let _ = reader.peek_char();
    }
}
