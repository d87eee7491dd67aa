//! Streaming UTF-8 decoding for byte sources that feed the converter.
//!
//! Input read from a file or pipe arrives in arbitrary byte chunks; the
//! converter consumes `&str`. [`Utf8ChunkDecoder`] holds back an incomplete
//! trailing sequence between chunks and replaces invalid bytes with U+FFFD.

const REPLACEMENT: char = '\u{FFFD}';

#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: [u8; 4],
    pending_len: usize,
}

fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes held back waiting for the rest of a sequence.
    pub fn pending_len(&self) -> usize {
        self.pending_len
    }

    /// Decode `bytes` and append the complete characters to `out`.
    pub fn decode(&mut self, mut bytes: &[u8], out: &mut String) {
        while self.pending_len > 0 && !bytes.is_empty() {
            let Some(want) = sequence_len(self.pending[0]) else {
                out.push(REPLACEMENT);
                self.pending_len = 0;
                break;
            };
            let take = (want - self.pending_len).min(bytes.len());
            self.pending[self.pending_len..self.pending_len + take].copy_from_slice(&bytes[..take]);
            self.pending_len += take;
            bytes = &bytes[take..];
            if self.pending_len < want {
                return;
            }
            let held = self.pending;
            let held_len = self.pending_len;
            self.pending_len = 0;
            // An invalid held sequence resolves to replacements; any bytes it
            // leaves pending are re-examined by the loop.
            self.decode_complete(&held[..held_len], out);
        }
        self.decode_complete(bytes, out);
    }

    fn decode_complete(&mut self, mut bytes: &[u8], out: &mut String) {
        while !bytes.is_empty() {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    out.push_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, rest) = bytes.split_at(err.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(bad) => {
                            out.push(REPLACEMENT);
                            bytes = &rest[bad..];
                        }
                        None => {
                            self.pending[..rest.len()].copy_from_slice(rest);
                            self.pending_len = rest.len();
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Flush a held-back incomplete sequence as a single U+FFFD.
    pub fn finish(&mut self, out: &mut String) {
        if self.pending_len > 0 {
            out.push(REPLACEMENT);
            self.pending_len = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_split_across_chunks_is_joined() {
        let mut decoder = Utf8ChunkDecoder::new();
        let mut out = String::new();
        decoder.decode(&[b'a', 0xE2, 0x82], &mut out);
        assert_eq!(out, "a");
        assert_eq!(decoder.pending_len(), 2);
        decoder.decode(&[0xAC, b'b'], &mut out);
        assert_eq!(out, "a\u{20AC}b");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn four_byte_sequence_one_byte_at_a_time() {
        let mut decoder = Utf8ChunkDecoder::new();
        let mut out = String::new();
        for byte in "\u{1F600}".as_bytes() {
            decoder.decode(std::slice::from_ref(byte), &mut out);
        }
        assert_eq!(out, "\u{1F600}");
    }

    #[test]
    fn invalid_bytes_become_replacements() {
        let mut decoder = Utf8ChunkDecoder::new();
        let mut out = String::new();
        decoder.decode(&[0xFF, b'x'], &mut out);
        assert_eq!(out, "\u{FFFD}x");
    }

    #[test]
    fn truncated_tail_is_flushed_on_finish() {
        let mut decoder = Utf8ChunkDecoder::new();
        let mut out = String::new();
        decoder.decode(&[0xF0, 0x9F], &mut out);
        decoder.finish(&mut out);
        assert_eq!(out, "\u{FFFD}");
    }
}
