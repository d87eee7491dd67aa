//! Character reference decoding for text and attribute values.
//!
//! Contract:
//! - Named references decoded: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`
//!   (case-sensitive, semicolon required).
//! - Numeric references decoded only when well-formed and semicolon-terminated:
//!   `&#123;` (decimal) and `&#x1F4A9;` (hex).
//! - `&#0;` decodes to U+FFFD; surrogates and values above U+10FFFF are left as-is.
//! - Anything else is literal text. The writer re-escapes every `&`, so a
//!   reference left undecoded is still safe in the output.
//!
//! Decoding is incremental: a reference cut by the end of the available input
//! reports `Incomplete` so the tokenizer can hold it back until more input
//! arrives (or end of input is known).

const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111

const NAMED: &[(&str, char)] = &[
    ("amp;", '&'),
    ("lt;", '<'),
    ("gt;", '>'),
    ("quot;", '"'),
    ("apos;", '\''),
    ("nbsp;", '\u{00A0}'),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Reference {
    /// `len` bytes starting at `&` decode to `ch`.
    Decoded { ch: char, len: usize },
    /// The `&` is plain text.
    Literal,
    /// The input ends inside something that may still become a reference.
    Incomplete,
}

/// Classify the reference starting at `input[0]`, which must be `&`.
pub(crate) fn decode_reference(input: &str, at_eof: bool) -> Reference {
    debug_assert!(input.starts_with('&'));
    let rest = &input.as_bytes()[1..];
    let incomplete = if at_eof {
        Reference::Literal
    } else {
        Reference::Incomplete
    };

    if rest.first() == Some(&b'#') {
        return decode_numeric(&rest[1..], incomplete);
    }

    for (name, ch) in NAMED {
        let name = name.as_bytes();
        if rest.starts_with(name) {
            return Reference::Decoded {
                ch: *ch,
                len: 1 + name.len(),
            };
        }
        if rest.len() < name.len() && name.starts_with(rest) {
            return incomplete;
        }
    }
    Reference::Literal
}

fn decode_numeric(bytes: &[u8], incomplete: Reference) -> Reference {
    // `bytes` follows "&#".
    let (is_hex, digits_start) = match bytes.first() {
        None => return incomplete,
        Some(b'x' | b'X') => (true, 1),
        Some(_) => (false, 0),
    };
    let max_digits = if is_hex { MAX_HEX_DIGITS } else { MAX_DEC_DIGITS };

    let mut value: u32 = 0;
    let mut j = digits_start;
    loop {
        let Some(&b) = bytes.get(j) else {
            return incomplete;
        };
        if b == b';' {
            if j == digits_start {
                return Reference::Literal;
            }
            break;
        }
        if j - digits_start == max_digits {
            return Reference::Literal;
        }
        let digit = if is_hex {
            (b as char).to_digit(16)
        } else {
            (b as char).to_digit(10)
        };
        let Some(digit) = digit else {
            return Reference::Literal;
        };
        value = value * if is_hex { 16 } else { 10 } + digit;
        j += 1;
    }

    // "&#" + digits (+ "x") + ";"
    let len = 2 + j + 1;
    match value {
        0 => Reference::Decoded { ch: '\u{FFFD}', len },
        _ => match char::from_u32(value) {
            Some(ch) => Reference::Decoded { ch, len },
            None => Reference::Literal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_references() {
        assert_eq!(decode_reference("&amp;x", false), Reference::Decoded { ch: '&', len: 5 });
        assert_eq!(decode_reference("&lt;", true), Reference::Decoded { ch: '<', len: 4 });
        assert_eq!(
            decode_reference("&nbsp;", false),
            Reference::Decoded { ch: '\u{00A0}', len: 6 }
        );
        assert_eq!(decode_reference("&AMP;", false), Reference::Literal);
        assert_eq!(decode_reference("&amp", true), Reference::Literal);
        assert_eq!(decode_reference("& b", false), Reference::Literal);
    }

    #[test]
    fn cut_references_wait_for_more_input() {
        assert_eq!(decode_reference("&", false), Reference::Incomplete);
        assert_eq!(decode_reference("&am", false), Reference::Incomplete);
        assert_eq!(decode_reference("&amp", false), Reference::Incomplete);
        assert_eq!(decode_reference("&#x1F", false), Reference::Incomplete);
        assert_eq!(decode_reference("&#", false), Reference::Incomplete);
        assert_eq!(decode_reference("&#", true), Reference::Literal);
    }

    #[test]
    fn numeric_references() {
        assert_eq!(decode_reference("&#65;", false), Reference::Decoded { ch: 'A', len: 5 });
        assert_eq!(
            decode_reference("&#x1F4A9;", false),
            Reference::Decoded { ch: '\u{1F4A9}', len: 9 }
        );
        assert_eq!(
            decode_reference("&#0;", false),
            Reference::Decoded { ch: '\u{FFFD}', len: 4 }
        );
        assert_eq!(decode_reference("&#xD800;", false), Reference::Literal);
        assert_eq!(decode_reference("&#x110000;", false), Reference::Literal);
        assert_eq!(decode_reference("&#65 ", false), Reference::Literal);
        assert_eq!(decode_reference("&#;", false), Reference::Literal);
        assert_eq!(decode_reference("&#x;", false), Reference::Literal);
        assert_eq!(decode_reference("&#00000065;", false), Reference::Literal);
    }
}
