//! CSS length/number parsing into a fixed twip-based unit.
//!
//! Absolute lengths are converted to twips (1/20 of a point). Relative units
//! and bare numbers keep their magnitude scaled by 20, so `1.5em` and `1.5`
//! both parse to 30 with the unit recorded separately.
//!
//! Invariants:
//! - Arithmetic saturates. Any magnitude that does not fit clamps to
//!   `±MAX_VALUE`; a parse never wraps into a negative or garbage value.
//! - `e`/`E` is an exponent marker only when followed by a digit, or by a sign
//!   and a digit. Otherwise it starts the unit (`1em`, `2ex`).

/// Clamp value for lengths too large to represent.
pub const MAX_VALUE: i32 = i32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CssUnit {
    None,
    Pt,
    Pc,
    Px,
    Em,
    Ex,
    In,
    Cm,
    Mm,
    Percent,
    /// Relative multiple (`*`), as in `cols="1*,2*"`.
    Multiple,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CssNumber {
    pub unit: CssUnit,
    pub value: i32,
}

// Mantissa digits beyond this are folded into the exponent.
const MANTISSA_CAP: i128 = 100_000_000_000_000_000_000;
const EXPONENT_CAP: i64 = 10_000;

/// Multiplier and decimal shift that take a value to twips.
fn scale(unit: CssUnit) -> (i128, i64) {
    match unit {
        CssUnit::Pt => (20, 0),
        CssUnit::Pc => (240, 0),
        CssUnit::Px => (15, 0),
        CssUnit::In => (1440, 0),
        CssUnit::Cm => (567, 0),
        CssUnit::Mm => (567, -1),
        CssUnit::None
        | CssUnit::Em
        | CssUnit::Ex
        | CssUnit::Percent
        | CssUnit::Multiple => (20, 0),
    }
}

fn parse_unit(rest: &[u8]) -> (CssUnit, usize) {
    if let Some(&first) = rest.first() {
        match first {
            b'%' => return (CssUnit::Percent, 1),
            b'*' => return (CssUnit::Multiple, 1),
            _ => {}
        }
    }
    if rest.len() < 2 {
        return (CssUnit::None, 0);
    }
    let pair = [rest[0].to_ascii_lowercase(), rest[1].to_ascii_lowercase()];
    let unit = match &pair {
        b"pt" => CssUnit::Pt,
        b"pc" => CssUnit::Pc,
        b"px" => CssUnit::Px,
        b"em" => CssUnit::Em,
        b"ex" => CssUnit::Ex,
        b"in" => CssUnit::In,
        b"cm" => CssUnit::Cm,
        b"mm" => CssUnit::Mm,
        _ => return (CssUnit::None, 0),
    };
    (unit, 2)
}

/// Parse a CSS number with an optional unit.
///
/// In strict mode anything other than trailing whitespace after the unit
/// rejects the whole value; otherwise it is ignored.
pub fn parse_number(text: &str, strict: bool) -> Option<CssNumber> {
    let bytes = text.trim_start().as_bytes();
    let mut i = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let mut mantissa: i128 = 0;
    let mut exponent: i64 = 0;
    let mut digits = 0usize;

    while let Some(&b) = bytes.get(i) {
        if !b.is_ascii_digit() {
            break;
        }
        if mantissa < MANTISSA_CAP {
            mantissa = mantissa * 10 + i128::from(b - b'0');
        } else {
            exponent += 1;
        }
        digits += 1;
        i += 1;
    }
    if bytes.get(i) == Some(&b'.') {
        let mut j = i + 1;
        let mut fraction_digits = 0usize;
        while let Some(&b) = bytes.get(j) {
            if !b.is_ascii_digit() {
                break;
            }
            if mantissa < MANTISSA_CAP {
                mantissa = mantissa * 10 + i128::from(b - b'0');
                exponent -= 1;
            }
            fraction_digits += 1;
            j += 1;
        }
        if fraction_digits > 0 {
            digits += fraction_digits;
            i = j;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        let exp_negative = match bytes.get(j) {
            Some(b'-') => {
                j += 1;
                true
            }
            Some(b'+') => {
                j += 1;
                false
            }
            _ => false,
        };
        if bytes.get(j).is_some_and(u8::is_ascii_digit) {
            let mut value: i64 = 0;
            while let Some(&b) = bytes.get(j) {
                if !b.is_ascii_digit() {
                    break;
                }
                value = (value * 10 + i64::from(b - b'0')).min(EXPONENT_CAP);
                j += 1;
            }
            exponent += if exp_negative { -value } else { value };
            i = j;
        }
    }

    let (unit, unit_len) = parse_unit(&bytes[i..]);
    i += unit_len;
    if strict && !bytes[i..].iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    let (factor, shift) = scale(unit);
    let magnitude = apply_exponent(mantissa * factor, exponent + shift);
    let value = if negative { -magnitude } else { magnitude };
    Some(CssNumber { unit, value })
}

fn apply_exponent(mut value: i128, exponent: i64) -> i32 {
    let limit = i128::from(MAX_VALUE);
    if value == 0 {
        return 0;
    }
    if exponent >= 0 {
        for _ in 0..exponent {
            value *= 10;
            if value > limit {
                return MAX_VALUE;
            }
        }
    } else {
        for _ in 0..exponent.unsigned_abs() {
            value /= 10;
            if value == 0 {
                return 0;
            }
        }
    }
    value.min(limit) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(unit: CssUnit, value: i32) -> Option<CssNumber> {
        Some(CssNumber { unit, value })
    }

    #[test]
    fn absolute_units_convert_to_twips() {
        assert_eq!(parse_number("1pt", true), num(CssUnit::Pt, 20));
        assert_eq!(parse_number("1pc", true), num(CssUnit::Pc, 240));
        assert_eq!(parse_number("2px", true), num(CssUnit::Px, 30));
        assert_eq!(parse_number("1in", true), num(CssUnit::In, 1440));
        assert_eq!(parse_number("1cm", true), num(CssUnit::Cm, 567));
        assert_eq!(parse_number("10mm", true), num(CssUnit::Mm, 567));
    }

    #[test]
    fn relative_units_and_bare_numbers_scale_by_twenty() {
        assert_eq!(parse_number("1.5em", true), num(CssUnit::Em, 30));
        assert_eq!(parse_number("2ex", true), num(CssUnit::Ex, 40));
        assert_eq!(parse_number("50%", true), num(CssUnit::Percent, 1000));
        assert_eq!(parse_number("3*", true), num(CssUnit::Multiple, 60));
        assert_eq!(parse_number("+.5", true), num(CssUnit::None, 10));
        assert_eq!(parse_number("-4", true), num(CssUnit::None, -80));
    }

    #[test]
    fn scientific_notation_and_em_do_not_collide() {
        assert_eq!(parse_number("1e2pt", true), num(CssUnit::Pt, 2000));
        assert_eq!(parse_number("1e-1pt", true), num(CssUnit::Pt, 2));
        assert_eq!(parse_number("1E+1", true), num(CssUnit::None, 200));
        assert_eq!(parse_number("1em", true), num(CssUnit::Em, 20));
        assert_eq!(parse_number("1e", false), num(CssUnit::None, 20));
    }

    #[test]
    fn huge_exponent_saturates_instead_of_wrapping() {
        assert_eq!(parse_number("1e999999999pt", true), num(CssUnit::Pt, MAX_VALUE));
        assert_eq!(parse_number("-1e40in", true), num(CssUnit::In, -MAX_VALUE));
        let digits = "9".repeat(400);
        assert_eq!(parse_number(&digits, true), num(CssUnit::None, MAX_VALUE));
        assert_eq!(parse_number("1e-99999px", true), num(CssUnit::Px, 0));
    }

    #[test]
    fn strict_mode_rejects_trailing_garbage() {
        assert_eq!(parse_number("12pxfoo", true), None);
        assert_eq!(parse_number("12vw", true), None);
        assert_eq!(parse_number("12pt  ", true), num(CssUnit::Pt, 240));
        assert_eq!(parse_number("12pxfoo", false), num(CssUnit::Px, 180));
        assert_eq!(parse_number("12vw", false), num(CssUnit::None, 240));
    }

    #[test]
    fn non_numbers_are_rejected() {
        assert_eq!(parse_number("", false), None);
        assert_eq!(parse_number("-", false), None);
        assert_eq!(parse_number(".", false), None);
        assert_eq!(parse_number("auto", false), None);
    }
}
