use crate::cursor::digit_value;

/// Result of a text-to-number conversion: the value and the index one past
/// the last consumed byte. `end == 0` means nothing was converted.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub end: usize,
}

struct Digits {
    magnitude: u64,
    negative: bool,
    overflow: bool,
    end: usize,
}

/// Parses an unsigned integer in `radix`.
///
/// Leading ASCII whitespace and one `+`/`-` are accepted, as is a `0x`/`0X`
/// prefix when `radix` is 16. Conversion stops at the first byte that is not
/// a digit of `radix`; the rest of `text` is ignored. Overflow saturates at
/// `u64::MAX`. A leading `-` negates the result modulo 2^64.
///
/// # Panics
/// When `radix` is outside `2..=36`.
pub fn parse_u64(text: &[u8], radix: u32) -> Parsed<u64> {
    let digits = scan(text, radix, u64::MAX);
    let value = if digits.overflow {
        u64::MAX
    } else if digits.negative {
        digits.magnitude.wrapping_neg()
    } else {
        digits.magnitude
    };
    Parsed { value, end: digits.end }
}

/// Parses a signed integer in `radix`; overflow saturates at `i64::MIN` or
/// `i64::MAX` depending on the sign. Otherwise behaves like [`parse_u64`].
pub fn parse_i64(text: &[u8], radix: u32) -> Parsed<i64> {
    let limit = i64::MAX as u64 + 1;
    let digits = scan(text, radix, limit);
    let value = match (digits.negative, digits.overflow) {
        (true, true) => i64::MIN,
        (false, true) => i64::MAX,
        (true, false) => (digits.magnitude as i64).wrapping_neg(),
        (false, false) if digits.magnitude == limit => i64::MAX,
        (false, false) => digits.magnitude as i64,
    };
    Parsed { value, end: digits.end }
}

fn scan(text: &[u8], radix: u32, limit: u64) -> Digits {
    assert!((2..=36).contains(&radix), "radix {} outside 2..=36", radix);

    let mut i = 0;
    while i < text.len() && text[i].is_ascii_whitespace() {
        i += 1;
    }

    let mut negative = false;
    if i < text.len() && (text[i] == b'+' || text[i] == b'-') {
        negative = text[i] == b'-';
        i += 1;
    }

    if radix == 16
        && text.len() > i + 2
        && text[i] == b'0'
        && (text[i + 1] == b'x' || text[i + 1] == b'X')
        && digit_value(text[i + 2]).is_some_and(|d| d < 16)
    {
        i += 2;
    }

    let first_digit = i;
    let mut magnitude: u64 = 0;
    let mut overflow = false;
    while i < text.len() {
        let digit = match digit_value(text[i]) {
            Some(d) if d < radix => d as u64,
            _ => break,
        };
        match magnitude
            .checked_mul(radix as u64)
            .and_then(|m| m.checked_add(digit))
            .filter(|&m| m <= limit)
        {
            Some(m) => magnitude = m,
            None => overflow = true,
        }
        i += 1;
    }

    if i == first_digit {
        return Digits { magnitude: 0, negative: false, overflow: false, end: 0 };
    }

    Digits { magnitude, negative, overflow, end: i }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{format_i64, format_radix};
    use proptest::prelude::*;

    #[test]
    fn stops_at_first_invalid_byte() {
        assert_eq!(parse_u64(b"123abc", 10), Parsed { value: 123, end: 3 });
        assert_eq!(parse_u64(b"123abc", 16), Parsed { value: 0x123abc, end: 6 });
        assert_eq!(parse_u64(b"10201", 2), Parsed { value: 2, end: 2 });
    }

    #[test]
    fn skips_whitespace_and_sign() {
        assert_eq!(parse_i64(b"  \t-42;", 10), Parsed { value: -42, end: 6 });
        assert_eq!(parse_i64(b"+7", 10), Parsed { value: 7, end: 2 });
    }

    #[test]
    fn hex_prefix_only_for_radix_sixteen() {
        assert_eq!(parse_u64(b"0x1f", 16), Parsed { value: 31, end: 4 });
        assert_eq!(parse_u64(b"0X1F", 16), Parsed { value: 31, end: 4 });
        assert_eq!(parse_u64(b"0x1f", 10), Parsed { value: 0, end: 1 });
        assert_eq!(parse_u64(b"0xg", 16), Parsed { value: 0, end: 1 });
    }

    #[test]
    fn no_digits_reports_zero_end() {
        assert_eq!(parse_u64(b"", 10), Parsed { value: 0, end: 0 });
        assert_eq!(parse_u64(b"  -", 10), Parsed { value: 0, end: 0 });
        assert_eq!(parse_i64(b"z", 35), Parsed { value: 0, end: 0 });
    }

    #[test]
    fn overflow_saturates() {
        assert_eq!(parse_u64(b"99999999999999999999999", 10).value, u64::MAX);
        assert_eq!(parse_u64(b"99999999999999999999999", 10).end, 23);
        assert_eq!(parse_i64(b"9223372036854775808", 10).value, i64::MAX);
        assert_eq!(parse_i64(b"-9223372036854775808", 10).value, i64::MIN);
        assert_eq!(parse_i64(b"-9223372036854775809", 10).value, i64::MIN);
    }

    #[test]
    fn unsigned_minus_wraps() {
        assert_eq!(parse_u64(b"-1", 10).value, u64::MAX);
    }

    #[test]
    fn radix_thirty_six_is_case_insensitive() {
        assert_eq!(parse_u64(b"Zz", 36).value, 35 * 36 + 35);
    }

    #[test]
    #[should_panic(expected = "radix 37 outside")]
    fn radix_above_thirty_six_is_rejected() {
        let _ = parse_u64(b"1", 37);
    }

    proptest! {
        #[test]
        fn unsigned_round_trip(value in any::<u64>(), radix in 2u32..=36) {
            let mut buf = [0u8; 70];
            let text = format_radix(value, radix, &mut buf).unwrap();
            let parsed = parse_u64(text.as_bytes(), radix);
            prop_assert_eq!(parsed.value, value);
            prop_assert_eq!(parsed.end, text.len());
        }

        #[test]
        fn signed_round_trip(value in any::<i64>()) {
            let mut buf = [0u8; crate::INTEGER_TEXT_LEN];
            let text = format_i64(value, &mut buf).unwrap();
            prop_assert_eq!(parse_i64(text.as_bytes(), 10), Parsed { value, end: text.len() });
        }
    }
}
