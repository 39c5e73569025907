use crate::cursor::{decimal_len, digit_value, Cursor};
use crate::parse::Parsed;
use crate::tables::FLOAT_TABLES;

/// Upper bound on fractional digits; larger requests are capped.
pub const MAX_FRACTION_DIGITS: usize = 15;

/// First value whose integer part no longer fits in a `u64`.
const U64_CEILING: f64 = 18446744073709551616.0;

pub const NAN_TEXT: &str = "nan";
pub const INF_TEXT: &str = "inf";
pub const BIG_TEXT: &str = "big";
pub const WEE_TEXT: &str = "wee";

/// Renders `value` with `digits` fractional digits, rounding half up.
///
/// Values that cannot be shown as ordinary digits become sentinel text,
/// after a `-` for negative values:
///
/// | value                                    | text  |
/// |------------------------------------------|-------|
/// | not a number                             | `nan` |
/// | infinite                                 | `inf` |
/// | magnitude `>= 2^64`                      | `big` |
/// | magnitude rounding to zero at `digits`   | `wee` |
///
/// Zero renders as `0` or `0.` followed by `digits` zeros. When the integer
/// part does not fit the result is `None`. When only the fraction does not
/// fit, `digits` is reduced until it does and the value is rounded again, so
/// a narrow buffer yields a shorter but still correct rendering. A value that
/// rounds to zero at the reduced count is `wee`, as if that count had been
/// asked for.
#[allow(clippy::eq_op)]
pub fn format_f64(value: f64, out: &mut [u8], digits: usize) -> Option<&str> {
    let mut cursor = Cursor::new(out);
    if value != value {
        return sentinel(cursor, NAN_TEXT);
    }

    let mut value = value;
    if value < 0.0 {
        cursor.push(b'-')?;
        if cursor.remaining() == 0 {
            return None;
        }
        value = -value;
    }

    let digits = digits.min(MAX_FRACTION_DIGITS);
    if value == 0.0 {
        return write_zero(cursor, digits);
    }
    if value / 2.0 == value {
        return sentinel(cursor, INF_TEXT);
    }
    if value >= U64_CEILING {
        return sentinel(cursor, BIG_TEXT);
    }
    if value < FLOAT_TABLES.rounding[digits] {
        return sentinel(cursor, WEE_TEXT);
    }
    write_fixed(cursor, value, digits)
}

fn sentinel<'a>(mut cursor: Cursor<'a>, text: &str) -> Option<&'a str> {
    cursor.push_str(text.as_bytes())?;
    cursor.finish()
}

fn write_zero(mut cursor: Cursor<'_>, digits: usize) -> Option<&str> {
    cursor.push(b'0')?;
    let digits = digits.min(cursor.remaining().saturating_sub(1));
    if digits > 0 {
        cursor.push(b'.')?;
        cursor.push_digits(0, 10, digits)?;
    }
    cursor.finish()
}

/// Splits `value` into whole and fractional parts at `digits` digits, rounded
/// half up. Rounding happens on the scaled integer while it fits in a `u64`;
/// wider values add the rounding constant directly.
fn split_rounded(value: f64, digits: usize) -> (u64, u64) {
    let tables = &*FLOAT_TABLES;
    let scale = tables.pow10[digits];
    let scaled = value * scale + 0.5;
    if scaled < U64_CEILING {
        let units = scaled as u64;
        let scale = scale as u64;
        return (units / scale, units % scale);
    }
    let rounded = value + tables.rounding[digits];
    let whole = rounded as u64;
    let limit = scale as u64 - 1;
    let fraction = (((rounded - whole as f64) * scale) as u64).min(limit);
    (whole, fraction)
}

fn write_fixed(mut cursor: Cursor<'_>, value: f64, digits: usize) -> Option<&str> {
    let mut digits = digits;
    loop {
        let (whole, fraction) = split_rounded(value, digits);
        let room = cursor.remaining();
        let whole_len = decimal_len(whole);
        if whole_len > room {
            return None;
        }

        let fraction_room = room - whole_len;
        if digits > 0 && fraction_room < digits + 1 {
            digits = fraction_room.saturating_sub(1);
            if value < FLOAT_TABLES.rounding[digits] {
                return sentinel(cursor, WEE_TEXT);
            }
            continue;
        }

        cursor.push_digits(whole, 10, 1)?;
        if digits > 0 {
            cursor.push(b'.')?;
            cursor.push_digits(fraction, 10, digits)?;
        }
        return cursor.finish();
    }
}

/// Parses a decimal floating-point number: optional whitespace and sign,
/// digits with an optional fraction, and an optional `e`/`E` exponent. The
/// words `nan` and `inf` are accepted in any case. `end == 0` when nothing
/// was converted.
pub fn parse_f64(text: &[u8]) -> Parsed<f64> {
    let mut i = 0;
    while i < text.len() && text[i].is_ascii_whitespace() {
        i += 1;
    }

    let mut negative = false;
    if i < text.len() && (text[i] == b'+' || text[i] == b'-') {
        negative = text[i] == b'-';
        i += 1;
    }
    let sign = if negative { -1.0 } else { 1.0 };

    if starts_with_word(&text[i..], b"nan") {
        return Parsed { value: f64::NAN, end: i + 3 };
    }
    if starts_with_word(&text[i..], b"inf") {
        return Parsed { value: sign * f64::INFINITY, end: i + 3 };
    }

    let mut mantissa = 0.0;
    let mut exponent: i32 = 0;
    let mut seen_digit = false;
    while let Some(d) = text.get(i).and_then(|&b| decimal_digit(b)) {
        mantissa = mantissa * 10.0 + d as f64;
        seen_digit = true;
        i += 1;
    }
    if text.get(i) == Some(&b'.') {
        let mut j = i + 1;
        while let Some(d) = text.get(j).and_then(|&b| decimal_digit(b)) {
            mantissa = mantissa * 10.0 + d as f64;
            exponent = exponent.saturating_sub(1);
            seen_digit = true;
            j += 1;
        }
        if seen_digit {
            i = j;
        }
    }
    if !seen_digit {
        return Parsed { value: 0.0, end: 0 };
    }

    if matches!(text.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        let mut exp_negative = false;
        if matches!(text.get(j), Some(b'+' | b'-')) {
            exp_negative = text[j] == b'-';
            j += 1;
        }
        let mut exp: i32 = 0;
        let mut exp_digits = false;
        while let Some(d) = text.get(j).and_then(|&b| decimal_digit(b)) {
            exp = exp.saturating_mul(10).saturating_add(d as i32);
            exp_digits = true;
            j += 1;
        }
        if exp_digits {
            exponent = exponent.saturating_add(if exp_negative { -exp } else { exp });
            i = j;
        }
    }

    Parsed { value: sign * scale10(mantissa, exponent), end: i }
}

fn decimal_digit(byte: u8) -> Option<u8> {
    digit_value(byte).filter(|&d| d < 10).map(|d| d as u8)
}

fn starts_with_word(text: &[u8], word: &[u8]) -> bool {
    text.len() >= word.len() && text[..word.len()].eq_ignore_ascii_case(word)
}

/// `value * 10^exponent`, stepping through the power table so that large
/// exponents need few roundings.
fn scale10(mut value: f64, exponent: i32) -> f64 {
    let tables = &*FLOAT_TABLES;
    let mut remaining = exponent.clamp(-700, 700);
    while remaining != 0 && value != 0.0 && value.is_finite() {
        let step = remaining.unsigned_abs().min(MAX_FRACTION_DIGITS as u32) as usize;
        if remaining > 0 {
            value *= tables.pow10[step];
            remaining -= step as i32;
        } else {
            value /= tables.pow10[step];
            remaining += step as i32;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn render(value: f64, capacity: usize, digits: usize) -> Option<String> {
        let mut buf = vec![0xaau8; capacity];
        format_f64(value, &mut buf, digits).map(str::to_owned)
    }

    #[test]
    fn sixteenth_with_four_digits() {
        assert!(render(1.0 / 16.0, 32, 4).unwrap().contains("0.0625"));
    }

    #[test]
    fn negative_with_two_digits() {
        assert!(render(-600.0 / 32.0, 32, 2).unwrap().contains("-18.75"));
    }

    #[test]
    fn nan_sentinel() {
        assert!(render(f64::NAN, 32, 10).unwrap().contains("nan"));
    }

    #[test]
    fn sign_without_room_for_digit_fails() {
        assert_eq!(render(-2.0, 2, 1), None);
    }

    #[test]
    fn empty_buffer_fails() {
        assert_eq!(render(1.0, 0, 1), None);
        assert_eq!(render(f64::NAN, 0, 1), None);
    }

    #[test]
    fn infinity_sentinels() {
        assert_eq!(render(f64::INFINITY, 8, 2).as_deref(), Some("inf"));
        assert_eq!(render(f64::NEG_INFINITY, 8, 2).as_deref(), Some("-inf"));
    }

    #[test]
    fn big_and_wee_sentinels() {
        assert_eq!(render(1e20, 8, 2).as_deref(), Some("big"));
        assert_eq!(render(U64_CEILING, 8, 0).as_deref(), Some("big"));
        assert_eq!(render(1e-7, 8, 4).as_deref(), Some("wee"));
        assert_eq!(render(-1e-7, 8, 4).as_deref(), Some("-wee"));
        assert_eq!(render(0.4, 8, 0).as_deref(), Some("wee"));
    }

    #[test]
    fn sentinel_that_does_not_fit_fails() {
        assert_eq!(render(f64::NAN, 3, 2), None);
        assert_eq!(render(f64::NAN, 4, 2).as_deref(), Some("nan"));
    }

    #[test]
    fn zero_is_padded() {
        assert_eq!(render(0.0, 8, 0).as_deref(), Some("0"));
        assert_eq!(render(0.0, 8, 3).as_deref(), Some("0.000"));
        assert_eq!(render(-0.0, 8, 1).as_deref(), Some("0.0"));
        assert_eq!(render(0.0, 4, 5).as_deref(), Some("0.0"));
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(render(2.5, 8, 0).as_deref(), Some("3"));
        assert_eq!(render(0.25, 8, 1).as_deref(), Some("0.3"));
        assert_eq!(render(1.0, 8, 2).as_deref(), Some("1.00"));
        assert_eq!(render(9.999, 8, 2).as_deref(), Some("10.00"));
    }

    #[test]
    fn clamps_fraction_to_capacity() {
        assert_eq!(render(123.456, 6, 3).as_deref(), Some("123.5"));
        assert_eq!(render(123.456, 5, 3).as_deref(), Some("123"));
        assert_eq!(render(9.96, 3, 2).as_deref(), Some("10"));
    }

    #[test]
    fn clamping_to_zero_fraction_gives_wee() {
        assert_eq!(render(0.04, 4, 3).as_deref(), Some("wee"));
        assert_eq!(render(0.04, 4, 3), render(0.04, 4, 1));
        assert_eq!(render(-0.04, 5, 3).as_deref(), Some("-wee"));
        assert_eq!(render(0.4, 2, 3), None);
        assert_eq!(render(0.4, 2, 3), render(0.4, 2, 0));
        assert_eq!(render(0.4, 4, 3).as_deref(), Some("0.4"));
    }

    #[test]
    fn whole_part_that_does_not_fit_fails() {
        assert_eq!(render(12345.0, 4, 0), None);
        assert_eq!(render(-1234.0, 5, 2), None);
    }

    #[test]
    fn digits_are_capped() {
        let text = render(0.5, 64, 40).unwrap();
        assert_eq!(text.len(), 2 + MAX_FRACTION_DIGITS);
        assert!(text.starts_with("0.5"));
    }

    #[test]
    fn output_is_terminated() {
        let mut buf = [0xaau8; 8];
        let len = format_f64(1.5, &mut buf, 1).unwrap().len();
        assert_eq!(buf[len], 0);
        assert_eq!(buf[len + 1], 0xaa);
    }

    #[test]
    fn parses_decimal_text() {
        assert_eq!(parse_f64(b"3.25"), Parsed { value: 3.25, end: 4 });
        assert_eq!(parse_f64(b"-0.5e1x"), Parsed { value: -5.0, end: 6 });
        assert_eq!(parse_f64(b"  .5"), Parsed { value: 0.5, end: 4 });
        assert_eq!(parse_f64(b"7."), Parsed { value: 7.0, end: 2 });
        assert_eq!(parse_f64(b"1e"), Parsed { value: 1.0, end: 1 });
        assert_eq!(parse_f64(b"2E-2"), Parsed { value: 0.02, end: 4 });
    }

    #[test]
    fn parses_sentinel_words() {
        let nan = parse_f64(b"NaN!");
        assert!(nan.value.is_nan());
        assert_eq!(nan.end, 3);
        assert_eq!(parse_f64(b"-inf"), Parsed { value: f64::NEG_INFINITY, end: 4 });
        assert_eq!(parse_f64(b"1e400").value, f64::INFINITY);
    }

    #[test]
    fn rejects_text_without_digits() {
        assert_eq!(parse_f64(b"."), Parsed { value: 0.0, end: 0 });
        assert_eq!(parse_f64(b"-e5"), Parsed { value: 0.0, end: 0 });
        assert_eq!(parse_f64(b""), Parsed { value: 0.0, end: 0 });
    }

    proptest! {
        #[test]
        fn rendering_parses_back_within_rounding(value in -1.0e6f64..1.0e6) {
            let mut buf = [0u8; 32];
            let text = format_f64(value, &mut buf, 6).unwrap();
            prop_assume!(!text.contains(WEE_TEXT));
            let parsed = parse_f64(text.as_bytes());
            prop_assert_eq!(parsed.end, text.len());
            prop_assert!((parsed.value - value).abs() <= 1.01e-6);
        }
    }
}
