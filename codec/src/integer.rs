use crate::cursor::Cursor;

/// Renders `value` in decimal.
///
/// The buffer must hold every digit plus the terminator; a capacity of 0 or 1
/// therefore always fails.
pub fn format_u64(value: u64, out: &mut [u8]) -> Option<&str> {
    let mut cursor = Cursor::new(out);
    cursor.push_digits(value, 10, 1)?;
    cursor.finish()
}

/// Renders `value` in decimal with a leading `-` when negative.
pub fn format_i64(value: i64, out: &mut [u8]) -> Option<&str> {
    let mut cursor = Cursor::new(out);
    if value < 0 {
        cursor.push(b'-')?;
    }
    cursor.push_digits(value.unsigned_abs(), 10, 1)?;
    cursor.finish()
}

/// Renders `value` in `radix` with lowercase digits and no prefix.
///
/// # Panics
/// When `radix` is outside `2..=36`.
pub fn format_radix(value: u64, radix: u32, out: &mut [u8]) -> Option<&str> {
    assert!((2..=36).contains(&radix), "radix {} outside 2..=36", radix);
    let mut cursor = Cursor::new(out);
    cursor.push_digits(value, radix as u64, 1)?;
    cursor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::INTEGER_TEXT_LEN;

    #[test]
    fn formats_zero() {
        let mut buf = [0xffu8; 2];
        assert_eq!(format_u64(0, &mut buf), Some("0"));
        assert_eq!(buf[1], 0);
    }

    #[test]
    fn formats_extremes() {
        let mut buf = [0u8; INTEGER_TEXT_LEN];
        assert_eq!(format_u64(u64::MAX, &mut buf), Some("18446744073709551615"));
        assert_eq!(format_i64(i64::MIN, &mut buf), Some("-9223372036854775808"));
        assert_eq!(format_i64(i64::MAX, &mut buf), Some("9223372036854775807"));
    }

    #[test]
    fn tiny_capacity_fails() {
        assert!(format_u64(0, &mut []).is_none());
        assert!(format_u64(0, &mut [0u8; 1]).is_none());
        assert!(format_i64(-1, &mut [0u8; 2]).is_none());
    }

    #[test]
    fn exact_capacity_succeeds() {
        let mut buf = [0u8; 4];
        assert_eq!(format_u64(123, &mut buf), Some("123"));
        assert!(format_u64(1234, &mut buf).is_none());
    }

    #[test]
    fn failed_write_leaves_buffer_untouched() {
        let mut buf = [0xaau8; 3];
        assert!(format_u64(12345, &mut buf).is_none());
        assert_eq!(buf, [0xaa; 3]);
    }

    #[test]
    fn formats_other_radices() {
        let mut buf = [0u8; 70];
        assert_eq!(format_radix(255, 16, &mut buf), Some("ff"));
        assert_eq!(format_radix(5, 2, &mut buf), Some("101"));
        assert_eq!(format_radix(35, 36, &mut buf), Some("z"));
        assert_eq!(format_radix(u64::MAX, 2, &mut buf).map(str::len), Some(64));
    }

    #[test]
    #[should_panic(expected = "radix 1 outside")]
    fn radix_one_is_rejected() {
        let mut buf = [0u8; 8];
        let _ = format_radix(3, 1, &mut buf);
    }
}
