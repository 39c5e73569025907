use crate::cursor::{digit_value, Cursor};

/// Length of [`word_to_hex`] output, terminator excluded.
pub const WORD_HEX_LEN: usize = 2 + 2 * core::mem::size_of::<usize>();

/// Renders `bytes` as two lowercase hex digits each, optionally after a `0x`
/// prefix.
///
/// Fails unless `out` holds `2 * bytes.len() + 1` bytes (two more with the
/// prefix).
pub fn bytes_to_hex<'a>(bytes: &[u8], out: &'a mut [u8], prefixed: bool) -> Option<&'a str> {
    let needed = 2 * bytes.len() + 1 + if prefixed { 2 } else { 0 };
    if out.len() < needed {
        return None;
    }
    let mut cursor = Cursor::new(out);
    if prefixed {
        cursor.push_str(b"0x")?;
    }
    for &byte in bytes {
        cursor.push_digits(byte as u64, 16, 2)?;
    }
    cursor.finish()
}

/// Decodes hex text (optionally `0x`-prefixed) into `out`, returning the
/// decoded prefix of `out`.
///
/// Fails on an odd digit count, a non-hex byte, or when `out` is too short.
pub fn hex_to_bytes<'a>(text: &[u8], out: &'a mut [u8]) -> Option<&'a [u8]> {
    let digits = match text {
        [b'0', b'x' | b'X', rest @ ..] => rest,
        _ => text,
    };
    if digits.len() % 2 != 0 || digits.len() / 2 > out.len() {
        return None;
    }
    for (slot, pair) in out.iter_mut().zip(digits.chunks_exact(2)) {
        let high = digit_value(pair[0]).filter(|&d| d < 16)?;
        let low = digit_value(pair[1]).filter(|&d| d < 16)?;
        *slot = (high * 16 + low) as u8;
    }
    Some(&out[..digits.len() / 2])
}

/// Renders a machine word as `0x` followed by zero-padded hex digits, the
/// fixed width used for addresses in diagnostics.
pub fn word_to_hex(value: usize, out: &mut [u8]) -> Option<&str> {
    if out.len() < WORD_HEX_LEN + 1 {
        return None;
    }
    let mut cursor = Cursor::new(out);
    cursor.push_str(b"0x")?;
    cursor.push_digits(value as u64, 16, 2 * core::mem::size_of::<usize>())?;
    cursor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_bytes() {
        let mut out = [0u8; 9];
        assert_eq!(bytes_to_hex(&[0xde, 0xad, 0x00, 0x0f], &mut out, false), Some("dead000f"));
        assert_eq!(out[8], 0);
    }

    #[test]
    fn encodes_with_prefix() {
        let mut out = [0u8; 7];
        assert_eq!(bytes_to_hex(&[0x01, 0xab], &mut out, true), Some("0x01ab"));
    }

    #[test]
    fn short_output_fails() {
        let mut out = [0u8; 8];
        assert!(bytes_to_hex(&[1, 2, 3, 4], &mut out, false).is_none());
        let mut out = [0u8; 5];
        assert!(bytes_to_hex(&[1, 2], &mut out, true).is_none());
    }

    #[test]
    fn empty_input_needs_only_terminator() {
        let mut out = [0xffu8; 1];
        assert_eq!(bytes_to_hex(&[], &mut out, false), Some(""));
        assert_eq!(out[0], 0);
    }

    #[test]
    fn decodes_hex() {
        let mut out = [0u8; 4];
        assert_eq!(hex_to_bytes(b"0xDEad", &mut out), Some(&[0xde, 0xad][..]));
        assert_eq!(hex_to_bytes(b"00ff10", &mut out), Some(&[0x00, 0xff, 0x10][..]));
    }

    #[test]
    fn rejects_malformed_hex() {
        let mut out = [0u8; 4];
        assert!(hex_to_bytes(b"abc", &mut out).is_none());
        assert!(hex_to_bytes(b"zz", &mut out).is_none());
        assert!(hex_to_bytes(b"0011223344", &mut out).is_none());
    }

    #[test]
    fn bytes_survive_hex_round_trip() {
        let data: Vec<u8> = (0..=255).collect();
        let mut text = [0u8; 2 * 256 + 3];
        let encoded = bytes_to_hex(&data, &mut text, true).unwrap().as_bytes().to_vec();
        let mut decoded = [0u8; 256];
        assert_eq!(hex_to_bytes(&encoded, &mut decoded), Some(&data[..]));
    }

    #[test]
    fn word_is_zero_padded() {
        let mut out = [0u8; WORD_HEX_LEN + 1];
        let text = word_to_hex(0x1f, &mut out).unwrap();
        assert_eq!(text.len(), WORD_HEX_LEN);
        assert!(text.starts_with("0x"));
        assert!(text.ends_with("01f"));
        assert!(text[2..text.len() - 2].bytes().all(|b| b == b'0'));
    }

    #[test]
    fn word_needs_full_width() {
        let mut out = [0u8; WORD_HEX_LEN];
        assert!(word_to_hex(0, &mut out).is_none());
    }
}
