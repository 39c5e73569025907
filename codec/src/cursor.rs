/// Bounded writer over an output buffer. One byte is always held back for the
/// terminator, so `remaining` reports what text may still use.
pub(crate) struct Cursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos + 1)
    }

    pub(crate) fn push(&mut self, byte: u8) -> Option<()> {
        if self.remaining() == 0 {
            return None;
        }
        self.buf[self.pos] = byte;
        self.pos += 1;
        Some(())
    }

    pub(crate) fn push_str(&mut self, text: &[u8]) -> Option<()> {
        if text.len() > self.remaining() {
            return None;
        }
        self.buf[self.pos..self.pos + text.len()].copy_from_slice(text);
        self.pos += text.len();
        Some(())
    }

    /// Writes `value` in `radix`, most significant digit first, left-padded
    /// with zeros to `width`. Nothing is written when it does not fit.
    pub(crate) fn push_digits(&mut self, mut value: u64, radix: u64, width: usize) -> Option<()> {
        let mut scratch = [b'0'; 64];
        let mut len = 0;
        while value != 0 {
            scratch[len] = digit_char((value % radix) as u8);
            value /= radix;
            len += 1;
        }
        let len = len.max(width).max(1);
        if len > self.remaining() {
            return None;
        }
        for i in (0..len).rev() {
            self.buf[self.pos] = scratch.get(i).copied().unwrap_or(b'0');
            self.pos += 1;
        }
        Some(())
    }

    pub(crate) fn finish(self) -> Option<&'a str> {
        let pos = self.pos;
        if pos >= self.buf.len() {
            return None;
        }
        self.buf[pos] = 0;
        let buf: &'a [u8] = self.buf;
        core::str::from_utf8(&buf[..pos]).ok()
    }
}

pub(crate) fn digit_char(digit: u8) -> u8 {
    if digit < 10 {
        b'0' + digit
    } else {
        b'a' + digit - 10
    }
}

pub(crate) fn digit_value(byte: u8) -> Option<u32> {
    match byte {
        b'0'..=b'9' => Some((byte - b'0') as u32),
        b'a'..=b'z' => Some((byte - b'a') as u32 + 10),
        b'A'..=b'Z' => Some((byte - b'A') as u32 + 10),
        _ => None,
    }
}

/// Number of decimal digits in `value`.
pub(crate) fn decimal_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 10 {
        value /= 10;
        len += 1;
    }
    len
}
