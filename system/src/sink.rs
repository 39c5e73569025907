use core::fmt;

use codec::{format_f64, format_i64, format_u64, word_to_hex, INTEGER_TEXT_LEN, WORD_HEX_LEN};

/// Destination for diagnostic text.
///
/// Only [`write_str`](DiagnosticSink::write_str) is required; numbers are
/// rendered through `codec` so that sinks work without `core::fmt`.
pub trait DiagnosticSink {
    fn write_str(&mut self, s: &str);

    fn write_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.write_str(c.encode_utf8(&mut buf));
    }

    fn write_uint(&mut self, value: u64) {
        let mut buf = [0u8; INTEGER_TEXT_LEN];
        if let Some(text) = format_u64(value, &mut buf) {
            self.write_str(text);
        }
    }

    fn write_int(&mut self, value: i64) {
        let mut buf = [0u8; INTEGER_TEXT_LEN];
        if let Some(text) = format_i64(value, &mut buf) {
            self.write_str(text);
        }
    }

    /// Writes a pointer-like value as fixed-width `0x…` hex.
    fn write_hex(&mut self, value: usize) {
        let mut buf = [0u8; WORD_HEX_LEN + 1];
        if let Some(text) = word_to_hex(value, &mut buf) {
            self.write_str(text);
        }
    }

    fn write_float(&mut self, value: f64, digits: usize) {
        let mut buf = [0u8; 48];
        if let Some(text) = format_f64(value, &mut buf, digits) {
            self.write_str(text);
        }
    }

    fn newline(&mut self) {
        self.write_str("\n");
    }
}

/// Discards everything.
#[derive(Default, Copy, Clone)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn write_str(&mut self, _s: &str) {}
}

/// Keeps the first `N` bytes written; later text is dropped and flagged.
pub struct BufferSink<const N: usize> {
    buf: [u8; N],
    len: usize,
    truncated: bool,
}

impl<const N: usize> BufferSink<N> {
    pub const fn new() -> Self {
        BufferSink { buf: [0; N], len: 0, truncated: false }
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.truncated = false;
    }
}

impl<const N: usize> Default for BufferSink<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DiagnosticSink for BufferSink<N> {
    fn write_str(&mut self, s: &str) {
        let room = N - self.len;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        if take < s.len() {
            self.truncated = true;
        }
    }
}

/// Fan-out sink that writes to several outputs.
pub struct MultiplexSink<'a, 'b> {
    outputs: &'a mut [&'b mut dyn DiagnosticSink],
}

impl<'a, 'b> MultiplexSink<'a, 'b> {
    pub fn new(outputs: &'a mut [&'b mut dyn DiagnosticSink]) -> Self {
        Self { outputs }
    }
}

impl DiagnosticSink for MultiplexSink<'_, '_> {
    fn write_str(&mut self, s: &str) {
        for output in self.outputs.iter_mut() {
            output.write_str(s);
        }
    }
}

struct SinkWriter<'a>(&'a mut dyn DiagnosticSink);

impl fmt::Write for SinkWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}

#[doc(hidden)]
pub fn print(sink: &mut dyn DiagnosticSink, args: fmt::Arguments) {
    let _ = fmt::Write::write_fmt(&mut SinkWriter(sink), args);
}

#[macro_export]
macro_rules! dprintln {
    ($sink:expr) => ($crate::dprint!($sink, "\n"));
    ($sink:expr, $($arg:tt)*) => ($crate::dprint!($sink, "{}\n", format_args!($($arg)*)));
}

#[macro_export]
macro_rules! dprint {
    ($sink:expr, $($arg:tt)*) => ($crate::sink::print($sink, format_args!($($arg)*)));
}
