//! Read-only reports on a [`ChunkAllocator`].

use system::sink::DiagnosticSink;

use crate::chunk::{ChunkInfo, HEADER_SIZE, WORD};
use crate::chunk_allocator::ChunkAllocator;

/// Rendering options for [`ChunkAllocator::visualize`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MapStyle {
    /// Cells per output line.
    pub width: usize,
    pub bytes_per_cell: usize,
    pub header: char,
    pub free: char,
    pub used: char,
    /// Show printable ASCII payload bytes instead of `used`.
    pub preview: bool,
}

impl Default for MapStyle {
    fn default() -> Self {
        MapStyle {
            width: 64,
            bytes_per_cell: WORD,
            header: '#',
            free: '.',
            used: '*',
            preview: false,
        }
    }
}

impl ChunkAllocator<'_> {
    /// Writes a summary line, then one line per chunk:
    /// header address, payload address, size, state, prev and next headers.
    pub fn dump(&self, sink: &mut dyn DiagnosticSink) {
        sink.write_str("heap ");
        sink.write_hex(self.address(self.first));
        sink.write_str(" capacity ");
        sink.write_uint(self.capacity() as u64);
        sink.write_str(" used ");
        sink.write_uint(self.used() as u64);
        sink.write_str(" free ");
        sink.write_uint(self.free() as u64);
        sink.write_str(" chunks ");
        sink.write_uint(self.chunk_count() as u64);
        sink.newline();

        for chunk in self.chunks() {
            sink.write_str("  ");
            sink.write_hex(self.address(chunk.header));
            sink.write_char(' ');
            sink.write_hex(self.address(chunk.start));
            sink.write_char(' ');
            sink.write_uint(chunk.size as u64);
            sink.write_str(if chunk.in_use { " used" } else { " free" });
            sink.write_str(" prev ");
            self.write_link(sink, chunk.prev);
            sink.write_str(" next ");
            self.write_link(sink, chunk.next);
            sink.newline();
        }
    }

    /// Draws the chunk region as a grid of cells, each classified by its
    /// first byte. Every line starts with the address of its first cell.
    pub fn visualize(&self, sink: &mut dyn DiagnosticSink, style: &MapStyle) {
        let step = style.bytes_per_cell.max(1);
        let width = style.width.max(1);
        let mut chunks = self.chunks();
        let mut current = chunks.next();
        let mut column = 0;
        let mut at = self.first;

        while at < self.end {
            while current.is_some_and(|c| at >= c.end()) {
                current = chunks.next();
            }
            let Some(chunk) = current else {
                break;
            };
            if column == 0 {
                sink.write_hex(self.address(at));
                sink.write_char(' ');
            }
            sink.write_char(self.cell(&chunk, at, style));
            column += 1;
            if column == width {
                sink.newline();
                column = 0;
            }
            at += step;
        }
        if column != 0 {
            sink.newline();
        }
    }

    /// Walks the chunk list and checks that it tiles the region, that links
    /// agree in both directions, that payloads are word aligned, that no two
    /// free chunks touch and that free payloads hold only zeros.
    pub fn is_consistent(&self) -> bool {
        let limit = self.capacity() / HEADER_SIZE + 1;
        let mut expected = self.first;
        let mut prev: Option<ChunkInfo> = None;

        for chunk in self.chunks().take(limit) {
            let aligned = self.address(chunk.start) % WORD == 0;
            let linked = chunk.header == expected && chunk.prev == prev.map(|p| p.header);
            let coalesced = !prev.is_some_and(|p| !p.in_use && !chunk.in_use);
            if !aligned || !linked || !coalesced || chunk.end() > self.end {
                return false;
            }
            if !chunk.in_use && self.region.bytes(chunk.start..chunk.end()).iter().any(|&b| b != 0) {
                return false;
            }
            expected = chunk.end();
            prev = Some(chunk);
        }
        expected == self.end && prev.is_some_and(|p| p.next.is_none())
    }

    fn cell(&self, chunk: &ChunkInfo, at: usize, style: &MapStyle) -> char {
        if at < chunk.start {
            return style.header;
        }
        if !chunk.in_use {
            return style.free;
        }
        match self.region.bytes(at..at + 1)[0] {
            byte @ 0x21..=0x7e if style.preview => byte as char,
            _ => style.used,
        }
    }

    fn write_link(&self, sink: &mut dyn DiagnosticSink, link: Option<usize>) {
        match link {
            Some(offset) => sink.write_hex(self.address(offset)),
            None => sink.write_char('-'),
        }
    }

    fn address(&self, offset: usize) -> usize {
        self.region.address(offset)
    }
}
