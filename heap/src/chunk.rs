//! On-buffer chunk headers.
//!
//! ```text
//!   header (4 words)                          payload
//!  ┌──────────┬──────────┬──────────┬──────────┬──────────────────────┐
//!  │ size     │ flags    │ prev     │ next     │ size bytes           │
//!  └──────────┴──────────┴──────────┴──────────┴──────────────────────┘
//!  ▲ header offset                             ▲ start = header + HEADER_SIZE
//! ```
//!
//! `prev`/`next` are header offsets into the same buffer, `NIL` at the ends.

use core::marker::PhantomData;
use core::ops::Range;
use core::ptr::{self, NonNull};
use core::slice;

pub const WORD: usize = core::mem::size_of::<usize>();
pub const HEADER_SIZE: usize = 4 * WORD;
/// Smallest payload a chunk may have; a split remainder below
/// `HEADER_SIZE + MIN_PAYLOAD` stays with the allocation as slack.
pub const MIN_PAYLOAD: usize = WORD;

pub(crate) const NIL: usize = usize::MAX;

const SIZE_FIELD: usize = 0;
const FLAGS_FIELD: usize = WORD;
const PREV_FIELD: usize = 2 * WORD;
const NEXT_FIELD: usize = 3 * WORD;

const IN_USE: usize = 1;

pub(crate) fn align_up(value: usize) -> Option<usize> {
    Some(value.checked_add(WORD - 1)? & !(WORD - 1))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Header {
    pub(crate) size: usize,
    pub(crate) in_use: bool,
    pub(crate) prev: usize,
    pub(crate) next: usize,
}

impl Header {
    pub(crate) fn read(memory: &[u8], at: usize) -> Header {
        Header {
            size: read_word(memory, at + SIZE_FIELD),
            in_use: read_word(memory, at + FLAGS_FIELD) & IN_USE != 0,
            prev: read_word(memory, at + PREV_FIELD),
            next: read_word(memory, at + NEXT_FIELD),
        }
    }

    pub(crate) fn write(&self, memory: &mut [u8], at: usize) {
        write_word(memory, at + SIZE_FIELD, self.size);
        write_word(memory, at + FLAGS_FIELD, if self.in_use { IN_USE } else { 0 });
        write_word(memory, at + PREV_FIELD, self.prev);
        write_word(memory, at + NEXT_FIELD, self.next);
    }
}

fn read_word(memory: &[u8], at: usize) -> usize {
    let mut word = [0u8; WORD];
    word.copy_from_slice(&memory[at..at + WORD]);
    usize::from_ne_bytes(word)
}

fn write_word(memory: &mut [u8], at: usize, value: usize) {
    memory[at..at + WORD].copy_from_slice(&value.to_ne_bytes());
}

/// The heap buffer as a base pointer and a length.
///
/// Slices are built per access over only the bytes an operation touches, so
/// payload pointers derived from the base stay usable while the heap keeps
/// rewriting headers around them.
pub(crate) struct Region<'a> {
    base: NonNull<u8>,
    len: usize,
    _memory: PhantomData<&'a mut [u8]>,
}

// A region is the sole owner of its buffer for `'a`.
unsafe impl Send for Region<'_> {}

impl<'a> Region<'a> {
    pub(crate) fn new(memory: &'a mut [u8]) -> Self {
        Region { base: NonNull::from(&mut *memory).cast(), len: memory.len(), _memory: PhantomData }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn address(&self, at: usize) -> usize {
        self.base.as_ptr() as usize + at
    }

    pub(crate) fn ptr(&self, at: usize) -> *mut u8 {
        assert!(at <= self.len, "offset {} outside a region of {} bytes", at, self.len);
        // SAFETY: `at` is within the allocation or one past its end.
        unsafe { self.base.as_ptr().add(at) }
    }

    pub(crate) fn bytes(&self, range: Range<usize>) -> &[u8] {
        self.check(&range);
        // SAFETY: the range is in bounds and `&self` rules out a live `bytes_mut`.
        unsafe { slice::from_raw_parts(self.base.as_ptr().add(range.start), range.len()) }
    }

    pub(crate) fn bytes_mut(&mut self, range: Range<usize>) -> &mut [u8] {
        self.check(&range);
        // SAFETY: the range is in bounds and `&mut self` makes the slice unique.
        unsafe { slice::from_raw_parts_mut(self.base.as_ptr().add(range.start), range.len()) }
    }

    /// Copies `len` bytes between two distinct chunks.
    pub(crate) fn copy(&mut self, from: usize, to: usize, len: usize) {
        self.check(&(from..from + len));
        self.check(&(to..to + len));
        // SAFETY: both ranges are in bounds; `ptr::copy` allows overlap.
        unsafe { ptr::copy(self.base.as_ptr().add(from), self.base.as_ptr().add(to), len) }
    }

    pub(crate) fn header(&self, at: usize) -> Header {
        Header::read(self.bytes(at..at + HEADER_SIZE), 0)
    }

    pub(crate) fn set_header(&mut self, at: usize, header: Header) {
        header.write(self.bytes_mut(at..at + HEADER_SIZE), 0)
    }

    fn check(&self, range: &Range<usize>) {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "bytes {}..{} outside a region of {} bytes",
            range.start,
            range.end,
            self.len
        );
    }
}

/// Read-only view of one chunk. All positions are offsets into the buffer
/// the heap was built over.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkInfo {
    pub header: usize,
    pub start: usize,
    pub size: usize,
    pub in_use: bool,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

impl ChunkInfo {
    pub(crate) fn read(region: &Region, at: usize) -> ChunkInfo {
        let header = region.header(at);
        ChunkInfo {
            header: at,
            start: at + HEADER_SIZE,
            size: header.size,
            in_use: header.in_use,
            prev: link(header.prev),
            next: link(header.next),
        }
    }

    /// Offset one past the payload.
    pub fn end(&self) -> usize {
        self.start + self.size
    }
}

fn link(offset: usize) -> Option<usize> {
    if offset == NIL { None } else { Some(offset) }
}

/// Walks the chunk list in buffer order.
pub struct Chunks<'h> {
    region: &'h Region<'h>,
    at: usize,
}

impl<'h> Chunks<'h> {
    pub(crate) fn new(region: &'h Region<'h>, first: usize) -> Self {
        Chunks { region, at: first }
    }
}

impl Iterator for Chunks<'_> {
    type Item = ChunkInfo;

    fn next(&mut self) -> Option<ChunkInfo> {
        if self.at == NIL {
            return None;
        }
        let chunk = ChunkInfo::read(self.region, self.at);
        self.at = chunk.next.unwrap_or(NIL);
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_word() {
        assert_eq!(align_up(0), Some(0));
        assert_eq!(align_up(1), Some(WORD));
        assert_eq!(align_up(WORD), Some(WORD));
        assert_eq!(align_up(WORD + 1), Some(2 * WORD));
        assert_eq!(align_up(usize::MAX), None);
    }

    #[test]
    fn header_survives_write_and_read() {
        let mut memory = vec![0u8; 2 * HEADER_SIZE];
        let header = Header { size: 96, in_use: true, prev: NIL, next: HEADER_SIZE };
        header.write(&mut memory, HEADER_SIZE);
        assert_eq!(Header::read(&memory, HEADER_SIZE), header);
        assert!(memory[..HEADER_SIZE].iter().all(|&b| b == 0));
    }

    #[test]
    fn chunk_info_translates_nil_links() {
        let mut memory = vec![0u8; HEADER_SIZE];
        Header { size: 8, in_use: false, prev: NIL, next: NIL }.write(&mut memory, 0);
        let info = ChunkInfo::read(&Region::new(&mut memory), 0);
        assert_eq!(info.start, HEADER_SIZE);
        assert_eq!(info.end(), HEADER_SIZE + 8);
        assert_eq!(info.prev, None);
        assert_eq!(info.next, None);
    }

    #[test]
    fn chunks_follow_next_links() {
        let mut memory = vec![0u8; 3 * HEADER_SIZE];
        Header { size: 0, in_use: true, prev: NIL, next: 2 * HEADER_SIZE }.write(&mut memory, 0);
        Header { size: 0, in_use: false, prev: 0, next: NIL }.write(&mut memory, 2 * HEADER_SIZE);
        let region = Region::new(&mut memory);
        let headers: Vec<usize> = Chunks::new(&region, 0).map(|c| c.header).collect();
        assert_eq!(headers, [0, 2 * HEADER_SIZE]);
    }

    #[test]
    fn region_writes_land_in_the_buffer() {
        let mut memory = vec![0u8; 2 * HEADER_SIZE];
        let mut region = Region::new(&mut memory);
        let header = Header { size: 16, in_use: true, prev: NIL, next: NIL };
        region.set_header(HEADER_SIZE, header);
        region.bytes_mut(0..4).copy_from_slice(b"abcd");
        region.copy(0, 4, 4);
        assert_eq!(region.header(HEADER_SIZE), header);
        assert_eq!(region.bytes(0..8), b"abcdabcd");
        assert_eq!(region.ptr(HEADER_SIZE) as usize, region.address(HEADER_SIZE));
    }

    #[test]
    #[should_panic(expected = "outside a region")]
    fn region_access_is_bounds_checked() {
        let mut memory = vec![0u8; HEADER_SIZE];
        let region = Region::new(&mut memory);
        region.bytes(HEADER_SIZE - 1..HEADER_SIZE + 1);
    }
}
