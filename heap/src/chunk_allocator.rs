use system::allocator::Allocator;

use crate::chunk::{align_up, Chunks, Header, Region, HEADER_SIZE, MIN_PAYLOAD, NIL, WORD};

/// Handle to an in-use chunk: the offset of its payload in the heap buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Allocation(usize);

impl Allocation {
    pub fn offset(self) -> usize {
        self.0
    }
}

/// First-fit allocator over a single borrowed buffer.
///
/// Chunk headers live inside the buffer itself, so the heap never asks the
/// environment for memory. The first header is placed at the first
/// word-aligned byte; bytes before it and the tail that does not fill a
/// whole word are [overhead](ChunkAllocator::overhead). Payload pointers
/// from [`as_mut_ptr`](ChunkAllocator::as_mut_ptr) stay valid until their
/// chunk is released or moved.
pub struct ChunkAllocator<'a> {
    pub(crate) region: Region<'a>,
    pub(crate) first: usize,
    pub(crate) end: usize,
}

impl<'a> ChunkAllocator<'a> {
    /// Carves `memory` into one free chunk. `None` if it cannot hold a
    /// header and the smallest payload.
    pub fn new(memory: &'a mut [u8]) -> Option<Self> {
        let first = memory.as_ptr().align_offset(WORD);
        let usable = memory.len().checked_sub(first)? & !(WORD - 1);
        if usable < HEADER_SIZE + MIN_PAYLOAD {
            return None;
        }
        let end = first + usable;
        memory.fill(0);
        let mut region = Region::new(memory);
        region.set_header(first, Header { size: usable - HEADER_SIZE, in_use: false, prev: NIL, next: NIL });
        Some(ChunkAllocator { region, first, end })
    }

    pub fn chunks(&self) -> Chunks<'_> {
        Chunks::new(&self.region, self.first)
    }

    /// Bytes covered by chunks, headers included.
    pub fn capacity(&self) -> usize {
        self.end - self.first
    }

    /// Buffer bytes outside the chunk list (alignment lead and tail).
    pub fn overhead(&self) -> usize {
        self.region.len() - self.capacity()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks().count()
    }

    /// Payload bytes held by in-use chunks.
    pub fn used(&self) -> usize {
        self.chunks().filter(|c| c.in_use).map(|c| c.size).sum()
    }

    /// Payload bytes of free chunks.
    pub fn free(&self) -> usize {
        self.chunks().filter(|c| !c.in_use).map(|c| c.size).sum()
    }

    /// Largest request that would currently succeed.
    pub fn largest_free(&self) -> usize {
        self.chunks().filter(|c| !c.in_use).map(|c| c.size).max().unwrap_or(0)
    }

    pub fn allocate(&mut self, size: usize) -> Option<Allocation> {
        if size == 0 {
            return None;
        }
        let wanted = align_up(size)?;
        let at = self.chunks().find(|c| !c.in_use && c.size >= wanted)?.header;
        let header = self.region.header(at);
        self.region.set_header(at, Header { in_use: true, ..header });
        self.split(at, wanted);
        Some(Allocation(at + HEADER_SIZE))
    }

    /// `allocate(count * size)` with the payload zeroed. Overflow of the
    /// product is reported as exhaustion.
    pub fn allocate_zeroed(&mut self, count: usize, size: usize) -> Option<Allocation> {
        let allocation = self.allocate(count.checked_mul(size)?)?;
        let range = self.payload(self.owner(allocation));
        self.region.bytes_mut(range).fill(0);
        Some(allocation)
    }

    /// Classic `realloc`: `None` allocates, size zero releases.
    ///
    /// Growth first absorbs a free successor in place, zero-filling every
    /// newly joined byte; otherwise the payload moves. When nothing fits the
    /// original allocation is left as it was.
    pub fn resize(&mut self, allocation: Option<Allocation>, new_size: usize) -> Option<Allocation> {
        let Some(allocation) = allocation else {
            return self.allocate(new_size);
        };
        if new_size == 0 {
            self.release(Some(allocation));
            return None;
        }
        let at = self.owner(allocation);
        let wanted = align_up(new_size)?;
        let old_size = self.region.header(at).size;

        if old_size >= wanted {
            self.region.bytes_mut(allocation.0 + wanted..allocation.0 + old_size).fill(0);
            self.split(at, wanted);
            return Some(allocation);
        }

        if let Some(next) = self.next_free(at) {
            // Only absorb the successor when that alone satisfies the request.
            if old_size + HEADER_SIZE + self.region.header(next).size >= wanted {
                self.join(at);
                self.split(at, wanted);
                return Some(allocation);
            }
        }

        let moved = self.allocate(new_size)?;
        let keep = old_size.min(new_size);
        self.region.copy(allocation.0, moved.0, keep);
        self.release(Some(allocation));
        Some(moved)
    }

    pub fn resize_array(&mut self, allocation: Option<Allocation>, count: usize, size: usize) -> Option<Allocation> {
        self.resize(allocation, count.checked_mul(size)?)
    }

    /// Frees the chunk, zeroes its payload and merges it with free
    /// neighbours. `None` is ignored.
    ///
    /// # Panics
    ///
    /// If `allocation` is not an in-use chunk of this heap.
    pub fn release(&mut self, allocation: Option<Allocation>) {
        let Some(allocation) = allocation else {
            return;
        };
        let mut at = self.owner(allocation);
        let header = self.region.header(at);
        self.region.set_header(at, Header { in_use: false, ..header });
        self.region.bytes_mut(allocation.0..allocation.0 + header.size).fill(0);

        while self.next_free(at).is_some() {
            self.join(at);
        }
        while let Some(prev) = self.prev_free(at) {
            self.join(prev);
            at = prev;
        }
    }

    pub fn bytes(&self, allocation: Allocation) -> &[u8] {
        let range = self.payload(self.owner(allocation));
        self.region.bytes(range)
    }

    pub fn bytes_mut(&mut self, allocation: Allocation) -> &mut [u8] {
        let range = self.payload(self.owner(allocation));
        self.region.bytes_mut(range)
    }

    /// Whether `ptr` points into the chunk region of this heap.
    pub fn contains(&self, ptr: *const u8) -> bool {
        let addr = ptr as usize;
        addr >= self.region.address(self.first) && addr < self.region.address(self.end)
    }

    /// Handle for a payload pointer previously obtained from
    /// [`as_ptr`](Self::as_ptr). Only the range is checked; whether a chunk
    /// starts there is verified when the handle is used.
    pub fn allocation_at(&self, ptr: *const u8) -> Option<Allocation> {
        if !self.contains(ptr) {
            return None;
        }
        Some(Allocation(ptr as usize - self.region.address(0)))
    }

    pub fn as_ptr(&self, allocation: Allocation) -> *const u8 {
        self.region.ptr(allocation.0)
    }

    pub fn as_mut_ptr(&mut self, allocation: Allocation) -> *mut u8 {
        self.region.ptr(allocation.0)
    }

    /// Header offset of the in-use chunk whose payload starts at `allocation`.
    fn owner(&self, allocation: Allocation) -> usize {
        match self.chunks().find(|c| c.start == allocation.0) {
            Some(chunk) if chunk.in_use => chunk.header,
            Some(_) => panic!("allocation at offset {} was already released", allocation.0),
            None => panic!("allocation at offset {} is not tracked by this heap", allocation.0),
        }
    }

    fn payload(&self, at: usize) -> core::ops::Range<usize> {
        let start = at + HEADER_SIZE;
        start..start + self.region.header(at).size
    }

    fn next_free(&self, at: usize) -> Option<usize> {
        let next = self.region.header(at).next;
        (next != NIL && !self.region.header(next).in_use).then_some(next)
    }

    fn prev_free(&self, at: usize) -> Option<usize> {
        let prev = self.region.header(at).prev;
        (prev != NIL && !self.region.header(prev).in_use).then_some(prev)
    }

    /// Trims the chunk at `at` to `wanted` payload bytes when the rest can
    /// host a chunk of its own. The remainder is free and merged with a free
    /// successor.
    fn split(&mut self, at: usize, wanted: usize) {
        let header = self.region.header(at);
        let spare = header.size - wanted;
        if spare < HEADER_SIZE + MIN_PAYLOAD {
            return;
        }
        let rest = at + HEADER_SIZE + wanted;
        self.region.set_header(rest, Header { size: spare - HEADER_SIZE, in_use: false, prev: at, next: header.next });
        if header.next != NIL {
            let next = self.region.header(header.next);
            self.region.set_header(header.next, Header { prev: rest, ..next });
        }
        self.region.set_header(at, Header { size: wanted, next: rest, ..header });
        if self.next_free(rest).is_some() {
            self.join(rest);
        }
    }

    /// Absorbs the successor of `at` into it. The absorbed header is zeroed
    /// so that a free payload stays all zero.
    fn join(&mut self, at: usize) {
        let header = self.region.header(at);
        let absorbed = self.region.header(header.next);
        if absorbed.next != NIL {
            let after = self.region.header(absorbed.next);
            self.region.set_header(absorbed.next, Header { prev: at, ..after });
        }
        self.region.bytes_mut(header.next..header.next + HEADER_SIZE).fill(0);
        self.region.set_header(at, Header { size: header.size + HEADER_SIZE + absorbed.size, next: absorbed.next, ..header });
    }
}

impl Allocator for ChunkAllocator<'_> {
    type Handle = Allocation;

    fn allocate(&mut self, size: usize) -> Option<Allocation> {
        ChunkAllocator::allocate(self, size)
    }

    fn allocate_zeroed(&mut self, count: usize, size: usize) -> Option<Allocation> {
        ChunkAllocator::allocate_zeroed(self, count, size)
    }

    fn resize(&mut self, handle: Option<Allocation>, new_size: usize) -> Option<Allocation> {
        ChunkAllocator::resize(self, handle, new_size)
    }

    fn resize_array(&mut self, handle: Option<Allocation>, count: usize, size: usize) -> Option<Allocation> {
        ChunkAllocator::resize_array(self, handle, count, size)
    }

    fn release(&mut self, handle: Option<Allocation>) {
        ChunkAllocator::release(self, handle)
    }

    fn bytes(&self, handle: Allocation) -> &[u8] {
        ChunkAllocator::bytes(self, handle)
    }

    fn bytes_mut(&mut self, handle: Allocation) -> &mut [u8] {
        ChunkAllocator::bytes_mut(self, handle)
    }
}
