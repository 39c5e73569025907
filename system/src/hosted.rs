//! Backends for targets with an operating system.

use std::alloc::{self, Layout};
use std::io::Write;
use std::ptr::NonNull;

use crate::allocator::Allocator;
use crate::sink::DiagnosticSink;

/// Bytes in front of every payload holding its requested size; keeps the
/// payload at the same alignment as the block.
const SIZE_PREFIX: usize = 16;
const BLOCK_ALIGN: usize = 16;

fn block_layout(size: usize) -> Option<Layout> {
    Layout::from_size_align(size.checked_add(SIZE_PREFIX)?, BLOCK_ALIGN).ok()
}

/// [`Allocator`] over the operating system heap (`std::alloc`).
///
/// The classic interface releases by pointer alone, so each block carries
/// its size in a prefix in front of the handed-out payload.
#[derive(Default)]
pub struct SystemAllocator {
    used: usize,
    live: usize,
}

impl SystemAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested bytes currently allocated.
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn live(&self) -> usize {
        self.live
    }

    fn size_of(&self, handle: NonNull<u8>) -> usize {
        // Safety: handle came from this allocator, so SIZE_PREFIX bytes in
        // front of it hold the size written when the block was created.
        unsafe { handle.as_ptr().sub(SIZE_PREFIX).cast::<usize>().read() }
    }

    fn obtain(&mut self, size: usize, zeroed: bool) -> Option<NonNull<u8>> {
        if size == 0 {
            return None;
        }
        let layout = block_layout(size)?;
        // Safety: layout has a non-zero size.
        let block = unsafe {
            if zeroed {
                alloc::alloc_zeroed(layout)
            } else {
                alloc::alloc(layout)
            }
        };
        let block = NonNull::new(block)?;
        // Safety: the block is at least SIZE_PREFIX + size bytes and aligned
        // for usize.
        let payload = unsafe {
            block.as_ptr().cast::<usize>().write(size);
            NonNull::new_unchecked(block.as_ptr().add(SIZE_PREFIX))
        };
        self.used += size;
        self.live += 1;
        Some(payload)
    }
}

impl Allocator for SystemAllocator {
    type Handle = NonNull<u8>;

    fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        self.obtain(size, false)
    }

    fn allocate_zeroed(&mut self, count: usize, size: usize) -> Option<NonNull<u8>> {
        self.obtain(count.checked_mul(size)?, true)
    }

    fn resize(&mut self, handle: Option<NonNull<u8>>, new_size: usize) -> Option<NonNull<u8>> {
        let Some(handle) = handle else {
            return self.allocate(new_size);
        };
        if new_size == 0 {
            self.release(Some(handle));
            return None;
        }
        let old_size = self.size_of(handle);
        let old_layout = block_layout(old_size)?;
        let new_layout = block_layout(new_size)?;
        // Safety: the block was allocated with old_layout; on failure realloc
        // leaves it untouched, so the caller's handle stays valid.
        let block = unsafe {
            alloc::realloc(handle.as_ptr().sub(SIZE_PREFIX), old_layout, new_layout.size())
        };
        let block = NonNull::new(block)?;
        // Safety: the new block holds SIZE_PREFIX + new_size bytes.
        let payload = unsafe {
            block.as_ptr().cast::<usize>().write(new_size);
            NonNull::new_unchecked(block.as_ptr().add(SIZE_PREFIX))
        };
        self.used = self.used - old_size + new_size;
        Some(payload)
    }

    fn release(&mut self, handle: Option<NonNull<u8>>) {
        let Some(handle) = handle else {
            return;
        };
        let size = self.size_of(handle);
        if let Some(layout) = block_layout(size) {
            // Safety: the block starts SIZE_PREFIX bytes before the handle
            // and was allocated with this layout.
            unsafe { alloc::dealloc(handle.as_ptr().sub(SIZE_PREFIX), layout) };
        }
        self.used -= size;
        self.live -= 1;
    }

    fn bytes(&self, handle: NonNull<u8>) -> &[u8] {
        let size = self.size_of(handle);
        // Safety: the payload behind handle is size bytes long and stays
        // allocated while the handle is live.
        unsafe { std::slice::from_raw_parts(handle.as_ptr(), size) }
    }

    fn bytes_mut(&mut self, handle: NonNull<u8>) -> &mut [u8] {
        let size = self.size_of(handle);
        // Safety: as in bytes; &mut self keeps the view exclusive.
        unsafe { std::slice::from_raw_parts_mut(handle.as_ptr(), size) }
    }
}

/// Writes to the process's standard output.
#[derive(Default, Copy, Clone)]
pub struct ConsoleSink;

impl DiagnosticSink for ConsoleSink {
    fn write_str(&mut self, s: &str) {
        let _ = std::io::stdout().write_all(s.as_bytes());
    }

    fn newline(&mut self) {
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\n");
        let _ = out.flush();
    }
}

impl DiagnosticSink for String {
    fn write_str(&mut self, s: &str) {
        self.push_str(s);
    }
}
