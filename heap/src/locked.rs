use core::alloc::{GlobalAlloc, Layout};
use core::ptr;

use spin::{Mutex, MutexGuard};
use system::sink::DiagnosticSink;

use crate::chunk::WORD;
use crate::chunk_allocator::ChunkAllocator;

/// A [`ChunkAllocator`] behind a spin lock, usable as `#[global_allocator]`.
///
/// Starts empty so it can live in a `static`; requests made before
/// [`init`](LockedChunkHeap::init) get a null pointer. Alignments above the
/// word size are refused.
pub struct LockedChunkHeap<'a> {
    heap: Mutex<Option<ChunkAllocator<'a>>>,
}

impl<'a> LockedChunkHeap<'a> {
    pub const fn empty() -> Self {
        LockedChunkHeap { heap: Mutex::new(None) }
    }

    pub fn new(memory: &'a mut [u8]) -> Self {
        LockedChunkHeap { heap: Mutex::new(ChunkAllocator::new(memory)) }
    }

    /// Installs the backing buffer. Returns `false`, leaving the heap as it
    /// was, when one is already installed or `memory` is too small.
    pub fn init(&self, memory: &'a mut [u8]) -> bool {
        let mut heap = self.heap.lock();
        if heap.is_some() {
            return false;
        }
        *heap = ChunkAllocator::new(memory);
        heap.is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.heap.lock().is_some()
    }

    pub fn lock(&self) -> MutexGuard<'_, Option<ChunkAllocator<'a>>> {
        self.heap.lock()
    }

    pub fn used(&self) -> usize {
        self.heap.lock().as_ref().map_or(0, |heap| heap.used())
    }

    pub fn free(&self) -> usize {
        self.heap.lock().as_ref().map_or(0, |heap| heap.free())
    }

    pub fn dump(&self, sink: &mut dyn DiagnosticSink) {
        match self.heap.lock().as_ref() {
            Some(heap) => heap.dump(sink),
            None => {
                sink.write_str("heap not initialized");
                sink.newline();
            }
        }
    }
}

unsafe impl GlobalAlloc for LockedChunkHeap<'_> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.align() > WORD {
            return ptr::null_mut();
        }
        let mut guard = self.heap.lock();
        let Some(heap) = guard.as_mut() else {
            return ptr::null_mut();
        };
        match heap.allocate(layout.size()) {
            Some(allocation) => heap.as_mut_ptr(allocation),
            None => ptr::null_mut(),
        }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        if layout.align() > WORD {
            return ptr::null_mut();
        }
        let mut guard = self.heap.lock();
        let Some(heap) = guard.as_mut() else {
            return ptr::null_mut();
        };
        match heap.allocate_zeroed(1, layout.size()) {
            Some(allocation) => heap.as_mut_ptr(allocation),
            None => ptr::null_mut(),
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        let mut guard = self.heap.lock();
        let Some(heap) = guard.as_mut() else {
            panic!("dealloc of {:p} before the heap was initialized", ptr);
        };
        match heap.allocation_at(ptr) {
            Some(allocation) => heap.release(Some(allocation)),
            None => panic!("dealloc of {:p} outside the heap", ptr),
        }
    }

    unsafe fn realloc(&self, ptr: *mut u8, _layout: Layout, new_size: usize) -> *mut u8 {
        let mut guard = self.heap.lock();
        let Some(heap) = guard.as_mut() else {
            return ptr::null_mut();
        };
        let Some(allocation) = heap.allocation_at(ptr) else {
            panic!("realloc of {:p} outside the heap", ptr);
        };
        match heap.resize(Some(allocation), new_size) {
            Some(moved) => heap.as_mut_ptr(moved),
            None => ptr::null_mut(),
        }
    }
}
