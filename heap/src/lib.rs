//! Heap carved out of one caller-supplied buffer.
//!
//! [`ChunkAllocator`] keeps a doubly linked list of chunks whose headers
//! live inside the buffer, serves requests first fit, splits oversized
//! chunks and merges free neighbours on release. [`LockedChunkHeap`] wraps
//! it for use as a global allocator on targets without an operating system.

#![cfg_attr(not(test), no_std)]

mod chunk;
mod chunk_allocator;
mod diagnostics;
mod locked;

pub use chunk::{ChunkInfo, Chunks, HEADER_SIZE, MIN_PAYLOAD, WORD};
pub use chunk_allocator::{Allocation, ChunkAllocator};
pub use diagnostics::MapStyle;
pub use locked::LockedChunkHeap;
