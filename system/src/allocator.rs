/// The allocation operations every heap backend provides.
///
/// Callers hold only opaque handles; `None` stands for the null pointer of
/// the classic allocation family, both as an argument ("no allocation") and
/// as a result ("out of memory"). Handing a backend a handle it did not
/// produce, or one already released, is a contract violation and panics
/// where the backend can detect it.
pub trait Allocator {
    type Handle: Copy + Eq + core::fmt::Debug;

    /// Returns a region of at least `size` bytes, or `None` for zero-sized
    /// requests and when memory is exhausted.
    fn allocate(&mut self, size: usize) -> Option<Self::Handle>;

    /// Like [`allocate`](Allocator::allocate) for `count * size` bytes, with the
    /// region zero-filled. An overflowing product is refused.
    fn allocate_zeroed(&mut self, count: usize, size: usize) -> Option<Self::Handle> {
        let handle = self.allocate(count.checked_mul(size)?)?;
        self.bytes_mut(handle).fill(0);
        Some(handle)
    }

    /// Grows or shrinks an allocation, preserving its leading bytes.
    ///
    /// `None` behaves as `allocate(new_size)`; a `new_size` of zero releases
    /// the handle and returns `None`. When the request cannot be satisfied
    /// the original handle stays valid and `None` is returned.
    fn resize(&mut self, handle: Option<Self::Handle>, new_size: usize) -> Option<Self::Handle>;

    /// [`resize`](Allocator::resize) for `count * size` bytes. An overflowing
    /// product is refused and leaves the original untouched.
    fn resize_array(
        &mut self,
        handle: Option<Self::Handle>,
        count: usize,
        size: usize,
    ) -> Option<Self::Handle> {
        let total = count.checked_mul(size)?;
        self.resize(handle, total)
    }

    /// Returns the region to the backend. `None` is a no-op.
    fn release(&mut self, handle: Option<Self::Handle>);

    /// The usable bytes behind `handle`; at least the requested size.
    fn bytes(&self, handle: Self::Handle) -> &[u8];

    fn bytes_mut(&mut self, handle: Self::Handle) -> &mut [u8];
}

impl<A: Allocator + ?Sized> Allocator for &mut A {
    type Handle = A::Handle;

    fn allocate(&mut self, size: usize) -> Option<Self::Handle> {
        (**self).allocate(size)
    }

    fn allocate_zeroed(&mut self, count: usize, size: usize) -> Option<Self::Handle> {
        (**self).allocate_zeroed(count, size)
    }

    fn resize(&mut self, handle: Option<Self::Handle>, new_size: usize) -> Option<Self::Handle> {
        (**self).resize(handle, new_size)
    }

    fn resize_array(
        &mut self,
        handle: Option<Self::Handle>,
        count: usize,
        size: usize,
    ) -> Option<Self::Handle> {
        (**self).resize_array(handle, count, size)
    }

    fn release(&mut self, handle: Option<Self::Handle>) {
        (**self).release(handle)
    }

    fn bytes(&self, handle: Self::Handle) -> &[u8] {
        (**self).bytes(handle)
    }

    fn bytes_mut(&mut self, handle: Self::Handle) -> &mut [u8] {
        (**self).bytes_mut(handle)
    }
}
