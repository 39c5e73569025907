use crate::allocator::Allocator;

/// Test backend that keeps every allocation in its own `Vec`.
#[derive(Default)]
pub(crate) struct MockAllocator {
    slots: Vec<Option<Vec<u8>>>,
    /// Largest request served; bigger ones are refused.
    limit: Option<usize>,
}

impl MockAllocator {
    pub(crate) fn with_limit(limit: usize) -> Self {
        MockAllocator { slots: Vec::new(), limit: Some(limit) }
    }

    pub(crate) fn live(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    fn slot(&self, handle: usize) -> &Vec<u8> {
        self.slots[handle].as_ref().expect("handle not live")
    }
}

impl Allocator for MockAllocator {
    type Handle = usize;

    fn allocate(&mut self, size: usize) -> Option<usize> {
        if size == 0 || self.limit.is_some_and(|limit| size > limit) {
            return None;
        }
        self.slots.push(Some(vec![0xee; size]));
        Some(self.slots.len() - 1)
    }

    fn resize(&mut self, handle: Option<usize>, new_size: usize) -> Option<usize> {
        let Some(handle) = handle else {
            return self.allocate(new_size);
        };
        if new_size == 0 {
            self.release(Some(handle));
            return None;
        }
        if self.limit.is_some_and(|limit| new_size > limit) {
            return None;
        }
        self.slots[handle].as_mut().expect("handle not live").resize(new_size, 0);
        Some(handle)
    }

    fn release(&mut self, handle: Option<usize>) {
        if let Some(handle) = handle {
            assert!(self.slots[handle].take().is_some(), "double release");
        }
    }

    fn bytes(&self, handle: usize) -> &[u8] {
        self.slot(handle)
    }

    fn bytes_mut(&mut self, handle: usize) -> &mut [u8] {
        self.slots[handle].as_mut().expect("handle not live")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_zeroed_allocation_clears_bytes() {
        let mut allocator = MockAllocator::default();
        let handle = allocator.allocate_zeroed(4, 3).unwrap();
        assert_eq!(allocator.bytes(handle), &[0u8; 12]);
    }

    #[test]
    fn zeroed_allocation_refuses_overflow() {
        let mut allocator = MockAllocator::default();
        assert!(allocator.allocate_zeroed(usize::MAX, 2).is_none());
        assert_eq!(allocator.live(), 0);
    }

    #[test]
    fn resize_array_refuses_overflow_and_keeps_original() {
        let mut allocator = MockAllocator::default();
        let handle = allocator.allocate(8).unwrap();
        assert!(allocator.resize_array(Some(handle), usize::MAX, 4).is_none());
        assert_eq!(allocator.bytes(handle).len(), 8);
    }

    #[test]
    fn limit_refuses_large_requests() {
        let mut allocator = MockAllocator::with_limit(8);
        assert!(allocator.allocate(9).is_none());
        let handle = allocator.allocate(8).unwrap();
        assert!(allocator.resize(Some(handle), 16).is_none());
        assert_eq!(allocator.bytes(handle).len(), 8);
        assert_eq!(allocator.live(), 1);
    }

    fn store_abc<A: Allocator>(mut allocator: A) -> A::Handle {
        let handle = allocator.allocate(3).unwrap();
        allocator.bytes_mut(handle).copy_from_slice(b"abc");
        handle
    }

    #[test]
    fn mutable_reference_forwards() {
        let mut allocator = MockAllocator::default();
        let handle = store_abc(&mut allocator);
        assert_eq!(allocator.bytes(handle), b"abc");
    }
}
