use crate::allocator::Allocator;

/// When [`FailingAllocator`] refuses a request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    Never,
    Always,
    /// Let the first `n` requests through, refuse every later one.
    After(usize),
    /// Refuse every `n`-th request.
    Every(usize),
}

/// Decorator that injects out-of-memory results into any [`Allocator`].
///
/// Only requests that would obtain memory count as attempts: `allocate`,
/// `allocate_zeroed`, and `resize`/`resize_array` with a non-zero size. A
/// refused resize leaves the original allocation untouched, like a real one.
/// Releases are always forwarded.
pub struct FailingAllocator<A> {
    inner: A,
    policy: FailurePolicy,
    attempts: usize,
    injected: usize,
    releases: usize,
}

impl<A: Allocator> FailingAllocator<A> {
    pub fn new(inner: A, policy: FailurePolicy) -> Self {
        FailingAllocator {
            inner,
            policy,
            attempts: 0,
            injected: 0,
            releases: 0,
        }
    }

    pub fn set_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
        self.attempts = 0;
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn injected(&self) -> usize {
        self.injected
    }

    pub fn releases(&self) -> usize {
        self.releases
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut A {
        &mut self.inner
    }

    pub fn into_inner(self) -> A {
        self.inner
    }

    fn should_fail(&mut self) -> bool {
        self.attempts += 1;
        let fail = match self.policy {
            FailurePolicy::Never => false,
            FailurePolicy::Always => true,
            FailurePolicy::After(n) => self.attempts > n,
            FailurePolicy::Every(n) => n != 0 && self.attempts % n == 0,
        };
        if fail {
            self.injected += 1;
        }
        fail
    }
}

impl<A: Allocator> Allocator for FailingAllocator<A> {
    type Handle = A::Handle;

    fn allocate(&mut self, size: usize) -> Option<Self::Handle> {
        if self.should_fail() {
            return None;
        }
        self.inner.allocate(size)
    }

    fn allocate_zeroed(&mut self, count: usize, size: usize) -> Option<Self::Handle> {
        if self.should_fail() {
            return None;
        }
        self.inner.allocate_zeroed(count, size)
    }

    fn resize(&mut self, handle: Option<Self::Handle>, new_size: usize) -> Option<Self::Handle> {
        if new_size != 0 && self.should_fail() {
            return None;
        }
        if new_size == 0 && handle.is_some() {
            self.releases += 1;
        }
        self.inner.resize(handle, new_size)
    }

    fn release(&mut self, handle: Option<Self::Handle>) {
        let Some(handle) = handle else {
            return;
        };
        self.releases += 1;
        self.inner.release(Some(handle));
    }

    fn bytes(&self, handle: Self::Handle) -> &[u8] {
        self.inner.bytes(handle)
    }

    fn bytes_mut(&mut self, handle: Self::Handle) -> &mut [u8] {
        self.inner.bytes_mut(handle)
    }
}
