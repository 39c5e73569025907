//! Allocator backing the stress run, chosen by the `arena` feature.

use system::sink::DiagnosticSink;
use test_suite::{StressConfig, StressReport};

#[cfg(feature = "arena")]
mod backend {
    use heap::{LockedChunkHeap, MapStyle};
    use system::dprintln;
    use system::sink::DiagnosticSink;
    use test_suite::{stress, StressConfig, StressReport};

    pub const NAME: &str = "chunk arena";
    pub const ARENA_SIZE: usize = 1024 * 1024;

    static HEAP: LockedChunkHeap<'static> = LockedChunkHeap::empty();

    pub fn run(sink: &mut dyn DiagnosticSink, config: &StressConfig) -> Option<StressReport> {
        if !HEAP.is_initialized() && !HEAP.init(Box::leak(vec![0u8; ARENA_SIZE].into_boxed_slice())) {
            dprintln!(sink, "[Platform] Arena of {} bytes could not be set up", ARENA_SIZE);
            return None;
        }
        let mut guard = HEAP.lock();
        let heap = guard.as_mut()?;
        let report = stress::run(heap, sink, config);

        let style = MapStyle { width: 64, bytes_per_cell: ARENA_SIZE / (64 * 4), ..MapStyle::default() };
        heap.dump(sink);
        heap.visualize(sink, &style);
        if !heap.is_consistent() {
            dprintln!(sink, "[Platform] [FAIL] Chunk list inconsistent after the stress run");
            return None;
        }
        Some(report)
    }
}

#[cfg(not(feature = "arena"))]
mod backend {
    use system::dprintln;
    use system::hosted::SystemAllocator;
    use system::sink::DiagnosticSink;
    use test_suite::{stress, StressConfig, StressReport};

    pub const NAME: &str = "system heap";

    pub fn run(sink: &mut dyn DiagnosticSink, config: &StressConfig) -> Option<StressReport> {
        let mut allocator = SystemAllocator::new();
        let report = stress::run(&mut allocator, sink, config);
        if allocator.live() != 0 {
            dprintln!(sink, "[Platform] [FAIL] {} blocks still live", allocator.live());
            return None;
        }
        Some(report)
    }
}

pub fn allocator_name() -> &'static str {
    backend::NAME
}

/// Runs the stress workload on the platform allocator. `None` when the
/// allocator could not be set up or was left unbalanced.
pub fn run_stress(sink: &mut dyn DiagnosticSink, config: &StressConfig) -> Option<StressReport> {
    backend::run(sink, config)
}
