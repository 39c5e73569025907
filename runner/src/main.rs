mod platform;

use std::process::ExitCode;

use heap::{ChunkAllocator, MapStyle};
use system::dprintln;
use system::panic::report_panic;
use system::platform::{default_sink, HOSTED};
use system::sink::DiagnosticSink;
use test_suite::{codec_check, StressConfig};

fn install_panic_report() {
    std::panic::set_hook(Box::new(|info| {
        let payload = info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string payload>");
        report_panic(&mut default_sink(), info.location(), &message);
    }));
}

/// Small arena whose layout is printed chunk by chunk.
fn show_layout(sink: &mut dyn DiagnosticSink) {
    let mut memory = [0u8; 384];
    let Some(mut heap) = ChunkAllocator::new(&mut memory) else {
        return;
    };
    let greeting = heap.allocate(24);
    let scratch = heap.allocate(40);
    let numbers = heap.allocate_zeroed(4, 8);
    if let Some(greeting) = greeting {
        heap.bytes_mut(greeting)[..13].copy_from_slice(b"hello, arena!");
    }
    heap.release(scratch);

    dprintln!(sink, "[Layout] {} chunks, {} used, {} free", heap.chunk_count(), heap.used(), heap.free());
    heap.dump(sink);
    heap.visualize(sink, &MapStyle { width: 48, bytes_per_cell: 1, preview: true, ..MapStyle::default() });
    heap.release(numbers);
    heap.release(greeting);
}

fn main() -> ExitCode {
    install_panic_report();
    let mut console = default_sink();
    let sink: &mut dyn DiagnosticSink = &mut console;

    dprintln!(
        sink,
        "=== Portable Heap Test Suite Started ({}, {}) ===",
        platform::allocator_name(),
        if HOSTED { "hosted" } else { "freestanding" }
    );

    let stress = platform::run_stress(sink, &StressConfig::default());
    let codec = codec_check::run(sink, 0x1337, 1000);
    show_layout(sink);

    let passed = stress.is_some_and(|report| report.passed()) && codec.failed == 0;
    dprintln!(sink, "=== Test Suite Finished: {} ===", if passed { "PASS" } else { "FAIL" });
    if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
