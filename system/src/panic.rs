use core::fmt::Display;
use core::panic::{Location, PanicInfo};

use crate::dprintln;
use crate::sink::DiagnosticSink;

/// Writes a panic report: banner, source location when known, message.
pub fn report_panic(
    sink: &mut dyn DiagnosticSink,
    location: Option<&Location<'_>>,
    message: &dyn Display,
) {
    dprintln!(sink);
    dprintln!(sink, "!!! PANIC !!!");
    if let Some(location) = location {
        dprintln!(sink, "Panic at {}:{}:{}", location.file(), location.line(), location.column());
    }
    dprintln!(sink, "Message: {}", message);
}

/// Body for a freestanding `#[panic_handler]`: reports through `sink`, then
/// halts. Contract violations end here; they are never turned into error
/// values.
pub fn handle_panic(sink: &mut dyn DiagnosticSink, info: &PanicInfo) -> ! {
    report_panic(sink, info.location(), &info.message());
    dprintln!(sink, "System halted.");
    loop {
        core::hint::spin_loop();
    }
}
