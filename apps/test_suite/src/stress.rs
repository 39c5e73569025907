use system::allocator::Allocator;
use system::dprintln;
use system::sink::DiagnosticSink;

use crate::random::SimpleRng;

/// Most allocations the workload keeps alive at once.
pub const MAX_LIVE: usize = 32;

#[derive(Copy, Clone, Debug)]
pub struct StressConfig {
    pub seed: u32,
    pub operations: usize,
    /// Live allocation cap, clamped to [`MAX_LIVE`].
    pub max_live: usize,
    pub min_size: usize,
    pub max_size: usize,
    /// Share of non-allocating steps that resize instead of release.
    pub resize_percent: u32,
    /// Print a progress line every this many steps; zero disables it.
    pub progress_every: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        StressConfig {
            seed: 0x1337,
            operations: 1000,
            max_live: 16,
            min_size: 16,
            max_size: 512,
            resize_percent: 30,
            progress_every: 250,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StressReport {
    pub allocations: usize,
    pub resizes: usize,
    pub releases: usize,
    /// Requests answered with "no memory".
    pub exhausted: usize,
    /// Blocks whose contents did not match what was written.
    pub corruptions: usize,
    pub peak_live: usize,
    pub bytes_requested: usize,
}

impl StressReport {
    pub fn passed(&self) -> bool {
        self.corruptions == 0
    }
}

struct Block<H> {
    handle: H,
    id: u32,
    len: usize,
}

fn expected(id: u32, index: usize) -> u8 {
    (id as u8).wrapping_mul(31).wrapping_add(index as u8)
}

fn stamp(bytes: &mut [u8], id: u32) {
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = expected(id, i);
    }
}

/// Offset of the first byte that differs from the stamp of `id`.
fn first_mismatch(bytes: &[u8], id: u32) -> Option<usize> {
    bytes.iter().enumerate().position(|(i, &b)| b != expected(id, i))
}

enum Step {
    Allocate,
    Resize,
    Release,
}

/// Random allocate / resize / release workload that writes a per-block
/// pattern into every allocation and checks it at each touch, on resize
/// (surviving prefix) and before release. Every block still alive at the
/// end is verified and released, so a balanced allocator ends empty.
pub fn run<A: Allocator>(allocator: &mut A, sink: &mut dyn DiagnosticSink, config: &StressConfig) -> StressReport {
    let max_live = config.max_live.clamp(1, MAX_LIVE);
    let mut blocks: [Option<Block<A::Handle>>; MAX_LIVE] = core::array::from_fn(|_| None);
    let mut rng = SimpleRng::new(config.seed);
    let mut report = StressReport::default();
    let mut next_id = 0u32;

    dprintln!(sink, "[Stress] Starting {} operations, seed {:#x}", config.operations, config.seed);

    for step in 0..config.operations {
        let live = blocks.iter().flatten().count();
        let action = if live == 0 || (live < max_live && rng.chance(50)) {
            Step::Allocate
        } else if rng.chance(config.resize_percent) {
            Step::Resize
        } else {
            Step::Release
        };

        match action {
            Step::Allocate => {
                let len = rng.next_range(config.min_size.max(1), config.max_size);
                report.bytes_requested += len;
                let Some(handle) = allocator.allocate(len) else {
                    report.exhausted += 1;
                    continue;
                };
                let id = next_id;
                next_id = next_id.wrapping_add(1);
                stamp(&mut allocator.bytes_mut(handle)[..len], id);
                if first_mismatch(&allocator.bytes(handle)[..len], id).is_some() {
                    dprintln!(sink, "[Stress] [FAIL] Block {} unreadable right after allocation", id);
                    report.corruptions += 1;
                }
                if let Some(slot) = blocks.iter_mut().find(|slot| slot.is_none()) {
                    *slot = Some(Block { handle, id, len });
                }
                report.allocations += 1;
                report.peak_live = report.peak_live.max(live + 1);
            }
            Step::Resize => {
                let index = pick(&blocks, &mut rng);
                let Some(block) = blocks[index].as_mut() else {
                    continue;
                };
                let new_len = rng.next_range(config.min_size.max(1), config.max_size);
                report.bytes_requested += new_len;
                match allocator.resize(Some(block.handle), new_len) {
                    Some(handle) => {
                        let kept = block.len.min(new_len);
                        if let Some(at) = first_mismatch(&allocator.bytes(handle)[..kept], block.id) {
                            dprintln!(sink, "[Stress] [FAIL] Block {} lost byte {} when resized to {}", block.id, at, new_len);
                            report.corruptions += 1;
                        }
                        stamp(&mut allocator.bytes_mut(handle)[..new_len], block.id);
                        block.handle = handle;
                        block.len = new_len;
                        report.resizes += 1;
                    }
                    None => {
                        report.exhausted += 1;
                        report.corruptions += verify(allocator, sink, block, "after a refused resize");
                    }
                }
            }
            Step::Release => {
                let index = pick(&blocks, &mut rng);
                if let Some(block) = blocks[index].take() {
                    report.corruptions += verify(allocator, sink, &block, "before release");
                    allocator.release(Some(block.handle));
                    report.releases += 1;
                }
            }
        }

        if config.progress_every != 0 && step > 0 && step % config.progress_every == 0 {
            dprintln!(
                sink,
                "[Stress] Progress: {}/{} - live {} exhausted {}",
                step,
                config.operations,
                blocks.iter().flatten().count(),
                report.exhausted
            );
        }
    }

    let remaining = blocks.iter().flatten().count();
    dprintln!(sink, "[Stress] Finalizing: verifying remaining {} allocations...", remaining);
    for slot in blocks.iter_mut() {
        if let Some(block) = slot.take() {
            report.corruptions += verify(allocator, sink, &block, "at the end");
            allocator.release(Some(block.handle));
            report.releases += 1;
        }
    }

    if report.passed() {
        dprintln!(
            sink,
            "[Stress] [PASS] {} allocations, {} resizes, {} releases, {} exhausted",
            report.allocations,
            report.resizes,
            report.releases,
            report.exhausted
        );
    } else {
        dprintln!(sink, "[Stress] [FAIL] {} corrupted blocks", report.corruptions);
    }
    report
}

/// Index of a random occupied slot, or zero when there is none.
fn pick<H>(blocks: &[Option<Block<H>>], rng: &mut SimpleRng) -> usize {
    let live = blocks.iter().flatten().count();
    if live == 0 {
        return 0;
    }
    let nth = rng.below(live);
    blocks
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_some())
        .nth(nth)
        .map_or(0, |(index, _)| index)
}

fn verify<A: Allocator>(allocator: &A, sink: &mut dyn DiagnosticSink, block: &Block<A::Handle>, when: &str) -> usize {
    match first_mismatch(&allocator.bytes(block.handle)[..block.len], block.id) {
        Some(at) => {
            dprintln!(sink, "[Stress] [FAIL] Block {} corrupted at byte {} {}", block.id, at, when);
            1
        }
        None => 0,
    }
}
