/// Linear congruential generator; deterministic per seed.
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        SimpleRng { state: seed }
    }

    pub fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1103515245).wrapping_add(12345);
        self.state
    }

    /// Uniform-ish value in `min..=max`.
    pub fn next_range(&mut self, min: usize, max: usize) -> usize {
        let span = max.saturating_sub(min).saturating_add(1);
        min + (self.next() >> 8) as usize % span
    }

    /// Index below `bound`, which must be non-zero.
    pub fn below(&mut self, bound: usize) -> usize {
        (self.next() >> 8) as usize % bound
    }

    pub fn chance(&mut self, percent: u32) -> bool {
        (self.next() >> 8) % 100 < percent
    }
}
