use rand::Rng;

/// Source of uniform draws for statistic jitter.
///
/// Every `rand::Rng` is a source, so a seeded `StdRng` gives reproducible
/// trajectories and `rand::rng()` gives fresh ones.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Uniform sample between `low` and `high`. Rounding may land exactly on
    /// `high`, so callers should treat the range as closed.
    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        low + self.next_unit() * (high - low)
    }
}

impl<R: Rng> RandomSource for R {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}
