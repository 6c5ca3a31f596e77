use dash_core::{Category, Sample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Spacing of backfilled history when none is given (milliseconds).
pub const DEFAULT_BATCH_INTERVAL_MS: i64 = 100;

const BASELINE: f64 = 50.0;
const JITTER: f64 = 50.0;
const WAVE_AMPLITUDE: f64 = 20.0;
const EXTENT: f64 = 1000.0;

/// Source of synthetic samples.
#[derive(Debug, Clone)]
pub struct StreamGenerator {
    rng: StdRng,
}

impl Default for StreamGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic generator for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One live sample stamped `now_ms`.
    ///
    /// The category is random and the value follows a slow wave over
    /// wall-clock time.
    pub fn generate_one(&mut self, now_ms: i64) -> Sample {
        let category = Category::ALL[self.rng.random_range(0..Category::ALL.len())];
        let wave = WAVE_AMPLITUDE * (now_ms as f64 * 0.001).sin();
        let value = BASELINE + self.rng.random_range(0.0..JITTER) + wave;

        Sample::new(
            format!("{now_ms}-{}", Uuid::new_v4().simple()),
            now_ms,
            value,
            category,
        )
        .at(
            self.rng.random_range(0.0..EXTENT),
            self.rng.random_range(0.0..EXTENT),
        )
    }

    /// `count` backfilled samples ending just before `now_ms`, spaced
    /// `interval_ms` apart.
    ///
    /// Unlike live samples, categories cycle by index and the wave follows
    /// the sample index rather than the clock.
    pub fn generate_initial_batch(
        &mut self,
        count: usize,
        interval_ms: i64,
        now_ms: i64,
    ) -> Vec<Sample> {
        let base = now_ms - count as i64 * interval_ms;

        (0..count)
            .map(|i| {
                let wave = WAVE_AMPLITUDE * (i as f64 * 0.1).sin();
                let value = BASELINE + self.rng.random_range(0.0..JITTER) + wave;
                Sample::new(
                    format!("initial-{i}"),
                    base + i as i64 * interval_ms,
                    value,
                    Category::cycle(i),
                )
                .at(
                    self.rng.random_range(0.0..EXTENT),
                    self.rng.random_range(0.0..EXTENT),
                )
            })
            .collect()
    }
}
