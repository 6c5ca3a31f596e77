use dash_config::StreamConfig;
use dash_core::Sample;
use std::collections::VecDeque;

/// Bounded, insertion-ordered window of samples.
///
/// Once an append pushes the length past `high_water_mark`, the oldest
/// samples are dropped in the same call until exactly `retain_target`
/// remain.  Survivors keep their relative order.
#[derive(Debug, Clone)]
pub struct WindowedBuffer {
    samples:         VecDeque<Sample>,
    high_water_mark: usize,
    retain_target:   usize,
}

impl Default for WindowedBuffer {
    fn default() -> Self {
        Self::from_config(&StreamConfig::default())
    }
}

impl WindowedBuffer {
    /// `retain_target` is clamped to `high_water_mark`.
    pub fn new(high_water_mark: usize, retain_target: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(high_water_mark.saturating_add(1)),
            high_water_mark,
            retain_target: retain_target.min(high_water_mark),
        }
    }

    pub fn from_config(config: &StreamConfig) -> Self {
        Self::new(config.high_water_mark, config.retain_target)
    }

    pub fn retain_target(&self) -> usize {
        self.retain_target
    }

    /// Append one sample; returns how many old samples were evicted.
    pub fn append(&mut self, sample: Sample) -> usize {
        self.samples.push_back(sample);
        if self.samples.len() > self.high_water_mark {
            self.evict_to(self.retain_target)
        } else {
            0
        }
    }

    /// Replace the whole window.  An oversized batch keeps only its newest
    /// `retain_target` samples.
    pub fn replace_all(&mut self, samples: Vec<Sample>) {
        self.samples = samples.into();
        if self.samples.len() > self.high_water_mark {
            self.evict_to(self.retain_target);
        }
    }

    fn evict_to(&mut self, keep: usize) -> usize {
        let excess = self.samples.len().saturating_sub(keep);
        self.samples.drain(..excess);
        excess
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Contents oldest-first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample> + ExactSizeIterator {
        self.samples.iter()
    }

    /// Owned copy of the contents, oldest-first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }

    /// The newest `n` samples, oldest-first.
    pub fn latest(&self, n: usize) -> impl Iterator<Item = &Sample> {
        self.samples.iter().skip(self.samples.len().saturating_sub(n))
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }
}
