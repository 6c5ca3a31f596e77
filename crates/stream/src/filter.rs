use dash_core::{Category, Sample};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Selection applied to the window before processing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleFilter {
    /// Empty means every category.
    pub categories: Vec<Category>,
    /// Inclusive `[from, to]` timestamp bounds.
    pub time_range: Option<(i64, i64)>,
    /// Inclusive `[min, max]` value bounds.
    pub value_range: Option<(f64, f64)>,
}

impl SampleFilter {
    pub fn matches(&self, sample: &Sample) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&sample.category) {
            return false;
        }
        if let Some((from, to)) = self.time_range {
            if sample.timestamp < from || sample.timestamp > to {
                return false;
            }
        }
        if let Some((min, max)) = self.value_range {
            if sample.value < min || sample.value > max {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(
        &'a self,
        samples: impl IntoIterator<Item = &'a Sample>,
    ) -> impl Iterator<Item = &'a Sample> {
        samples.into_iter().filter(move |s| self.matches(s))
    }
}

/// Time-bucket width used when summarising samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    /// One bucket per sample.
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "1min")]
    OneMinute,
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "1hour")]
    OneHour,
}

impl Aggregation {
    /// Bucket width in milliseconds, `None` for no grouping.
    pub fn width_ms(self) -> Option<i64> {
        match self {
            Aggregation::None => None,
            Aggregation::OneMinute => Some(60_000),
            Aggregation::FiveMinutes => Some(300_000),
            Aggregation::OneHour => Some(3_600_000),
        }
    }
}

/// Summary of the samples falling in one time bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// First millisecond covered by the bucket.
    pub start: i64,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Bucket {
    fn single(sample: &Sample) -> Self {
        Self {
            start: sample.timestamp,
            count: 1,
            mean:  sample.value,
            min:   sample.value,
            max:   sample.value,
        }
    }

    fn add(&mut self, value: f64) {
        // incremental mean
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

/// Group samples into buckets ordered by start time.
pub fn aggregate<'a>(
    samples: impl IntoIterator<Item = &'a Sample>,
    aggregation: Aggregation,
) -> Vec<Bucket> {
    let Some(width) = aggregation.width_ms() else {
        let mut buckets: Vec<_> = samples.into_iter().map(Bucket::single).collect();
        buckets.sort_by_key(|b| b.start);
        return buckets;
    };

    let mut buckets: BTreeMap<i64, Bucket> = BTreeMap::new();
    for sample in samples {
        // Floor to the bucket edge. Near i64::MIN the edge is unrepresentable,
        // so those samples share a bucket starting at i64::MIN.
        let start = sample.timestamp.saturating_sub(sample.timestamp.rem_euclid(width));
        buckets
            .entry(start)
            .and_modify(|b| b.add(sample.value))
            .or_insert_with(|| Bucket { start, ..Bucket::single(sample) });
    }
    buckets.into_values().collect()
}
