use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label attached to every sample.  The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    A,
    B,
    C,
    D,
}

impl Category {
    /// Every label, in declaration order.
    pub const ALL: [Category; 4] = [Category::A, Category::B, Category::C, Category::D];

    /// Label for position `index`, wrapping around the set.
    #[must_use]
    pub fn cycle(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::A => "A",
            Category::B => "B",
            Category::C => "C",
            Category::D => "D",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single timestamped, categorized measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unique within the lifetime of the buffer holding it.
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub value: f64,
    pub category: Category,
    /// Spatial projection, independent of `value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Free-form annotations; never interpreted by the pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
}

impl Sample {
    pub fn new(id: impl Into<String>, timestamp: i64, value: f64, category: Category) -> Self {
        Self {
            id: id.into(),
            timestamp,
            value,
            category,
            x: None,
            y: None,
            metadata: None,
        }
    }

    /// Attach projection coordinates.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Projected `(x, y)` point, if both coordinates are set.
    pub fn point(&self) -> Option<(f64, f64)> {
        self.x.zip(self.y)
    }
}
