pub mod error;
pub mod metrics;
pub mod sample;
pub mod schedule;
pub mod sync;

pub use error::{DashError, Result};
pub use metrics::{MemoryStats, MetricsSnapshot};
pub use sample::{Category, Sample};
pub use schedule::{repeat_every, run_after, spawn_task, TaskHandle};
