//! Self-monitoring: frame-rate sampling, memory probing, alert evaluation
//! and call-rate helpers.

pub mod alerts;
pub mod limiter;
pub mod monitor;
pub mod sampler;

pub use alerts::AlertEngine;
pub use limiter::{debounce, measure_execution_time, throttle, Debounced, Throttled, Timed};
pub use monitor::{PerformanceMonitor, PerformanceSummary};
pub use sampler::{FrameSampler, SurfaceSamplers};
