//! Streaming ingestion: synthetic sample generation feeding a bounded,
//! evicting in-memory window.

pub mod buffer;
pub mod controller;
pub mod filter;
pub mod generator;

pub use buffer::WindowedBuffer;
pub use controller::{StreamController, StreamState};
pub use filter::{aggregate, Aggregation, Bucket, SampleFilter};
pub use generator::StreamGenerator;
