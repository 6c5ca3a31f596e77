use crate::buffer::WindowedBuffer;
use crate::generator::{StreamGenerator, DEFAULT_BATCH_INTERVAL_MS};
use dash_config::StreamConfig;
use dash_core::sync::lock;
use dash_core::{repeat_every, Sample, TaskHandle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Streaming,
}

/// Owns the sample window and the recurring task that feeds it.
///
/// `start` and `stop` absorb redundant calls: at most one generation task
/// exists at any time, and dropping the controller stops it.
#[derive(Debug)]
pub struct StreamController {
    buffer:    Arc<Mutex<WindowedBuffer>>,
    generator: Arc<Mutex<StreamGenerator>>,
    task:      Option<TaskHandle>,
}

impl Default for StreamController {
    fn default() -> Self {
        Self::new(WindowedBuffer::default(), StreamGenerator::new())
    }
}

impl StreamController {
    pub fn new(buffer: WindowedBuffer, generator: StreamGenerator) -> Self {
        Self {
            buffer:    Arc::new(Mutex::new(buffer)),
            generator: Arc::new(Mutex::new(generator)),
            task:      None,
        }
    }

    pub fn from_config(config: &StreamConfig) -> Self {
        Self::new(WindowedBuffer::from_config(config), StreamGenerator::new())
    }

    /// Replace the window with `count` backfilled samples at the default spacing.
    pub fn initialize(&self, count: usize) {
        self.initialize_with(count, DEFAULT_BATCH_INTERVAL_MS);
    }

    pub fn initialize_with(&self, count: usize, interval_ms: i64) {
        info!("Generating initial dataset with {count} points");
        let batch = lock(&self.generator).generate_initial_batch(count, interval_ms, now_ms());
        let mut buffer = lock(&self.buffer);
        buffer.replace_all(batch);
        info!("Dataset generated with {} points", buffer.len());
    }

    /// Begin appending one generated sample every `interval`.
    /// Does nothing if already streaming.
    pub fn start(&mut self, interval: Duration) {
        if self.is_streaming() {
            return;
        }

        info!("Starting data stream every {}ms", interval.as_millis());
        let buffer = Arc::clone(&self.buffer);
        let generator = Arc::clone(&self.generator);
        let mut last_ts = i64::MIN;

        self.task = Some(repeat_every(interval, move |_| {
            // Wall clock may step backwards; a run's timestamps must not.
            let ts = now_ms().max(last_ts);
            last_ts = ts;
            let sample = lock(&generator).generate_one(ts);
            lock(&buffer).append(sample);
        }));
    }

    /// Cancel the generation task.  Safe to call when already idle.
    pub fn stop(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
            info!("Data stream stopped");
        }
    }

    pub fn state(&self) -> StreamState {
        if self.task.is_some() {
            StreamState::Streaming
        } else {
            StreamState::Idle
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.state() == StreamState::Streaming
    }

    /// Owned copy of the window, oldest-first.
    pub fn snapshot(&self) -> Vec<Sample> {
        lock(&self.buffer).snapshot()
    }

    /// Run `f` against the window without copying it.
    pub fn with_buffer<R>(&self, f: impl FnOnce(&WindowedBuffer) -> R) -> R {
        f(&lock(&self.buffer))
    }

    pub fn total_points(&self) -> usize {
        lock(&self.buffer).len()
    }
}

impl Drop for StreamController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
