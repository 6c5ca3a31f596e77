//! Wires the stream and the performance monitor together:
//! - stream controller appending generated samples
//! - per-frame render pass over the newest window (measured)
//! - once-a-second processing pass: filter + bucket (measured)
//! - periodic summary with throttled alert logging
//! - config watcher (live threshold reload)

use anyhow::Result;
use dash_config::{ConfigWatcher, DashConfig};
use dash_core::Sample;
use dash_monitor::{debounce, measure_execution_time, throttle, PerformanceMonitor};
use dash_stream::{aggregate, Aggregation, SampleFilter, StreamController};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{info, warn};

/// Newest samples drawn on every frame.
const RENDER_WINDOW: usize = 2_000;
const PROCESS_INTERVAL: Duration = Duration::from_secs(1);
const REPORT_INTERVAL: Duration = Duration::from_secs(5);
/// Minimum spacing between repeated alert log lines.
const ALERT_LOG_INTERVAL: Duration = Duration::from_secs(30);
const RELOAD_QUIET_PERIOD: Duration = Duration::from_millis(250);
const SURFACE: &str = "overview";

/// Drawing area the render pass projects onto.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    width:  f64,
    height: f64,
}

impl Viewport {
    /// Map each sample's `(x, y)` from the 0..1000 generation extent onto the viewport.
    fn project<'a>(&self, samples: impl Iterator<Item = &'a Sample>) -> Vec<(f64, f64)> {
        samples
            .filter_map(Sample::point)
            .map(|(x, y)| (x / 1000.0 * self.width, self.height - y / 1000.0 * self.height))
            .collect()
    }
}

/// Whether a resolved Ctrl-C future asks the loop to exit.  A failed
/// registration turns the listener off instead.
fn shutdown_requested(result: std::io::Result<()>, listening: &mut bool) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("Cannot listen for Ctrl-C, running until killed: {e}");
            *listening = false;
            false
        }
    }
}

pub async fn run(path: PathBuf, config: DashConfig) -> Result<()> {
    let mut controller = StreamController::from_config(&config.stream);
    let mut monitor = PerformanceMonitor::from_config(&config);

    controller.initialize(config.stream.initial_batch_size);
    monitor.start_with_host_frames();
    monitor.update_data_point_count(controller.total_points());
    monitor.track_surface(SURFACE);
    controller.start(Duration::from_millis(config.stream.interval_ms));

    let viewport = Viewport { width: 1280.0, height: 720.0 };
    let diagnostics = config.monitor.diagnostics;
    let render = measure_execution_time(
        |data: &StreamController| {
            data.with_buffer(|b| viewport.project(b.latest(RENDER_WINDOW)).len())
        },
        "render pass",
        diagnostics,
    );
    let filter = SampleFilter::default();
    let process = measure_execution_time(
        |data: &StreamController| {
            data.with_buffer(|b| aggregate(filter.apply(b.iter()), Aggregation::OneMinute).len())
        },
        "processing pass",
        diagnostics,
    );
    let log_alerts = throttle(
        |alerts: &[String]| {
            for alert in alerts {
                warn!("{alert}");
            }
        },
        ALERT_LOG_INTERVAL,
    );

    // Editors often write a file in several steps; apply only the last one.
    let (_watcher, mut changes) = ConfigWatcher::spawn(&path);
    let (settled_tx, mut settled) = mpsc::channel::<DashConfig>(1);
    let settle = debounce(
        move |config: DashConfig| {
            let _ = settled_tx.try_send(config);
        },
        RELOAD_QUIET_PERIOD,
    );

    let mut frame_tick = time::interval(Duration::from_millis(config.monitor.frame_interval_ms));
    let mut process_tick = time::interval(PROCESS_INTERVAL);
    let mut report_tick = time::interval(REPORT_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut listening_for_ctrl_c = true;

    loop {
        tokio::select! {
            _ = frame_tick.tick() => {
                render.call(&controller);
                if let Some(elapsed) = render.last_elapsed() {
                    monitor.update_render_time(elapsed.as_secs_f64() * 1000.0);
                }
                let now = Instant::now();
                monitor.record_frame(now);
                monitor.surface_frame(SURFACE, now);
            }
            _ = process_tick.tick() => {
                let buckets = process.call(&controller);
                if let Some(elapsed) = process.last_elapsed() {
                    monitor.update_data_processing_time(elapsed.as_secs_f64() * 1000.0);
                }
                monitor.update_data_point_count(controller.total_points());
                tracing::debug!("{buckets} one-minute buckets");
            }
            _ = report_tick.tick() => {
                let metrics = monitor.metrics();
                info!(
                    "{} FPS, {}MB, {} points, render {:.2}ms, processing {:.2}ms",
                    metrics.fps,
                    metrics.memory_usage_mb,
                    metrics.data_point_count,
                    metrics.render_time_ms,
                    metrics.data_processing_time_ms,
                );
                let alerts = monitor.alerts();
                if !alerts.is_empty() {
                    log_alerts.call(alerts.as_slice());
                }
            }
            Some(config) = changes.recv() => settle.call(config),
            Some(config) = settled.recv() => {
                info!("Applying reloaded thresholds");
                monitor.set_thresholds(config.alerts, config.suggestions);
                monitor.set_diagnostics(config.monitor.diagnostics);
                render.set_diagnostics(config.monitor.diagnostics);
                process.set_diagnostics(config.monitor.diagnostics);
            }
            result = &mut shutdown, if listening_for_ctrl_c => {
                if shutdown_requested(result, &mut listening_for_ctrl_c) {
                    break;
                }
            }
        }
    }

    settle.cancel();
    controller.stop();
    monitor.stop();

    let summary = monitor.summary();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_c_stops_the_loop() {
        let mut listening = true;
        assert!(shutdown_requested(Ok(()), &mut listening));
        assert!(listening);
    }

    #[test]
    fn failed_ctrl_c_registration_keeps_running() {
        let mut listening = true;
        let err = std::io::Error::other("no signal driver");
        assert!(!shutdown_requested(Err(err), &mut listening));
        assert!(!listening);
    }
}
