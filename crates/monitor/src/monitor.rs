use crate::alerts::AlertEngine;
use crate::sampler::{FrameSampler, SurfaceSamplers};
use dash_config::{AlertThresholds, DashConfig, MonitorConfig, SuggestionThresholds};
use dash_core::sync::lock;
use dash_core::{repeat_every, MemoryStats, MetricsSnapshot, TaskHandle};
use dash_system::MemoryProbe;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Diagnostic builds warn once heap usage passes this many MB.
const MEMORY_WARN_MB: u64 = 100;

/// Everything the monitor knows at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub current:      MetricsSnapshot,
    pub alerts:       Vec<String>,
    pub suggestions:  Vec<String>,
    pub memory_stats: Option<MemoryStats>,
    /// Milliseconds since the Unix epoch.
    pub timestamp:    i64,
}

#[derive(Debug)]
struct MonitorState {
    metrics:     MetricsSnapshot,
    global:      FrameSampler,
    surfaces:    SurfaceSamplers,
    probe:       MemoryProbe,
    engine:      AlertEngine,
    diagnostics: bool,
}

impl MonitorState {
    fn record_frame(&mut self, now: Instant) {
        let Some(fps) = self.global.frame(now) else {
            return;
        };
        self.metrics.fps = fps;
        self.refresh_memory();

        if self.diagnostics {
            info!(
                "Performance: {} FPS, {}MB, {} points",
                self.metrics.fps, self.metrics.memory_usage_mb, self.metrics.data_point_count
            );
        }
    }

    /// Read the probe and keep the used figure.  An unavailable reading
    /// leaves the last known value in place.
    fn refresh_memory(&mut self) -> Option<MemoryStats> {
        let stats = self.probe.sample_now()?;
        self.metrics.memory_usage_mb = stats.used;

        if self.diagnostics && stats.used > MEMORY_WARN_MB {
            warn!("High memory usage: {}MB", stats.used);
        }
        Some(stats)
    }

    fn reset(&mut self, now: Instant) {
        self.metrics = MetricsSnapshot::default();
        self.global.reset(now);
    }
}

/// Process-wide performance governor.
///
/// Owns the shared [`MetricsSnapshot`], the global [`FrameSampler`] and an
/// independent memory task.  `start`/`stop` are idempotent and dropping the
/// monitor stops every task.
///
/// [`start`](Self::start) also runs a frame task at `frame_interval_ms`.
/// Hosts with their own frame loop use
/// [`start_with_host_frames`](Self::start_with_host_frames) and call
/// [`record_frame`](Self::record_frame) once per rendered frame.
#[derive(Debug)]
pub struct PerformanceMonitor {
    state:       Arc<Mutex<MonitorState>>,
    config:      MonitorConfig,
    frame_task:  Option<TaskHandle>,
    memory_task: Option<TaskHandle>,
}

impl PerformanceMonitor {
    pub fn new(config: MonitorConfig, engine: AlertEngine, probe: MemoryProbe) -> Self {
        let state = MonitorState {
            metrics:     MetricsSnapshot::default(),
            global:      FrameSampler::new(Instant::now()),
            surfaces:    SurfaceSamplers::default(),
            probe,
            engine,
            diagnostics: config.diagnostics,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            config,
            frame_task: None,
            memory_task: None,
        }
    }

    /// Build from a full config, detecting memory introspection once.
    pub fn from_config(config: &DashConfig) -> Self {
        Self::new(
            config.monitor.clone(),
            AlertEngine::new(config.alerts.clone(), config.suggestions.clone()),
            MemoryProbe::detect(),
        )
    }

    /// Reset metrics and begin frame and memory sampling.  Does nothing if
    /// already running.
    pub fn start(&mut self) {
        self.start_tasks(true);
    }

    /// Like [`start`](Self::start), but frames come only from
    /// [`record_frame`](Self::record_frame).
    pub fn start_with_host_frames(&mut self) {
        self.start_tasks(false);
    }

    fn start_tasks(&mut self, own_frames: bool) {
        if self.is_running() {
            return;
        }
        lock(&self.state).reset(Instant::now());

        if own_frames {
            let state = Arc::clone(&self.state);
            self.frame_task = Some(repeat_every(
                Duration::from_millis(self.config.frame_interval_ms),
                move |now| lock(&state).record_frame(now),
            ));
        }

        let state = Arc::clone(&self.state);
        self.memory_task = Some(repeat_every(
            Duration::from_millis(self.config.memory_interval_ms),
            move |_| {
                lock(&state).refresh_memory();
            },
        ));

        info!("Performance monitor started");
    }

    /// Cancel both sampling tasks.  Safe to call when already stopped.
    pub fn stop(&mut self) {
        let was_running = self.is_running();
        if let Some(mut task) = self.frame_task.take() {
            task.cancel();
        }
        if let Some(mut task) = self.memory_task.take() {
            task.cancel();
        }
        if was_running {
            info!("Performance monitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame_task.is_some() || self.memory_task.is_some()
    }

    /// Count one host frame on the global sampler.
    pub fn record_frame(&self, now: Instant) {
        lock(&self.state).record_frame(now);
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        lock(&self.state).metrics.clone()
    }

    /// Restore default metrics and restart the global sampling window.
    pub fn reset(&self) {
        lock(&self.state).reset(Instant::now());
    }

    pub fn update_render_time(&self, ms: f64) {
        lock(&self.state).metrics.render_time_ms = ms.max(0.0);
    }

    pub fn update_data_processing_time(&self, ms: f64) {
        lock(&self.state).metrics.data_processing_time_ms = ms.max(0.0);
    }

    pub fn update_data_point_count(&self, count: usize) {
        lock(&self.state).metrics.data_point_count = count;
    }

    pub fn set_thresholds(&self, alerts: AlertThresholds, suggestions: SuggestionThresholds) {
        lock(&self.state).engine = AlertEngine::new(alerts, suggestions);
    }

    pub fn set_diagnostics(&self, enabled: bool) {
        lock(&self.state).diagnostics = enabled;
    }

    /// Fresh heap reading, independent of the stored snapshot.
    pub fn memory_stats(&self) -> Option<MemoryStats> {
        lock(&self.state).probe.sample_now()
    }

    pub fn alerts(&self) -> Vec<String> {
        let state = lock(&self.state);
        state.engine.evaluate_alerts(&state.metrics)
    }

    pub fn suggestions(&self) -> Vec<String> {
        let state = lock(&self.state);
        state.engine.evaluate_suggestions(&state.metrics)
    }

    pub fn summary(&self) -> PerformanceSummary {
        let mut state = lock(&self.state);
        let memory_stats = state.probe.sample_now();
        PerformanceSummary {
            current: state.metrics.clone(),
            alerts: state.engine.evaluate_alerts(&state.metrics),
            suggestions: state.engine.evaluate_suggestions(&state.metrics),
            memory_stats,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    // ── Per-surface sampling ────────────────────────────────────────────────

    /// Begin sampling a named surface; returns its current rate.
    pub fn track_surface(&self, name: &str) -> u32 {
        lock(&self.state).surfaces.track(name, Instant::now())
    }

    /// Count a frame on `name`; returns the new rate at a window boundary.
    pub fn surface_frame(&self, name: &str, now: Instant) -> Option<u32> {
        let mut state = lock(&self.state);
        let fps = state.surfaces.frame(name, now)?;
        if state.diagnostics {
            info!("{name} FPS: {fps}");
        }
        Some(fps)
    }

    pub fn surface_fps(&self, name: &str) -> Option<u32> {
        lock(&self.state).surfaces.fps(name)
    }

    pub fn untrack_surface(&self, name: &str) -> bool {
        lock(&self.state).surfaces.untrack(name)
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_system::{HeapUsage, MemorySource};
    use tokio::time;

    const MIB: u64 = 1 << 20;

    #[derive(Debug)]
    struct Fixed(u64);

    impl MemorySource for Fixed {
        fn read(&mut self) -> Option<HeapUsage> {
            Some(HeapUsage { used: self.0 * MIB, total: 2 * self.0 * MIB, limit: 4096 * MIB })
        }
    }

    fn config(frame_ms: u64, memory_ms: u64) -> MonitorConfig {
        MonitorConfig {
            memory_interval_ms: memory_ms,
            frame_interval_ms: frame_ms,
            diagnostics: true,
        }
    }

    fn monitor(cfg: MonitorConfig, used_mb: Option<u64>) -> PerformanceMonitor {
        let probe = match used_mb {
            Some(mb) => MemoryProbe::new(Some(Box::new(Fixed(mb)))),
            None => MemoryProbe::unavailable(),
        };
        PerformanceMonitor::new(cfg, AlertEngine::default(), probe)
    }

    #[tokio::test(start_paused = true)]
    async fn frame_task_measures_rate_and_refreshes_memory() {
        let mut m = monitor(config(20, 60_000), Some(120));
        m.start();

        time::sleep(Duration::from_millis(990)).await;
        assert_eq!(m.metrics().fps, 60);
        assert_eq!(m.metrics().memory_usage_mb, 0);

        time::sleep(Duration::from_millis(20)).await;
        assert_eq!(m.metrics().fps, 50);
        assert_eq!(m.metrics().memory_usage_mb, 120);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_does_not_double_count_frames() {
        let mut m = monitor(config(20, 60_000), None);
        m.start();
        m.start();

        time::sleep(Duration::from_millis(1010)).await;
        assert_eq!(m.metrics().fps, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn host_frames_alone_drive_the_rate() {
        let mut m = monitor(config(10, 60_000), None);
        m.start_with_host_frames();
        assert!(m.is_running());

        for _ in 0..40 {
            time::sleep(Duration::from_millis(25)).await;
            m.record_frame(Instant::now());
        }
        assert_eq!(m.metrics().fps, 40);

        // No built-in ticks in between host frames.
        time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(m.metrics().fps, 40);
        m.stop();
        assert!(!m.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn point_count_reported_after_start_is_kept() {
        let mut m = monitor(config(20, 60_000), None);
        m.update_data_point_count(10_000);
        m.start();
        assert_eq!(m.metrics().data_point_count, 0);

        m.update_data_point_count(10_000);
        time::sleep(Duration::from_millis(1_010)).await;
        assert_eq!(m.metrics().data_point_count, 10_000);
    }

    #[tokio::test(start_paused = true)]
    async fn memory_task_runs_independently() {
        let mut m = monitor(config(60_000, 5_000), Some(64));
        m.start();

        time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(m.metrics().memory_usage_mb, 0);
        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(m.metrics().memory_usage_mb, 64);
        assert_eq!(m.metrics().fps, 60);
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_memory_keeps_default() {
        let mut m = monitor(config(20, 100), None);
        m.start();
        time::sleep(Duration::from_secs(3)).await;

        assert_eq!(m.metrics().memory_usage_mb, 0);
        assert_eq!(m.memory_stats(), None);
        assert_eq!(m.summary().memory_stats, None);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_freezes_metrics_and_restart_resets() {
        let mut m = monitor(config(20, 60_000), None);
        m.start();
        time::sleep(Duration::from_millis(1010)).await;
        m.stop();
        m.stop();
        assert!(!m.is_running());

        m.update_render_time(25.0);
        let frozen = m.metrics();
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(m.metrics(), frozen);

        m.start();
        assert_eq!(m.metrics(), MetricsSnapshot::default());
    }

    #[test]
    fn manual_frames_drive_the_global_sampler() {
        let m = monitor(config(16, 5_000), Some(10));
        let t0 = Instant::now();
        m.reset();
        for i in 1..=30 {
            m.record_frame(t0 + Duration::from_millis(i * 34));
        }
        let fps = m.metrics().fps;
        assert!((29..=31).contains(&fps), "fps {fps}");
        assert_eq!(m.metrics().memory_usage_mb, 10);
    }

    #[test]
    fn reported_timings_feed_alerts_and_suggestions() {
        let m = monitor(config(16, 5_000), None);
        m.update_render_time(20.0);
        m.update_data_processing_time(12.345);
        m.update_data_point_count(15_000);

        assert_eq!(
            m.alerts(),
            ["Slow rendering: 20.00ms per frame.", "Slow data processing: 12.35ms."]
        );
        assert_eq!(m.suggestions().len(), 3);

        m.reset();
        assert!(m.alerts().is_empty());
        assert!(m.suggestions().is_empty());
    }

    #[test]
    fn thresholds_can_be_swapped_live() {
        let m = monitor(config(16, 5_000), None);
        assert!(m.alerts().is_empty());
        m.set_thresholds(
            AlertThresholds { fps: 61, ..Default::default() },
            SuggestionThresholds::default(),
        );
        assert_eq!(m.alerts().len(), 1);
    }

    #[test]
    fn surfaces_do_not_touch_global_rate() {
        let m = monitor(config(16, 5_000), None);
        assert_eq!(m.track_surface("heatmap"), 60);
        let t0 = Instant::now();
        for i in 1..=5 {
            m.surface_frame("heatmap", t0 + Duration::from_millis(i * 250));
        }
        assert_eq!(m.surface_fps("heatmap"), Some(4));
        assert_eq!(m.metrics().fps, 60);
        assert!(m.untrack_surface("heatmap"));
        assert_eq!(m.surface_fps("heatmap"), None);
    }

    #[test]
    fn summary_serializes() {
        let m = monitor(config(16, 5_000), Some(32));
        let summary = m.summary();
        assert_eq!(summary.memory_stats, Some(MemoryStats { used: 32, total: 64, limit: 4096 }));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["current"]["fps"], 60);
        assert!(json["alerts"].as_array().unwrap().is_empty());
    }
}
