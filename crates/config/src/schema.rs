use dash_core::{DashError, Result};
use serde::{Deserialize, Serialize};

/// Root configuration structure parsed from `streamdash.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    /// Sample generation and retention.
    pub stream: StreamConfig,
    /// Frame/memory sampling cadence.
    pub monitor: MonitorConfig,
    /// Limits that raise alerts.
    pub alerts: AlertThresholds,
    /// Limits that raise optimization suggestions.
    pub suggestions: SuggestionThresholds,
}

impl DashConfig {
    /// Reject combinations the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        let s = &self.stream;
        if s.interval_ms == 0 {
            return Err(DashError::Config("stream.interval_ms must be > 0".into()));
        }
        if s.retain_target == 0 {
            return Err(DashError::Config("stream.retain_target must be > 0".into()));
        }
        if s.retain_target > s.high_water_mark {
            return Err(DashError::Config(format!(
                "stream.retain_target ({}) exceeds stream.high_water_mark ({})",
                s.retain_target, s.high_water_mark
            )));
        }
        if self.monitor.memory_interval_ms == 0 || self.monitor.frame_interval_ms == 0 {
            return Err(DashError::Config("monitor intervals must be > 0".into()));
        }
        Ok(())
    }
}

/// Stream generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Delay between generated samples (milliseconds).
    pub interval_ms: u64,
    /// Number of backfilled samples created at startup.
    pub initial_batch_size: usize,
    /// Buffer length that triggers eviction.
    pub high_water_mark: usize,
    /// Length the buffer is trimmed down to on eviction.
    pub retain_target: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            initial_batch_size: 10_000,
            high_water_mark: 20_000,
            retain_target: 15_000,
        }
    }
}

/// Performance monitor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Independent memory probe cadence (milliseconds).
    pub memory_interval_ms: u64,
    /// Host frame cadence (milliseconds); 16 ≈ 60 Hz.
    pub frame_interval_ms: u64,
    /// Emit per-second FPS lines and slow-call warnings.
    pub diagnostics: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            memory_interval_ms: 5_000,
            frame_interval_ms: 16,
            diagnostics: false,
        }
    }
}

/// An alert fires when a metric crosses its limit (`<` for fps, `>` otherwise).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub fps: u32,
    pub memory_mb: u64,
    pub render_ms: f64,
    pub processing_ms: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            fps: 30,
            memory_mb: 200,
            render_ms: 16.0,
            processing_ms: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionThresholds {
    pub fps: u32,
    pub memory_mb: u64,
    pub point_count: usize,
}

impl Default for SuggestionThresholds {
    fn default() -> Self {
        Self {
            fps: 45,
            memory_mb: 150,
            point_count: 5_000,
        }
    }
}
