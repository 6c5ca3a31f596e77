use serde::{Deserialize, Serialize};

/// Frame rate reported before the first sampling boundary.
pub const DEFAULT_FPS: u32 = 60;

/// Process-wide performance figures read by the alert evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Recomputed only at one-second sampling boundaries.
    pub fps: u32,
    /// Last known heap usage in MB.  Stays at its previous value while the
    /// memory capability is unavailable.
    pub memory_usage_mb: u64,
    /// Reported by the host after each render pass.
    pub render_time_ms: f64,
    /// Reported by the host after each processing pass.
    pub data_processing_time_ms: f64,
    pub data_point_count: usize,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            memory_usage_mb: 0,
            render_time_ms: 0.0,
            data_processing_time_ms: 0.0,
            data_point_count: 0,
        }
    }
}

/// Heap figures in whole megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub used: u64,
    pub total: u64,
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_start_at_sixty_fps() {
        let m = MetricsSnapshot::default();
        assert_eq!(m.fps, 60);
        assert_eq!(m.memory_usage_mb, 0);
        assert_eq!(m.data_point_count, 0);
    }
}
