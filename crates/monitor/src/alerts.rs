use dash_config::{AlertThresholds, SuggestionThresholds};
use dash_core::MetricsSnapshot;

/// Maps a metrics snapshot to human-readable alerts and suggestions.
///
/// Evaluation is pure: the same snapshot and thresholds always produce the
/// same strings, in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertEngine {
    pub alerts:      AlertThresholds,
    pub suggestions: SuggestionThresholds,
}

impl AlertEngine {
    pub fn new(alerts: AlertThresholds, suggestions: SuggestionThresholds) -> Self {
        Self { alerts, suggestions }
    }

    /// Ordered: fps, memory, render time, processing time.
    pub fn evaluate_alerts(&self, m: &MetricsSnapshot) -> Vec<String> {
        let t = &self.alerts;
        let mut alerts = Vec::new();

        if m.fps < t.fps {
            alerts.push(format!(
                "Low FPS: {}. Consider reducing data points or optimizing rendering.",
                m.fps
            ));
        }
        if m.memory_usage_mb > t.memory_mb {
            alerts.push(format!(
                "High memory usage: {}MB. Check for memory leaks.",
                m.memory_usage_mb
            ));
        }
        if m.render_time_ms > t.render_ms {
            alerts.push(format!("Slow rendering: {:.2}ms per frame.", m.render_time_ms));
        }
        if m.data_processing_time_ms > t.processing_ms {
            alerts.push(format!(
                "Slow data processing: {:.2}ms.",
                m.data_processing_time_ms
            ));
        }

        alerts
    }

    /// Three suggestions per triggered group: rendering, memory, scale.
    pub fn evaluate_suggestions(&self, m: &MetricsSnapshot) -> Vec<String> {
        let t = &self.suggestions;
        let mut suggestions = Vec::new();

        if m.fps < t.fps {
            suggestions.extend(bullets(&[
                "Reduce number of data points displayed",
                "Implement data sampling for large datasets",
                "Use simpler chart rendering techniques",
            ]));
        }
        if m.memory_usage_mb > t.memory_mb {
            suggestions.extend(bullets(&[
                "Implement data pagination or windowing",
                "Clear unused data from memory",
                "Use object pooling for frequent creations",
            ]));
        }
        if m.data_point_count > t.point_count {
            suggestions.extend(bullets(&[
                "Consider moving data processing onto worker threads",
                "Implement virtual scrolling for data tables",
                "Use level-of-detail rendering (show less detail when zoomed out)",
            ]));
        }

        suggestions
    }
}

fn bullets<'a>(lines: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
    lines.iter().map(|line| format!("• {line}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(fps: u32, memory: u64, render: f64, processing: f64) -> MetricsSnapshot {
        MetricsSnapshot {
            fps,
            memory_usage_mb: memory,
            render_time_ms: render,
            data_processing_time_ms: processing,
            data_point_count: 0,
        }
    }

    #[test]
    fn low_fps_alone() {
        let alerts = AlertEngine::default().evaluate_alerts(&snapshot(20, 50, 5.0, 2.0));
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("Low FPS: 20"));
    }

    #[test]
    fn healthy_snapshot_has_no_alerts() {
        let engine = AlertEngine::default();
        assert!(engine.evaluate_alerts(&snapshot(60, 50, 5.0, 2.0)).is_empty());
        assert!(engine.evaluate_suggestions(&snapshot(60, 50, 5.0, 2.0)).is_empty());
    }

    #[test]
    fn alerts_keep_fixed_order() {
        let alerts = AlertEngine::default().evaluate_alerts(&snapshot(12, 512, 33.333, 10.5));
        assert_eq!(
            alerts,
            [
                "Low FPS: 12. Consider reducing data points or optimizing rendering.",
                "High memory usage: 512MB. Check for memory leaks.",
                "Slow rendering: 33.33ms per frame.",
                "Slow data processing: 10.50ms.",
            ]
        );
    }

    #[test]
    fn thresholds_are_strict() {
        let engine = AlertEngine::default();
        assert!(engine.evaluate_alerts(&snapshot(30, 200, 16.0, 10.0)).is_empty());
        assert!(engine.evaluate_suggestions(&snapshot(45, 150, 0.0, 0.0)).is_empty());
    }

    #[test]
    fn suggestions_group_by_trigger() {
        let engine = AlertEngine::default();
        let mut m = snapshot(40, 160, 0.0, 0.0);
        m.data_point_count = 5_001;

        let s = engine.evaluate_suggestions(&m);
        assert_eq!(s.len(), 9);
        assert!(s.iter().all(|line| line.starts_with("• ")));
        assert_eq!(s[0], "• Reduce number of data points displayed");
        assert_eq!(s[3], "• Implement data pagination or windowing");
        assert!(s[8].contains("level-of-detail"));
    }

    #[test]
    fn only_point_count_triggers_scaling_group() {
        let mut m = snapshot(60, 10, 0.0, 0.0);
        m.data_point_count = 10_000;
        let s = AlertEngine::default().evaluate_suggestions(&m);
        assert_eq!(s.len(), 3);
        assert!(s[0].contains("worker threads"));
    }

    #[test]
    fn custom_thresholds_apply() {
        let engine = AlertEngine::new(
            AlertThresholds { fps: 50, ..Default::default() },
            SuggestionThresholds::default(),
        );
        assert_eq!(engine.evaluate_alerts(&snapshot(45, 0, 0.0, 0.0)).len(), 1);
    }
}
