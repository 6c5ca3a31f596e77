use dash_core::metrics::DEFAULT_FPS;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Minimum time between two frame-rate measurements.
pub const SAMPLE_WINDOW: Duration = Duration::from_millis(1000);

/// Frame counter that derives frames/second on rolling one-second windows.
#[derive(Debug, Clone)]
pub struct FrameSampler {
    frames:      u32,
    last_sample: Instant,
    fps:         u32,
}

impl FrameSampler {
    pub fn new(now: Instant) -> Self {
        Self {
            frames:      0,
            last_sample: now,
            fps:         DEFAULT_FPS,
        }
    }

    /// Count one frame.  Returns the new rate when this frame closes a
    /// sampling window, `None` otherwise.
    pub fn frame(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.last_sample);
        if elapsed < SAMPLE_WINDOW {
            return None;
        }

        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        self.fps = (f64::from(self.frames) * 1000.0 / elapsed_ms).round() as u32;
        self.frames = 0;
        self.last_sample = now;
        Some(self.fps)
    }

    /// Most recent measurement.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Forget counted frames and start a fresh window at `now`.
    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }
}

/// Independent frame samplers keyed by surface name.
///
/// Each surface has its own counter and window, so measuring one never
/// disturbs the global sampler or any other surface.
#[derive(Debug, Clone, Default)]
pub struct SurfaceSamplers {
    samplers: HashMap<String, FrameSampler>,
}

impl SurfaceSamplers {
    /// Begin tracking `name`; returns its current rate.  Tracking an
    /// already-tracked surface keeps its existing window.
    pub fn track(&mut self, name: &str, now: Instant) -> u32 {
        self.samplers
            .entry(name.to_string())
            .or_insert_with(|| FrameSampler::new(now))
            .fps()
    }

    pub fn untrack(&mut self, name: &str) -> bool {
        self.samplers.remove(name).is_some()
    }

    /// Count a frame for `name`.  Untracked names are ignored.
    pub fn frame(&mut self, name: &str, now: Instant) -> Option<u32> {
        self.samplers.get_mut(name)?.frame(now)
    }

    pub fn fps(&self, name: &str) -> Option<u32> {
        self.samplers.get(name).map(FrameSampler::fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn rate_holds_until_window_closes() {
        let t0 = Instant::now();
        let mut s = FrameSampler::new(t0);
        for i in 1..60 {
            assert_eq!(s.frame(t0 + ms(i * 16)), None);
        }
        assert_eq!(s.fps(), 60);
    }

    #[test]
    fn rate_is_frames_over_elapsed() {
        let t0 = Instant::now();
        let mut s = FrameSampler::new(t0);
        for i in 1..=24 {
            s.frame(t0 + ms(i * 40));
        }
        assert_eq!(s.fps(), 60);
        // 25th frame lands at exactly 1000 ms.
        assert_eq!(s.frame(t0 + ms(1000)), Some(25));
        assert_eq!(s.fps(), 25);
    }

    #[test]
    fn half_second_frames_update_every_other_sample() {
        let t0 = Instant::now();
        let mut s = FrameSampler::new(t0);

        assert_eq!(s.frame(t0 + ms(500)), None);
        assert_eq!(s.fps(), 60);
        assert_eq!(s.frame(t0 + ms(1000)), Some(2));
        assert_eq!(s.frame(t0 + ms(1500)), None);
        assert_eq!(s.fps(), 2);
        assert_eq!(s.frame(t0 + ms(2000)), Some(2));
    }

    #[test]
    fn long_gap_is_rounded_over_actual_elapsed() {
        let t0 = Instant::now();
        let mut s = FrameSampler::new(t0);
        s.frame(t0 + ms(100));
        s.frame(t0 + ms(200));
        // 3 frames over 1.5 s
        assert_eq!(s.frame(t0 + ms(1500)), Some(2));
    }

    #[test]
    fn reset_restarts_window() {
        let t0 = Instant::now();
        let mut s = FrameSampler::new(t0);
        s.frame(t0 + ms(1000));
        assert_eq!(s.fps(), 1);
        s.reset(t0 + ms(1200));
        assert_eq!(s.fps(), 60);
        assert_eq!(s.frame(t0 + ms(2100)), None);
    }

    #[test]
    fn surfaces_are_isolated() {
        let t0 = Instant::now();
        let mut surfaces = SurfaceSamplers::default();
        assert_eq!(surfaces.track("line", t0), 60);
        surfaces.track("scatter", t0);

        for i in 1..=10 {
            surfaces.frame("line", t0 + ms(i * 100));
        }
        surfaces.frame("scatter", t0 + ms(1000));

        assert_eq!(surfaces.fps("line"), Some(10));
        assert_eq!(surfaces.fps("scatter"), Some(1));
        assert_eq!(surfaces.frame("missing", t0 + ms(5000)), None);
        assert_eq!(surfaces.fps("missing"), None);
    }

    #[test]
    fn retracking_keeps_existing_window() {
        let t0 = Instant::now();
        let mut surfaces = SurfaceSamplers::default();
        surfaces.track("bar", t0);
        surfaces.frame("bar", t0 + ms(1000));
        assert_eq!(surfaces.track("bar", t0 + ms(1100)), 1);
        assert!(surfaces.untrack("bar"));
        assert!(!surfaces.untrack("bar"));
    }
}
