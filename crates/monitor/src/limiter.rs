//! Call-rate helpers: trailing-edge debounce, leading-edge throttle and a
//! timing wrapper that flags calls longer than one frame.

use dash_core::sync::lock;
use dash_core::{run_after, TaskHandle};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// One frame at 60 Hz.
pub const FRAME_BUDGET: Duration = Duration::from_millis(16);

type Callback<A> = Arc<dyn Fn(A) + Send + Sync>;

/// Wrapper produced by [`debounce`].
pub struct Debounced<A> {
    f:       Callback<A>,
    wait:    Duration,
    pending: Mutex<Option<TaskHandle>>,
}

/// Delay `f` until `wait` has passed without another call.  Only the last
/// call of a burst runs, with its own argument.
///
/// Calls must happen inside a Tokio runtime.
pub fn debounce<A, F>(f: F, wait: Duration) -> Debounced<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debounced {
        f: Arc::new(f),
        wait,
        pending: Mutex::new(None),
    }
}

impl<A: Send + 'static> Debounced<A> {
    pub fn call(&self, arg: A) {
        let f = Arc::clone(&self.f);
        let task = run_after(self.wait, move || f(arg));
        if let Some(mut previous) = lock(&self.pending).replace(task) {
            previous.cancel();
        }
    }

    /// Drop the pending invocation, if any.
    pub fn cancel(&self) {
        if let Some(mut task) = lock(&self.pending).take() {
            task.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending).as_ref().is_some_and(TaskHandle::is_active)
    }
}

impl<A> std::fmt::Debug for Debounced<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounced").field("wait", &self.wait).finish_non_exhaustive()
    }
}

/// Wrapper produced by [`throttle`].
#[derive(Debug)]
pub struct Throttled<F> {
    f:          F,
    limit:      Duration,
    last_fired: Mutex<Option<Instant>>,
}

/// Run `f` on the first call, then ignore calls for `limit`.  The first
/// call after the window runs immediately again.
pub fn throttle<F>(f: F, limit: Duration) -> Throttled<F> {
    Throttled {
        f,
        limit,
        last_fired: Mutex::new(None),
    }
}

impl<F> Throttled<F> {
    /// Returns whether `f` ran.
    pub fn call<A>(&self, arg: A) -> bool
    where
        F: Fn(A),
    {
        let now = Instant::now();
        {
            let mut last = lock(&self.last_fired);
            if (*last).is_some_and(|at| now.duration_since(at) < self.limit) {
                return false;
            }
            *last = Some(now);
        }
        (self.f)(arg);
        true
    }
}

/// Wrapper produced by [`measure_execution_time`].
#[derive(Debug)]
pub struct Timed<F> {
    f:           F,
    label:       String,
    diagnostics: AtomicBool,
    slow_calls:  AtomicUsize,
    last:        Mutex<Option<Duration>>,
}

/// Time every call to `f`.  With `diagnostics` on, calls slower than
/// [`FRAME_BUDGET`] log a warning.  The flag can be flipped later with
/// [`Timed::set_diagnostics`].
pub fn measure_execution_time<F>(f: F, label: impl Into<String>, diagnostics: bool) -> Timed<F> {
    Timed {
        f,
        label: label.into(),
        diagnostics: AtomicBool::new(diagnostics),
        slow_calls: AtomicUsize::new(0),
        last: Mutex::new(None),
    }
}

impl<F> Timed<F> {
    pub fn call<A, R>(&self, arg: A) -> R
    where
        F: Fn(A) -> R,
    {
        let started = std::time::Instant::now();
        let result = (self.f)(arg);
        let elapsed = started.elapsed();

        *lock(&self.last) = Some(elapsed);
        if elapsed > FRAME_BUDGET && self.diagnostics() {
            self.slow_calls.fetch_add(1, Ordering::Relaxed);
            warn!(
                "{} took {:.2}ms (may affect FPS)",
                self.label,
                elapsed.as_secs_f64() * 1000.0
            );
        }
        result
    }

    /// Duration of the most recent call.
    pub fn last_elapsed(&self) -> Option<Duration> {
        *lock(&self.last)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn diagnostics(&self) -> bool {
        self.diagnostics.load(Ordering::Relaxed)
    }

    pub fn set_diagnostics(&self, on: bool) {
        self.diagnostics.store(on, Ordering::Relaxed);
    }

    /// Over-budget calls reported while diagnostics were on.
    pub fn slow_calls(&self) -> usize {
        self.slow_calls.load(Ordering::Relaxed)
    }
}
