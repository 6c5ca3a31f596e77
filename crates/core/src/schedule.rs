//! Cancellable recurring and one-shot work on the Tokio timer.
//!
//! Every scheduled piece of work is owned by exactly one [`TaskHandle`].
//! Whoever holds the handle decides when the work ends; dropping the handle
//! ends it too, so a component that stores its handles cannot leak timers.

use std::future::Future;
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Shortest period accepted by [`repeat_every`].
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Owner of a spawned timer task.
#[derive(Debug)]
pub struct TaskHandle {
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    /// Stop the task.  Calling this more than once is harmless.
    pub fn cancel(&mut self) {
        if let Some(abort) = self.abort.take() {
            abort.abort();
        }
    }

    /// `true` until [`cancel`](Self::cancel) is called or a one-shot task completes.
    pub fn is_active(&self) -> bool {
        self.abort.as_ref().is_some_and(|a| !a.is_finished())
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawn `fut` onto the runtime, owned by the returned handle.
pub fn spawn_task<F>(fut: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let join = tokio::spawn(fut);
    TaskHandle {
        abort: Some(join.abort_handle()),
    }
}

/// Run `tick` every `period`, first one full period from now.
///
/// The callback receives the instant the tick fired.  Late ticks are
/// delayed rather than bunched up.  Must be called from within a Tokio
/// runtime.
pub fn repeat_every<F>(period: Duration, mut tick: F) -> TaskHandle
where
    F: FnMut(Instant) + Send + 'static,
{
    let period = period.max(MIN_PERIOD);
    spawn_task(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            let at = ticker.tick().await;
            tick(at);
        }
    })
}

/// Run `job` once, `delay` from now, unless cancelled first.
pub fn run_after<F>(delay: Duration, job: F) -> TaskHandle
where
    F: FnOnce() + Send + 'static,
{
    spawn_task(async move {
        time::sleep(delay).await;
        job();
    })
}
