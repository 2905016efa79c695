//! Round countdowns and one-shot delays for Doodle.
//!
//! Both timers run as spawned Tokio tasks and report through callbacks. The
//! callbacks are plain closures; the lobby layer uses them to push events
//! back into its own queue, so no lobby state is ever touched from a timer
//! task.
//!
//! Time comes from the Tokio clock. Under `tokio::time::pause()` (or
//! `#[tokio::test(start_paused = true)]`) a two-minute round runs in
//! microseconds and lands on exact second boundaries.
//!
//! ```ignore
//! let timer = RoundTimer::start(
//!     TimerConfig::default(),
//!     move |remaining| { let _ = tx.send(Tick(remaining)); },
//!     move || { let _ = tx2.send(Expired); },
//! );
//! ```

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`RoundTimer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    /// Number of ticks before expiry. Default: 120.
    pub duration_secs: u32,
    /// Time between ticks. Default: one second.
    pub period: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            duration_secs: 120,
            period: Duration::from_secs(1),
        }
    }
}

impl TimerConfig {
    /// Shortest accepted tick period.
    pub const MIN_PERIOD: Duration = Duration::from_millis(1);

    /// A one-tick-per-second countdown of the given length.
    pub fn with_duration(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`RoundTimer::start`]. A zero period would
    /// make `tokio::time::interval` panic, so it is raised to
    /// [`Self::MIN_PERIOD`].
    pub fn validated(mut self) -> Self {
        if self.period < Self::MIN_PERIOD {
            warn!(
                period_us = self.period.as_micros() as u64,
                "timer period below minimum, clamping"
            );
            self.period = Self::MIN_PERIOD;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Task slot
// ---------------------------------------------------------------------------

/// Owns at most one spawned timer task and aborts it on cancel or drop.
#[derive(Debug, Default)]
struct TaskSlot {
    task: Option<JoinHandle<()>>,
}

impl TaskSlot {
    fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        Self {
            task: Some(tokio::spawn(future)),
        }
    }

    fn cancel(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                let was_live = !task.is_finished();
                task.abort();
                was_live
            }
            None => false,
        }
    }

    fn is_live(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ---------------------------------------------------------------------------
// RoundTimer
// ---------------------------------------------------------------------------

/// A countdown that ticks once per period and expires at zero.
///
/// For a duration of `n`, `on_tick` is called `n` times with
/// `n - 1, n - 2, …, 0`, one period apart, and then `on_expire` is called
/// exactly once. After that the timer is inert.
///
/// Cancelling is idempotent and safe on a timer that already expired or was
/// never started. Dropping the timer cancels it, so replacing a lobby's
/// timer with a new one can never leave the old countdown running.
///
/// Late wake-ups delay the following ticks instead of bursting, so every
/// count is still delivered exactly once.
#[derive(Debug, Default)]
pub struct RoundTimer {
    slot: TaskSlot,
}

impl RoundTimer {
    /// A timer that was never started.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Starts a countdown on the current Tokio runtime.
    pub fn start<T, E>(config: TimerConfig, on_tick: T, on_expire: E) -> Self
    where
        T: FnMut(u32) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        let config = config.validated();
        debug!(
            duration_secs = config.duration_secs,
            period_ms = config.period.as_millis() as u64,
            "round timer started"
        );
        Self {
            slot: TaskSlot::spawn(countdown(config, on_tick, on_expire)),
        }
    }

    /// Stops the countdown. No callback fires after this returns.
    pub fn cancel(&mut self) {
        if self.slot.cancel() {
            debug!("round timer cancelled");
        }
    }

    /// Whether the countdown is still ticking.
    pub fn is_running(&self) -> bool {
        self.slot.is_live()
    }
}

async fn countdown<T, E>(config: TimerConfig, mut on_tick: T, on_expire: E)
where
    T: FnMut(u32),
    E: FnOnce(),
{
    let mut interval = time::interval_at(Instant::now() + config.period, config.period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for remaining in (0..config.duration_secs).rev() {
        interval.tick().await;
        trace!(remaining, "round timer tick");
        on_tick(remaining);
    }

    debug!("round timer expired");
    on_expire();
}

// ---------------------------------------------------------------------------
// Delay
// ---------------------------------------------------------------------------

/// A cancellable one-shot timer.
///
/// Fires `on_fire` once after the given duration unless cancelled or
/// dropped first.
#[derive(Debug, Default)]
pub struct Delay {
    slot: TaskSlot,
}

impl Delay {
    /// Schedules `on_fire` to run after `after`.
    pub fn start<F>(after: Duration, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            slot: TaskSlot::spawn(async move {
                time::sleep(after).await;
                on_fire();
            }),
        }
    }

    /// Prevents the callback from firing. Idempotent.
    pub fn cancel(&mut self) {
        self.slot.cancel();
    }

    /// Whether the callback is still scheduled.
    pub fn is_pending(&self) -> bool {
        self.slot.is_live()
    }
}
