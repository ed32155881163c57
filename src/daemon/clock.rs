//! Clock driver for the workout timer.
//!
//! A clock hands out at most one tick subscription at a time. Every
//! subscription gets a fresh generation number and every tick carries the
//! generation it was produced for, so the controller can drop ticks that were
//! already queued when the subscription was stopped or replaced.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One tick from a clock subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    /// Generation of the subscription that produced the tick
    pub generation: u64,
}

/// Repeating tick source with a single-subscription invariant.
pub trait ClockDriver: Send {
    /// Starts a new subscription, stopping any previous one first.
    ///
    /// Returns the generation of the new subscription.
    fn start(&mut self) -> u64;

    /// Stops the active subscription. Safe to call when none is active.
    fn stop(&mut self);

    /// Returns the generation of the live subscription, if any.
    fn active_generation(&self) -> Option<u64>;

    /// Returns true if a subscription is live.
    fn is_active(&self) -> bool {
        self.active_generation().is_some()
    }

    /// Returns true if the tick belongs to the live subscription.
    fn accepts(&self, tick: ClockTick) -> bool {
        self.active_generation() == Some(tick.generation)
    }
}

// ============================================================================
// IntervalClock
// ============================================================================

/// Clock backed by a tokio interval task.
///
/// Must be started from within a tokio runtime.
pub struct IntervalClock {
    tick_tx: mpsc::UnboundedSender<ClockTick>,
    period: Duration,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl IntervalClock {
    /// Creates a one-second clock that delivers ticks on `tick_tx`.
    pub fn new(tick_tx: mpsc::UnboundedSender<ClockTick>) -> Self {
        Self::with_period(tick_tx, TICK_PERIOD)
    }

    /// Creates a clock with a custom tick period.
    pub fn with_period(tick_tx: mpsc::UnboundedSender<ClockTick>, period: Duration) -> Self {
        Self {
            tick_tx,
            period,
            generation: 0,
            handle: None,
        }
    }
}

impl ClockDriver for IntervalClock {
    fn start(&mut self) -> u64 {
        self.stop();

        self.generation += 1;
        let generation = self.generation;
        let period = self.period;
        let tick_tx = self.tick_tx.clone();
        // The first tick lands one full period after start.
        let first = Instant::now() + period;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if tick_tx.send(ClockTick { generation }).is_err() {
                    tracing::debug!("Tick receiver dropped, stopping clock {}", generation);
                    break;
                }
            }
        }));

        tracing::debug!("Clock subscription {} started", generation);
        generation
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Clock subscription {} stopped", self.generation);
        }
    }

    fn active_generation(&self) -> Option<u64> {
        self.handle.as_ref().map(|_| self.generation)
    }
}

impl Drop for IntervalClock {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// ManualClock
// ============================================================================

/// Clock without a background task, for driving the controller by hand.
#[derive(Debug, Default)]
pub struct ManualClock {
    generation: u64,
    active: bool,
    starts: u32,
}

impl ManualClock {
    /// Creates an idle manual clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many subscriptions have been started.
    #[must_use]
    pub fn start_count(&self) -> u32 {
        self.starts
    }

    /// Builds a tick for the live subscription, if any.
    #[must_use]
    pub fn current_tick(&self) -> Option<ClockTick> {
        self.active_generation()
            .map(|generation| ClockTick { generation })
    }
}

impl ClockDriver for ManualClock {
    fn start(&mut self) -> u64 {
        self.stop();
        self.generation += 1;
        self.active = true;
        self.starts += 1;
        self.generation
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn active_generation(&self) -> Option<u64> {
        self.active.then_some(self.generation)
    }
}

// ============================================================================
// Tests
// ============================================================================
