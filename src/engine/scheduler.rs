//! Periodic tick sources for the polling engine
//!
//! The engine never owns a timer directly; it asks a [`TickScheduler`]
//! whether a tick is due. Production uses a monotonic interval, tests a
//! manually stepped trigger.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Periodic-tick source
///
/// At most one tick is ever due at a time, so a slow exchange can never
/// overlap the next poll cycle.
pub trait TickScheduler {
    /// Arm the scheduler with the given period
    fn start(&mut self, period: Duration);

    /// Disarm; any pending tick is discarded
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Returns true exactly once per due tick
    fn tick_due(&mut self) -> bool;
}

/// Wall-clock scheduler based on a monotonic instant
pub struct IntervalScheduler {
    period: Duration,
    next_due: Option<Instant>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self {
            period: Duration::ZERO,
            next_due: None,
        }
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TickScheduler for IntervalScheduler {
    fn start(&mut self, period: Duration) {
        self.period = period;
        self.next_due = Some(Instant::now() + period);
    }

    fn stop(&mut self) {
        self.next_due = None;
    }

    fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    fn tick_due(&mut self) -> bool {
        match self.next_due {
            Some(due) if Instant::now() >= due => {
                // rearm from now, not from `due`: ticks missed behind a
                // slow exchange must not stack up
                self.next_due = Some(Instant::now() + self.period);
                true
            }
            _ => false,
        }
    }
}

/// Manually stepped scheduler for tests
///
/// The paired [`ManualTrigger`] fires ticks from outside the engine that
/// owns the scheduler.
pub struct ManualScheduler {
    running: bool,
    pending: Rc<Cell<bool>>,
}

/// Handle that arms the next tick of a [`ManualScheduler`]
#[derive(Clone)]
pub struct ManualTrigger {
    pending: Rc<Cell<bool>>,
}

impl ManualTrigger {
    pub fn fire(&self) {
        self.pending.set(true);
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            running: false,
            pending: Rc::new(Cell::new(false)),
        }
    }

    pub fn trigger(&self) -> ManualTrigger {
        ManualTrigger {
            pending: Rc::clone(&self.pending),
        }
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TickScheduler for ManualScheduler {
    fn start(&mut self, _period: Duration) {
        self.running = true;
        self.pending.set(false);
    }

    fn stop(&mut self) {
        self.running = false;
        self.pending.set(false);
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn tick_due(&mut self) -> bool {
        if self.running && self.pending.get() {
            self.pending.set(false);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_scheduler_fires_after_period() {
        let mut scheduler = IntervalScheduler::new();
        assert!(!scheduler.is_running());
        assert!(!scheduler.tick_due());

        scheduler.start(Duration::ZERO);
        assert!(scheduler.is_running());
        assert!(scheduler.tick_due());

        scheduler.stop();
        assert!(!scheduler.tick_due());
    }

    #[test]
    fn test_interval_scheduler_does_not_fire_early() {
        let mut scheduler = IntervalScheduler::new();
        scheduler.start(Duration::from_secs(3600));
        assert!(!scheduler.tick_due());
    }

    #[test]
    fn test_manual_scheduler_one_tick_per_fire() {
        let mut scheduler = ManualScheduler::new();
        let trigger = scheduler.trigger();

        scheduler.start(Duration::ZERO);
        assert!(!scheduler.tick_due());

        trigger.fire();
        assert!(scheduler.tick_due());
        assert!(!scheduler.tick_due());
    }

    #[test]
    fn test_manual_scheduler_ignores_fire_while_stopped() {
        let mut scheduler = ManualScheduler::new();
        let trigger = scheduler.trigger();

        trigger.fire();
        assert!(!scheduler.tick_due());

        scheduler.start(Duration::ZERO);
        // the pre-start fire was discarded
        assert!(!scheduler.tick_due());
    }
}
