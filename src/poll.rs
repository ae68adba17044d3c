// Adaptive re-evaluation cadence: fast while the system is awake,
// slow once it suspends with no charge in progress. Wake times are
// computed relative to the last completed evaluation so the cadence
// survives restarts of the tick loop.

use embassy_time::{Duration, Instant};

use crate::config::{POLL_LEAD, POLL_SLACK};

/// A wake request range: fire no earlier than `earliest`, anything up
/// to `latest` is acceptable so the platform can coalesce the wake
/// with other alarms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPlan {
    pub earliest: Instant,
    pub latest: Instant,
}

#[derive(Clone, Copy, Debug)]
pub struct PollScheduler {
    last_poll: Instant,
    slow_poll_active: bool,
    fast_poll: Duration,
    slow_poll: Duration,
}

impl PollScheduler {
    pub fn new(fast_poll: Duration, slow_poll: Duration, now: Instant) -> PollScheduler {
        PollScheduler {
            last_poll: now,
            slow_poll_active: false,
            fast_poll,
            slow_poll,
        }
    }

    pub fn last_poll(&self) -> Instant {
        self.last_poll
    }

    pub fn slow_poll_active(&self) -> bool {
        self.slow_poll_active
    }

    fn plan(&self, interval: Duration) -> PollPlan {
        let earliest = self.last_poll + interval - POLL_LEAD;
        PollPlan {
            earliest,
            latest: earliest + POLL_LEAD + POLL_SLACK,
        }
    }

    /// Records a completed evaluation and schedules the next fast
    /// poll. Every finished tick goes back to the fast cadence; only a
    /// suspend notification moves it out again.
    pub fn completed_poll(&mut self, now: Instant) -> PollPlan {
        self.last_poll = now;
        self.slow_poll_active = false;
        self.plan(self.fast_poll)
    }

    /// Suspend notification. Drops to the slow cadence unless a charge
    /// is in progress, in which case the fast plan stands untouched.
    pub fn entered_suspend(&mut self, charging: bool) -> Option<PollPlan> {
        if charging {
            return None;
        }

        self.slow_poll_active = true;
        Some(self.plan(self.slow_poll))
    }

    /// Resume notification. Returns true when the slow cadence was
    /// active and the caller must re-evaluate immediately.
    pub fn left_suspend(&mut self) -> bool {
        if self.slow_poll_active {
            self.slow_poll_active = false;
            true
        } else {
            false
        }
    }
}
