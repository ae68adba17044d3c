use embassy_time::{Duration, Instant};

/// Wall-clock deadline for the current charge cycle. Armed once when a
/// cycle starts, cleared on cable removal, while charging is blocked,
/// and after its expiry has been latched into the overtime flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeadlineTracker {
    deadline: Option<Instant>,
}

impl DeadlineTracker {
    pub const fn new() -> DeadlineTracker {
        DeadlineTracker { deadline: None }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Arms the deadline if no cycle is already being timed.
    pub fn arm(&mut self, now: Instant, window: Duration) {
        if self.deadline.is_none() {
            self.deadline = Some(now + window);
        }
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }

    pub fn expired(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now > deadline)
    }
}
