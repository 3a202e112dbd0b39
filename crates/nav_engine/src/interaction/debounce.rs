use std::time::{Duration, Instant};

/// Single pending deadline with last-write-wins rescheduling.
#[derive(Debug, Clone)]
pub(crate) struct Debouncer {
    window: Duration,
    due_at: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Schedule {
    Fresh,
    /// A pending deadline was cancelled in favour of the new one.
    Replaced,
}

impl Debouncer {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            due_at: None,
        }
    }

    pub(crate) fn schedule(&mut self, now: Instant) -> Schedule {
        let previous = self.due_at.replace(now + self.window);
        if previous.is_some() {
            Schedule::Replaced
        } else {
            Schedule::Fresh
        }
    }

    pub(crate) fn cancel(&mut self) -> bool {
        self.due_at.take().is_some()
    }

    /// Consumes the pending deadline once `now` has reached it.
    pub(crate) fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.due_at {
            Some(due_at) if now >= due_at => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn due_at(&self) -> Option<Instant> {
        self.due_at
    }
}
