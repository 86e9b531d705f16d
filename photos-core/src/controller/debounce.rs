use std::time::{Duration, Instant};

/// Trailing debounce: holds the latest value and lets it through once no
/// newer value has arrived for `duration`.
pub struct Debounce<T> {
    duration: Duration,
    deadline: Option<Instant>,
    pending: Option<T>,
}

impl<T> Debounce<T> {
    pub fn trailing(duration: Duration) -> Self {
        Self {
            duration,
            deadline: None,
            pending: None,
        }
    }

    pub fn update(&mut self, value: T, now: Instant) {
        self.pending = Some(value);
        self.deadline = Some(now + self.duration);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn fire(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.pending = None;
    }
}
