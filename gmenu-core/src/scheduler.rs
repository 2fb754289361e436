//! Debounced refilter scheduling.
//!
//! The scheduler owns a single timer slot. The event loop asks for the
//! [`deadline`](RefilterScheduler::deadline) to bound its poll timeout and
//! calls [`fire_due`](RefilterScheduler::fire_due) after every wakeup.

use std::time::{Duration, Instant};

/// Quiet period between the last keystroke and the refilter pass.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Identifies one armed timer. Re-arming yields a token with a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefilterToken {
    id: u64,
    due: Instant,
}

impl RefilterToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn due(&self) -> Instant {
        self.due
    }
}

#[derive(Debug)]
pub struct RefilterScheduler {
    delay: Duration,
    pending: Option<RefilterToken>,
    next_id: u64,
}

impl Default for RefilterScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl RefilterScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            next_id: 1,
        }
    }

    /// Arm the timer for `now + delay`, cancelling any pending one.
    pub fn arm(&mut self, now: Instant) -> RefilterToken {
        if let Some(old) = self.pending.take() {
            tracing::trace!(token = old.id, "cancelled pending refilter");
        }
        let token = RefilterToken {
            id: self.next_id,
            due: now + self.delay,
        };
        self.next_id += 1;
        self.pending = Some(token);
        tracing::trace!(token = token.id, delay_ms = self.delay.as_millis() as u64, "armed refilter");
        token
    }

    /// Drop the pending timer, if any.
    pub fn cancel(&mut self) -> Option<RefilterToken> {
        let token = self.pending.take();
        if let Some(t) = token {
            tracing::trace!(token = t.id, "cancelled pending refilter");
        }
        token
    }

    /// Consume the pending timer if it is due at `now`.
    pub fn fire_due(&mut self, now: Instant) -> Option<RefilterToken> {
        match self.pending {
            Some(token) if token.due <= now => self.pending.take(),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<RefilterToken> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|t| t.due)
    }

    /// Time left until the pending timer is due; zero when overdue.
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline().map(|due| due.saturating_duration_since(now))
    }
}
