use std::time::{Duration, Instant};

/// A user-facing message that expires on its own, like the duplicate-file
/// notice or the validation banner.
#[derive(Debug, Clone)]
pub struct Notice {
    message: String,
    raised_at: Instant,
    ttl: Duration,
}

impl Notice {
    pub fn new(message: impl Into<String>, ttl: Duration) -> Self {
        Self::raised_at(message, ttl, Instant::now())
    }

    pub fn raised_at(message: impl Into<String>, ttl: Duration, now: Instant) -> Self {
        Self {
            message: message.into(),
            raised_at: now,
            ttl,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.ttl
    }

    /// The message if it is still showing at `now`.
    pub fn visible_at(&self, now: Instant) -> Option<&str> {
        (!self.is_expired_at(now)).then_some(self.message.as_str())
    }
}
