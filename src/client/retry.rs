//! Retry policy for transient portal statuses
//!
//! The portal answers 429 or 503 while it sheds load; the production contract
//! is to retry those forever with a fixed pause. The policy is a strategy
//! object so tests (and cautious deployments) can bound it.

use std::fmt;
use std::time::Duration;

/// Pause between attempts when the portal answers 429 or 503.
/// One second is long enough for the server-side pressure to ease without
/// noticeably stretching a soak run.
pub const DEFAULT_TRANSIENT_BACKOFF: Duration = Duration::from_secs(1);

/// Decides whether (and how long) to wait before re-issuing a request that
/// hit a transient status.
pub trait RetryPolicy: Send + Sync + fmt::Debug {
    /// Delay before retry number `attempt` (1-based).
    /// `None` stops retrying; the current call then fails.
    fn next_delay(&self, attempt: u32) -> Option<Duration>;
}

/// Fixed-delay policy, optionally bounded in attempts.
#[derive(Debug, Clone)]
pub struct FixedBackoff {
    delay: Duration,
    max_attempts: Option<u32>,
}

impl FixedBackoff {
    /// Retry forever with the given pause. The production default.
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Retry at most `max_attempts` times, then give up.
    pub fn limited(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts),
        }
    }
}

impl Default for FixedBackoff {
    fn default() -> Self {
        Self::unbounded(DEFAULT_TRANSIENT_BACKOFF)
    }
}

impl RetryPolicy for FixedBackoff {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if attempt > max => None,
            _ => Some(self.delay),
        }
    }
}
