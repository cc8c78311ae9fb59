use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;

/// Fixed-window request counter keyed by client identifier.
///
/// Counters reset at discrete window boundaries, so a burst straddling a
/// boundary can admit up to twice the configured rate. Entries live for the
/// lifetime of the process and are never evicted.
pub struct RateLimiter {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
    clock: Arc<dyn Clock>,
    max_requests: u32,
    window: Duration,
}

/// Per-client window state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

/// Result when quota is exceeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaExceeded {
    /// Seconds until the window resets
    pub retry_after: u64,
}

impl RateLimiter {
    /// Creates a limiter admitting `max_requests` per client per minute
    pub fn per_minute(max_requests: u32, clock: Arc<dyn Clock>) -> Self {
        Self::new(max_requests, Duration::minutes(1), clock)
    }

    pub fn new(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Records a request from `client_id`.
    ///
    /// Returns the client's count within the current window when admitted.
    pub fn check(&self, client_id: &str) -> Result<u32, QuotaExceeded> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get_mut(client_id) {
            Some(entry) if now <= entry.reset_at => {
                if entry.count >= self.max_requests {
                    let remaining_ms = (entry.reset_at - now).num_milliseconds();
                    // Round up to whole seconds
                    let retry_after = ((remaining_ms + 999) / 1000).max(1) as u64;
                    return Err(QuotaExceeded { retry_after });
                }
                entry.count += 1;
                Ok(entry.count)
            }
            _ => {
                entries.insert(
                    client_id.to_string(),
                    RateLimitEntry {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                Ok(1)
            }
        }
    }

    /// Current window state for a client
    pub fn entry(&self, client_id: &str) -> Option<RateLimitEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(client_id)
            .copied()
    }

    /// Number of tracked clients
    pub fn tracked_clients(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
