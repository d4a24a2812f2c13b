// ============================
// crates/gatekey-lib/src/rate_limit.rs
// ============================
//! Rate limiting for authentication attempts.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default number of failed attempts before rate limiting
const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default lockout duration (5 minutes)
const DEFAULT_LOCKOUT_DURATION: Duration = Duration::from_secs(5 * 60);

/// Entry in the rate limit map
#[derive(Debug, Clone)]
struct ThrottleEntry {
    /// Number of failed attempts
    failed_attempts: u32,
    /// Time of the last failed attempt
    last_failure: Instant,
    /// When the lockout expires, if locked
    locked_until: Option<Instant>,
}

/// Rate limiter for authentication attempts, keyed by identifier.
///
/// Clones share the underlying map, so the same limiter can be handed to
/// the service and to an embedding layer.
#[derive(Debug, Clone)]
pub struct AuthRateLimiter {
    /// Map of identifiers to rate limit entries
    attempts: Arc<DashMap<String, ThrottleEntry>>,
    /// Maximum number of failed attempts before lockout
    max_attempts: u32,
    /// Duration of lockout period
    lockout_duration: Duration,
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_LOCKOUT_DURATION)
    }
}

impl AuthRateLimiter {
    /// Create a new auth rate limiter
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            lockout_duration,
        }
    }

    /// Check if an identifier is allowed to attempt authentication
    pub fn check(&self, identifier: &str) -> bool {
        if let Some(entry) = self.attempts.get(identifier) {
            if let Some(locked_until) = entry.locked_until {
                if Instant::now() < locked_until {
                    return false;
                }
            }
        }
        true
    }

    /// Record a failed authentication attempt
    pub fn record_failure(&self, identifier: &str) {
        let now = Instant::now();

        let mut entry = self
            .attempts
            .entry(identifier.to_string())
            .or_insert_with(|| ThrottleEntry {
                failed_attempts: 0,
                last_failure: now,
                locked_until: None,
            });

        // An expired lockout resets the count
        if let Some(locked_until) = entry.locked_until {
            if now > locked_until {
                entry.failed_attempts = 0;
                entry.locked_until = None;
            }
        }

        entry.failed_attempts += 1;
        entry.last_failure = now;

        if entry.failed_attempts >= self.max_attempts {
            entry.locked_until = Some(now + self.lockout_duration);
            tracing::warn!(identifier, "identifier locked out after repeated failures");
        }
    }

    /// Record a successful authentication
    pub fn record_success(&self, identifier: &str) {
        self.attempts.remove(identifier);
    }

    /// Clean up expired lockouts and stale failure records
    pub fn cleanup(&self) {
        let now = Instant::now();

        self.attempts.retain(|_, entry| {
            if let Some(locked_until) = entry.locked_until {
                return now < locked_until;
            }
            now.duration_since(entry.last_failure) < Duration::from_secs(24 * 60 * 60)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locks_out_after_max_failures() {
        let limiter = AuthRateLimiter::new(3, Duration::from_secs(60));

        assert!(limiter.check("u1"));
        limiter.record_failure("u1");
        limiter.record_failure("u1");
        assert!(limiter.check("u1"));

        limiter.record_failure("u1");
        assert!(!limiter.check("u1"));

        // other identifiers are unaffected
        assert!(limiter.check("u2"));
    }

    #[test]
    fn success_clears_the_failure_record() {
        let limiter = AuthRateLimiter::new(3, Duration::from_secs(60));

        limiter.record_failure("u1");
        limiter.record_failure("u1");
        limiter.record_success("u1");

        limiter.record_failure("u1");
        limiter.record_failure("u1");
        assert!(limiter.check("u1"));
    }

    #[test]
    fn lockout_expires() {
        let limiter = AuthRateLimiter::new(1, Duration::from_millis(20));

        limiter.record_failure("u1");
        assert!(!limiter.check("u1"));

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check("u1"));
    }

    #[test]
    fn cleanup_drops_expired_lockouts() {
        let limiter = AuthRateLimiter::new(1, Duration::from_millis(10));

        limiter.record_failure("u1");
        std::thread::sleep(Duration::from_millis(20));
        limiter.cleanup();

        assert!(limiter.attempts.is_empty());
    }
}
