//! Lockout Entity
//!
//! Failed-attempt tracking per client identifier (IP address or pre-auth
//! user-supplied identifier). States: Clear -> failures 1..4 -> Locked on
//! the 5th -> Clear again on success or once `locked_until` elapses.

use chrono::{DateTime, Duration, Utc};

/// Throttle policy
#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    /// Failures before the identifier is locked
    pub max_failures: u32,
    /// How long a tripped lock lasts
    pub lockout: Duration,
    /// How long a clear (not locked) entry is kept after its last failure
    pub retention: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failures: 5,
            lockout: Duration::minutes(30),
            retention: Duration::minutes(30),
        }
    }
}

/// Lockout entry for one identifier
#[derive(Debug, Clone)]
pub struct LockoutEntry {
    /// Consecutive failure count
    pub attempts: u32,
    /// Last failure time
    pub last_failed_at: DateTime<Utc>,
    /// Set only once `attempts >= max_failures`
    pub locked_until: Option<DateTime<Utc>>,
}

impl LockoutEntry {
    /// Create an entry for the first failure
    pub fn first_failure(now: DateTime<Utc>) -> Self {
        Self {
            attempts: 1,
            last_failed_at: now,
            locked_until: None,
        }
    }

    /// Record one more failure, tripping the lock at the threshold
    pub fn record_failure(&mut self, policy: &LockoutPolicy, now: DateTime<Utc>) {
        self.attempts += 1;
        self.last_failed_at = now;

        if self.attempts >= policy.max_failures {
            self.locked_until = Some(now + policy.lockout);
        }
    }

    /// Whether the identifier is currently locked
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        match self.locked_until {
            Some(locked_until) => now < locked_until,
            None => false,
        }
    }

    /// Seconds until the lock releases (0 when not locked)
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        match self.locked_until {
            Some(locked_until) if locked_until > now => {
                (locked_until - now).num_seconds().max(1) as u64
            }
            _ => 0,
        }
    }

    /// Whether this entry carries no live state and can be dropped
    ///
    /// An elapsed lock or a clear entry past its retention window is stale;
    /// both the lazy check and the periodic sweep use this.
    pub fn is_stale(&self, policy: &LockoutPolicy, now: DateTime<Utc>) -> bool {
        match self.locked_until {
            Some(locked_until) => now >= locked_until,
            None => now - self.last_failed_at > policy.retention,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> LockoutPolicy {
        LockoutPolicy::default()
    }

    #[test]
    fn test_lock_trips_exactly_at_threshold() {
        let now = Utc::now();
        let mut entry = LockoutEntry::first_failure(now);

        for _ in 0..3 {
            entry.record_failure(&policy(), now);
        }
        assert_eq!(entry.attempts, 4);
        assert!(!entry.is_locked(now));
        assert!(entry.locked_until.is_none());

        entry.record_failure(&policy(), now);
        assert_eq!(entry.attempts, 5);
        assert!(entry.is_locked(now));
    }

    #[test]
    fn test_lock_lasts_thirty_minutes() {
        let now = Utc::now();
        let mut entry = LockoutEntry::first_failure(now);
        for _ in 0..4 {
            entry.record_failure(&policy(), now);
        }

        assert!(entry.is_locked(now + Duration::minutes(29)));
        assert!(!entry.is_locked(now + Duration::minutes(30)));
        assert!(entry.is_stale(&policy(), now + Duration::minutes(30)));
    }

    #[test]
    fn test_retry_after_counts_down() {
        let now = Utc::now();
        let mut entry = LockoutEntry::first_failure(now);
        for _ in 0..4 {
            entry.record_failure(&policy(), now);
        }

        assert_eq!(entry.retry_after_secs(now), 30 * 60);
        assert_eq!(entry.retry_after_secs(now + Duration::minutes(29)), 60);
        assert_eq!(entry.retry_after_secs(now + Duration::minutes(31)), 0);
    }

    #[test]
    fn test_clear_entry_goes_stale_after_retention() {
        let now = Utc::now();
        let entry = LockoutEntry::first_failure(now);

        assert!(!entry.is_stale(&policy(), now + Duration::minutes(29)));
        assert!(entry.is_stale(&policy(), now + Duration::minutes(31)));
    }
}
