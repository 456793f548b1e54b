use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Time source for the limiter. Injected so tests can move the window
/// forward without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct AttemptRecord {
    count: u32,
    first_attempt_at: DateTime<Utc>,
}

/// Sliding-window attempt counter keyed by client identifier.
///
/// Process-local and best-effort: restarts, horizontal scaling, and spoofed
/// forwarding headers all reset or bypass it. Callers must not treat a
/// non-limited result as a security guarantee.
pub struct AttemptLimiter {
    window: Duration,
    max_attempts: u32,
    records: Mutex<HashMap<String, AttemptRecord>>,
    clock: Box<dyn Clock>,
}

impl AttemptLimiter {
    pub fn new(window_secs: i64, max_attempts: u32) -> Self {
        Self::with_clock(window_secs, max_attempts, Box::new(SystemClock))
    }

    pub fn with_clock(window_secs: i64, max_attempts: u32, clock: Box<dyn Clock>) -> Self {
        Self {
            window: Duration::seconds(window_secs),
            max_attempts,
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// True iff `key` has reached the attempt limit inside the current
    /// window. A record older than the window counts as nonexistent.
    pub fn is_limited(&self, key: &str) -> bool {
        let records = self.records.lock().expect("limiter lock poisoned");
        match records.get(key) {
            Some(record) => {
                self.clock.now() - record.first_attempt_at < self.window
                    && record.count >= self.max_attempts
            }
            None => false,
        }
    }

    /// Record the outcome of an attempt. Success wipes the record entirely;
    /// failure starts or extends the window count.
    pub fn record_attempt(&self, key: &str, succeeded: bool) {
        let mut records = self.records.lock().expect("limiter lock poisoned");
        if succeeded {
            records.remove(key);
            return;
        }

        let now = self.clock.now();
        match records.get_mut(key) {
            Some(record) if now - record.first_attempt_at < self.window => {
                record.count += 1;
            }
            _ => {
                // No record, or the window elapsed: start fresh
                records.insert(
                    key.to_string(),
                    AttemptRecord {
                        count: 1,
                        first_attempt_at: now,
                    },
                );
            }
        }
    }
}
