//! Client limiter store
//!
//! Tracks a dual fixed-window token budget per client identity: one window
//! one second wide, one a minute wide. A request is admitted only when both
//! windows still hold a token. Windows reset lazily on access instead of via
//! per-client timers, so memory stays O(1) per client and no timer wheel is
//! needed. Idle entries are reclaimed by a periodic eviction pass.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;

use crate::clock::Clock;
use crate::config::LimiterConfig;

const SECOND_WINDOW: Duration = Duration::from_secs(1);
const MINUTE_WINDOW: Duration = Duration::from_secs(60);

/// Per-client token accounting
struct ClientEntry {
    second_tokens: u32,
    minute_tokens: u32,
    window_start_second: SystemTime,
    window_start_minute: SystemTime,
    last_access: SystemTime,
}

impl ClientEntry {
    fn fresh(second_tokens: u32, minute_tokens: u32, now: SystemTime) -> Self {
        Self {
            second_tokens,
            minute_tokens,
            window_start_second: now,
            window_start_minute: now,
            last_access: now,
        }
    }
}

/// Concurrent mapping from client identity to limiter state.
///
/// A single mutex over the map keeps the check-and-consume step linearizable
/// per identity. Critical sections are a lookup plus a few integer updates,
/// so contention between unrelated identities stays bounded.
pub struct ClientLimiterStore {
    clients: Mutex<HashMap<String, ClientEntry>>,
    second_tokens: u32,
    minute_tokens: u32,
    idle_timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl ClientLimiterStore {
    pub fn new(config: &LimiterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            second_tokens: config.second_tokens,
            minute_tokens: config.minute_tokens,
            idle_timeout: config.idle_timeout(),
            clock,
        }
    }

    /// Checks whether a request from `identity` is admitted, consuming one
    /// token from each window when it is.
    ///
    /// A never-seen identity gets a fresh entry with full allotments. For an
    /// existing entry each window resets independently once its own width has
    /// elapsed. `last_access` is updated on every call, allowed or not.
    pub fn allow(&self, identity: &str) -> bool {
        let now = self.clock.now();
        let mut clients = self.clients.lock();

        let entry = clients
            .entry(identity.to_string())
            .and_modify(|entry| {
                entry.last_access = now;

                if elapsed(entry.window_start_second, now) >= SECOND_WINDOW {
                    entry.second_tokens = self.second_tokens;
                    entry.window_start_second = now;
                }

                if elapsed(entry.window_start_minute, now) >= MINUTE_WINDOW {
                    entry.minute_tokens = self.minute_tokens;
                    entry.window_start_minute = now;
                }
            })
            .or_insert_with(|| ClientEntry::fresh(self.second_tokens, self.minute_tokens, now));

        if entry.second_tokens > 0 && entry.minute_tokens > 0 {
            entry.second_tokens -= 1;
            entry.minute_tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Removes entries idle longer than the inactivity threshold, returning
    /// how many were dropped. An evicted identity that comes back is treated
    /// as never seen.
    pub fn evict_idle(&self) -> usize {
        let now = self.clock.now();
        let mut clients = self.clients.lock();

        let before = clients.len();
        clients.retain(|_, entry| elapsed(entry.last_access, now) <= self.idle_timeout);
        before - clients.len()
    }

    /// Number of tracked identities.
    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// SystemTime is not monotonic; treat a backwards step as no elapsed time so
// token counts never reset early or go negative.
fn elapsed(since: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(since).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn test_store(clock: Arc<ManualClock>) -> ClientLimiterStore {
        ClientLimiterStore::new(&LimiterConfig::default(), clock)
    }

    #[test]
    fn first_request_is_allowed() {
        let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
        let store = test_store(clock);

        assert!(store.allow("203.0.113.5"));
    }

    #[test]
    fn second_request_within_same_second_is_rejected() {
        let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
        let store = test_store(clock);

        assert!(store.allow("203.0.113.5"));
        assert!(!store.allow("203.0.113.5"));
        assert!(!store.allow("203.0.113.5"));
    }

    #[test]
    fn second_window_resets_after_one_second() {
        let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
        let store = test_store(Arc::clone(&clock));

        assert!(store.allow("203.0.113.5"));
        assert!(!store.allow("203.0.113.5"));

        clock.advance(Duration::from_secs(1));
        assert!(store.allow("203.0.113.5"));
    }

    #[test]
    fn minute_budget_rejects_eleventh_request() {
        let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
        let store = test_store(Arc::clone(&clock));

        // One request per second so the second window never rejects.
        for _ in 0..10 {
            assert!(store.allow("203.0.113.5"));
            clock.advance(Duration::from_secs(1));
        }

        // Ten seconds in: second window is fresh, minute budget is spent.
        assert!(!store.allow("203.0.113.5"));
    }

    #[test]
    fn minute_budget_restores_after_window_rolls_over() {
        let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
        let store = test_store(Arc::clone(&clock));

        for _ in 0..10 {
            assert!(store.allow("203.0.113.5"));
            clock.advance(Duration::from_secs(1));
        }
        assert!(!store.allow("203.0.113.5"));

        // Jump past the minute boundary; the full allotment comes back.
        clock.advance(Duration::from_secs(60));
        for _ in 0..10 {
            assert!(store.allow("203.0.113.5"));
            clock.advance(Duration::from_secs(1));
        }
    }

    #[test]
    fn rejected_requests_consume_no_tokens() {
        let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
        let config = LimiterConfig {
            second_tokens: 5,
            minute_tokens: 1,
            ..LimiterConfig::default()
        };
        let store = ClientLimiterStore::new(&config, Arc::clone(&clock) as Arc<dyn Clock>);

        assert!(store.allow("203.0.113.5"));
        // Minute budget exhausted; repeated rejections must not drive the
        // count negative or touch the second budget.
        assert!(!store.allow("203.0.113.5"));
        assert!(!store.allow("203.0.113.5"));

        clock.advance(Duration::from_secs(60));
        assert!(store.allow("203.0.113.5"));
    }

    #[test]
    fn identities_are_tracked_independently() {
        let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
        let store = test_store(clock);

        assert!(store.allow("203.0.113.5"));
        assert!(!store.allow("203.0.113.5"));
        assert!(store.allow("198.51.100.7"));
    }

    #[test]
    fn eviction_drops_idle_entries_only() {
        let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
        let store = test_store(Arc::clone(&clock));

        assert!(store.allow("idle-client"));
        clock.advance(Duration::from_secs(10 * 60 + 1));
        assert!(store.allow("active-client"));
        assert_eq!(store.len(), 2);

        assert_eq!(store.evict_idle(), 1);
        assert_eq!(store.len(), 1);

        // Recreation after eviction behaves like a first observation.
        assert!(store.allow("idle-client"));
    }

    #[test]
    fn eviction_keeps_entries_at_exactly_the_threshold() {
        let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
        let store = test_store(Arc::clone(&clock));

        assert!(store.allow("203.0.113.5"));
        clock.advance(Duration::from_secs(10 * 60));

        assert_eq!(store.evict_idle(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn concurrent_calls_never_overspend() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
        let config = LimiterConfig {
            second_tokens: 3,
            minute_tokens: 10,
            ..LimiterConfig::default()
        };
        let store = Arc::new(ClientLimiterStore::new(&config, clock));
        let admitted = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..4 {
                        if store.allow("shared-identity") {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        // The clock never moves, so exactly the initial second-window
        // allotment may be spent across all threads.
        assert_eq!(admitted.load(Ordering::SeqCst), 3);
    }
}
