//! Per-user hourly notification ceiling.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use genera_core::types::{DbId, Timestamp};

/// Rolling one-hour window per user, held in process memory.
///
/// The ceiling is per process; several engine instances each enforce it
/// independently.
#[derive(Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<DbId, VecDeque<Timestamp>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a delivery for `user_id` at `now` if fewer than `max_per_hour`
    /// happened in the preceding hour. Returns `false` when over the ceiling.
    pub fn try_acquire(&self, user_id: DbId, max_per_hour: u32, now: Timestamp) -> bool {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let window = windows.entry(user_id).or_default();

        let cutoff = now - chrono::Duration::hours(1);
        while window.front().is_some_and(|t| *t <= cutoff) {
            window.pop_front();
        }

        if window.len() >= max_per_hour as usize {
            return false;
        }
        window.push_back(now);
        true
    }

    /// Give back a slot taken by [`try_acquire`](Self::try_acquire) at `at`
    /// when the delivery it was reserved for did not happen.
    pub fn release(&self, user_id: DbId, at: Timestamp) {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(window) = windows.get_mut(&user_id) {
            if let Some(pos) = window.iter().rposition(|t| *t == at) {
                window.remove(pos);
            }
        }
    }

    /// Deliveries recorded for the user within the hour before `now`.
    pub fn recent_count(&self, user_id: DbId, now: Timestamp) -> usize {
        let windows = self
            .windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cutoff = now - chrono::Duration::hours(1);
        windows
            .get(&user_id)
            .map_or(0, |w| w.iter().filter(|t| **t > cutoff).count())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn at(minute: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 16, 10, 0, 0).unwrap() + Duration::minutes(minute)
    }

    #[test]
    fn allows_up_to_ceiling() {
        let limiter = RateLimiter::new();
        let allowed = (0..5).filter(|i| limiter.try_acquire(1, 3, at(*i))).count();
        assert_eq!(allowed, 3);
        assert_eq!(limiter.recent_count(1, at(5)), 3);
    }

    #[test]
    fn released_slot_is_reusable() {
        let limiter = RateLimiter::new();
        assert!(limiter.try_acquire(1, 1, at(0)));
        limiter.release(1, at(0));
        assert_eq!(limiter.recent_count(1, at(1)), 0);
        assert!(limiter.try_acquire(1, 1, at(1)));
    }

    #[test]
    fn releasing_unknown_slot_is_a_no_op() {
        let limiter = RateLimiter::new();
        assert!(limiter.try_acquire(1, 2, at(0)));
        limiter.release(1, at(5));
        limiter.release(2, at(0));
        assert_eq!(limiter.recent_count(1, at(6)), 1);
    }

    #[test]
    fn window_rolls_after_an_hour() {
        let limiter = RateLimiter::new();
        assert!(limiter.try_acquire(1, 1, at(0)));
        assert!(!limiter.try_acquire(1, 1, at(59)));
        assert!(limiter.try_acquire(1, 1, at(60)));
    }

    #[test]
    fn users_are_independent() {
        let limiter = RateLimiter::new();
        assert!(limiter.try_acquire(1, 1, at(0)));
        assert!(limiter.try_acquire(2, 1, at(0)));
    }

    #[test]
    fn zero_ceiling_blocks_everything() {
        let limiter = RateLimiter::new();
        assert!(!limiter.try_acquire(1, 0, at(0)));
    }
}
