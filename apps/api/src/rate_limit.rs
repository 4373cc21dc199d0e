//! Rate limiter — sliding-window admission control with a circuit breaker,
//! bounding outbound chat-completion volume per session.
//!
//! The breaker can be tripped manually (`trip`) and clears either explicitly
//! (`reset`) or automatically once the cooldown elapses. The auto-close is a
//! deliberate change from the one-way breaker in earlier revisions.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::warn;

/// Snapshot of limiter state for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LimiterStatus {
    pub is_open: bool,
    pub requests_in_window: usize,
    pub max_requests: usize,
    pub failure_count: u64,
}

pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    requests: VecDeque<Instant>,
    is_open: bool,
    opened_at: Option<Instant>,
    breaker_cooldown: Duration,
    failure_count: u64,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration, breaker_cooldown: Duration) -> Self {
        Self {
            max_requests,
            window,
            requests: VecDeque::new(),
            is_open: false,
            opened_at: None,
            breaker_cooldown,
            failure_count: 0,
        }
    }

    /// Checks whether a request is admitted, recording it if so.
    ///
    /// Invariant: after this returns, the window holds no timestamp older
    /// than the window length.
    pub fn is_allowed(&mut self) -> bool {
        let now = Instant::now();
        self.prune(now);

        if self.is_open {
            // Half-open: the first check after the cooldown closes the
            // breaker and falls through to normal admission.
            let cooled_down = self
                .opened_at
                .map(|t| now.duration_since(t) >= self.breaker_cooldown)
                .unwrap_or(false);
            if cooled_down {
                self.is_open = false;
                self.opened_at = None;
                warn!("circuit breaker auto-closed after cooldown");
            } else {
                warn!("circuit breaker open — denying request");
                return false;
            }
        }

        if self.requests.len() >= self.max_requests {
            self.failure_count += 1;
            warn!(
                "rate limit exceeded ({}/{} in window)",
                self.requests.len(),
                self.max_requests
            );
            return false;
        }

        self.requests.push_back(now);
        true
    }

    /// Opens the breaker: all admissions are denied until `reset` or the
    /// cooldown elapses.
    pub fn trip(&mut self) {
        self.is_open = true;
        self.opened_at = Some(Instant::now());
        warn!("circuit breaker tripped");
    }

    /// Closes the breaker immediately.
    pub fn reset(&mut self) {
        self.is_open = false;
        self.opened_at = None;
    }

    pub fn status(&self) -> LimiterStatus {
        LimiterStatus {
            is_open: self.is_open,
            requests_in_window: self.requests.len(),
            max_requests: self.max_requests,
            failure_count: self.failure_count,
        }
    }

    fn prune(&mut self, now: Instant) {
        while let Some(front) = self.requests.front() {
            if now.duration_since(*front) >= self.window {
                self.requests.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: usize) -> RateLimiter {
        RateLimiter::new(max, Duration::from_secs(60), Duration::from_secs(300))
    }

    #[test]
    fn test_admits_up_to_max_then_denies() {
        let mut rl = limiter(3);
        assert!(rl.is_allowed());
        assert!(rl.is_allowed());
        assert!(rl.is_allowed());
        assert!(!rl.is_allowed(), "fourth request in window must be denied");
        assert_eq!(rl.status().failure_count, 1);
        assert_eq!(rl.status().requests_in_window, 3);
    }

    #[test]
    fn test_denial_does_not_consume_window_slot() {
        let mut rl = limiter(1);
        assert!(rl.is_allowed());
        assert!(!rl.is_allowed());
        assert!(!rl.is_allowed());
        let status = rl.status();
        assert_eq!(status.requests_in_window, 1);
        assert_eq!(status.failure_count, 2);
    }

    #[test]
    fn test_window_prunes_old_timestamps() {
        let mut rl = RateLimiter::new(
            1,
            Duration::from_millis(20),
            Duration::from_secs(300),
        );
        assert!(rl.is_allowed());
        assert!(!rl.is_allowed());
        std::thread::sleep(Duration::from_millis(30));
        assert!(rl.is_allowed(), "old timestamp must have been pruned");
        assert_eq!(rl.status().requests_in_window, 1);
    }

    #[test]
    fn test_tripped_breaker_denies_regardless_of_window() {
        let mut rl = limiter(10);
        rl.trip();
        assert!(!rl.is_allowed());
        assert!(rl.status().is_open);
        // Breaker denial is not a window-full failure.
        assert_eq!(rl.status().failure_count, 0);
    }

    #[test]
    fn test_reset_closes_breaker() {
        let mut rl = limiter(10);
        rl.trip();
        assert!(!rl.is_allowed());
        rl.reset();
        assert!(rl.is_allowed());
        assert!(!rl.status().is_open);
    }

    #[test]
    fn test_breaker_auto_closes_after_cooldown() {
        let mut rl = RateLimiter::new(
            10,
            Duration::from_secs(60),
            Duration::from_millis(20),
        );
        rl.trip();
        assert!(!rl.is_allowed());
        std::thread::sleep(Duration::from_millis(30));
        assert!(rl.is_allowed(), "breaker must half-open after cooldown");
        assert!(!rl.status().is_open);
    }
}
