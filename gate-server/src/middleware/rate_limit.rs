//! Per-client rate limiting
//!
//! Sliding window of request timestamps per identity. The limiter keeps
//! its own state and lock, separate from the suspicion store; either one
//! can deny a request, and the limiter always runs first.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;

use honeygate_core::ClientIdentity;

use super::identity::ClientContext;
use crate::AppError;

/// Outcome of a quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after: Duration },
}

/// Sliding window rate limiter keyed by client identity.
pub struct RateLimiter {
    /// Maximum requests per window (0 disables the limiter)
    limit: u32,

    /// Window duration
    window: Duration,

    /// Request timestamps within the current window, per client
    clients: Mutex<HashMap<ClientIdentity, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check and, when allowed, consume one request for the client.
    pub fn check(&self, identity: &ClientIdentity) -> RateDecision {
        self.check_at(identity, Instant::now())
    }

    fn check_at(&self, identity: &ClientIdentity, now: Instant) -> RateDecision {
        if self.limit == 0 {
            return RateDecision::Allowed;
        }

        let mut clients = self.clients.lock();
        let timestamps = clients.entry(identity.clone()).or_default();

        while let Some(front) = timestamps.front() {
            if now.duration_since(*front) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() < self.limit as usize {
            timestamps.push_back(now);
            return RateDecision::Allowed;
        }

        // Wait until the oldest request expires
        let retry_after = timestamps
            .front()
            .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
            .unwrap_or(self.window);

        RateDecision::Limited { retry_after }
    }

    /// Drop clients with no requests left in the window.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let mut clients = self.clients.lock();
        let before = clients.len();
        clients.retain(|_, timestamps| {
            timestamps
                .back()
                .is_some_and(|newest| now.duration_since(*newest) < self.window)
        });
        before - clients.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().len()
    }
}

/// Middleware: enforce the limiter for the resolved client
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    client: ClientContext,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match limiter.check(&client.identity) {
        RateDecision::Allowed => Ok(next.run(req).await),
        RateDecision::Limited { retry_after } => {
            tracing::warn!(
                "Rate limit exceeded for {} on {} ({} per {:?})",
                client.identity,
                req.uri().path(),
                limiter.limit(),
                limiter.window()
            );
            // Round up so clients never retry early
            let retry_after_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            Err(AppError::RateLimited { retry_after_secs: retry_after_secs.max(1) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = RateLimiter::per_minute(5);
        let id = ClientIdentity::from("1.2.3.4");
        let now = Instant::now();

        for _ in 0..5 {
            assert_eq!(limiter.check_at(&id, now), RateDecision::Allowed);
        }
        assert!(matches!(limiter.check_at(&id, now), RateDecision::Limited { .. }));
    }

    #[test]
    fn test_window_slides() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        let id = ClientIdentity::from("1.2.3.4");
        let start = Instant::now();

        assert_eq!(limiter.check_at(&id, start), RateDecision::Allowed);
        assert_eq!(limiter.check_at(&id, start + Duration::from_secs(4)), RateDecision::Allowed);
        assert_eq!(
            limiter.check_at(&id, start + Duration::from_secs(6)),
            RateDecision::Limited { retry_after: Duration::from_secs(4) }
        );
        assert_eq!(limiter.check_at(&id, start + Duration::from_secs(10)), RateDecision::Allowed);
    }

    #[test]
    fn test_limited_requests_do_not_extend_window() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let id = ClientIdentity::from("1.2.3.4");
        let start = Instant::now();

        assert_eq!(limiter.check_at(&id, start), RateDecision::Allowed);
        for s in 1..10 {
            assert!(matches!(
                limiter.check_at(&id, start + Duration::from_secs(s)),
                RateDecision::Limited { .. }
            ));
        }
        assert_eq!(limiter.check_at(&id, start + Duration::from_secs(10)), RateDecision::Allowed);
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::per_minute(1);
        let now = Instant::now();

        assert_eq!(limiter.check_at(&"a".into(), now), RateDecision::Allowed);
        assert_eq!(limiter.check_at(&"b".into(), now), RateDecision::Allowed);
        assert!(matches!(limiter.check_at(&"a".into(), now), RateDecision::Limited { .. }));
    }

    #[test]
    fn test_zero_limit_disables() {
        let limiter = RateLimiter::per_minute(0);
        for _ in 0..100 {
            assert_eq!(limiter.check(&"a".into()), RateDecision::Allowed);
        }
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn test_sweep_drops_idle_clients() {
        let limiter = RateLimiter::new(3, Duration::from_secs(10));
        let start = Instant::now();

        limiter.check_at(&"old".into(), start);
        limiter.check_at(&"new".into(), start + Duration::from_secs(8));

        assert_eq!(limiter.sweep_at(start + Duration::from_secs(12)), 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
