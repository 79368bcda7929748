// src/services/rate_limit.rs
//! Per-client-IP sliding counter guarding the login endpoint

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const MAX_ATTEMPTS: u32 = 5;
const WINDOW: Duration = Duration::from_secs(60);

// Hard cap on tracked IPs. Sustained random-IP traffic evicts the oldest
// window instead of growing the table without bound.
const MAX_TRACKED_IPS: usize = 10_000;

#[derive(Debug, Clone)]
struct AttemptWindow {
    attempts: u32,
    window_start: Instant,
}

impl AttemptWindow {
    fn new() -> Self {
        Self {
            attempts: 1,
            window_start: Instant::now(),
        }
    }

    fn is_expired(&self, window: Duration) -> bool {
        self.window_start.elapsed() > window
    }
}

#[derive(Debug)]
pub enum LoginRateLimit {
    Allowed,
    Limited { retry_after: u64 },
}

/// Injectable login rate limiter
///
/// Constructed once per process and handed to handlers through `AppState`;
/// there is no hidden process-wide table. The map is bounded: expired
/// entries are evicted opportunistically and a capacity cap evicts the
/// oldest window when full.
#[derive(Debug)]
pub struct LoginRateLimiter {
    attempts: RwLock<HashMap<String, AttemptWindow>>,
    max_attempts: u32,
    window: Duration,
    capacity: usize,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self::with_limits(MAX_ATTEMPTS, WINDOW, MAX_TRACKED_IPS)
    }

    pub fn with_limits(max_attempts: u32, window: Duration, capacity: usize) -> Self {
        info!(
            max_attempts,
            window_seconds = window.as_secs(),
            capacity,
            "Initializing login rate limiter"
        );
        Self {
            attempts: RwLock::new(HashMap::new()),
            max_attempts,
            window,
            capacity,
        }
    }

    /// Check and record one login attempt from `client_ip`
    ///
    /// First attempt from an IP creates a fresh window; an elapsed window
    /// resets it; at or over the attempt limit the call is rejected with the
    /// seconds remaining in the window; otherwise the counter increments.
    pub async fn check(&self, client_ip: &str) -> LoginRateLimit {
        let mut attempts = self.attempts.write().await;

        match attempts.get_mut(client_ip) {
            Some(state) => {
                if state.is_expired(self.window) {
                    *state = AttemptWindow::new();
                    return LoginRateLimit::Allowed;
                }
                if state.attempts >= self.max_attempts {
                    let elapsed = state.window_start.elapsed().as_secs();
                    let retry_after = self.window.as_secs().saturating_sub(elapsed);
                    warn!(client_ip = %client_ip, retry_after, "Login rate limit exceeded");
                    return LoginRateLimit::Limited { retry_after };
                }
                state.attempts += 1;
                LoginRateLimit::Allowed
            }
            None => {
                if attempts.len() >= self.capacity {
                    Self::evict(&mut attempts, self.window, self.capacity);
                }
                attempts.insert(client_ip.to_string(), AttemptWindow::new());
                LoginRateLimit::Allowed
            }
        }
    }

    /// Record an extra hit after a failed password verification
    ///
    /// Combined with the hit already recorded by `check`, a failed login
    /// counts twice against the window. Preserved current behavior; see
    /// DESIGN.md before changing.
    pub async fn record_failure(&self, client_ip: &str) {
        let mut attempts = self.attempts.write().await;
        match attempts.get_mut(client_ip) {
            Some(state) => state.attempts += 1,
            None => {
                attempts.insert(client_ip.to_string(), AttemptWindow::new());
            }
        }
    }

    /// Forget an IP after a successful login
    pub async fn clear(&self, client_ip: &str) {
        let mut attempts = self.attempts.write().await;
        if attempts.remove(client_ip).is_some() {
            debug!(client_ip = %client_ip, "Cleared login attempts after success");
        }
    }

    fn evict(attempts: &mut HashMap<String, AttemptWindow>, window: Duration, capacity: usize) {
        attempts.retain(|_, state| !state.is_expired(window));

        // Still full after dropping expired windows: drop the oldest one
        if attempts.len() >= capacity {
            if let Some(oldest) = attempts
                .iter()
                .min_by_key(|(_, state)| state.window_start)
                .map(|(ip, _)| ip.clone())
            {
                attempts.remove(&oldest);
            }
        }
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
