//! Process-wide upstream rate-limit signal.
//!
//! When GitHub tells us to back off (429, or 403 with an exhausted quota or
//! a `retry-after`), the deadline is recorded in a [`RateLimitSignal`]
//! shared by every concurrent search in the process. An artifact fetch waits
//! out a backoff that ends within a configured cap; a longer backoff skips
//! the fetch.
//!
//! The deadline is a single `AtomicU64` of epoch milliseconds, raised with
//! `fetch_max` so concurrent observers can only ever extend it.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Backoff applied when the upstream signals a limit without saying for how long.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(60);

/// Shared "blocked until" deadline for upstream requests.
#[derive(Debug, Default)]
pub struct RateLimitSignal {
    blocked_until_ms: AtomicU64,
}

impl RateLimitSignal {
    /// A signal with no active backoff.
    pub const fn new() -> Self {
        Self {
            blocked_until_ms: AtomicU64::new(0),
        }
    }

    /// Extend the backoff to at least `wait` from now.
    pub fn raise_for(&self, wait: Duration) {
        let wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
        let until = now_ms().saturating_add(wait_ms);
        self.blocked_until_ms.fetch_max(until, Ordering::AcqRel);
    }

    /// Time left on the active backoff, or `None` if requests may proceed.
    pub fn remaining(&self) -> Option<Duration> {
        let until = self.blocked_until_ms.load(Ordering::Acquire);
        let now = now_ms();
        (until > now).then(|| Duration::from_millis(until - now))
    }

    /// Returns `true` while a backoff is active.
    pub fn is_limited(&self) -> bool {
        self.remaining().is_some()
    }

    /// Sleep out the backoff, but only if it ends within `cap`.
    ///
    /// Returns `true` once requests may proceed. Returns `false` at once,
    /// without sleeping, when the backoff outlasts `cap`.
    pub async fn wait_out(&self, cap: Duration) -> bool {
        let Some(remaining) = self.remaining() else {
            return true;
        };
        if remaining > cap {
            return false;
        }
        tracing::debug!(
            wait_ms = remaining.as_millis() as u64,
            "waiting out upstream rate limit"
        );
        tokio::time::sleep(remaining).await;
        true
    }
}

static GLOBAL_SIGNAL: OnceLock<Arc<RateLimitSignal>> = OnceLock::new();

/// The signal shared by every [`crate::GitHubHost`] that is not given its own.
pub fn global_signal() -> Arc<RateLimitSignal> {
    Arc::clone(GLOBAL_SIGNAL.get_or_init(|| Arc::new(RateLimitSignal::new())))
}

/// Work out how long to back off from an upstream response, if at all.
///
/// A response is treated as rate limited when it is a 429, or a 403 that
/// either reports `x-ratelimit-remaining: 0` or carries `retry-after`.
/// `retry-after` (seconds) wins over `x-ratelimit-reset` (epoch seconds);
/// with neither, [`DEFAULT_BACKOFF`] applies.
pub fn backoff_from_headers(status: StatusCode, headers: &HeaderMap) -> Option<Duration> {
    let retry_after = header_u64(headers, "retry-after");
    let quota_exhausted = header_u64(headers, "x-ratelimit-remaining") == Some(0);

    let limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && (quota_exhausted || retry_after.is_some()));
    if !limited {
        return None;
    }

    if let Some(secs) = retry_after {
        return Some(Duration::from_secs(secs));
    }
    if let Some(reset_epoch_secs) = header_u64(headers, "x-ratelimit-reset") {
        let reset_ms = reset_epoch_secs.saturating_mul(1000);
        return Some(Duration::from_millis(reset_ms.saturating_sub(now_ms())));
    }
    Some(DEFAULT_BACKOFF)
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
