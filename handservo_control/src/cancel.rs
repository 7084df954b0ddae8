//! Level-triggered stop signal for the sweep worker.
//!
//! A `StopToken` is created for each sweep and moved into the worker at
//! spawn time. Once stop is requested it stays requested; the next sweep
//! gets a fresh token. Waiting on the token doubles as the inter-step
//! sleep, so a stop request wakes the worker immediately instead of after
//! the remaining step delay.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct StopInner {
    requested: Mutex<bool>,
    cvar: Condvar,
}

/// Shared, level-triggered stop request.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    inner: Arc<StopInner>,
}

impl StopToken {
    /// Create a token with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request stop and wake any waiter. Idempotent.
    pub fn request_stop(&self) {
        let mut requested = self.inner.requested.lock();
        *requested = true;
        self.inner.cvar.notify_all();
    }

    /// True once stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        *self.inner.requested.lock()
    }

    /// Sleep for `timeout` unless stop is requested first.
    ///
    /// Returns `true` if stop was requested (before or during the wait).
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut requested = self.inner.requested.lock();
        while !*requested {
            if self.inner.cvar.wait_until(&mut requested, deadline).timed_out() {
                break;
            }
        }
        *requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn new_token_not_requested() {
        let token = StopToken::new();
        assert!(!token.is_stop_requested());
    }

    #[test]
    fn request_is_sticky_and_shared() {
        let token = StopToken::new();
        let clone = token.clone();
        clone.request_stop();
        clone.request_stop();
        assert!(token.is_stop_requested());
        assert!(token.wait_timeout(Duration::from_secs(5)));
    }

    #[test]
    fn wait_times_out_without_request() {
        let token = StopToken::new();
        let start = Instant::now();
        assert!(!token.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn request_wakes_waiter_early() {
        let token = StopToken::new();
        let waiter = token.clone();
        let handle = thread::spawn(move || {
            let start = Instant::now();
            let stopped = waiter.wait_timeout(Duration::from_secs(10));
            (stopped, start.elapsed())
        });

        thread::sleep(Duration::from_millis(20));
        token.request_stop();

        let (stopped, waited) = handle.join().unwrap();
        assert!(stopped);
        assert!(waited < Duration::from_secs(5));
    }
}
