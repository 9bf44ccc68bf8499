//! Nonce generation
//!
//! Nonces are millisecond timestamps. Two actions signed by the same client in
//! the same millisecond would otherwise collide, so the source never hands out
//! a value less than or equal to the previous one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Strictly increasing millisecond nonces
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicU64,
}

impl NonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// `max(now, previous + 1)`
    ///
    /// Fails once an observed nonce has reached `u64::MAX`, since no larger
    /// value exists.
    pub fn next(&self) -> Result<u64> {
        self.next_at(now_millis())
    }

    fn next_at(&self, now: u64) -> Result<u64> {
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let following = last.checked_add(1).ok_or_else(|| {
                Error::InvalidParameter("Nonce space exhausted after u64::MAX".to_string())
            })?;
            let next = now.max(following);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return Ok(next),
                Err(actual) => last = actual,
            }
        }
    }

    /// Record an externally chosen nonce so later generated ones stay above it
    pub fn observe(&self, nonce: u64) {
        self.last.fetch_max(nonce, Ordering::AcqRel);
    }
}
