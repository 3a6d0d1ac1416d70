//! Per-domain request pacing and in-flight accounting
//!
//! The concurrency bound itself lives in the domain crawler, which never has
//! more than `concurrency` fetch tasks alive. This module adds the two other
//! pieces:
//! - `RequestPacer`: a minimum delay between the starts of consecutive requests
//! - `InFlightGauge`: current and peak number of fetches on the wire

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces request starts to one domain by at least `delay`
///
/// Each caller reserves the next free slot under a short lock, then sleeps
/// until that slot without holding the lock. Slots are handed out in call
/// order.
#[derive(Debug)]
pub struct RequestPacer {
    delay: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until this caller may start its request
    ///
    /// # Returns
    ///
    /// The instant the request was allowed to start
    pub async fn wait_turn(&self) -> Instant {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            *next = Some(slot + self.delay);
            slot
        };

        tokio::time::sleep_until(slot).await;
        slot
    }
}

/// Counts fetches currently on the wire and remembers the peak
#[derive(Debug, Default)]
pub struct InFlightGauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightGauge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Marks one fetch as started; it ends when the guard drops
    pub fn enter(self: &Arc<Self>) -> InFlightGuard {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(Arc::clone(self))
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Held for the duration of one fetch
#[derive(Debug)]
pub struct InFlightGuard(Arc<InFlightGauge>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}
