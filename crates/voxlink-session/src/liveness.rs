use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{duration_millis, Clock};

/// Shared last-incoming timestamp of one engine.
///
/// The engine's receive path is the only writer. Clones can be handed to
/// other threads to poll [`is_timeout`](Self::is_timeout) without touching
/// the engine itself.
#[derive(Clone)]
pub struct Liveness {
    inner: Arc<Inner>,
}

struct Inner {
    clock: Arc<dyn Clock>,
    threshold: Duration,
    last_incoming_ms: AtomicU64,
}

impl Liveness {
    /// Create a probe that counts from the clock's current reading.
    pub fn new(clock: Arc<dyn Clock>, threshold: Duration) -> Self {
        let now = duration_millis(clock.now());
        Self {
            inner: Arc::new(Inner {
                clock,
                threshold,
                last_incoming_ms: AtomicU64::new(now),
            }),
        }
    }

    /// Record inbound activity now.
    pub fn touch(&self) {
        let now = duration_millis(self.inner.clock.now());
        self.inner.last_incoming_ms.store(now, Ordering::Release);
    }

    /// Time since the last recorded inbound activity.
    pub fn elapsed(&self) -> Duration {
        let now = duration_millis(self.inner.clock.now());
        let last = self.inner.last_incoming_ms.load(Ordering::Acquire);
        Duration::from_millis(now.saturating_sub(last))
    }

    /// True once nothing has arrived for longer than the threshold.
    pub fn is_timeout(&self) -> bool {
        self.elapsed() > self.inner.threshold
    }

    pub fn threshold(&self) -> Duration {
        self.inner.threshold
    }
}

impl fmt::Debug for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Liveness")
            .field("threshold", &self.inner.threshold)
            .field("elapsed", &self.elapsed())
            .finish()
    }
}
