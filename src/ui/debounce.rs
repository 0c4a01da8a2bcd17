use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

/// Delay applied to the admin user search box.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Debouncer
///
/// Trailing-edge debounce over a generation counter. Every call waits out the
/// delay; only the newest call still current at that point runs its work. It is a
/// timer, not a lock: work that already started is never cancelled.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns `None` when a newer call superseded this one during the delay.
    pub async fn call<F, Fut>(&self, work: F) -> Option<Fut::Output>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::trace!(ticket, "Debounced call superseded");
            return None;
        }
        Some(work().await)
    }
}
