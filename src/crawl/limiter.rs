// src/crawl/limiter.rs
// =============================================================================
// Caps how many fetches are in flight across the whole crawl.
//
// A tokio Semaphore with N permits does the counting. acquire() hands back
// a Slot that owns its permit; dropping the Slot returns the permit. That
// makes "release exactly once per successful acquire" a property of the
// type system instead of a calling convention.
//
// The bound is independent of depth and fan-out: a page with 500 links
// spawns 500 tasks, but at most N of them are past acquire() at once.
// Capacities above Semaphore::MAX_PERMITS are clamped to it.
// =============================================================================

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Returned when a slot wait is aborted by cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    permits: Arc<Semaphore>,
    capacity: usize,
}

// Permission to have one fetch in flight
#[derive(Debug)]
pub struct Slot {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(Semaphore::MAX_PERMITS);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free slot, or gives up as soon as `cancel` fires.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<Slot, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Cancelled),
            permit = self.permits.clone().acquire_owned() => match permit {
                Ok(permit) => Ok(Slot { _permit: permit }),
                // Only happens if the semaphore is closed, which we never do
                Err(_) => Err(Cancelled),
            },
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held
    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why acquire_owned() instead of acquire()?
//    - acquire() returns a permit that borrows the semaphore
//    - acquire_owned() needs an Arc<Semaphore> and returns a permit with no
//      lifetime, so a Slot can move freely between tasks
//
// 2. How is a slot released?
//    - There is no release() method at all
//    - OwnedSemaphorePermit gives its permit back in Drop
//    - Returning early, hitting `?` or panicking all drop the Slot, so the
//      count can never leak (this is RAII)
//
// 3. What does `biased;` do in select!?
//    - Branches are polled top to bottom instead of randomly
//    - Cancellation is checked first, so a cancelled crawl never takes a
//      slot even when one is free
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_capacity_is_enforced() {
        let limiter = ConcurrencyLimiter::new(2);
        let cancel = CancellationToken::new();

        let a = limiter.acquire(&cancel).await.unwrap();
        let _b = limiter.acquire(&cancel).await.unwrap();
        assert_eq!(limiter.in_flight(), 2);

        // Third caller has to wait
        let third = timeout(Duration::from_millis(50), limiter.acquire(&cancel)).await;
        assert!(third.is_err());

        drop(a);
        assert_eq!(limiter.in_flight(), 1);

        let third = timeout(Duration::from_millis(50), limiter.acquire(&cancel)).await;
        assert!(matches!(third, Ok(Ok(_))));
    }

    #[tokio::test]
    async fn test_dropping_slots_drains_to_zero() {
        let limiter = ConcurrencyLimiter::new(3);
        let cancel = CancellationToken::new();

        let mut held = Vec::new();
        for _ in 0..3 {
            held.push(limiter.acquire(&cancel).await.unwrap());
        }
        assert_eq!(limiter.in_flight(), 3);

        held.clear();
        assert_eq!(limiter.in_flight(), 0);
        assert_eq!(limiter.capacity(), 3);
    }

    #[tokio::test]
    async fn test_cancel_aborts_waiting_acquire() {
        let limiter = ConcurrencyLimiter::new(1);
        let cancel = CancellationToken::new();
        let _held = limiter.acquire(&cancel).await.unwrap();

        let waiter = {
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { limiter.acquire(&cancel).await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let result = timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert_eq!(result, Err(Cancelled));
        assert_eq!(limiter.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_acquire_after_cancel_fails_even_with_free_slots() {
        let limiter = ConcurrencyLimiter::new(4);
        let cancel = CancellationToken::new();
        cancel.cancel();
        cancel.cancel();

        assert_eq!(limiter.acquire(&cancel).await.unwrap_err(), Cancelled);
        assert_eq!(limiter.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_oversized_capacity_is_clamped() {
        let limiter = ConcurrencyLimiter::new(usize::MAX);
        assert_eq!(limiter.capacity(), Semaphore::MAX_PERMITS);

        let cancel = CancellationToken::new();
        let _slot = limiter.acquire(&cancel).await.unwrap();
        assert_eq!(limiter.in_flight(), 1);
    }
}
