#![forbid(unsafe_code)]

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Admission gate bounding simultaneously in-flight uploads.
///
/// Tasks beyond the ceiling queue in submission order (the underlying
/// semaphore is FIFO-fair) and start as soon as a slot frees. No priority
/// handling; task cost is roughly uniform.
#[derive(Clone, Debug)]
pub struct UploadGate {
    permits: Arc<Semaphore>,
    ceiling: usize,
}

impl UploadGate {
    pub fn new(ceiling: usize) -> Self {
        let ceiling = ceiling.max(1);
        Self {
            permits: Arc::new(Semaphore::new(ceiling)),
            ceiling,
        }
    }

    /// Waits for a free slot and returns its permit. The slot frees when the
    /// permit drops.
    ///
    /// # Panics
    ///
    /// Panics if the gate's semaphore was closed, which this type never does.
    pub async fn admit(&self) -> OwnedSemaphorePermit {
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .expect("gate semaphore closed")
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::*;

    #[tokio::test]
    async fn admits_up_to_ceiling_concurrently() {
        let gate = UploadGate::new(3);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..12 {
            let gate = gate.clone();
            let in_flight = Arc::clone(&in_flight);
            let high_water = Arc::clone(&high_water);
            handles.push(tokio::spawn(async move {
                let _permit = gate.admit().await;
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                high_water.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let peak = high_water.load(Ordering::SeqCst);
        assert!(peak <= 3, "observed {peak} uploads in flight");
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_ceiling_is_clamped_to_one() {
        let gate = UploadGate::new(0);
        assert_eq!(gate.ceiling(), 1);
        let _permit = gate.admit().await;
    }
}
