//! Single-worker execution queue
//!
//! Each reset domain owns one of these to serialize recovery-triggering
//! work items (hang-detection callbacks from interrupts, scheduler
//! timeouts, manual triggers) so at most one runs at a time. It is a
//! scheduling aid for the domain's own queued work, distinct from the
//! exclusive lock that fences off the device's normal request path.

use crate::error::ResetError;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

type WorkItem = Box<dyn FnOnce() + Send + 'static>;

/// Dedicated single-worker queue backing a reset domain
pub struct ResetQueue {
    sender: Option<mpsc::Sender<WorkItem>>,
    worker: Option<thread::JoinHandle<()>>,
    pending: Arc<AtomicUsize>,
    name: String,
}

impl ResetQueue {
    /// Spawn the worker thread
    ///
    /// Fails with `ResourceExhausted` if the thread cannot be spawned;
    /// nothing is left behind on failure.
    pub fn new(name: &str) -> Result<Self, ResetError> {
        let (sender, receiver) = mpsc::channel::<WorkItem>();
        let pending = Arc::new(AtomicUsize::new(0));

        let worker_pending = Arc::clone(&pending);
        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                // Runs until the sender side is dropped, then drains
                // whatever is still buffered before exiting.
                for item in receiver {
                    item();
                    worker_pending.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .map_err(|e| {
                ResetError::ResourceExhausted(format!("failed to spawn worker {}: {}", name, e))
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            pending,
            name: name.to_string(),
        })
    }

    /// Enqueue a work item
    ///
    /// Items enqueued on one queue never run concurrently with each
    /// other. Enqueueing after shutdown is a no-op.
    pub fn queue_work<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let Some(sender) = &self.sender else {
            log::warn!("queue {}: work submitted after shutdown", self.name);
            return;
        };
        self.pending.fetch_add(1, Ordering::SeqCst);
        if sender.send(Box::new(work)).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            log::warn!("queue {}: worker is gone, dropping work item", self.name);
        }
    }

    /// Number of items enqueued but not yet finished
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Queue name (also the worker thread name)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop accepting work, drain everything already enqueued, and join
    /// the worker. Idempotent.
    fn shutdown(&mut self) {
        // Dropping the sender closes the channel; the worker finishes
        // all buffered items before its receive loop ends.
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("queue {}: worker panicked", self.name);
            }
        }
    }
}

impl Drop for ResetQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    #[test]
    fn test_queue_runs_work() {
        let queue = ResetQueue::new("test-wq").unwrap();
        let counter = Arc::new(AtomicU32::new(0));

        for _ in 0..4 {
            let c = Arc::clone(&counter);
            queue.queue_work(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }

        drop(queue); // drains before returning
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_queue_serializes_work() {
        let queue = ResetQueue::new("test-wq").unwrap();
        let running = Arc::new(AtomicU32::new(0));
        let overlapped = Arc::new(AtomicU32::new(0));

        for _ in 0..8 {
            let running = Arc::clone(&running);
            let overlapped = Arc::clone(&overlapped);
            queue.queue_work(move || {
                if running.fetch_add(1, Ordering::SeqCst) != 0 {
                    overlapped.fetch_add(1, Ordering::SeqCst);
                }
                thread::sleep(Duration::from_millis(2));
                running.fetch_sub(1, Ordering::SeqCst);
            });
        }

        drop(queue);
        assert_eq!(overlapped.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_pending_counts_down_to_zero() {
        let queue = ResetQueue::new("test-wq").unwrap();
        queue.queue_work(|| thread::sleep(Duration::from_millis(5)));
        queue.queue_work(|| {});

        for _ in 0..200 {
            if queue.pending() == 0 {
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("queue never drained");
    }

    #[test]
    fn test_queue_name() {
        let queue = ResetQueue::new("recovery-wq").unwrap();
        assert_eq!(queue.name(), "recovery-wq");
    }
}
