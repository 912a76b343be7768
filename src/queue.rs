use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A fixed-capacity blocking FIFO mailbox built on crossbeam's ArrayQueue
///
/// Any number of producers and consumers may share one queue through
/// cloned handles. Both operations block: a full queue stalls producers
/// (backpressure, never a drop) and an empty queue stalls consumers.
/// Each element is delivered to exactly one popper. Elements leave in
/// enqueue order, but nothing ties a particular element to a particular
/// consumer.
#[derive(Debug)]
pub struct BoundedQueue<T: Send> {
    queue: Arc<ArrayQueue<T>>,
    blocked_pushes: Arc<AtomicU64>,
    blocked_pops: Arc<AtomicU64>,
}

impl<T: Send> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            blocked_pushes: Arc::clone(&self.blocked_pushes),
            blocked_pops: Arc::clone(&self.blocked_pops),
        }
    }
}

impl<T: Send> BoundedQueue<T> {
    /// Create a new queue with the specified capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Arc::new(ArrayQueue::new(capacity)),
            blocked_pushes: Arc::new(AtomicU64::new(0)),
            blocked_pops: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Enqueue an item, blocking until a slot is free
    pub fn push(&self, item: T) {
        if let Err(item) = self.queue.push(item) {
            self.blocked_pushes.fetch_add(1, Ordering::Relaxed);
            self.push_blocking(item);
        }
    }

    fn push_blocking(&self, mut item: T) {
        loop {
            match self.queue.push(item) {
                Ok(()) => return,
                Err(i) => {
                    item = i;
                    // Spin with a small backoff to reduce CPU usage
                    thread::sleep(Duration::from_micros(1));
                }
            }
        }
    }

    /// Dequeue an item, blocking until one is available
    pub fn pop(&self) -> T {
        if let Some(item) = self.queue.pop() {
            return item;
        }
        self.blocked_pops.fetch_add(1, Ordering::Relaxed);
        loop {
            if let Some(item) = self.queue.pop() {
                return item;
            }
            thread::sleep(Duration::from_micros(10));
        }
    }

    /// Get the current number of queued elements
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Get the capacity of the queue
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Number of push calls that found the queue full
    pub fn blocked_push_count(&self) -> u64 {
        self.blocked_pushes.load(Ordering::Relaxed)
    }

    /// Number of pop calls that found the queue empty
    pub fn blocked_pop_count(&self) -> u64 {
        self.blocked_pops.load(Ordering::Relaxed)
    }
}
