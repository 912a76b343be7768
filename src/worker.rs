//! Transform-pool workers and the end-of-stream cascade.
//!
//! Each stage boundary is a single queue shared by `U` upstream and `D`
//! downstream workers. When an upstream worker finishes, it pushes one
//! `EndOfStream` marker per downstream worker, so `U × D` markers enter
//! the queue in total. Every downstream worker counts markers against a
//! countdown seeded with `U` and stops popping the moment it reaches
//! zero, so no worker can take more than its share of `U`; with exactly
//! `U × D` supplied, each of the `D` workers eventually collects exactly
//! `U` and the stage drains. Markers are consumed, never forwarded: a
//! terminating worker emits a fresh quota for the next stage.
//!
//! The arithmetic only holds while the emitted quota matches the seeded
//! countdown. Wiring a pool with a wrong upstream or downstream size
//! leaves a starved worker blocked in `pop` forever; there is no timeout.

use crate::item::Message;
use crate::metrics::StageMetrics;
use crate::queue::BoundedQueue;
use crate::transform::Transform;
use log::debug;
use std::sync::Arc;
use std::thread::{spawn, JoinHandle};

/// Spawn a pool of workers running `transform` between two queues.
///
/// `upstream_workers` seeds each worker's marker countdown;
/// `downstream_workers` sizes the marker quota forwarded on exit.
pub fn spawn_transform_pool(
    transform: Arc<dyn Transform>,
    upstream: BoundedQueue<Message>,
    downstream: BoundedQueue<Message>,
    pool_size: usize,
    upstream_workers: usize,
    downstream_workers: usize,
    metrics: StageMetrics,
) -> Vec<JoinHandle<()>> {
    (0..pool_size)
        .map(|worker_id| {
            let transform = Arc::clone(&transform);
            let upstream = upstream.clone();
            let downstream = downstream.clone();
            let metrics = metrics.clone();
            spawn(move || {
                run_worker(
                    worker_id,
                    transform.as_ref(),
                    &upstream,
                    &downstream,
                    upstream_workers,
                    downstream_workers,
                    &metrics,
                )
            })
        })
        .collect()
}

fn run_worker(
    worker_id: usize,
    transform: &dyn Transform,
    upstream: &BoundedQueue<Message>,
    downstream: &BoundedQueue<Message>,
    upstream_workers: usize,
    downstream_workers: usize,
    metrics: &StageMetrics,
) {
    let mut remaining = upstream_workers;
    loop {
        match upstream.pop() {
            Message::Item(mut item) => {
                transform.apply(&mut item);
                debug!("[{}-{}] processed {}", transform.name(), worker_id, item.name);
                metrics.record_processed();
                downstream.push(Message::Item(item));
            }
            Message::EndOfStream => {
                remaining -= 1;
                if remaining == 0 {
                    for _ in 0..downstream_workers {
                        downstream.push(Message::EndOfStream);
                    }
                    debug!(
                        "[{}-{}] upstream drained, forwarded {} markers",
                        transform.name(),
                        worker_id,
                        downstream_workers
                    );
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Matrix, WorkItem, MAT_N};
    use crate::transform::{ColumnSums, Product, TotalSum};

    fn filled(value: f64) -> Matrix {
        [[value; MAT_N]; MAT_N]
    }

    fn drain_counts(queue: &BoundedQueue<Message>, expected_total: usize) -> (usize, usize) {
        let mut items = 0;
        let mut markers = 0;
        for _ in 0..expected_total {
            match queue.pop() {
                Message::Item(_) => items += 1,
                Message::EndOfStream => markers += 1,
            }
        }
        (items, markers)
    }

    #[test]
    fn test_pool_transforms_items_and_forwards_marker_quota() {
        let upstream = BoundedQueue::new(64);
        let downstream = BoundedQueue::new(64);
        let metrics = StageMetrics::new();

        // Act as an upstream pool of 2 feeding a pool of 3: 10 items,
        // then each upstream worker's quota of 3 markers.
        for i in 0..10 {
            upstream.push(Message::Item(WorkItem::new(
                format!("item-{i}"),
                filled(1.0),
                filled(2.0),
            )));
        }
        for _ in 0..2 * 3 {
            upstream.push(Message::EndOfStream);
        }

        let handles = spawn_transform_pool(
            Arc::new(Product),
            upstream,
            downstream.clone(),
            3,
            2,
            4,
            metrics.clone(),
        );
        for handle in handles {
            handle.join().unwrap();
        }

        // 10 items plus 3 workers × 4 downstream markers.
        let (items, markers) = drain_counts(&downstream, 10 + 3 * 4);
        assert_eq!(items, 10);
        assert_eq!(markers, 12);
        assert!(downstream.is_empty());
        assert_eq!(metrics.total_processed(), 10);
    }

    #[test]
    fn test_pool_applies_transform_before_forwarding() {
        let upstream = BoundedQueue::new(8);
        let downstream = BoundedQueue::new(8);

        upstream.push(Message::Item(WorkItem::new("one", filled(1.0), filled(1.0))));
        upstream.push(Message::EndOfStream);

        let handles = spawn_transform_pool(
            Arc::new(Product),
            upstream,
            downstream.clone(),
            1,
            1,
            1,
            StageMetrics::new(),
        );
        for handle in handles {
            handle.join().unwrap();
        }

        match downstream.pop() {
            Message::Item(item) => assert_eq!(item.c, filled(MAT_N as f64)),
            Message::EndOfStream => panic!("expected the item first"),
        }
        match downstream.pop() {
            Message::Item(_) => panic!("expected the marker"),
            Message::EndOfStream => {}
        }
    }

    #[test]
    fn test_cascade_terminates_across_chained_pools() {
        // Full transform chain with the default unequal pool sizes,
        // repeated to exercise different schedules.
        for trial in 0..10 {
            let queues: Vec<BoundedQueue<Message>> =
                (0..4).map(|_| BoundedQueue::new(5)).collect();

            let pools = vec![
                spawn_transform_pool(
                    Arc::new(Product),
                    queues[0].clone(),
                    queues[1].clone(),
                    5,
                    1,
                    4,
                    StageMetrics::new(),
                ),
                spawn_transform_pool(
                    Arc::new(ColumnSums),
                    queues[1].clone(),
                    queues[2].clone(),
                    4,
                    5,
                    3,
                    StageMetrics::new(),
                ),
                spawn_transform_pool(
                    Arc::new(TotalSum),
                    queues[2].clone(),
                    queues[3].clone(),
                    3,
                    4,
                    1,
                    StageMetrics::new(),
                ),
            ];

            for i in 0..7 {
                queues[0].push(Message::Item(WorkItem::new(
                    format!("trial-{trial}-item-{i}"),
                    filled(1.0),
                    filled(1.0),
                )));
            }
            // The source's quota: one marker per product worker.
            for _ in 0..5 {
                queues[0].push(Message::EndOfStream);
            }

            let (items, markers) = drain_counts(&queues[3], 7 + 3);
            assert_eq!(items, 7);
            assert_eq!(markers, 3);

            for pool in pools {
                for handle in pool {
                    handle.join().unwrap();
                }
            }
        }
    }
}
