//! A five-stage threaded pipeline that derives matrix artifacts from input files.
//!
//! For each file named in a work list, the pipeline computes a product
//! matrix, its column sums and their scalar total, passing one work item
//! through unequal-sized worker pools connected by bounded blocking queues:
//!
//! ```text
//! Source ─q0─► product ×5 ─q1─► column-sums ×4 ─q2─► total-sum ×3 ─q3─► Sink
//! ```
//!
//! # Features
//!
//! - Bounded MPMC queues built on crossbeam's ArrayQueue; a full queue
//!   stalls producers instead of dropping work
//! - Unequal worker-pool sizes per stage, one OS thread per worker
//! - Coordinator-free termination: end-of-stream markers cascade from
//!   pool to pool in per-worker quotas
//! - Per-file failures are logged and skipped; the run continues
//! - Builder pattern for pool sizes, queue capacity and the item cap
//!
//! # Example
//!
//! ```ignore
//! use matrix_pipeline::PipelineBuilder;
//!
//! let pipeline = PipelineBuilder::new().max_items(3).build()?;
//! let summary = pipeline.run("input/entrada.in".as_ref(), "output/saida.out".as_ref())?;
//! println!("{} records written", summary.records_written);
//! ```

pub mod error;
pub mod item;
pub mod metrics;
pub mod pipeline;
pub mod queue;
pub mod sink;
pub mod source;
pub mod transform;
pub mod worker;

// Re-exports for convenience
pub use error::{LoadError, PipelineError, Result};
pub use item::{Matrix, Message, Vector, WorkItem, MAT_N};
pub use metrics::{MetricsSnapshot, StageMetrics};
pub use pipeline::{
    Pipeline, PipelineBuilder, PipelineSummary, DEFAULT_MAX_ITEMS, DEFAULT_QUEUE_CAPACITY,
};
pub use queue::BoundedQueue;
pub use sink::write_record;
pub use source::load_work_item;
pub use transform::{ColumnSums, Product, TotalSum, Transform};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
