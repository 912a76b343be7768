use crate::error::{PipelineError, Result};
use crate::item::Message;
use crate::metrics::StageMetrics;
use crate::queue::BoundedQueue;
use crate::sink::run_sink;
use crate::source::run_source;
use crate::transform::{ColumnSums, Product, TotalSum};
use crate::worker::spawn_transform_pool;
use log::debug;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use std::thread::{spawn, JoinHandle};

/// Default capacity of each inter-stage queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 5;
/// Default cap on work items loaded per run
pub const DEFAULT_MAX_ITEMS: usize = 50;
/// Default product pool size
pub const DEFAULT_PRODUCT_WORKERS: usize = 5;
/// Default column-sum pool size
pub const DEFAULT_COLUMN_SUM_WORKERS: usize = 4;
/// Default total-sum pool size
pub const DEFAULT_TOTAL_SUM_WORKERS: usize = 3;

/// Builder for configuring pipelines
pub struct PipelineBuilder {
    queue_capacity: usize,
    product_workers: usize,
    column_sum_workers: usize,
    total_sum_workers: usize,
    max_items: usize,
}

impl PipelineBuilder {
    /// Create a new pipeline builder with the default pool sizes
    pub fn new() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            product_workers: DEFAULT_PRODUCT_WORKERS,
            column_sum_workers: DEFAULT_COLUMN_SUM_WORKERS,
            total_sum_workers: DEFAULT_TOTAL_SUM_WORKERS,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    /// Set the capacity of every inter-stage queue
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the product pool size
    pub fn product_workers(mut self, workers: usize) -> Self {
        self.product_workers = workers;
        self
    }

    /// Set the column-sum pool size
    pub fn column_sum_workers(mut self, workers: usize) -> Self {
        self.column_sum_workers = workers;
        self
    }

    /// Set the total-sum pool size
    pub fn total_sum_workers(mut self, workers: usize) -> Self {
        self.total_sum_workers = workers;
        self
    }

    /// Set the cap on work items loaded per run
    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<Pipeline> {
        if self.queue_capacity == 0 {
            return Err(PipelineError::Config("queue capacity must be at least 1".into()));
        }
        if self.product_workers == 0
            || self.column_sum_workers == 0
            || self.total_sum_workers == 0
        {
            return Err(PipelineError::Config("every pool needs at least one worker".into()));
        }
        if self.max_items == 0 {
            return Err(PipelineError::Config("max items must be at least 1".into()));
        }
        Ok(Pipeline {
            queue_capacity: self.queue_capacity,
            product_workers: self.product_workers,
            column_sum_workers: self.column_sum_workers,
            total_sum_workers: self.total_sum_workers,
            max_items: self.max_items,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured five-stage pipeline
///
/// Owns the wiring of one run: four bounded queues, a single-worker
/// source, three transform pools of fixed sizes and a single-worker sink.
/// Pool sizes are fixed once built.
pub struct Pipeline {
    queue_capacity: usize,
    product_workers: usize,
    column_sum_workers: usize,
    total_sum_workers: usize,
    max_items: usize,
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Items the source loaded and injected
    pub items_loaded: usize,
    /// Work-list entries skipped because their file failed to open or parse
    pub items_skipped: usize,
    /// Records the sink wrote to the report
    pub records_written: usize,
}

impl Pipeline {
    /// Run the pipeline over `list_path`, writing the report to `report_path`.
    ///
    /// Both files are opened before any worker spawns, so an unopenable
    /// list or report surfaces as an error here instead of a stalled run.
    /// Blocks until the sink finishes and every worker has been joined.
    /// Mid-run per-file failures do not abort the run; they only reduce
    /// `records_written` relative to the work list.
    pub fn run(&self, list_path: &Path, report_path: &Path) -> Result<PipelineSummary> {
        let list = File::open(list_path).map_err(|source| PipelineError::ListOpen {
            path: list_path.to_path_buf(),
            source,
        })?;
        let report = File::create(report_path).map_err(|source| PipelineError::ReportCreate {
            path: report_path.to_path_buf(),
            source,
        })?;

        let queues: Vec<BoundedQueue<Message>> = (0..4)
            .map(|_| BoundedQueue::new(self.queue_capacity))
            .collect();

        let source_metrics = StageMetrics::new();
        let product_metrics = StageMetrics::new();
        let column_metrics = StageMetrics::new();
        let total_metrics = StageMetrics::new();
        let sink_metrics = StageMetrics::new();

        let source_handle = {
            let queue = queues[0].clone();
            let metrics = source_metrics.clone();
            let max_items = self.max_items;
            let quota = self.product_workers;
            spawn(move || run_source(BufReader::new(list), &queue, max_items, quota, &metrics))
        };

        let product_pool = spawn_transform_pool(
            Arc::new(Product),
            queues[0].clone(),
            queues[1].clone(),
            self.product_workers,
            1,
            self.column_sum_workers,
            product_metrics.clone(),
        );
        let column_pool = spawn_transform_pool(
            Arc::new(ColumnSums),
            queues[1].clone(),
            queues[2].clone(),
            self.column_sum_workers,
            self.product_workers,
            self.total_sum_workers,
            column_metrics.clone(),
        );
        let total_pool = spawn_transform_pool(
            Arc::new(TotalSum),
            queues[2].clone(),
            queues[3].clone(),
            self.total_sum_workers,
            self.column_sum_workers,
            1,
            total_metrics.clone(),
        );

        let sink_handle = {
            let queue = queues[3].clone();
            let metrics = sink_metrics.clone();
            let target = self.max_items;
            let upstream = self.total_sum_workers;
            spawn(move || run_sink(BufWriter::new(report), &queue, target, upstream, &metrics))
        };

        // The sink defines completion; by the time it returns, the
        // cascade has already unwound the upstream stages.
        let sink_result = sink_handle
            .join()
            .map_err(|_| PipelineError::WorkerPanic { stage: "sink" })?;
        let items_loaded = source_handle
            .join()
            .map_err(|_| PipelineError::WorkerPanic { stage: "source" })?;
        join_pool(product_pool, "product")?;
        join_pool(column_pool, "column-sums")?;
        join_pool(total_pool, "total-sum")?;

        for (stage, metrics) in [
            ("source", &source_metrics),
            ("product", &product_metrics),
            ("column-sums", &column_metrics),
            ("total-sum", &total_metrics),
            ("sink", &sink_metrics),
        ] {
            debug!("[{stage}] {}", metrics.snapshot().format());
        }

        let records_written = sink_result.map_err(PipelineError::ReportWrite)?;
        Ok(PipelineSummary {
            items_loaded,
            items_skipped: source_metrics.total_skipped() as usize,
            records_written,
        })
    }
}

fn join_pool(handles: Vec<JoinHandle<()>>, stage: &'static str) -> Result<()> {
    for handle in handles {
        handle
            .join()
            .map_err(|_| PipelineError::WorkerPanic { stage })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_builder_defaults() {
        let result = PipelineBuilder::new().build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let result = PipelineBuilder::new().product_workers(0).build();
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_zero_queue_capacity_rejected() {
        let result = PipelineBuilder::new().queue_capacity(0).build();
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_missing_list_is_startup_error() {
        let pipeline = PipelineBuilder::new().build().unwrap();
        let result = pipeline.run(Path::new("no-such-list.in"), Path::new("unused.out"));
        assert!(matches!(result, Err(PipelineError::ListOpen { .. })));
    }
}
