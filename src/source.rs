use crate::error::LoadError;
use crate::item::{Matrix, Message, WorkItem, MAT_N};
use crate::metrics::StageMetrics;
use crate::queue::BoundedQueue;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parse one square matrix block from `reader`.
///
/// Commas are normalized to spaces before tokenizing, so comma-, space-
/// and tab-separated files all parse. A row may carry extra trailing
/// tokens; only the first `MAT_N` are read.
pub fn parse_matrix<B: BufRead>(reader: &mut B, row_offset: usize) -> Result<Matrix, LoadError> {
    let mut matrix = [[0.0; MAT_N]; MAT_N];
    for i in 0..MAT_N {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(LoadError::Truncated {
                expected: 2 * MAT_N,
                found: row_offset + i,
            });
        }
        let normalized = line.replace(',', " ");
        let mut tokens = normalized.split_whitespace();
        for j in 0..MAT_N {
            let token = tokens.next().ok_or(LoadError::ShortRow {
                row: row_offset + i + 1,
                expected: MAT_N,
                found: j,
            })?;
            matrix[i][j] = token.parse().map_err(|_| LoadError::BadNumber {
                row: row_offset + i + 1,
                token: token.to_string(),
            })?;
        }
    }
    Ok(matrix)
}

/// Materialize a work item from a matrix file.
///
/// The first `MAT_N` rows are matrix A, the next `MAT_N` rows matrix B.
pub fn load_work_item(path: &Path) -> Result<Box<WorkItem>, LoadError> {
    let mut reader = BufReader::new(File::open(path)?);
    let a = parse_matrix(&mut reader, 0)?;
    let b = parse_matrix(&mut reader, MAT_N)?;
    Ok(WorkItem::new(path.display().to_string(), a, b))
}

/// Source worker: read the work list, materialize items, push them to the
/// first queue, then emit one end-of-stream marker per downstream worker.
///
/// Files that fail to open or parse are logged and skipped; they do not
/// count toward `max_items` and produce nothing downstream. Returns the
/// number of items loaded.
pub fn run_source<B: BufRead>(
    list: B,
    downstream: &BoundedQueue<Message>,
    max_items: usize,
    downstream_workers: usize,
    metrics: &StageMetrics,
) -> usize {
    let mut loaded = 0;
    for line in list.lines() {
        if loaded >= max_items {
            break;
        }
        let entry = match line {
            Ok(entry) => entry,
            Err(err) => {
                warn!("[source] work list read error: {err}");
                break;
            }
        };
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match load_work_item(Path::new(entry)) {
            Ok(item) => {
                debug!("[source] loaded {}", item.name);
                metrics.record_processed();
                downstream.push(Message::Item(item));
                loaded += 1;
            }
            Err(err) => {
                warn!("[source] skipping {entry}: {err}");
                metrics.record_skipped();
            }
        }
    }
    info!(
        "[source] finished: {loaded} loaded, {} skipped",
        metrics.total_skipped()
    );
    for _ in 0..downstream_workers {
        downstream.push(Message::EndOfStream);
    }
    loaded
}
