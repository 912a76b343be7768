use crate::item::{Matrix, Message, WorkItem};
use crate::metrics::StageMetrics;
use crate::queue::BoundedQueue;
use log::{debug, error, info};
use std::io::{self, Write};

const RECORD_RULE: &str = "================================";
const SECTION_RULE: &str = "--------------------------";

fn write_matrix<W: Write>(out: &mut W, label: &str, matrix: &Matrix) -> io::Result<()> {
    writeln!(out, "{label}")?;
    for row in matrix {
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                write!(out, " ")?;
            }
            write!(out, "{value:.6}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Serialize one report record.
///
/// Every value is formatted with six decimal digits; matrix rows are
/// space-separated, the vector prints one value per line, and a blank
/// line closes the record.
pub fn write_record<W: Write>(out: &mut W, item: &WorkItem) -> io::Result<()> {
    writeln!(out, "{RECORD_RULE}")?;
    writeln!(out, "Entrada: {};", item.name)?;
    writeln!(out, "{SECTION_RULE}")?;
    write_matrix(out, "A", &item.a)?;
    writeln!(out, "{SECTION_RULE}")?;
    write_matrix(out, "B", &item.b)?;
    writeln!(out, "{SECTION_RULE}")?;
    write_matrix(out, "C", &item.c)?;
    writeln!(out, "{SECTION_RULE}")?;
    writeln!(out, "V")?;
    for value in &item.v {
        writeln!(out, "{value:.6}")?;
    }
    writeln!(out, "{SECTION_RULE}")?;
    writeln!(out, "E")?;
    writeln!(out, "{:.6}", item.e)?;
    writeln!(out, "{RECORD_RULE}")?;
    writeln!(out)?;
    Ok(())
}

/// Sink worker: write each arriving item to the report.
///
/// Markers from the upstream pool are never written; the sink counts them
/// against the pool size and returns once the pool has fully drained.
/// Queue FIFO puts the last marker after every item, so full drain means
/// nothing more can arrive. `target` caps how many records are written;
/// items past the cap are discarded, never left behind to stall an
/// upstream push. Returns the number of records written.
///
/// A write failure does not cross to other threads: the sink logs it,
/// stops writing, keeps draining so upstream can unwind, and reports the
/// first error on return.
pub fn run_sink<W: Write>(
    mut out: W,
    upstream: &BoundedQueue<Message>,
    target: usize,
    upstream_workers: usize,
    metrics: &StageMetrics,
) -> io::Result<usize> {
    let mut written = 0;
    let mut remaining = upstream_workers;
    let mut first_error: Option<io::Error> = None;

    while remaining > 0 {
        match upstream.pop() {
            Message::Item(item) => {
                if written >= target || first_error.is_some() {
                    metrics.record_skipped();
                    continue;
                }
                match write_record(&mut out, &item).and_then(|()| out.flush()) {
                    Ok(()) => {
                        written += 1;
                        metrics.record_processed();
                        debug!("[sink] wrote {} ({written}/{target})", item.name);
                    }
                    Err(err) => {
                        error!("[sink] write failed for {}: {err}", item.name);
                        metrics.record_skipped();
                        first_error = Some(err);
                    }
                }
            }
            Message::EndOfStream => remaining -= 1,
        }
    }

    info!("[sink] finished: {written} records written");
    match first_error {
        Some(err) => Err(err),
        None => Ok(written),
    }
}
