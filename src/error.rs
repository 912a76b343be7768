use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid builder configuration
    #[error("invalid pipeline configuration: {0}")]
    Config(String),

    /// Work list could not be opened at startup
    #[error("cannot open work list {}: {source}", .path.display())]
    ListOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Report file could not be created at startup
    #[error("cannot create report file {}: {source}", .path.display())]
    ReportCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Report writing failed mid-run
    #[error("writing report failed: {0}")]
    ReportWrite(#[source] io::Error),

    /// A worker thread panicked
    #[error("{stage} worker panicked")]
    WorkerPanic { stage: &'static str },
}

/// Per-file failures while materializing a work item.
///
/// These are recoverable: the source logs the failure and skips the file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The file ended before both matrix blocks were read
    #[error("expected {expected} matrix rows, found {found}")]
    Truncated { expected: usize, found: usize },

    /// A row held fewer numeric tokens than the matrix order
    #[error("row {row}: expected {expected} values, found {found}")]
    ShortRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A token did not parse as a number
    #[error("row {row}: invalid number {token:?}")]
    BadNumber { row: usize, token: String },
}
