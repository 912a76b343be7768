/// Order of every matrix flowing through the pipeline.
pub const MAT_N: usize = 10;

/// Square matrix of pipeline order.
pub type Matrix = [[f64; MAT_N]; MAT_N];

/// Column-sum vector derived from the product matrix.
pub type Vector = [f64; MAT_N];

/// Per-input-file record carried through the pipeline.
///
/// `a` and `b` are written once by the source; each transform stage fills
/// in exactly one of the remaining fields (`c`, then `v`, then `e`).
/// Exactly one worker owns an item at a time: ownership moves into a
/// queue on push and out to a single popper on pop.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    pub name: String,
    pub a: Matrix,
    pub b: Matrix,
    pub c: Matrix,
    pub v: Vector,
    pub e: f64,
}

impl WorkItem {
    /// Create a boxed item with its derived fields zeroed.
    pub fn new(name: impl Into<String>, a: Matrix, b: Matrix) -> Box<Self> {
        Box::new(Self {
            name: name.into(),
            a,
            b,
            c: [[0.0; MAT_N]; MAT_N],
            v: [0.0; MAT_N],
            e: 0.0,
        })
    }
}

/// Element type of every inter-stage queue.
///
/// `EndOfStream` is the termination marker of the cascade protocol. It is
/// a distinct variant rather than an empty item, so it cannot carry a
/// payload and cannot be confused with one.
#[derive(Debug)]
pub enum Message {
    Item(Box<WorkItem>),
    EndOfStream,
}
