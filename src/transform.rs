use crate::item::{WorkItem, MAT_N};

/// A pure per-item computation applied by one pipeline stage
///
/// Implementations write exactly one derived field of the item and read
/// only fields produced by earlier stages.
pub trait Transform: Send + Sync + 'static {
    /// Apply the stage computation in place
    fn apply(&self, item: &mut WorkItem);

    /// Get a human-readable name for this stage
    fn name(&self) -> &'static str;
}

/// Computes the matrix product `c = a × b`
pub struct Product;

impl Transform for Product {
    fn apply(&self, item: &mut WorkItem) {
        for i in 0..MAT_N {
            for j in 0..MAT_N {
                let mut sum = 0.0;
                for k in 0..MAT_N {
                    sum += item.a[i][k] * item.b[k][j];
                }
                item.c[i][j] = sum;
            }
        }
    }

    fn name(&self) -> &'static str {
        "product"
    }
}

/// Computes the column sums `v[j] = Σ_i c[i][j]` of the product matrix
pub struct ColumnSums;

impl Transform for ColumnSums {
    fn apply(&self, item: &mut WorkItem) {
        for j in 0..MAT_N {
            let mut sum = 0.0;
            for row in &item.c {
                sum += row[j];
            }
            item.v[j] = sum;
        }
    }

    fn name(&self) -> &'static str {
        "column-sums"
    }
}

/// Computes the scalar total `e = Σ_j v[j]`
pub struct TotalSum;

impl Transform for TotalSum {
    fn apply(&self, item: &mut WorkItem) {
        item.e = item.v.iter().sum();
    }

    fn name(&self) -> &'static str {
        "total-sum"
    }
}
