//! Detection of linearly dependent columns.

/// Relative tolerance below which a column's residual norm counts as zero.
pub const COLLINEAR_TOLERANCE: f64 = 1e-9;

/// Indices of columns that are linearly independent of all earlier columns.
///
/// Columns are processed left to right with modified Gram-Schmidt; a column is
/// kept when the norm of its residual after projecting out the kept columns
/// exceeds `tolerance` times its original norm. All-zero columns are dropped.
pub fn independent_columns(columns: &[Vec<f64>], tolerance: f64) -> Vec<usize> {
    let mut basis: Vec<Vec<f64>> = Vec::new();
    let mut keep = Vec::new();

    for (j, column) in columns.iter().enumerate() {
        let norm = l2_norm(column);
        if norm == 0.0 || !norm.is_finite() {
            continue;
        }

        let mut residual = column.clone();
        for b in &basis {
            let proj = dot(&residual, b);
            for (r, bi) in residual.iter_mut().zip(b) {
                *r -= proj * bi;
            }
        }

        let residual_norm = l2_norm(&residual);
        if residual_norm > tolerance * norm {
            for r in residual.iter_mut() {
                *r /= residual_norm;
            }
            basis.push(residual);
            keep.push(j);
        }
    }

    keep
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn l2_norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}
