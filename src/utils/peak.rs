use crate::float::Float;

/// Refine a peak (or valley) index to sub-sample precision with a 3-point
/// parabolic fit.
///
/// Returns the index unchanged when it sits on the array boundary, when the
/// fit is degenerate (near-zero curvature), or when the fitted shift leaves
/// the `[-1, 1]` interval around the index.
pub fn parabolic_interpolation<T: Float>(values: &[T], index: usize) -> T {
    let index_t = T::from_usize(index).unwrap();
    if index == 0 || index >= values.len() - 1 {
        return index_t;
    }

    let x0 = values[index - 1];
    let x1 = values[index];
    let x2 = values[index + 1];

    let two = T::from_f64(2.0).unwrap();
    let epsilon = T::from_f64(1e-10).unwrap();
    let denominator = x0 - two * x1 + x2;
    if denominator < epsilon && denominator > -epsilon {
        return index_t;
    }

    let adjustment = T::from_f64(0.5).unwrap() * (x0 - x2) / denominator;
    if adjustment > T::one() || adjustment < -T::one() {
        return index_t;
    }

    index_t + adjustment
}

/// `true` when `values[index]` is strictly smaller than both neighbors.
pub fn is_local_minimum<T: Float>(values: &[T], index: usize) -> bool {
    if index == 0 || index >= values.len() - 1 {
        return false;
    }
    values[index] < values[index - 1] && values[index] < values[index + 1]
}

/// `true` when `values[index]` is strictly larger than both neighbors.
pub fn is_local_maximum<T: Float>(values: &[T], index: usize) -> bool {
    if index == 0 || index >= values.len() - 1 {
        return false;
    }
    values[index] > values[index - 1] && values[index] > values[index + 1]
}
