use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;

use crate::float::Float;

pub fn new_real_buffer<T: Float>(size: usize) -> Vec<T> {
    vec![T::zero(); size]
}

pub fn new_complex_buffer<T: Float>(size: usize) -> Vec<Complex<T>> {
    vec![Complex::zero(); size]
}

/// Compute the sum of the square of each element of `arr`.
pub fn square_sum<T>(arr: &[T]) -> T
where
    T: Float,
{
    arr.iter().map(|&s| s * s).sum::<T>()
}

/// Root mean square of `arr`, a measure of the signal's energy.
/// Returns zero for an empty buffer.
pub fn rms<T>(arr: &[T]) -> T
where
    T: Float,
{
    if arr.is_empty() {
        return T::zero();
    }
    (square_sum(arr) / T::from_usize(arr.len()).unwrap()).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_sum_test() {
        let signal: Vec<f64> = vec![0., 1., 2., -2.];
        assert_eq!(square_sum(&signal), 9.);
    }

    #[test]
    fn rms_test() {
        let signal: Vec<f64> = vec![1., -1., 1., -1.];
        assert_eq!(rms(&signal), 1.);
        assert_eq!(rms::<f64>(&[]), 0.);
    }
}
