//! Magnitude spectra over `rustfft`, plus sizing helpers shared by the
//! transform-based detectors.

use rustfft::FftPlanner;

use crate::float::Float;
use crate::utils::buffer::new_complex_buffer;
use crate::utils::window::WindowFunction;

/// Smallest power of two that is greater than or equal to `n`.
pub fn next_power_of_two(n: usize) -> usize {
    let mut power = 1;
    while power < n {
        power *= 2;
    }
    power
}

/// Compute the single-sided magnitude spectrum of `signal`.
///
/// The signal is windowed, zero-padded to
/// `max(min_fft_size, next_power_of_two(signal.len()))`, transformed, and
/// reduced to `sqrt(re^2 + im^2)` per bin for bins `[0, fft_size / 2)`.
pub fn magnitude_spectrum<T: Float>(
    signal: &[T],
    window: WindowFunction,
    min_fft_size: usize,
) -> Vec<T> {
    let fft_size = next_power_of_two(signal.len()).max(min_fft_size);

    let mut buffer = new_complex_buffer::<T>(fft_size);
    let n = signal.len();
    for (i, &sample) in signal.iter().enumerate() {
        buffer[i].re = if n > 1 {
            sample * window.coefficient(i, n)
        } else {
            sample
        };
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    buffer[..fft_size / 2]
        .iter()
        .map(|c| (c.re * c.re + c.im * c.im).sqrt())
        .collect()
}

/// Hz covered by one bin of an `fft_size`-point transform.
pub fn frequency_resolution<T: Float>(sample_rate: usize, fft_size: usize) -> T {
    T::from_f64(sample_rate as f64 / fft_size as f64).unwrap()
}
