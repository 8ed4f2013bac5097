//! McLeod Pitch Method (MPM) detector.
//!
//! The detector computes the Normalized Square Difference Function over the
//! lag range implied by the configured frequency bounds (widened by 10% on
//! each end), then picks the first NSDF peak above a fixed clarity
//! threshold. Taking the first qualifying peak, rather than running the
//! textbook key-maximum search, keeps octave behavior stable on harmonica
//! signals where the lowest strong peak is the fundamental.

use crate::config::DetectorConfig;
use crate::detector::internals::PitchResult;
use crate::detector::PitchDetector;
use crate::float::Float;
use crate::utils::peak::{is_local_maximum, parabolic_interpolation};

/// NSDF peaks below this value are not considered pitch candidates.
const PEAK_THRESHOLD: f64 = 0.5;

pub struct McLeodDetector<T>
where
    T: Float,
{
    config: DetectorConfig<T>,
}

impl<T> McLeodDetector<T>
where
    T: Float,
{
    pub fn new(config: DetectorConfig<T>) -> Self {
        McLeodDetector { config }
    }

    pub fn config(&self) -> &DetectorConfig<T> {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DetectorConfig<T> {
        &mut self.config
    }
}

impl<T> Default for McLeodDetector<T>
where
    T: Float,
{
    fn default() -> Self {
        McLeodDetector::new(DetectorConfig::default())
    }
}

impl<T> PitchDetector<T> for McLeodDetector<T>
where
    T: Float,
{
    fn detect_pitch(&self, signal: &[T], sample_rate: usize) -> PitchResult<T> {
        let n = signal.len();
        let sample_rate_f = sample_rate as f64;

        // Extend the lag range by 10% on both ends so frequencies right at
        // the configured edges remain detectable.
        let min_lag = ((sample_rate_f / (self.config.max_frequency.to_f64().unwrap() * 1.1))
            as usize)
            .max(1);
        let max_lag = ((sample_rate_f / (self.config.min_frequency.to_f64().unwrap() * 0.9))
            as usize)
            .min(n / 2);

        if max_lag <= min_lag {
            return PitchResult::no_pitch();
        }

        let nsdf = normalized_square_difference(signal, min_lag, max_lag);

        let peak_index = match first_peak_above(&nsdf, T::from_f64(PEAK_THRESHOLD).unwrap()) {
            Some(index) => index,
            None => return PitchResult::no_pitch(),
        };

        let confidence = nsdf[peak_index];
        let refined_lag =
            parabolic_interpolation(&nsdf, peak_index) + T::from_usize(min_lag).unwrap();
        let pitch = T::from_usize(sample_rate).unwrap() / refined_lag;

        PitchResult::new(pitch, confidence)
    }
}

/// NSDF values for lags in `[min_lag, max_lag)`:
/// `nsdf(lag) = 2 * sum(x_i * x_{i+lag}) / sum(x_i^2 + x_{i+lag}^2)`.
/// A zero denominator (silence) yields zero.
fn normalized_square_difference<T: Float>(signal: &[T], min_lag: usize, max_lag: usize) -> Vec<T> {
    let n = signal.len();
    let two = T::from_f64(2.0).unwrap();
    let mut nsdf = vec![T::zero(); max_lag - min_lag];

    for (index, value) in nsdf.iter_mut().enumerate() {
        let lag = min_lag + index;
        let mut numerator = T::zero();
        let mut denominator = T::zero();
        for i in 0..n - lag {
            let a = signal[i];
            let b = signal[i + lag];
            numerator = numerator + a * b;
            denominator = denominator + a * a + b * b;
        }
        if denominator != T::zero() {
            *value = two * numerator / denominator;
        }
    }

    nsdf
}

/// Index of the first strict local maximum above `threshold`, scanning by
/// ascending lag.
fn first_peak_above<T: Float>(nsdf: &[T], threshold: T) -> Option<usize> {
    (1..nsdf.len().saturating_sub(1))
        .find(|&index| nsdf[index] > threshold && is_local_maximum(nsdf, index))
}
