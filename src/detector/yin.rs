//! The YIN pitch detection algorithm is based on the algorithm from the paper
//! *[YIN, a fundamental frequency estimator for speech and music](http://recherche.ircam.fr/equipes/pcm/cheveign/ps/2002_JASA_YIN_proof.pdf)*.
//!
//! Let $S=(s_0,s_1,\ldots)$ be a discrete signal and $W$ half the buffer
//! length. The *square difference function* at lag $t$ is
//! $$ d(t) = \sum_{i=0}^{W-1} (s_i-s_{i+t})^2, $$
//! which is close to zero when the signal "lines up" with itself. The
//! algorithm normalizes it into the *cumulative mean normalized difference
//! function* (CMNDF) and searches for the first local minimum below a
//! threshold, restricted to the lag range implied by the configured
//! frequency bounds (with a ±25-cent margin).
//!
//! The acceptance threshold adapts to the signal's RMS energy, so quiet
//! signals are not rejected outright; two adaptation strategies are
//! available via [YinThreshold]. After a candidate lag is found, parabolic
//! interpolation refines the estimate to sub-sample precision.

use crate::config::DetectorConfig;
use crate::detector::internals::{add_cents_to_frequency, PitchResult};
use crate::detector::PitchDetector;
use crate::float::Float;
use crate::utils::buffer::rms;
use crate::utils::peak::{is_local_minimum, parabolic_interpolation};

/// Base CMNDF acceptance threshold before energy adaptation.
const YIN_MINIMUM_THRESHOLD: f64 = 0.4;

/// Scaling factor applied to the RMS term of the dynamic threshold.
const RMS_SCALING_FACTOR: f64 = 0.3;

/// Strategy for adapting the CMNDF acceptance threshold to signal energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YinThreshold {
    /// `min(0.5, 0.4 * (1 + 0.3 / (rms + 0.01)))`. Grows quickly as the
    /// signal gets quiet, which makes detection robust on low-level input.
    #[default]
    RmsInverse,
    /// `0.4 * (1 + 0.3 * (1 - rms))`, a gentler linear variant.
    RmsComplement,
}

impl YinThreshold {
    fn threshold<T: Float>(&self, rms: T) -> T {
        let rms = rms.to_f64().unwrap();
        let value = match self {
            YinThreshold::RmsInverse => {
                (YIN_MINIMUM_THRESHOLD * (1.0 + RMS_SCALING_FACTOR / (rms + 0.01))).min(0.5)
            }
            YinThreshold::RmsComplement => {
                YIN_MINIMUM_THRESHOLD * (1.0 + RMS_SCALING_FACTOR * (1.0 - rms))
            }
        };
        T::from_f64(value).unwrap()
    }
}

pub struct YinDetector<T>
where
    T: Float,
{
    config: DetectorConfig<T>,
    threshold: YinThreshold,
}

impl<T> YinDetector<T>
where
    T: Float,
{
    pub fn new(config: DetectorConfig<T>) -> Self {
        YinDetector {
            config,
            threshold: YinThreshold::default(),
        }
    }

    pub fn with_threshold(config: DetectorConfig<T>, threshold: YinThreshold) -> Self {
        YinDetector { config, threshold }
    }

    pub fn config(&self) -> &DetectorConfig<T> {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DetectorConfig<T> {
        &mut self.config
    }
}

impl<T> Default for YinDetector<T>
where
    T: Float,
{
    fn default() -> Self {
        YinDetector::new(DetectorConfig::default())
    }
}

impl<T> PitchDetector<T> for YinDetector<T>
where
    T: Float,
{
    fn detect_pitch(&self, signal: &[T], sample_rate: usize) -> PitchResult<T> {
        let difference = difference_function(signal);
        if difference.len() < 3 {
            return PitchResult::no_pitch();
        }

        // Lag bounds from the frequency range, widened by 25 cents on each
        // side, clamped so short buffers fail the search instead of the
        // indexing.
        let sample_rate_t = T::from_usize(sample_rate).unwrap();
        let max_tau = (sample_rate_t / add_cents_to_frequency(-25.0, self.config.min_frequency))
            .to_usize()
            .unwrap_or(0)
            .min(difference.len() - 1);
        let min_tau = (sample_rate_t / add_cents_to_frequency(25.0, self.config.max_frequency))
            .to_usize()
            .unwrap_or(0)
            .max(1);

        if min_tau >= max_tau {
            return PitchResult::no_pitch();
        }

        let cmndf = cumulative_mean_normalized_difference(&difference, min_tau, max_tau);

        let threshold = self.threshold.threshold(rms(signal));

        let tau_estimate = match find_first_minimum(&cmndf, threshold, min_tau, max_tau) {
            Some(tau) => tau,
            None => return PitchResult::no_pitch(),
        };

        let refined_tau = parabolic_interpolation(&cmndf, tau_estimate);
        if refined_tau <= T::zero() {
            return PitchResult::no_pitch();
        }

        let ratio = cmndf[tau_estimate] / threshold;
        let confidence = T::one() - ratio * ratio;
        let pitch = sample_rate_t / refined_tau;

        PitchResult::new(pitch, confidence)
    }
}

/// `d(t) = sum_{i < W} (x_i - x_{i+t})^2` for `t` in `[0, W)`, `W = len / 2`.
fn difference_function<T: Float>(signal: &[T]) -> Vec<T> {
    let window = signal.len() / 2;
    let mut difference = vec![T::zero(); window];

    for (tau, value) in difference.iter_mut().enumerate() {
        let mut sum = T::zero();
        for i in 0..window {
            let delta = signal[i] - signal[i + tau];
            sum = sum + delta * delta;
        }
        *value = sum;
    }

    difference
}

/// CMNDF with lags outside `[min_tau, max_tau]` pinned to 1 so they can
/// never win the minimum search.
fn cumulative_mean_normalized_difference<T: Float>(
    difference: &[T],
    min_tau: usize,
    max_tau: usize,
) -> Vec<T> {
    let epsilon = T::from_f64(1e-10).unwrap();
    let mut cmndf = vec![T::one(); difference.len()];
    let mut cumulative_sum = T::zero();

    for tau in 1..difference.len() {
        cumulative_sum = cumulative_sum + difference[tau];
        if tau >= min_tau && tau <= max_tau {
            let mean = cumulative_sum / T::from_usize(tau).unwrap();
            cmndf[tau] = difference[tau] / (mean + epsilon);
        }
    }

    cmndf
}

/// First lag in `[min_tau, max_tau)` whose CMNDF value dips below
/// `threshold` at a strict local minimum.
fn find_first_minimum<T: Float>(
    cmndf: &[T],
    threshold: T,
    min_tau: usize,
    max_tau: usize,
) -> Option<usize> {
    (min_tau..max_tau).find(|&tau| cmndf[tau] < threshold && is_local_minimum(cmndf, tau))
}
