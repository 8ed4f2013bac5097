//! Hybrid detector: routes each buffer to the algorithm best suited to its
//! energy profile.
//!
//! An obviously noise-like buffer (high coefficient of variation together
//! with a high zero-crossing rate) is rejected outright. Otherwise a
//! Goertzel probe measures the energy near the low band (275 Hz by
//! default): strong low-band energy routes to YIN, strong high-band energy
//! (900 Hz probe) routes to the FFT detector with MPM as the in-branch
//! fallback, and everything else goes to MPM. A preferred detector that
//! finds nothing falls back, with YIN retried once as the last resort.
//!
//! The probe frequencies and energy thresholds were tuned empirically and
//! are exposed as plain fields on [HybridConfig].

use log::debug;

use crate::config::DetectorConfig;
use crate::detector::fft::FftDetector;
use crate::detector::internals::PitchResult;
use crate::detector::mcleod::McLeodDetector;
use crate::detector::yin::YinDetector;
use crate::detector::PitchDetector;
use crate::float::Float;

/// Tuning constants of the routing heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridConfig<T>
where
    T: Float,
{
    /// Frequency of the low-band Goertzel probe in Hz.
    pub frequency_range_low: T,
    /// Frequency of the high-band Goertzel probe in Hz.
    pub frequency_range_high: T,
    /// Low-band energy above which YIN is preferred.
    pub threshold_low_frequency_energy: T,
    /// High-band energy above which the FFT detector is preferred.
    pub threshold_high_frequency_energy: T,
}

impl<T> Default for HybridConfig<T>
where
    T: Float,
{
    fn default() -> Self {
        HybridConfig {
            frequency_range_low: T::from_f64(275.0).unwrap(),
            frequency_range_high: T::from_f64(900.0).unwrap(),
            threshold_low_frequency_energy: T::from_f64(750.0).unwrap(),
            threshold_high_frequency_energy: T::from_f64(400.0).unwrap(),
        }
    }
}

pub struct HybridDetector<T>
where
    T: Float,
{
    config: DetectorConfig<T>,
    hybrid: HybridConfig<T>,
}

impl<T> HybridDetector<T>
where
    T: Float,
{
    pub fn new(config: DetectorConfig<T>) -> Self {
        HybridDetector::with_hybrid_config(config, HybridConfig::default())
    }

    pub fn with_hybrid_config(config: DetectorConfig<T>, hybrid: HybridConfig<T>) -> Self {
        HybridDetector { config, hybrid }
    }

    pub fn config(&self) -> &DetectorConfig<T> {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DetectorConfig<T> {
        &mut self.config
    }

    pub fn hybrid_config(&self) -> &HybridConfig<T> {
        &self.hybrid
    }

    pub fn hybrid_config_mut(&mut self) -> &mut HybridConfig<T> {
        &mut self.hybrid
    }
}

impl<T> Default for HybridDetector<T>
where
    T: Float,
{
    fn default() -> Self {
        HybridDetector::new(DetectorConfig::default())
    }
}

impl<T> PitchDetector<T> for HybridDetector<T>
where
    T: Float,
{
    fn detect_pitch(&self, signal: &[T], sample_rate: usize) -> PitchResult<T> {
        if is_likely_noise(signal) {
            debug!("hybrid: buffer classified as noise");
            return PitchResult::no_pitch();
        }

        // The child detectors are stateless; constructing them per call
        // keeps configuration changes on this detector effective
        // immediately.
        let yin = YinDetector::new(self.config);
        let mcleod = McLeodDetector::new(self.config);

        let low_energy = goertzel_energy(signal, self.hybrid.frequency_range_low, sample_rate);
        if low_energy > self.hybrid.threshold_low_frequency_energy {
            debug!("hybrid: low-band energy {low_energy}, preferring YIN");
            let result = yin.detect_pitch(signal, sample_rate);
            if result.has_pitch() {
                return result;
            }
        } else {
            let high_energy =
                goertzel_energy(signal, self.hybrid.frequency_range_high, sample_rate);
            if high_energy > self.hybrid.threshold_high_frequency_energy {
                debug!("hybrid: high-band energy {high_energy}, preferring FFT");
                let result = FftDetector::new(self.config).detect_pitch(signal, sample_rate);
                if result.has_pitch() {
                    return result;
                }
            }
            let result = mcleod.detect_pitch(signal, sample_rate);
            if result.has_pitch() {
                return result;
            }
        }

        // Last resort before giving up.
        let result = yin.detect_pitch(signal, sample_rate);
        if result.has_pitch() {
            return result;
        }

        PitchResult::no_pitch()
    }
}

/// Noise gate: a buffer whose sample distribution varies wildly around its
/// mean *and* crosses zero on nearly every other sample carries no usable
/// periodicity.
fn is_likely_noise<T: Float>(signal: &[T]) -> bool {
    if signal.len() < 2 {
        return false;
    }

    let n = T::from_usize(signal.len()).unwrap();
    let mean = signal.iter().copied().sum::<T>() / n;
    let variance = signal
        .iter()
        .map(|&s| (s - mean) * (s - mean))
        .sum::<T>()
        / n;
    let std_dev = variance.sqrt();

    let epsilon = T::from_f64(1e-10).unwrap();
    let variation = std_dev / (mean + epsilon);

    // |std / mean| > 5 together with a high crossing rate marks noise.
    let gate = T::from_f64(5.0).unwrap();
    (variation > gate || variation < -gate)
        && zero_crossing_rate(signal) > T::from_f64(0.4).unwrap()
}

/// Fraction of consecutive sample pairs whose signs differ.
fn zero_crossing_rate<T: Float>(signal: &[T]) -> T {
    let crossings = signal
        .windows(2)
        .filter(|pair| (pair[0] >= T::zero()) != (pair[1] >= T::zero()))
        .count();
    T::from_usize(crossings).unwrap() / T::from_usize(signal.len()).unwrap()
}

/// Signal energy at a single frequency via the Goertzel recurrence.
pub fn goertzel_energy<T: Float>(signal: &[T], frequency: T, sample_rate: usize) -> T {
    let omega = 2.0 * std::f64::consts::PI * frequency.to_f64().unwrap() / sample_rate as f64;
    let coeff = T::from_f64(2.0 * omega.cos()).unwrap();

    let mut q1 = T::zero();
    let mut q2 = T::zero();
    for &sample in signal {
        let q0 = coeff * q1 - q2 + sample;
        q2 = q1;
        q1 = q0;
    }

    q1 * q1 + q2 * q2 - coeff * q1 * q2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pseudo_noise(len: usize) -> Vec<f64> {
        // Deterministic LCG so the test is reproducible.
        let mut state: u64 = 0x2545F491;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                (state >> 33) as f64 / (1u64 << 30) as f64 - 1.0
            })
            .collect()
    }

    fn sine(freq: f64, len: usize, sample_rate: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin())
            .collect()
    }

    #[test]
    fn goertzel_energy_concentrates_at_the_probed_frequency() {
        let signal = sine(275.0, 4096, 44100);
        let on_target = goertzel_energy(&signal, 275.0, 44100);
        let off_target = goertzel_energy(&signal, 2000.0, 44100);
        assert!(on_target > 750.0);
        assert!(on_target > off_target * 100.0);
    }

    #[test]
    fn white_noise_trips_the_gate() {
        assert!(is_likely_noise(&pseudo_noise(4096)));
    }

    #[test]
    fn a_tone_does_not_trip_the_gate() {
        // Zero-mean tone: huge coefficient of variation, but the zero
        // crossing rate stays far below the 0.4 gate.
        assert!(!is_likely_noise(&sine(440.0, 4096, 44100)));
    }

    #[test]
    fn silence_does_not_trip_the_gate() {
        let signal = vec![0.0_f64; 1024];
        assert!(!is_likely_noise(&signal));
    }

    #[test]
    fn zero_crossing_rate_of_alternating_signal_is_high() {
        let signal: Vec<f64> = (0..64).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!(zero_crossing_rate(&signal) > 0.9);
    }
}
