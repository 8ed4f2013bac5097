//! Spectral-peak pitch detector.
//!
//! The signal is windowed with a Blackman-Harris window, zero-padded to at
//! least 2048 points, and transformed; the strongest qualifying peak of the
//! magnitude spectrum inside the configured band is taken as the pitch.
//! Detection around the 300 Hz hand-off boundary uses a stricter peak test
//! in a ±25 Hz transition band, while peaks above the boundary get a
//! relaxed threshold. Candidate fundamentals are validated against their
//! harmonic series before being reported.

use crate::config::DetectorConfig;
use crate::detector::internals::PitchResult;
use crate::detector::PitchDetector;
use crate::float::Float;
use crate::utils::peak::parabolic_interpolation;
use crate::utils::spectrum::{frequency_resolution, magnitude_spectrum};
use crate::utils::window::WindowFunction;

/// Minimum transform size, for adequate frequency resolution.
const MIN_FFT_SIZE: usize = 2048;

/// Absolute floor of the dynamic peak threshold.
const DEFAULT_PEAK_THRESHOLD: f64 = 0.1;

/// Boundary between the low band (strict harmonic validation) and the
/// high band (relaxed validation).
const HIGH_FREQ_THRESHOLD: f64 = 300.0;

/// Half-width of the transition band around [HIGH_FREQ_THRESHOLD] in Hz.
const TRANSITION_BAND_HZ: f64 = 25.0;

pub struct FftDetector<T>
where
    T: Float,
{
    config: DetectorConfig<T>,
}

impl<T> FftDetector<T>
where
    T: Float,
{
    pub fn new(config: DetectorConfig<T>) -> Self {
        FftDetector { config }
    }

    pub fn config(&self) -> &DetectorConfig<T> {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DetectorConfig<T> {
        &mut self.config
    }
}

impl<T> Default for FftDetector<T>
where
    T: Float,
{
    fn default() -> Self {
        FftDetector::new(DetectorConfig::default())
    }
}

impl<T> PitchDetector<T> for FftDetector<T>
where
    T: Float,
{
    fn detect_pitch(&self, signal: &[T], sample_rate: usize) -> PitchResult<T> {
        let spectrum = magnitude_spectrum(signal, WindowFunction::BlackmanHarris, MIN_FFT_SIZE);
        let fft_size = spectrum.len() * 2;
        let resolution: f64 = frequency_resolution(sample_rate, fft_size);

        let average_magnitude = average(&spectrum);

        // A band reaching past 300 Hz has more, weaker peaks to catch, so
        // the bar is lowered.
        let max_frequency = self.config.max_frequency.to_f64().unwrap();
        let multiplier = if max_frequency > HIGH_FREQ_THRESHOLD {
            1.2
        } else {
            1.5
        };
        let dynamic_threshold = (average_magnitude * multiplier).max(DEFAULT_PEAK_THRESHOLD);

        let peak_bin = match self.find_peak_bin(&spectrum, dynamic_threshold, resolution) {
            Some(bin) => bin,
            None => return PitchResult::no_pitch(),
        };

        let spectrum_f64: Vec<f64> = spectrum.iter().map(|m| m.to_f64().unwrap()).collect();
        let refined_bin = parabolic_interpolation(&spectrum_f64, peak_bin);
        let frequency = refined_bin * resolution;
        if frequency < self.config.min_frequency.to_f64().unwrap() || frequency > max_frequency {
            return PitchResult::no_pitch();
        }

        let fundamental = peak_bin as f64 * resolution;
        if fundamental < HIGH_FREQ_THRESHOLD {
            // A very low configured bound means the caller wants rough
            // low-frequency estimates; skip the strict validation there.
            let strict = self.config.min_frequency.to_f64().unwrap() >= 100.0;
            if strict && !validate_low_band_harmonics(&spectrum_f64, peak_bin) {
                return PitchResult::no_pitch();
            }
        } else if !validate_high_band_harmonics(&spectrum_f64, peak_bin) {
            return PitchResult::no_pitch();
        }

        let snr = spectrum_f64[peak_bin] / (average_magnitude + 1e-10);
        let confidence = (snr / 10.0).min(1.0);

        PitchResult::new(
            T::from_f64(frequency).unwrap(),
            T::from_f64(confidence).unwrap(),
        )
    }
}

impl<T> FftDetector<T>
where
    T: Float,
{
    /// Strongest local peak above the (band-dependent) threshold, restricted
    /// to bins covering the configured frequency range.
    fn find_peak_bin(&self, spectrum: &[T], threshold: f64, resolution: f64) -> Option<usize> {
        let min_bin = (self.config.min_frequency.to_f64().unwrap() / resolution).ceil() as usize;
        let max_bin = (self.config.max_frequency.to_f64().unwrap() / resolution).floor() as usize;

        let high_freq_bin = (HIGH_FREQ_THRESHOLD / resolution).ceil() as usize;
        let transition_low_bin =
            ((HIGH_FREQ_THRESHOLD - TRANSITION_BAND_HZ) / resolution).ceil() as usize;
        let transition_high_bin =
            ((HIGH_FREQ_THRESHOLD + TRANSITION_BAND_HZ) / resolution).ceil() as usize;

        let mut max_value = f64::NEG_INFINITY;
        let mut peak_bin = None;

        for i in min_bin.max(1)..max_bin.min(spectrum.len().saturating_sub(1)) {
            let magnitude = spectrum[i].to_f64().unwrap();

            let effective_threshold = if i >= high_freq_bin {
                threshold * 0.5
            } else if i >= transition_low_bin && i <= transition_high_bin {
                threshold * 0.7
            } else {
                threshold
            };

            let is_local_peak = magnitude > effective_threshold
                && magnitude > spectrum[i - 1].to_f64().unwrap()
                && magnitude > spectrum[i + 1].to_f64().unwrap();

            let in_transition_band = i >= transition_low_bin && i <= transition_high_bin;
            let qualifies = if in_transition_band {
                // The YIN/FFT hand-off region is prone to false positives;
                // also require dominance over the bins two positions away.
                is_local_peak
                    && (i <= 1 || magnitude > spectrum[i - 2].to_f64().unwrap() * 0.8)
                    && (i >= spectrum.len() - 2
                        || magnitude > spectrum[i + 2].to_f64().unwrap() * 0.8)
            } else {
                is_local_peak
            };

            if qualifies && magnitude > max_value {
                max_value = magnitude;
                peak_bin = Some(i);
            }
        }

        peak_bin
    }
}

fn average(spectrum: &[impl Float]) -> f64 {
    if spectrum.is_empty() {
        return 0.0;
    }
    spectrum.iter().map(|m| m.to_f64().unwrap()).sum::<f64>() / spectrum.len() as f64
}

/// Validation for fundamentals below 300 Hz: reject when a strong
/// sub-harmonic suggests the peak is itself a harmonic, then require a
/// majority of the 2nd..4th harmonics to be present.
fn validate_low_band_harmonics(spectrum: &[f64], peak_bin: usize) -> bool {
    let peak = spectrum[peak_bin];

    if peak_bin >= 4 {
        if spectrum[peak_bin / 2] > peak * 0.7 {
            return false;
        }
        if spectrum[peak_bin / 3] > peak * 0.6 {
            return false;
        }
    }

    let mut valid_harmonics = 0;
    let mut total_harmonics = 0;
    for harmonic in 2..=4usize {
        let bin = peak_bin * harmonic;
        if bin >= spectrum.len() {
            break;
        }
        total_harmonics += 1;
        // 0.2 for the 2nd, 0.1 for the 3rd, 0.067 for the 4th.
        let threshold = 0.2 / (harmonic - 1) as f64;
        if spectrum[bin] >= peak * threshold {
            valid_harmonics += 1;
        }
    }

    total_harmonics > 0 && valid_harmonics as f64 >= total_harmonics as f64 / 2.0
}

/// Validation for fundamentals at or above 300 Hz: a 2nd harmonic at 15%
/// of the peak is enough; pure tones without harmonics pass via the
/// prominence test instead.
fn validate_high_band_harmonics(spectrum: &[f64], peak_bin: usize) -> bool {
    let harmonic_bin = peak_bin * 2;
    if harmonic_bin < spectrum.len() && spectrum[harmonic_bin] >= spectrum[peak_bin] * 0.15 {
        return true;
    }
    is_peak_prominent(spectrum, peak_bin)
}

/// A peak is prominent when it stands at least 3x above the average of a
/// ±10-bin neighborhood, the two nearest bins on each side excluded.
fn is_peak_prominent(spectrum: &[f64], peak_bin: usize) -> bool {
    const WINDOW: usize = 10;

    let start = peak_bin.saturating_sub(WINDOW);
    let end = (peak_bin + WINDOW).min(spectrum.len() - 1);

    let mut sum = 0.0;
    let mut count = 0;
    for (i, &magnitude) in spectrum.iter().enumerate().take(end + 1).skip(start) {
        if i.abs_diff(peak_bin) > 2 {
            sum += magnitude;
            count += 1;
        }
    }

    let average = if count > 0 { sum / count as f64 } else { 0.0 };
    spectrum[peak_bin] > average * 3.0
}
