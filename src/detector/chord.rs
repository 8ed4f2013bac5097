//! Spectral chord detector.
//!
//! Estimates up to four simultaneous fundamentals from one buffer. The
//! pipeline: Hann window and FFT, a spectral-flatness gate against
//! noise-like input, peak picking on the normalized magnitude spectrum,
//! harmonic/overtone filtering (octaves exempt), prioritization of lower
//! fundamentals over comparable-strength harmonics, and merging of peaks
//! closer than the minimum pitch distance.

use log::debug;

use crate::config::DetectorConfig;
use crate::detector::internals::{ChordResult, PitchResult};
use crate::detector::{PitchDetector, PolyphonicDetector};
use crate::float::Float;
use crate::utils::spectrum::{frequency_resolution, magnitude_spectrum};
use crate::utils::window::WindowFunction;

/// Minimum transform size for chord analysis.
const MIN_FFT_SIZE: usize = 1024;

/// Normalized magnitude below which spectrum maxima are ignored.
const PEAK_THRESHOLD: f64 = 0.05;

/// Peaks closer than this are merged into one pitch.
const MIN_PEAK_DISTANCE_HZ: f64 = 25.0;

/// Upper bound on the number of reported pitches.
const MAX_PITCHES: usize = 4;

/// Spectral flatness above which the buffer is treated as noise.
const SPECTRAL_FLATNESS_THRESHOLD: f64 = 0.4;

/// Relative tolerance for frequency ratios counted as harmonic.
const HARMONIC_TOLERANCE: f64 = 0.05;

/// A candidate pitch: one spectrum peak. Never escapes this module.
#[derive(Debug, Clone, Copy)]
struct SpectralPeak {
    frequency: f64,
    magnitude: f64,
}

pub struct ChordDetector<T>
where
    T: Float,
{
    config: DetectorConfig<T>,
}

impl<T> ChordDetector<T>
where
    T: Float,
{
    pub fn new(config: DetectorConfig<T>) -> Self {
        ChordDetector { config }
    }

    pub fn config(&self) -> &DetectorConfig<T> {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DetectorConfig<T> {
        &mut self.config
    }
}

impl<T> Default for ChordDetector<T>
where
    T: Float,
{
    fn default() -> Self {
        ChordDetector::new(DetectorConfig::default())
    }
}

impl<T> PolyphonicDetector<T> for ChordDetector<T>
where
    T: Float,
{
    fn detect_chord(&self, signal: &[T], sample_rate: usize) -> ChordResult<T> {
        let spectrum: Vec<f64> = magnitude_spectrum(signal, WindowFunction::Hann, MIN_FFT_SIZE)
            .iter()
            .map(|m| m.to_f64().unwrap())
            .collect();
        let fft_size = spectrum.len() * 2;
        let resolution: f64 = frequency_resolution(sample_rate, fft_size);

        let min_frequency = self.config.min_frequency.to_f64().unwrap();
        let max_frequency = self.config.max_frequency.to_f64().unwrap();

        let flatness = spectral_flatness(&spectrum, sample_rate, min_frequency, max_frequency);
        if flatness > SPECTRAL_FLATNESS_THRESHOLD {
            debug!("chord: spectral flatness {flatness:.4} above gate, treating as noise");
            return ChordResult::empty();
        }

        let max_magnitude = spectrum.iter().cloned().fold(0.0_f64, f64::max);
        if max_magnitude <= 0.0 {
            return ChordResult::empty();
        }
        let normalized: Vec<f64> = spectrum.iter().map(|m| m / max_magnitude).collect();

        let mut peaks = find_peaks(&normalized, resolution);
        debug!("chord: {} raw peaks", peaks.len());

        peaks.retain(|p| p.frequency >= min_frequency && p.frequency <= max_frequency);
        debug!("chord: {} peaks in band", peaks.len());

        let peaks = filter_harmonics(peaks);
        debug!("chord: {} peaks after harmonic filtering", peaks.len());

        let peaks = prioritize_lower_frequencies(peaks);
        let mut peaks = merge_peaks(peaks);
        debug!("chord: {} peaks after prioritization and merging", peaks.len());

        if peaks.is_empty() {
            return ChordResult::empty();
        }

        // Confidence reflects every retained peak, including any dropped by
        // the pitch-count cap below.
        let confidence =
            peaks.iter().map(|p| p.magnitude).sum::<f64>() / peaks.len() as f64;

        peaks.truncate(MAX_PITCHES);
        let pitches = peaks
            .iter()
            .map(|p| T::from_f64(p.frequency).unwrap())
            .collect();

        ChordResult::new(pitches, T::from_f64(confidence).unwrap())
    }
}

/// Dominant-pitch compatibility path: the strongest chord tone as a
/// monophonic result.
impl<T> PitchDetector<T> for ChordDetector<T>
where
    T: Float,
{
    fn detect_pitch(&self, signal: &[T], sample_rate: usize) -> PitchResult<T> {
        let chord = self.detect_chord(signal, sample_rate);
        match chord.pitch(0) {
            Some(pitch) => PitchResult::new(pitch, chord.confidence),
            None => PitchResult::no_pitch(),
        }
    }
}

/// Ratio of geometric to arithmetic mean over the configured band; near 0
/// for tonal sound, near 1 for noise.
fn spectral_flatness(
    spectrum: &[f64],
    sample_rate: usize,
    min_frequency: f64,
    max_frequency: f64,
) -> f64 {
    let nyquist = sample_rate as f64 / 2.0;
    let start_bin = ((min_frequency * spectrum.len() as f64 / nyquist) as usize).max(1);
    let end_bin = ((max_frequency * spectrum.len() as f64 / nyquist) as usize)
        .min(spectrum.len().saturating_sub(1));

    if end_bin < start_bin {
        return 1.0;
    }

    let count = end_bin - start_bin + 1;
    let mut sum = 0.0;
    let mut log_sum = 0.0;
    for &magnitude in &spectrum[start_bin..=end_bin] {
        let value = magnitude + 1e-10;
        sum += value;
        log_sum += value.ln();
    }

    if sum == 0.0 {
        return 1.0;
    }

    let arithmetic_mean = sum / count as f64;
    let geometric_mean = (log_sum / count as f64).exp();
    geometric_mean / arithmetic_mean
}

/// Strict local maxima above [PEAK_THRESHOLD], strongest first.
fn find_peaks(spectrum: &[f64], resolution: f64) -> Vec<SpectralPeak> {
    let mut peaks = Vec::new();
    for i in 1..spectrum.len().saturating_sub(1) {
        if spectrum[i] > PEAK_THRESHOLD
            && spectrum[i] > spectrum[i - 1]
            && spectrum[i] > spectrum[i + 1]
        {
            peaks.push(SpectralPeak {
                frequency: i as f64 * resolution,
                magnitude: spectrum[i],
            });
        }
    }
    peaks.sort_by(|a, b| b.magnitude.partial_cmp(&a.magnitude).unwrap());
    peaks
}

/// Drop peaks that look like overtones of an already-accepted stronger
/// peak. Octaves (ratio within 10% of 2.0) always pass; ratios above 5 are
/// treated as independent tones.
fn filter_harmonics(peaks: Vec<SpectralPeak>) -> Vec<SpectralPeak> {
    let mut accepted: Vec<SpectralPeak> = Vec::with_capacity(peaks.len());

    for peak in peaks {
        let mut is_harmonic = false;

        for reference in &accepted {
            let ratio = peak.frequency / reference.frequency;

            if (ratio - 2.0).abs() < 0.1 {
                continue;
            }
            if (ratio - ratio.round()).abs() < HARMONIC_TOLERANCE && ratio.round() >= 2.0 {
                if ratio > 5.0 {
                    continue;
                }
                if peak.magnitude < reference.magnitude * 0.3 {
                    is_harmonic = true;
                    break;
                }
            }
        }

        if !is_harmonic {
            accepted.push(peak);
        }
    }

    accepted
}

/// Reorder by ascending frequency and drop peaks much weaker than an
/// already-accepted lower-frequency peak.
fn prioritize_lower_frequencies(mut peaks: Vec<SpectralPeak>) -> Vec<SpectralPeak> {
    peaks.sort_by(|a, b| a.frequency.partial_cmp(&b.frequency).unwrap());

    let mut prioritized: Vec<SpectralPeak> = Vec::with_capacity(peaks.len());
    for peak in peaks {
        let overridden = prioritized.iter().any(|lower| {
            peak.frequency > lower.frequency && peak.magnitude < lower.magnitude * 0.6
        });
        if !overridden {
            prioritized.push(peak);
        }
    }

    prioritized
}

/// Merge consecutive peaks closer than [MIN_PEAK_DISTANCE_HZ] via a
/// magnitude-weighted frequency average, summing their magnitudes.
/// Expects frequency-ascending input.
fn merge_peaks(peaks: Vec<SpectralPeak>) -> Vec<SpectralPeak> {
    let mut iter = peaks.into_iter();
    let mut current = match iter.next() {
        Some(peak) => peak,
        None => return Vec::new(),
    };

    let mut merged = Vec::new();
    for next in iter {
        if (next.frequency - current.frequency).abs() < MIN_PEAK_DISTANCE_HZ {
            let total = current.magnitude + next.magnitude;
            current = SpectralPeak {
                frequency: (current.frequency * current.magnitude
                    + next.frequency * next.magnitude)
                    / total,
                magnitude: total,
            };
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);

    merged
}
