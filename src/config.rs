//! Detector configuration.
//!
//! The frequency range is owned by the caller and handed to each detector at
//! construction, so detectors on different threads can run with different
//! ranges without sharing mutable state.

use crate::float::Float;

/// Default lower bound of the detectable range in Hz.
pub const DEFAULT_MIN_FREQUENCY: f64 = 80.0;

/// Default upper bound of the detectable range in Hz. Covers the playable
/// range of a harmonica with some margin.
pub const DEFAULT_MAX_FREQUENCY: f64 = 4835.0;

/// Frequency bounds applied by every detector.
///
/// The invariant `min_frequency < max_frequency` is not checked here; a
/// degenerate range simply yields no-pitch results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig<T>
where
    T: Float,
{
    /// The minimum frequency that can be detected (in Hz).
    pub min_frequency: T,
    /// The maximum frequency that can be detected (in Hz).
    pub max_frequency: T,
}

impl<T> DetectorConfig<T>
where
    T: Float,
{
    pub fn new(min_frequency: T, max_frequency: T) -> Self {
        DetectorConfig {
            min_frequency,
            max_frequency,
        }
    }
}

impl<T> Default for DetectorConfig<T>
where
    T: Float,
{
    fn default() -> Self {
        DetectorConfig {
            min_frequency: T::from_f64(DEFAULT_MIN_FREQUENCY).unwrap(),
            max_frequency: T::from_f64(DEFAULT_MAX_FREQUENCY).unwrap(),
        }
    }
}
