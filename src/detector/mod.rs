use crate::detector::internals::{ChordResult, PitchResult};
use crate::float::Float;

pub mod chord;
pub mod fft;
pub mod hybrid;
pub mod internals;
pub mod mcleod;
pub mod yin;

/// A monophonic pitch detector: a pure function of the buffer, the sample
/// rate, and the detector's configured frequency range.
pub trait PitchDetector<T>
where
    T: Float,
{
    fn detect_pitch(&self, signal: &[T], sample_rate: usize) -> PitchResult<T>;
}

/// A polyphonic detector estimating several simultaneous fundamentals.
pub trait PolyphonicDetector<T>
where
    T: Float,
{
    fn detect_chord(&self, signal: &[T], sample_rate: usize) -> ChordResult<T>;
}
