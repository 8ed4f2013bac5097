use crate::float::Float;

/// Sentinel pitch value reported when no fundamental frequency was found.
/// Results carrying it always have a confidence of `0.0`.
pub const NO_DETECTED_PITCH: f64 = -1.0;

/// The outcome of a monophonic detection call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchResult<T>
where
    T: Float,
{
    /// Detected fundamental frequency in Hz, or [NO_DETECTED_PITCH].
    pub pitch: T,
    /// Reliability of the detection in `[0, 1]`; `0` when no pitch was found.
    pub confidence: T,
}

impl<T> PitchResult<T>
where
    T: Float,
{
    pub fn new(pitch: T, confidence: T) -> Self {
        PitchResult { pitch, confidence }
    }

    /// The "nothing found" result.
    pub fn no_pitch() -> Self {
        PitchResult {
            pitch: T::from_f64(NO_DETECTED_PITCH).unwrap(),
            confidence: T::zero(),
        }
    }

    pub fn has_pitch(&self) -> bool {
        self.pitch > T::zero()
    }
}

/// The outcome of a polyphonic detection call.
///
/// `pitches` is empty for silence and noise. The order follows the chord
/// pipeline's harmonic filtering and merging stages, which leave the
/// surviving peaks sorted by ascending frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordResult<T>
where
    T: Float,
{
    pub pitches: Vec<T>,
    pub confidence: T,
}

impl<T> ChordResult<T>
where
    T: Float,
{
    pub fn new(pitches: Vec<T>, confidence: T) -> Self {
        ChordResult {
            pitches,
            confidence,
        }
    }

    pub fn empty() -> Self {
        ChordResult {
            pitches: Vec::new(),
            confidence: T::zero(),
        }
    }

    pub fn has_pitches(&self) -> bool {
        !self.pitches.is_empty()
    }

    pub fn pitch_count(&self) -> usize {
        self.pitches.len()
    }

    pub fn pitch(&self, index: usize) -> Option<T> {
        self.pitches.get(index).copied()
    }
}

/// Shift `frequency` by `cents` hundredths of a semitone.
pub fn add_cents_to_frequency<T: Float>(cents: f64, frequency: T) -> T {
    T::from_f64((cents / 1200.0).exp2()).unwrap() * frequency
}
