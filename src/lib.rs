//! # reed-pitch
//! *reed_pitch* estimates the musical pitch content of a buffered audio
//! signal in real time. It implements several monophonic detectors, a
//! hybrid selector that routes each buffer to the best-suited algorithm,
//! and a spectral chord detector for polyphonic input. The default
//! frequency range covers a harmonica with margin, and every bound is
//! configurable per detector instance.
//!
//! # Detectors
//! A *detector* is an implementation of a pitch detection algorithm. Each
//! detector's tolerance for noise and polyphonic sounds varies.
//!
//!   * [YinDetector][detector::yin] — autocorrelation-difference based,
//!     strongest at low frequencies
//!   * [McLeodDetector][detector::mcleod] — NSDF based (McLeod Pitch Method)
//!   * [FftDetector][detector::fft] — spectral peak picking with harmonic
//!     validation, strongest at high frequencies
//!   * [HybridDetector][detector::hybrid] — routes between the three above
//!   * [ChordDetector][detector::chord] — polyphonic, up to four pitches
//!
//! Detection never fails with an error: silence, noise, and degenerate
//! buffers all yield a result with the no-pitch sentinel (or an empty
//! pitch list) and zero confidence.
//!
//! # Examples
//! ```
//! use reed_pitch::config::DetectorConfig;
//! use reed_pitch::detector::yin::YinDetector;
//! use reed_pitch::detector::PitchDetector;
//!
//! const SAMPLE_RATE: usize = 44100;
//! const SIZE: usize = 4096;
//!
//! // Signal coming from some source (microphone, generated, etc...)
//! let freq = 440.0;
//! let dt = 1.0 / SAMPLE_RATE as f64;
//! let signal: Vec<f64> = (0..SIZE)
//!     .map(|x| (2.0 * std::f64::consts::PI * x as f64 * dt * freq).sin())
//!     .collect();
//!
//! let detector = YinDetector::new(DetectorConfig::default());
//! let result = detector.detect_pitch(&signal, SAMPLE_RATE);
//!
//! assert!(result.has_pitch());
//! assert!((result.pitch - freq).abs() / freq < 0.01);
//! println!("Frequency: {}, Confidence: {}", result.pitch, result.confidence);
//! ```

pub use config::DetectorConfig;
pub use detector::internals::{ChordResult, PitchResult, NO_DETECTED_PITCH};

pub mod config;
pub mod detector;
pub mod float;
pub mod utils;
