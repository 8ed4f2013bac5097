//! Analysis windows applied before transform-based analysis to reduce
//! spectral leakage.

use std::f64::consts::PI;

use crate::float::Float;

/// Blackman-Harris 4-term coefficients.
const BH_A0: f64 = 0.35875;
const BH_A1: f64 = 0.48829;
const BH_A2: f64 = 0.14128;
const BH_A3: f64 = 0.01168;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFunction {
    /// Raised cosine; moderate leakage suppression, narrow main lobe.
    Hann,
    /// 4-term Blackman-Harris; strong sidelobe suppression for spectral
    /// peak picking.
    BlackmanHarris,
}

impl WindowFunction {
    /// Window weight for sample `i` of a length-`n` window. Callers
    /// guarantee `n > 1`.
    pub fn coefficient<T: Float>(&self, i: usize, n: usize) -> T {
        let theta = 2.0 * PI * i as f64 / (n - 1) as f64;
        let w = match self {
            WindowFunction::Hann => 0.5 * (1.0 - theta.cos()),
            WindowFunction::BlackmanHarris => {
                BH_A0 - BH_A1 * theta.cos() + BH_A2 * (2.0 * theta).cos()
                    - BH_A3 * (3.0 * theta).cos()
            }
        };
        T::from_f64(w).unwrap()
    }

    /// Point-wise multiplication of `buffer` with this window.
    pub fn apply<T: Float>(&self, buffer: &mut [T]) {
        let n = buffer.len();
        if n < 2 {
            return;
        }
        for (i, value) in buffer.iter_mut().enumerate() {
            *value = *value * self.coefficient(i, n);
        }
    }
}
