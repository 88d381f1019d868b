//! Radix-2 FFT and FFT-based cross-correlation of real signals.

use crate::errors::DataProcessingError;
use std::f64::consts::PI;
use std::ops::{
    Add,
    Mul,
    Sub,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.re * factor, self.im * factor)
    }

    /// Multiplication by `-i`.
    fn rotate_neg_i(self) -> Self {
        Self::new(self.im, -self.re)
    }
}

impl Add for Complex {
    type Output = Complex;
    fn add(self, rhs: Self) -> Self::Output {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Complex;
    fn sub(self, rhs: Self) -> Self::Output {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Complex;
    fn mul(self, rhs: Self) -> Self::Output {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

/// In-place iterative radix-2 transform. The inverse is not scaled by `1/N`.
///
/// ```
/// use novoscore::utils::fft::{Complex, fft_in_place};
///
/// let mut buf = vec![Complex::new(1.0, 0.0), Complex::ZERO, Complex::ZERO, Complex::ZERO];
/// fft_in_place(&mut buf, false).unwrap();
/// assert!(buf.iter().all(|c| (c.re - 1.0).abs() < 1e-12 && c.im.abs() < 1e-12));
/// ```
pub fn fft_in_place(buf: &mut [Complex], inverse: bool) -> Result<(), DataProcessingError> {
    let n = buf.len();
    if !n.is_power_of_two() {
        return Err(DataProcessingError::InvalidParameter {
            name: "fft_length",
            value: n.to_string(),
        });
    }
    if n == 1 {
        return Ok(());
    }

    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if j > i {
            buf.swap(i, j);
        }
    }

    let sign = if inverse { 1.0 } else { -1.0 };
    let mut len = 2;
    while len <= n {
        let angle = sign * 2.0 * PI / len as f64;
        let step = Complex::new(angle.cos(), angle.sin());
        for chunk in buf.chunks_exact_mut(len) {
            let (lo, hi) = chunk.split_at_mut(len / 2);
            let mut w = Complex::new(1.0, 0.0);
            for (a, b) in lo.iter_mut().zip(hi.iter_mut()) {
                let t = w * *b;
                *b = *a - t;
                *a = *a + t;
                w = w * step;
            }
        }
        len <<= 1;
    }
    Ok(())
}

/// Circular cross-correlation `out[l] = sum_n x[n] * y[(n + l) % N]`.
///
/// Both real inputs are packed into a single complex transform and split
/// apart again using conjugate symmetry. `scratch` is reused between calls.
pub fn cross_correlate(
    x: &[f64],
    y: &[f64],
    scratch: &mut Vec<Complex>,
    out: &mut Vec<f64>,
) -> Result<(), DataProcessingError> {
    let n = x.len();
    if n != y.len() || n == 0 {
        return Err(DataProcessingError::InvalidParameter {
            name: "cross_correlation_lengths",
            value: format!("{} vs {}", n, y.len()),
        });
    }

    scratch.clear();
    scratch.extend(x.iter().zip(y.iter()).map(|(a, b)| Complex::new(*a, *b)));
    fft_in_place(scratch, false)?;

    // Z = X + iY, so X[k] = (Z[k] + conj(Z[N-k])) / 2 and
    // Y[k] = -i (Z[k] - conj(Z[N-k])) / 2.
    // Pairs (k, N-k) are handled together so the transform can be
    // overwritten with conj(X)Y in place.
    let half = n / 2;
    for k in 0..=half {
        let nk = (n - k) % n;
        let zk = scratch[k];
        let znk = scratch[nk];
        let xk = (zk + znk.conj()).scale(0.5);
        let yk = (zk - znk.conj()).rotate_neg_i().scale(0.5);
        let xnk = (znk + zk.conj()).scale(0.5);
        let ynk = (znk - zk.conj()).rotate_neg_i().scale(0.5);
        scratch[k] = xk.conj() * yk;
        scratch[nk] = xnk.conj() * ynk;
    }

    fft_in_place(scratch, true)?;
    let norm = 1.0 / n as f64;
    out.clear();
    out.extend(scratch.iter().map(|c| c.re * norm));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(x: &[f64], y: &[f64]) -> Vec<f64> {
        let n = x.len();
        (0..n)
            .map(|l| (0..n).map(|i| x[i] * y[(i + l) % n]).sum())
            .collect()
    }

    #[test]
    fn test_matches_naive_correlation() {
        let x = [1.0, 3.0, 0.0, 2.0, 5.0, 0.0, 0.0, 1.0];
        let y = [0.0, 1.0, 3.0, 0.0, 2.0, 5.0, 0.0, 0.0];
        let mut scratch = Vec::new();
        let mut out = Vec::new();
        cross_correlate(&x, &y, &mut scratch, &mut out).unwrap();
        for (a, b) in out.iter().zip(naive(&x, &y).iter()) {
            assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
        }
        // y is x shifted by one bin.
        let best = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap()
            .0;
        assert_eq!(best, 1);
    }

    #[test]
    fn test_autocorrelation_peaks_at_zero_lag() {
        let x: Vec<f64> = (0..64).map(|i| ((i * 7919) % 13) as f64).collect();
        let mut scratch = Vec::new();
        let mut out = Vec::new();
        cross_correlate(&x, &x, &mut scratch, &mut out).unwrap();
        let zero = out[0];
        assert!(out[1..].iter().all(|v| *v <= zero + 1e-9));
        let energy: f64 = x.iter().map(|v| v * v).sum();
        assert!((zero - energy).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let mut buf = vec![Complex::ZERO; 6];
        assert!(fft_in_place(&mut buf, false).is_err());
        let mut scratch = Vec::new();
        let mut out = Vec::new();
        assert!(cross_correlate(&[1.0, 2.0], &[1.0], &mut scratch, &mut out).is_err());
    }
}
