use super::scaled::{
    MassScale,
    ScaledMass,
};

/// Fraction of the fragment error inside which a match is considered exact.
pub const NARROW_BAND_FACTOR: f64 = 0.95;
/// Fraction of the fragment error past which peaks are not even looked at.
pub const WIDE_BAND_FACTOR: f64 = 1.5;

/// Fragment tolerance bands derived from the fragment-error parameter.
///
/// Example:
/// ```
/// use novoscore::mass::{FragmentTolerance, MassScale, ScaledMass};
///
/// let tol = FragmentTolerance::new(0.4, &MassScale::new(100).unwrap());
/// assert_eq!(tol.narrow, ScaledMass(38));
/// assert_eq!(tol.wide, ScaledMass(60));
/// assert_eq!(tol.match_confidence(ScaledMass(10_000), ScaledMass(10_030), 0.0), 1.0);
/// assert_eq!(tol.match_confidence(ScaledMass(10_000), ScaledMass(10_090), 0.0), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentTolerance {
    pub error: ScaledMass,
    pub narrow: ScaledMass,
    pub wide: ScaledMass,
}

impl FragmentTolerance {
    pub fn new(fragment_error_da: f64, scale: &MassScale) -> Self {
        let error = scale.scale(fragment_error_da);
        let narrow = scale.scale(fragment_error_da * NARROW_BAND_FACTOR);
        let mut wide = scale.scale(fragment_error_da * WIDE_BAND_FACTOR);
        if wide <= narrow {
            wide = narrow + ScaledMass(1);
        }
        Self {
            error,
            narrow,
            wide,
        }
    }

    /// Inclusive search window around a calculated mass.
    pub fn window(&self, calculated: ScaledMass) -> (ScaledMass, ScaledMass) {
        (calculated - self.wide, calculated + self.wide)
    }

    /// Confidence in [0, 1] that `observed` is the ion at `calculated`.
    ///
    /// Exact within the narrow band, zero outside the wide band and a
    /// gaussian decay in between. Never returns less than `prior`, the
    /// confidence already recorded for the peak.
    pub fn match_confidence(&self, observed: ScaledMass, calculated: ScaledMass, prior: f32) -> f32 {
        let delta = (observed - calculated).abs();
        let conf = if delta <= self.narrow {
            1.0
        } else if delta > self.wide {
            0.0
        } else {
            let sigma = (self.wide - self.narrow).raw() as f32 / 2.0;
            let x = (delta - self.narrow).raw() as f32 / sigma;
            (-0.5 * x * x).exp()
        };
        conf.max(prior)
    }
}

/// Tolerance on the intact peptide mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeptideTolerance {
    pub error: ScaledMass,
}

impl PeptideTolerance {
    pub fn new(peptide_error_da: f64, scale: &MassScale) -> Self {
        Self {
            error: scale.scale(peptide_error_da),
        }
    }

    pub fn contains(&self, target: ScaledMass, observed: ScaledMass) -> bool {
        (target - observed).abs() <= self.error
    }
}
