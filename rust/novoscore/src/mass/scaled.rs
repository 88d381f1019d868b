use crate::errors::DataProcessingError;
use serde::{
    Deserialize,
    Serialize,
};
use std::ops::{
    Add,
    AddAssign,
    Neg,
    Sub,
    SubAssign,
};

/// A mass (or m/z) stored as an integer multiple of `1 / multiplier` Da.
///
/// All tolerance comparisons in the scoring core happen on these, so that
/// a value that is inside a band on one pass is inside it on every pass.
/// The multiplier lives in [`MassScale`] and never changes during a run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ScaledMass(pub i32);

impl ScaledMass {
    pub const ZERO: ScaledMass = ScaledMass(0);

    pub fn abs(self) -> Self {
        ScaledMass(self.0.abs())
    }

    pub fn raw(self) -> i32 {
        self.0
    }

    /// Integer division with rounding to nearest, used for multiply charged m/z.
    ///
    /// ```
    /// use novoscore::mass::ScaledMass;
    /// assert_eq!(ScaledMass(1001).div_round(2), ScaledMass(501));
    /// assert_eq!(ScaledMass(1000).div_round(3), ScaledMass(333));
    /// ```
    pub fn div_round(self, divisor: i32) -> Self {
        debug_assert!(divisor > 0);
        let half = divisor / 2;
        if self.0 >= 0 {
            ScaledMass((self.0 + half) / divisor)
        } else {
            ScaledMass((self.0 - half) / divisor)
        }
    }

    pub fn times(self, factor: i32) -> Self {
        ScaledMass(self.0 * factor)
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(ScaledMass)
    }
}

impl Add for ScaledMass {
    type Output = ScaledMass;
    fn add(self, rhs: Self) -> Self::Output {
        ScaledMass(self.0 + rhs.0)
    }
}

impl Sub for ScaledMass {
    type Output = ScaledMass;
    fn sub(self, rhs: Self) -> Self::Output {
        ScaledMass(self.0 - rhs.0)
    }
}

impl AddAssign for ScaledMass {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for ScaledMass {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for ScaledMass {
    type Output = ScaledMass;
    fn neg(self) -> Self::Output {
        ScaledMass(-self.0)
    }
}

impl std::iter::Sum for ScaledMass {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ScaledMass::ZERO, |acc, x| acc + x)
    }
}

/// Largest magnitude, in Da, that [`MassScale::try_scale`] accepts.
pub const MAX_MASS_DA: f64 = 20_000.0;

/// Conversion between Daltons and [`ScaledMass`] for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MassScale {
    multiplier: i32,
}

impl Default for MassScale {
    fn default() -> Self {
        Self { multiplier: 100 }
    }
}

impl MassScale {
    pub fn new(multiplier: i32) -> Result<Self, DataProcessingError> {
        // 1e5 keeps MAX_MASS_DA inside i32.
        if !(1..=100_000).contains(&multiplier) {
            return Err(DataProcessingError::InvalidParameter {
                name: "mass_multiplier",
                value: multiplier.to_string(),
            });
        }
        Ok(Self { multiplier })
    }

    pub fn multiplier(&self) -> i32 {
        self.multiplier
    }

    /// ```
    /// use novoscore::mass::{MassScale, ScaledMass};
    /// let scale = MassScale::new(100).unwrap();
    /// assert_eq!(scale.scale(57.02146), ScaledMass(5702));
    /// assert!((scale.to_da(ScaledMass(5702)) - 57.02).abs() < 1e-9);
    /// ```
    pub fn scale(&self, da: f64) -> ScaledMass {
        debug_assert!(
            da.is_finite() && da.abs() <= MAX_MASS_DA,
            "{da} Da is outside the scaled range"
        );
        ScaledMass((da * self.multiplier as f64).round() as i32)
    }

    /// Like [`MassScale::scale`], for values read from input.
    ///
    /// Returns `None` for anything that is not finite or is heavier than
    /// [`MAX_MASS_DA`], instead of saturating.
    ///
    /// ```
    /// use novoscore::mass::{MassScale, ScaledMass};
    /// let scale = MassScale::new(100_000).unwrap();
    /// assert_eq!(scale.try_scale(1.5), Some(ScaledMass(150_000)));
    /// assert_eq!(scale.try_scale(30_000_000.0), None);
    /// assert_eq!(scale.try_scale(f64::NAN), None);
    /// ```
    pub fn try_scale(&self, da: f64) -> Option<ScaledMass> {
        if !da.is_finite() || da.abs() > MAX_MASS_DA {
            return None;
        }
        Some(ScaledMass((da * self.multiplier as f64).round() as i32))
    }

    pub fn to_da(&self, mass: ScaledMass) -> f64 {
        mass.0 as f64 / self.multiplier as f64
    }

    /// Width of one unit resolution (1 Da) bin.
    pub fn one_dalton(&self) -> ScaledMass {
        ScaledMass(self.multiplier)
    }
}
