//! Run configuration and the immutable per-spectrum scoring context.
//!
//! Everything the scorers read that is not the candidate or the peak list
//! lives here. [`ScoringConfig`] is what users write (serde, with defaults
//! for every field); [`ScoringContext`] is the validated, scaled form
//! built once per precursor and passed around by reference.

use crate::errors::DataProcessingError;
use crate::mass::{
    FragmentTolerance,
    MAX_MASS_DA,
    MassScale,
    PeptideTolerance,
    ResidueTable,
    ScaledMass,
};
use crate::mass::residues::PROTON;
use crate::models::{
    FragmentationPattern,
    InstrumentClass,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Upper bound for every tolerance or window given in Da.
const MAX_WINDOW_DA: f64 = 100.0;

/// One value per instrument class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerInstrument<T> {
    pub ion_trap: T,
    pub qtof: T,
    pub tof_tof: T,
    pub ftms: T,
}

impl<T> PerInstrument<T> {
    pub fn get(&self, instrument: InstrumentClass) -> &T {
        match instrument {
            InstrumentClass::IonTrap => &self.ion_trap,
            InstrumentClass::Qtof => &self.qtof,
            InstrumentClass::TofTof => &self.tof_tof,
            InstrumentClass::Ftms => &self.ftms,
        }
    }
}

/// Probability that an ion of each kind is observed when the sequence is right.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IonProbabilities {
    pub b: f32,
    pub y: f32,
    pub a: f32,
    pub b_minus_water: f32,
    pub b_minus_ammonia: f32,
    pub y_minus_water: f32,
    pub y_minus_ammonia: f32,
}

impl Default for PerInstrument<IonProbabilities> {
    fn default() -> Self {
        Self {
            ion_trap: IonProbabilities {
                b: 0.65,
                y: 0.7,
                a: 0.1,
                b_minus_water: 0.25,
                b_minus_ammonia: 0.15,
                y_minus_water: 0.15,
                y_minus_ammonia: 0.1,
            },
            qtof: IonProbabilities {
                b: 0.55,
                y: 0.8,
                a: 0.2,
                b_minus_water: 0.15,
                b_minus_ammonia: 0.1,
                y_minus_water: 0.1,
                y_minus_ammonia: 0.05,
            },
            tof_tof: IonProbabilities {
                b: 0.6,
                y: 0.75,
                a: 0.35,
                b_minus_water: 0.2,
                b_minus_ammonia: 0.15,
                y_minus_water: 0.15,
                y_minus_ammonia: 0.1,
            },
            ftms: IonProbabilities {
                b: 0.6,
                y: 0.75,
                a: 0.1,
                b_minus_water: 0.2,
                b_minus_ammonia: 0.1,
                y_minus_water: 0.15,
                y_minus_ammonia: 0.1,
            },
        }
    }
}

/// Weighted average of the component scores fed into a quadratic.
///
/// `probability_correct = a + b * w + c * w^2` where `w` is the weighted
/// average, clamped to [0.01, 0.99].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CompositeModel {
    pub probability_weight: f32,
    pub intensity_weight: f32,
    pub cross_correlation_weight: f32,
    pub quality_weight: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl Default for CompositeModel {
    fn default() -> Self {
        Self {
            probability_weight: 1.0,
            intensity_weight: 1.0,
            cross_correlation_weight: 1.0,
            quality_weight: 0.5,
            a: -0.1,
            b: 0.6,
            c: 0.6,
        }
    }
}

impl Default for PerInstrument<CompositeModel> {
    fn default() -> Self {
        let base = CompositeModel::default();
        Self {
            ion_trap: CompositeModel {
                cross_correlation_weight: 1.5,
                ..base
            },
            qtof: base,
            tof_tof: CompositeModel {
                intensity_weight: 1.5,
                ..base
            },
            ftms: base,
        }
    }
}

/// Empirically tuned knobs of the lifecycle stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringParameters {
    /// Bottom fraction of candidates dropped by the contiguity filter.
    pub contiguity_prune_quantile: f32,
    /// Starting fraction of above-precursor peaks a candidate must explain.
    pub high_mz_coverage_threshold: f32,
    /// Pruning passes relax until at least this many candidates survive.
    pub min_survivors: usize,
    /// Upper bound on the candidate count after expansion.
    pub expansion_cap: usize,
    /// Half width (Da) of the window searched for alternative dipeptide
    /// masses when expanding a gap.
    pub gap_expansion_window: f64,
    /// Minimum unweighted match confidence of a b/y hit used for recalibration.
    pub recalibration_confidence: f32,
    pub recalibration_min_points: usize,
    /// Expected matched peaks per cleavage position, used by the intensity score.
    pub expected_ions_per_position: f32,
    /// Fraction of the precursor m/z under which ion traps see nothing.
    pub low_mass_cutoff_fraction: f64,
    /// Immonium and gap diagnostic ions are only matched below this m/z (Da).
    pub diagnostic_mass_limit: f64,
    /// Odds multiplier applied when the C-terminus fits the protease.
    pub c_terminal_boost: f32,
    pub ion_probabilities: PerInstrument<IonProbabilities>,
    pub composite: PerInstrument<CompositeModel>,
}

impl Default for ScoringParameters {
    fn default() -> Self {
        Self {
            contiguity_prune_quantile: 0.25,
            high_mz_coverage_threshold: 0.5,
            min_survivors: 10,
            expansion_cap: 2000,
            gap_expansion_window: 0.1,
            recalibration_confidence: 0.9,
            recalibration_min_points: 3,
            expected_ions_per_position: 2.0,
            low_mass_cutoff_fraction: 0.28,
            diagnostic_mass_limit: 400.0,
            c_terminal_boost: 5.0,
            ion_probabilities: PerInstrument::default(),
            composite: PerInstrument::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub mass_multiplier: i32,
    /// Tolerance (Da) on the intact peptide mass.
    pub peptide_tolerance: f64,
    /// Fragment error (Da) the tolerance bands derive from.
    pub fragment_tolerance: f64,
    pub instrument: InstrumentClass,
    pub fragmentation: FragmentationPattern,
    /// Mass added to every cysteine (Da), carbamidomethyl by default.
    pub cysteine_modification: f64,
    /// Maximum number of ranked candidates reported per spectrum.
    pub output_count: usize,
    /// Candidates with a composite score below this are not reported.
    pub output_threshold: f32,
    pub parameters: ScoringParameters,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mass_multiplier: 100,
            peptide_tolerance: 0.75,
            fragment_tolerance: 0.5,
            instrument: InstrumentClass::default(),
            fragmentation: FragmentationPattern::default(),
            cysteine_modification: 57.02146,
            output_count: 10,
            output_threshold: 0.0,
            parameters: ScoringParameters::default(),
        }
    }
}

impl ScoringConfig {
    /// Checks everything that does not depend on a spectrum.
    pub fn validate(&self) -> Result<(), DataProcessingError> {
        macro_rules! require {
            ($cond:expr, $name:literal, $value:expr) => {
                if !$cond {
                    return Err(DataProcessingError::InvalidParameter {
                        name: $name,
                        value: $value.to_string(),
                    });
                }
            };
        }

        MassScale::new(self.mass_multiplier)?;
        require!(
            self.peptide_tolerance > 0.0 && self.peptide_tolerance <= MAX_WINDOW_DA,
            "peptide_tolerance",
            self.peptide_tolerance
        );
        require!(
            self.fragment_tolerance > 0.0 && self.fragment_tolerance <= MAX_WINDOW_DA,
            "fragment_tolerance",
            self.fragment_tolerance
        );
        require!(
            self.cysteine_modification.abs() <= MAX_WINDOW_DA * 10.0,
            "cysteine_modification",
            self.cysteine_modification
        );
        require!(self.output_count > 0, "output_count", self.output_count);
        let p = &self.parameters;
        require!(
            (0.0..1.0).contains(&p.contiguity_prune_quantile),
            "contiguity_prune_quantile",
            p.contiguity_prune_quantile
        );
        require!(
            (0.0..=1.0).contains(&p.high_mz_coverage_threshold),
            "high_mz_coverage_threshold",
            p.high_mz_coverage_threshold
        );
        require!(p.expansion_cap > 0, "expansion_cap", p.expansion_cap);
        require!(
            (0.0..=MAX_WINDOW_DA).contains(&p.gap_expansion_window),
            "gap_expansion_window",
            p.gap_expansion_window
        );
        require!(
            (0.0..=1.0).contains(&p.low_mass_cutoff_fraction),
            "low_mass_cutoff_fraction",
            p.low_mass_cutoff_fraction
        );
        require!(
            (0.0..=MAX_MASS_DA).contains(&p.diagnostic_mass_limit),
            "diagnostic_mass_limit",
            p.diagnostic_mass_limit
        );
        require!(
            p.recalibration_min_points >= 3,
            "recalibration_min_points",
            p.recalibration_min_points
        );
        require!(
            p.expected_ions_per_position > 0.0,
            "expected_ions_per_position",
            p.expected_ions_per_position
        );
        Ok(())
    }
}

/// Immutable state shared by every scorer while one precursor is processed.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    pub scale: MassScale,
    pub residues: ResidueTable,
    /// Neutral monoisotopic peptide mass.
    pub precursor_mass: ScaledMass,
    pub precursor_mz: ScaledMass,
    pub charge: u8,
    pub peptide_tolerance: PeptideTolerance,
    pub fragment_tolerance: FragmentTolerance,
    pub instrument: InstrumentClass,
    pub fragmentation: FragmentationPattern,
    pub output_count: usize,
    pub output_threshold: f32,
    pub params: ScoringParameters,
}

impl ScoringContext {
    pub fn new(
        config: &ScoringConfig,
        precursor_mz: f64,
        charge: u8,
    ) -> Result<Self, DataProcessingError> {
        config.validate()?;
        if charge == 0 {
            return Err(DataProcessingError::InvalidParameter {
                name: "charge",
                value: charge.to_string(),
            });
        }
        let scale = MassScale::new(config.mass_multiplier)?;
        let neutral = (precursor_mz - PROTON) * charge as f64;
        let invalid_precursor = || DataProcessingError::InvalidParameter {
            name: "precursor_mz",
            value: precursor_mz.to_string(),
        };
        if !(precursor_mz.is_finite() && precursor_mz > PROTON) {
            return Err(invalid_precursor());
        }
        let precursor_mass = scale.try_scale(neutral).ok_or_else(invalid_precursor)?;
        let precursor_mz = scale.try_scale(precursor_mz).ok_or_else(invalid_precursor)?;
        Ok(Self {
            scale,
            residues: ResidueTable::new(&scale, config.cysteine_modification),
            precursor_mass,
            precursor_mz,
            charge,
            peptide_tolerance: PeptideTolerance::new(config.peptide_tolerance, &scale),
            fragment_tolerance: FragmentTolerance::new(config.fragment_tolerance, &scale),
            instrument: config.instrument,
            fragmentation: config.fragmentation,
            output_count: config.output_count,
            output_threshold: config.output_threshold,
            params: config.parameters.clone(),
        })
    }

    /// Singly protonated peptide mass.
    pub fn precursor_mh(&self) -> ScaledMass {
        self.precursor_mass + self.residues.proton
    }

    /// m/z of the intact precursor at the given charge.
    pub fn precursor_mz_at(&self, charge: u8) -> ScaledMass {
        let z = charge as i32;
        (self.precursor_mass + self.residues.proton.times(z)).div_round(z)
    }

    pub fn ion_probabilities(&self) -> &IonProbabilities {
        self.params.ion_probabilities.get(self.instrument)
    }

    pub fn composite_model(&self) -> &CompositeModel {
        self.params.composite.get(self.instrument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_partial_json() {
        let config: ScoringConfig = serde_json::from_str(
            r#"{"instrument": "ftms", "fragment_tolerance": 0.01, "parameters": {"min_survivors": 3}}"#,
        )
        .unwrap();
        assert_eq!(config.instrument, InstrumentClass::Ftms);
        assert_eq!(config.parameters.min_survivors, 3);
        assert_eq!(config.parameters.expansion_cap, 2000);
        assert_eq!(config.output_count, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = ScoringConfig {
            fragment_tolerance: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DataProcessingError::InvalidParameter {
                name: "fragment_tolerance",
                ..
            })
        ));
        assert!(ScoringContext::new(&ScoringConfig::default(), 500.0, 0).is_err());

        let config = ScoringConfig {
            fragment_tolerance: 1e9,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        // Neutral mass 6 * 9999 Da is past the scaled range.
        assert!(matches!(
            ScoringContext::new(&ScoringConfig::default(), 9999.0, 6),
            Err(DataProcessingError::InvalidParameter {
                name: "precursor_mz",
                ..
            })
        ));
    }

    #[test]
    fn test_precursor_masses() {
        let ctx = ScoringContext::new(&ScoringConfig::default(), 500.5, 2).unwrap();
        // (500.5 - 1.00728) * 2, rounded on the x100 scale
        assert_eq!(ctx.precursor_mass, ScaledMass(99899));
        // Proton rounds to 101, (99899 + 202) / 2 rounds up
        assert_eq!(ctx.precursor_mz_at(2), ScaledMass(50051));
        assert_eq!(ctx.precursor_mh(), ScaledMass(99899 + 101));
    }
}
