//! Fixtures shared by the scoring unit tests.

use super::context::{
    ScoringConfig,
    ScoringContext,
};
use crate::mass::residues::PROTON;
use crate::mass::{
    MassScale,
    ResidueTable,
    ScaledMass,
};
use crate::models::{
    Candidate,
    Provenance,
};

/// Context whose precursor is exactly the mass of `sequence`.
pub(crate) fn context_for(
    sequence: &str,
    charge: u8,
    config: &ScoringConfig,
) -> (ScoringContext, Candidate) {
    let scale = MassScale::new(config.mass_multiplier).unwrap();
    let table = ResidueTable::new(&scale, config.cysteine_modification);
    let cand =
        Candidate::from_notation(sequence, Provenance::Assembler, 1.0, &table, &scale).unwrap();
    let neutral = scale.to_da(cand.neutral_mass(&table));
    let precursor_mz = neutral / charge as f64 + PROTON;
    let ctx = ScoringContext::new(config, precursor_mz, charge).unwrap();
    (ctx, cand)
}

/// Singly charged b ion in Da, `i` units from the N-terminus.
pub(crate) fn b_ion(ctx: &ScoringContext, cand: &Candidate, i: usize) -> f64 {
    ctx.scale.to_da(cand.breakpoints()[i - 1]) + PROTON
}

/// Singly charged y ion in Da, `i` units from the C-terminus.
pub(crate) fn y_ion(ctx: &ScoringContext, cand: &Candidate, i: usize) -> f64 {
    let suffix: ScaledMass = cand.units[cand.len() - i..].iter().map(|u| u.mass).sum();
    ctx.scale.to_da(suffix + ctx.residues.termini()) + PROTON
}

/// b and y ions for the given index ranges, all at the same intensity.
pub(crate) fn backbone_peaks(
    ctx: &ScoringContext,
    cand: &Candidate,
    b: std::ops::RangeInclusive<usize>,
    y: std::ops::RangeInclusive<usize>,
) -> Vec<(f64, f32)> {
    b.map(|i| (b_ion(ctx, cand, i), 100.0))
        .chain(y.map(|i| (y_ion(ctx, cand, i), 100.0)))
        .collect()
}
