use super::context::ScoringContext;
use crate::mass::{
    Residue,
    ScaledMass,
};
use crate::models::PeakList;

/// A peak list plus which of its peaks can be explained by fragments.
///
/// Peaks from the unfragmented precursor (at every charge, with and
/// without water or ammonia loss), peaks above the largest possible
/// fragment and, on ion traps, peaks under the low-mass cutoff are left
/// out of every intensity-based statistic.
#[derive(Debug, Clone)]
pub struct PreparedSpectrum {
    pub peaks: PeakList,
    usable: Vec<bool>,
    usable_current: f32,
}

impl PreparedSpectrum {
    pub fn new(peaks: PeakList, ctx: &ScoringContext) -> Self {
        let usable: Vec<bool> = peaks
            .peaks()
            .iter()
            .map(|p| is_fragment_region(ctx, p.mz))
            .collect();
        let usable_current = peaks
            .peaks()
            .iter()
            .zip(usable.iter())
            .filter(|(_, u)| **u)
            .map(|(p, _)| p.intensity)
            .sum();
        Self {
            peaks,
            usable,
            usable_current,
        }
    }

    pub fn usable(&self) -> &[bool] {
        &self.usable
    }

    /// Summed intensity of the usable peaks.
    pub fn usable_current(&self) -> f32 {
        self.usable_current
    }

    pub fn usable_count(&self) -> usize {
        self.usable.iter().filter(|u| **u).count()
    }
}

/// Whether a peak at `mz` lies where a fragment ion could be observed.
pub fn is_fragment_region(ctx: &ScoringContext, mz: ScaledMass) -> bool {
    let residues = &ctx.residues;
    let wide = ctx.fragment_tolerance.wide;
    let high_edge = ctx.precursor_mh() - residues.mass(Residue::Gly) + wide;
    if mz > high_edge {
        return false;
    }
    if ctx.instrument.has_low_mass_cutoff() {
        let cutoff = ctx.scale.scale(
            ctx.scale.to_da(ctx.precursor_mz) * ctx.params.low_mass_cutoff_fraction,
        );
        if mz < cutoff {
            return false;
        }
    }
    !is_precursor_region(ctx, mz)
}

pub fn is_precursor_region(ctx: &ScoringContext, mz: ScaledMass) -> bool {
    let residues = &ctx.residues;
    (1..=ctx.charge).any(|z| {
        let zi = z as i32;
        let center = ctx.precursor_mz_at(z);
        let half_width = ctx.fragment_tolerance.wide + ctx.peptide_tolerance.error.div_round(zi);
        [ScaledMass::ZERO, residues.water, residues.ammonia]
            .iter()
            .any(|loss| (mz - (center - loss.div_round(zi))).abs() <= half_width)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstrumentClass;
    use crate::scoring::context::ScoringConfig;

    #[test]
    fn test_precursor_peaks_are_unusable() {
        let ctx = ScoringContext::new(&ScoringConfig::default(), 600.0, 2).unwrap();
        let raw = [
            (300.0, 10.0),
            (600.0, 10.0),
            (591.0, 10.0),
            (1199.0, 10.0),
            (1180.9, 10.0),
            (1190.0, 10.0),
        ];
        let peaks = PeakList::new(&raw, &ctx.scale).unwrap();
        let spec = PreparedSpectrum::new(peaks, &ctx);
        // 600 and 591 are the 2+ precursor and its water loss, the rest
        // sit above the largest possible fragment.
        assert_eq!(spec.usable(), &[true, false, false, false, false, false]);
        assert_eq!(spec.usable_current(), 10.0);
    }

    #[test]
    fn test_ion_trap_cutoff() {
        let config = ScoringConfig {
            instrument: InstrumentClass::IonTrap,
            ..Default::default()
        };
        let ctx = ScoringContext::new(&config, 600.0, 2).unwrap();
        assert!(!is_fragment_region(&ctx, ctx.scale.scale(150.0)));
        assert!(is_fragment_region(&ctx, ctx.scale.scale(250.0)));
    }
}
