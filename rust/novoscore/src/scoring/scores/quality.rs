use crate::errors::DataProcessingError;
use crate::mass::ScaledMass;
use crate::models::Candidate;
use crate::scoring::context::ScoringContext;
use crate::scoring::ion_series::MatchBuffers;

/// Largest fraction of the candidate mass covered by one unbroken stretch
/// of ion-confirmed units, taking the better of the b and y directions.
///
/// A unit is confirmed when the boundaries on both of its sides are; the
/// two termini always count as confirmed.
pub fn quality_score(
    ctx: &ScoringContext,
    candidate: &Candidate,
    buffers: &MatchBuffers,
) -> Result<f32, DataProcessingError> {
    let total = candidate.unit_mass_sum();
    if total <= ScaledMass::ZERO {
        return Err(DataProcessingError::ZeroDenominator {
            quantity: "candidate mass",
            context: candidate.render(&ctx.scale),
        });
    }
    let best = longest_confirmed_mass(candidate, &buffers.n_series)
        .max(longest_confirmed_mass(candidate, &buffers.c_series));
    Ok((best.raw() as f32 / total.raw() as f32).clamp(0.0, 1.0))
}

fn longest_confirmed_mass(candidate: &Candidate, series: &[f32]) -> ScaledMass {
    let n = candidate.len();
    let boundary = |i: usize| i == 0 || i == n || series[i - 1] > 0.0;

    let mut best = ScaledMass::ZERO;
    let mut current = ScaledMass::ZERO;
    for (i, unit) in candidate.units.iter().enumerate() {
        if boundary(i) && boundary(i + 1) {
            current += unit.mass;
            best = best.max(current);
        } else {
            current = ScaledMass::ZERO;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeakList;
    use crate::scoring::context::ScoringConfig;
    use crate::scoring::ion_series::IonSeriesMatcher;
    use crate::scoring::testing::{
        backbone_peaks,
        context_for,
    };

    #[test]
    fn test_partial_n_terminal_run() {
        let (ctx, cand) = context_for("GASPVTLNK", 1, &ScoringConfig::default());
        // b1..b3 confirm the boundaries 1, 2 and 3.
        let raw = backbone_peaks(&ctx, &cand, 1..=3, 1..=0);
        let peaks = PeakList::new(&raw, &ctx.scale).unwrap();
        let mut buffers = MatchBuffers::new();
        IonSeriesMatcher::new(&ctx).annotate(&cand, &peaks, &mut buffers);

        let first_three: ScaledMass = cand.units[..3].iter().map(|u| u.mass).sum();
        let expected = first_three.raw() as f32 / cand.unit_mass_sum().raw() as f32;
        let out = quality_score(&ctx, &cand, &buffers).unwrap();
        assert!((out - expected).abs() < 1e-6);
    }

    #[test]
    fn test_full_coverage() {
        let (ctx, cand) = context_for("GASPVTLNK", 1, &ScoringConfig::default());
        let raw = backbone_peaks(&ctx, &cand, 1..=0, 1..=8);
        let peaks = PeakList::new(&raw, &ctx.scale).unwrap();
        let mut buffers = MatchBuffers::new();
        IonSeriesMatcher::new(&ctx).annotate(&cand, &peaks, &mut buffers);
        assert_eq!(quality_score(&ctx, &cand, &buffers).unwrap(), 1.0);
    }
}
