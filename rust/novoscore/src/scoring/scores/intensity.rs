use crate::errors::DataProcessingError;
use crate::models::Candidate;
use crate::scoring::context::ScoringContext;
use crate::scoring::ion_series::MatchBuffers;
use crate::scoring::spectrum::PreparedSpectrum;

const EXPLAINED_CURRENT_WEIGHT: f32 = 0.6;
const COVERAGE_WEIGHT: f32 = 0.25;
const MATCHED_PEAKS_WEIGHT: f32 = 0.15;

/// Fraction of the usable ion current a candidate explains, blended with
/// its cleavage coverage and how many peaks it accounts for per position.
///
/// Zero cleavage sites always score zero.
pub fn intensity_score(
    ctx: &ScoringContext,
    spectrum: &PreparedSpectrum,
    candidate: &Candidate,
    buffers: &MatchBuffers,
) -> Result<f32, DataProcessingError> {
    let total = spectrum.usable_current();
    if total <= 0.0 {
        return Err(DataProcessingError::ZeroDenominator {
            quantity: "total ion current",
            context: candidate.render(&ctx.scale),
        });
    }
    let positions = candidate.cleavage_positions();
    if positions == 0 {
        return Err(DataProcessingError::ZeroDenominator {
            quantity: "cleavage positions",
            context: candidate.render(&ctx.scale),
        });
    }
    if buffers.cleavage_sites == 0 {
        return Ok(0.0);
    }

    let (explained, matched) = spectrum
        .peaks
        .peaks()
        .iter()
        .zip(buffers.confidence.iter())
        .zip(spectrum.usable().iter())
        .filter(|((_, conf), usable)| **usable && **conf > 0.0)
        .fold((0.0f32, 0usize), |(cur, count), ((peak, conf), _)| {
            (cur + peak.intensity * conf, count + 1)
        });

    let current_fraction = (explained / total).min(1.0);
    let coverage = buffers.cleavage_sites as f32 / positions as f32;
    let expected = ctx.params.expected_ions_per_position * positions as f32;
    let peak_fraction = (matched as f32 / expected).min(1.0);

    let score = EXPLAINED_CURRENT_WEIGHT * current_fraction
        + COVERAGE_WEIGHT * coverage
        + MATCHED_PEAKS_WEIGHT * peak_fraction;
    Ok(score.clamp(0.0, 1.0))
}
