use crate::errors::DataProcessingError;
use crate::mass::ScaledMass;
use crate::models::{
    Candidate,
    PeakList,
};
use crate::scoring::context::{
    IonProbabilities,
    ScoringContext,
};
use crate::scoring::ion_series::{
    IonKind,
    MatchBuffers,
};

/// Width (Da) of the window the background peak density is measured in.
const BACKGROUND_WINDOW: f64 = 100.0;
const MIN_RANDOM_PROBABILITY: f64 = 0.01;
const MAX_RANDOM_PROBABILITY: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityScore {
    pub score: f32,
    /// Score the same candidate would get if every plausible ion was found
    /// (or missing, for the kinds rarer than chance at that m/z).
    pub ideal: f32,
}

fn found_probability(probs: &IonProbabilities, kind: IonKind) -> Option<f32> {
    match kind {
        IonKind::B => Some(probs.b),
        IonKind::Y => Some(probs.y),
        IonKind::A => Some(probs.a),
        IonKind::BMinusWater => Some(probs.b_minus_water),
        IonKind::BMinusAmmonia => Some(probs.b_minus_ammonia),
        IonKind::YMinusWater => Some(probs.y_minus_water),
        IonKind::YMinusAmmonia => Some(probs.y_minus_ammonia),
        _ => None,
    }
}

/// Chance that some peak falls inside the wide band of `mz` by accident,
/// from the density of peaks in the surrounding window.
pub fn random_match_probability(ctx: &ScoringContext, peaks: &PeakList, mz: ScaledMass) -> f64 {
    let half = ctx.scale.scale(BACKGROUND_WINDOW / 2.0);
    let count = peaks.count_in(mz - half, mz + half);
    let band = ctx.fragment_tolerance.wide.times(2).raw() as f64;
    let p = count as f64 * band / half.times(2).raw() as f64;
    p.clamp(MIN_RANDOM_PROBABILITY, MAX_RANDOM_PROBABILITY)
}

/// Log-odds that the observed pattern of present and absent ions comes
/// from the candidate rather than from chance.
///
/// Starts from the terminal prior (boosted when the C-terminus fits the
/// protease), multiplies in `P(found) / P(random)` for every ion that was
/// seen and `(1 - P(found)) / (1 - P(random))` for every one that was
/// looked for and missed. The log10 of the product is floored at zero and
/// divided by the number of cleavage positions.
pub fn probability_score(
    ctx: &ScoringContext,
    peaks: &PeakList,
    candidate: &Candidate,
    buffers: &MatchBuffers,
) -> Result<ProbabilityScore, DataProcessingError> {
    let positions = candidate.cleavage_positions();
    if positions == 0 {
        return Err(DataProcessingError::ZeroDenominator {
            quantity: "sequence length",
            context: candidate.render(&ctx.scale),
        });
    }

    let probs = ctx.ion_probabilities();
    let mut prior = 1.0f64;
    if candidate
        .c_terminal_residue()
        .is_some_and(|r| ctx.fragmentation.is_consistent_c_terminus(r))
    {
        prior *= ctx.params.c_terminal_boost as f64;
    }

    let mut log_score = prior.ln();
    let mut log_ideal = prior.ln();
    for obs in buffers.observations.iter() {
        let Some(pf) = found_probability(probs, obs.kind) else {
            continue;
        };
        let pf = (pf as f64).clamp(MIN_RANDOM_PROBABILITY, MAX_RANDOM_PROBABILITY);
        let pr = random_match_probability(ctx, peaks, obs.mz);
        let present = (pf / pr).ln();
        let absent = ((1.0 - pf) / (1.0 - pr)).ln();
        if obs.searched {
            log_score += if obs.found { present } else { absent };
        }
        if obs.plausible {
            log_ideal += present.max(absent);
        }
    }

    let normalize = |log_e: f64| (log_e / std::f64::consts::LN_10).max(0.0) / positions as f64;
    Ok(ProbabilityScore {
        score: normalize(log_score) as f32,
        ideal: normalize(log_ideal) as f32,
    })
}
