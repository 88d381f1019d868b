use super::context::CompositeModel;
use crate::models::CandidateScores;

const MIN_COMPOSITE: f32 = 0.01;
const MAX_COMPOSITE: f32 = 0.99;

/// Probability score as a fraction of the best the candidate could get.
pub fn normalized_probability(scores: &CandidateScores) -> f32 {
    if scores.ideal_probability > 0.0 {
        (scores.probability / scores.ideal_probability).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// "Probability correct" estimate from the component scores.
///
/// ```
/// use novoscore::models::CandidateScores;
/// use novoscore::scoring::{CompositeModel, composite_score};
///
/// let model = CompositeModel::default();
/// let perfect = CandidateScores {
///     probability: 2.0,
///     ideal_probability: 2.0,
///     intensity: 1.0,
///     quality: 1.0,
///     cross_correlation: 1.0,
///     ..Default::default()
/// };
/// assert_eq!(composite_score(&model, &perfect), 0.99);
/// assert_eq!(composite_score(&model, &CandidateScores::default()), 0.01);
/// ```
pub fn composite_score(model: &CompositeModel, scores: &CandidateScores) -> f32 {
    let weights = [
        model.probability_weight,
        model.intensity_weight,
        model.cross_correlation_weight,
        model.quality_weight,
    ];
    let values = [
        normalized_probability(scores),
        scores.intensity,
        scores.cross_correlation,
        scores.quality,
    ];
    let weight_sum: f32 = weights.iter().sum();
    let w = if weight_sum > 0.0 {
        weights
            .iter()
            .zip(values.iter())
            .map(|(w, v)| w * v)
            .sum::<f32>()
            / weight_sum
    } else {
        0.0
    };
    let estimate = model.a + model.b * w + model.c * w * w;
    estimate.clamp(MIN_COMPOSITE, MAX_COMPOSITE)
}
