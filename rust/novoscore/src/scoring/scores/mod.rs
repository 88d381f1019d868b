mod intensity;
mod probability;
mod quality;
mod xcorr;

pub use intensity::intensity_score;
pub use probability::{
    ProbabilityScore,
    probability_score,
    random_match_probability,
};
pub use quality::quality_score;
pub use xcorr::CrossCorrelationScorer;
