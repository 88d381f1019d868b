mod composite;
pub mod context;
pub mod ion_series;
pub mod lifecycle;
pub mod pipeline;
pub mod scores;
pub mod search_results;
mod spectrum;
pub mod timings;

#[cfg(test)]
pub(crate) mod testing;

pub use composite::{
    composite_score,
    normalized_probability,
};
pub use context::{
    CompositeModel,
    IonProbabilities,
    PerInstrument,
    ScoringConfig,
    ScoringContext,
    ScoringParameters,
};
pub use pipeline::RankingPipeline;
pub use search_results::RankedCandidate;
pub use spectrum::{
    PreparedSpectrum,
    is_fragment_region,
    is_precursor_region,
};
pub use timings::ScoreTimings;
