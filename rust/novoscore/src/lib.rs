pub mod data_sources;
pub mod errors;
pub mod mass;
pub mod models;
pub mod scoring;
pub mod utils;

pub use data_sources::SpectrumBatch;
pub use models::{
    Candidate,
    PeakList,
    Provenance,
};
pub use scoring::{
    RankedCandidate,
    RankingPipeline,
    ScoreTimings,
    ScoringConfig,
    ScoringContext,
};
