mod candidate;
pub mod database;
mod instrument;
mod peak;

pub use candidate::{
    Candidate,
    CandidateScores,
    Provenance,
    PruneMetrics,
    SequenceUnit,
};
pub use database::candidate_from_database_line;
pub use instrument::{
    FragmentationPattern,
    InstrumentClass,
};
pub use peak::{
    Peak,
    PeakList,
};
