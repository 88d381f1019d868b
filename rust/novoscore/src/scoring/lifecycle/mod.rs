//! Stages a candidate list goes through for one precursor.

mod collect;
mod dedup;
mod expand;
mod prune;
mod rank;
mod recalibrate;

pub use collect::collect_candidates;
pub use dedup::{
    deduplicate,
    deduplicate_exact,
};
pub use expand::{
    expand_candidates,
    resolves,
};
pub use prune::{
    prune_by_contiguity,
    prune_by_high_mz_coverage,
    prune_metrics,
};
pub use rank::rank_candidates;
pub use recalibrate::calibration_correction;
