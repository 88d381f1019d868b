//! Matching of predicted fragment ions against the peak list.

mod hypotheses;
mod matcher;

pub use hypotheses::{
    ION_HYPOTHESES,
    IonHypothesis,
    IonKind,
    NeutralLoss,
    Series,
    Trigger,
};
pub use matcher::{
    BackboneHit,
    IonObservation,
    IonSeriesMatcher,
    MatchBuffers,
    has_charge_excess,
    longest_covered_run,
};
