use crate::mass::{
    ResidueTable,
    ScaledMass,
};
use serde::Serialize;

/// Which end of the peptide a fragment keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Series {
    N,
    C,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NeutralLoss {
    None,
    CarbonMonoxide,
    Water,
    Ammonia,
    MethanesulfenicAcid,
}

impl NeutralLoss {
    pub fn mass(&self, residues: &ResidueTable) -> ScaledMass {
        match self {
            NeutralLoss::None => ScaledMass::ZERO,
            NeutralLoss::CarbonMonoxide => residues.carbon_monoxide,
            NeutralLoss::Water => residues.water,
            NeutralLoss::Ammonia => residues.ammonia,
            NeutralLoss::MethanesulfenicAcid => residues.methanesulfenic_acid,
        }
    }
}

/// Tag written next to a peak once it is explained by an ion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IonKind {
    B,
    Y,
    A,
    BMinusWater,
    BMinusAmmonia,
    YMinusWater,
    YMinusAmmonia,
    BMinusSulfenic,
    YMinusSulfenic,
    Internal,
    InternalA,
    Immonium,
    GapDiagnostic,
}

impl IonKind {
    pub fn is_primary(&self) -> bool {
        matches!(self, IonKind::B | IonKind::Y)
    }
}

/// When a hypothesis is worth searching for at a cleavage position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Always,
    /// The b or y ion of the same position was found, or the loss is
    /// likely anyway (N-terminal Gln/Glu for the N series, or more
    /// charges than basic residues).
    PrimaryOrPlausible,
    /// The fragment carries an oxidized methionine.
    ContainsMetOx,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IonHypothesis {
    pub kind: IonKind,
    pub series: Series,
    pub loss: NeutralLoss,
    pub weight: f32,
    pub trigger: Trigger,
}

/// Backbone ions searched at every cleavage position.
///
/// Primary ions come first so the triggers of the secondary ones can see
/// whether their primary was found.
pub const ION_HYPOTHESES: [IonHypothesis; 9] = [
    IonHypothesis {
        kind: IonKind::B,
        series: Series::N,
        loss: NeutralLoss::None,
        weight: 1.0,
        trigger: Trigger::Always,
    },
    IonHypothesis {
        kind: IonKind::Y,
        series: Series::C,
        loss: NeutralLoss::None,
        weight: 1.0,
        trigger: Trigger::Always,
    },
    IonHypothesis {
        kind: IonKind::A,
        series: Series::N,
        loss: NeutralLoss::CarbonMonoxide,
        weight: 0.5,
        trigger: Trigger::PrimaryOrPlausible,
    },
    IonHypothesis {
        kind: IonKind::BMinusWater,
        series: Series::N,
        loss: NeutralLoss::Water,
        weight: 0.5,
        trigger: Trigger::PrimaryOrPlausible,
    },
    IonHypothesis {
        kind: IonKind::BMinusAmmonia,
        series: Series::N,
        loss: NeutralLoss::Ammonia,
        weight: 0.5,
        trigger: Trigger::PrimaryOrPlausible,
    },
    IonHypothesis {
        kind: IonKind::YMinusWater,
        series: Series::C,
        loss: NeutralLoss::Water,
        weight: 0.5,
        trigger: Trigger::PrimaryOrPlausible,
    },
    IonHypothesis {
        kind: IonKind::YMinusAmmonia,
        series: Series::C,
        loss: NeutralLoss::Ammonia,
        weight: 0.5,
        trigger: Trigger::PrimaryOrPlausible,
    },
    IonHypothesis {
        kind: IonKind::BMinusSulfenic,
        series: Series::N,
        loss: NeutralLoss::MethanesulfenicAcid,
        weight: 0.5,
        trigger: Trigger::ContainsMetOx,
    },
    IonHypothesis {
        kind: IonKind::YMinusSulfenic,
        series: Series::C,
        loss: NeutralLoss::MethanesulfenicAcid,
        weight: 0.5,
        trigger: Trigger::ContainsMetOx,
    },
];

pub const IMMONIUM_WEIGHT: f32 = 0.5;
pub const INTERNAL_WEIGHT: f32 = 0.25;
pub const INTERNAL_PROLINE_WEIGHT: f32 = 0.5;
pub const INTERNAL_MIN_UNITS: usize = 2;
pub const INTERNAL_MAX_UNITS: usize = 4;
