use crate::mass::Residue;
use serde::{
    Deserialize,
    Serialize,
};

/// Instrument class the spectrum was acquired on.
///
/// Drives the low-mass cutoff, whether recalibration and expansion run,
/// the ion probabilities and the composite regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InstrumentClass {
    #[serde(rename = "ion_trap")]
    IonTrap,
    #[default]
    #[serde(rename = "qtof")]
    Qtof,
    #[serde(rename = "tof_tof")]
    TofTof,
    #[serde(rename = "ftms")]
    Ftms,
}

impl InstrumentClass {
    pub fn is_accurate_mass(&self) -> bool {
        matches!(self, InstrumentClass::Qtof | InstrumentClass::Ftms)
    }

    /// Ion traps cannot hold fragments under roughly a third of the
    /// precursor m/z, so the first and last cleavage are never seen.
    pub fn has_low_mass_cutoff(&self) -> bool {
        matches!(self, InstrumentClass::IonTrap)
    }
}

/// Protease (or lack of one) that produced the peptide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FragmentationPattern {
    #[default]
    #[serde(rename = "tryptic")]
    Tryptic,
    #[serde(rename = "lys_c")]
    LysC,
    #[serde(rename = "glu_c")]
    GluC,
    #[serde(rename = "unspecified")]
    Unspecified,
}

impl FragmentationPattern {
    pub fn is_consistent_c_terminus(&self, residue: Residue) -> bool {
        match self {
            FragmentationPattern::Tryptic => matches!(residue, Residue::Lys | Residue::Arg),
            FragmentationPattern::LysC => residue == Residue::Lys,
            FragmentationPattern::GluC => matches!(residue, Residue::Glu | Residue::Asp),
            FragmentationPattern::Unspecified => false,
        }
    }
}
