use super::scaled::{
    MassScale,
    ScaledMass,
};
use serde::{
    Deserialize,
    Serialize,
};

pub const PROTON: f64 = 1.00728;
pub const HYDROGEN: f64 = 1.00783;
pub const HYDROXYL: f64 = 17.00274;
pub const WATER: f64 = 18.01056;
pub const AMMONIA: f64 = 17.02655;
pub const CARBON_MONOXIDE: f64 = 27.99491;
/// CH3SOH, lost from fragments carrying an oxidized methionine.
pub const METHANESULFENIC_ACID: f64 = 63.99829;
pub const UNMODIFIED_CYSTEINE: f64 = 103.00919;

/// Residues a candidate unit can resolve to.
///
/// Leu and Ile are isobaric and both map to [`Residue::Leu`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Residue {
    Gly,
    Ala,
    Ser,
    Pro,
    Val,
    Thr,
    Cys,
    Leu,
    Asn,
    Asp,
    Gln,
    Lys,
    Glu,
    Met,
    His,
    Phe,
    Arg,
    Tyr,
    Trp,
    /// Oxidized methionine, written as `m`.
    MetOx,
    /// N-terminal pyroglutamate (cyclized Gln), written as `q`.
    PyroGlu,
}

impl Residue {
    pub const ALL: [Residue; 21] = [
        Residue::Gly,
        Residue::Ala,
        Residue::Ser,
        Residue::Pro,
        Residue::Val,
        Residue::Thr,
        Residue::Cys,
        Residue::Leu,
        Residue::Asn,
        Residue::Asp,
        Residue::Gln,
        Residue::Lys,
        Residue::Glu,
        Residue::Met,
        Residue::His,
        Residue::Phe,
        Residue::Arg,
        Residue::Tyr,
        Residue::Trp,
        Residue::MetOx,
        Residue::PyroGlu,
    ];

    /// Monoisotopic residue mass in Da; cysteine is returned unmodified.
    pub fn monoisotopic(&self) -> f64 {
        match self {
            Residue::Gly => 57.02146,
            Residue::Ala => 71.03711,
            Residue::Ser => 87.03203,
            Residue::Pro => 97.05276,
            Residue::Val => 99.06841,
            Residue::Thr => 101.04768,
            Residue::Cys => UNMODIFIED_CYSTEINE,
            Residue::Leu => 113.08406,
            Residue::Asn => 114.04293,
            Residue::Asp => 115.02694,
            Residue::Gln => 128.05858,
            Residue::Lys => 128.09496,
            Residue::Glu => 129.04259,
            Residue::Met => 131.04049,
            Residue::His => 137.05891,
            Residue::Phe => 147.06841,
            Residue::Arg => 156.10111,
            Residue::Tyr => 163.06333,
            Residue::Trp => 186.07931,
            Residue::MetOx => 147.03540,
            Residue::PyroGlu => 111.03203,
        }
    }

    pub fn from_code(code: char, position: usize) -> Option<Residue> {
        let res = match code {
            'G' => Residue::Gly,
            'A' => Residue::Ala,
            'S' => Residue::Ser,
            'P' => Residue::Pro,
            'V' => Residue::Val,
            'T' => Residue::Thr,
            'C' => Residue::Cys,
            'L' | 'I' => Residue::Leu,
            'N' => Residue::Asn,
            'D' => Residue::Asp,
            'Q' => Residue::Gln,
            'K' => Residue::Lys,
            'E' => Residue::Glu,
            'M' => Residue::Met,
            'H' => Residue::His,
            'F' => Residue::Phe,
            'R' => Residue::Arg,
            'Y' => Residue::Tyr,
            'W' => Residue::Trp,
            'm' => Residue::MetOx,
            'q' if position == 0 => Residue::PyroGlu,
            _ => return None,
        };
        Some(res)
    }

    pub fn code(&self) -> char {
        match self {
            Residue::Gly => 'G',
            Residue::Ala => 'A',
            Residue::Ser => 'S',
            Residue::Pro => 'P',
            Residue::Val => 'V',
            Residue::Thr => 'T',
            Residue::Cys => 'C',
            Residue::Leu => 'L',
            Residue::Asn => 'N',
            Residue::Asp => 'D',
            Residue::Gln => 'Q',
            Residue::Lys => 'K',
            Residue::Glu => 'E',
            Residue::Met => 'M',
            Residue::His => 'H',
            Residue::Phe => 'F',
            Residue::Arg => 'R',
            Residue::Tyr => 'Y',
            Residue::Trp => 'W',
            Residue::MetOx => 'm',
            Residue::PyroGlu => 'q',
        }
    }

    /// Side chains able to hold on to a proton during fragmentation.
    pub fn is_basic(&self) -> bool {
        matches!(self, Residue::Arg | Residue::His | Residue::Lys)
    }

    /// Residues whose partner is indistinguishable at low resolution.
    pub fn isobaric_partner(&self) -> Option<Residue> {
        match self {
            Residue::Gln => Some(Residue::Lys),
            Residue::Lys => Some(Residue::Gln),
            Residue::Phe => Some(Residue::MetOx),
            Residue::MetOx => Some(Residue::Phe),
            _ => None,
        }
    }
}

/// Residue and terminal masses for one run, already on the run's scale.
#[derive(Debug, Clone)]
pub struct ResidueTable {
    masses: [ScaledMass; 21],
    pub n_terminus: ScaledMass,
    pub c_terminus: ScaledMass,
    pub proton: ScaledMass,
    pub water: ScaledMass,
    pub ammonia: ScaledMass,
    pub carbon_monoxide: ScaledMass,
    pub methanesulfenic_acid: ScaledMass,
    pub hydrogen: ScaledMass,
}

impl ResidueTable {
    pub fn new(scale: &MassScale, cysteine_modification: f64) -> Self {
        let mut masses = [ScaledMass::ZERO; 21];
        for (i, res) in Residue::ALL.iter().enumerate() {
            let mut mass = res.monoisotopic();
            if *res == Residue::Cys {
                mass += cysteine_modification;
            }
            masses[i] = scale.scale(mass);
        }
        Self {
            masses,
            n_terminus: scale.scale(HYDROGEN),
            c_terminus: scale.scale(HYDROXYL),
            proton: scale.scale(PROTON),
            water: scale.scale(WATER),
            ammonia: scale.scale(AMMONIA),
            carbon_monoxide: scale.scale(CARBON_MONOXIDE),
            methanesulfenic_acid: scale.scale(METHANESULFENIC_ACID),
            hydrogen: scale.scale(HYDROGEN),
        }
    }

    pub fn mass(&self, residue: Residue) -> ScaledMass {
        self.masses[residue as usize]
    }

    /// Mass added to a sum of unit masses to get the neutral peptide mass.
    pub fn termini(&self) -> ScaledMass {
        self.n_terminus + self.c_terminus
    }
}
