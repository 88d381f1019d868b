mod gap_table;
pub mod residues;
mod scaled;
mod tolerance;

pub use gap_table::{
    GapComposition,
    GapEntry,
    GapTable,
};
pub use residues::{
    Residue,
    ResidueTable,
};
pub use scaled::{
    MAX_MASS_DA,
    MassScale,
    ScaledMass,
};
pub use tolerance::{
    FragmentTolerance,
    PeptideTolerance,
};
