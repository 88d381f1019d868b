use crate::mass::{
    MAX_MASS_DA,
    MassScale,
    Residue,
    ResidueTable,
    ScaledMass,
};
use serde::Serialize;
use std::fmt::Write;

/// Where a candidate sequence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Provenance {
    Assembler,
    Database,
}

/// One position of a candidate: a residue, or a gap of unresolved residues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceUnit {
    pub mass: ScaledMass,
    /// `None` for a gap standing for two or more residues.
    pub residue: Option<Residue>,
}

impl SequenceUnit {
    pub fn residue(residue: Residue, table: &ResidueTable) -> Self {
        Self {
            mass: table.mass(residue),
            residue: Some(residue),
        }
    }

    pub fn gap(mass: ScaledMass) -> Self {
        Self {
            mass,
            residue: None,
        }
    }

    pub fn is_gap(&self) -> bool {
        self.residue.is_none()
    }

    pub fn is_basic(&self) -> bool {
        self.residue.is_some_and(|r| r.is_basic())
    }
}

/// Score fields, all zero until the lifecycle manager fills them in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CandidateScores {
    pub intensity: f32,
    pub probability: f32,
    /// Probability score the candidate would get if every plausible ion was found.
    pub ideal_probability: f32,
    pub quality: f32,
    pub cross_correlation: f32,
    pub composite: f32,
    pub cleavage_sites: usize,
    pub rank: usize,
}

/// Statistics the pruning passes filter on, computed while scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PruneMetrics {
    /// Fraction of usable ion current explained by b/y ions that belong to
    /// a contiguous (two or more adjacent) series.
    pub contiguity: f32,
    /// Fraction of the usable peaks above the precursor m/z that were
    /// explained. `None` when there are no such peaks.
    pub high_mz_coverage: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub units: Vec<SequenceUnit>,
    pub provenance: Provenance,
    pub assembler_score: f32,
    pub scores: CandidateScores,
    pub prune_metrics: PruneMetrics,
}

impl Candidate {
    pub fn new(units: Vec<SequenceUnit>, provenance: Provenance, assembler_score: f32) -> Self {
        Self {
            units,
            provenance,
            assembler_score,
            scores: CandidateScores::default(),
            prune_metrics: PruneMetrics::default(),
        }
    }

    /// Parses the exchange notation, e.g. `"[128.06]SPEmK"`.
    ///
    /// Uppercase letters are residues (`I` reads as `L`), `m` is oxidized
    /// methionine, a leading `q` is pyroglutamate and `[x]` is a gap of
    /// `x` Da. Anything else makes the whole sequence unusable, as does a
    /// total mass above [`MAX_MASS_DA`].
    ///
    /// ```
    /// use novoscore::mass::{MassScale, ResidueTable};
    /// use novoscore::models::{Candidate, Provenance};
    ///
    /// let scale = MassScale::new(100).unwrap();
    /// let table = ResidueTable::new(&scale, 57.02146);
    /// let cand = Candidate::from_notation("[128.06]SPEmK", Provenance::Assembler, 1.0, &table, &scale).unwrap();
    /// assert_eq!(cand.len(), 6);
    /// assert_eq!(cand.render(&scale), "[128.06]SPEmK");
    /// assert!(Candidate::from_notation("PEPZ", Provenance::Assembler, 1.0, &table, &scale).is_none());
    /// ```
    pub fn from_notation(
        notation: &str,
        provenance: Provenance,
        assembler_score: f32,
        table: &ResidueTable,
        scale: &MassScale,
    ) -> Option<Self> {
        let mut units = Vec::with_capacity(notation.len());
        let mut total = ScaledMass::ZERO;
        let mut chars = notation.trim().chars();
        while let Some(c) = chars.next() {
            let unit = if c == '[' {
                let mut buf = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(x) => buf.push(x),
                        None => return None,
                    }
                }
                let mass: f64 = buf.trim().parse().ok()?;
                if mass <= 0.0 {
                    return None;
                }
                SequenceUnit::gap(scale.try_scale(mass)?)
            } else {
                let residue = Residue::from_code(c, units.len())?;
                SequenceUnit::residue(residue, table)
            };
            total = total.checked_add(unit.mass)?;
            units.push(unit);
        }
        if units.is_empty() || scale.to_da(total) > MAX_MASS_DA {
            return None;
        }
        Some(Self::new(units, provenance, assembler_score))
    }

    /// Peptide string with gaps shown as their bracketed mass.
    pub fn render(&self, scale: &MassScale) -> String {
        let mut out = String::with_capacity(self.units.len() * 2);
        for unit in &self.units {
            match unit.residue {
                Some(r) => out.push(r.code()),
                None => {
                    // Writing to a String cannot fail
                    let _ = write!(out, "[{:.2}]", scale.to_da(unit.mass));
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of backbone positions between units.
    pub fn cleavage_positions(&self) -> usize {
        self.units.len().saturating_sub(1)
    }

    pub fn unit_mass_sum(&self) -> ScaledMass {
        self.units.iter().map(|u| u.mass).sum()
    }

    pub fn neutral_mass(&self, table: &ResidueTable) -> ScaledMass {
        self.unit_mass_sum() + table.termini()
    }

    pub fn basic_residue_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_basic()).count()
    }

    pub fn n_terminal_residue(&self) -> Option<Residue> {
        self.units.first().and_then(|u| u.residue)
    }

    pub fn c_terminal_residue(&self) -> Option<Residue> {
        self.units.last().and_then(|u| u.residue)
    }

    pub fn has_gaps(&self) -> bool {
        self.units.iter().any(|u| u.is_gap())
    }

    /// Cumulative N-terminal unit masses at every inner cleavage position.
    pub fn breakpoints(&self) -> Vec<ScaledMass> {
        let mut acc = ScaledMass::ZERO;
        let mut out = Vec::with_capacity(self.cleavage_positions());
        for unit in &self.units[..self.cleavage_positions()] {
            acc += unit.mass;
            out.push(acc);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (MassScale, ResidueTable) {
        let scale = MassScale::new(100).unwrap();
        let table = ResidueTable::new(&scale, 57.02146);
        (scale, table)
    }

    #[test]
    fn test_pyroglu_only_at_start() {
        let (scale, table) = setup();
        let ok = Candidate::from_notation("qLVK", Provenance::Database, 0.0, &table, &scale);
        assert_eq!(ok.unwrap().n_terminal_residue(), Some(Residue::PyroGlu));
        let bad = Candidate::from_notation("LqVK", Provenance::Database, 0.0, &table, &scale);
        assert!(bad.is_none());
    }

    #[test]
    fn test_unterminated_gap() {
        let (scale, table) = setup();
        assert!(Candidate::from_notation("[128.0SK", Provenance::Assembler, 0.0, &table, &scale).is_none());
        assert!(Candidate::from_notation("[abc]SK", Provenance::Assembler, 0.0, &table, &scale).is_none());
        assert!(Candidate::from_notation("", Provenance::Assembler, 0.0, &table, &scale).is_none());
    }

    #[test]
    fn test_breakpoints() {
        let (scale, table) = setup();
        let cand = Candidate::from_notation("GAS", Provenance::Assembler, 0.0, &table, &scale).unwrap();
        let g = table.mass(Residue::Gly);
        let a = table.mass(Residue::Ala);
        assert_eq!(cand.breakpoints(), vec![g, g + a]);
        assert_eq!(cand.cleavage_positions(), 2);
        assert_eq!(
            cand.neutral_mass(&table),
            g + a + table.mass(Residue::Ser) + table.termini()
        );
    }

    #[test]
    fn test_basic_count() {
        let (scale, table) = setup();
        let cand = Candidate::from_notation("RPHK[200.00]", Provenance::Assembler, 0.0, &table, &scale).unwrap();
        assert_eq!(cand.basic_residue_count(), 3);
        assert!(cand.has_gaps());
        assert_eq!(cand.c_terminal_residue(), None);
    }

    #[test]
    fn test_oversized_gap_rejected() {
        let (scale, table) = setup();
        let huge = Candidate::from_notation("[30000000]K", Provenance::Database, 0.0, &table, &scale);
        assert!(huge.is_none());
        let inf = Candidate::from_notation("[inf]K", Provenance::Database, 0.0, &table, &scale);
        assert!(inf.is_none());
        // Each gap fits, the sum does not.
        let sum = Candidate::from_notation(
            "[15000][15000]K",
            Provenance::Database,
            0.0,
            &table,
            &scale,
        );
        assert!(sum.is_none());
    }
}
