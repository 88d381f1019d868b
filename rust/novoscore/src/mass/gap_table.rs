use super::residues::{
    Residue,
    ResidueTable,
};
use super::scaled::ScaledMass;
use itertools::Itertools;

/// Where a gap-table mass came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapComposition {
    Single(Residue),
    /// Unordered pair of residues.
    Pair(Residue, Residue),
    /// A mass seen in a candidate that matches no known combination.
    Novel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapEntry {
    pub mass: ScaledMass,
    pub composition: GapComposition,
}

/// Registry of single and di-peptide masses, sorted by mass.
///
/// A run works on its own clone, which it may extend with novel gap
/// masses while collecting candidates. The base table is never touched.
#[derive(Debug, Clone)]
pub struct GapTable {
    entries: Vec<GapEntry>,
}

const GAP_RESIDUES: [Residue; 20] = [
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
];

impl GapTable {
    pub fn new(residues: &ResidueTable) -> Self {
        let singles = GAP_RESIDUES.iter().map(|r| GapEntry {
            mass: residues.mass(*r),
            composition: GapComposition::Single(*r),
        });
        let pairs = GAP_RESIDUES
            .iter()
            .tuple_combinations()
            .map(|(a, b)| (*a, *b))
            .chain(GAP_RESIDUES.iter().map(|r| (*r, *r)))
            .map(|(a, b)| GapEntry {
                mass: residues.mass(a) + residues.mass(b),
                composition: GapComposition::Pair(a, b),
            });
        let mut entries: Vec<GapEntry> = singles.chain(pairs).collect();
        entries.sort_by_key(|e| e.mass);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose mass lies within `tolerance` of `mass`.
    pub fn matches(&self, mass: ScaledMass, tolerance: ScaledMass) -> &[GapEntry] {
        let lo = self.entries.partition_point(|e| e.mass < mass - tolerance);
        let hi = self.entries.partition_point(|e| e.mass <= mass + tolerance);
        &self.entries[lo..hi]
    }

    /// Whether `mass` equals the sum of two known residues.
    pub fn is_known_dipeptide(&self, mass: ScaledMass, tolerance: ScaledMass) -> bool {
        self.matches(mass, tolerance)
            .iter()
            .any(|e| matches!(e.composition, GapComposition::Pair(..)))
    }

    /// Registers `mass` as a novel gap unless something already explains it.
    ///
    /// Returns true if the table grew.
    pub fn extend_novel(&mut self, mass: ScaledMass, tolerance: ScaledMass) -> bool {
        if !self.matches(mass, tolerance).is_empty() {
            return false;
        }
        let idx = self.entries.partition_point(|e| e.mass < mass);
        self.entries.insert(
            idx,
            GapEntry {
                mass,
                composition: GapComposition::Novel,
            },
        );
        true
    }

    /// Distinct dipeptide masses (further apart than `resolution`) that
    /// lie within `tolerance` of `mass`, closest first.
    pub fn resolved_dipeptide_masses(
        &self,
        mass: ScaledMass,
        tolerance: ScaledMass,
        resolution: ScaledMass,
    ) -> Vec<ScaledMass> {
        let mut out: Vec<ScaledMass> = Vec::new();
        let candidates = self
            .matches(mass, tolerance)
            .iter()
            .filter(|e| matches!(e.composition, GapComposition::Pair(..)))
            .map(|e| e.mass)
            .sorted_by_key(|m| ((*m - mass).abs(), *m));
        for cand in candidates {
            if out.iter().all(|m| (*m - cand).abs() > resolution) {
                out.push(cand);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mass::MassScale;

    fn table() -> (GapTable, ResidueTable) {
        let scale = MassScale::new(1000).unwrap();
        let residues = ResidueTable::new(&scale, 57.02146);
        (GapTable::new(&residues), residues)
    }

    #[test]
    fn test_table_is_sorted() {
        let (table, _) = table();
        assert!(table.entries.windows(2).all(|w| w[0].mass <= w[1].mass));
        // 20 singles + 190 pairs + 20 homodimers
        assert_eq!(table.len(), 230);
    }

    #[test]
    fn test_dipeptide_lookup() {
        let (table, residues) = table();
        let ga = residues.mass(Residue::Gly) + residues.mass(Residue::Ala);
        assert!(table.is_known_dipeptide(ga, ScaledMass(5)));
        let hits = table.matches(ga, ScaledMass(5));
        assert!(hits.iter().any(|e| e.composition == GapComposition::Single(Residue::Gln)));
    }

    #[test]
    fn test_extend_novel() {
        let (mut table, _) = table();
        let before = table.len();
        assert!(table.extend_novel(ScaledMass(5), ScaledMass(1)));
        assert!(!table.extend_novel(ScaledMass(5), ScaledMass(1)));
        assert_eq!(table.len(), before + 1);
        assert_eq!(table.matches(ScaledMass(5), ScaledMass(0))[0].composition, GapComposition::Novel);
    }

    #[test]
    fn test_resolved_dipeptides_are_distinct() {
        let (table, residues) = table();
        // AQ and AK differ by 36 mDa.
        let aq = residues.mass(Residue::Ala) + residues.mass(Residue::Gln);
        let resolved = table.resolved_dipeptide_masses(aq, ScaledMass(50), ScaledMass(10));
        assert!(resolved.len() >= 2);
        assert_eq!(resolved[0], aq);
        assert!(resolved.windows(2).all(|w| (w[0] - w[1]).abs() > ScaledMass(10)));
    }
}
