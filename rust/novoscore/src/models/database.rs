use super::candidate::{
    Candidate,
    Provenance,
};
use crate::mass::{
    MassScale,
    ResidueTable,
};
use tracing::debug;

/// Converts one line of a database-sequence file into a candidate.
///
/// Blank lines and `>`/`#` header lines yield `None` quietly, lines with
/// characters that are not residue codes are dropped with a debug record.
/// Database sequences carry no assembler score.
pub fn candidate_from_database_line(
    line: &str,
    table: &ResidueTable,
    scale: &MassScale,
) -> Option<Candidate> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('>') || line.starts_with('#') {
        return None;
    }
    let out = Candidate::from_notation(line, Provenance::Database, 0.0, table, scale);
    if out.is_none() {
        debug!("Dropping unparseable database sequence {:?}", line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_lines() {
        let scale = MassScale::new(100).unwrap();
        let table = ResidueTable::new(&scale, 57.02146);

        let cand = candidate_from_database_line("  PEPTIDEK \n", &table, &scale).unwrap();
        assert_eq!(cand.provenance, Provenance::Database);
        assert_eq!(cand.render(&scale), "PEPTLDEK");
        assert_eq!(cand.assembler_score, 0.0);

        assert!(candidate_from_database_line("", &table, &scale).is_none());
        assert!(candidate_from_database_line(">sp|P12345", &table, &scale).is_none());
        assert!(candidate_from_database_line("PEPXIDE", &table, &scale).is_none());
        assert!(candidate_from_database_line("[30000000]K", &table, &scale).is_none());
    }
}
