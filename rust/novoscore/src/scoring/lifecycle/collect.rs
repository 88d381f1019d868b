use crate::errors::DataProcessingError;
use crate::mass::GapTable;
use crate::models::Candidate;
use crate::scoring::context::ScoringContext;
use tracing::debug;

/// Merges assembler and database candidates, keeping the ones whose mass
/// matches the precursor.
///
/// Gap masses that nothing in `gap_table` explains are registered as novel
/// entries. Ending up with no candidate at all is an error.
pub fn collect_candidates(
    ctx: &ScoringContext,
    gap_table: &mut GapTable,
    assembler: Vec<Candidate>,
    database: Vec<Candidate>,
) -> Result<Vec<Candidate>, DataProcessingError> {
    let num_input = assembler.len() + database.len();
    let mut out: Vec<Candidate> = Vec::with_capacity(num_input);
    for cand in assembler.into_iter().chain(database) {
        if cand.len() < 2 {
            debug!(
                "Dropping candidate {} with fewer than two units",
                cand.render(&ctx.scale)
            );
            continue;
        }
        let mass = cand.neutral_mass(&ctx.residues);
        if !ctx.peptide_tolerance.contains(ctx.precursor_mass, mass) {
            debug!(
                "Dropping candidate {}: mass {:.3} does not match precursor {:.3}",
                cand.render(&ctx.scale),
                ctx.scale.to_da(mass),
                ctx.scale.to_da(ctx.precursor_mass),
            );
            continue;
        }
        for unit in cand.units.iter().filter(|u| u.is_gap()) {
            if gap_table.extend_novel(unit.mass, ctx.fragment_tolerance.error) {
                debug!("Registered novel gap mass {:.3}", ctx.scale.to_da(unit.mass));
            }
        }
        out.push(cand);
    }

    if out.is_empty() {
        return Err(DataProcessingError::ExpectedNonEmptyData {
            context: Some(format!(
                "none of {} candidates matches the precursor mass",
                num_input
            )),
        });
    }
    debug!("Collected {} of {} candidates", out.len(), num_input);
    Ok(out)
}
