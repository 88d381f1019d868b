use crate::mass::{
    GapTable,
    ScaledMass,
};
use crate::models::{
    Candidate,
    SequenceUnit,
};
use crate::scoring::context::ScoringContext;
use itertools::Itertools;
use tracing::debug;

/// Interpretations of one unit an accurate-mass instrument can tell apart,
/// the unit itself first.
fn unit_alternatives(
    ctx: &ScoringContext,
    gap_table: &GapTable,
    unit: &SequenceUnit,
) -> Vec<SequenceUnit> {
    let resolution = ctx.fragment_tolerance.error.times(2);
    let mut out = vec![*unit];
    match unit.residue {
        Some(res) => {
            if let Some(partner) = res.isobaric_partner() {
                let alt = SequenceUnit::residue(partner, &ctx.residues);
                if resolves(ctx, alt.mass - unit.mass) {
                    out.push(alt);
                }
            }
        }
        None => {
            let window = ctx.scale.scale(ctx.params.gap_expansion_window);
            for mass in gap_table.resolved_dipeptide_masses(unit.mass, window, resolution) {
                if resolves(ctx, mass - unit.mass) {
                    out.push(SequenceUnit::gap(mass));
                }
            }
        }
    }
    out
}

fn num_variants(choices: &[Vec<SequenceUnit>]) -> usize {
    choices
        .iter()
        .fold(1usize, |acc, c| acc.saturating_mul(c.len()))
}

/// Multiplies candidates into the variants the instrument resolves.
///
/// Q/K, F/oxidized-M and gaps whose mass fits several distinct dipeptides
/// become separate candidates. The total number of candidates is kept
/// under `expansion_cap` by collapsing, candidate by candidate, the
/// position with the most choices back to its original interpretation.
/// Variants that no longer match the precursor mass are dropped; the
/// original candidate is always kept.
#[cfg_attr(
    feature = "instrumentation",
    tracing::instrument(skip_all, level = "trace")
)]
pub fn expand_candidates(
    ctx: &ScoringContext,
    gap_table: &GapTable,
    candidates: Vec<Candidate>,
) -> Vec<Candidate> {
    let cap = ctx.params.expansion_cap;
    let num_input = candidates.len();
    let mut out: Vec<Candidate> = Vec::with_capacity(num_input);

    for (i, cand) in candidates.into_iter().enumerate() {
        let still_to_come = num_input - i - 1;
        let budget = cap.saturating_sub(out.len() + still_to_come).max(1);

        let mut choices: Vec<Vec<SequenceUnit>> = cand
            .units
            .iter()
            .map(|u| unit_alternatives(ctx, gap_table, u))
            .collect();
        while num_variants(&choices) > budget {
            let Some((widest, _)) = choices.iter().enumerate().max_by_key(|(_, c)| c.len())
            else {
                break;
            };
            choices[widest].truncate(1);
        }
        if num_variants(&choices) == 1 {
            out.push(cand);
            continue;
        }

        let variants = choices.into_iter().multi_cartesian_product().skip(1);
        let mut num_new = 0;
        let provenance = cand.provenance;
        let score = cand.assembler_score;
        out.push(cand);
        for units in variants {
            let variant = Candidate::new(units, provenance, score);
            let mass = variant.neutral_mass(&ctx.residues);
            if ctx.peptide_tolerance.contains(ctx.precursor_mass, mass) {
                out.push(variant);
                num_new += 1;
            }
        }
        debug!("Expanded candidate into {} variants", num_new);
    }

    debug!("Expansion grew {} candidates to {}", num_input, out.len());
    out
}

/// Whether the instrument can separate two masses `delta` apart.
pub fn resolves(ctx: &ScoringContext, delta: ScaledMass) -> bool {
    ctx.fragment_tolerance.error.times(2) < delta.abs()
}
