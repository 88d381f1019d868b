use crate::mass::ScaledMass;
use crate::models::{
    Candidate,
    Provenance,
    SequenceUnit,
};
use crate::scoring::context::ScoringContext;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Order of preference between two redundant candidates, `Greater` meaning
/// `a` is kept. Ties go to the one seen first.
fn preference(a: &Candidate, b: &Candidate) -> Ordering {
    let provenance_rank = |c: &Candidate| match c.provenance {
        Provenance::Database => 1,
        Provenance::Assembler => 0,
    };
    provenance_rank(a)
        .cmp(&provenance_rank(b))
        .then(a.assembler_score.total_cmp(&b.assembler_score))
}

/// Drops candidates with exactly the same units, keeping the preferred copy
/// in the position of the first one seen.
pub fn deduplicate_exact(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen: HashMap<Vec<SequenceUnit>, usize> = HashMap::with_capacity(candidates.len());
    let mut out: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for cand in candidates {
        match seen.get(&cand.units) {
            Some(&idx) => {
                if preference(&cand, &out[idx]) == Ordering::Greater {
                    out[idx] = cand;
                }
            }
            None => {
                seen.insert(cand.units.clone(), out.len());
                out.push(cand);
            }
        }
    }
    out
}

/// Every breakpoint of `inner` has one of `outer` within `tolerance`.
///
/// Both slices must be ascending.
fn breakpoints_contained(inner: &[ScaledMass], outer: &[ScaledMass], tolerance: ScaledMass) -> bool {
    let mut j = 0;
    for bp in inner {
        while j < outer.len() && outer[j] < *bp - tolerance {
            j += 1;
        }
        if j == outer.len() || outer[j] > *bp + tolerance {
            return false;
        }
    }
    true
}

/// Removes candidates whose breakpoints are a subset of another's.
///
/// A candidate that only merges residues of another one into gaps says
/// nothing new about the spectrum. When two candidates cover each other
/// (or the one being covered comes from the database) the preference
/// order decides: database first, then assembler score, then input order.
#[cfg_attr(
    feature = "instrumentation",
    tracing::instrument(skip_all, level = "trace")
)]
pub fn deduplicate(ctx: &ScoringContext, candidates: Vec<Candidate>) -> Vec<Candidate> {
    let num_input = candidates.len();
    let candidates = deduplicate_exact(candidates);
    let tolerance = ctx.fragment_tolerance.error;
    let breakpoints: Vec<Vec<ScaledMass>> = candidates.iter().map(|c| c.breakpoints()).collect();
    let mut removed = vec![false; candidates.len()];

    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            if removed[i] {
                break;
            }
            if removed[j] {
                continue;
            }
            let i_in_j = breakpoints_contained(&breakpoints[i], &breakpoints[j], tolerance);
            let j_in_i = breakpoints_contained(&breakpoints[j], &breakpoints[i], tolerance);
            let loser = match (i_in_j, j_in_i) {
                (false, false) => continue,
                (true, true) => {
                    if preference(&candidates[j], &candidates[i]) == Ordering::Greater {
                        i
                    } else {
                        j
                    }
                }
                (true, false) => {
                    if candidates[i].provenance == Provenance::Database
                        && candidates[j].provenance != Provenance::Database
                    {
                        j
                    } else {
                        i
                    }
                }
                (false, true) => {
                    if candidates[j].provenance == Provenance::Database
                        && candidates[i].provenance != Provenance::Database
                    {
                        i
                    } else {
                        j
                    }
                }
            };
            removed[loser] = true;
        }
    }

    let out: Vec<Candidate> = candidates
        .into_iter()
        .zip(removed)
        .filter_map(|(c, r)| (!r).then_some(c))
        .collect();
    debug!("Deduplication kept {} of {} candidates", out.len(), num_input);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::context::ScoringConfig;
    use crate::scoring::testing::context_for;

    fn parse(ctx: &ScoringContext, s: &str, provenance: Provenance, score: f32) -> Candidate {
        Candidate::from_notation(s, provenance, score, &ctx.residues, &ctx.scale).unwrap()
    }

    #[test]
    fn test_gap_version_is_contained() {
        let (ctx, _) = context_for("GASPVTLNK", 2, &ScoringConfig::default());
        let cands = vec![
            parse(&ctx, "[128.06]SPVTLNK", Provenance::Assembler, 5.0),
            parse(&ctx, "GASPVTLNK", Provenance::Assembler, 1.0),
        ];
        let out = deduplicate(&ctx, cands);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].render(&ctx.scale), "GASPVTLNK");
    }

    #[test]
    fn test_database_preferred() {
        let (ctx, _) = context_for("GASPVTLNK", 2, &ScoringConfig::default());
        // Breakpoints stop before the last unit, so these cover each other.
        let cands = vec![
            parse(&ctx, "GASPVTLNQ", Provenance::Assembler, 9.0),
            parse(&ctx, "GASPVTLNK", Provenance::Database, 0.0),
        ];
        let out = deduplicate(&ctx, cands);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].provenance, Provenance::Database);

        // A database sequence is kept even when an assembler one refines it.
        let cands = vec![
            parse(&ctx, "[128.06]SPVTLNK", Provenance::Database, 0.0),
            parse(&ctx, "GASPVTLNK", Provenance::Assembler, 1.0),
        ];
        let out = deduplicate(&ctx, cands);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].provenance, Provenance::Database);
    }

    #[test]
    fn test_exact_duplicates_keep_best_score() {
        let (ctx, _) = context_for("GASPVTLNK", 2, &ScoringConfig::default());
        let cands = vec![
            parse(&ctx, "GASPVTLNK", Provenance::Assembler, 1.0),
            parse(&ctx, "SAGPVTLNK", Provenance::Assembler, 1.0),
            parse(&ctx, "GASPVTLNK", Provenance::Assembler, 3.0),
        ];
        let out = deduplicate_exact(cands);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].assembler_score, 3.0);
    }

    #[test]
    fn test_distinct_candidates_survive() {
        let (ctx, _) = context_for("GASPVTLNK", 2, &ScoringConfig::default());
        let cands = vec![
            parse(&ctx, "GASPVTLNK", Provenance::Assembler, 1.0),
            parse(&ctx, "AGSPVTLNK", Provenance::Assembler, 1.0),
        ];
        assert_eq!(deduplicate(&ctx, cands).len(), 2);
    }
}
