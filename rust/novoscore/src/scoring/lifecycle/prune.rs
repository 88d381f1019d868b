use crate::models::{
    Candidate,
    PruneMetrics,
};
use crate::scoring::context::ScoringContext;
use crate::scoring::ion_series::{
    MatchBuffers,
    Series,
};
use crate::scoring::spectrum::PreparedSpectrum;
use tracing::{
    debug,
    warn,
};

const QUANTILE_RELAX_FACTOR: f32 = 0.5;
const MIN_QUANTILE: f32 = 0.01;
const COVERAGE_RELAX_STEP: f32 = 0.1;

/// Computes the statistics the pruning passes filter on.
///
/// `scratch` is resized to the peak count and overwritten.
pub fn prune_metrics(
    ctx: &ScoringContext,
    spectrum: &PreparedSpectrum,
    buffers: &MatchBuffers,
    scratch: &mut Vec<f32>,
) -> PruneMetrics {
    PruneMetrics {
        contiguity: contiguity_fraction(spectrum, buffers, scratch),
        high_mz_coverage: high_mz_coverage(ctx, spectrum, buffers),
    }
}

/// Share of the usable ion current explained by b or y ions that have a
/// neighbour of the same series at an adjacent cleavage position.
fn contiguity_fraction(
    spectrum: &PreparedSpectrum,
    buffers: &MatchBuffers,
    scratch: &mut Vec<f32>,
) -> f32 {
    let total = spectrum.usable_current();
    if total <= 0.0 {
        return 0.0;
    }
    scratch.clear();
    scratch.resize(spectrum.peaks.len(), 0.0);

    for hit in buffers.hits.iter() {
        let series = match hit.series {
            Series::N => &buffers.n_series,
            Series::C => &buffers.c_series,
        };
        // position is 1-based, series[position - 1] is the hit itself
        let before = hit.position >= 2 && series[hit.position - 2] > 0.0;
        let after = series.get(hit.position).is_some_and(|c| *c > 0.0);
        if before || after {
            scratch[hit.peak] = scratch[hit.peak].max(hit.confidence);
        }
    }

    let explained: f32 = spectrum
        .peaks
        .peaks()
        .iter()
        .zip(scratch.iter())
        .zip(spectrum.usable())
        .filter(|(_, usable)| **usable)
        .map(|((peak, conf), _)| peak.intensity * conf)
        .sum();
    (explained / total).clamp(0.0, 1.0)
}

/// Fraction of the usable peaks above the precursor m/z that were explained.
fn high_mz_coverage(
    ctx: &ScoringContext,
    spectrum: &PreparedSpectrum,
    buffers: &MatchBuffers,
) -> Option<f32> {
    let (high, explained) = spectrum
        .peaks
        .peaks()
        .iter()
        .zip(buffers.confidence.iter())
        .zip(spectrum.usable())
        .filter(|((peak, _), usable)| **usable && peak.mz > ctx.precursor_mz)
        .fold((0usize, 0usize), |(h, e), ((_, conf), _)| {
            (h + 1, e + (*conf > 0.0) as usize)
        });
    if high == 0 {
        None
    } else {
        Some(explained as f32 / high as f32)
    }
}

/// Drops the bottom quantile by contiguity metric.
///
/// Candidates that explain no cleavage site at all always go. Everything
/// else, including candidates with zero contiguity, is ranked together and
/// the quantile is halved until at least `min_survivors` remain.
pub fn prune_by_contiguity(ctx: &ScoringContext, candidates: &mut Vec<Candidate>) {
    let num_input = candidates.len();
    candidates.retain(|c| c.scores.cleavage_sites > 0);
    let floor = ctx.params.min_survivors;
    if candidates.len() <= floor {
        debug!(
            "Contiguity pass kept {} of {} candidates",
            candidates.len(),
            num_input
        );
        return;
    }

    let mut sorted: Vec<f32> = candidates
        .iter()
        .map(|c| c.prune_metrics.contiguity)
        .collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut quantile = ctx.params.contiguity_prune_quantile;
    let threshold = loop {
        let idx = ((quantile * sorted.len() as f32) as usize).min(sorted.len() - 1);
        let threshold = sorted[idx];
        let survivors = sorted.len() - sorted.partition_point(|m| *m < threshold);
        if survivors >= floor || quantile < MIN_QUANTILE {
            break threshold;
        }
        quantile *= QUANTILE_RELAX_FACTOR;
        warn!(
            "Relaxing contiguity quantile to {:.3}, only {} candidates would survive",
            quantile, survivors
        );
    };
    candidates.retain(|c| c.prune_metrics.contiguity >= threshold);
    debug!(
        "Contiguity pass kept {} of {} candidates",
        candidates.len(),
        num_input
    );
}

/// Requires candidates to explain a fraction of the peaks above the precursor.
///
/// The fraction is lowered in steps until enough candidates survive.
/// Candidates are not judged when the spectrum has no such peaks.
pub fn prune_by_high_mz_coverage(ctx: &ScoringContext, candidates: &mut Vec<Candidate>) {
    let num_input = candidates.len();
    let floor = ctx.params.min_survivors.min(candidates.len());
    let passes = |c: &Candidate, threshold: f32| {
        c.prune_metrics
            .high_mz_coverage
            .is_none_or(|cov| cov >= threshold)
    };

    let mut threshold = ctx.params.high_mz_coverage_threshold;
    loop {
        let survivors = candidates.iter().filter(|c| passes(c, threshold)).count();
        if survivors >= floor || threshold <= 0.0 {
            break;
        }
        threshold -= COVERAGE_RELAX_STEP;
        warn!(
            "Relaxing high m/z coverage threshold to {:.2}, only {} candidates would survive",
            threshold, survivors
        );
    }
    candidates.retain(|c| passes(c, threshold));
    debug!(
        "High m/z coverage pass kept {} of {} candidates",
        candidates.len(),
        num_input
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provenance;
    use crate::scoring::context::{
        ScoringConfig,
        ScoringParameters,
    };
    use crate::scoring::testing::context_for;

    fn with_metrics(ctx: &ScoringContext, metrics: &[(f32, Option<f32>)]) -> Vec<Candidate> {
        metrics
            .iter()
            .map(|(contiguity, coverage)| {
                let mut c = Candidate::from_notation(
                    "GASPVTLNK",
                    Provenance::Assembler,
                    0.0,
                    &ctx.residues,
                    &ctx.scale,
                )
                .unwrap();
                c.scores.cleavage_sites = 4;
                c.prune_metrics = PruneMetrics {
                    contiguity: *contiguity,
                    high_mz_coverage: *coverage,
                };
                c
            })
            .collect()
    }

    fn config(min_survivors: usize) -> ScoringConfig {
        ScoringConfig {
            parameters: ScoringParameters {
                min_survivors,
                contiguity_prune_quantile: 0.5,
                high_mz_coverage_threshold: 0.5,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_sites_always_dropped() {
        let (ctx, _) = context_for("GASPVTLNK", 2, &config(10));
        let mut cands = with_metrics(&ctx, &[(0.0, None), (0.2, None), (0.0, None)]);
        cands[2].scores.cleavage_sites = 0;
        prune_by_contiguity(&ctx, &mut cands);
        assert_eq!(cands.len(), 2);
    }

    #[test]
    fn test_zero_contiguity_kept_under_floor() {
        let (ctx, _) = context_for("GASPVTLNK", 2, &config(10));
        let mut cands = with_metrics(&ctx, &[(0.0, None), (0.0, None), (0.0, None)]);
        prune_by_contiguity(&ctx, &mut cands);
        assert_eq!(cands.len(), 3);

        // With enough competition the quantile removes them.
        let (ctx, _) = context_for("GASPVTLNK", 2, &config(2));
        let mut cands = with_metrics(
            &ctx,
            &[(0.0, None), (0.0, None), (0.2, None), (0.4, None), (0.6, None), (0.8, None)],
        );
        prune_by_contiguity(&ctx, &mut cands);
        assert_eq!(cands.len(), 3);
        assert!(cands.iter().all(|c| c.prune_metrics.contiguity >= 0.4));
    }

    #[test]
    fn test_bottom_quantile_dropped() {
        let (ctx, _) = context_for("GASPVTLNK", 2, &config(2));
        let metrics: Vec<(f32, Option<f32>)> = (1..=8).map(|i| (i as f32 / 10.0, None)).collect();
        let mut cands = with_metrics(&ctx, &metrics);
        prune_by_contiguity(&ctx, &mut cands);
        assert_eq!(cands.len(), 4);
        assert!(cands.iter().all(|c| c.prune_metrics.contiguity >= 0.5));
    }

    #[test]
    fn test_quantile_relaxed_to_floor() {
        let (ctx, _) = context_for("GASPVTLNK", 2, &config(6));
        let metrics: Vec<(f32, Option<f32>)> = (1..=8).map(|i| (i as f32 / 10.0, None)).collect();
        let mut cands = with_metrics(&ctx, &metrics);
        prune_by_contiguity(&ctx, &mut cands);
        // 0.5 would leave 4, 0.25 leaves 6
        assert_eq!(cands.len(), 6);
    }

    #[test]
    fn test_coverage_threshold_relaxed() {
        let (ctx, _) = context_for("GASPVTLNK", 2, &config(2));
        let mut cands = with_metrics(
            &ctx,
            &[(1.0, Some(0.9)), (1.0, Some(0.35)), (1.0, Some(0.1)), (1.0, None)],
        );
        prune_by_high_mz_coverage(&ctx, &mut cands);
        // Two pass at 0.5 already: the 0.9 one and the one without such peaks.
        assert_eq!(cands.len(), 2);

        let (ctx, _) = context_for("GASPVTLNK", 2, &config(3));
        let mut cands = with_metrics(
            &ctx,
            &[(1.0, Some(0.9)), (1.0, Some(0.35)), (1.0, Some(0.15)), (1.0, Some(0.05))],
        );
        prune_by_high_mz_coverage(&ctx, &mut cands);
        assert_eq!(cands.len(), 3);
    }
}
