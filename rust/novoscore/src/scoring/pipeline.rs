//! Candidate lifecycle for one precursor.
//!
//! # Stages
//!
//! 1. **Collect**: merge assembler and database candidates, drop mass misses
//! 2. **Deduplicate**: drop candidates whose breakpoints another one covers
//! 3. **Expand** (accurate-mass instruments): split resolvable ambiguities
//! 4. **Score**: ion-series matching (after recalibration on accurate-mass
//!    instruments), intensity, quality, probability and prune metrics
//! 5. **Prune**: contiguity filter, then high m/z coverage filter
//! 6. **Compose**: cross-correlation and composite score of the survivors
//! 7. **Rank**: order, number, threshold and truncate
//!
//! # Buffer reuse
//!
//! Every candidate is matched against the same peak list, so the matcher
//! scratch space, the recalibrated peak copy and the FFT buffers are
//! allocated once per pipeline and overwritten for each candidate.

use super::composite::composite_score;
use super::context::ScoringContext;
use super::ion_series::{
    IonSeriesMatcher,
    MatchBuffers,
};
use super::lifecycle::{
    calibration_correction,
    collect_candidates,
    deduplicate,
    deduplicate_exact,
    expand_candidates,
    prune_by_contiguity,
    prune_by_high_mz_coverage,
    prune_metrics,
    rank_candidates,
};
use super::scores::{
    CrossCorrelationScorer,
    intensity_score,
    probability_score,
    quality_score,
};
use super::search_results::{
    RankedCandidate,
    RankedCandidateBuilder,
};
use super::spectrum::PreparedSpectrum;
use super::timings::ScoreTimings;
use crate::errors::{
    DataProcessingError,
    Result,
};
use crate::mass::GapTable;
use crate::models::{
    Candidate,
    PeakList,
};
use std::time::Instant;
use tracing::{
    debug,
    info,
};

#[derive(Debug, Default)]
struct ScoringBuffers {
    matches: MatchBuffers,
    corrected: PeakList,
    contiguity: Vec<f32>,
}

pub struct RankingPipeline<'a> {
    ctx: &'a ScoringContext,
    /// Run-private copy of the gap table, extended while collecting.
    gap_table: GapTable,
    spectrum: PreparedSpectrum,
    buffers: ScoringBuffers,
}

impl<'a> RankingPipeline<'a> {
    pub fn new(ctx: &'a ScoringContext, gap_table: &GapTable, peaks: PeakList) -> Self {
        Self {
            ctx,
            gap_table: gap_table.clone(),
            spectrum: PreparedSpectrum::new(peaks, ctx),
            buffers: ScoringBuffers::default(),
        }
    }

    pub fn gap_table(&self) -> &GapTable {
        &self.gap_table
    }

    pub fn spectrum(&self) -> &PreparedSpectrum {
        &self.spectrum
    }

    /// Runs every stage and returns the shortlist, best first.
    pub fn run(
        &mut self,
        assembler: Vec<Candidate>,
        database: Vec<Candidate>,
    ) -> Result<(Vec<RankedCandidate>, ScoreTimings)> {
        let mut timings = ScoreTimings::default();
        let num_input = assembler.len() + database.len();
        let accurate = self.ctx.instrument.is_accurate_mass();

        let st = Instant::now();
        let candidates = collect_candidates(self.ctx, &mut self.gap_table, assembler, database)?;
        timings.collect += st.elapsed();

        let st = Instant::now();
        let candidates = deduplicate(self.ctx, candidates);
        timings.dedup += st.elapsed();

        let st = Instant::now();
        let mut candidates = if accurate {
            deduplicate_exact(expand_candidates(self.ctx, &self.gap_table, candidates))
        } else {
            candidates
        };
        timings.expand += st.elapsed();

        let st = Instant::now();
        self.score_all(&mut candidates)?;
        timings.score += st.elapsed();
        let num_scored = candidates.len();

        let st = Instant::now();
        prune_by_contiguity(self.ctx, &mut candidates);
        prune_by_high_mz_coverage(self.ctx, &mut candidates);
        timings.prune += st.elapsed();

        let st = Instant::now();
        self.compose(&mut candidates)?;
        timings.compose += st.elapsed();

        let st = Instant::now();
        rank_candidates(self.ctx, &mut candidates);
        let ranked = candidates
            .iter()
            .map(|c| {
                RankedCandidateBuilder::default()
                    .with_candidate(c, self.ctx)
                    .with_scores(c)
                    .finalize()
            })
            .collect::<std::result::Result<Vec<_>, DataProcessingError>>()?;
        timings.rank += st.elapsed();

        info!(
            "Ranked {} candidates ({} input, {} scored) in {:?}",
            ranked.len(),
            num_input,
            num_scored,
            timings.total(),
        );
        Ok((ranked, timings))
    }

    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    fn score_all(&mut self, candidates: &mut [Candidate]) -> Result<()> {
        for cand in candidates.iter_mut() {
            self.score_one(cand)?;
        }
        debug!("Scored {} candidates", candidates.len());
        Ok(())
    }

    /// Matches and scores one candidate, on a recalibrated copy of the
    /// peaks when the instrument and the first match allow it.
    fn score_one(&mut self, cand: &mut Candidate) -> std::result::Result<(), DataProcessingError> {
        let ctx = self.ctx;
        let matcher = IonSeriesMatcher::new(ctx);
        let buffers = &mut self.buffers;
        matcher.annotate(cand, &self.spectrum.peaks, &mut buffers.matches);

        let mut recalibrated = false;
        if ctx.instrument.is_accurate_mass() {
            if let Some(correction) =
                calibration_correction(ctx, &buffers.matches.calibration_pairs)
            {
                buffers
                    .corrected
                    .copy_corrected_from(&self.spectrum.peaks, correction);
                matcher.annotate(cand, &buffers.corrected, &mut buffers.matches);
                recalibrated = true;
            }
        }
        let peaks = if recalibrated {
            &buffers.corrected
        } else {
            &self.spectrum.peaks
        };

        let matches = &buffers.matches;
        let render_err = |e: DataProcessingError| e.append_to_context(" (scoring stage)");
        cand.scores.cleavage_sites = matches.cleavage_sites;
        cand.scores.intensity =
            intensity_score(ctx, &self.spectrum, cand, matches).map_err(render_err)?;
        cand.scores.quality = quality_score(ctx, cand, matches).map_err(render_err)?;
        let probability = probability_score(ctx, peaks, cand, matches).map_err(render_err)?;
        cand.scores.probability = probability.score;
        cand.scores.ideal_probability = probability.ideal;
        cand.prune_metrics = prune_metrics(ctx, &self.spectrum, matches, &mut buffers.contiguity);
        Ok(())
    }

    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    fn compose(&mut self, candidates: &mut [Candidate]) -> Result<()> {
        if candidates.is_empty() {
            return Ok(());
        }
        let model = self.ctx.composite_model();
        let mut xcorr = CrossCorrelationScorer::new(self.ctx, &self.spectrum);
        for cand in candidates.iter_mut() {
            cand.scores.cross_correlation = xcorr.score(self.ctx, cand)?;
            cand.scores.composite = composite_score(model, &cand.scores);
        }
        Ok(())
    }
}
