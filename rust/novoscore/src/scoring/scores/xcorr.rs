use crate::errors::DataProcessingError;
use crate::mass::ScaledMass;
use crate::models::Candidate;
use crate::scoring::context::ScoringContext;
use crate::scoring::spectrum::PreparedSpectrum;
use crate::utils::fft::{
    Complex,
    cross_correlate,
};

const SEGMENTS: usize = 10;
const SEGMENT_MAX: f64 = 50.0;
const PRIMARY_HEIGHT: f64 = 50.0;
const FLANK_HEIGHT: f64 = 25.0;
const SECONDARY_HEIGHT: f64 = 10.0;
/// Lags on each side of zero used as the correlation background.
const BACKGROUND_LAGS: usize = 75;

/// Unit-resolution cross-correlation between the spectrum and the ions a
/// candidate predicts.
///
/// The experimental side only depends on the spectrum and is built once;
/// each [`score`](Self::score) call rebuilds the theoretical side in the
/// same buffers.
#[derive(Debug)]
pub struct CrossCorrelationScorer {
    experimental: Vec<f64>,
    experimental_energy: f64,
    theoretical: Vec<f64>,
    scratch: Vec<Complex>,
    correlation: Vec<f64>,
}

fn bin_of(ctx: &ScoringContext, mz: ScaledMass) -> usize {
    let one = ctx.scale.one_dalton();
    mz.div_round(one.raw()).raw().max(0) as usize
}

impl CrossCorrelationScorer {
    pub fn new(ctx: &ScoringContext, spectrum: &PreparedSpectrum) -> Self {
        let top_bin = bin_of(ctx, ctx.precursor_mh()).max(bin_of(ctx, spectrum.peaks.max_mz()));
        let len = (top_bin + 2 + BACKGROUND_LAGS).next_power_of_two();

        let mut experimental = vec![0.0f64; len];
        for (peak, usable) in spectrum.peaks.peaks().iter().zip(spectrum.usable()) {
            if !usable {
                continue;
            }
            let bin = bin_of(ctx, peak.mz);
            let value = (peak.intensity.max(0.0) as f64).sqrt();
            experimental[bin] = experimental[bin].max(value);
        }

        let segment_len = top_bin / SEGMENTS + 1;
        for segment in experimental[..=top_bin].chunks_mut(segment_len) {
            let max = segment.iter().cloned().fold(0.0, f64::max);
            if max > 0.0 {
                let factor = SEGMENT_MAX / max;
                segment.iter_mut().for_each(|v| *v *= factor);
            }
        }
        let experimental_energy = experimental.iter().map(|v| v * v).sum();

        Self {
            experimental,
            experimental_energy,
            theoretical: vec![0.0; len],
            scratch: Vec::with_capacity(len),
            correlation: Vec::with_capacity(len),
        }
    }

    fn place(&mut self, bin: usize, height: f64) {
        if let Some(v) = self.theoretical.get_mut(bin) {
            *v = v.max(height);
        }
    }

    fn build_theoretical(&mut self, ctx: &ScoringContext, candidate: &Candidate) {
        self.theoretical.iter_mut().for_each(|v| *v = 0.0);
        let residues = &ctx.residues;
        let total = candidate.unit_mass_sum();
        for prefix in candidate.breakpoints() {
            let b = prefix + residues.n_terminus - residues.hydrogen + residues.proton;
            let y = total - prefix + residues.termini() + residues.proton;
            for primary in [b, y] {
                let bin = bin_of(ctx, primary);
                self.place(bin, PRIMARY_HEIGHT);
                if bin > 0 {
                    self.place(bin - 1, FLANK_HEIGHT);
                }
                self.place(bin + 1, FLANK_HEIGHT);
                for loss in [residues.water, residues.ammonia] {
                    self.place(bin_of(ctx, primary - loss), SECONDARY_HEIGHT);
                }
            }
            self.place(bin_of(ctx, b - residues.carbon_monoxide), SECONDARY_HEIGHT);
        }
    }

    /// Background-corrected, normalized zero-lag correlation in [0, 1].
    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    pub fn score(
        &mut self,
        ctx: &ScoringContext,
        candidate: &Candidate,
    ) -> Result<f32, DataProcessingError> {
        self.build_theoretical(ctx, candidate);
        let theoretical_energy: f64 = self.theoretical.iter().map(|v| v * v).sum();
        let denominator = (self.experimental_energy * theoretical_energy).sqrt();
        if denominator <= 0.0 {
            return Ok(0.0);
        }

        cross_correlate(
            &self.experimental,
            &self.theoretical,
            &mut self.scratch,
            &mut self.correlation,
        )?;

        let n = self.correlation.len();
        let lags = BACKGROUND_LAGS.min((n - 1) / 2);
        let background = if lags == 0 {
            0.0
        } else {
            (1..=lags)
                .map(|l| self.correlation[l] + self.correlation[n - l])
                .sum::<f64>()
                / (2 * lags) as f64
        };
        let score = (self.correlation[0] - background) / denominator;
        Ok(score.clamp(0.0, 1.0) as f32)
    }
}
