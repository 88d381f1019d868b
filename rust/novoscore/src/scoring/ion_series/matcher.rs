use super::hypotheses::{
    INTERNAL_MAX_UNITS,
    INTERNAL_MIN_UNITS,
    INTERNAL_PROLINE_WEIGHT,
    INTERNAL_WEIGHT,
    IMMONIUM_WEIGHT,
    ION_HYPOTHESES,
    IonHypothesis,
    IonKind,
    Series,
    Trigger,
};
use crate::mass::{
    Residue,
    ScaledMass,
};
use crate::models::{
    Candidate,
    PeakList,
};
use crate::scoring::context::ScoringContext;

/// Best b or y hit at one cleavage position and charge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackboneHit {
    /// Cleavage position, 1..n-1, counted from the N-terminus.
    pub position: usize,
    pub series: Series,
    pub peak: usize,
    /// Weighted confidence given to the peak.
    pub confidence: f32,
}

/// One expected backbone ion, searched for or not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IonObservation {
    pub kind: IonKind,
    /// Singly charged m/z, where the background density is estimated.
    pub mz: ScaledMass,
    /// The trigger passed and the ion was looked for.
    pub searched: bool,
    /// The ion would be searched for if its primary had been found.
    pub plausible: bool,
    pub found: bool,
}

/// Per-candidate scratch space, allocated once per run.
///
/// `confidence` and `ion_kind` are index aligned with the peak list the
/// candidate is matched against. `n_series[i - 1]` and `c_series[i - 1]`
/// hold the best primary-ion confidence at cleavage position `i`.
#[derive(Debug, Default)]
pub struct MatchBuffers {
    pub confidence: Vec<f32>,
    pub ion_kind: Vec<Option<IonKind>>,
    pub n_series: Vec<f32>,
    pub c_series: Vec<f32>,
    pub hits: Vec<BackboneHit>,
    pub observations: Vec<IonObservation>,
    /// (calculated, observed) pairs of confident b/y matches.
    pub calibration_pairs: Vec<(ScaledMass, ScaledMass)>,
    pub cleavage_sites: usize,
    prefix: Vec<ScaledMass>,
    prefix_basic: Vec<usize>,
    prefix_metox: Vec<usize>,
}

impl MatchBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self, num_peaks: usize, num_positions: usize) {
        self.confidence.clear();
        self.confidence.resize(num_peaks, 0.0);
        self.ion_kind.clear();
        self.ion_kind.resize(num_peaks, None);
        self.n_series.clear();
        self.n_series.resize(num_positions, 0.0);
        self.c_series.clear();
        self.c_series.resize(num_positions, 0.0);
        self.hits.clear();
        self.observations.clear();
        self.calibration_pairs.clear();
        self.cleavage_sites = 0;
    }

    /// Number of peaks explained by anything.
    pub fn matched_peaks(&self) -> usize {
        self.confidence.iter().filter(|c| **c > 0.0).count()
    }

    /// Whether the cleavage position (1-based) is covered by a b or y ion.
    pub fn position_covered(&self, position: usize) -> bool {
        self.n_series[position - 1] > 0.0 || self.c_series[position - 1] > 0.0
    }
}

/// More charges on the precursor than side chains able to carry them.
pub fn has_charge_excess(ctx: &ScoringContext, candidate: &Candidate) -> bool {
    ctx.charge as usize > candidate.basic_residue_count()
}

/// Assigns peaks to the ions a candidate should produce.
pub struct IonSeriesMatcher<'a> {
    ctx: &'a ScoringContext,
}

impl<'a> IonSeriesMatcher<'a> {
    pub fn new(ctx: &'a ScoringContext) -> Self {
        Self { ctx }
    }

    /// Matches `candidate` against `peaks`, filling `buffers`.
    ///
    /// Returns the cleavage-site count: the covered positions of the
    /// longest run of b/y coverage, isolated single misses bridged.
    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    pub fn annotate(
        &self,
        candidate: &Candidate,
        peaks: &PeakList,
        buffers: &mut MatchBuffers,
    ) -> usize {
        let positions = candidate.cleavage_positions();
        buffers.reset(peaks.len(), positions);
        self.fill_prefixes(candidate, buffers);

        let charge_excess = has_charge_excess(self.ctx, candidate);
        let n_plausible = charge_excess
            || matches!(
                candidate.n_terminal_residue(),
                Some(Residue::Gln | Residue::Glu)
            );

        for position in 1..=positions {
            self.match_position(position, peaks, buffers, n_plausible, charge_excess);
        }
        self.match_diagnostic_ions(candidate, peaks, buffers);
        self.match_internal_fragments(candidate, peaks, buffers);

        let sites = self.count_cleavage_sites(buffers, positions);
        buffers.cleavage_sites = sites;
        sites
    }

    fn fill_prefixes(&self, candidate: &Candidate, buffers: &mut MatchBuffers) {
        buffers.prefix.clear();
        buffers.prefix_basic.clear();
        buffers.prefix_metox.clear();
        let mut mass = ScaledMass::ZERO;
        let mut basic = 0;
        let mut metox = 0;
        buffers.prefix.push(mass);
        buffers.prefix_basic.push(basic);
        buffers.prefix_metox.push(metox);
        for unit in &candidate.units {
            mass += unit.mass;
            basic += unit.is_basic() as usize;
            metox += (unit.residue == Some(Residue::MetOx)) as usize;
            buffers.prefix.push(mass);
            buffers.prefix_basic.push(basic);
            buffers.prefix_metox.push(metox);
        }
    }

    fn max_fragment_charge(&self, basic_residues: usize) -> u8 {
        let cap = (basic_residues + 1).min(u8::MAX as usize) as u8;
        self.ctx.charge.min(cap).max(1)
    }

    fn match_position(
        &self,
        position: usize,
        peaks: &PeakList,
        buffers: &mut MatchBuffers,
        n_plausible: bool,
        charge_excess: bool,
    ) {
        let n = buffers.prefix.len() - 1;
        let residues = &self.ctx.residues;
        let total = buffers.prefix[n];
        let n_sum = buffers.prefix[position];
        let c_sum = total - n_sum;

        let n_base = n_sum + residues.n_terminus - residues.hydrogen;
        let c_base = c_sum + residues.termini();
        let n_basic = buffers.prefix_basic[position];
        let c_basic = buffers.prefix_basic[n] - n_basic;
        let n_metox = buffers.prefix_metox[position] > 0;
        let c_metox = buffers.prefix_metox[n] > buffers.prefix_metox[position];

        let mut primary_found = [false, false];
        for hyp in ION_HYPOTHESES.iter() {
            let (base, basic, metox, plausible, slot) = match hyp.series {
                Series::N => (n_base, n_basic, n_metox, n_plausible, 0),
                Series::C => (c_base, c_basic, c_metox, charge_excess, 1),
            };
            let (searched, could_search) = match hyp.trigger {
                Trigger::Always => (true, true),
                Trigger::PrimaryOrPlausible => (primary_found[slot] || plausible, true),
                Trigger::ContainsMetOx => (metox, metox),
            };
            let loss = hyp.loss.mass(residues);
            let mz_1 = base - loss + residues.proton;
            let mut found = false;
            if searched {
                for z in 1..=self.max_fragment_charge(basic) {
                    let zi = z as i32;
                    let mz = (base - loss + residues.proton.times(zi)).div_round(zi);
                    if let Some((peak, raw)) = self.search(peaks, mz, hyp, buffers) {
                        found = true;
                        if hyp.kind.is_primary() {
                            self.record_primary(position, hyp, peak, raw, mz, peaks, buffers);
                        }
                    }
                }
            }
            if hyp.kind.is_primary() {
                primary_found[slot] |= found;
            }
            buffers.observations.push(IonObservation {
                kind: hyp.kind,
                mz: mz_1,
                searched,
                plausible: could_search,
                found,
            });
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record_primary(
        &self,
        position: usize,
        hyp: &IonHypothesis,
        peak: usize,
        raw: f32,
        calculated: ScaledMass,
        peaks: &PeakList,
        buffers: &mut MatchBuffers,
    ) {
        let weighted = raw * hyp.weight;
        let slot = match hyp.series {
            Series::N => &mut buffers.n_series[position - 1],
            Series::C => &mut buffers.c_series[position - 1],
        };
        *slot = slot.max(weighted);
        buffers.hits.push(BackboneHit {
            position,
            series: hyp.series,
            peak,
            confidence: weighted,
        });
        if raw >= self.ctx.params.recalibration_confidence {
            buffers
                .calibration_pairs
                .push((calculated, peaks.peaks()[peak].mz));
        }
    }

    /// Raises the confidence of every peak inside the wide band of
    /// `calculated`. Returns the closest hit and its unweighted confidence.
    fn search(
        &self,
        peaks: &PeakList,
        calculated: ScaledMass,
        hyp: &IonHypothesis,
        buffers: &mut MatchBuffers,
    ) -> Option<(usize, f32)> {
        self.search_kind(peaks, calculated, hyp.kind, hyp.weight, buffers)
    }

    fn search_kind(
        &self,
        peaks: &PeakList,
        calculated: ScaledMass,
        kind: IonKind,
        weight: f32,
        buffers: &mut MatchBuffers,
    ) -> Option<(usize, f32)> {
        let tol = &self.ctx.fragment_tolerance;
        let (lo, hi) = tol.window(calculated);
        let mut best: Option<(usize, f32)> = None;
        for idx in peaks.window(lo, hi) {
            let raw = tol.match_confidence(peaks.peaks()[idx].mz, calculated, 0.0);
            if raw <= 0.0 {
                continue;
            }
            let weighted = raw * weight;
            if weighted > buffers.confidence[idx] {
                buffers.confidence[idx] = weighted;
                buffers.ion_kind[idx] = Some(kind);
            }
            if best.is_none_or(|(_, b)| raw > b) {
                best = Some((idx, raw));
            }
        }
        best
    }

    fn match_diagnostic_ions(
        &self,
        candidate: &Candidate,
        peaks: &PeakList,
        buffers: &mut MatchBuffers,
    ) {
        let residues = &self.ctx.residues;
        let limit = self.ctx.scale.scale(self.ctx.params.diagnostic_mass_limit);
        let mut seen = [false; Residue::ALL.len()];
        for unit in &candidate.units {
            match unit.residue {
                Some(res) => {
                    if std::mem::replace(&mut seen[res as usize], true) {
                        continue;
                    }
                    let mz = unit.mass - residues.carbon_monoxide + residues.proton;
                    if mz <= limit {
                        self.search_kind(peaks, mz, IonKind::Immonium, IMMONIUM_WEIGHT, buffers);
                    }
                }
                None => {
                    let b_like = unit.mass + residues.proton;
                    let a_like = b_like - residues.carbon_monoxide;
                    for mz in [b_like, a_like] {
                        if mz <= limit {
                            self.search_kind(
                                peaks,
                                mz,
                                IonKind::GapDiagnostic,
                                IMMONIUM_WEIGHT,
                                buffers,
                            );
                        }
                    }
                }
            }
        }
    }

    fn match_internal_fragments(
        &self,
        candidate: &Candidate,
        peaks: &PeakList,
        buffers: &mut MatchBuffers,
    ) {
        let residues = &self.ctx.residues;
        let n = candidate.len();
        if n < INTERNAL_MIN_UNITS + 2 {
            return;
        }
        for start in 1..n - 1 {
            let weight = if candidate.units[start].residue == Some(Residue::Pro) {
                INTERNAL_PROLINE_WEIGHT
            } else {
                INTERNAL_WEIGHT
            };
            for len in INTERNAL_MIN_UNITS..=INTERNAL_MAX_UNITS {
                let end = start + len;
                if end >= n {
                    break;
                }
                let mass = buffers.prefix[end] - buffers.prefix[start];
                let b_like = mass + residues.proton;
                self.search_kind(peaks, b_like, IonKind::Internal, weight, buffers);
                let a_like = b_like - residues.carbon_monoxide;
                self.search_kind(peaks, a_like, IonKind::InternalA, weight, buffers);
            }
        }
    }

    fn count_cleavage_sites(&self, buffers: &MatchBuffers, positions: usize) -> usize {
        let edge_forced = self.ctx.instrument.has_low_mass_cutoff();
        let covered = (1..=positions).map(|p| {
            buffers.position_covered(p) || (edge_forced && (p == 1 || p == positions))
        });
        longest_covered_run(covered)
    }
}

/// Counts the covered positions of the longest run, bridging single misses.
///
/// ```
/// use novoscore::scoring::ion_series::longest_covered_run;
///
/// let run = |s: &str| longest_covered_run(s.chars().map(|c| c == 'x'));
/// assert_eq!(run("xx.xx"), 4);
/// assert_eq!(run("xx..xxx"), 3);
/// assert_eq!(run("....."), 0);
/// ```
pub fn longest_covered_run(covered: impl IntoIterator<Item = bool>) -> usize {
    let mut best = 0;
    let mut current = 0;
    let mut misses = 0;
    for c in covered {
        if c {
            current += 1;
            misses = 0;
        } else {
            misses += 1;
            if misses > 1 {
                current = 0;
            }
        }
        best = best.max(current);
    }
    best
}
