use novoscore::mass::residues::PROTON;
use novoscore::mass::{
    GapTable,
    MassScale,
    ResidueTable,
    ScaledMass,
};
use novoscore::scoring::ion_series::{
    IonSeriesMatcher,
    MatchBuffers,
};
use novoscore::scoring::lifecycle::{
    deduplicate,
    prune_by_contiguity,
    prune_metrics,
};
use novoscore::scoring::scores::intensity_score;
use novoscore::scoring::{
    PreparedSpectrum,
    RankingPipeline,
    ScoringConfig,
    ScoringContext,
};
use novoscore::{
    Candidate,
    PeakList,
    Provenance,
};

fn parse(ctx: &ScoringContext, seq: &str, provenance: Provenance) -> Candidate {
    Candidate::from_notation(seq, provenance, 1.0, &ctx.residues, &ctx.scale).unwrap()
}

/// Charge 2 context whose precursor is the mass of `seq`.
fn context(seq: &str) -> (ScoringContext, Candidate) {
    let config = ScoringConfig::default();
    let scale = MassScale::new(config.mass_multiplier).unwrap();
    let table = ResidueTable::new(&scale, config.cysteine_modification);
    let neutral = Candidate::from_notation(seq, Provenance::Assembler, 1.0, &table, &scale)
        .unwrap()
        .neutral_mass(&table);
    let ctx = ScoringContext::new(&config, scale.to_da(neutral) / 2.0 + PROTON, 2).unwrap();
    let cand = parse(&ctx, seq, Provenance::Assembler);
    (ctx, cand)
}

fn b_ion(ctx: &ScoringContext, cand: &Candidate, i: usize) -> f64 {
    ctx.scale.to_da(cand.breakpoints()[i - 1]) + PROTON
}

fn y_ion(ctx: &ScoringContext, cand: &Candidate, i: usize) -> f64 {
    let suffix: ScaledMass = cand.units[cand.len() - i..].iter().map(|u| u.mass).sum();
    ctx.scale.to_da(suffix + ctx.residues.termini()) + PROTON
}

fn peaks_for(ctx: &ScoringContext, cand: &Candidate, lo: usize, hi: usize) -> PeakList {
    let raw: Vec<(f64, f32)> = (lo..=hi)
        .flat_map(|i| [(b_ion(ctx, cand, i), 100.0), (y_ion(ctx, cand, i), 100.0)])
        .collect();
    PeakList::new(&raw, &ctx.scale).unwrap()
}

fn annotate(ctx: &ScoringContext, cand: &Candidate, spectrum: &PreparedSpectrum) -> MatchBuffers {
    let mut buffers = MatchBuffers::new();
    IonSeriesMatcher::new(ctx).annotate(cand, &spectrum.peaks, &mut buffers);
    buffers
}

#[test]
fn test_tryptic_charge_two_scenario() {
    // b2..b8 and y2..y8 of a 9-residue tryptic peptide
    let (ctx, cand) = context("GASPVTLNK");
    let spectrum = PreparedSpectrum::new(peaks_for(&ctx, &cand, 2, 8), &ctx);
    let buffers = annotate(&ctx, &cand, &spectrum);
    assert_eq!(buffers.cleavage_sites, 8);
    let intensity = intensity_score(&ctx, &spectrum, &cand, &buffers).unwrap();
    assert!(intensity > 0.9, "{}", intensity);

    let gap_table = GapTable::new(&ctx.residues);
    let mut pipeline = RankingPipeline::new(&ctx, &gap_table, peaks_for(&ctx, &cand, 2, 8));
    let (ranked, _) = pipeline.run(vec![cand], vec![]).unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].peptide, "GASPVTLNK");
    assert_eq!(ranked[0].rank, 1);
}

#[test]
fn test_noise_free_round_trip() {
    let (ctx, cand) = context("GASPVTLNK");
    let spectrum = PreparedSpectrum::new(peaks_for(&ctx, &cand, 1, 8), &ctx);
    let buffers = annotate(&ctx, &cand, &spectrum);
    assert_eq!(buffers.cleavage_sites, cand.len() - 1);
    let intensity = intensity_score(&ctx, &spectrum, &cand, &buffers).unwrap();
    assert!(intensity >= 0.95, "{}", intensity);
}

#[test]
fn test_dipeptide_gap_deduplicated() {
    let (ctx, _) = context("GASPVTLNK");

    let kept = deduplicate(
        &ctx,
        vec![
            parse(&ctx, "[128.06]SPVTLNK", Provenance::Assembler),
            parse(&ctx, "GASPVTLNK", Provenance::Assembler),
        ],
    );
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].render(&ctx.scale), "GASPVTLNK");

    let kept = deduplicate(
        &ctx,
        vec![
            parse(&ctx, "GASPVTLNK", Provenance::Assembler),
            parse(&ctx, "[128.06]SPVTLNK", Provenance::Database),
        ],
    );
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].provenance, Provenance::Database);
}

#[test]
fn test_ranking_is_total_order() {
    let (ctx, cand) = context("GASPVTLNK");
    let gap_table = GapTable::new(&ctx.residues);
    let assembler = ["GASPVTLNK", "GASPVTLKN", "AGSPVTLNK", "GASPVTNLK", "GSAPVTLNK"]
        .iter()
        .map(|s| parse(&ctx, s, Provenance::Assembler))
        .collect();
    let mut pipeline = RankingPipeline::new(&ctx, &gap_table, peaks_for(&ctx, &cand, 1, 8));
    let (ranked, _) = pipeline.run(assembler, vec![]).unwrap();

    assert!(!ranked.is_empty());
    assert_eq!(ranked[0].peptide, "GASPVTLNK");
    let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, (1..=ranked.len()).collect::<Vec<_>>());
    for w in ranked.windows(2) {
        assert!(w[0].composite_score >= w[1].composite_score);
    }
    for r in ranked.iter() {
        for score in [
            r.composite_score,
            r.intensity_score,
            r.quality_score,
            r.cross_correlation,
        ] {
            assert!((0.0..=1.0).contains(&score), "{:?}", r);
        }
        assert!(r.probability_score >= 0.0);
    }
}

#[test]
fn test_survivors_respect_precursor_mass() {
    let (ctx, cand) = context("GASPVTLNK");
    let gap_table = GapTable::new(&ctx.residues);
    let assembler = ["GASPVTLNK", "GASPVTLNKG", "GASPVTLN", "GASPVTLKN"]
        .iter()
        .map(|s| parse(&ctx, s, Provenance::Assembler))
        .collect();
    let mut pipeline = RankingPipeline::new(&ctx, &gap_table, peaks_for(&ctx, &cand, 1, 8));
    let (ranked, _) = pipeline.run(assembler, vec![]).unwrap();
    assert!(!ranked.is_empty());
    for r in ranked.iter() {
        assert!(r.mass_error.abs() <= 0.75, "{:?}", r);
    }
}

#[test]
fn test_zero_sites_scores_zero_and_is_pruned() {
    let (ctx, cand) = context("GASPVTLNK");
    let peaks = PeakList::new(&[(333.33, 10.0), (420.5, 5.0)], &ctx.scale).unwrap();
    let spectrum = PreparedSpectrum::new(peaks, &ctx);
    let buffers = annotate(&ctx, &cand, &spectrum);
    assert_eq!(buffers.cleavage_sites, 0);

    let intensity = intensity_score(&ctx, &spectrum, &cand, &buffers).unwrap();
    assert_eq!(intensity, 0.0);

    let mut scratch = Vec::new();
    let mut cand = cand;
    cand.scores.cleavage_sites = buffers.cleavage_sites;
    cand.prune_metrics = prune_metrics(&ctx, &spectrum, &buffers, &mut scratch);
    let mut candidates = vec![cand];
    prune_by_contiguity(&ctx, &mut candidates);
    assert!(candidates.is_empty());
}
