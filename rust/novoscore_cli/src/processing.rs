use super::config::OutputConfig;
use crate::errors::CliError;
use indicatif::{
    ProgressIterator,
    ProgressStyle,
};
use novoscore::data_sources::SpectrumEntry;
use novoscore::mass::{
    GapTable,
    MassScale,
    ResidueTable,
};
use novoscore::{
    Candidate,
    PeakList,
    RankedCandidate,
    RankingPipeline,
    ScoreTimings,
    ScoringConfig,
    ScoringContext,
    SpectrumBatch,
};
use serde::Serialize;
use std::io::BufWriter;
use std::time::Instant;
use tracing::{
    debug,
    error,
    info,
};

#[derive(Debug, Serialize)]
pub struct SpectrumResult {
    pub id: String,
    pub precursor_mz: f64,
    pub charge: u8,
    pub candidates: Vec<RankedCandidate>,
    pub timings: ScoreTimings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Residue and gap tables shared by every spectrum of the batch.
pub struct SharedTables {
    pub scale: MassScale,
    pub residues: ResidueTable,
    pub gap_table: GapTable,
}

impl SharedTables {
    pub fn new(analysis: &ScoringConfig) -> Result<Self, CliError> {
        analysis.validate()?;
        let scale = MassScale::new(analysis.mass_multiplier)?;
        let residues = ResidueTable::new(&scale, analysis.cysteine_modification);
        let gap_table = GapTable::new(&residues);
        Ok(Self {
            scale,
            residues,
            gap_table,
        })
    }
}

pub fn score_entry(
    entry: &SpectrumEntry,
    analysis: &ScoringConfig,
    tables: &SharedTables,
    database: &[Candidate],
) -> novoscore::errors::Result<(Vec<RankedCandidate>, ScoreTimings)> {
    let ctx = ScoringContext::new(analysis, entry.precursor_mz, entry.charge)?;
    let peaks = PeakList::new(&entry.peaks, &ctx.scale)?;
    let assembler = entry.assembler_candidates(&ctx.residues, &ctx.scale);
    let mut db = entry.database_candidates(&ctx.residues, &ctx.scale);
    db.extend(
        database
            .iter()
            .filter(|c| {
                ctx.peptide_tolerance
                    .contains(ctx.precursor_mass, c.neutral_mass(&ctx.residues))
            })
            .cloned(),
    );
    let mut pipeline = RankingPipeline::new(&ctx, &tables.gap_table, peaks);
    pipeline.run(assembler, db)
}

/// Scores every spectrum in the batch.
///
/// A spectrum that fails is reported with its error and no candidates,
/// the rest of the batch still runs.
pub fn main_loop(
    batch: SpectrumBatch,
    analysis: &ScoringConfig,
    tables: &SharedTables,
    database: &[Candidate],
) -> (Vec<SpectrumResult>, ScoreTimings) {
    let mut total = ScoreTimings::default();
    let mut results = Vec::with_capacity(batch.len());
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());

    for entry in batch.into_iter().progress_with_style(style) {
        let (candidates, timings, err) = match score_entry(&entry, analysis, tables, database) {
            Ok((candidates, timings)) => (candidates, timings, None),
            Err(e) => {
                error!("Spectrum {} failed: {}", entry.id, e);
                (Vec::new(), ScoreTimings::default(), Some(e.to_string()))
            }
        };
        if let Some(best) = candidates.first() {
            debug!("Best candidate for {}: {:?}", entry.id, best);
        }
        total += timings;
        results.push(SpectrumResult {
            id: entry.id,
            precursor_mz: entry.precursor_mz,
            charge: entry.charge,
            candidates,
            timings,
            error: err,
        });
    }
    (results, total)
}

pub fn process_batch(
    batch: SpectrumBatch,
    analysis: &ScoringConfig,
    database: &[Candidate],
    tables: &SharedTables,
    output: &OutputConfig,
) -> Result<(), CliError> {
    let start = Instant::now();
    let nspectra = batch.len();
    let (results, timings) = main_loop(batch, analysis, tables, database);
    let nfailed = results.iter().filter(|r| r.error.is_some()).count();

    let out_path = output.directory.join("results.json");
    let file = std::fs::File::create(&out_path).map_err(|e| CliError::Io {
        source: e.to_string(),
        path: Some(out_path.to_string_lossy().to_string()),
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), &results)
        .map_err(|e| CliError::ParseError { msg: e.to_string() })?;

    info!("Stage timings: {:?}", timings);
    info!(
        "Processed {} spectra ({} failed) in {:?}, results at {}",
        nspectra,
        nfailed,
        start.elapsed(),
        out_path.display()
    );
    Ok(())
}
