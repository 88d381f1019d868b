use crate::errors::InputError;
use crate::mass::{
    MassScale,
    ResidueTable,
};
use crate::models::{
    Candidate,
    Provenance,
    candidate_from_database_line,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::io::{
    BufRead,
    BufReader,
    Read,
};
use std::path::{
    Path,
    PathBuf,
};
use tracing::{
    debug,
    info,
};

/// One assembler candidate in the exchange notation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateEntry {
    pub sequence: String,
    #[serde(default)]
    pub score: f32,
}

/// One precursor hypothesis: its peaks and the candidates to rank.
///
/// ```text
/// {"id": "scan_12", "precursor_mz": 443.7533, "charge": 2,
///  "peaks": [[147.113, 120.0], [261.156, 80.0]],
///  "candidates": [{"sequence": "[128.06]SPVTLNK", "score": 12.5}],
///  "database": ["GASPVTLNK"]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpectrumEntry {
    pub id: String,
    pub precursor_mz: f64,
    pub charge: u8,
    /// (m/z, intensity) pairs, any order.
    pub peaks: Vec<(f64, f32)>,
    #[serde(default)]
    pub candidates: Vec<CandidateEntry>,
    /// Database sequences that only apply to this spectrum.
    #[serde(default)]
    pub database: Vec<String>,
}

impl SpectrumEntry {
    pub fn sample() -> Self {
        Self {
            id: "sample".into(),
            precursor_mz: 443.7533,
            charge: 2,
            peaks: vec![
                (129.066, 40.0),
                (147.113, 120.0),
                (216.098, 30.0),
                (261.156, 80.0),
                (374.240, 60.0),
            ],
            candidates: vec![CandidateEntry {
                sequence: "[128.06]SPVTLNK".into(),
                score: 12.5,
            }],
            database: vec!["GASPVTLNK".into()],
        }
    }

    /// Parses the assembler candidates, dropping the ones that do not parse.
    pub fn assembler_candidates(&self, table: &ResidueTable, scale: &MassScale) -> Vec<Candidate> {
        self.candidates
            .iter()
            .filter_map(|c| {
                let out =
                    Candidate::from_notation(&c.sequence, Provenance::Assembler, c.score, table, scale);
                if out.is_none() {
                    debug!("Dropping unparseable candidate {:?} ({})", c.sequence, self.id);
                }
                out
            })
            .collect()
    }

    pub fn database_candidates(&self, table: &ResidueTable, scale: &MassScale) -> Vec<Candidate> {
        self.database
            .iter()
            .filter_map(|line| candidate_from_database_line(line, table, scale))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFormat {
    /// A single JSON array of entries.
    Json,
    /// One entry per line.
    NdJson,
}

impl BatchFormat {
    pub fn detect_from_path(path: &Path) -> Self {
        let path_str = path.to_string_lossy().to_lowercase();
        if path_str.ends_with(".ndjson") || path_str.ends_with(".jsonl") {
            BatchFormat::NdJson
        } else {
            BatchFormat::Json
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SpectrumBatch {
    entries: Vec<SpectrumEntry>,
}

impl SpectrumBatch {
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let format = BatchFormat::detect_from_path(path);
        let file = std::fs::File::open(path).map_err(|e| InputError::FileReadingError {
            source: e,
            context: "Error opening spectrum batch",
            path: PathBuf::from(path),
        })?;
        let out = Self::from_reader(file, format)?;
        info!("Read {} spectra from {}", out.len(), path.display());
        Ok(out)
    }

    pub fn from_reader<R: Read>(reader: R, format: BatchFormat) -> Result<Self, InputError> {
        let entries = match format {
            BatchFormat::Json => serde_json::from_reader(BufReader::new(reader)).map_err(|e| {
                InputError::ParsingError {
                    source: e,
                    context: "Error parsing JSON spectrum batch",
                }
            })?,
            BatchFormat::NdJson => {
                let mut entries = Vec::new();
                for line in BufReader::new(reader).lines() {
                    let line = line.map_err(|e| InputError::FileReadingError {
                        source: e,
                        context: "Error reading line",
                        path: PathBuf::new(),
                    })?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    let entry: SpectrumEntry =
                        serde_json::from_str(&line).map_err(|e| InputError::ParsingError {
                            source: e,
                            context: "Error parsing NDJSON line",
                        })?;
                    entries.push(entry);
                }
                entries
            }
        };
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[SpectrumEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for SpectrumBatch {
    type Item = SpectrumEntry;
    type IntoIter = std::vec::IntoIter<SpectrumEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Reads a flat database file, one sequence per line.
///
/// Header (`>`), comment (`#`) and blank lines are skipped, as are lines
/// with residues the scorer does not know.
pub fn read_database_file(
    path: &Path,
    table: &ResidueTable,
    scale: &MassScale,
) -> Result<Vec<Candidate>, InputError> {
    let file = std::fs::File::open(path).map_err(|e| InputError::FileReadingError {
        source: e,
        context: "Error opening database file",
        path: PathBuf::from(path),
    })?;
    let mut out = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| InputError::FileReadingError {
            source: e,
            context: "Error reading database line",
            path: PathBuf::from(path),
        })?;
        if let Some(cand) = candidate_from_database_line(&line, table, scale) {
            out.push(cand);
        }
    }
    info!("Read {} database sequences from {}", out.len(), path.display());
    Ok(out)
}
