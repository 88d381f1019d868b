use crate::errors::DataProcessingError;
use crate::models::{
    Candidate,
    Provenance,
};
use crate::scoring::context::ScoringContext;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub enum SetField<T> {
    Some(T),
    #[default]
    None,
}

impl<T> SetField<T> {
    pub fn is_some(&self) -> bool {
        matches!(self, Self::Some(_))
    }

    pub fn expect_some(self, field_name: &'static str) -> Result<T, DataProcessingError> {
        match self {
            Self::Some(v) => Ok(v),
            Self::None => Err(DataProcessingError::ExpectedSetField {
                field: field_name,
                context: "".into(),
            }),
        }
    }
}

/// One entry of the shortlist handed to the report formatter.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedCandidate {
    pub rank: usize,
    pub peptide: String,
    pub provenance: Provenance,
    pub assembler_score: f32,
    pub composite_score: f32,
    pub probability_score: f32,
    pub ideal_probability_score: f32,
    pub intensity_score: f32,
    pub quality_score: f32,
    pub cross_correlation: f32,
    pub cleavage_sites: usize,
    /// Neutral peptide mass in Da.
    pub neutral_mass: f64,
    /// Candidate minus precursor neutral mass, in Da.
    pub mass_error: f64,
}

#[derive(Debug, Default)]
pub struct RankedCandidateBuilder {
    rank: SetField<usize>,
    peptide: SetField<String>,
    provenance: SetField<Provenance>,
    assembler_score: SetField<f32>,
    composite_score: SetField<f32>,
    probability_score: SetField<f32>,
    ideal_probability_score: SetField<f32>,
    intensity_score: SetField<f32>,
    quality_score: SetField<f32>,
    cross_correlation: SetField<f32>,
    cleavage_sites: SetField<usize>,
    neutral_mass: SetField<f64>,
    mass_error: SetField<f64>,
}

impl RankedCandidateBuilder {
    pub fn with_candidate(mut self, candidate: &Candidate, ctx: &ScoringContext) -> Self {
        let mass = candidate.neutral_mass(&ctx.residues);
        self.peptide = SetField::Some(candidate.render(&ctx.scale));
        self.provenance = SetField::Some(candidate.provenance);
        self.assembler_score = SetField::Some(candidate.assembler_score);
        self.neutral_mass = SetField::Some(ctx.scale.to_da(mass));
        self.mass_error = SetField::Some(ctx.scale.to_da(mass - ctx.precursor_mass));
        self
    }

    pub fn with_scores(mut self, candidate: &Candidate) -> Self {
        let scores = &candidate.scores;
        self.composite_score = SetField::Some(scores.composite);
        self.probability_score = SetField::Some(scores.probability);
        self.ideal_probability_score = SetField::Some(scores.ideal_probability);
        self.intensity_score = SetField::Some(scores.intensity);
        self.quality_score = SetField::Some(scores.quality);
        self.cross_correlation = SetField::Some(scores.cross_correlation);
        self.cleavage_sites = SetField::Some(scores.cleavage_sites);
        if scores.rank > 0 {
            self.rank = SetField::Some(scores.rank);
        }
        self
    }

    pub fn finalize(self) -> Result<RankedCandidate, DataProcessingError> {
        macro_rules! expect_some {
            ($field:ident) => {
                self.$field
                    .expect_some(stringify!($field))
                    .map_err(|e| e.append_to_context("while building ranked candidate"))?
            };
        }

        Ok(RankedCandidate {
            rank: expect_some!(rank),
            peptide: expect_some!(peptide),
            provenance: expect_some!(provenance),
            assembler_score: expect_some!(assembler_score),
            composite_score: expect_some!(composite_score),
            probability_score: expect_some!(probability_score),
            ideal_probability_score: expect_some!(ideal_probability_score),
            intensity_score: expect_some!(intensity_score),
            quality_score: expect_some!(quality_score),
            cross_correlation: expect_some!(cross_correlation),
            cleavage_sites: expect_some!(cleavage_sites),
            neutral_mass: expect_some!(neutral_mass),
            mass_error: expect_some!(mass_error),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::context::ScoringConfig;
    use crate::scoring::testing::context_for;

    #[test]
    fn test_unranked_candidate_is_rejected() {
        let (ctx, cand) = context_for("GASPVTLNK", 2, &ScoringConfig::default());
        let out = RankedCandidateBuilder::default()
            .with_candidate(&cand, &ctx)
            .with_scores(&cand)
            .finalize();
        assert!(matches!(
            out,
            Err(DataProcessingError::ExpectedSetField { field: "rank", .. })
        ));
    }

    #[test]
    fn test_builds_ranked_candidate() {
        let (ctx, mut cand) = context_for("GASPVTLNK", 2, &ScoringConfig::default());
        cand.scores.rank = 1;
        cand.scores.composite = 0.5;
        let out = RankedCandidateBuilder::default()
            .with_candidate(&cand, &ctx)
            .with_scores(&cand)
            .finalize()
            .unwrap();
        assert_eq!(out.rank, 1);
        assert_eq!(out.peptide, "GASPVTLNK");
        assert!(out.mass_error.abs() < 0.02);
    }
}
