// pipeline.rs - End-to-end survey: validate, measure, cluster, balance

use serde::{Deserialize, Serialize};

use crate::core::alignment::ScoringScheme;
use crate::core::balance::{Combination, GroupBalancer};
use crate::core::clustering::{Family, MergeStep, SymmetricClusterer};
use crate::core::distance::{DistanceMatrix, DistanceMatrixBuilder};
use crate::data::Sequence;
use crate::error::{Result, SurveyError};

/// Default merge threshold for the family cut
pub const DEFAULT_SCORE_THRESHOLD: f64 = 20.0;

const VALID_BASES: &[u8] = b"ACGT";

/// Parameters of one survey run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyParams {
    pub scoring: ScoringScheme,
    pub score_threshold: f64,
}

impl Default for SurveyParams {
    fn default() -> Self {
        Self {
            scoring: ScoringScheme::default(),
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

/// Everything a survey produces
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub raw_matrix: DistanceMatrix,
    pub symmetric_matrix: DistanceMatrix,
    pub families: Vec<Family>,
    pub merge_history: Vec<MergeStep>,
    pub combinations: Vec<Combination>,
}

/// Reject inputs the aligner cannot survey.
///
/// Needs at least two sequences, none empty, all upper-case A/C/G/T.
pub fn validate_sequences(sequences: &[Sequence]) -> Result<()> {
    if sequences.len() < 2 {
        return Err(SurveyError::InvalidInput(format!(
            "at least 2 sequences are required, got {}",
            sequences.len()
        )));
    }

    for seq in sequences {
        if seq.bases.is_empty() {
            return Err(SurveyError::InvalidInput(format!(
                "sequence {} ({}) is empty",
                seq.id, seq.name
            )));
        }
        if let Some(pos) = seq.bases.iter().position(|b| !VALID_BASES.contains(b)) {
            return Err(SurveyError::InvalidInput(format!(
                "sequence {} ({}) has invalid base '{}' at position {}",
                seq.id,
                seq.name,
                seq.bases[pos].escape_ascii(),
                pos
            )));
        }
    }

    Ok(())
}

/// Cluster and balance an already computed raw matrix
pub fn recommend_combinations(raw: &DistanceMatrix, score_threshold: f64) -> Result<Recommendation> {
    if raw.len() < 2 {
        return Err(SurveyError::InvalidInput(format!(
            "distance matrix must cover at least 2 sequences, got {}",
            raw.len()
        )));
    }
    // Re-check shape and diagonal for matrices assembled by hand
    let raw = DistanceMatrix::from_rows(raw.rows().to_vec())?;

    let clustering = SymmetricClusterer::new(score_threshold).cluster(&raw)?;
    let combinations = GroupBalancer::new(&clustering.symmetric).balance(&clustering.families)?;

    Ok(Recommendation {
        raw_matrix: raw,
        symmetric_matrix: clustering.symmetric,
        families: clustering.families,
        merge_history: clustering.merge_history,
        combinations,
    })
}

/// Build the distance matrix with `builder`, then recommend combinations.
///
/// `builder` carries the reference mode and progress reporting; its scoring
/// scheme must equal `params.scoring` (see [`survey_builder`]).
pub fn run_survey(
    sequences: &[Sequence],
    params: &SurveyParams,
    builder: &DistanceMatrixBuilder,
) -> Result<Recommendation> {
    if params.score_threshold.is_nan() {
        return Err(SurveyError::InvalidInput(
            "score threshold must be a number".to_string(),
        ));
    }
    if !builder.scoring().same_scores(&params.scoring) {
        return Err(SurveyError::InvalidInput(format!(
            "builder scoring {:?} differs from survey scoring {:?}",
            builder.scoring().detect_mode(),
            params.scoring.detect_mode()
        )));
    }
    let raw = builder.build(sequences)?;
    recommend_combinations(&raw, params.score_threshold)
}

/// Matrix builder configured from survey parameters
pub fn survey_builder(params: &SurveyParams) -> DistanceMatrixBuilder {
    DistanceMatrixBuilder::new(params.scoring.clone())
}
