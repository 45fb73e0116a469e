// alignment.rs - Scoring scheme and orientation-aware local alignment distance

use bio::alignment::pairwise::Aligner;
use bio::alignment::AlignmentOperation;
use bio::alphabets::dna;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};

/// Scoring scheme for the local alignments.
///
/// Gap penalties are given as positive numbers: a gap of length `k` costs
/// `gap_open + (k - 1) * gap_extend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringScheme {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
    pub description: Option<String>,
}

impl Default for ScoringScheme {
    fn default() -> Self {
        Self {
            match_score: 1,
            mismatch_score: -2,
            gap_open: 3,
            gap_extend: 1,
            description: Some("Default plasmid survey parameters".to_string()),
        }
    }
}

impl ScoringScheme {
    /// Create scoring scheme from a preset name
    pub fn from_mode(mode: &str) -> std::result::Result<Self, String> {
        match mode {
            "plasmid" => Ok(Self::default()),
            "dna" => Ok(Self {
                match_score: 2,
                mismatch_score: -1,
                gap_open: 5,
                gap_extend: 2,
                description: Some("Standard DNA alignment".to_string()),
            }),
            _ => Err(format!("Unknown scoring mode: {}. Use: plasmid, dna", mode)),
        }
    }

    /// Create custom scoring scheme
    pub fn custom(match_score: i32, mismatch_score: i32, gap_open: i32, gap_extend: i32) -> Self {
        Self {
            match_score,
            mismatch_score,
            gap_open,
            gap_extend,
            description: Some("Custom alignment parameters".to_string()),
        }
    }

    /// Check that the numbers describe a usable local alignment
    pub fn validate(&self) -> Result<()> {
        if self.match_score <= 0 {
            return Err(SurveyError::InvalidInput(format!(
                "match score must be positive (got {})",
                self.match_score
            )));
        }
        if self.gap_extend < 0 {
            return Err(SurveyError::InvalidInput(format!(
                "gap extend penalty must not be negative (got {})",
                self.gap_extend
            )));
        }
        if self.gap_open < self.gap_extend {
            return Err(SurveyError::InvalidInput(format!(
                "gap open penalty ({}) must be at least the gap extend penalty ({})",
                self.gap_open, self.gap_extend
            )));
        }
        Ok(())
    }

    /// Same numeric parameters, ignoring the description
    pub fn same_scores(&self, other: &ScoringScheme) -> bool {
        self.match_score == other.match_score
            && self.mismatch_score == other.mismatch_score
            && self.gap_open == other.gap_open
            && self.gap_extend == other.gap_extend
    }

    /// Name of the preset with these exact scores, if any
    pub fn detect_mode(&self) -> &'static str {
        match (
            self.match_score,
            self.mismatch_score,
            self.gap_open,
            self.gap_extend,
        ) {
            (1, -2, 3, 1) => "plasmid",
            (2, -1, 5, 2) => "dna",
            _ => "custom",
        }
    }

    // The aligner scores a gap of length k as open + k * extend (both <= 0).
    fn aligner_gap_scores(&self) -> (i32, i32) {
        (-(self.gap_open - self.gap_extend), -self.gap_extend)
    }
}

/// Which strand of the query produced the kept alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Forward,
    ReverseComplement,
}

/// Counts extracted from one local alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentTrace {
    pub score: i32,
    /// Query bases aligned to an identical reference base
    pub matched_base_count: usize,
    /// Reference bases skipped by the query between the first and last match
    pub deleted_base_count: usize,
}

impl AlignmentTrace {
    pub fn from_operations(score: i32, operations: &[AlignmentOperation]) -> Self {
        let is_match = |op: &AlignmentOperation| *op == AlignmentOperation::Match;

        let matched_base_count = operations.iter().filter(|op| is_match(*op)).count();
        let deleted_base_count = match (
            operations.iter().position(is_match),
            operations.iter().rposition(is_match),
        ) {
            (Some(first), Some(last)) => operations[first..=last]
                .iter()
                .filter(|op| **op == AlignmentOperation::Del)
                .count(),
            _ => 0,
        };

        Self {
            score,
            matched_base_count,
            deleted_base_count,
        }
    }

    /// Distance of a query of `query_len` bases under this trace
    pub fn distance(&self, query_len: usize) -> usize {
        query_len.saturating_sub(self.matched_base_count) + self.deleted_base_count
    }
}

/// Result of aligning both query orientations against one reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedAlignment {
    pub distance: usize,
    pub orientation: Orientation,
    pub trace: AlignmentTrace,
}

/// Align `query` and its reverse complement locally against `reference` and
/// keep the higher scoring orientation (forward on equal scores).
///
/// `reference` must already be doubled when it is circular. The scheme is
/// expected to have passed [`ScoringScheme::validate`]; positive gap scores
/// make the aligner panic.
pub fn oriented_distance(
    reference: &[u8],
    query: &[u8],
    scoring: &ScoringScheme,
) -> OrientedAlignment {
    let (gap_open, gap_extend) = scoring.aligner_gap_scores();
    let (match_score, mismatch_score) = (scoring.match_score, scoring.mismatch_score);
    let substitution = move |a: u8, b: u8| {
        if a == b {
            match_score
        } else {
            mismatch_score
        }
    };
    let mut aligner = Aligner::with_capacity(
        query.len(),
        reference.len(),
        gap_open,
        gap_extend,
        substitution,
    );

    let forward = aligner.local(query, reference);
    let forward = AlignmentTrace::from_operations(forward.score, &forward.operations);

    let reverse_query = dna::revcomp(query);
    let reverse = aligner.local(&reverse_query, reference);
    let reverse = AlignmentTrace::from_operations(reverse.score, &reverse.operations);

    let (orientation, trace) = if reverse.score > forward.score {
        (Orientation::ReverseComplement, reverse)
    } else {
        (Orientation::Forward, forward)
    };

    OrientedAlignment {
        distance: trace.distance(query.len()),
        orientation,
        trace,
    }
}
