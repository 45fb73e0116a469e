// distance.rs - Pairwise distance matrix assembly

use std::borrow::Cow;
use std::fmt;

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::alignment::{oriented_distance, ScoringScheme};
use crate::core::pipeline::validate_sequences;
use crate::data::Sequence;
use crate::error::{Result, SurveyError};

/// Square matrix of alignment distances.
///
/// `get(r, c)` is the distance measured with sequence `r` as the reference and
/// sequence `c` as the query. Freshly built matrices are not symmetric; use
/// [`DistanceMatrix::symmetrized`] for a symmetric copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    rows: Vec<Vec<usize>>,
}

impl DistanceMatrix {
    /// All-zero `n × n` matrix
    pub fn zeros(n: usize) -> Self {
        Self {
            rows: vec![vec![0; n]; n],
        }
    }

    /// Wrap previously computed rows (e.g. loaded from a run record)
    pub fn from_rows(rows: Vec<Vec<usize>>) -> Result<Self> {
        let n = rows.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(SurveyError::InvalidInput(format!(
                    "distance matrix row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
            if row[i] != 0 {
                return Err(SurveyError::InvalidInput(format!(
                    "distance matrix diagonal at {} is {}, expected 0",
                    i, row[i]
                )));
            }
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> usize {
        self.rows[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, distance: usize) {
        self.rows[row][col] = distance;
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<usize>> {
        self.rows
    }

    /// Copy with both directions replaced by their minimum
    pub fn symmetrized(&self) -> Self {
        let n = self.len();
        let mut sym = self.clone();
        for i in 0..n {
            sym.rows[i][i] = 0;
            for j in (i + 1)..n {
                let v = self.rows[i][j].min(self.rows[j][i]);
                sym.rows[i][j] = v;
                sym.rows[j][i] = v;
            }
        }
        sym
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.len();
        (0..n).all(|i| ((i + 1)..n).all(|j| self.rows[i][j] == self.rows[j][i]))
    }

    /// Upper triangle in row-major order (condensed form)
    pub fn condensed(&self) -> Vec<usize> {
        let n = self.len();
        let mut condensed = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            condensed.extend_from_slice(&self.rows[i][i + 1..]);
        }
        condensed
    }

    pub fn max_distance(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for DistanceMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|d| format!("{:>5}", d)).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

/// How the row (reference) sequence is presented to the aligner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferenceMode {
    /// Double circular references so matches may span the origin
    #[default]
    Topology,
    /// Never double, every reference is aligned as linear
    Linear,
}

/// Reference bases concatenated with themselves
pub fn double_reference(bases: &[u8]) -> Vec<u8> {
    let mut doubled = Vec::with_capacity(bases.len() * 2);
    doubled.extend_from_slice(bases);
    doubled.extend_from_slice(bases);
    doubled
}

/// Drives the oriented alignment over every ordered pair of sequences
pub struct DistanceMatrixBuilder {
    scoring: ScoringScheme,
    reference_mode: ReferenceMode,
    progress: Option<ProgressBar>,
}

impl DistanceMatrixBuilder {
    pub fn new(scoring: ScoringScheme) -> Self {
        Self {
            scoring,
            reference_mode: ReferenceMode::default(),
            progress: None,
        }
    }

    pub fn reference_mode(mut self, mode: ReferenceMode) -> Self {
        self.reference_mode = mode;
        self
    }

    /// Advance `progress` once per finished pair
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn scoring(&self) -> &ScoringScheme {
        &self.scoring
    }

    /// Number of alignment pairs (each one aligns both query orientations)
    pub fn pair_count(n_sequences: usize) -> usize {
        n_sequences * n_sequences.saturating_sub(1)
    }

    /// Compute the raw (asymmetric) distance matrix
    pub fn build(&self, sequences: &[Sequence]) -> Result<DistanceMatrix> {
        validate_sequences(sequences)?;
        self.scoring.validate()?;

        let n = sequences.len();
        let references: Vec<Cow<'_, [u8]>> = sequences
            .iter()
            .map(|seq| {
                if self.doubles(seq) {
                    Cow::Owned(double_reference(&seq.bases))
                } else {
                    Cow::Borrowed(seq.bases.as_slice())
                }
            })
            .collect();

        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|r| (0..n).filter(move |&c| c != r).map(move |c| (r, c)))
            .collect();

        let cells: Vec<(usize, usize, usize)> = pairs
            .into_par_iter()
            .map(|(r, c)| {
                let result = oriented_distance(&references[r], &sequences[c].bases, &self.scoring);
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
                (r, c, result.distance)
            })
            .collect();

        let mut matrix = DistanceMatrix::zeros(n);
        for (r, c, distance) in cells {
            matrix.set(r, c, distance);
        }
        Ok(matrix)
    }

    fn doubles(&self, reference: &Sequence) -> bool {
        match self.reference_mode {
            ReferenceMode::Topology => reference.is_circular(),
            ReferenceMode::Linear => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alignment::tests::pseudo_random_bases;
    use crate::data::Topology;

    fn circular(id: usize, bases: Vec<u8>) -> Sequence {
        Sequence::new(id, format!("seq{}", id), bases, Topology::Circular)
    }

    #[test]
    fn test_symmetrized_takes_minimum() {
        let raw = DistanceMatrix::from_rows(vec![
            vec![0, 5, 9],
            vec![3, 0, 4],
            vec![12, 7, 0],
        ])
        .unwrap();
        assert!(!raw.is_symmetric());

        let sym = raw.symmetrized();
        assert!(sym.is_symmetric());
        assert_eq!(sym.rows(), &[vec![0, 3, 9], vec![3, 0, 4], vec![9, 4, 0]]);
        // Original left untouched
        assert_eq!(raw.get(0, 1), 5);
        assert_eq!(sym.condensed(), vec![3, 9, 4]);
    }

    #[test]
    fn test_from_rows_rejects_malformed() {
        assert!(DistanceMatrix::from_rows(vec![vec![0, 1], vec![1]]).is_err());
        assert!(DistanceMatrix::from_rows(vec![vec![0, 1], vec![1, 2]]).is_err());
        assert!(DistanceMatrix::from_rows(vec![vec![0, 1], vec![1, 0]]).is_ok());
    }

    #[test]
    fn test_double_reference() {
        assert_eq!(double_reference(b"ACG"), b"ACGACG".to_vec());
    }

    #[test]
    fn test_build_zero_diagonal_and_wraparound_asymmetry() {
        let long = pseudo_random_bases(100, 31);
        let short = [&long[90..], &long[..10]].concat();
        let sequences = vec![circular(0, long), circular(1, short)];

        let matrix = DistanceMatrixBuilder::new(ScoringScheme::default())
            .build(&sequences)
            .unwrap();

        assert_eq!(matrix.get(0, 0), 0);
        assert_eq!(matrix.get(1, 1), 0);
        // Short fragment spans the origin of the long circular reference
        assert_eq!(matrix.get(0, 1), 0);
        // The long query cannot be covered by a 20 bp reference
        assert!(matrix.get(1, 0) >= 60);
        assert_eq!(matrix.symmetrized().get(1, 0), 0);
    }

    #[test]
    fn test_linear_mode_skips_doubling() {
        let long = pseudo_random_bases(100, 31);
        let short = [&long[90..], &long[..10]].concat();
        let sequences = vec![circular(0, long.clone()), circular(1, short.clone())];

        let linear = DistanceMatrixBuilder::new(ScoringScheme::default())
            .reference_mode(ReferenceMode::Linear)
            .build(&sequences)
            .unwrap();
        assert!(linear.get(0, 1) > 0);

        let topology_linear = vec![
            Sequence::new(0, "a".to_string(), long, Topology::Linear),
            circular(1, short),
        ];
        let matrix = DistanceMatrixBuilder::new(ScoringScheme::default())
            .build(&topology_linear)
            .unwrap();
        assert_eq!(matrix.get(0, 1), linear.get(0, 1));
    }

    #[test]
    fn test_build_rejects_invalid_input() {
        let builder = DistanceMatrixBuilder::new(ScoringScheme::default());
        let single = vec![circular(0, b"ACGT".to_vec())];
        assert!(matches!(
            builder.build(&single),
            Err(SurveyError::InvalidInput(_))
        ));

        let bad = vec![circular(0, b"ACGT".to_vec()), circular(1, b"ACNT".to_vec())];
        assert!(matches!(builder.build(&bad), Err(SurveyError::InvalidInput(_))));
    }

    #[test]
    fn test_pair_count() {
        assert_eq!(DistanceMatrixBuilder::pair_count(0), 0);
        assert_eq!(DistanceMatrixBuilder::pair_count(1), 0);
        assert_eq!(DistanceMatrixBuilder::pair_count(6), 30);
    }
}
