// mod.rs - Persisted run record (LZ4-compressed JSON)

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::{Combination, DistanceMatrix, ReferenceMode, ScoringScheme};
use crate::data::{Sequence, Topology};

/// Bumped when the record layout changes
pub const FORMAT_VERSION: u32 = 2;

/// First 12 characters of a stored hash, for display
pub fn short_hash(hash: &str) -> String {
    hash.chars().take(12).collect()
}

/// A finished survey, keyed by what its distance matrix depends on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub version: String,
    pub format_version: u32,
    pub created: String,
    pub labels: Vec<String>,
    pub sequence_names: Vec<String>,
    pub sequence_hashes: Vec<String>,
    pub topologies: Vec<Topology>,
    pub reference_mode: ReferenceMode,
    pub scoring: ScoringScheme,
    pub score_threshold: f64,
    pub score_matrix: DistanceMatrix,
    pub combinations: Vec<Combination>,
}

impl RunRecord {
    pub fn new(
        labels: Vec<String>,
        sequences: &[Sequence],
        scoring: ScoringScheme,
        reference_mode: ReferenceMode,
        score_threshold: f64,
        score_matrix: DistanceMatrix,
        combinations: Vec<Combination>,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format_version: FORMAT_VERSION,
            created: chrono::Utc::now().to_rfc3339(),
            labels,
            sequence_names: sequences.iter().map(|s| s.name.clone()).collect(),
            sequence_hashes: sequences.iter().map(Sequence::content_hash).collect(),
            topologies: sequences.iter().map(|s| s.topology).collect(),
            reference_mode,
            scoring,
            score_threshold,
            score_matrix,
            combinations,
        }
    }

    /// True when the stored matrix was computed from these very inputs.
    ///
    /// Topology and reference mode decide which references get doubled, so
    /// both are part of the key. The threshold is not compared; clustering
    /// is always redone.
    pub fn matches(
        &self,
        labels: &[String],
        sequences: &[Sequence],
        scoring: &ScoringScheme,
        reference_mode: ReferenceMode,
    ) -> bool {
        self.format_version == FORMAT_VERSION
            && self.labels == labels
            && self.score_matrix.len() == sequences.len()
            && self.sequence_names.len() == sequences.len()
            && self
                .sequence_names
                .iter()
                .zip(sequences)
                .all(|(name, seq)| *name == seq.name)
            && self
                .sequence_hashes
                .iter()
                .zip(sequences)
                .all(|(hash, seq)| *hash == seq.content_hash())
            && self.topologies.len() == sequences.len()
            && self
                .topologies
                .iter()
                .zip(sequences)
                .all(|(topology, seq)| *topology == seq.topology)
            && self.reference_mode == reference_mode
            && self.scoring.same_scores(scoring)
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let start = Instant::now();

        let data = serde_json::to_vec(self)
            .map_err(|e| format!("Failed to serialize run record: {}", e))?;
        let compressed = lz4_flex::compress_prepend_size(&data);

        std::fs::write(path, &compressed)
            .map_err(|e| format!("Failed to write run record {}: {}", path.display(), e))?;

        println!(
            "💾 Run record saved in {:.2}s ({} sequences, {} KB)",
            start.elapsed().as_secs_f64(),
            self.sequence_names.len(),
            compressed.len() / 1024
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let compressed = std::fs::read(path)
            .map_err(|e| format!("Failed to read run record {}: {}", path.display(), e))?;
        let data = lz4_flex::decompress_size_prepended(&compressed)
            .map_err(|e| format!("Failed to decompress run record: {}", e))?;
        let record: RunRecord = serde_json::from_slice(&data)
            .map_err(|e| format!("Failed to parse run record: {}", e))?;

        if record.format_version != FORMAT_VERSION {
            return Err(format!(
                "Run record format v{} is not supported (expected v{})",
                record.format_version, FORMAT_VERSION
            ));
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sequences() -> Vec<Sequence> {
        vec![
            Sequence::new(0, "a.fasta".to_string(), b"ACGTAC".to_vec(), Topology::Circular),
            Sequence::new(1, "b.fasta".to_string(), b"TTGACC".to_vec(), Topology::Circular),
        ]
    }

    fn record() -> RunRecord {
        let matrix = DistanceMatrix::from_rows(vec![vec![0, 4], vec![5, 0]]).unwrap();
        RunRecord::new(
            vec!["P1".to_string(), "P2".to_string()],
            &sequences(),
            ScoringScheme::default(),
            ReferenceMode::Topology,
            20.0,
            matrix,
            vec![vec![0, 1]],
        )
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.lz4");

        let original = record();
        original.save(&path).unwrap();
        let loaded = RunRecord::load(&path).unwrap();

        assert_eq!(loaded.score_matrix, original.score_matrix);
        assert_eq!(loaded.combinations, original.combinations);
        assert_eq!(loaded.sequence_hashes, original.sequence_hashes);
        assert_eq!(loaded.created, original.created);
        assert!(loaded.scoring.same_scores(&ScoringScheme::default()));
    }

    #[test]
    fn test_matches_inputs() {
        let record = record();
        let labels = vec!["P1".to_string(), "P2".to_string()];
        let seqs = sequences();

        assert!(record.matches(&labels, &seqs, &ScoringScheme::default(), ReferenceMode::Topology));

        let renamed = vec!["A".to_string(), "B".to_string()];
        assert!(!record.matches(&renamed, &seqs, &ScoringScheme::default(), ReferenceMode::Topology));

        let mut edited = seqs.clone();
        edited[1].bases[0] = b'A';
        assert!(!record.matches(&labels, &edited, &ScoringScheme::default(), ReferenceMode::Topology));

        let mut reordered = seqs.clone();
        reordered.swap(0, 1);
        assert!(!record.matches(&labels, &reordered, &ScoringScheme::default(), ReferenceMode::Topology));

        let dna = ScoringScheme::from_mode("dna").unwrap();
        assert!(!record.matches(&labels, &seqs, &dna, ReferenceMode::Topology));
    }

    #[test]
    fn test_topology_changes_invalidate_matrix() {
        // Matrix computed with circular (doubled) references
        let matrix = DistanceMatrix::from_rows(vec![vec![0, 0], vec![58, 0]]).unwrap();
        let labels = vec!["P1".to_string(), "P2".to_string()];
        let circular = sequences();
        let record = RunRecord::new(
            labels.clone(),
            &circular,
            ScoringScheme::default(),
            ReferenceMode::Topology,
            20.0,
            matrix,
            vec![vec![0, 1]],
        );
        let scoring = ScoringScheme::default();
        assert!(record.matches(&labels, &circular, &scoring, ReferenceMode::Topology));

        // Same bases, now declared linear in the FASTA header
        let mut linear = circular.clone();
        linear[0].topology = Topology::Linear;
        assert_eq!(linear[0].content_hash(), circular[0].content_hash());
        assert!(!record.matches(&labels, &linear, &scoring, ReferenceMode::Topology));

        // Same inputs, run with --linear
        assert!(!record.matches(&labels, &circular, &scoring, ReferenceMode::Linear));
    }

    #[test]
    fn test_short_hash_respects_char_boundaries() {
        let hash = sequences()[0].content_hash();
        assert_eq!(short_hash(&hash), &hash[..12]);
        assert_eq!(short_hash("ab"), "ab");
        // Hand-edited records may hold anything
        assert_eq!(short_hash("ééééééééééééé"), "éééééééééééé");
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.lz4");
        std::fs::write(&path, b"not a run record").unwrap();
        assert!(RunRecord::load(&path).is_err());
        assert!(RunRecord::load(&dir.path().join("missing.lz4")).is_err());
    }
}
