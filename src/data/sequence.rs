// sequence.rs - Plasmid sequences and FASTA loading

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use bio::io::fasta;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const FASTA_EXTENSIONS: &[&str] = &["fasta", "fa", "fna"];

/// Shape of the molecule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    Circular,
    Linear,
}

/// One input molecule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// Position in the input order, used as matrix index
    pub id: usize,
    pub name: String,
    pub bases: Vec<u8>,
    pub topology: Topology,
}

impl Sequence {
    pub fn new(id: usize, name: String, bases: Vec<u8>, topology: Topology) -> Self {
        Self {
            id,
            name,
            bases,
            topology,
        }
    }

    pub fn is_circular(&self) -> bool {
        self.topology == Topology::Circular
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Lowercase hex SHA-256 of the bases
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bases);
        format!("{:x}", hasher.finalize())
    }
}

/// Ordered collection of loaded sequences
#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    pub sequences: Vec<Sequence>,
    pub paths: Vec<PathBuf>,
}

impl SequenceSet {
    /// Load every input path. Directories contribute their FASTA files sorted
    /// by file name; each file becomes one sequence.
    pub fn from_paths(paths: &[PathBuf], force_linear: bool) -> Result<Self, String> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_dir() {
                println!("📂 Scanning directory: {}", path.display());
                files.extend(list_fasta_files(path)?);
            } else if path.is_file() {
                files.push(path.clone());
            } else {
                return Err(format!("Input path does not exist: {}", path.display()));
            }
        }

        if files.is_empty() {
            return Err("No FASTA input files found".to_string());
        }

        let mut set = Self::default();
        for (id, file) in files.into_iter().enumerate() {
            let sequence = load_fasta_file(&file, id, force_linear)?;
            println!(
                "  📄 {}: {} bp, {}",
                sequence.name,
                sequence.len(),
                if sequence.is_circular() { "circular" } else { "linear" }
            );
            set.sequences.push(sequence);
            set.paths.push(file);
        }

        println!("✅ Loaded {} sequences", set.len());
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.sequences.iter().map(|s| s.name.clone()).collect()
    }

    pub fn content_hashes(&self) -> Vec<String> {
        self.sequences.iter().map(Sequence::content_hash).collect()
    }
}

/// Short labels `P1..Pn`
pub fn default_labels(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("P{}", i)).collect()
}

/// Use `custom` labels when given, checking there is one per sequence
pub fn resolve_labels(custom: Option<&[String]>, n: usize) -> Result<Vec<String>, String> {
    match custom {
        None => Ok(default_labels(n)),
        Some(labels) if labels.len() != n => Err(format!(
            "Got {} labels for {} sequences",
            labels.len(),
            n
        )),
        Some(labels) => {
            if let Some(blank) = labels.iter().position(|l| l.trim().is_empty()) {
                return Err(format!("Label {} is empty", blank + 1));
            }
            Ok(labels.to_vec())
        }
    }
}

fn list_fasta_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| format!("Failed to read directory {}: {}", dir.display(), e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| FASTA_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read one FASTA file as a single plasmid: records are concatenated in file
/// order and bases upper-cased.
pub fn load_fasta_file(path: &Path, id: usize, force_linear: bool) -> Result<Sequence, String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if extension.as_deref() == Some("dna") {
        return Err(format!(
            "SnapGene .dna files are not supported, export {} as FASTA",
            path.display()
        ));
    }

    let file = File::open(path)
        .map_err(|e| format!("Failed to open FASTA file {}: {}", path.display(), e))?;
    let reader = fasta::Reader::new(BufReader::new(file));

    let mut bases = Vec::new();
    let mut first_desc: Option<String> = None;
    let mut record_count = 0;
    for record_result in reader.records() {
        let record = record_result
            .map_err(|e| format!("Invalid FASTA record in {}: {}", path.display(), e))?;
        if record_count == 0 {
            first_desc = record.desc().map(str::to_string);
        }
        bases.extend(record.seq().iter().map(u8::to_ascii_uppercase));
        record_count += 1;
    }

    if record_count == 0 {
        return Err(format!("No FASTA records in {}", path.display()));
    }

    let declared_linear = first_desc
        .map(|desc| desc.to_ascii_lowercase().contains("topology=linear"))
        .unwrap_or(false);
    let topology = if force_linear || declared_linear {
        Topology::Linear
    } else {
        Topology::Circular
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Sequence::new(id, name, bases, topology))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_content_hash() {
        let seq = Sequence::new(0, "a".to_string(), b"ACGT".to_vec(), Topology::Circular);
        assert_eq!(
            seq.content_hash(),
            "1dff3e84fe7877e0673b69bbddcf40124e396e3f9943dd890c91b6a09adb9af0"
        );

        let same = Sequence::new(5, "b".to_string(), b"ACGT".to_vec(), Topology::Linear);
        assert_eq!(seq.content_hash(), same.content_hash());
        let other = Sequence::new(0, "a".to_string(), b"ACGA".to_vec(), Topology::Circular);
        assert_ne!(seq.content_hash(), other.content_hash());
    }

    #[test]
    fn test_load_concatenates_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pUC19.fasta");
        fs::write(&path, ">part1 sample\nacgt\nAC\n>part2\nGGTT\n").unwrap();

        let seq = load_fasta_file(&path, 3, false).unwrap();
        assert_eq!(seq.id, 3);
        assert_eq!(seq.name, "pUC19.fasta");
        assert_eq!(seq.bases, b"ACGTACGGTT".to_vec());
        assert!(seq.is_circular());
    }

    #[test]
    fn test_topology_detection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frag.fa");
        fs::write(&path, ">frag topology=linear\nACGT\n").unwrap();

        assert_eq!(load_fasta_file(&path, 0, false).unwrap().topology, Topology::Linear);

        let circ = dir.path().join("circ.fa");
        fs::write(&circ, ">circ\nACGT\n").unwrap();
        assert_eq!(load_fasta_file(&circ, 0, false).unwrap().topology, Topology::Circular);
        assert_eq!(load_fasta_file(&circ, 0, true).unwrap().topology, Topology::Linear);
    }

    #[test]
    fn test_rejects_snapgene_and_empty_files() {
        let dir = tempdir().unwrap();
        let dna = dir.path().join("map.dna");
        fs::write(&dna, b"\x09\x00").unwrap();
        assert!(load_fasta_file(&dna, 0, false).unwrap_err().contains(".dna"));

        let empty = dir.path().join("empty.fasta");
        fs::write(&empty, "").unwrap();
        assert!(load_fasta_file(&empty, 0, false).is_err());
    }

    #[test]
    fn test_from_paths_sorts_directory_entries() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.fasta"), ">b\nTTTT\n").unwrap();
        fs::write(dir.path().join("a.fna"), ">a\nAAAA\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let extra = tempdir().unwrap();
        let extra_file = extra.path().join("c.fa");
        fs::write(&extra_file, ">c\nCCCC\n").unwrap();

        let set = SequenceSet::from_paths(&[dir.path().to_path_buf(), extra_file], false).unwrap();
        assert_eq!(set.names(), vec!["a.fna", "b.fasta", "c.fa"]);
        let ids: Vec<usize> = set.sequences.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(set.content_hashes().len(), 3);

        assert!(SequenceSet::from_paths(&[dir.path().join("missing")], false).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(default_labels(3), vec!["P1", "P2", "P3"]);

        let custom = vec!["x".to_string(), "y".to_string()];
        assert_eq!(resolve_labels(Some(&custom), 2).unwrap(), custom);
        assert!(resolve_labels(Some(&custom), 3).is_err());
        assert_eq!(resolve_labels(None, 2).unwrap(), vec!["P1", "P2"]);
    }
}
