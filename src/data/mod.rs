// mod.rs - Data structures module

pub mod sequence;

// Re-export main types for convenience
pub use sequence::{default_labels, load_fasta_file, resolve_labels, Sequence, SequenceSet, Topology};
