// mod.rs - Core survey logic module

pub mod alignment;
pub mod balance;
pub mod clustering;
pub mod distance;
pub mod pipeline;

// Re-export main types for convenience
pub use alignment::{oriented_distance, AlignmentTrace, OrientedAlignment, Orientation, ScoringScheme};
pub use balance::{group_score, Combination, GroupBalancer};
pub use clustering::{complete_linkage, cut_families, leaf_order, Clustering, Family, MergeStep, SymmetricClusterer};
pub use distance::{DistanceMatrix, DistanceMatrixBuilder, ReferenceMode};
pub use pipeline::{
    recommend_combinations, run_survey, survey_builder, validate_sequences, Recommendation, SurveyParams,
    DEFAULT_SCORE_THRESHOLD,
};
