// lib.rs - presurvey library root

//! # presurvey - Plasmid similarity survey and combination planner
//!
//! Measures how alike a set of circular plasmids are and splits them into
//! combinations that keep look-alike plasmids apart, so that each combination
//! can later be told apart by an imperfect detection method.
//!
//! ## Features
//!
//! - **Orientation aware**: both strands of every query are aligned
//! - **Circular references**: references are doubled so matches may span the origin
//! - **Complete linkage families**: similar plasmids are grouped under a score threshold
//! - **Balanced combinations**: family members are spread across combinations
//! - **Run records**: LZ4-compressed matrices reused when inputs are unchanged
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use presurvey::prelude::*;
//!
//! let set = SequenceSet::from_paths(&[std::path::PathBuf::from("plasmids/")], false)?;
//! let params = SurveyParams::default();
//! let recommendation = run_survey(&set.sequences, &params, &survey_builder(&params))
//!     .map_err(|e| e.to_string())?;
//!
//! let labels = default_labels(set.len());
//! print_groupings(&labels, &set.names(), &recommendation.combinations);
//! # Ok::<(), String>(())
//! ```

// Re-export all main modules
pub mod cache;
pub mod cli;
pub mod core;
pub mod data;
pub mod error;
pub mod output;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{leaf_order, recommend_combinations, run_survey, survey_builder, validate_sequences};
    pub use crate::core::{DistanceMatrix, DistanceMatrixBuilder, Recommendation, ReferenceMode};
    pub use crate::core::{ScoringScheme, SurveyParams};
    pub use crate::data::{default_labels, resolve_labels, Sequence, SequenceSet, Topology};
    pub use crate::error::SurveyError;
    pub use crate::output::{print_groupings, write_groupings, write_matrix};
}

// Re-export main types at the root level for convenience
pub use cli::{Args, ValidationResult};
pub use core::{DistanceMatrix, Recommendation, ScoringScheme, SurveyParams};
pub use data::{Sequence, SequenceSet, Topology};
pub use error::SurveyError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "presurvey v{} - Plasmid similarity survey and combination planner",
        VERSION
    )
}
