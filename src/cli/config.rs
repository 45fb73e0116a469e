// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub inputs: Option<Vec<String>>,
    pub output_dir: Option<String>,
    pub matrix_format: Option<String>,
    pub report_format: Option<String>,
    pub labels: Option<Vec<String>>,

    // Survey settings
    pub score_threshold: Option<f64>,
    pub linear: Option<bool>,

    // Alignment settings
    pub scoring_mode: Option<String>,
    pub match_score: Option<i32>,
    pub mismatch_score: Option<i32>,
    pub gap_open: Option<i32>,
    pub gap_extend: Option<i32>,

    // Performance
    pub threads: Option<usize>,
    pub cache_file: Option<String>,

    // Flags
    pub force_recompute: Option<bool>,
    pub dry_run: Option<bool>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        println!("📄 Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# presurvey.toml - Configuration file for presurvey
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# FASTA files or directories (one plasmid per file)
inputs = ["plasmids/"]

# Directory receiving matrix, grouping report and run record
output_dir = "survey_out"

# Matrix output format: tsv, csv
matrix_format = "tsv"

# Grouping report format: txt, json
report_format = "txt"

# Short labels, one per input in load order (default: P1..Pn)
# labels = ["pUC19", "pBR322"]

# =============================================================================
# SURVEY SETTINGS
# =============================================================================

# Sequences closer than this distance are put in the same family
score_threshold = 20.0

# Align every reference as linear (no doubling of circular plasmids)
linear = false

# =============================================================================
# ALIGNMENT SETTINGS
# =============================================================================

# Scoring preset: plasmid, dna
scoring_mode = "plasmid"

# Custom alignment scores (overrides preset mode)
# match_score = 1
# mismatch_score = -2
# gap_open = 3
# gap_extend = 1

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of threads (omit for auto-detection)
# threads = 8

# Run record reused when inputs and scoring are unchanged (.lz4 extension)
cache_file = "survey_out/run.lz4"

# =============================================================================
# FLAGS
# =============================================================================

# Recompute the distance matrix even if the run record matches
force_recompute = false

# Validate inputs without computation (dry run)
dry_run = false
"#
        .to_string()
    }
}
