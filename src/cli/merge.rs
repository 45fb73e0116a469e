// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};
use crate::core::DEFAULT_SCORE_THRESHOLD;

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output
        if self.inputs.is_empty() {
            if let Some(inputs) = config.inputs {
                self.inputs = inputs;
            }
        }
        if self.output_dir.is_none() {
            self.output_dir = config.output_dir;
        }
        if self.labels.is_none() {
            self.labels = config.labels.map(|labels| labels.join(","));
        }

        // Formats (only override defaults, not explicit CLI values)
        if self.matrix_format == "tsv" {
            if let Some(format) = config.matrix_format {
                self.matrix_format = format;
            }
        }
        if self.report_format == "txt" {
            if let Some(format) = config.report_format {
                self.report_format = format;
            }
        }

        // Survey settings
        if self.score_threshold == DEFAULT_SCORE_THRESHOLD {
            if let Some(threshold) = config.score_threshold {
                self.score_threshold = threshold;
            }
        }

        // Alignment settings (only override default "plasmid")
        if self.scoring_mode == "plasmid" {
            if let Some(mode) = config.scoring_mode {
                self.scoring_mode = mode;
            }
        }
        if self.match_score.is_none() {
            self.match_score = config.match_score;
        }
        if self.mismatch_score.is_none() {
            self.mismatch_score = config.mismatch_score;
        }
        if self.gap_open.is_none() {
            self.gap_open = config.gap_open;
        }
        if self.gap_extend.is_none() {
            self.gap_extend = config.gap_extend;
        }

        // Performance
        if self.threads.is_none() {
            self.threads = config.threads;
        }
        if self.cache_file.is_none() {
            self.cache_file = config.cache_file;
        }

        // Flags (CLI flags take precedence, config only sets if not explicitly set)
        if !self.linear && config.linear.unwrap_or(false) {
            self.linear = true;
        }
        if !self.force_recompute && config.force_recompute.unwrap_or(false) {
            self.force_recompute = true;
        }
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}
