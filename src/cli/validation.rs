// validation.rs - Input validation utilities

use std::path::{Path, PathBuf};

use crate::cli::args::Args;
use crate::core::{ReferenceMode, ScoringScheme};

const MATRIX_FORMATS: &[&str] = &["tsv", "csv"];
const REPORT_FORMATS: &[&str] = &["txt", "json"];

pub struct ValidationResult {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub scoring: ScoringScheme,
    pub score_threshold: f64,
    pub reference_mode: ReferenceMode,
    pub matrix_format: String,
    pub report_format: String,
    pub labels: Option<Vec<String>>,
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    if args.inputs.is_empty() {
        return Err("No input FASTA files or directories given".to_string());
    }
    let inputs: Vec<PathBuf> = args.inputs.iter().map(PathBuf::from).collect();
    if let Some(missing) = inputs.iter().find(|p| !p.exists()) {
        return Err(format!("Input path does not exist: {}", missing.display()));
    }

    let output_dir = args
        .output_dir
        .as_ref()
        .map(PathBuf::from)
        .ok_or_else(|| "--output-dir is required".to_string())?;
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(format!(
            "Output path exists and is not a directory: {}",
            output_dir.display()
        ));
    }

    // Validate and create scoring scheme
    let scoring = if args.match_score.is_some()
        || args.mismatch_score.is_some()
        || args.gap_open.is_some()
        || args.gap_extend.is_some()
    {
        // Custom mode, unset values come from the chosen preset
        let base = ScoringScheme::from_mode(&args.scoring_mode)?;
        ScoringScheme::custom(
            args.match_score.unwrap_or(base.match_score),
            args.mismatch_score.unwrap_or(base.mismatch_score),
            args.gap_open.unwrap_or(base.gap_open),
            args.gap_extend.unwrap_or(base.gap_extend),
        )
    } else {
        ScoringScheme::from_mode(&args.scoring_mode)?
    };
    scoring.validate().map_err(|e| e.to_string())?;

    if !args.score_threshold.is_finite() || args.score_threshold < 0.0 {
        return Err(format!(
            "Score threshold must be a non-negative number (got {})",
            args.score_threshold
        ));
    }

    let matrix_format = args.matrix_format.to_lowercase();
    if !MATRIX_FORMATS.contains(&matrix_format.as_str()) {
        return Err(format!(
            "Invalid matrix format '{}'. Available: {}",
            args.matrix_format,
            MATRIX_FORMATS.join(", ")
        ));
    }
    let report_format = args.report_format.to_lowercase();
    if !REPORT_FORMATS.contains(&report_format.as_str()) {
        return Err(format!(
            "Invalid report format '{}'. Available: {}",
            args.report_format,
            REPORT_FORMATS.join(", ")
        ));
    }

    if args.threads == Some(0) {
        return Err("--threads must be at least 1".to_string());
    }

    if let Some(cache_path) = &args.cache_file {
        if Path::new(cache_path).is_dir() {
            return Err(format!("Cache file path is a directory: {}", cache_path));
        }
    }

    let reference_mode = if args.linear {
        ReferenceMode::Linear
    } else {
        ReferenceMode::Topology
    };

    Ok(ValidationResult {
        inputs,
        output_dir,
        scoring,
        score_threshold: args.score_threshold,
        reference_mode,
        matrix_format,
        report_format,
        labels: args.label_list(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;
    use tempfile::tempdir;

    fn parse(cli: &[&str]) -> Args {
        Args::from_args(&["presurvey"], cli).unwrap()
    }

    #[test]
    fn test_valid_arguments() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.fasta");
        std::fs::write(&input, ">a\nACGT\n").unwrap();
        let input = input.to_string_lossy().to_string();
        let out = dir.path().join("out").to_string_lossy().to_string();

        let result = validate_args(&parse(&[input.as_str(), "--output-dir", out.as_str()])).unwrap();
        assert!(result.scoring.same_scores(&ScoringScheme::default()));
        assert_eq!(result.reference_mode, ReferenceMode::Topology);
        assert_eq!(result.matrix_format, "tsv");
        assert!(result.labels.is_none());

        let custom = validate_args(&parse(&[
            input.as_str(),
            "--output-dir",
            out.as_str(),
            "--scoring-mode",
            "dna",
            "--gap-open",
            "9",
            "--linear",
            "--report-format",
            "JSON",
        ]))
        .unwrap();
        assert_eq!(custom.scoring.match_score, 2);
        assert_eq!(custom.scoring.gap_open, 9);
        assert_eq!(custom.reference_mode, ReferenceMode::Linear);
        assert_eq!(custom.report_format, "json");
    }

    #[test]
    fn test_invalid_arguments() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("a.fasta");
        std::fs::write(&input, ">a\nACGT\n").unwrap();
        let input = input.to_string_lossy().to_string();
        let out = dir.path().join("out").to_string_lossy().to_string();

        assert!(validate_args(&parse(&["--output-dir", out.as_str()])).is_err());
        assert!(validate_args(&parse(&[input.as_str()])).is_err());
        assert!(validate_args(&parse(&["nope.fasta", "--output-dir", out.as_str()])).is_err());
        assert!(validate_args(&parse(&[input.as_str(), "--output-dir", out.as_str(), "--scoring-mode", "protein"])).is_err());
        assert!(validate_args(&parse(&[input.as_str(), "--output-dir", out.as_str(), "--match-score", "0"])).is_err());
        assert!(validate_args(&parse(&[input.as_str(), "--output-dir", out.as_str(), "--score-threshold", "-1"])).is_err());
        assert!(validate_args(&parse(&[input.as_str(), "--output-dir", out.as_str(), "--matrix-format", "nexus"])).is_err());
        assert!(validate_args(&parse(&[input.as_str(), "--output-dir", out.as_str(), "--threads", "0"])).is_err());
    }
}
