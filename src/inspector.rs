// inspector.rs - Run record inspector
// Features: LZ4 run record summary, scoring mode detection, compatibility checks

use std::path::Path;

use argh::FromArgs;
use presurvey::cache::{short_hash, RunRecord};
use presurvey::core::ScoringScheme;
use presurvey::output::format_groupings;

#[derive(FromArgs)]
/// Inspect presurvey run records
struct Args {
    /// path to the run record (.lz4)
    #[argh(option)]
    record: String,

    /// print the stored distance matrix
    #[argh(switch)]
    show_matrix: bool,

    /// check compatibility with given scoring (format: match,mismatch,gap_open,gap_extend)
    #[argh(option)]
    check_compatibility: Option<String>,

    /// quiet mode - minimal output
    #[argh(switch)]
    quiet: bool,
}

fn parse_scoring(spec: &str) -> Result<ScoringScheme, String> {
    let values: Vec<i32> = spec
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<i32>()
                .map_err(|e| format!("Invalid scoring value '{}': {}", v, e))
        })
        .collect::<Result<_, _>>()?;
    match values.as_slice() {
        [m, x, o, e] => Ok(ScoringScheme::custom(*m, *x, *o, *e)),
        _ => Err(format!(
            "Expected 4 comma-separated values (match,mismatch,gap_open,gap_extend), got {}",
            values.len()
        )),
    }
}

fn main() {
    let args: Args = argh::from_env();
    if let Err(e) = run(&args) {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), String> {
    let record = RunRecord::load(Path::new(&args.record))?;

    if !args.quiet {
        println!("🔍 Run record: {}", args.record);
        println!("   Version: {} (format v{})", record.version, record.format_version);
        println!("   Created: {}", record.created);
        println!(
            "   Scoring: match={}, mismatch={}, gap_open={}, gap_extend={} [{}]",
            record.scoring.match_score,
            record.scoring.mismatch_score,
            record.scoring.gap_open,
            record.scoring.gap_extend,
            record.scoring.detect_mode()
        );
        println!("   Reference mode: {:?}", record.reference_mode);
        println!("   Score threshold: {}", record.score_threshold);
        println!("   Sequences: {}", record.sequence_names.len());
        for ((label, name), hash) in record
            .labels
            .iter()
            .zip(&record.sequence_names)
            .zip(&record.sequence_hashes)
        {
            println!("     {: <4}: {} ({}…)", label, name, short_hash(hash));
        }
        println!("   Max distance: {}", record.score_matrix.max_distance());
        print!(
            "{}",
            format_groupings(&record.labels, &record.sequence_names, &record.combinations)
        );
    }

    if args.show_matrix {
        println!("\n📊 Distance matrix (rows = references):");
        print!("{}", record.score_matrix);
    }

    if let Some(spec) = &args.check_compatibility {
        let scoring = parse_scoring(spec)?;
        if record.scoring.same_scores(&scoring) {
            println!("✅ Compatible: scoring matches the run record");
        } else {
            println!(
                "❌ Incompatible: run record uses {} scoring, requested {}",
                record.scoring.detect_mode(),
                scoring.detect_mode()
            );
            std::process::exit(2);
        }
    }

    Ok(())
}
