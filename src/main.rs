// main.rs - CLI entry point

use std::path::Path;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use presurvey::cache::RunRecord;
use presurvey::cli::Config;
use presurvey::prelude::*;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    let validation = validate_args(&args)?;
    let total_start = Instant::now();

    println!("🚀 presurvey v{}", env!("CARGO_PKG_VERSION"));
    println!("⚡ Strategy: Oriented local alignment → Complete linkage → Balanced combinations");

    // Configure thread pool
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
        println!("🧵 Threads: {}", n);
    } else {
        println!("🧵 Threads: {} (auto-detected)", rayon::current_num_threads());
    }

    let scoring = &validation.scoring;
    println!(
        "🎯 Scoring: match={}, mismatch={}, gap_open={}, gap_extend={} ({})",
        scoring.match_score,
        scoring.mismatch_score,
        scoring.gap_open,
        scoring.gap_extend,
        scoring.description.as_deref().unwrap_or("custom")
    );
    println!("✂️  Score threshold: {}", validation.score_threshold);
    if validation.reference_mode == ReferenceMode::Linear {
        println!("📏 Linear mode: circular references are not doubled");
    }

    // Load sequences
    let set = SequenceSet::from_paths(&validation.inputs, args.linear)?;
    validate_sequences(&set.sequences).map_err(|e| e.to_string())?;
    let labels = resolve_labels(validation.labels.as_deref(), set.len())?;
    let names = set.names();

    if args.dry_run {
        println!("✅ Dry run completed successfully");
        println!(
            "   {} sequences, {} alignment pairs would be computed",
            set.len(),
            DistanceMatrixBuilder::pair_count(set.len())
        );
        return Ok(());
    }

    // Reuse a matching run record when allowed
    let cached_matrix = match &args.cache_file {
        Some(cache_path) if Path::new(cache_path).exists() && !args.force_recompute => {
            println!("📂 Loading run record from {}...", cache_path);
            match RunRecord::load(Path::new(cache_path)) {
                Ok(record) if record.matches(&labels, &set.sequences, scoring, validation.reference_mode) => {
                    println!("♻️  Inputs unchanged (recorded {}), reusing distance matrix", record.created);
                    Some(record.score_matrix)
                }
                Ok(_) => {
                    println!("⚠️  Run record does not match the current inputs, recomputing");
                    None
                }
                Err(e) => {
                    eprintln!("⚠️  Warning: ignoring unreadable run record: {}", e);
                    None
                }
            }
        }
        _ => None,
    };

    let raw_matrix = match cached_matrix {
        Some(matrix) => matrix,
        None => {
            let pair_count = DistanceMatrixBuilder::pair_count(set.len());
            println!("🔬 Aligning {} ordered pairs (both orientations each)...", pair_count);
            let align_start = Instant::now();

            let pb = ProgressBar::new(pair_count as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {per_sec} ETA: {eta}")
                    .map_err(|e| format!("Invalid progress template: {}", e))?
                    .progress_chars("#>-"),
            );

            let builder = DistanceMatrixBuilder::new(scoring.clone())
                .reference_mode(validation.reference_mode)
                .with_progress(pb.clone());
            let matrix = builder.build(&set.sequences).map_err(|e| e.to_string())?;
            pb.finish_with_message("✅ Alignments done!");

            println!(
                "✅ Distance matrix computed in {:.2}s",
                align_start.elapsed().as_secs_f64()
            );
            matrix
        }
    };

    let recommendation =
        recommend_combinations(&raw_matrix, validation.score_threshold).map_err(|e| e.to_string())?;

    println!(
        "🧬 {} families, {} combinations",
        recommendation.families.len(),
        recommendation.combinations.len()
    );
    let order: Vec<&str> = leaf_order(set.len(), &recommendation.merge_history)
        .into_iter()
        .map(|i| labels[i].as_str())
        .collect();
    println!("🌳 Dendrogram leaf order: {}", order.join(" "));

    print_groupings(&labels, &names, &recommendation.combinations);

    // Write outputs
    let output_dir = &validation.output_dir;
    let matrix_path = output_dir.join(format!("score_matrix.{}", validation.matrix_format));
    write_matrix(
        &matrix_path,
        &validation.matrix_format,
        &labels,
        &recommendation.raw_matrix,
        &command_line,
    )?;

    let report_path = output_dir.join(format!("groupings.{}", validation.report_format));
    write_groupings(
        &report_path,
        &validation.report_format,
        &labels,
        &names,
        &recommendation,
        validation.score_threshold,
    )?;

    if let Some(cache_path) = &args.cache_file {
        let record = RunRecord::new(
            labels.clone(),
            &set.sequences,
            scoring.clone(),
            validation.reference_mode,
            validation.score_threshold,
            recommendation.raw_matrix.clone(),
            recommendation.combinations.clone(),
        );
        if let Err(e) = record.save(Path::new(cache_path)) {
            eprintln!("⚠️  Warning: Failed to save run record: {}", e);
        }
    }

    println!(
        "\n🎉 Survey completed in {:.2}s",
        total_start.elapsed().as_secs_f64()
    );
    Ok(())
}
