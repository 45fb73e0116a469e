// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// presurvey - Plasmid similarity survey and combination planner
pub struct Args {
    /// FASTA files or directories of FASTA files (one plasmid per file)
    #[argh(positional)]
    pub inputs: Vec<String>,

    /// directory receiving the matrix, grouping report and run record
    #[argh(option)]
    pub output_dir: Option<String>,

    /// scoring preset: plasmid, dna (default: plasmid)
    #[argh(option, default = "String::from(\"plasmid\")")]
    pub scoring_mode: String,

    /// custom match score (overrides preset mode)
    #[argh(option)]
    pub match_score: Option<i32>,

    /// custom mismatch score, usually negative (overrides preset mode)
    #[argh(option)]
    pub mismatch_score: Option<i32>,

    /// custom gap open penalty (overrides preset mode)
    #[argh(option)]
    pub gap_open: Option<i32>,

    /// custom gap extend penalty (overrides preset mode)
    #[argh(option)]
    pub gap_extend: Option<i32>,

    /// sequences closer than this distance form one family (default: 20)
    #[argh(option, default = "20.0")]
    pub score_threshold: f64,

    /// align every reference as linear, without doubling circular ones
    #[argh(switch)]
    pub linear: bool,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// matrix output format: tsv, csv (default: tsv)
    #[argh(option, default = "String::from(\"tsv\")")]
    pub matrix_format: String,

    /// grouping report format: txt, json (default: txt)
    #[argh(option, default = "String::from(\"txt\")")]
    pub report_format: String,

    /// run record file (.lz4) reused when inputs and scoring are unchanged
    #[argh(option)]
    pub cache_file: Option<String>,

    /// recompute the distance matrix even if the run record matches
    #[argh(switch)]
    pub force_recompute: bool,

    /// comma-separated short labels, one per input (default: P1..Pn)
    #[argh(option)]
    pub labels: Option<String>,

    /// validate inputs without computation (dry run)
    #[argh(switch)]
    pub dry_run: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}

impl Args {
    /// Labels given with `--labels`, trimmed
    pub fn label_list(&self) -> Option<Vec<String>> {
        self.labels
            .as_ref()
            .map(|raw| raw.split(',').map(|l| l.trim().to_string()).collect())
    }
}
