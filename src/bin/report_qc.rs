//! CLI binary for the tumor/normal alignment QC report

use clap::Parser;
use env_logger::Env;
use somatic_qc_rs::{
    html::write_report,
    inputs::{load_params, load_versions},
    report::{build_report, load_pair, report_file_name, QcReport, ReportMeta, SamplePaths},
    utils::{validate_file_readable, Timer},
    validate_report_config, QcError, QcResult, ReportConfig,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "report_qc")]
#[command(about = "Alignment QC report for paired tumor/normal samples")]
#[command(long_about = "
This tool summarises alignment statistics of a tumor/normal pair into a single
self-contained HTML report: read counts, read N50, read length, read quality and
alignment accuracy distributions, mapped/unmapped flag counts, and depth of
coverage along the reference.

Each sample's mean genome-wide depth (the `total` row of the mosdepth summary)
is tested against its coverage threshold and reported as PASS or FAIL.

Any input may be plain text or gzip compressed. Missing optional inputs and
empty files produce empty sections instead of errors.

The report is written to <OUTPUT_DIR>/<NAME>-report.html.
")]
struct Args {
    /// Report name
    #[arg(long)]
    name: String,

    /// Sample identifier
    #[arg(long = "sample_id", alias = "sample-id")]
    sample_id: String,

    /// Per-read stats file for the tumor sample
    #[arg(long = "read_stats_tumor", value_name = "FILE")]
    read_stats_tumor: Option<PathBuf>,

    /// Per-read stats file for the normal sample
    #[arg(long = "read_stats_normal", value_name = "FILE")]
    read_stats_normal: Option<PathBuf>,

    /// Flagstat file for the tumor sample
    #[arg(long = "flagstat_tumor", value_name = "FILE")]
    flagstat_tumor: Option<PathBuf>,

    /// Flagstat file for the normal sample
    #[arg(long = "flagstat_normal", value_name = "FILE")]
    flagstat_normal: Option<PathBuf>,

    /// Mosdepth per-window depth for the tumor sample
    #[arg(long = "depth_tumor", value_name = "FILE")]
    depth_tumor: Option<PathBuf>,

    /// Mosdepth per-window depth for the normal sample
    #[arg(long = "depth_normal", value_name = "FILE")]
    depth_normal: Option<PathBuf>,

    /// Mosdepth summary for the tumor sample
    #[arg(long = "mosdepth_summary_tumor", value_name = "FILE")]
    mosdepth_summary_tumor: Option<PathBuf>,

    /// Mosdepth summary for the normal sample
    #[arg(long = "mosdepth_summary_normal", value_name = "FILE")]
    mosdepth_summary_normal: Option<PathBuf>,

    /// Coverage threshold for the tumor sample
    #[arg(long = "tumor_cov_threshold")]
    tumor_cov_threshold: f64,

    /// Coverage threshold for the normal sample
    #[arg(long = "normal_cov_threshold")]
    normal_cov_threshold: f64,

    /// JSON file with workflow parameters
    #[arg(long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// CSV file with software versions
    #[arg(long, value_name = "FILE")]
    versions: Option<PathBuf>,

    /// Git branch/tag of the executed workflow
    #[arg(long, default_value = "unknown")]
    revision: String,

    /// Git commit of the executed workflow
    #[arg(long, default_value = "unknown")]
    commit: String,

    /// Directory receiving the report
    #[arg(long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn tumor_paths(&self) -> SamplePaths {
        SamplePaths {
            read_stats: self.read_stats_tumor.clone(),
            flagstat: self.flagstat_tumor.clone(),
            depth: self.depth_tumor.clone(),
            mosdepth_summary: self.mosdepth_summary_tumor.clone(),
        }
    }

    fn normal_paths(&self) -> SamplePaths {
        SamplePaths {
            read_stats: self.read_stats_normal.clone(),
            flagstat: self.flagstat_normal.clone(),
            depth: self.depth_normal.clone(),
            mosdepth_summary: self.mosdepth_summary_normal.clone(),
        }
    }

    fn input_files(&self) -> impl Iterator<Item = &PathBuf> {
        [
            &self.read_stats_tumor,
            &self.read_stats_normal,
            &self.flagstat_tumor,
            &self.flagstat_normal,
            &self.depth_tumor,
            &self.depth_normal,
            &self.mosdepth_summary_tumor,
            &self.mosdepth_summary_normal,
            &self.params,
            &self.versions,
        ]
        .into_iter()
        .flatten()
    }
}

/// Write `<output_dir>/<name>-report.html`, creating the directory if needed
fn write_report_file(output_dir: &Path, name: &str, report: &QcReport) -> QcResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let report_path = output_dir.join(report_file_name(name));
    write_report(&report_path, report)?;
    Ok(report_path)
}

fn run() -> QcResult<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_secs()
        .init();

    log::info!("Starting QC report for sample {}", args.sample_id);

    let config = ReportConfig {
        tumor_cov_threshold: args.tumor_cov_threshold,
        normal_cov_threshold: args.normal_cov_threshold,
        ..ReportConfig::default()
    };
    validate_report_config(&config)?;
    log::info!(
        "Coverage thresholds: tumor={}x, normal={}x",
        config.tumor_cov_threshold,
        config.normal_cov_threshold
    );

    for path in args.input_files() {
        validate_file_readable(path)?;
    }

    let (tumor, normal) = {
        let _timer = Timer::new("Loading tumor/normal inputs");
        load_pair(&args.tumor_paths(), &args.normal_paths())?
    };
    log::info!(
        "Loaded {} tumor reads and {} normal reads",
        tumor.read_stats.len(),
        normal.read_stats.len()
    );

    let meta = ReportMeta {
        sample_id: args.sample_id.clone(),
        revision: args.revision.clone(),
        commit: args.commit.clone(),
        versions: match &args.versions {
            Some(path) => load_versions(path)?,
            None => Vec::new(),
        },
        params: match &args.params {
            Some(path) => load_params(path)?,
            None => Vec::new(),
        },
    };

    let report_path = {
        let _timer = Timer::new("Rendering report");
        let report = build_report(meta, &config, &tumor, &normal);
        write_report_file(&args.output_dir, &args.name, &report)?
    };

    log::info!("Written report to {:?}", report_path);
    Ok(())
}

/// Handle application errors and provide user-friendly messages
fn handle_error(error: QcError) -> ! {
    match error {
        QcError::FileNotFound(path) => {
            eprintln!("Error: File not found: {}", path);
            eprintln!("Please check that the file exists and is readable.");
        }
        QcError::InvalidInput(msg) => {
            eprintln!("Error: Invalid input data: {}", msg);
            eprintln!("Please check that the statistics files are properly formatted.");
        }
        QcError::InvalidConfig(msg) => {
            eprintln!("Error: Invalid configuration: {}", msg);
            eprintln!("Please check your coverage thresholds.");
        }
        QcError::Csv(ref e) => {
            eprintln!("Error: Table parsing error: {}", e);
            eprintln!("Please check that the statistics files are tab-separated with the expected columns.");
        }
        QcError::Json(ref e) => {
            eprintln!("Error: Parameters file error: {}", e);
            eprintln!("Please check that --params points to a JSON object.");
        }
        QcError::Io(ref e) => {
            eprintln!("Error: I/O error: {}", e);
            eprintln!("Please check file permissions and disk space.");
        }
        other => {
            eprintln!("Error: {}", other);
        }
    }
    std::process::exit(1);
}

fn main() {
    if let Err(e) = run() {
        handle_error(e);
    }
}
