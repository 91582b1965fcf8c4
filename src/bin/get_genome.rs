//! CLI binary for genome build detection from chromosome sizes

use clap::Parser;
use env_logger::Env;
use somatic_qc_rs::{
    bam::chromosome_sizes_from_header,
    genome::{detect_and_write, parse_chromosome_sizes, BAD_GENOME_MESSAGE},
    utils::{validate_file_readable, Timer},
    QcError, QcResult,
};
use std::path::PathBuf;

/// Exit status for input data in the wrong format (sysexits `EX_DATAERR`)
const EX_DATAERR: i32 = 65;

#[derive(Parser)]
#[command(name = "get_genome")]
#[command(about = "Detect the reference genome build of an alignment from its chromosome sizes")]
#[command(long_about = "
This tool compares the lengths of the canonical human chromosomes (chr1-chr22,
chrX, chrY) against the known reference builds hg19, hg38 and chm13v2.

Chromosome sizes are read either from a tab-separated index (such as the output
of samtools faidx or idxstats, name in column 1 and length in column 2) or
directly from the @SQ lines of a SAM/BAM/CRAM header. Names without a `chr`
prefix are accepted.

On success the build name is written to the output file without a trailing
newline. If no build matches, or the build cannot be used for the requested
sub-workflow (STR genotyping requires hg38), nothing is written and the tool
exits with status 65.
")]
struct Args {
    /// Tab-separated chromosome index (name, length, ...)
    #[arg(
        long = "chr_counts",
        alias = "chr-counts",
        value_name = "FILE",
        required_unless_present = "bam",
        conflicts_with = "bam"
    )]
    chr_counts: Option<PathBuf>,

    /// Alignment file whose header provides the chromosome sizes
    #[arg(long, value_name = "FILE")]
    bam: Option<PathBuf>,

    /// Path to the output file receiving the genome build name
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Sub-workflow name, used to apply build restrictions
    #[arg(short, long, value_name = "NAME")]
    workflow: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Returns whether the detected genome is usable
fn run(args: Args) -> QcResult<bool> {
    log::info!("Starting genome build detection");
    log::info!("Output file: {:?}", args.output);
    log::info!("Sub-workflow: {:?}", args.workflow);

    let sizes = {
        let _timer = Timer::new("Reading chromosome sizes");
        match (&args.chr_counts, &args.bam) {
            (Some(index), _) => {
                log::info!("Chromosome index: {:?}", index);
                validate_file_readable(index)?;
                parse_chromosome_sizes(index)?
            }
            (None, Some(bam)) => {
                log::info!("Alignment file: {:?}", bam);
                validate_file_readable(bam)?;
                chromosome_sizes_from_header(bam)?
            }
            (None, None) => {
                return Err(QcError::InvalidConfig(
                    "one of --chr_counts or --bam is required".to_string(),
                ))
            }
        }
    };

    let check = detect_and_write(&sizes, args.workflow.as_deref(), &args.output)?;
    if check.bad_genome {
        eprint!("{}", BAD_GENOME_MESSAGE);
        eprint!("{}", check.context);
        return Ok(false);
    }

    log::info!("Genome build written to: {:?}", args.output);
    Ok(true)
}

/// Process exit status for a completed run
fn exit_code(usable: bool) -> i32 {
    if usable {
        0
    } else {
        EX_DATAERR
    }
}

/// Handle application errors and provide user-friendly messages
fn handle_error(error: QcError) -> ! {
    match error {
        QcError::FileNotFound(path) => {
            eprintln!("Error: File not found: {}", path);
            eprintln!("Please check that the file exists and is readable.");
        }
        QcError::MalformedIndex { line, content } => {
            eprintln!("Error: Malformed chromosome index at line {}: {:?}", line, content);
            eprintln!("Each line needs a chromosome name and a length separated by a tab.");
        }
        QcError::Htslib(ref e) => {
            eprintln!("Error: Alignment header error: {}", e);
            eprintln!("Please check that the alignment file is valid SAM/BAM/CRAM.");
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

    match run(args) {
        Ok(usable) => std::process::exit(exit_code(usable)),
        Err(e) => handle_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use somatic_qc_rs::genome::GenomeBuild;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    fn index_for(build: GenomeBuild) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for (chrom, length) in build.chromosome_sizes() {
            writeln!(file, "{}\t{}\t52\t60\t61", chrom, length).unwrap();
        }
        file
    }

    fn args_for(index: &NamedTempFile, output: &Path, workflow: Option<&str>) -> Args {
        let mut argv = vec![
            "get_genome".to_string(),
            "--chr_counts".to_string(),
            index.path().to_string_lossy().to_string(),
            "-o".to_string(),
            output.to_string_lossy().to_string(),
        ];
        if let Some(workflow) = workflow {
            argv.extend(["-w".to_string(), workflow.to_string()]);
        }
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_requires_an_input() {
        assert!(Args::try_parse_from(["get_genome", "-o", "out.txt"]).is_err());
        assert!(Args::try_parse_from([
            "get_genome",
            "--chr_counts",
            "sizes.tsv",
            "--bam",
            "sample.bam",
            "-o",
            "out.txt",
        ])
        .is_err());
    }

    #[test]
    fn test_cli_parses_workflow() {
        let args = Args::try_parse_from([
            "get_genome",
            "--chr_counts",
            "sizes.tsv",
            "-o",
            "out.txt",
            "-w",
            "str",
        ])
        .unwrap();
        assert_eq!(args.chr_counts, Some(PathBuf::from("sizes.tsv")));
        assert_eq!(args.workflow.as_deref(), Some("str"));
        assert!(args.bam.is_none());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(true), 0);
        assert_eq!(exit_code(false), 65);
    }

    #[test]
    fn test_run_writes_detected_build() {
        let index = index_for(GenomeBuild::Hg38);
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out").join("genome.txt");

        assert!(run(args_for(&index, &output, Some("str"))).unwrap());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "hg38");
    }

    #[test]
    fn test_run_rejects_str_on_hg19() {
        let index = index_for(GenomeBuild::Hg19);
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out").join("genome.txt");

        let usable = run(args_for(&index, &output, Some("str"))).unwrap();
        assert!(!usable);
        assert_eq!(exit_code(usable), EX_DATAERR);
        assert!(!output.exists());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_run_rejects_empty_index() {
        let index = NamedTempFile::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("genome.txt");

        assert!(!run(args_for(&index, &output, None)).unwrap());
        assert!(!output.exists());
    }

    #[test]
    fn test_run_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::try_parse_from([
            "get_genome",
            "--chr_counts",
            "/nonexistent/sizes.tsv",
            "-o",
            dir.path().join("genome.txt").to_str().unwrap(),
        ])
        .unwrap();
        assert!(matches!(run(args), Err(QcError::FileNotFound(_))));
    }
}
