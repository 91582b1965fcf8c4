//! Reference genome build detection from chromosome sizes
//!
//! Observed chromosome lengths are matched against a fixed table of human
//! reference builds. A build matches when every observed (name, length) pair
//! is present in its table, so partial chromosome sets remain classifiable.

use crate::{
    utils::{ensure_parent_dirs, open_reader},
    QcError, QcResult,
};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::io::{BufRead, Write};
use std::path::Path;

/// Chromosome name to length, lengths kept as decimal text
pub type ChromSizes = HashMap<String, String>;

/// The 24 canonical human chromosomes
pub const ALLOWED_CHR: [&str; 24] = [
    "chr1", "chr2", "chr3", "chr4", "chr5", "chr6", "chr7", "chr8", "chr9", "chr10", "chr11",
    "chr12", "chr13", "chr14", "chr15", "chr16", "chr17", "chr18", "chr19", "chr20", "chr21",
    "chr22", "chrX", "chrY",
];

/// Sub-workflow tag that is restricted to a single build
pub const STR_WORKFLOW: &str = "str";

/// Build required by [`STR_WORKFLOW`]
pub const STR_REQUIRED_BUILD: GenomeBuild = GenomeBuild::Hg38;

/// Message written to stderr when the detected build cannot be used
pub const BAD_GENOME_MESSAGE: &str =
    "The genome build detected in the BAM is not compatible with this workflow.\n";

const HG19_SIZES: [(&str, &str); 24] = [
    ("chr1", "249250621"),
    ("chr2", "243199373"),
    ("chr3", "198022430"),
    ("chr4", "191154276"),
    ("chr5", "180915260"),
    ("chr6", "171115067"),
    ("chr7", "159138663"),
    ("chr8", "146364022"),
    ("chr9", "141213431"),
    ("chr10", "135534747"),
    ("chr11", "135006516"),
    ("chr12", "133851895"),
    ("chr13", "115169878"),
    ("chr14", "107349540"),
    ("chr15", "102531392"),
    ("chr16", "90354753"),
    ("chr17", "81195210"),
    ("chr18", "78077248"),
    ("chr19", "59128983"),
    ("chr20", "63025520"),
    ("chr21", "48129895"),
    ("chr22", "51304566"),
    ("chrX", "155270560"),
    ("chrY", "59373566"),
];

const HG38_SIZES: [(&str, &str); 24] = [
    ("chr1", "248956422"),
    ("chr2", "242193529"),
    ("chr3", "198295559"),
    ("chr4", "190214555"),
    ("chr5", "181538259"),
    ("chr6", "170805979"),
    ("chr7", "159345973"),
    ("chr8", "145138636"),
    ("chr9", "138394717"),
    ("chr10", "133797422"),
    ("chr11", "135086622"),
    ("chr12", "133275309"),
    ("chr13", "114364328"),
    ("chr14", "107043718"),
    ("chr15", "101991189"),
    ("chr16", "90338345"),
    ("chr17", "83257441"),
    ("chr18", "80373285"),
    ("chr19", "58617616"),
    ("chr20", "64444167"),
    ("chr21", "46709983"),
    ("chr22", "50818468"),
    ("chrX", "156040895"),
    ("chrY", "57227415"),
];

const CHM13V2_SIZES: [(&str, &str); 24] = [
    ("chr1", "248387328"),
    ("chr2", "242696752"),
    ("chr3", "201105948"),
    ("chr4", "193574945"),
    ("chr5", "182045439"),
    ("chr6", "172126628"),
    ("chr7", "160567428"),
    ("chr8", "146259331"),
    ("chr9", "150617247"),
    ("chr10", "134758134"),
    ("chr11", "135127769"),
    ("chr12", "133324548"),
    ("chr13", "113566686"),
    ("chr14", "101161492"),
    ("chr15", "99753195"),
    ("chr16", "96330374"),
    ("chr17", "84276897"),
    ("chr18", "80542538"),
    ("chr19", "61707364"),
    ("chr20", "66210255"),
    ("chr21", "45090682"),
    ("chr22", "51324926"),
    ("chrX", "154259566"),
    ("chrY", "62460029"),
];

/// Known human reference builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenomeBuild {
    Hg19,
    Hg38,
    Chm13v2,
}

/// Builds in matching priority order; the first match wins
pub const KNOWN_BUILDS: [GenomeBuild; 3] =
    [GenomeBuild::Hg19, GenomeBuild::Hg38, GenomeBuild::Chm13v2];

impl GenomeBuild {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenomeBuild::Hg19 => "hg19",
            GenomeBuild::Hg38 => "hg38",
            GenomeBuild::Chm13v2 => "chm13v2",
        }
    }

    /// Canonical chromosome lengths of this build
    pub fn chromosome_sizes(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            GenomeBuild::Hg19 => &HG19_SIZES,
            GenomeBuild::Hg38 => &HG38_SIZES,
            GenomeBuild::Chm13v2 => &CHM13V2_SIZES,
        }
    }

    /// The reference table as an owned mapping
    pub fn reference_sizes(&self) -> ChromSizes {
        self.chromosome_sizes()
            .iter()
            .map(|(chrom, length)| (chrom.to_string(), length.to_string()))
            .collect()
    }
}

impl fmt::Display for GenomeBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix a chromosome name with `chr` when it lacks one
pub fn normalize_chrom_name(name: &str) -> String {
    if name.starts_with("chr") {
        name.to_string()
    } else {
        format!("chr{}", name)
    }
}

pub fn is_allowed_chromosome(name: &str) -> bool {
    ALLOWED_CHR.contains(&name)
}

/// Read a tab-separated chromosome index (e.g. a `.fai`) into a size mapping.
///
/// Column 0 is the chromosome name and column 1 its length; further columns
/// are ignored. Names are normalized with [`normalize_chrom_name`] and any
/// other line, comments included, is skipped. A canonical chromosome without
/// a length column is a [`QcError::MalformedIndex`].
pub fn parse_chromosome_sizes<P: AsRef<Path>>(path: P) -> QcResult<ChromSizes> {
    let reader = open_reader(&path)?;
    let mut sizes = ChromSizes::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let mut cols = line.split('\t');
        let chrom = normalize_chrom_name(cols.next().unwrap_or_default());
        if !is_allowed_chromosome(&chrom) {
            log::debug!("Ignoring non-canonical chromosome {}", chrom);
            continue;
        }

        let length = cols.next().ok_or_else(|| QcError::MalformedIndex {
            line: index + 1,
            content: line.to_string(),
        })?;
        sizes.insert(chrom, length.to_string());
    }

    log::info!("Read {} canonical chromosome sizes", sizes.len());
    Ok(sizes)
}

/// True when every key/value pair of `observed` is also present in `reference`
pub fn is_subset<K, V>(observed: &HashMap<K, V>, reference: &HashMap<K, V>) -> bool
where
    K: Eq + Hash,
    V: PartialEq,
{
    observed
        .iter()
        .all(|(key, value)| reference.get(key) == Some(value))
}

/// Identify the reference build consistent with the observed sizes.
///
/// Returns `None` for an empty mapping or when no known build contains every
/// observed pair. Builds are tried in [`KNOWN_BUILDS`] order.
pub fn detect_genome_build(sizes: &ChromSizes) -> Option<GenomeBuild> {
    if sizes.is_empty() {
        return None;
    }

    KNOWN_BUILDS
        .iter()
        .copied()
        .find(|build| is_subset(sizes, &build.reference_sizes()))
}

/// Outcome of checking a detected build against the requested sub-workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeCheck {
    pub build: Option<GenomeBuild>,
    pub bad_genome: bool,
    pub context: String,
}

/// Decide whether a detected build is usable for the given sub-workflow
pub fn check_genome(build: Option<GenomeBuild>, workflow: Option<&str>) -> GenomeCheck {
    let (bad_genome, context) = match build {
        None => (true, String::new()),
        Some(detected) if workflow == Some(STR_WORKFLOW) && detected != STR_REQUIRED_BUILD => (
            true,
            format!(
                "Detected genome: {}, but STRs can only be genotyped when aligned to build 38.\n",
                detected
            ),
        ),
        Some(_) => (false, String::new()),
    };

    GenomeCheck {
        build,
        bad_genome,
        context,
    }
}

/// Write the build identifier to `output` with no trailing newline.
///
/// Missing parent directories are created.
pub fn write_genome_build<P: AsRef<Path>>(build: GenomeBuild, output: P) -> QcResult<()> {
    ensure_parent_dirs(&output)?;
    let mut file = std::fs::File::create(output)?;
    file.write_all(build.as_str().as_bytes())?;
    Ok(())
}

/// Classify `sizes`, check the sub-workflow and write the build when usable.
///
/// Nothing is written for a bad genome; the caller decides how to report it.
pub fn detect_and_write<P: AsRef<Path>>(
    sizes: &ChromSizes,
    workflow: Option<&str>,
    output: P,
) -> QcResult<GenomeCheck> {
    let build = detect_genome_build(sizes);
    match build {
        Some(b) => log::info!("Detected genome build: {}", b),
        None => log::warn!("No known genome build matches the chromosome sizes"),
    }

    let check = check_genome(build, workflow);
    if let (false, Some(build)) = (check.bad_genome, check.build) {
        write_genome_build(build, output)?;
    }

    Ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sizes(pairs: &[(&str, &str)]) -> ChromSizes {
        pairs
            .iter()
            .map(|(c, l)| (c.to_string(), l.to_string()))
            .collect()
    }

    fn index_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_full_tables_classify_as_their_build() {
        for build in KNOWN_BUILDS {
            assert_eq!(detect_genome_build(&build.reference_sizes()), Some(build));
        }
    }

    #[test]
    fn test_partial_tables_classify_as_their_build() {
        assert_eq!(
            detect_genome_build(&sizes(&[("chr1", "249250621")])),
            Some(GenomeBuild::Hg19)
        );
        assert_eq!(
            detect_genome_build(&sizes(&[("chr1", "248956422"), ("chrX", "156040895")])),
            Some(GenomeBuild::Hg38)
        );
        assert_eq!(
            detect_genome_build(&sizes(&[
                ("chr9", "150617247"),
                ("chr22", "51324926"),
                ("chrY", "62460029"),
            ])),
            Some(GenomeBuild::Chm13v2)
        );
    }

    #[test]
    fn test_empty_sizes_detect_nothing() {
        assert_eq!(detect_genome_build(&ChromSizes::new()), None);
    }

    #[test]
    fn test_unknown_or_mixed_sizes_detect_nothing() {
        assert_eq!(detect_genome_build(&sizes(&[("chr1", "1000")])), None);
        // Lengths from two different builds
        assert_eq!(
            detect_genome_build(&sizes(&[("chr1", "249250621"), ("chr2", "242193529")])),
            None
        );
    }

    #[test]
    fn test_detection_is_repeatable() {
        let observed = sizes(&[("chr2", "243199373"), ("chr3", "198022430")]);
        let first = detect_genome_build(&observed);
        for _ in 0..5 {
            assert_eq!(detect_genome_build(&observed), first);
        }
    }

    #[test]
    fn test_is_subset() {
        let reference = sizes(&[("chr1", "10"), ("chr2", "20")]);
        assert!(is_subset(&sizes(&[("chr1", "10")]), &reference));
        assert!(is_subset(&ChromSizes::new(), &reference));
        assert!(!is_subset(&sizes(&[("chr1", "11")]), &reference));
        assert!(!is_subset(&sizes(&[("chr3", "10")]), &reference));
    }

    #[test]
    fn test_parse_normalizes_names() {
        let prefixed = index_file(&["chr1\t249250621\t52\t60\t61"]);
        let bare = index_file(&["1\t249250621\t52\t60\t61"]);

        let prefixed = parse_chromosome_sizes(prefixed.path()).unwrap();
        let bare = parse_chromosome_sizes(bare.path()).unwrap();
        assert_eq!(prefixed, bare);
        assert_eq!(bare.get("chr1").map(String::as_str), Some("249250621"));
    }

    #[test]
    fn test_parse_drops_non_canonical() {
        let file = index_file(&[
            "chr1\t249250621",
            "chrM\t16571",
            "MT\t16569",
            "chr1_gl000191_random\t106433",
            "GL000192.1\t547496",
            "X\t155270560",
        ]);

        let parsed = parse_chromosome_sizes(file.path()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed.contains_key("chr1"));
        assert!(parsed.contains_key("chrX"));
        assert_eq!(detect_genome_build(&parsed), Some(GenomeBuild::Hg19));
    }

    #[test]
    fn test_parse_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(parse_chromosome_sizes(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_strips_trailing_whitespace() {
        let file = index_file(&["chr2\t243199373   ", "", "chr3\t198022430\r"]);
        let parsed = parse_chromosome_sizes(file.path()).unwrap();
        assert_eq!(parsed.get("chr2").map(String::as_str), Some("243199373"));
        assert_eq!(parsed.get("chr3").map(String::as_str), Some("198022430"));
    }

    #[test]
    fn test_parse_skips_lines_without_canonical_name() {
        let file = index_file(&[
            "# samtools faidx output",
            "chr1\t249250621",
            "chrM",
            "chrUn_gl000220 161802",
        ]);
        let parsed = parse_chromosome_sizes(file.path()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get("chr1").map(String::as_str), Some("249250621"));
    }

    #[test]
    fn test_parse_malformed_line() {
        let file = index_file(&["chr1\t249250621", "chr2"]);
        match parse_chromosome_sizes(file.path()) {
            Err(QcError::MalformedIndex { line, content }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "chr2");
            }
            other => panic!("Expected MalformedIndex error, got {:?}", other),
        }
    }

    #[test]
    fn test_check_genome() {
        let check = check_genome(None, None);
        assert!(check.bad_genome);
        assert!(check.context.is_empty());

        let check = check_genome(Some(GenomeBuild::Hg19), None);
        assert!(!check.bad_genome);

        let check = check_genome(Some(GenomeBuild::Hg38), Some("str"));
        assert!(!check.bad_genome);

        let check = check_genome(Some(GenomeBuild::Chm13v2), Some("snv"));
        assert!(!check.bad_genome);

        let check = check_genome(Some(GenomeBuild::Hg19), Some("str"));
        assert!(check.bad_genome);
        assert_eq!(
            check.context,
            "Detected genome: hg19, but STRs can only be genotyped when aligned to build 38.\n"
        );
    }

    #[test]
    fn test_hg19_end_to_end() {
        let lines: Vec<String> = HG19_SIZES
            .iter()
            .map(|(c, l)| format!("{}\t{}", c, l))
            .collect();
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        let file = index_file(&lines);
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("results").join("genome.txt");

        let parsed = parse_chromosome_sizes(file.path()).unwrap();
        let check = detect_and_write(&parsed, None, &output).unwrap();
        assert!(!check.bad_genome);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "hg19");

        let rejected = dir.path().join("str").join("rejected.txt");
        let check = detect_and_write(&parsed, Some(STR_WORKFLOW), &rejected).unwrap();
        assert!(check.bad_genome);
        assert!(check.context.contains("hg19"));
        assert!(!rejected.exists());
        assert!(!dir.path().join("str").exists());
    }

    #[test]
    fn test_empty_input_end_to_end() {
        let file = NamedTempFile::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("genome.txt");

        let parsed = parse_chromosome_sizes(file.path()).unwrap();
        let check = detect_and_write(&parsed, None, &output).unwrap();
        assert!(check.bad_genome);
        assert_eq!(check.build, None);
        assert!(!output.exists());
    }

    #[test]
    fn test_build_names() {
        assert_eq!(GenomeBuild::Chm13v2.as_str(), "chm13v2");
        assert_eq!(GenomeBuild::Hg38.to_string(), "hg38");
    }
}
