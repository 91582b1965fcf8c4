//! Chromosome sizes from alignment file headers

use crate::{
    genome::{is_allowed_chromosome, normalize_chrom_name, ChromSizes},
    QcError, QcResult,
};
use rust_htslib::bam::{self, Read};
use std::path::Path;

/// Collect canonical chromosome lengths from the `@SQ` lines of a SAM/BAM/CRAM header.
///
/// Names go through the same normalization and filtering as index files.
pub fn chromosome_sizes_from_header<P: AsRef<Path>>(path: P) -> QcResult<ChromSizes> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(QcError::FileNotFound(path.to_string_lossy().to_string()));
    }

    let reader = bam::Reader::from_path(path)?;
    let header = reader.header();
    let mut sizes = ChromSizes::new();

    for tid in 0..header.target_count() {
        let name = String::from_utf8_lossy(header.tid2name(tid)).to_string();
        let length = header.target_len(tid).ok_or_else(|| {
            QcError::InvalidInput(format!("No length for reference sequence {}", name))
        })?;

        let chrom = normalize_chrom_name(&name);
        if is_allowed_chromosome(&chrom) {
            sizes.insert(chrom, length.to_string());
        }
    }

    log::info!(
        "Read {} canonical chromosome sizes from {} header targets",
        sizes.len(),
        header.target_count()
    );
    Ok(sizes)
}
