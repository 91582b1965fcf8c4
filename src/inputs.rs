//! Loaders for the tabular QC inputs
//!
//! Every loader accepts plain or gzip compressed text. An empty file yields an
//! empty table rather than an error.

use crate::{utils::open_reader, QcError, QcResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

fn tsv_reader<P: AsRef<Path>>(
    path: P,
    has_headers: bool,
) -> QcResult<csv::Reader<Box<dyn std::io::BufRead>>> {
    let reader = open_reader(path)?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_headers)
        .from_reader(reader))
}

/// Per-read alignment statistics; only the columns the report uses
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReadStat {
    pub read_length: u64,
    pub mean_quality: f64,
    pub acc: f64,
}

/// Load a per-read statistics table (tab-separated, with header)
pub fn load_read_stats<P: AsRef<Path>>(path: P) -> QcResult<Vec<ReadStat>> {
    let mut reader = tsv_reader(&path, true)?;
    let mut reads = Vec::new();
    for result in reader.deserialize() {
        reads.push(result?);
    }
    log::debug!("Loaded {} reads from {:?}", reads.len(), path.as_ref());
    Ok(reads)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MappingStatus {
    Mapped,
    Unmapped,
}

impl MappingStatus {
    /// `*` is the reference name of unmapped reads
    pub fn from_ref(reference: &str) -> Self {
        if reference == "*" {
            MappingStatus::Unmapped
        } else {
            MappingStatus::Mapped
        }
    }
}

impl fmt::Display for MappingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingStatus::Mapped => write!(f, "Mapped"),
            MappingStatus::Unmapped => write!(f, "Unmapped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlagstatRow {
    pub sample_name: String,
    pub status: MappingStatus,
    pub counts: Vec<u64>,
}

/// Flag counts summed per sample and mapping status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagstatTable {
    pub count_columns: Vec<String>,
    pub rows: Vec<FlagstatRow>,
}

impl FlagstatTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load a per-reference flagstat table and collapse it to mapped/unmapped totals.
///
/// Requires `ref` and `sample_name` columns; every other column is a count.
pub fn load_flagstat<P: AsRef<Path>>(path: P) -> QcResult<FlagstatTable> {
    let mut reader = tsv_reader(&path, true)?;
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(FlagstatTable::default());
    }

    let column = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            QcError::InvalidInput(format!(
                "{} column not found in flagstat file {:?}",
                name,
                path.as_ref()
            ))
        })
    };
    let ref_idx = column("ref")?;
    let sample_idx = column("sample_name")?;
    let count_idx: Vec<usize> = (0..headers.len())
        .filter(|i| *i != ref_idx && *i != sample_idx)
        .collect();

    let mut grouped: BTreeMap<(String, MappingStatus), Vec<u64>> = BTreeMap::new();
    for result in reader.records() {
        let record = result?;
        let status = MappingStatus::from_ref(&record[ref_idx]);
        let sums = grouped
            .entry((record[sample_idx].to_string(), status))
            .or_insert_with(|| vec![0; count_idx.len()]);

        for (sum, idx) in sums.iter_mut().zip(&count_idx) {
            let value = record[*idx].parse::<u64>().map_err(|_| {
                QcError::InvalidInput(format!(
                    "Invalid count {:?} in column {}",
                    &record[*idx], &headers[*idx]
                ))
            })?;
            *sum += value;
        }
    }

    Ok(FlagstatTable {
        count_columns: count_idx.iter().map(|i| headers[*i].to_string()).collect(),
        rows: grouped
            .into_iter()
            .map(|((sample_name, status), counts)| FlagstatRow {
                sample_name,
                status,
                counts,
            })
            .collect(),
    })
}

/// One row of a mosdepth summary
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoverageSummaryRow {
    pub chrom: String,
    pub length: u64,
    pub bases: u64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Mosdepth summary split into whole-chromosome and regional rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MosdepthSummary {
    pub chromosomes: Vec<CoverageSummaryRow>,
    pub regions: Vec<CoverageSummaryRow>,
}

impl MosdepthSummary {
    /// The genome-wide `total` row
    pub fn total(&self) -> Option<&CoverageSummaryRow> {
        self.chromosomes.iter().find(|row| row.chrom == "total")
    }

    /// Lowest and highest mean depth over the non-regional rows
    pub fn mean_range(&self) -> Option<(f64, f64)> {
        let means: Vec<f64> = self.chromosomes.iter().map(|row| row.mean).collect();
        crate::stats::min_max(&means)
    }
}

pub fn load_mosdepth_summary<P: AsRef<Path>>(path: P) -> QcResult<MosdepthSummary> {
    let mut reader = tsv_reader(&path, true)?;
    let mut summary = MosdepthSummary::default();
    for result in reader.deserialize() {
        let row: CoverageSummaryRow = result?;
        if row.chrom.contains("_region") {
            summary.regions.push(row);
        } else {
            summary.chromosomes.push(row);
        }
    }
    Ok(summary)
}

/// Mean depth over one window of a mosdepth regions file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DepthWindow {
    pub chrom: String,
    pub start: u64,
    pub stop: u64,
    pub depth: f64,
}

/// Load a headerless `chrom start stop depth` windows file
pub fn load_depth_windows<P: AsRef<Path>>(path: P) -> QcResult<Vec<DepthWindow>> {
    let mut reader = tsv_reader(&path, false)?;
    let mut windows = Vec::new();
    for result in reader.deserialize() {
        windows.push(result?);
    }
    log::debug!("Loaded {} depth windows from {:?}", windows.len(), path.as_ref());
    Ok(windows)
}

/// Load `name,version` pairs of the software used by the workflow
pub fn load_versions<P: AsRef<Path>>(path: P) -> QcResult<Vec<(String, String)>> {
    let reader = open_reader(path)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut versions = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        if record.len() < 2 {
            continue;
        }
        versions.push((record[0].trim().to_string(), record[1].trim().to_string()));
    }
    Ok(versions)
}

/// Load the workflow parameters JSON object as display pairs
pub fn load_params<P: AsRef<Path>>(path: P) -> QcResult<Vec<(String, String)>> {
    let reader = open_reader(path)?;
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    let object = value.as_object().ok_or_else(|| {
        QcError::InvalidInput("workflow parameters must be a JSON object".to_string())
    })?;

    Ok(object
        .iter()
        .map(|(key, value)| {
            let shown = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), shown)
        })
        .collect())
}
