//! Tumor/normal QC aggregation
//!
//! Loads the per-sample inputs and derives everything the HTML report shows,
//! so rendering only has to lay the numbers out.

use crate::{
    inputs::{
        load_depth_windows, load_flagstat, load_mosdepth_summary, load_read_stats,
        CoverageSummaryRow, DepthWindow, FlagstatTable, MosdepthSummary, ReadStat,
    },
    stats::{compare_max_axes, compute_n50, mean, median, AxisKind, Histogram},
    QcResult, ReportConfig, SampleType,
};
use std::path::{Path, PathBuf};

pub const WORKFLOW_NAME: &str = "wf-somatic-variation";

pub const TUMOR_COLOR: &str = "#0079a4";
pub const NORMAL_COLOR: &str = "#17bb75";
pub const MEAN_COLOR: &str = "#f0c500";
pub const MEDIAN_COLOR: &str = "#a53f96";
pub const N50_COLOR: &str = "#ef4135";

/// Input files of one sample; absent files load as empty tables
#[derive(Debug, Clone, Default)]
pub struct SamplePaths {
    pub read_stats: Option<PathBuf>,
    pub flagstat: Option<PathBuf>,
    pub depth: Option<PathBuf>,
    pub mosdepth_summary: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct SampleInputs {
    pub read_stats: Vec<ReadStat>,
    pub flagstat: FlagstatTable,
    pub summary: MosdepthSummary,
    pub depth: Vec<DepthWindow>,
}

fn load_optional<T: Default>(
    path: Option<&Path>,
    load: impl Fn(&Path) -> QcResult<T>,
) -> QcResult<T> {
    match path {
        Some(path) => load(path),
        None => Ok(T::default()),
    }
}

impl SampleInputs {
    pub fn load(paths: &SamplePaths) -> QcResult<Self> {
        Ok(Self {
            read_stats: load_optional(paths.read_stats.as_deref(), |p| load_read_stats(p))?,
            flagstat: load_optional(paths.flagstat.as_deref(), |p| load_flagstat(p))?,
            summary: load_optional(paths.mosdepth_summary.as_deref(), |p| {
                load_mosdepth_summary(p)
            })?,
            depth: load_optional(paths.depth.as_deref(), |p| load_depth_windows(p))?,
        })
    }

    pub fn read_lengths(&self) -> Vec<u64> {
        self.read_stats.iter().map(|r| r.read_length).collect()
    }

    fn column(&self, f: impl Fn(&ReadStat) -> f64) -> Vec<f64> {
        self.read_stats.iter().map(f).collect()
    }
}

/// Load tumor and normal inputs concurrently
pub fn load_pair(
    tumor: &SamplePaths,
    normal: &SamplePaths,
) -> QcResult<(SampleInputs, SampleInputs)> {
    let (tumor, normal) = rayon::join(|| SampleInputs::load(tumor), || SampleInputs::load(normal));
    Ok((tumor?, normal?))
}

/// Headline numbers of one sample
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMetrics {
    pub sample_type: SampleType,
    pub total_reads: usize,
    pub n50: Option<u64>,
    pub median_read_length: Option<f64>,
    pub coverage_range: Option<(f64, f64)>,
    pub total: Option<CoverageSummaryRow>,
    pub threshold: f64,
    pub passes_threshold: bool,
}

impl SampleMetrics {
    pub fn from_inputs(sample_type: SampleType, inputs: &SampleInputs, threshold: f64) -> Self {
        let lengths = inputs.read_lengths();
        let lengths_f: Vec<f64> = lengths.iter().map(|l| *l as f64).collect();
        let total = inputs.summary.total().cloned();
        let passes_threshold = total.as_ref().map(|t| t.mean > threshold).unwrap_or(false);

        Self {
            sample_type,
            total_reads: inputs.read_stats.len(),
            n50: compute_n50(&lengths),
            median_read_length: median(&lengths_f),
            coverage_range: inputs.summary.mean_range(),
            total,
            threshold,
            passes_threshold,
        }
    }

    pub fn threshold_label(&self) -> &'static str {
        if self.passes_threshold {
            "PASS"
        } else {
            "FAIL"
        }
    }
}

/// A histogram with its summary markers, ready for drawing
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub color: &'static str,
    pub histogram: Histogram,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub n50: Option<u64>,
    /// Decimal places shown for mean and median
    pub rounding: usize,
    pub max_y: f64,
    pub max_x: Option<f64>,
}

/// Layout shared by the tumor and normal histograms of one section
struct HistogramLayout<'a> {
    title: &'a str,
    x_label: &'a str,
    binwidth: f64,
    rounding: usize,
    max_x: Option<f64>,
    with_n50: bool,
}

fn histogram_pair(
    layout: HistogramLayout<'_>,
    tumor: (&[f64], Option<u64>),
    normal: (&[f64], Option<u64>),
) -> [HistogramPlot; 2] {
    let max_y = compare_max_axes(
        tumor.0,
        normal.0,
        AxisKind::Histogram {
            binwidth: Some(layout.binwidth),
        },
    );
    let plot = |sample: SampleType, values: &[f64], n50: Option<u64>, color| HistogramPlot {
        title: format!("{} {}", sample, layout.title),
        x_label: layout.x_label.to_string(),
        y_label: "Number of reads".to_string(),
        color,
        histogram: Histogram::with_binwidth(values, layout.binwidth),
        mean: mean(values),
        median: median(values),
        n50: if layout.with_n50 { n50 } else { None },
        rounding: layout.rounding,
        max_y,
        max_x: layout.max_x,
    };
    [
        plot(SampleType::Tumor, tumor.0, tumor.1, TUMOR_COLOR),
        plot(SampleType::Normal, normal.0, normal.1, NORMAL_COLOR),
    ]
}

/// Depth at the midpoint of a window, also placed on a genome-wide axis
#[derive(Debug, Clone, PartialEq)]
pub struct DepthPoint {
    pub chrom: String,
    pub mean_pos: f64,
    pub total_mean_pos: f64,
    pub depth: f64,
}

/// Window midpoints offset by the summed ends of the preceding chromosomes.
///
/// Chromosomes are ordered by first appearance; the end of a chromosome is the
/// `stop` of its last window.
pub fn depth_profile(windows: &[DepthWindow]) -> Vec<DepthPoint> {
    let mut order: Vec<(&str, u64)> = Vec::new();
    for window in windows {
        match order.iter_mut().find(|(chrom, _)| *chrom == window.chrom) {
            Some(entry) => entry.1 = window.stop,
            None => order.push((&window.chrom, window.stop)),
        }
    }

    let mut offsets = std::collections::HashMap::new();
    let mut running = 0u64;
    for (chrom, end) in &order {
        offsets.insert(*chrom, running);
        running += end;
    }

    windows
        .iter()
        .map(|window| {
            let mean_pos = (window.start + window.stop) as f64 / 2.0;
            let offset = offsets.get(window.chrom.as_str()).copied().unwrap_or(0);
            DepthPoint {
                chrom: window.chrom.clone(),
                mean_pos,
                total_mean_pos: mean_pos + offset as f64,
                depth: window.depth,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepthPlot {
    pub title: String,
    pub points: Vec<DepthPoint>,
    pub max_y: f64,
}

/// Run metadata shown in the report header and footer sections
#[derive(Debug, Clone, Default)]
pub struct ReportMeta {
    pub sample_id: String,
    pub revision: String,
    pub commit: String,
    pub versions: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
}

/// Everything the HTML report renders
#[derive(Debug, Clone)]
pub struct QcReport {
    pub title: String,
    pub workflow: String,
    pub meta: ReportMeta,
    pub tumor_cov_threshold: f64,
    pub normal_cov_threshold: f64,
    pub tumor: SampleMetrics,
    pub normal: SampleMetrics,
    pub read_length_plots: [HistogramPlot; 2],
    pub quality_plots: [HistogramPlot; 2],
    pub accuracy_plots: [HistogramPlot; 2],
    pub flagstat: Vec<(SampleType, FlagstatTable)>,
    pub depth_plots: [DepthPlot; 2],
}

impl QcReport {
    pub fn samples(&self) -> [&SampleMetrics; 2] {
        [&self.tumor, &self.normal]
    }
}

/// Aggregate both samples into a report model
pub fn build_report(
    meta: ReportMeta,
    config: &ReportConfig,
    tumor: &SampleInputs,
    normal: &SampleInputs,
) -> QcReport {
    let tumor_metrics =
        SampleMetrics::from_inputs(SampleType::Tumor, tumor, config.threshold(SampleType::Tumor));
    let normal_metrics = SampleMetrics::from_inputs(
        SampleType::Normal,
        normal,
        config.threshold(SampleType::Normal),
    );
    log::info!(
        "Total coverage: tumor {} ({}), normal {} ({})",
        tumor_metrics.total.as_ref().map(|t| t.mean).unwrap_or(0.0),
        tumor_metrics.threshold_label(),
        normal_metrics.total.as_ref().map(|t| t.mean).unwrap_or(0.0),
        normal_metrics.threshold_label(),
    );

    let lengths_t: Vec<f64> = tumor.column(|r| r.read_length as f64);
    let lengths_n: Vec<f64> = normal.column(|r| r.read_length as f64);
    let read_length_plots = histogram_pair(
        HistogramLayout {
            title: "Read Length",
            x_label: "Read length",
            binwidth: config.read_length_binwidth,
            rounding: 0,
            max_x: None,
            with_n50: true,
        },
        (&lengths_t, tumor_metrics.n50),
        (&lengths_n, normal_metrics.n50),
    );

    let quality_plots = histogram_pair(
        HistogramLayout {
            title: "Mean Read Quality",
            x_label: "Mean read quality",
            binwidth: config.quality_binwidth,
            rounding: 0,
            max_x: None,
            with_n50: false,
        },
        (&tumor.column(|r| r.mean_quality), None),
        (&normal.column(|r| r.mean_quality), None),
    );

    let accuracy_plots = histogram_pair(
        HistogramLayout {
            title: "Alignment Accuracy",
            x_label: "Accuracy [%]",
            binwidth: config.accuracy_binwidth,
            rounding: 1,
            max_x: Some(100.0),
            with_n50: false,
        },
        (&tumor.column(|r| r.acc), None),
        (&normal.column(|r| r.acc), None),
    );

    let depth_t = depth_profile(&tumor.depth);
    let depth_n = depth_profile(&normal.depth);
    let depth_max_y = compare_max_axes(
        &depth_t.iter().map(|p| p.depth).collect::<Vec<_>>(),
        &depth_n.iter().map(|p| p.depth).collect::<Vec<_>>(),
        AxisKind::Value,
    );

    QcReport {
        title: format!("{} | Read alignment statistics", meta.sample_id),
        workflow: WORKFLOW_NAME.to_string(),
        meta,
        tumor_cov_threshold: config.tumor_cov_threshold,
        normal_cov_threshold: config.normal_cov_threshold,
        tumor: tumor_metrics,
        normal: normal_metrics,
        read_length_plots,
        quality_plots,
        accuracy_plots,
        flagstat: vec![
            (SampleType::Tumor, tumor.flagstat.clone()),
            (SampleType::Normal, normal.flagstat.clone()),
        ],
        depth_plots: [
            DepthPlot {
                title: "Tumor coverage along reference".to_string(),
                points: depth_t,
                max_y: depth_max_y,
            },
            DepthPlot {
                title: "Normal coverage along reference".to_string(),
                points: depth_n,
                max_y: depth_max_y,
            },
        ],
    }
}

/// File name of the rendered report for a run name
pub fn report_file_name(name: &str) -> String {
    format!("{}-report.html", name)
}
