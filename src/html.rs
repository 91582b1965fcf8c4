//! Self-contained HTML rendering of a [`QcReport`] with inline SVG plots

use crate::{
    inputs::FlagstatTable,
    report::{
        DepthPlot, HistogramPlot, QcReport, SampleMetrics, MEAN_COLOR, MEDIAN_COLOR, N50_COLOR,
    },
    SampleType,
};
use anyhow::{Context, Result};
use std::fmt::Write as FmtWrite;
use std::path::Path;

const PLOT_W: f64 = 520.0;
const PLOT_H: f64 = 320.0;
const LEFT: f64 = 60.0;
const RIGHT: f64 = 20.0;
const TOP: f64 = 16.0;
const BOTTOM: f64 = 40.0;

const SERIES_COLORS: [&str; 8] = [
    "#0079a4", "#17bb75", "#f0c500", "#a53f96", "#ef4135", "#54b8b1", "#f58229", "#1d1d1b",
];

const SECTIONS: [(&str, &str); 9] = [
    ("description", "At a glance"),
    ("filter", "Coverage threshold"),
    ("stats", "Base statistics"),
    ("read-length", "Read length distribution"),
    ("read-quality", "Mean read quality"),
    ("alignments", "Alignment statistics"),
    ("coverage", "Coverage"),
    ("versions", "Software versions"),
    ("params", "Workflow parameters"),
];

/// Render the full report document
pub fn render_report(report: &QcReport) -> Result<String> {
    let mut html = String::with_capacity(256 * 1024);

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        html,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>"
    )?;
    writeln!(html, "<title>{}</title>", escape_html(&report.title))?;
    writeln!(html, "<style>")?;
    writeln!(
        html,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:0;color:#222;background:#fff;}}"
    )?;
    writeln!(
        html,
        "header{{background:#0079a4;color:#fff;padding:14px 24px;}}"
    )?;
    writeln!(html, "header h1{{margin:0;font-size:22px;}}")?;
    writeln!(html, "header .meta{{font-size:13px;opacity:0.9;}}")?;
    writeln!(
        html,
        "nav{{padding:8px 24px;border-bottom:1px solid #ddd;font-size:13px;}}"
    )?;
    writeln!(html, "nav a{{margin-right:14px;color:#0079a4;text-decoration:none;}}")?;
    writeln!(html, "main{{padding:0 24px 24px 24px;}}")?;
    writeln!(html, "h2{{margin:28px 0 8px 0;font-size:20px;}}")?;
    writeln!(html, "p{{max-width:1000px;font-size:14px;}}")?;
    writeln!(
        html,
        ".tiles{{display:grid;grid-template-columns:repeat(2,minmax(200px,400px));gap:10px;}}"
    )?;
    writeln!(html, ".tile{{border:1px solid #ddd;border-radius:4px;padding:10px;}}")?;
    writeln!(html, ".tile .value{{font-size:22px;font-weight:bold;}}")?;
    writeln!(html, ".tile .label{{font-size:12px;color:#555;}}")?;
    writeln!(html, ".grid{{display:flex;flex-wrap:wrap;gap:16px;}}")?;
    writeln!(
        html,
        ".table{{border-collapse:collapse;margin:8px 0 16px 0;font-size:13px;}}"
    )?;
    writeln!(
        html,
        ".table th,.table td{{border:1px solid #ddd;padding:4px 8px;text-align:right;}}"
    )?;
    writeln!(html, ".table th{{background:#f4f4f4;}}")?;
    writeln!(
        html,
        ".table td:first-child,.table th:first-child{{text-align:left;}}"
    )?;
    writeln!(html, ".pass{{color:#0a7a0a;font-weight:bold;}}")?;
    writeln!(html, ".fail{{color:#c00000;font-weight:bold;}}")?;
    writeln!(html, "svg{{background:#fafafa;border:1px solid #e5e5e5;}}")?;
    writeln!(html, "</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;

    writeln!(html, "<header>")?;
    writeln!(html, "<h1>{}</h1>", escape_html(&report.title))?;
    writeln!(
        html,
        "<div class=\"meta\">{} | revision: {} | commit: {}</div>",
        escape_html(&report.workflow),
        escape_html(&report.meta.revision),
        escape_html(&report.meta.commit)
    )?;
    writeln!(html, "</header>")?;

    writeln!(html, "<nav>")?;
    for (id, title) in SECTIONS {
        writeln!(html, "<a href=\"#{}\">{}</a>", id, title)?;
    }
    writeln!(html, "</nav>")?;
    writeln!(html, "<main>")?;

    at_a_glance(&mut html, report)?;
    coverage_threshold(&mut html, report)?;
    base_statistics(&mut html, report)?;

    section_header(&mut html, "read-length", "Read length distribution")?;
    histogram_grid(&mut html, &report.read_length_plots)?;
    writeln!(
        html,
        "<p>Red: read N50; Yellow: mean length; Purple: median length.</p>"
    )?;

    section_header(&mut html, "read-quality", "Mean read quality")?;
    histogram_grid(&mut html, &report.quality_plots)?;
    writeln!(html, "<p>Yellow: mean; Purple: median.</p>")?;

    section_header(&mut html, "alignments", "Alignment statistics")?;
    flagstat_table(&mut html, &report.flagstat)?;
    histogram_grid(&mut html, &report.accuracy_plots)?;
    writeln!(html, "<p>Yellow: mean; Purple: median.</p>")?;

    section_header(&mut html, "coverage", "Coverage")?;
    writeln!(html, "<div class=\"grid\">")?;
    for plot in &report.depth_plots {
        svg_depth_lines(&mut html, plot)?;
    }
    writeln!(html, "</div>")?;

    section_header(&mut html, "versions", "Software versions")?;
    key_value_table(&mut html, ["Name", "Version"], &report.meta.versions)?;

    section_header(&mut html, "params", "Workflow parameters")?;
    key_value_table(&mut html, ["Key", "Value"], &report.meta.params)?;

    writeln!(html, "</main>")?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;
    Ok(html)
}

/// Render and write the report to `path`
pub fn write_report(path: &Path, report: &QcReport) -> Result<()> {
    let html = render_report(report)?;
    std::fs::write(path, html).with_context(|| format!("writing report to {:?}", path))?;
    Ok(())
}

fn section_header(out: &mut String, id: &str, title: &str) -> Result<()> {
    writeln!(out, "<h2 id=\"{}\">{}</h2>", id, title)?;
    Ok(())
}

fn at_a_glance(out: &mut String, report: &QcReport) -> Result<()> {
    section_header(out, "description", "At a glance")?;
    writeln!(
        out,
        "<p>This report contains visualisations of alignment statistics for paired \
         tumor/normal samples that can help in understanding the results from the \
         {}. Each section contains different plots or tables, broken down by sample. \
         You can quickly jump to an individual section with the links in the header bar.</p>",
        escape_html(&report.workflow)
    )?;
    writeln!(out, "<h3>{}</h3>", escape_html(&report.meta.sample_id))?;
    writeln!(out, "<div class=\"tiles\">")?;
    let [tumor, normal] = report.samples();
    for metrics in [tumor, normal] {
        tile(
            out,
            &fmt_int(metrics.total_reads as u64),
            &format!("{} Total Reads", metrics.sample_type),
        )?;
    }
    for metrics in [tumor, normal] {
        let n50 = metrics
            .n50
            .map(|n| format!("{} bp", fmt_int(n)))
            .unwrap_or_else(|| "n/a".to_string());
        tile(out, &n50, &format!("{} Read N50", metrics.sample_type))?;
    }
    for metrics in [tumor, normal] {
        let range = metrics
            .coverage_range
            .map(|(lo, hi)| format!("{}-{}x", fmt_float(lo), fmt_float(hi)))
            .unwrap_or_else(|| "n/a".to_string());
        tile(
            out,
            &range,
            &format!("{} chromosomal coverage range", metrics.sample_type),
        )?;
    }
    writeln!(out, "</div>")?;
    Ok(())
}

fn tile(out: &mut String, value: &str, label: &str) -> Result<()> {
    writeln!(
        out,
        "<div class=\"tile\"><div class=\"value\">{}</div><div class=\"label\">{}</div></div>",
        escape_html(value),
        escape_html(label)
    )?;
    Ok(())
}

fn coverage_threshold(out: &mut String, report: &QcReport) -> Result<()> {
    section_header(out, "filter", "Coverage threshold")?;
    writeln!(
        out,
        "<p>The aligned bam files have been tested for coverage thresholds of {}x for the \
         tumor and {}x for the normal sequences.</p>",
        fmt_float(report.tumor_cov_threshold),
        fmt_float(report.normal_cov_threshold)
    )?;

    let headers = [
        "Sample", "Type", "chrom", "length", "bases", "mean", "min", "max", "threshold",
    ];
    let rows: Vec<Vec<String>> = report
        .samples()
        .iter()
        .map(|metrics| {
            let mut row = vec![report.meta.sample_id.clone(), metrics.sample_type.to_string()];
            match &metrics.total {
                Some(total) => row.extend([
                    total.chrom.clone(),
                    total.length.to_string(),
                    total.bases.to_string(),
                    fmt_float(total.mean),
                    fmt_float(total.min),
                    fmt_float(total.max),
                ]),
                None => row.extend(std::iter::repeat("n/a".to_string()).take(6)),
            }
            row.push(metrics.threshold_label().to_string());
            row
        })
        .collect();
    write_table(out, &headers, &rows)
}

fn base_statistics(out: &mut String, report: &QcReport) -> Result<()> {
    section_header(out, "stats", "Base statistics")?;
    let headers = [
        "Sample",
        "Type",
        "Total Reads",
        "Median Read Length",
        "Read N50",
        "Min chrom. coverage",
        "Max chrom. coverage",
    ];
    let na = || "n/a".to_string();
    let rows: Vec<Vec<String>> = report
        .samples()
        .iter()
        .map(|m: &&SampleMetrics| {
            vec![
                report.meta.sample_id.clone(),
                m.sample_type.to_string(),
                m.total_reads.to_string(),
                m.median_read_length
                    .map(|v| (v.trunc() as u64).to_string())
                    .unwrap_or_else(na),
                m.n50.map(|v| v.to_string()).unwrap_or_else(na),
                m.coverage_range.map(|(lo, _)| fmt_float(lo)).unwrap_or_else(na),
                m.coverage_range.map(|(_, hi)| fmt_float(hi)).unwrap_or_else(na),
            ]
        })
        .collect();
    write_table(out, &headers, &rows)
}

fn flagstat_table(out: &mut String, tables: &[(SampleType, FlagstatTable)]) -> Result<()> {
    // Union of the count columns in order of first appearance
    let mut columns: Vec<&str> = Vec::new();
    for (_, table) in tables {
        for column in &table.count_columns {
            if !columns.contains(&column.as_str()) {
                columns.push(column);
            }
        }
    }

    let mut headers = vec!["Type", "sample_name", "Status"];
    headers.extend(columns.iter().copied());

    let mut rows = Vec::new();
    for (sample_type, table) in tables {
        for row in &table.rows {
            let mut cells = vec![
                sample_type.to_string(),
                row.sample_name.clone(),
                row.status.to_string(),
            ];
            for column in &columns {
                let value = table
                    .count_columns
                    .iter()
                    .position(|c| c == column)
                    .and_then(|i| row.counts.get(i))
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                cells.push(value);
            }
            rows.push(cells);
        }
    }
    write_table(out, &headers, &rows)
}

fn key_value_table(
    out: &mut String,
    headers: [&str; 2],
    pairs: &[(String, String)],
) -> Result<()> {
    if pairs.is_empty() {
        writeln!(out, "<p>Not provided.</p>")?;
        return Ok(());
    }
    let rows: Vec<Vec<String>> = pairs
        .iter()
        .map(|(k, v)| vec![k.clone(), v.clone()])
        .collect();
    write_table(out, &headers, &rows)
}

fn write_table(out: &mut String, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    writeln!(out, "<table class=\"table\">")?;
    write!(out, "<tr>")?;
    for header in headers {
        write!(out, "<th>{}</th>", escape_html(header))?;
    }
    writeln!(out, "</tr>")?;
    for row in rows {
        write!(out, "<tr>")?;
        for cell in row {
            let class = match cell.as_str() {
                "PASS" => " class=\"pass\"",
                "FAIL" => " class=\"fail\"",
                _ => "",
            };
            write!(out, "<td{}>{}</td>", class, escape_html(cell))?;
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</table>")?;
    Ok(())
}

fn histogram_grid(out: &mut String, plots: &[HistogramPlot]) -> Result<()> {
    writeln!(out, "<div class=\"grid\">")?;
    for plot in plots {
        svg_histogram(out, plot)?;
    }
    writeln!(out, "</div>")?;
    Ok(())
}

fn svg_histogram(out: &mut String, plot: &HistogramPlot) -> Result<()> {
    let plot_w = PLOT_W - LEFT - RIGHT;
    let plot_h = PLOT_H - TOP - BOTTOM;

    let mut subtitle = String::new();
    if let Some(mean) = plot.mean {
        write!(subtitle, "Mean: {}. ", fmt_float(round_to(mean, plot.rounding)))?;
    }
    if let Some(median) = plot.median {
        write!(subtitle, "Median: {}. ", fmt_float(round_to(median, plot.rounding)))?;
    }
    if let Some(n50) = plot.n50 {
        write!(subtitle, "N50: {}. ", n50)?;
    }

    writeln!(out, "<div class=\"plot\">")?;
    writeln!(
        out,
        "<div><b>{}</b><br/><small>{}</small></div>",
        escape_html(&plot.title),
        subtitle.trim_end()
    )?;
    writeln!(
        out,
        "<svg width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
        PLOT_W, PLOT_H, PLOT_W, PLOT_H
    )?;
    writeln!(
        out,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#fff\" stroke=\"#ddd\"/>",
        LEFT, TOP, plot_w, plot_h
    )?;

    let x_min = plot.histogram.edges.first().copied().unwrap_or(0.0);
    let last_edge = plot.histogram.edges.last().copied().unwrap_or(1.0);
    let x_max = plot.max_x.unwrap_or(last_edge).max(x_min + f64::EPSILON);
    let y_max = if plot.max_y > 0.0 {
        plot.max_y
    } else {
        (plot.histogram.max_count() as f64).max(1.0)
    };

    let sx = |x: f64| LEFT + ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0) * plot_w;
    let sy = |y: f64| TOP + plot_h - (y / y_max).clamp(0.0, 1.0) * plot_h;

    draw_y_ticks(out, plot_w, plot_h, 0.0, y_max, 4)?;
    draw_x_ticks(out, plot_w, plot_h, x_min, x_max, 5)?;
    draw_axis_labels(out, plot_w, plot_h, &plot.x_label, &plot.y_label)?;

    for (left, right, count) in plot.histogram.bins() {
        let x0 = sx(left);
        let y0 = sy(count as f64);
        writeln!(
            out,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
            x0,
            y0,
            (sx(right) - x0).max(0.5),
            TOP + plot_h - y0,
            plot.color
        )?;
    }

    let markers = [
        (plot.mean, MEAN_COLOR),
        (plot.median, MEDIAN_COLOR),
        (plot.n50.map(|n| n as f64), N50_COLOR),
    ];
    for (value, color) in markers {
        if let Some(value) = value {
            let x = sx(value);
            writeln!(
                out,
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"2\"/>",
                x,
                TOP,
                x,
                TOP + plot_h,
                color
            )?;
        }
    }

    writeln!(out, "</svg></div>")?;
    Ok(())
}

fn svg_depth_lines(out: &mut String, plot: &DepthPlot) -> Result<()> {
    let plot_w = PLOT_W - LEFT - RIGHT;
    let plot_h = PLOT_H - TOP - BOTTOM;

    writeln!(out, "<div class=\"plot\">")?;
    writeln!(out, "<div><b>{}</b></div>", escape_html(&plot.title))?;
    writeln!(
        out,
        "<svg width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
        PLOT_W, PLOT_H, PLOT_W, PLOT_H
    )?;
    writeln!(
        out,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#fff\" stroke=\"#ddd\"/>",
        LEFT, TOP, plot_w, plot_h
    )?;

    let xs: Vec<f64> = plot.points.iter().map(|p| p.total_mean_pos).collect();
    let (x_min, x_max) = crate::stats::min_max(&xs).unwrap_or((0.0, 1.0));
    let x_max = x_max.max(x_min + 1.0);
    let y_max = if plot.max_y > 0.0 { plot.max_y } else { 1.0 };

    draw_y_ticks(out, plot_w, plot_h, 0.0, y_max, 4)?;
    draw_x_ticks(out, plot_w, plot_h, x_min, x_max, 5)?;
    draw_axis_labels(
        out,
        plot_w,
        plot_h,
        "Position along reference",
        "Sequencing depth",
    )?;

    // One line per chromosome, in order of first appearance
    let mut chroms: Vec<&str> = Vec::new();
    for point in &plot.points {
        if !chroms.contains(&point.chrom.as_str()) {
            chroms.push(&point.chrom);
        }
    }
    for (i, chrom) in chroms.iter().enumerate() {
        let coords: Vec<String> = plot
            .points
            .iter()
            .filter(|p| p.chrom == *chrom)
            .map(|p| {
                let x = LEFT + (p.total_mean_pos - x_min) / (x_max - x_min) * plot_w;
                let y = TOP + plot_h - (p.depth / y_max).clamp(0.0, 1.0) * plot_h;
                format!("{:.2},{:.2}", x, y)
            })
            .collect();
        writeln!(
            out,
            "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" points=\"{}\"><title>{}</title></polyline>",
            SERIES_COLORS[i % SERIES_COLORS.len()],
            coords.join(" "),
            escape_html(chrom)
        )?;
    }

    writeln!(out, "</svg></div>")?;
    Ok(())
}

fn draw_y_ticks(
    out: &mut String,
    plot_w: f64,
    plot_h: f64,
    min: f64,
    max: f64,
    n: usize,
) -> Result<()> {
    for i in 0..=n {
        let frac = i as f64 / n as f64;
        let y = TOP + plot_h - frac * plot_h;
        let v = min + frac * (max - min);
        writeln!(
            out,
            "<line x1=\"{}\" y1=\"{:.2}\" x2=\"{}\" y2=\"{:.2}\" stroke=\"#eee\"/>",
            LEFT,
            y,
            LEFT + plot_w,
            y
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{:.2}\" font-size=\"10\" fill=\"#555\" text-anchor=\"end\">{}</text>",
            LEFT - 4.0,
            y + 3.0,
            fmt_tick(v)
        )?;
    }
    Ok(())
}

fn draw_x_ticks(
    out: &mut String,
    plot_w: f64,
    plot_h: f64,
    min: f64,
    max: f64,
    n: usize,
) -> Result<()> {
    for i in 0..=n {
        let frac = i as f64 / n as f64;
        let x = LEFT + frac * plot_w;
        let v = min + frac * (max - min);
        writeln!(
            out,
            "<text x=\"{:.2}\" y=\"{}\" font-size=\"10\" fill=\"#555\" text-anchor=\"middle\">{}</text>",
            x,
            TOP + plot_h + 14.0,
            fmt_tick(v)
        )?;
    }
    Ok(())
}

fn draw_axis_labels(
    out: &mut String,
    plot_w: f64,
    plot_h: f64,
    x_label: &str,
    y_label: &str,
) -> Result<()> {
    let x = LEFT + plot_w / 2.0;
    let y = TOP + plot_h + 32.0;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#444\" text-anchor=\"middle\">{}</text>",
        x,
        y,
        escape_html(x_label)
    )?;
    let yx = LEFT - 44.0;
    let yy = TOP + plot_h / 2.0;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#444\" text-anchor=\"middle\" transform=\"rotate(-90 {} {})\">{}</text>",
        yx,
        yy,
        yx,
        yy,
        escape_html(y_label)
    )?;
    Ok(())
}

fn round_to(v: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (v * scale).round() / scale
}

/// Shortest round-trip form, keeping one decimal on whole numbers
fn fmt_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

fn fmt_tick(v: f64) -> String {
    if v.abs() >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if (v - v.round()).abs() < 0.001 {
        format!("{}", v.round() as i64)
    } else if v.abs() < 10.0 {
        format!("{:.2}", v)
    } else {
        format!("{:.1}", v)
    }
}

fn fmt_int(v: u64) -> String {
    let s = v.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    let len = s.len();
    for (i, ch) in s.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{
        CoverageSummaryRow, DepthWindow, FlagstatRow, MappingStatus, MosdepthSummary, ReadStat,
    };
    use crate::report::{build_report, ReportMeta, SampleInputs};
    use crate::ReportConfig;

    fn inputs(total_mean: f64) -> SampleInputs {
        SampleInputs {
            read_stats: vec![
                ReadStat {
                    read_length: 12000,
                    mean_quality: 14.0,
                    acc: 98.2,
                },
                ReadStat {
                    read_length: 3000,
                    mean_quality: 11.5,
                    acc: 96.0,
                },
            ],
            flagstat: FlagstatTable {
                count_columns: vec!["total".to_string(), "primary".to_string()],
                rows: vec![FlagstatRow {
                    sample_name: "S<1>".to_string(),
                    status: MappingStatus::Mapped,
                    counts: vec![2, 2],
                }],
            },
            summary: MosdepthSummary {
                chromosomes: vec![CoverageSummaryRow {
                    chrom: "total".to_string(),
                    length: 1000,
                    bases: 30000,
                    mean: total_mean,
                    min: 0.0,
                    max: 60.0,
                }],
                regions: Vec::new(),
            },
            depth: vec![DepthWindow {
                chrom: "chr1".to_string(),
                start: 0,
                stop: 1000,
                depth: total_mean,
            }],
        }
    }

    fn report() -> QcReport {
        let meta = ReportMeta {
            sample_id: "S1".to_string(),
            revision: "v1.0.0".to_string(),
            commit: "abc123".to_string(),
            versions: vec![("samtools".to_string(), "1.19".to_string())],
            params: Vec::new(),
        };
        build_report(meta, &ReportConfig::default(), &inputs(35.0), &inputs(10.0))
    }

    #[test]
    fn test_render_report_sections() {
        let html = render_report(&report()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>S1 | Read alignment statistics</title>"));
        for (id, title) in SECTIONS {
            assert!(html.contains(&format!("<h2 id=\"{}\">{}</h2>", id, title)));
        }
        assert!(html.contains("Tumor Read N50"));
        assert!(html.contains("12,000 bp"));
        assert!(html.contains("N50: 12000."));
        assert!(html.contains("<td class=\"pass\">PASS</td>"));
        assert!(html.contains("<td class=\"fail\">FAIL</td>"));
        assert!(html.contains("<td>samtools</td><td>1.19</td>"));
        assert!(html.contains("Not provided."));
        assert!(html.contains("<polyline"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_render_escapes_text() {
        let html = render_report(&report()).unwrap();
        assert!(html.contains("S&lt;1&gt;"));
        assert!(!html.contains("S<1>"));
    }

    #[test]
    fn test_render_empty_samples() {
        let report = build_report(
            ReportMeta::default(),
            &ReportConfig::default(),
            &SampleInputs::default(),
            &SampleInputs::default(),
        );
        let html = render_report(&report).unwrap();
        assert!(html.contains("n/a"));
        assert!(!html.contains("NaN"));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("S1-report.html");
        write_report(&path, &report()).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Coverage threshold"));
    }

    #[test]
    fn test_formatting() {
        assert_eq!(fmt_int(1234567), "1,234,567");
        assert_eq!(fmt_int(999), "999");
        assert_eq!(fmt_float(30.0), "30.0");
        assert_eq!(fmt_float(30.25), "30.25");
        assert_eq!(round_to(97.16, 1), 97.2);
        assert_eq!(fmt_tick(2_500_000.0), "2.5M");
        assert_eq!(escape_html("a&b"), "a&amp;b");
    }
}
