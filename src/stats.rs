//! Descriptive statistics for the QC report

/// Read N50 of a set of lengths.
///
/// Lengths are sorted longest first; the N50 is the smallest length whose
/// suffix sum (itself plus every shorter length) still exceeds half of the
/// total. Returns `None` when there is nothing to summarise.
pub fn compute_n50(lengths: &[u64]) -> Option<u64> {
    let mut sorted = lengths.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let total: u64 = sorted.iter().sum();
    let half = total as f64 / 2.0;

    // Suffix sums shrink with the index, so the last index above half wins
    let mut suffix = 0u64;
    for length in sorted.iter().rev() {
        suffix += length;
        if suffix as f64 > half {
            return Some(*length);
        }
    }
    None
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Linearly interpolated quantile, `q` in `[0, 1]`
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Minimum and maximum of the finite values
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Equal-width histogram
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bins of width `binwidth` starting at the minimum value and covering
    /// the maximum; the last bin is closed on the right.
    pub fn with_binwidth(values: &[f64], binwidth: f64) -> Self {
        let Some((lo, hi)) = min_max(values) else {
            return Self::empty();
        };
        let span = (hi - lo) / binwidth;
        let nbins = ((span - 1e-9).ceil().max(1.0)) as usize;
        let edges = (0..=nbins).map(|i| lo + i as f64 * binwidth).collect();
        Self::fill(values, lo, binwidth, nbins, edges)
    }

    /// Bin count chosen like NumPy's `auto`: the narrower of the Sturges and
    /// Freedman-Diaconis widths, falling back to Sturges when the IQR is zero.
    pub fn auto(values: &[f64]) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let Some((lo, hi)) = min_max(&finite) else {
            return Self::empty();
        };

        if hi == lo {
            let (first, last) = (lo - 0.5, hi + 0.5);
            return Self::fill(&finite, first, last - first, 1, vec![first, last]);
        }

        let n = finite.len() as f64;
        let range = hi - lo;
        let sturges = range / (n.log2() + 1.0);
        let iqr = quantile(&finite, 0.75).unwrap_or(0.0) - quantile(&finite, 0.25).unwrap_or(0.0);
        let fd = 2.0 * iqr / n.cbrt();
        let width = if fd > 0.0 { fd.min(sturges) } else { sturges };

        let nbins = ((range / width).ceil().max(1.0)) as usize;
        let step = range / nbins as f64;
        let edges = (0..=nbins).map(|i| lo + i as f64 * step).collect();
        Self::fill(&finite, lo, step, nbins, edges)
    }

    fn empty() -> Self {
        Self {
            edges: Vec::new(),
            counts: Vec::new(),
        }
    }

    fn fill(values: &[f64], start: f64, width: f64, nbins: usize, edges: Vec<f64>) -> Self {
        let mut counts = vec![0u64; nbins];
        for v in values.iter().copied().filter(|v| v.is_finite()) {
            let index = (((v - start) / width).floor().max(0.0) as usize).min(nbins - 1);
            counts[index] += 1;
        }
        Self { edges, counts }
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(left edge, right edge, count)` for each bin
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, u64)> + '_ {
        self.edges
            .windows(2)
            .zip(self.counts.iter())
            .map(|(edge, count)| (edge[0], edge[1], *count))
    }
}

/// Tallest bin of a histogram over `values`
pub fn hist_max(values: &[f64], binwidth: Option<f64>) -> u64 {
    match binwidth {
        Some(width) => Histogram::with_binwidth(values, width).max_count(),
        None => Histogram::auto(values).max_count(),
    }
}

/// What a shared axis maximum is computed from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisKind {
    /// Heights of a histogram over the values
    Histogram { binwidth: Option<f64> },
    /// The values themselves
    Value,
}

/// Axis maximum shared by two plots: 10% above the larger of the two, rounded up
pub fn compare_max_axes(first: &[f64], second: &[f64], kind: AxisKind) -> f64 {
    let peak = |values: &[f64]| match kind {
        AxisKind::Histogram { binwidth } => hist_max(values, binwidth) as f64,
        AxisKind::Value => min_max(values).map(|(_, hi)| hi).unwrap_or(0.0),
    };
    (peak(first).max(peak(second)) * 1.1).ceil()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_n50() {
        // Suffix sums of [10, 4, 1] are [15, 5, 1]; only 15 exceeds 7.5
        assert_eq!(compute_n50(&[1, 4, 10]), Some(10));
        assert_eq!(compute_n50(&[100]), Some(100));
        assert_eq!(compute_n50(&[5, 5, 5, 5]), Some(5));
        assert_eq!(compute_n50(&[2, 3, 4, 5, 6, 7, 8, 9, 10]), Some(8));
    }

    #[test]
    fn test_compute_n50_degenerate() {
        assert_eq!(compute_n50(&[]), None);
        assert_eq!(compute_n50(&[0, 0]), None);
    }

    #[test]
    fn test_mean_median() {
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_quantile() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 0.25), Some(2.0));
        assert_eq!(quantile(&values, 1.0), Some(5.0));
    }

    #[test]
    fn test_histogram_with_binwidth() {
        let hist = Histogram::with_binwidth(&[0.0, 0.5, 1.0, 1.2, 3.0], 1.0);
        assert_eq!(hist.edges, vec![0.0, 1.0, 2.0, 3.0]);
        // The maximum lands in the closed last bin
        assert_eq!(hist.counts, vec![2, 2, 1]);
        assert_eq!(hist.max_count(), 2);
        assert_eq!(hist.bins().count(), 3);
    }

    #[test]
    fn test_histogram_single_value() {
        let hist = Histogram::with_binwidth(&[7.0, 7.0, 7.0], 0.5);
        assert_eq!(hist.counts, vec![3]);

        let hist = Histogram::auto(&[7.0, 7.0]);
        assert_eq!(hist.edges, vec![6.5, 7.5]);
        assert_eq!(hist.counts, vec![2]);
    }

    #[test]
    fn test_histogram_auto_counts_everything() {
        let values: Vec<f64> = (0..100).map(|v| v as f64).collect();
        let hist = Histogram::auto(&values);
        assert_eq!(hist.counts.iter().sum::<u64>(), 100);
        assert_eq!(hist.edges.len(), hist.counts.len() + 1);
        assert_eq!(*hist.edges.last().unwrap(), 99.0);
    }

    #[test]
    fn test_histogram_ignores_nan() {
        let hist = Histogram::with_binwidth(&[1.0, f64::NAN, 2.0], 1.0);
        assert_eq!(hist.counts.iter().sum::<u64>(), 2);
        assert_eq!(Histogram::with_binwidth(&[], 1.0).max_count(), 0);
    }

    #[test]
    fn test_compare_max_axes() {
        let tumor = [1000.0, 1500.0, 1800.0, 5000.0];
        let normal = [1000.0, 9000.0];
        let kind = AxisKind::Histogram {
            binwidth: Some(1000.0),
        };
        // Tumor has three reads in its first bin
        assert_eq!(compare_max_axes(&tumor, &normal, kind), 4.0);
        assert_eq!(compare_max_axes(&tumor, &normal, AxisKind::Value), 9900.0);
        assert_eq!(compare_max_axes(&[], &[], AxisKind::Value), 0.0);
    }
}
