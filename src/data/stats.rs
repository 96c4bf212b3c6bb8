//! Aggregations over a [`View`]: KPI scalars, churn-split group counts,
//! histogram bins and box-plot statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use super::model::{Category, Churn, Measure, View};

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// The four headline numbers shown above the tabs.
///
/// Means are `NaN` for an empty view; [`Kpis::tenure_label`] and friends
/// render that as `n/a` and `serde_json` writes it as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub customers: usize,
    /// Percentage in `[0, 100]`; exactly 0 for an empty view.
    pub churn_rate: f64,
    pub avg_tenure: f64,
    pub avg_monthly_charge: f64,
}

impl Default for Kpis {
    fn default() -> Self {
        Kpis {
            customers: 0,
            churn_rate: 0.0,
            avg_tenure: f64::NAN,
            avg_monthly_charge: f64::NAN,
        }
    }
}

impl Kpis {
    pub fn compute(view: &View<'_>) -> Self {
        let customers = view.len();
        let churned = view.iter().filter(|r| r.churn.is_yes()).count();
        Kpis {
            customers,
            churn_rate: percentage(churned, customers),
            avg_tenure: mean(view.iter().map(|r| r.tenure)),
            avg_monthly_charge: mean(view.iter().map(|r| r.monthly_charges)),
        }
    }

    pub fn customers_label(&self) -> String {
        group_thousands(self.customers)
    }

    pub fn churn_label(&self) -> String {
        format!("{:.1}%", self.churn_rate)
    }

    pub fn tenure_label(&self) -> String {
        if self.avg_tenure.is_nan() {
            NOT_AVAILABLE.to_string()
        } else {
            format!("{:.1} mo", self.avg_tenure)
        }
    }

    pub fn bill_label(&self) -> String {
        if self.avg_monthly_charge.is_nan() {
            NOT_AVAILABLE.to_string()
        } else {
            format!("${:.2}", self.avg_monthly_charge)
        }
    }
}

const NOT_AVAILABLE: &str = "n/a";

/// Arithmetic mean; `NaN` for an empty input.
pub fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// `7043` → `"7,043"`.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Churn-split counts
// ---------------------------------------------------------------------------

/// Customers in one category, split by outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub category: String,
    pub no: usize,
    pub yes: usize,
}

impl GroupCount {
    pub fn total(&self) -> usize {
        self.no + self.yes
    }

    pub fn count(&self, churn: Churn) -> usize {
        match churn {
            Churn::No => self.no,
            Churn::Yes => self.yes,
        }
    }

    /// Share of this group that churned, in percent.
    pub fn churn_rate(&self) -> f64 {
        percentage(self.yes, self.total())
    }
}

/// Count customers per value of `column` and churn outcome, sorted by value.
pub fn group_counts(view: &View<'_>, column: Category) -> Vec<GroupCount> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for rec in view.iter() {
        let slot = groups.entry(rec.category(column)).or_default();
        match rec.churn {
            Churn::No => slot.0 += 1,
            Churn::Yes => slot.1 += 1,
        }
    }
    groups
        .into_iter()
        .map(|(category, (no, yes))| GroupCount {
            category: category.to_string(),
            no,
            yes,
        })
        .collect()
}

/// Overall No/Yes counts of a view.
pub fn churn_counts(view: &View<'_>) -> (usize, usize) {
    let yes = view.iter().filter(|r| r.churn.is_yes()).count();
    (view.len() - yes, yes)
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// One bin `[start, end)` of a churn-split histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub no: usize,
    pub yes: usize,
}

impl HistogramBin {
    pub fn count(&self, churn: Churn) -> usize {
        match churn {
            Churn::No => self.no,
            Churn::Yes => self.yes,
        }
    }
}

/// Upper bound on the number of histogram bins.
pub const MAX_HISTOGRAM_BINS: usize = 500;

/// Bin `measure` into fixed-width bins aligned to multiples of `width`.
///
/// Records with a missing value are skipped.  Empty bins between the first
/// and last populated ones are kept so the axis stays contiguous.  When the
/// data spans more than [`MAX_HISTOGRAM_BINS`] bins, the width is widened to
/// a whole multiple of `width` so the range fits.
pub fn histogram(view: &View<'_>, measure: Measure, width: f64) -> Vec<HistogramBin> {
    debug_assert!(width > 0.0);
    let values: Vec<(f64, Churn)> = view
        .iter()
        .filter_map(|r| Some((r.measure(measure)?, r.churn)))
        .filter(|(v, _)| v.is_finite())
        .collect();
    if values.is_empty() {
        return Vec::new();
    }

    let lo = values.iter().map(|(v, _)| *v).fold(f64::INFINITY, f64::min);
    let hi = values.iter().map(|(v, _)| *v).fold(f64::NEG_INFINITY, f64::max);

    let span = (hi / width).floor() - (lo / width).floor() + 1.0;
    let step = if span > MAX_HISTOGRAM_BINS as f64 {
        width * ((span + 1.0) / (MAX_HISTOGRAM_BINS - 2) as f64).ceil()
    } else {
        width
    };
    if !step.is_finite() || step <= 0.0 {
        return vec![single_bin(lo, hi, &values)];
    }

    let first = (lo / step).floor();
    let n_bins = (((hi / step).floor() - first) as usize)
        .saturating_add(1)
        .min(MAX_HISTOGRAM_BINS);

    let mut bins: Vec<HistogramBin> = (0..n_bins)
        .map(|b| HistogramBin {
            start: (first + b as f64) * step,
            end: (first + b as f64 + 1.0) * step,
            no: 0,
            yes: 0,
        })
        .collect();
    for (v, churn) in values {
        // float -> usize casts saturate, so the index is always in range
        let idx = (((v / step).floor() - first).max(0.0) as usize).min(n_bins - 1);
        let bin = &mut bins[idx];
        match churn {
            Churn::No => bin.no += 1,
            Churn::Yes => bin.yes += 1,
        }
    }
    bins
}

/// Fallback for ranges too wide to split into finite bins.
fn single_bin(lo: f64, hi: f64, values: &[(f64, Churn)]) -> HistogramBin {
    let yes = values.iter().filter(|(_, c)| c.is_yes()).count();
    HistogramBin {
        start: lo,
        end: hi,
        no: values.len() - yes,
        yes,
    }
}

// ---------------------------------------------------------------------------
// Box statistics
// ---------------------------------------------------------------------------

/// Five-number summary plus outliers, Tukey style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub count: usize,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub mean: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// `None` when there are no finite values.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside = sorted.iter().copied().filter(|v| (lo_fence..=hi_fence).contains(v));
        let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
        let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| !(lo_fence..=hi_fence).contains(v))
            .collect();

        Some(BoxStats {
            count: sorted.len(),
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            mean: mean(sorted.iter().copied()),
            outliers,
        })
    }
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::customer;
    use crate::data::model::ChurnDataset;

    fn sample() -> ChurnDataset {
        ChurnDataset::from_records(vec![
            customer("Month-to-month", 1.0, 70.0, Churn::Yes),
            customer("Month-to-month", 3.0, 90.0, Churn::Yes),
            customer("Month-to-month", 10.0, 50.0, Churn::No),
            customer("Two year", 60.0, 20.0, Churn::No),
        ])
    }

    #[test]
    fn kpis_over_a_view() {
        let ds = sample();
        let kpis = Kpis::compute(&View::all(ds.records()));
        assert_eq!(kpis.customers, 4);
        assert_eq!(kpis.churn_rate, 50.0);
        assert_eq!(kpis.avg_tenure, 18.5);
        assert_eq!(kpis.avg_monthly_charge, 57.5);
        assert_eq!(kpis.churn_label(), "50.0%");
        assert_eq!(kpis.tenure_label(), "18.5 mo");
        assert_eq!(kpis.bill_label(), "$57.50");
    }

    #[test]
    fn empty_view_has_zero_churn_and_nan_means() {
        let kpis = Kpis::compute(&View::default());
        assert_eq!(kpis.customers, 0);
        assert_eq!(kpis.churn_rate, 0.0);
        assert!(kpis.avg_tenure.is_nan());
        assert!(kpis.avg_monthly_charge.is_nan());
        assert_eq!(kpis.customers_label(), "0");
        assert_eq!(kpis.tenure_label(), "n/a");
        assert_eq!(kpis.bill_label(), "n/a");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(7043), "7,043");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn group_counts_are_sorted_and_split() {
        let ds = sample();
        let groups = group_counts(&View::all(ds.records()), Category::Contract);
        assert_eq!(
            groups,
            vec![
                GroupCount { category: "Month-to-month".into(), no: 1, yes: 2 },
                GroupCount { category: "Two year".into(), no: 1, yes: 0 },
            ]
        );
        assert!((groups[0].churn_rate() - 66.666).abs() < 0.01);
    }

    #[test]
    fn histogram_bins_are_contiguous() {
        let ds = sample();
        let bins = histogram(&View::all(ds.records()), Measure::Tenure, 2.0);
        assert_eq!(bins.first().map(|b| b.start), Some(0.0));
        assert_eq!(bins.last().map(|b| b.end), Some(62.0));
        assert_eq!(bins.len(), 31);
        // tenure 1.0 lands in [0, 2), tenure 3.0 in [2, 4)
        assert_eq!((bins[0].no, bins[0].yes), (0, 1));
        assert_eq!((bins[1].no, bins[1].yes), (0, 1));
        let total: usize = bins.iter().map(|b| b.no + b.yes).sum();
        assert_eq!(total, 4);
    }

    fn tenures(values: &[f64]) -> ChurnDataset {
        ChurnDataset::from_records(
            values
                .iter()
                .enumerate()
                .map(|(i, &t)| {
                    let churn = if i % 2 == 0 { Churn::No } else { Churn::Yes };
                    customer("Month-to-month", t, 50.0, churn)
                })
                .collect(),
        )
    }

    fn assert_covers(bins: &[HistogramBin], values: &[f64]) {
        assert!(!bins.is_empty() && bins.len() <= MAX_HISTOGRAM_BINS);
        for pair in bins.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        let total: usize = bins.iter().map(|b| b.no + b.yes).sum();
        assert_eq!(total, values.len());
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        // within float precision of the extreme values
        assert!(bins[0].start <= lo + lo.abs() * 1e-9);
        assert!(bins[bins.len() - 1].end >= hi - hi.abs() * 1e-9);
    }

    #[test]
    fn extreme_tenure_widens_bins_instead_of_exploding() {
        for values in [
            vec![1.0, 1e300],
            vec![0.0, 2.0e7],
            vec![-3e307, 1e308],
            vec![3.0, 5.0, 7.0, 1.0e6],
        ] {
            let ds = tenures(&values);
            let bins = histogram(&View::all(ds.records()), Measure::Tenure, 2.0);
            assert_covers(&bins, &values);
        }
    }

    #[test]
    fn widened_bins_are_multiples_of_the_base_width() {
        let ds = tenures(&[0.0, 2.0e4]);
        let bins = histogram(&View::all(ds.records()), Measure::Tenure, 2.0);
        let width = bins[0].end - bins[0].start;
        assert!(width > 2.0);
        assert_eq!(width % 2.0, 0.0);
        assert_eq!((bins[0].no, bins[bins.len() - 1].yes), (1, 1));
    }

    #[test]
    fn histogram_of_empty_view_is_empty() {
        assert!(histogram(&View::default(), Measure::Tenure, 2.0).is_empty());
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), 1.0);
        assert_eq!(quantile(&v, 0.5), 2.5);
        assert_eq!(quantile(&v, 0.25), 1.75);
        assert_eq!(quantile(&v, 1.0), 4.0);
    }

    #[test]
    fn box_stats_flag_outliers() {
        let stats = BoxStats::from_values([10.0, 11.0, 12.0, 13.0, 14.0, 100.0]).unwrap();
        assert_eq!(stats.count, 6);
        assert_eq!(stats.median, 12.5);
        assert_eq!(stats.outliers, vec![100.0]);
        assert_eq!(stats.lower_whisker, 10.0);
        assert_eq!(stats.upper_whisker, 14.0);
    }

    #[test]
    fn box_stats_of_nothing() {
        assert!(BoxStats::from_values(std::iter::empty()).is_none());
        assert!(BoxStats::from_values([f64::NAN]).is_none());
    }
}
