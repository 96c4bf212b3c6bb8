use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::data::model::{Category, Churn, Measure, View};
use crate::data::stats::{self, BoxStats, GroupCount, HistogramBin};

/// Width of the tenure histogram bins, in months.
pub const TENURE_BIN_MONTHS: f64 = 2.0;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// The five dashboard tabs.  Each is a pure function of the filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Tab {
    #[default]
    ExecutiveOverview,
    Demographics,
    ServicePortfolio,
    BillingContract,
    FinancialDeepDive,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::ExecutiveOverview,
        Tab::Demographics,
        Tab::ServicePortfolio,
        Tab::BillingContract,
        Tab::FinancialDeepDive,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Tab::ExecutiveOverview => "tab-1",
            Tab::Demographics => "tab-2",
            Tab::ServicePortfolio => "tab-3",
            Tab::BillingContract => "tab-4",
            Tab::FinancialDeepDive => "tab-5",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Tab::ExecutiveOverview => "overview",
            Tab::Demographics => "demographics",
            Tab::ServicePortfolio => "services",
            Tab::BillingContract => "billing",
            Tab::FinancialDeepDive => "financial",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::ExecutiveOverview => "Executive Overview",
            Tab::Demographics => "Demographics",
            Tab::ServicePortfolio => "Service Portfolio",
            Tab::BillingContract => "Billing & Contract",
            Tab::FinancialDeepDive => "Financial Deep Dive",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tab {
    type Err = String;

    /// Accepts either the id (`tab-3`) or the slug (`services`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Tab::ALL
            .into_iter()
            .find(|t| t.id() == s || t.slug() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Tab::ALL.iter().map(|t| format!("{}|{}", t.id(), t.slug())).collect();
                format!("unknown tab '{s}' (expected one of {})", known.join(", "))
            })
    }
}

// ---------------------------------------------------------------------------
// Chart descriptors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub churn: Churn,
    pub count: usize,
    pub share: f64,
}

/// Donut of churn outcomes.  `hole` is the inner radius as a fraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub hole: f64,
    /// Largest slice first.
    pub slices: Vec<PieSlice>,
}

/// Churn-stacked histogram over a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub title: String,
    pub x_label: String,
    /// Actual width of every bin; wider than requested for very wide ranges.
    pub bin_width: f64,
    pub bins: Vec<HistogramBin>,
}

/// Side-by-side No/Yes counts per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedBar {
    pub title: String,
    pub x_label: String,
    pub groups: Vec<GroupCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub churn: Churn,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub opacity: f32,
    pub series: Vec<ScatterSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxGroup {
    pub category: String,
    pub churn: Churn,
    pub stats: BoxStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Distinct categories along the x axis, sorted.
    pub categories: Vec<String>,
    pub boxes: Vec<BoxGroup>,
}

/// Everything the shell needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Pie(PieChart),
    Histogram(Histogram),
    GroupedBar(GroupedBar),
    Scatter(Scatter),
    Box(BoxChart),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Pie(c) => &c.title,
            ChartSpec::Histogram(c) => &c.title,
            ChartSpec::GroupedBar(c) => &c.title,
            ChartSpec::Scatter(c) => &c.title,
            ChartSpec::Box(c) => &c.title,
        }
    }
}

// ---------------------------------------------------------------------------
// Tab rendering
// ---------------------------------------------------------------------------

/// Compute the chart set for `tab` over `view`.
pub fn render_tab(tab: Tab, view: &View<'_>) -> Vec<ChartSpec> {
    match tab {
        Tab::ExecutiveOverview => vec![
            churn_pie(view, "Churn Proportion"),
            histogram(view, Measure::Tenure, TENURE_BIN_MONTHS, "Tenure Distribution (Months)"),
        ],
        Tab::Demographics => [
            Category::Gender,
            Category::SeniorCitizen,
            Category::Partner,
            Category::Dependents,
        ]
        .into_iter()
        .map(|col| grouped_bar(view, col, format!("Churn by {col}")))
        .collect(),
        Tab::ServicePortfolio => [
            Category::InternetService,
            Category::OnlineSecurity,
            Category::TechSupport,
            Category::StreamingTV,
        ]
        .into_iter()
        .map(|col| grouped_bar(view, col, format!("Impact of {col}")))
        .collect(),
        Tab::BillingContract => vec![
            grouped_bar(view, Category::Contract, "Churn by Contract Type".to_string()),
            grouped_bar(view, Category::PaymentMethod, "Churn by Payment Method".to_string()),
        ],
        Tab::FinancialDeepDive => vec![
            scatter(view, Measure::Tenure, Measure::TotalCharges, "Tenure vs Total Charges"),
            box_chart(
                view,
                Category::Contract,
                Measure::MonthlyCharges,
                "Monthly Charge Distribution",
            ),
        ],
    }
}

fn churn_pie(view: &View<'_>, title: &str) -> ChartSpec {
    let (no, yes) = stats::churn_counts(view);
    let total = no + yes;
    let mut slices: Vec<PieSlice> = [(Churn::No, no), (Churn::Yes, yes)]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(churn, count)| PieSlice {
            churn,
            count,
            share: stats::percentage(count, total),
        })
        .collect();
    slices.sort_by(|a, b| b.count.cmp(&a.count));
    ChartSpec::Pie(PieChart {
        title: title.to_string(),
        hole: 0.5,
        slices,
    })
}

fn histogram(view: &View<'_>, measure: Measure, width: f64, title: &str) -> ChartSpec {
    let bins = stats::histogram(view, measure, width);
    // very wide ranges come back with widened bins
    let bin_width = bins.first().map_or(width, |b| b.end - b.start);
    ChartSpec::Histogram(Histogram {
        title: title.to_string(),
        x_label: measure.to_string(),
        bin_width,
        bins,
    })
}

fn grouped_bar(view: &View<'_>, column: Category, title: String) -> ChartSpec {
    ChartSpec::GroupedBar(GroupedBar {
        title,
        x_label: column.to_string(),
        groups: stats::group_counts(view, column),
    })
}

fn scatter(view: &View<'_>, x: Measure, y: Measure, title: &str) -> ChartSpec {
    let series = Churn::ALL
        .into_iter()
        .map(|churn| ScatterSeries {
            churn,
            points: view
                .iter()
                .filter(|r| r.churn == churn)
                .filter_map(|r| Some([r.measure(x)?, r.measure(y)?]))
                .collect(),
        })
        .collect();
    ChartSpec::Scatter(Scatter {
        title: title.to_string(),
        x_label: x.to_string(),
        y_label: y.to_string(),
        opacity: 0.5,
        series,
    })
}

fn box_chart(view: &View<'_>, x: Category, y: Measure, title: &str) -> ChartSpec {
    let categories: Vec<String> = stats::group_counts(view, x)
        .into_iter()
        .map(|g| g.category)
        .collect();
    let boxes = categories
        .iter()
        .flat_map(|category| Churn::ALL.into_iter().map(move |churn| (category, churn)))
        .filter_map(|(category, churn)| {
            let values = view
                .iter()
                .filter(|r| r.churn == churn && r.category(x) == category.as_str())
                .filter_map(|r| r.measure(y));
            Some(BoxGroup {
                category: category.clone(),
                churn,
                stats: BoxStats::from_values(values)?,
            })
        })
        .collect();
    ChartSpec::Box(BoxChart {
        title: title.to_string(),
        x_label: x.to_string(),
        y_label: y.to_string(),
        categories,
        boxes,
    })
}
