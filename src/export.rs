use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::charts::{ChartSpec, Tab};
use crate::data::model::Category;
use crate::data::stats::Kpis;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// JSON snapshot of the current dashboard
// ---------------------------------------------------------------------------

/// KPI value together with the label the dashboard shows for it.
#[derive(Debug, Serialize)]
pub struct KpiReport {
    #[serde(flatten)]
    pub values: Kpis,
    pub labels: KpiLabels,
}

#[derive(Debug, Serialize)]
pub struct KpiLabels {
    pub customers: String,
    pub churn_rate: String,
    pub avg_tenure: String,
    pub avg_bill: String,
}

impl From<Kpis> for KpiReport {
    fn from(kpis: Kpis) -> Self {
        KpiReport {
            labels: KpiLabels {
                customers: kpis.customers_label(),
                churn_rate: kpis.churn_label(),
                avg_tenure: kpis.tenure_label(),
                avg_bill: kpis.bill_label(),
            },
            values: kpis,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FilterReport<'a> {
    pub column: Category,
    /// Empty means unfiltered.
    pub allowed: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct TabReport<'a> {
    pub id: &'static str,
    pub label: &'static str,
    pub charts: &'a [ChartSpec],
}

/// Everything visible on screen, in machine-readable form.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub dataset: KpiReport,
    pub filter: FilterReport<'a>,
    pub kpis: KpiReport,
    pub tab: TabReport<'a>,
}

impl<'a> Snapshot<'a> {
    /// `None` until a dataset is loaded.
    pub fn capture(state: &'a AppState) -> Option<Self> {
        let dataset = state.dataset.as_ref()?;
        let tab: Tab = state.active_tab;
        Some(Snapshot {
            dataset: (*dataset.summary()).into(),
            filter: FilterReport {
                column: state.filter.column,
                allowed: state.filter.allowed.iter().map(String::as_str).collect(),
            },
            kpis: state.kpis.into(),
            tab: TabReport {
                id: tab.id(),
                label: tab.label(),
                charts: &state.charts,
            },
        })
    }

    pub fn write_to(&self, writer: impl Write) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).context("serialising dashboard snapshot")
    }
}

/// Write the current dashboard to `path` as pretty JSON.
pub fn export_to_file(state: &AppState, path: &Path) -> Result<()> {
    let snapshot = Snapshot::capture(state).context("no dataset loaded")?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    snapshot.write_to(&mut writer)?;
    writer
        .flush()
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("exported {} view to {}", state.active_tab.id(), path.display());
    Ok(())
}
