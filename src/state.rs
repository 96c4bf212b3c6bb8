use crate::charts::{self, ChartSpec, Tab};
use crate::data::filter::{filtered_indices, CategoryFilter};
use crate::data::model::ChurnDataset;
use crate::data::stats::Kpis;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// KPIs and chart specs are cached and only rebuilt when the filter, the
/// tab or the dataset changes.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<ChurnDataset>,

    /// Global Contract filter.
    pub filter: CategoryFilter,

    /// Active tab.
    pub active_tab: Tab,

    /// Indices of customers passing the current filter (cached).
    pub visible_indices: Vec<usize>,

    /// KPIs of the visible customers (cached).
    pub kpis: Kpis,

    /// Charts of the active tab over the visible customers (cached).
    pub charts: Vec<ChartSpec>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Start on `tab` with `filter` already applied once a dataset arrives.
    pub fn new(tab: Tab, filter: CategoryFilter) -> Self {
        Self {
            active_tab: tab,
            filter,
            ..Self::default()
        }
    }

    /// Ingest a newly loaded dataset and recompute everything.
    ///
    /// Filter values the new dataset doesn't contain are kept; they simply
    /// match nothing.
    pub fn set_dataset(&mut self, dataset: ChurnDataset) {
        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    /// Filter → aggregate → render for the current tab.
    pub fn recompute(&mut self) {
        let Some(ds) = &self.dataset else {
            self.visible_indices.clear();
            self.kpis = Kpis::default();
            self.charts.clear();
            return;
        };
        self.visible_indices = filtered_indices(ds, &self.filter);
        let view = ds.view(&self.visible_indices);
        self.kpis = Kpis::compute(&view);
        self.charts = charts::render_tab(self.active_tab, &view);
        log::debug!(
            "recomputed {} ({} of {} customers, {} charts)",
            self.active_tab.id(),
            view.len(),
            ds.len(),
            self.charts.len()
        );
    }

    /// Switch tab; a no-op when `tab` is already active.
    pub fn set_tab(&mut self, tab: Tab) {
        if self.active_tab != tab {
            self.active_tab = tab;
            self.recompute();
        }
    }

    /// Toggle a single Contract value in the filter.
    pub fn toggle_filter_value(&mut self, value: &str) {
        self.filter.toggle(value);
        self.recompute();
    }

    /// Drop every selected value (show all customers).
    pub fn clear_filter(&mut self) {
        if !self.filter.is_inactive() {
            self.filter.clear();
            self.recompute();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::customer;
    use crate::data::model::Churn;

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(ChurnDataset::from_records(vec![
            customer("Month-to-month", 2.0, 80.0, Churn::Yes),
            customer("One year", 30.0, 55.0, Churn::No),
            customer("Two year", 60.0, 25.0, Churn::No),
        ]));
        state
    }

    #[test]
    fn no_dataset_means_nothing_to_draw() {
        let mut state = AppState::default();
        state.recompute();
        assert!(state.charts.is_empty());
        assert_eq!(state.kpis.customers, 0);
    }

    #[test]
    fn loading_computes_the_default_tab() {
        let state = loaded();
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert_eq!(state.kpis.customers, 3);
        assert_eq!(state.charts.len(), 2);
    }

    #[test]
    fn toggling_the_filter_updates_kpis() {
        let mut state = loaded();
        state.toggle_filter_value("Month-to-month");
        assert_eq!(state.kpis.customers, 1);
        assert_eq!(state.kpis.churn_rate, 100.0);

        state.toggle_filter_value("One year");
        assert_eq!(state.visible_indices, vec![0, 1]);

        state.clear_filter();
        assert_eq!(state.kpis.customers, 3);
    }

    #[test]
    fn switching_tabs_replaces_charts() {
        let mut state = loaded();
        state.set_tab(Tab::Demographics);
        assert_eq!(state.charts.len(), 4);
        state.set_tab(Tab::FinancialDeepDive);
        assert_eq!(state.charts[0].title(), "Tenure vs Total Charges");
    }

    #[test]
    fn filter_matching_nothing_keeps_kpis_displayable() {
        let mut state = AppState::new(Tab::ExecutiveOverview, CategoryFilter::contract(["Three year"]));
        state.set_dataset(loaded().dataset.unwrap());
        assert_eq!(state.kpis.customers, 0);
        assert_eq!(state.kpis.churn_label(), "0.0%");
        assert_eq!(state.kpis.tenure_label(), "n/a");
    }
}
