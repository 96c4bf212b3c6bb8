use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{Category, ChurnDataset};

// ---------------------------------------------------------------------------
// Filter predicate: which values of one column are allowed
// ---------------------------------------------------------------------------

/// Allowed values for a single categorical column.
/// An empty selection means "no filter" (show everything).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryFilter {
    pub column: Category,
    pub allowed: BTreeSet<String>,
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self::contract(std::iter::empty::<String>())
    }
}

impl CategoryFilter {
    /// The dashboard's global filter: allowed Contract values.
    pub fn contract<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CategoryFilter {
            column: Category::Contract,
            allowed: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the filter lets every row through.
    pub fn is_inactive(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.allowed.contains(value)
    }

    /// Add `value` if absent, remove it otherwise.
    pub fn toggle(&mut self, value: &str) {
        if !self.allowed.remove(value) {
            self.allowed.insert(value.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.allowed.clear();
    }
}

/// Return indices of customers that pass the filter, in dataset order.
///
/// An inactive filter returns every index.  Allowed values that never occur
/// in the dataset simply match nothing.
pub fn filtered_indices(dataset: &ChurnDataset, filter: &CategoryFilter) -> Vec<usize> {
    if filter.is_inactive() {
        return (0..dataset.len()).collect();
    }
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, rec)| filter.contains(rec.category(filter.column)))
        .map(|(i, _)| i)
        .collect()
}

/// Filter and borrow in one step.
#[cfg(test)]
pub fn apply<'a>(dataset: &'a ChurnDataset, filter: &CategoryFilter) -> super::model::View<'a> {
    dataset.view(&filtered_indices(dataset, filter))
}
