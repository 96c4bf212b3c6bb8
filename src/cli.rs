//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::charts::Tab;
use crate::data::filter::CategoryFilter;

/// Telecom customer churn dashboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Customer table to load at startup (.csv, .parquet or .json)
    #[arg(short, long, default_value = "TelecomCustomerChurn.csv")]
    pub data: PathBuf,

    /// Tab to open: tab-1..tab-5, or overview, demographics, services,
    /// billing, financial
    #[arg(short, long, default_value = "tab-1")]
    pub tab: Tab,

    /// Only include this contract type (repeatable)
    #[arg(short, long = "contract", value_name = "CONTRACT")]
    pub contracts: Vec<String>,

    /// Write the dashboard as JSON to this path and exit without a window
    #[arg(short, long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The initial global filter.
    pub fn filter(&self) -> CategoryFilter {
        CategoryFilter::contract(self.contracts.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_dashboard() {
        let args = Args::try_parse_from(["churn-insights"]).unwrap();
        assert_eq!(args.data, PathBuf::from("TelecomCustomerChurn.csv"));
        assert_eq!(args.tab, Tab::ExecutiveOverview);
        assert!(args.filter().is_inactive());
        assert!(args.export.is_none());
    }

    #[test]
    fn contracts_accumulate_into_the_filter() {
        let args = Args::try_parse_from([
            "churn-insights",
            "--contract",
            "One year",
            "-c",
            "Two year",
            "--tab",
            "billing",
        ])
        .unwrap();
        let filter = args.filter();
        assert!(filter.contains("One year"));
        assert!(filter.contains("Two year"));
        assert_eq!(args.tab, Tab::BillingContract);
    }

    #[test]
    fn unknown_tab_is_rejected() {
        assert!(Args::try_parse_from(["churn-insights", "--tab", "tab-6"]).is_err());
    }
}
