/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ChurnDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ ChurnDataset  │  Vec<CustomerRecord>, contract index, summary
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  allowed Contract values → View
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  KPIs, group counts, bins, box stats
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
