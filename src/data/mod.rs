/// Data layer: loading, ridership detection, filtering and aggregation.
///
/// Architecture:
/// ```text
///  daily + hourly  (.csv / .json / .parquet)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read → RawTable → normalise columns, parse dates/hours
///   └──────────┘        (detect picks the ridership column)
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  Arc<Datasets>, keyed by path / size / mtime
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date range, line, day type → derived copies
///   └──────────┘
///        │
///        ▼
///   ┌───────────────────────┐
///   │ aggregate + recommend  │  monthly, hourly, heatmap, travel hours
///   └───────────────────────┘
///        │
///        ▼
///     Dashboard
/// ```

pub mod aggregate;
pub mod cache;
pub mod dashboard;
pub mod detect;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod recommend;
