/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  <city>.csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → TripTable (derive month/day/hour)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  keep trips matching month / day choice
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  modes, counts, duration totals
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
