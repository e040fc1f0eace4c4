/// Data layer: core types, loading, joining and filtering.
///
/// Architecture:
/// ```text
///  points sheet        coordinates sheet
///  (.xlsx/.csv/...)    (.xlsx/.csv/...)
///        │                   │
///        ▼                   ▼
///   ┌───────────────────────────┐
///   │  loader   read → RawTable │
///   │           inner join on id│
///   └───────────────────────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ PointTable │  Vec<PointRecord>, distinct values per dimension
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterCriteria → filtered indices
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
