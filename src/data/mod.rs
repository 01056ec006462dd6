/// Data layer: cell values, tables, loading, caching and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (id column becomes the index)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  store    │  load clients + feature sample once, share as Arc
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  ordered column == value criteria → TableView
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod store;
pub mod table;
pub mod value;

pub use filter::{FilterCriterion, TableView};
pub use store::{DatasetStore, Datasets};
pub use table::{Row, Table};
pub use value::Value;
