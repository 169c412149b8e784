/// Data layer: tables, schema, loading and writing.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (schema-checked for sample tables)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  named Vec<Column>, NaN = missing cell
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  Dataset → .csv (merge output)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod schema;
pub mod writer;
