/// Data layer: core types, decoding, reflectance and export.
///
/// Architecture:
/// ```text
///  HTTP JSON / .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  first row → SpectralRow (permissive coercion)
///   └──────────┘
///        │  background + sample
///        ▼
///   ┌─────────────┐
///   │ reflectance  │  (sample / background)² → ReflectanceRow
///   └─────────────┘
///        │
///        ├──────────────► export (one-row CSV)
///        ▼
///   model score ──► classify → Label
/// ```

pub mod export;
pub mod loader;
pub mod model;
pub mod reflectance;
