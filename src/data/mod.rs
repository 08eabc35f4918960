/// Data layer: table parsing, the propeller dataset, interpolation and loading.
///
/// Architecture:
/// ```text
///  propeller data files
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  list files, read text
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  parser   │  lines → RPM markers / value rows → RPM tables
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ PropellerDataset │  RPM → Table, field lookups
///   └─────────────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ interpolate  │  brackets, dynamic/static thrust, equivalent RPM
///   └─────────────┘
/// ```

pub mod interpolate;
pub mod loader;
pub mod model;
pub mod parser;
