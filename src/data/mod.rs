/// Data layer: core types, record sources, and line sinks.
///
/// Architecture:
/// ```text
///  .csv / .tsv / stdin
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  split rows → SourceRecord (one pass per `open`)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │    convert    │  layout, counting pass, encoder
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   sink    │  ordered VW lines → file / stdout
///   └──────────┘
/// ```

pub mod model;
pub mod sink;
pub mod source;
