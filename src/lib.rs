//! Convert CSV/TSV tables into Vowpal Wabbit input lines.
//!
//! Every row becomes one line: the label, one `|namespace tokens` segment per
//! categorical column, optional quadratic (crossed) namespaces, and one
//! `|RealValued name:value` segment for non-zero numeric columns. Rare
//! tokens can be dropped with a min-shows threshold, at the cost of an extra
//! pass over the input.
//!
//! ```no_run
//! use csv2vw::{ConversionPipeline, ConvertConfig, CsvSource, WriterSink};
//!
//! # fn main() -> csv2vw::Result<()> {
//! let config = ConvertConfig::default();
//! let mut source = CsvSource::open_path("train.csv".as_ref(), config.delimiter)?;
//! let mut sink = WriterSink::new(std::fs::File::create("train.vw")?);
//! let summary = ConversionPipeline::new(config)?.run(&mut source, &mut sink)?;
//! println!("{} lines", summary.records);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod convert;
pub mod data;
pub mod error;

pub use config::{ConvertConfig, Delimiter, NamespaceSource};
pub use convert::pipeline::{ConversionPipeline, ConversionSummary};
pub use data::sink::{LineSink, WriterSink};
pub use data::source::{CsvSource, MemorySource, RecordSource, StreamSource};
pub use error::{ConvertError, Result};
