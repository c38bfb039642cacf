use serde::Serialize;

use crate::config::ConvertConfig;
use crate::convert::encoder::{LabelStatus, RecordEncoder};
use crate::convert::frequency::{count_features, CountOutcome};
use crate::convert::layout::ColumnLayout;
use crate::data::sink::LineSink;
use crate::data::source::{RecordSource, Records};
use crate::error::{ConvertError, Result};

/// Records between two progress messages.
const PROGRESS_EVERY: u64 = 10_000;

// ---------------------------------------------------------------------------
// ConversionSummary – what a run did
// ---------------------------------------------------------------------------

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    /// Records written to the sink.
    pub records: u64,
    pub empty_labels: u64,
    pub malformed_labels: u64,
    /// Namespace segments on every line.
    pub namespaces: usize,
    /// Distinct `(namespace, token)` keys seen by the counting pass.
    pub distinct_features: Option<usize>,
    /// Keys that passed the min-shows threshold.
    pub retained_features: Option<usize>,
}

// ---------------------------------------------------------------------------
// ConversionPipeline – setup, optional counting pass, encoding pass
// ---------------------------------------------------------------------------

/// Drives a whole conversion from a source to a sink.
#[derive(Debug, Clone)]
pub struct ConversionPipeline {
    config: ConvertConfig,
}

impl ConversionPipeline {
    pub fn new(config: ConvertConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Convert every record of `source` into `sink`, in source order.
    ///
    /// With min-shows filtering the source is walked twice: once to count
    /// features, once to encode. The first error aborts the run.
    pub fn run<S, K>(&self, source: &mut S, sink: &mut K) -> Result<ConversionSummary>
    where
        S: RecordSource + ?Sized,
        K: LineSink + ?Sized,
    {
        let total_bytes = source.total_bytes();

        let counted = if self.config.filtering_enabled() {
            if !source.restartable() {
                return Err(ConvertError::Config(
                    "min-shows filtering needs an input that can be read twice".to_string(),
                ));
            }
            log::info!("Calculating occurrences of all features...");
            match self.open_pass(source)? {
                Some((layout, records)) => {
                    Some(count_features(&layout, records, self.config.min_shows)?)
                }
                None => None,
            }
        } else {
            None
        };

        let Some((layout, records)) = self.open_pass(source)? else {
            log::warn!("input contains no records, nothing to convert");
            sink.finish()?;
            return Ok(ConversionSummary::default());
        };

        log::info!("Converting...");
        let summary = self.encode_all(&layout, counted.as_ref(), records, sink, total_bytes)?;
        log::info!(
            "converted {} records ({} empty labels, {} malformed labels)",
            summary.records,
            summary.empty_labels,
            summary.malformed_labels
        );
        Ok(summary)
    }

    /// Start a pass and resolve the layout from its first row.
    ///
    /// Header rows are consumed here; an inferred first row is handed back
    /// in front of the remaining records. `None` means the source is empty.
    fn open_pass<'s, S>(&self, source: &'s mut S) -> Result<Option<(ColumnLayout, Records<'s>)>>
    where
        S: RecordSource + ?Sized,
    {
        let mut records = source.open()?;
        let first = match records.next() {
            Some(first) => first?,
            None => return Ok(None),
        };

        let layout = ColumnLayout::resolve(&self.config, &first.fields)?;
        log::debug!("namespaces: {}", layout.names().join(" "));

        let records: Records<'s> = if self.config.namespaces.consumes_header() {
            records
        } else {
            Box::new(std::iter::once(Ok(first)).chain(records))
        };
        Ok(Some((layout, records)))
    }

    fn encode_all<K>(
        &self,
        layout: &ColumnLayout,
        counted: Option<&CountOutcome>,
        records: Records<'_>,
        sink: &mut K,
        total_bytes: Option<u64>,
    ) -> Result<ConversionSummary>
    where
        K: LineSink + ?Sized,
    {
        let encoder = RecordEncoder::new(
            layout,
            counted.map(|c| &c.allow),
            self.config.convert_zeros,
        );
        let mut summary = ConversionSummary {
            namespaces: layout.categorical_count(),
            distinct_features: counted.map(|c| c.distinct),
            retained_features: counted.map(|c| c.allow.len()),
            ..ConversionSummary::default()
        };

        for record in records {
            let record = record?;
            let line = record.line;
            let offset = record.byte_offset;

            let encoded = encoder.encode(record)?;
            match &encoded.label {
                LabelStatus::Empty => {
                    summary.empty_labels += 1;
                    log::info!("line {line}: label is ''");
                }
                LabelStatus::Malformed(raw) => {
                    summary.malformed_labels += 1;
                    log::warn!("line {line}: label is '{raw}', setting to ''");
                }
                LabelStatus::Numeric | LabelStatus::Absent => {}
            }

            sink.emit(&encoded.text)?;
            summary.records += 1;

            if summary.records % PROGRESS_EVERY == 0 {
                report_progress(summary.records, offset, total_bytes);
            }
        }

        sink.finish()?;
        Ok(summary)
    }
}

fn report_progress(records: u64, offset: u64, total_bytes: Option<u64>) {
    match total_bytes {
        Some(total) if total > 0 => {
            let percent = offset.saturating_mul(100) / total;
            log::info!("{records} records converted ({percent}%)");
        }
        _ => log::info!("{records} records converted"),
    }
}
