use std::collections::HashMap;

use crate::convert::clean::clean_field;
use crate::convert::layout::ColumnLayout;
use crate::data::model::{ColumnRole, FeatureAllowSet, FeatureKey, SourceRecord};
use crate::error::Result;

// ---------------------------------------------------------------------------
// FeatureCounter – the min-shows pre-pass
// ---------------------------------------------------------------------------

/// Counts `(namespace, token)` occurrences over a full pass of the input.
///
/// Every distinct key stays in memory until the pass ends. Only categorical
/// columns are counted, using the same cleaned tokens the encoder filters.
#[derive(Debug)]
pub struct FeatureCounter<'a> {
    layout: &'a ColumnLayout,
    counts: Vec<HashMap<String, u64>>,
    records: u64,
}

impl<'a> FeatureCounter<'a> {
    pub fn new(layout: &'a ColumnLayout) -> Self {
        Self {
            layout,
            counts: vec![HashMap::new(); layout.names().len()],
            records: 0,
        }
    }

    /// Count the tokens of one record.
    pub fn observe(&mut self, record: SourceRecord) -> Result<()> {
        let (_, fields) = self.layout.split_record(record)?;
        for ((role, counts), value) in self
            .layout
            .roles()
            .iter()
            .zip(self.counts.iter_mut())
            .zip(&fields)
        {
            if *role != ColumnRole::Categorical {
                continue;
            }
            for token in clean_field(value).split(' ') {
                *counts.entry(token.to_string()).or_insert(0) += 1;
            }
        }
        self.records += 1;
        Ok(())
    }

    /// Records seen so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Distinct keys seen so far.
    pub fn distinct(&self) -> usize {
        self.counts.iter().map(HashMap::len).sum()
    }

    /// How often `token` was seen under `namespace`.
    pub fn count(&self, namespace: &str, token: &str) -> u64 {
        self.layout
            .names()
            .iter()
            .position(|name| name == namespace)
            .and_then(|i| self.counts[i].get(token))
            .copied()
            .unwrap_or(0)
    }

    /// Keys seen at least `min_shows` times.
    pub fn into_allow_set(self, min_shows: u32) -> FeatureAllowSet {
        let threshold = u64::from(min_shows);
        let keys = self
            .layout
            .names()
            .iter()
            .zip(self.counts)
            .flat_map(|(name, counts)| {
                counts
                    .into_iter()
                    .filter(move |(_, n)| *n >= threshold)
                    .map(move |(token, _)| FeatureKey::new(name.as_str(), token))
            });
        FeatureAllowSet::from_keys(keys)
    }
}

/// Run the counting pass over `records` and build the allow set.
pub fn count_features<I>(layout: &ColumnLayout, records: I, min_shows: u32) -> Result<CountOutcome>
where
    I: IntoIterator<Item = Result<SourceRecord>>,
{
    let mut counter = FeatureCounter::new(layout);
    for record in records {
        counter.observe(record?)?;
    }
    let distinct = counter.distinct();
    let records = counter.records();
    let allow = counter.into_allow_set(min_shows);
    log::info!(
        "counted {distinct} distinct features over {records} records, keeping {} (min shows {min_shows})",
        allow.len()
    );
    if allow.is_empty() && distinct > 0 {
        log::warn!("no feature occurs {min_shows} times, every namespace will be empty");
    }
    Ok(CountOutcome { allow, distinct })
}

/// Result of the counting pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountOutcome {
    pub allow: FeatureAllowSet,
    /// Distinct keys seen, before the threshold.
    pub distinct: usize,
}
