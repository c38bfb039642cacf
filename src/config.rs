use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::convert::quadratic::QuadraticSpec;
use crate::error::{ConvertError, Result};

// ---------------------------------------------------------------------------
// Input shape
// ---------------------------------------------------------------------------

/// Field delimiter of the input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }
}

/// Where namespace names come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamespaceSource {
    /// First row is a header; its cells become the namespace names.
    ParsedHeader,
    /// First row is a header that is dropped; names are `c001`, `c002`, ...
    SkipHeader,
    /// No header; synthetic names sized from the first data row.
    #[default]
    InferFromFirstRow,
}

impl NamespaceSource {
    /// Whether the first row of every pass is a header rather than data.
    pub fn consumes_header(self) -> bool {
        !matches!(self, NamespaceSource::InferFromFirstRow)
    }
}

// ---------------------------------------------------------------------------
// ConvertConfig – every value the conversion consumes
// ---------------------------------------------------------------------------

/// Conversion settings.
///
/// Column indices are zero-based positions in the input row, label column
/// included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Label column, or `None` when rows carry no label.
    pub label_index: Option<usize>,
    /// Write `-1` instead of `0` for zero labels.
    pub convert_zeros: bool,
    pub ignore_columns: BTreeSet<usize>,
    pub real_valued: BTreeSet<usize>,
    pub quadratic: Vec<QuadraticSpec>,
    /// Tokens seen fewer times than this are dropped. `<= 1` disables filtering.
    pub min_shows: u32,
    pub namespaces: NamespaceSource,
    pub delimiter: Delimiter,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            label_index: Some(0),
            convert_zeros: false,
            ignore_columns: BTreeSet::new(),
            real_valued: BTreeSet::new(),
            quadratic: Vec::new(),
            min_shows: 1,
            namespaces: NamespaceSource::default(),
            delimiter: Delimiter::default(),
        }
    }
}

impl ConvertConfig {
    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ConvertConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Whether the counting pre-pass runs.
    pub fn filtering_enabled(&self) -> bool {
        self.min_shows > 1
    }

    /// Check the settings that do not depend on the data.
    pub fn validate(&self) -> Result<()> {
        if let Some(both) = self.ignore_columns.intersection(&self.real_valued).next() {
            return Err(ConvertError::Config(format!(
                "column {both} is marked both ignored and real-valued"
            )));
        }
        if let Some(label) = self.label_index {
            if self.ignore_columns.contains(&label) || self.real_valued.contains(&label) {
                return Err(ConvertError::Config(format!(
                    "column {label} is the label column and cannot also be ignored or real-valued"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Option parsing helpers
// ---------------------------------------------------------------------------

/// Parse an index list such as `3` or `3,4,5` (no spaces required).
pub fn parse_index_list(s: &str) -> Result<BTreeSet<usize>> {
    s.split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<usize>().map_err(|_| {
                ConvertError::Config(format!("'{tok}' is not a column index (in '{s}')"))
            })
        })
        .collect()
}

/// Map the conventional `-1` to "no label column".
pub fn label_index_from_signed(index: i64) -> Result<Option<usize>> {
    match index {
        -1 => Ok(None),
        i if i >= 0 => usize::try_from(i)
            .map(Some)
            .map_err(|_| ConvertError::Config(format!("label index {i} is too large"))),
        other => Err(ConvertError::Config(format!(
            "label index must be -1 or a column index, got {other}"
        ))),
    }
}
