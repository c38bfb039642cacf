use std::collections::HashSet;

use crate::config::{ConvertConfig, NamespaceSource};
use crate::convert::clean::clean_field;
use crate::convert::quadratic::{expand, resolve_pairs};
use crate::data::model::{ColumnRole, SourceRecord};
use crate::error::{ConvertError, Result};

// ---------------------------------------------------------------------------
// ColumnLayout – namespace names and roles, fixed at setup
// ---------------------------------------------------------------------------

/// Everything about the columns that is decided once, before encoding.
///
/// Feature columns are the input columns minus the label, followed by one
/// synthetic column per resolved quadratic pair. `names` and `roles` are
/// indexed by feature column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    raw_width: usize,
    label_index: Option<usize>,
    names: Vec<String>,
    roles: Vec<ColumnRole>,
    pairs: Vec<(usize, usize)>,
}

impl ColumnLayout {
    /// Resolve the layout from the first row of the input.
    ///
    /// `first_row` is the header for [`NamespaceSource::ParsedHeader`] and
    /// [`NamespaceSource::SkipHeader`], otherwise the first data row. Only
    /// its width matters unless the header is parsed.
    pub fn resolve(config: &ConvertConfig, first_row: &[String]) -> Result<Self> {
        let raw_width = first_row.len();

        if let Some(index) = config.label_index {
            if index >= raw_width {
                return Err(ConvertError::LabelIndexOutOfRange {
                    index,
                    width: raw_width,
                });
            }
        }

        let mut names = match config.namespaces {
            NamespaceSource::ParsedHeader => header_names(first_row),
            NamespaceSource::SkipHeader | NamespaceSource::InferFromFirstRow => {
                (0..raw_width).map(synthetic_name).collect()
            }
        };
        if let Some(index) = config.label_index {
            names.remove(index);
        }

        let pairs = resolve_pairs(&config.quadratic, &names);
        expand(&mut names, &pairs);

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ConvertError::DuplicateNamespace(name.clone()));
            }
        }

        // Roles are assigned in input-column space (label included, synthetic
        // columns appended), skipping the label position.
        let extended_width = raw_width + pairs.len();
        for &index in config.ignore_columns.iter().chain(&config.real_valued) {
            if index >= extended_width {
                return Err(ConvertError::ColumnIndexOutOfRange {
                    index,
                    width: extended_width,
                });
            }
        }

        let roles: Vec<ColumnRole> = (0..extended_width)
            .filter(|index| config.label_index != Some(*index))
            .map(|index| {
                if config.ignore_columns.contains(&index) {
                    ColumnRole::Ignored
                } else if config.real_valued.contains(&index) {
                    ColumnRole::RealValued
                } else {
                    ColumnRole::Categorical
                }
            })
            .collect();

        debug_assert_eq!(roles.len(), names.len());

        let layout = Self {
            raw_width,
            label_index: config.label_index,
            names,
            roles,
            pairs,
        };
        log::debug!(
            "resolved {} feature columns ({} categorical, {} quadratic)",
            layout.names.len(),
            layout.categorical_count(),
            layout.pairs.len()
        );
        Ok(layout)
    }

    /// Split a record into its label and feature fields.
    ///
    /// Checks the row width, removes the label and appends the quadratic
    /// fields. The counting pass and the encoder both go through here.
    pub fn split_record(&self, record: SourceRecord) -> Result<(Option<String>, Vec<String>)> {
        if record.width() != self.raw_width {
            return Err(ConvertError::ColumnCountMismatch {
                line: record.line,
                expected: self.raw_width,
                actual: record.width(),
            });
        }
        let mut fields = record.fields;
        let label = self.label_index.map(|index| fields.remove(index));
        expand(&mut fields, &self.pairs);
        Ok((label, fields))
    }

    /// Number of fields every input row must have.
    pub fn raw_width(&self) -> usize {
        self.raw_width
    }

    /// Namespace names of the feature columns, synthetic ones last.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn roles(&self) -> &[ColumnRole] {
        &self.roles
    }

    /// Resolved quadratic pairs, as feature-column indices.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// `(name, role)` per feature column.
    pub fn columns(&self) -> impl Iterator<Item = (&str, ColumnRole)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.roles.iter().copied())
    }

    /// Number of namespace segments every output line carries.
    pub fn categorical_count(&self) -> usize {
        self.roles
            .iter()
            .filter(|role| **role == ColumnRole::Categorical)
            .count()
    }
}

/// `c001`, `c002`, ... for the 0-based column `index`.
pub fn synthetic_name(index: usize) -> String {
    format!("c{:03}", index + 1)
}

/// Namespace names from a header row: spaces and structural characters
/// removed. Cells left empty fall back to the synthetic name.
fn header_names(header: &[String]) -> Vec<String> {
    header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name: String = clean_field(cell).split(' ').collect();
            if name.is_empty() {
                let fallback = synthetic_name(i);
                log::warn!("header column {i} has no usable name, using '{fallback}'");
                fallback
            } else {
                name
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::convert::quadratic::QuadraticSpec;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn synthetic_names_skip_the_label() {
        let config = ConvertConfig::default();
        let layout = ColumnLayout::resolve(&config, &row(&["1", "red", "3.5"])).unwrap();
        assert_eq!(layout.names(), ["c002", "c003"]);
        assert_eq!(layout.raw_width(), 3);
    }

    #[test]
    fn header_names_are_cleaned() {
        let config = ConvertConfig {
            namespaces: NamespaceSource::ParsedHeader,
            ..ConvertConfig::default()
        };
        let layout =
            ColumnLayout::resolve(&config, &row(&["target", "day of week", "a|b:c", ""])).unwrap();
        assert_eq!(layout.names(), ["dayofweek", "abc", "c004"]);
    }

    #[test]
    fn duplicate_header_is_rejected() {
        let config = ConvertConfig {
            namespaces: NamespaceSource::ParsedHeader,
            ..ConvertConfig::default()
        };
        let err = ColumnLayout::resolve(&config, &row(&["y", "x", "x"])).unwrap_err();
        assert!(matches!(err, ConvertError::DuplicateNamespace(name) if name == "x"));
    }

    #[test]
    fn roles_use_input_column_indices() {
        let config = ConvertConfig {
            ignore_columns: BTreeSet::from([1]),
            real_valued: BTreeSet::from([2]),
            ..ConvertConfig::default()
        };
        let layout = ColumnLayout::resolve(&config, &row(&["1", "red", "3.5", "x"])).unwrap();
        assert_eq!(
            layout.roles(),
            [
                ColumnRole::Ignored,
                ColumnRole::RealValued,
                ColumnRole::Categorical
            ]
        );
        assert_eq!(layout.categorical_count(), 1);
    }

    #[test]
    fn label_can_be_disabled_or_moved() {
        let config = ConvertConfig {
            label_index: None,
            ..ConvertConfig::default()
        };
        let layout = ColumnLayout::resolve(&config, &row(&["a", "b"])).unwrap();
        assert_eq!(layout.names(), ["c001", "c002"]);

        let config = ConvertConfig {
            label_index: Some(2),
            ..ConvertConfig::default()
        };
        let layout = ColumnLayout::resolve(&config, &row(&["a", "b", "y"])).unwrap();
        assert_eq!(layout.names(), ["c001", "c002"]);
    }

    #[test]
    fn label_outside_row_is_a_configuration_error() {
        let config = ConvertConfig {
            label_index: Some(5),
            ..ConvertConfig::default()
        };
        let err = ColumnLayout::resolve(&config, &row(&["a", "b"])).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::LabelIndexOutOfRange { index: 5, width: 2 }
        ));
    }

    #[test]
    fn role_index_outside_row_is_a_configuration_error() {
        let config = ConvertConfig {
            real_valued: BTreeSet::from([9]),
            ..ConvertConfig::default()
        };
        let err = ColumnLayout::resolve(&config, &row(&["1", "a"])).unwrap_err();
        assert!(matches!(err, ConvertError::ColumnIndexOutOfRange { index: 9, .. }));
    }

    #[test]
    fn quadratic_columns_are_appended_as_categorical() {
        let config = ConvertConfig {
            namespaces: NamespaceSource::ParsedHeader,
            quadratic: vec![QuadraticSpec::new("a", "b")],
            ..ConvertConfig::default()
        };
        let layout =
            ColumnLayout::resolve(&config, &row(&["label", "a1", "a2", "b1"])).unwrap();
        assert_eq!(layout.names(), ["a1", "a2", "b1", "a1#b1", "a2#b1"]);
        assert_eq!(layout.pairs(), [(0, 2), (1, 2)]);
        assert_eq!(layout.categorical_count(), 5);
    }

    #[test]
    fn repeated_quadratic_is_not_a_duplicate_namespace() {
        let config = ConvertConfig {
            namespaces: NamespaceSource::ParsedHeader,
            quadratic: vec!["ab".parse().unwrap(), "a,b".parse().unwrap()],
            ..ConvertConfig::default()
        };
        let layout = ColumnLayout::resolve(&config, &row(&["y", "a", "b"])).unwrap();
        assert_eq!(layout.names(), ["a", "b", "a#b"]);
    }

    #[test]
    fn split_record_removes_label_and_expands() {
        let config = ConvertConfig {
            label_index: Some(1),
            quadratic: vec![QuadraticSpec::new("c001", "c003")],
            ..ConvertConfig::default()
        };
        let layout = ColumnLayout::resolve(&config, &row(&["a", "y", "b"])).unwrap();
        let record = SourceRecord::from_strs(4, &["p q", "1", "r"]);
        let (label, fields) = layout.split_record(record).unwrap();
        assert_eq!(label.as_deref(), Some("1"));
        assert_eq!(fields, row(&["p q", "r", "p#r q#r"]));
    }

    #[test]
    fn split_record_checks_width() {
        let layout = ColumnLayout::resolve(&ConvertConfig::default(), &row(&["1", "a"])).unwrap();
        let err = layout
            .split_record(SourceRecord::from_strs(7, &["1", "a", "b"]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::ColumnCountMismatch {
                line: 7,
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn synthetic_columns_can_be_ignored_by_extended_index() {
        let config = ConvertConfig {
            namespaces: NamespaceSource::ParsedHeader,
            quadratic: vec![QuadraticSpec::new("a", "b")],
            ignore_columns: BTreeSet::from([3]),
            ..ConvertConfig::default()
        };
        let layout = ColumnLayout::resolve(&config, &row(&["label", "a1", "b1"])).unwrap();
        assert_eq!(layout.names(), ["a1", "b1", "a1#b1"]);
        assert_eq!(layout.roles()[2], ColumnRole::Ignored);
    }
}
