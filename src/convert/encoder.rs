use crate::convert::clean::clean_field;
use crate::convert::layout::ColumnLayout;
use crate::data::model::{ColumnRole, FeatureAllowSet, SourceRecord};
use crate::error::{ConvertError, Result};

/// Namespace that collects all non-zero real-valued columns.
pub const REAL_VALUED_NAMESPACE: &str = "RealValued";

// ---------------------------------------------------------------------------
// Label normalization
// ---------------------------------------------------------------------------

/// What happened to the label of a row.
///
/// Non-numeric labels do not stop the conversion; the pipeline logs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelStatus {
    /// Parsed as a number.
    Numeric,
    /// The label field was empty.
    Empty,
    /// The label field held this non-numeric text.
    Malformed(String),
    /// Rows carry no label column.
    Absent,
}

/// Normalize a raw label into its output token.
///
/// `0` becomes `-1` when `convert_zeros` is set, `1` becomes `1`, other
/// numbers keep their original text. Equality is numeric, so `0.0` counts as
/// zero. Anything unparsable becomes the empty label.
pub fn normalize_label(raw: &str, convert_zeros: bool) -> (String, LabelStatus) {
    match raw.trim().parse::<f64>() {
        Ok(value) if value == 0.0 => {
            let token = if convert_zeros { "-1" } else { "0" };
            (token.to_string(), LabelStatus::Numeric)
        }
        Ok(value) if value == 1.0 => ("1".to_string(), LabelStatus::Numeric),
        Ok(_) => (raw.to_string(), LabelStatus::Numeric),
        Err(_) if raw.is_empty() => (String::new(), LabelStatus::Empty),
        Err(_) => (String::new(), LabelStatus::Malformed(raw.to_string())),
    }
}

// ---------------------------------------------------------------------------
// RecordEncoder – one record in, one VW line out
// ---------------------------------------------------------------------------

/// One encoded output line and the fate of its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedLine {
    /// Newline-terminated VW line.
    pub text: String,
    pub label: LabelStatus,
}

/// Turns records into VW lines for a fixed layout.
#[derive(Debug, Clone, Copy)]
pub struct RecordEncoder<'a> {
    layout: &'a ColumnLayout,
    allow: Option<&'a FeatureAllowSet>,
    convert_zeros: bool,
}

impl<'a> RecordEncoder<'a> {
    pub fn new(
        layout: &'a ColumnLayout,
        allow: Option<&'a FeatureAllowSet>,
        convert_zeros: bool,
    ) -> Self {
        Self {
            layout,
            allow,
            convert_zeros,
        }
    }

    /// Encode a record.
    ///
    /// Fails when the row has the wrong width or a real-valued column does
    /// not hold a finite number.
    pub fn encode(&self, record: SourceRecord) -> Result<EncodedLine> {
        let line_no = record.line;
        let (raw_label, fields) = self.layout.split_record(record)?;

        let mut segments = Vec::with_capacity(self.layout.categorical_count() + 2);
        let label = match raw_label {
            Some(raw) => {
                let (token, status) = normalize_label(&raw, self.convert_zeros);
                segments.push(token);
                status
            }
            None => LabelStatus::Absent,
        };

        let mut real_valued = Vec::new();
        for ((name, role), value) in self.layout.columns().zip(&fields) {
            match role {
                ColumnRole::Categorical => segments.push(self.namespace_segment(name, value)),
                ColumnRole::RealValued => {
                    // Written as given, once it is known to be a finite number.
                    if parse_real(value, name, line_no)? != 0.0 {
                        real_valued.push(format!("{name}:{}", value.trim()));
                    }
                }
                ColumnRole::Ignored => {}
            }
        }

        if !real_valued.is_empty() {
            segments.push(format!("|{REAL_VALUED_NAMESPACE} {}", real_valued.join(" ")));
        }

        let mut text = segments.join(" ");
        text.push('\n');
        Ok(EncodedLine { text, label })
    }

    /// `|name tokens`, or bare `|name` when nothing is left.
    fn namespace_segment(&self, name: &str, value: &str) -> String {
        let cleaned = clean_field(value);
        let tokens = match self.allow {
            Some(allow) => cleaned
                .split(' ')
                .filter(|token| allow.allows(name, token))
                .collect::<Vec<_>>()
                .join(" "),
            None => cleaned,
        };
        if tokens.is_empty() {
            format!("|{name}")
        } else {
            format!("|{name} {tokens}")
        }
    }
}

fn parse_real(value: &str, column: &str, line: u64) -> Result<f64> {
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(ConvertError::MalformedRealValue {
            value: value.to_string(),
            column: column.to_string(),
            line,
        }),
    }
}
