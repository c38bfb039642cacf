use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// SourceRecord – one row of the input table
// ---------------------------------------------------------------------------

/// A single input row, already split on the delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// 1-based line number in the source (used in error messages).
    pub line: u64,
    /// Byte offset of the row start, for progress reporting.
    pub byte_offset: u64,
    /// Raw field values in column order.
    pub fields: Vec<String>,
}

impl SourceRecord {
    pub fn new(line: u64, byte_offset: u64, fields: Vec<String>) -> Self {
        Self {
            line,
            byte_offset,
            fields,
        }
    }

    /// Build a record from string slices. Byte offset is left at zero.
    pub fn from_strs(line: u64, fields: &[&str]) -> Self {
        Self::new(line, 0, fields.iter().map(|f| f.to_string()).collect())
    }

    /// Number of fields in the row.
    pub fn width(&self) -> usize {
        self.fields.len()
    }
}

// ---------------------------------------------------------------------------
// ColumnRole – how a column contributes to the output line
// ---------------------------------------------------------------------------

/// Per-column classification, resolved once at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Ignored,
    RealValued,
    Categorical,
}

// ---------------------------------------------------------------------------
// FeatureKey / FeatureAllowSet – min-shows filtering
// ---------------------------------------------------------------------------

/// `(namespace, token)` – the unit that gets counted and filtered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureKey {
    pub namespace: String,
    pub token: String,
}

impl FeatureKey {
    pub fn new(namespace: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            token: token.into(),
        }
    }
}

/// Feature keys that occurred often enough to be kept.
///
/// Built once by the counting pass, read-only afterwards. Stored per
/// namespace so lookups borrow the token instead of building a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureAllowSet {
    by_namespace: HashMap<String, HashSet<String>>,
}

impl FeatureAllowSet {
    pub fn from_keys<I: IntoIterator<Item = FeatureKey>>(keys: I) -> Self {
        let mut by_namespace: HashMap<String, HashSet<String>> = HashMap::new();
        for key in keys {
            by_namespace.entry(key.namespace).or_default().insert(key.token);
        }
        Self { by_namespace }
    }

    /// Whether `token` is allowed under `namespace`.
    pub fn allows(&self, namespace: &str, token: &str) -> bool {
        self.by_namespace
            .get(namespace)
            .is_some_and(|tokens| tokens.contains(token))
    }

    pub fn len(&self) -> usize {
        self.by_namespace.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_namespace.values().all(HashSet::is_empty)
    }
}
