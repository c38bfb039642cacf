use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Separator for explicit pairs: `age,color`.
const PAIR_SEP: char = ',';

/// Joins the two halves of an interaction token.
const CROSS_SEP: char = '#';

// ---------------------------------------------------------------------------
// QuadraticSpec – a pair of namespace prefixes
// ---------------------------------------------------------------------------

/// Pair of namespace-name prefixes whose columns get crossed.
///
/// Written either VW style as two characters (`ab`) or as an explicit pair
/// (`age,color`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuadraticSpec {
    pub first: String,
    pub second: String,
}

impl QuadraticSpec {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

impl FromStr for QuadraticSpec {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        if s.contains(PAIR_SEP) {
            let parts: Vec<&str> = s.split(PAIR_SEP).collect();
            return match parts.as_slice() {
                [a, b] => Ok(Self::new(*a, *b)),
                _ => Err(ConvertError::Config(format!(
                    "quadratic '{s}' must name exactly two namespaces"
                ))),
            };
        }

        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), None) => Ok(Self::new(a, b)),
            _ => Err(ConvertError::Config(format!(
                "quadratic '{s}' must be two prefix characters or a comma-separated pair"
            ))),
        }
    }
}

impl TryFrom<String> for QuadraticSpec {
    type Error = ConvertError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<QuadraticSpec> for String {
    fn from(spec: QuadraticSpec) -> Self {
        spec.to_string()
    }
}

impl fmt::Display for QuadraticSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{PAIR_SEP}{}", self.first, self.second)
    }
}

// ---------------------------------------------------------------------------
// Resolution and expansion
// ---------------------------------------------------------------------------

fn columns_with_prefix(names: &[String], prefix: &str) -> Vec<usize> {
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| name.starts_with(prefix))
        .map(|(i, _)| i)
        .collect()
}

/// Resolve specs to concrete `(a, b)` column pairs.
///
/// Order: spec order, then `a` matches in column order, then `b` matches in
/// column order. A spec matching nothing on either side yields no pairs, and
/// a pair already produced by an earlier spec is not repeated.
pub fn resolve_pairs(specs: &[QuadraticSpec], names: &[String]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    let mut seen = HashSet::new();
    for spec in specs {
        let firsts = columns_with_prefix(names, &spec.first);
        let seconds = columns_with_prefix(names, &spec.second);
        if firsts.is_empty() || seconds.is_empty() {
            log::debug!("quadratic '{spec}' matches no column pair");
        }
        for &a in &firsts {
            for &b in &seconds {
                if seen.insert((a, b)) {
                    pairs.push((a, b));
                } else {
                    log::debug!("quadratic '{spec}' repeats {}#{}", names[a], names[b]);
                }
            }
        }
    }
    pairs
}

/// Space-joined `a#b` for every token of `a` and every token of `b`.
///
/// Tokens come from splitting on single spaces, so empty tokens survive.
pub fn cross_tokens(a: &str, b: &str) -> String {
    let mut out = String::new();
    for ta in a.split(' ') {
        for tb in b.split(' ') {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(ta);
            out.push(CROSS_SEP);
            out.push_str(tb);
        }
    }
    out
}

/// Append one crossed field per pair.
///
/// Used for both the namespace names at setup and every record while
/// converting, so synthetic columns line up with their names.
pub fn expand(fields: &mut Vec<String>, pairs: &[(usize, usize)]) {
    fields.reserve(pairs.len());
    for &(a, b) in pairs {
        let crossed = cross_tokens(&fields[a], &fields[b]);
        fields.push(crossed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_both_spec_forms() {
        assert_eq!("ab".parse::<QuadraticSpec>().unwrap(), QuadraticSpec::new("a", "b"));
        assert_eq!(
            "age,color".parse::<QuadraticSpec>().unwrap(),
            QuadraticSpec::new("age", "color")
        );
        assert!("abc".parse::<QuadraticSpec>().is_err());
        assert!("a,b,c".parse::<QuadraticSpec>().is_err());
        assert!("".parse::<QuadraticSpec>().is_err());
    }

    #[test]
    fn resolves_full_cross_product_in_order() {
        let ns = names(&["a1", "a2", "b1"]);
        let pairs = resolve_pairs(&[QuadraticSpec::new("a", "b")], &ns);
        assert_eq!(pairs, vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn overlapping_prefixes_include_self_pairs() {
        let ns = names(&["a1", "a2"]);
        let pairs = resolve_pairs(&[QuadraticSpec::new("a", "a")], &ns);
        assert_eq!(pairs, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn repeated_specs_add_each_pair_once() {
        let ns = names(&["a1", "a2", "b1"]);
        let specs = [
            QuadraticSpec::new("a", "b"),
            QuadraticSpec::new("a", "b"),
            QuadraticSpec::new("a2", "b1"),
        ];
        assert_eq!(resolve_pairs(&specs, &ns), vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn unmatched_spec_is_a_no_op() {
        let ns = names(&["a1", "b1"]);
        assert!(resolve_pairs(&[QuadraticSpec::new("z", "b")], &ns).is_empty());
        assert!(resolve_pairs(&[QuadraticSpec::new("a", "z")], &ns).is_empty());

        let mut record = names(&["x", "y"]);
        expand(&mut record, &[]);
        assert_eq!(record, names(&["x", "y"]));
    }

    #[test]
    fn crosses_tokens_of_both_fields() {
        let ns = names(&["a1", "a2", "b1"]);
        let pairs = resolve_pairs(&[QuadraticSpec::new("a", "b")], &ns);

        let mut record = names(&["x y", "z", "w"]);
        expand(&mut record, &pairs);
        assert_eq!(record, names(&["x y", "z", "w", "x#w y#w", "z#w"]));
    }

    #[test]
    fn names_expand_the_same_way_as_records() {
        let mut ns = names(&["a1", "a2", "b1"]);
        let pairs = resolve_pairs(&[QuadraticSpec::new("a", "b")], &ns);
        expand(&mut ns, &pairs);
        assert_eq!(ns, names(&["a1", "a2", "b1", "a1#b1", "a2#b1"]));
    }

    #[test]
    fn empty_field_still_crosses() {
        assert_eq!(cross_tokens("", "w"), "#w");
        assert_eq!(cross_tokens("p q", "r s"), "p#r p#s q#r q#s");
    }

    #[test]
    fn serde_uses_string_form() {
        let spec: QuadraticSpec = serde_json::from_str("\"a,b\"").unwrap();
        assert_eq!(spec, QuadraticSpec::new("a", "b"));
        assert_eq!(serde_json::to_string(&spec).unwrap(), "\"a,b\"");
        assert!(serde_json::from_str::<QuadraticSpec>("\"abc\"").is_err());
    }
}
