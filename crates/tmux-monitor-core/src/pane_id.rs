//! Validated tmux pane identifier (`%<digits>`).
//!
//! `PaneId` orders numerically, not lexicographically: `%2 < %10`. This
//! matters for role assignment (§4.5), which sorts the discovered pane
//! set before handing out ordinal roles.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct PaneId {
    raw: String,
    number: u64,
}

impl From<PaneId> for String {
    fn from(id: PaneId) -> Self {
        id.raw
    }
}

impl<'de> Deserialize<'de> for PaneId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        PaneId::parse(raw).map_err(serde::de::Error::custom)
    }
}

impl PaneId {
    /// Smart constructor: fails with `InvalidFormat` unless `raw` matches `%\d+`.
    pub fn parse(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        let digits = raw.strip_prefix('%').ok_or_else(|| {
            CoreError::InvalidFormat(format!("pane id {raw:?} does not start with '%'"))
        })?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidFormat(format!(
                "pane id {raw:?} must match %<digits>"
            )));
        }
        let number = digits.parse::<u64>().map_err(|e| {
            CoreError::InvalidFormat(format!("pane id {raw:?} has unparsable number: {e}"))
        })?;
        Ok(Self { raw, number })
    }

    /// The trailing integer, e.g. `%12` -> `12`.
    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialOrd for PaneId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PaneId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number.cmp(&other.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_id() {
        let id = PaneId::parse("%12").expect("valid");
        assert_eq!(id.number(), 12);
        assert_eq!(id.as_str(), "%12");
    }

    #[test]
    fn round_trip_to_string() {
        for raw in ["%0", "%1", "%42"] {
            let id = PaneId::parse(raw).expect("valid");
            assert_eq!(id.to_string(), raw);
        }
    }

    #[test]
    fn rejects_missing_percent() {
        assert!(PaneId::parse("12").is_err());
    }

    #[test]
    fn rejects_non_numeric_suffix() {
        assert!(PaneId::parse("%12a").is_err());
        assert!(PaneId::parse("%").is_err());
        assert!(PaneId::parse("%-1").is_err());
    }

    #[test]
    fn numeric_ordering_not_lexical() {
        let two = PaneId::parse("%2").unwrap();
        let ten = PaneId::parse("%10").unwrap();
        assert!(two < ten, "%2 should sort before %10 numerically");

        let mut ids = vec![ten.clone(), two.clone()];
        ids.sort();
        assert_eq!(ids, vec![two, ten]);
    }

    #[test]
    fn equal_ids_compare_equal() {
        let a = PaneId::parse("%7").unwrap();
        let b = PaneId::parse("%7").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = PaneId::parse("%3").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"%3\"");
    }

    #[test]
    fn deserialize_rejects_malformed_id() {
        let result: Result<PaneId, _> = serde_json::from_str("\"not-a-pane\"");
        assert!(result.is_err());
    }
}
