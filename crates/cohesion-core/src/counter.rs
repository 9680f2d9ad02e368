//! Counter reducer for newline-separated `"key,value"` blobs.
//!
//! Upstream analysis runs emit one line per detected subgraph, e.g. a clique
//! blob holds `"<K>,<size>"` for every clique found. [`Tally::scan`] folds
//! such a blob into one insertion-ordered table of `(count, sum)` per key, so
//! the occurrence and sum distributions of the same field always share their
//! key set and order.

use indexmap::IndexMap;

use crate::distribution::Distribution;

/// How values on each line are folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMode {
    /// Count lines per key; the value column is optional and not inspected.
    Frequency,
    /// Sum the value column per key.
    Sum,
}

/// Errors raised while scanning a counter blob.
///
/// Line numbers are 1-based and count every line of the blob, including
/// skipped empty ones.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CounterError {
    /// A line has no `,` separator but a value is required.
    #[error("line {line}: expected `key,value`, found '{raw}'")]
    MissingValue { line: usize, raw: String },

    /// The key column is not an integer.
    #[error("line {line}: key '{raw}' is not an integer")]
    InvalidKey { line: usize, raw: String },

    /// The value column is not a number.
    #[error("line {line}: value '{raw}' is not a number")]
    InvalidValue { line: usize, raw: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Slot {
    count: u64,
    sum: f64,
}

/// Per-key occurrence counts and value sums, in first-seen key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    slots: IndexMap<i64, Slot>,
}

impl Tally {
    /// Scan `blob` line by line.
    ///
    /// # Errors
    ///
    /// Returns a [`CounterError`] for the first malformed line.
    pub fn scan(blob: &str, mode: CounterMode) -> Result<Self, CounterError> {
        let mut slots: IndexMap<i64, Slot> = IndexMap::new();

        for (idx, raw_line) in blob.split('\n').enumerate() {
            let line = idx + 1;
            let trimmed = raw_line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let (key_raw, value_raw) = match trimmed.split_once(',') {
                Some((k, v)) => (k.trim(), Some(v.trim())),
                None => (trimmed, None),
            };

            let key: i64 = key_raw.parse().map_err(|_| CounterError::InvalidKey {
                line,
                raw: key_raw.to_string(),
            })?;

            let value = match mode {
                CounterMode::Frequency => 0.0,
                CounterMode::Sum => {
                    let raw = value_raw.ok_or_else(|| CounterError::MissingValue {
                        line,
                        raw: trimmed.to_string(),
                    })?;
                    parse_value(raw, line)?
                }
            };

            let slot = slots.entry(key).or_default();
            slot.count += 1;
            slot.sum += value;
        }

        Ok(Self { slots })
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Occurrence distribution: number of lines seen per key.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn frequency(&self) -> Distribution {
        Distribution::from_unique_pairs(self.slots.iter().map(|(&k, s)| (k, s.count as f64)))
    }

    /// Sum distribution: accumulated values per key.
    ///
    /// All zeros when the tally was scanned in [`CounterMode::Frequency`].
    #[must_use]
    pub fn sums(&self) -> Distribution {
        Distribution::from_unique_pairs(self.slots.iter().map(|(&k, s)| (k, s.sum)))
    }
}

/// Reduce `blob` into a single distribution.
///
/// # Errors
///
/// Returns a [`CounterError`] for the first malformed line.
pub fn reduce(blob: &str, mode: CounterMode) -> Result<Distribution, CounterError> {
    let tally = Tally::scan(blob, mode)?;
    Ok(match mode {
        CounterMode::Frequency => tally.frequency(),
        CounterMode::Sum => tally.sums(),
    })
}

fn parse_value(raw: &str, line: usize) -> Result<f64, CounterError> {
    // Extra columns after the value are not part of the format.
    let value = raw.split(',').next().unwrap_or(raw).trim();
    value.parse().map_err(|_| CounterError::InvalidValue {
        line,
        raw: raw.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_counts_lines_per_key() {
        let d = reduce("3,10\n4,12\n3,9\n", CounterMode::Frequency).unwrap();
        assert_eq!(d.x(), &[3, 4]);
        assert_eq!(d.y(), &[2.0, 1.0]);
    }

    #[test]
    fn sum_accumulates_values_per_key() {
        let d = reduce("3,10\n4,12\n3,9.5\n", CounterMode::Sum).unwrap();
        assert_eq!(d.x(), &[3, 4]);
        assert_eq!(d.y(), &[19.5, 12.0]);
    }

    #[test]
    fn keys_keep_first_seen_order() {
        let d = reduce("9,1\n2,1\n5,1\n2,1\n", CounterMode::Frequency).unwrap();
        assert_eq!(d.x(), &[9, 2, 5]);
    }

    #[test]
    fn empty_lines_are_skipped() {
        let d = reduce("\n\n3,1\n\n", CounterMode::Sum).unwrap();
        assert_eq!(d.x(), &[3]);
        assert!(reduce("", CounterMode::Sum).unwrap().is_empty());
    }

    #[test]
    fn carriage_returns_are_tolerated() {
        let d = reduce("3,1\r\n3,2\r\n", CounterMode::Sum).unwrap();
        assert_eq!(d.y(), &[3.0]);
    }

    #[test]
    fn frequency_accepts_bare_keys() {
        let d = reduce("7\n7\n", CounterMode::Frequency).unwrap();
        assert_eq!(d.x(), &[7]);
        assert_eq!(d.y(), &[2.0]);
    }

    #[test]
    fn sum_rejects_missing_comma() {
        let err = reduce("3,1\n7\n", CounterMode::Sum).unwrap_err();
        assert_eq!(
            err,
            CounterError::MissingValue {
                line: 2,
                raw: "7".to_string()
            }
        );
    }

    #[test]
    fn non_integer_key_is_rejected() {
        let err = reduce("3.5,1\n", CounterMode::Frequency).unwrap_err();
        assert!(matches!(err, CounterError::InvalidKey { line: 1, .. }));
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        let err = reduce("3,abc\n", CounterMode::Sum).unwrap_err();
        assert!(matches!(err, CounterError::InvalidValue { line: 1, .. }));
    }

    #[test]
    fn frequency_and_sums_share_keys() {
        let tally = Tally::scan("5,2\n6,3\n5,4\n", CounterMode::Sum).unwrap();
        assert_eq!(tally.len(), 2);
        assert_eq!(tally.frequency().x(), tally.sums().x());
        assert_eq!(tally.sums().y(), &[6.0, 3.0]);
    }

    #[test]
    fn error_messages_name_the_line() {
        let err = reduce("1,1\nx,2\n", CounterMode::Sum).unwrap_err();
        assert_eq!(err.to_string(), "line 2: key 'x' is not an integer");
    }
}
