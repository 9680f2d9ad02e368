//! K-keyed distributions and the size-mean normalizer.
//!
//! A [`Distribution`] is an ordered pair of equal-length sequences: integer
//! keys (the structural parameter K) and numeric values. Keys are unique
//! within one distribution; their order is the order in which the producer
//! first saw them and is preserved end to end so charts and exports are
//! stable between runs.
//!
//! [`size_means`] turns an occurrence distribution and a co-keyed sum
//! distribution into per-key means. Pairing is done by key, never by
//! position, so two distributions scanned from different blobs still line
//! up correctly.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A key appeared twice while building a [`Distribution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("duplicate key {0} in distribution")]
pub struct DuplicateKey(pub i64);

/// The denominator of a size mean is zero or undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DivisionError {
    /// The occurrence count for `key` is zero.
    #[error("occurrence count for K={key} is zero")]
    ZeroFrequency { key: i64 },

    /// The sum distribution has a key the occurrence distribution lacks.
    #[error("no occurrence count for K={key}")]
    MissingFrequency { key: i64 },
}

impl DivisionError {
    /// The K at which the division failed.
    #[must_use]
    pub const fn key(&self) -> i64 {
        match self {
            Self::ZeroFrequency { key } | Self::MissingFrequency { key } => *key,
        }
    }
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Ordered `(X, Y)` pair with unique integer keys.
///
/// Serializes as `{"x": [...], "y": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distribution {
    x: Vec<i64>,
    y: Vec<f64>,
}

impl Distribution {
    /// An empty distribution.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
        }
    }

    /// Build from `(key, value)` pairs, rejecting repeated keys.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKey`] for the first key seen twice.
    pub fn try_from_pairs(
        pairs: impl IntoIterator<Item = (i64, f64)>,
    ) -> Result<Self, DuplicateKey> {
        let mut seen = HashSet::new();
        let mut dist = Self::new();
        for (key, value) in pairs {
            if !seen.insert(key) {
                return Err(DuplicateKey(key));
            }
            dist.x.push(key);
            dist.y.push(value);
        }
        Ok(dist)
    }

    /// Build from pairs whose keys the caller already knows are unique.
    pub(crate) fn from_unique_pairs(pairs: impl IntoIterator<Item = (i64, f64)>) -> Self {
        let (x, y) = pairs.into_iter().unzip();
        Self { x, y }
    }

    /// Keys in producer order.
    #[must_use]
    pub fn x(&self) -> &[i64] {
        &self.x
    }

    /// Values, co-indexed with [`Distribution::x`].
    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate `(key, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Value stored for `key`, if any.
    #[must_use]
    pub fn get(&self, key: i64) -> Option<f64> {
        self.x.iter().position(|&k| k == key).map(|i| self.y[i])
    }
}

// ---------------------------------------------------------------------------
// Size normalizer
// ---------------------------------------------------------------------------

/// Divide each sum in `sums` by the occurrence count stored for the same key
/// in `freq`.
///
/// The result follows the key order of `sums`. Keys only present in `freq`
/// are dropped.
///
/// # Errors
///
/// Returns [`DivisionError::ZeroFrequency`] when a count is not positive and
/// [`DivisionError::MissingFrequency`] when `freq` has no entry for a key of
/// `sums`.
pub fn size_means(freq: &Distribution, sums: &Distribution) -> Result<Distribution, DivisionError> {
    let counts: HashMap<i64, f64> = freq.iter().collect();

    let mut pairs = Vec::with_capacity(sums.len());
    for (key, sum) in sums.iter() {
        let count = *counts
            .get(&key)
            .ok_or(DivisionError::MissingFrequency { key })?;
        if count <= 0.0 {
            return Err(DivisionError::ZeroFrequency { key });
        }
        pairs.push((key, sum / count));
    }

    Ok(Distribution::from_unique_pairs(pairs))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
