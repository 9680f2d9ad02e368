//! Mean and variance of comma-separated numeric lists.
//!
//! Records store per-component diameters and clustering coefficients as a
//! single string such as `"3,4,,5"`. Empty tokens are discarded before
//! anything is averaged. Variance is the population variance (divides by
//! `n`), accumulated with Welford's update so long lists stay stable.

use serde::Serialize;

/// A token of a numeric list is not a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("token {position} '{raw}' is not a number")]
pub struct NumericListError {
    /// 1-based position among the comma-separated tokens.
    pub position: usize,
    pub raw: String,
}

/// Parse a comma-separated list, skipping empty tokens.
///
/// # Errors
///
/// Returns [`NumericListError`] for the first token that does not parse.
pub fn parse_numeric_list(raw: &str) -> Result<Vec<f64>, NumericListError> {
    raw.split(',')
        .enumerate()
        .filter_map(|(idx, token)| {
            let token = token.trim();
            (!token.is_empty()).then_some((idx + 1, token))
        })
        .map(|(position, token)| {
            token.parse::<f64>().map_err(|_| NumericListError {
                position,
                raw: token.to_string(),
            })
        })
        .collect()
}

/// Running mean and population variance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Moments {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Fold one observation in.
    #[allow(clippy::cast_precision_loss)]
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Arithmetic mean; `NaN` when nothing was added.
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.count == 0 { f64::NAN } else { self.mean }
    }

    /// Population variance; `NaN` when nothing was added.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Snapshot for summaries.
    #[must_use]
    pub fn spread(&self) -> Spread {
        Spread {
            mean: self.mean(),
            variance: self.variance(),
        }
    }
}

impl FromIterator<f64> for Moments {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut moments = Self::new();
        for value in iter {
            moments.add(value);
        }
        moments
    }
}

/// Mean/variance pair as reported in record summaries.
///
/// `NaN` fields serialize as JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spread {
    pub mean: f64,
    pub variance: f64,
}
