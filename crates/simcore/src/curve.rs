//! Sampled characteristic curves
//!
//! Engine maps and torque converter characteristics are stored as immutable
//! tables of `(x, y)` samples. Lookups interpolate linearly between samples and
//! hold the boundary value outside the sampled range.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Piecewise-linear lookup table with strictly increasing abscissae.
///
/// Serialized as a list of `[x, y]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct Curve {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl Curve {
    /// Build a curve from samples. Needs at least one point, finite values and
    /// strictly increasing `x`.
    pub fn new(points: &[[f64; 2]]) -> Result<Self, ConfigError> {
        if points.is_empty() {
            return Err(ConfigError::invalid("curve", "needs at least one sample"));
        }
        if let Some(p) = points.iter().find(|p| !p[0].is_finite() || !p[1].is_finite()) {
            return Err(ConfigError::invalid(
                "curve",
                format!("non-finite sample ({}, {})", p[0], p[1]),
            ));
        }
        if let Some(w) = points.windows(2).find(|w| w[1][0] <= w[0][0]) {
            return Err(ConfigError::invalid(
                "curve",
                format!("abscissae must increase strictly ({} then {})", w[0][0], w[1][0]),
            ));
        }

        Ok(Curve {
            xs: points.iter().map(|p| p[0]).collect(),
            ys: points.iter().map(|p| p[1]).collect(),
        })
    }

    /// Build a curve from a built-in table known to be well formed.
    ///
    /// Used for parameter defaults; runtime data goes through [`Curve::new`].
    pub fn from_table(points: &[[f64; 2]]) -> Self {
        debug_assert!(!points.is_empty());
        debug_assert!(points.windows(2).all(|w| w[1][0] > w[0][0]));
        Curve {
            xs: points.iter().map(|p| p[0]).collect(),
            ys: points.iter().map(|p| p[1]).collect(),
        }
    }

    /// Constant curve with a single sample at `x = 0`.
    pub fn constant(y: f64) -> Self {
        Curve {
            xs: vec![0.0],
            ys: vec![y],
        }
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    pub fn min_y(&self) -> f64 {
        self.ys.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_y(&self) -> f64 {
        self.ys.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Linear interpolation, clamped to the first/last sample outside the range.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1];
        }

        // first sample strictly greater than x; 1 <= hi <= n - 1 here
        let hi = self.xs.partition_point(|&xi| xi <= x);
        let lo = hi - 1;
        let frac = (x - self.xs[lo]) / (self.xs[hi] - self.xs[lo]);
        self.ys[lo] + frac * (self.ys[hi] - self.ys[lo])
    }
}

impl TryFrom<Vec<[f64; 2]>> for Curve {
    type Error = ConfigError;

    fn try_from(points: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        Curve::new(&points)
    }
}

impl From<Curve> for Vec<[f64; 2]> {
    fn from(curve: Curve) -> Self {
        curve.points().map(|(x, y)| [x, y]).collect()
    }
}
