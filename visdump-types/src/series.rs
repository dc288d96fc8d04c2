//! Series - the x/y samples of one feature in one environment.

use std::fmt;

/// Which sample array of a [`Series`] to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Axis {
    X,
    #[default]
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Returned when `x` and `y` do not have the same number of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthMismatch {
    pub x: usize,
    pub y: usize,
}

impl fmt::Display for LengthMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x has {} samples but y has {}", self.x, self.y)
    }
}

impl std::error::Error for LengthMismatch {}

/// An ordered pair of equal-length sample sequences.
///
/// One point per sample: `(x[i], y[i])`. Samples are kept exactly as
/// received; nothing is sorted or interpolated.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Series {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Series {
    /// Create a series, checking that both arrays have the same length.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, LengthMismatch> {
        if x.len() != y.len() {
            return Err(LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        Ok(Self { x, y })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check if the series has no samples.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// The samples along `axis`.
    pub fn axis(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    /// Iterate over `(x, y)` points.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Keep at most the first `max` samples. `None` keeps everything.
    pub fn truncate(&mut self, max: Option<usize>) {
        if let Some(max) = max {
            self.x.truncate(max);
            self.y.truncate(max);
        }
    }

    /// Append the samples of `other`.
    pub fn extend(&mut self, other: &Series) {
        self.x.extend_from_slice(&other.x);
        self.y.extend_from_slice(&other.y);
    }

    /// Split into the underlying `(x, y)` vectors.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.x, self.y)
    }
}
