//! The figure model: what gets drawn, independent of how.
//!
//! A [`Figure`] holds one [`Line`] per (group, feature) pair with its pooled
//! points, plus title, axis labels and optional fixed ranges. It serializes
//! to JSON so a plot can be re-rendered later without going back to the
//! server.

use std::fs;
use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::aggregate::{concat, AggregateConfig};
use crate::error::{Error, Result};
use crate::pipeline::BaseGroups;

/// Current figure file version.
///
/// Bump when the serialized layout changes incompatibly.
pub const FIGURE_VERSION: u32 = 1;

/// A fixed axis interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Create a range, requiring finite bounds with `min < max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(Error::InvalidArgument(format!(
                "axis range [{}, {}] must be finite with min < max",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn as_range(&self) -> Range<f64> {
        self.min..self.max
    }
}

/// The mean and ±1 std spread of all pooled samples sharing one x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    pub x: f64,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

/// One legend entry: the pooled samples of every run of a group.
///
/// NaN samples are written as JSON `null` and read back as NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub label: String,
    #[serde(deserialize_with = "nullable_samples")]
    pub x: Vec<f64>,
    #[serde(deserialize_with = "nullable_samples")]
    pub y: Vec<f64>,
}

fn nullable_samples<'de, D>(deserializer: D) -> std::result::Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|s| s.unwrap_or(f64::NAN)).collect())
}

impl Line {
    /// Collapse pooled samples to one point per distinct x, sorted by x.
    ///
    /// Points with a NaN coordinate are dropped. The spread is the
    /// population standard deviation of the samples at that x.
    pub fn band(&self) -> Vec<BandPoint> {
        let mut points: Vec<(f64, f64)> = self
            .x
            .iter()
            .copied()
            .zip(self.y.iter().copied())
            .filter(|(x, y)| !x.is_nan() && !y.is_nan())
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));

        points
            .chunk_by(|a, b| a.0 == b.0)
            .map(|chunk| {
                let n = chunk.len() as f64;
                let mean = chunk.iter().map(|(_, y)| y).sum::<f64>() / n;
                let var = chunk.iter().map(|(_, y)| (y - mean).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                BandPoint {
                    x: chunk[0].0,
                    mean,
                    lower: mean - std,
                    upper: mean + std,
                }
            })
            .collect()
    }
}

/// Everything needed to draw a comparison plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub version: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_range: Option<AxisRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_range: Option<AxisRange>,
    pub lines: Vec<Line>,
}

impl Figure {
    /// Axis bounds to draw with.
    ///
    /// Fixed ranges are used exactly as given. Otherwise the bounds cover
    /// every band point; a degenerate extent is widened by 0.5 on each side
    /// and a figure without finite data falls back to `0..1`.
    pub fn axis_bounds(&self) -> (Range<f64>, Range<f64>) {
        let bands: Vec<BandPoint> = self.lines.iter().flat_map(|l| l.band()).collect();

        let x = match self.x_range {
            Some(r) => r.as_range(),
            None => extent(bands.iter().map(|p| p.x)),
        };
        let y = match self.y_range {
            Some(r) => r.as_range(),
            None => extent(bands.iter().flat_map(|p| [p.lower, p.upper])),
        };
        (x, y)
    }

    /// Write the figure as pretty JSON, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| Error::io(path, e))?;
        info!("saved figure to {}", path.display());
        Ok(())
    }

    /// Read a figure written by [`Figure::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let figure: Figure = serde_json::from_str(&content)?;

        if figure.version != FIGURE_VERSION {
            return Err(Error::InvalidArgument(format!(
                "{} has figure version {}, expected {}",
                path.display(),
                figure.version,
                FIGURE_VERSION
            )));
        }
        for range in figure.x_range.iter().chain(figure.y_range.iter()) {
            range.validate()?;
        }
        Ok(figure)
    }
}

fn extent(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if lo > hi {
        0.0..1.0
    } else if lo == hi {
        (lo - 0.5)..(hi + 0.5)
    } else {
        lo..hi
    }
}

/// Labels, ranges and overrides for building a [`Figure`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Legend override per base name, in base order.
    pub legends: Option<Vec<String>>,
    /// Display label per feature, in feature order.
    pub feature_labels: Option<Vec<String>>,
    pub x_range: Option<AxisRange>,
    pub y_range: Option<AxisRange>,
    pub aggregate: AggregateConfig,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_label: "epoch".to_string(),
            y_label: "test-accuracy".to_string(),
            legends: None,
            feature_labels: None,
            x_range: None,
            y_range: None,
            aggregate: AggregateConfig::default(),
        }
    }
}

impl PlotConfig {
    /// Check overrides against the number of bases and features requested.
    pub fn validate(&self, bases: usize, features: usize) -> Result<()> {
        if let Some(legends) = &self.legends {
            if legends.len() != bases {
                return Err(Error::InvalidArgument(format!(
                    "got {} legends for {} base names",
                    legends.len(),
                    bases
                )));
            }
        }
        if let Some(labels) = &self.feature_labels {
            if labels.len() != features {
                return Err(Error::InvalidArgument(format!(
                    "got {} feature labels for {} features",
                    labels.len(),
                    features
                )));
            }
        }
        for range in self.x_range.iter().chain(self.y_range.iter()) {
            range.validate()?;
        }
        Ok(())
    }

    /// Legend text for the line of base `base_idx` and feature `feature_idx`.
    ///
    /// The base part is the legend override or the base name. With more
    /// than one feature, or with explicit feature labels, the feature label
    /// (or feature name) is appended.
    pub fn legend(
        &self,
        base_idx: usize,
        base: &str,
        feature_idx: usize,
        feature: &str,
        feature_count: usize,
    ) -> String {
        let base_label = self
            .legends
            .as_ref()
            .and_then(|l| l.get(base_idx))
            .map(String::as_str)
            .unwrap_or(base);

        let feature_label = self
            .feature_labels
            .as_ref()
            .and_then(|l| l.get(feature_idx))
            .map(String::as_str);

        match feature_label {
            Some(label) => format!("{} {}", base_label, label),
            None if feature_count > 1 => format!("{} {}", base_label, feature),
            None => base_label.to_string(),
        }
    }
}

/// Build a figure with one line per (base, feature), bases outermost.
pub fn build_figure(groups: &[BaseGroups], config: &PlotConfig) -> Result<Figure> {
    let feature_count = groups.first().map(|g| g.features.len()).unwrap_or(0);
    config.validate(groups.len(), feature_count)?;

    let mut lines = Vec::new();
    for (base_idx, base) in groups.iter().enumerate() {
        for (feature_idx, (feature, group)) in base.features.iter().enumerate() {
            let pooled = concat(group, &config.aggregate)?;
            let (x, y) = pooled.into_parts();
            lines.push(Line {
                label: config.legend(base_idx, &base.base, feature_idx, feature, feature_count),
                x,
                y,
            });
        }
    }

    Ok(Figure {
        version: FIGURE_VERSION,
        title: config.title.clone(),
        x_label: config.x_label.clone(),
        y_label: config.y_label.clone(),
        x_range: config.x_range,
        y_range: config.y_range,
        lines,
    })
}
