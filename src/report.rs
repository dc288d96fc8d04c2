//! Extremal statistics across the runs of a group.
//!
//! For every run we take its own maximum and minimum, then summarize those
//! per-run values across runs. This describes how the best (and worst) point
//! of a run varies between repeats, not the spread of the pooled samples.

use std::fmt;

use visdump_types::{Axis, Run, RunGroup};

use crate::aggregate::{per_run, AggregateConfig};
use crate::error::Result;

/// Summary of one kind of per-run extremum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtremaStats {
    /// Max of the per-run maxima, or min of the per-run minima.
    pub extreme: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
}

/// Per-group report on the chosen axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub label: String,
    pub axis: Axis,
    pub runs: usize,
    pub maxima: ExtremaStats,
    pub minima: ExtremaStats,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} [max] : \t\tmax {} |  {} +/- {}",
            self.label, self.maxima.extreme, self.maxima.mean, self.maxima.std
        )?;
        write!(
            f,
            "{} [min] : \t\tmin {} |  {} +/- {}",
            self.label, self.minima.extreme, self.minima.mean, self.minima.std
        )
    }
}

/// Summarize runs that have already been split per run.
///
/// NaN samples are skipped when taking a run's extrema.
pub fn summarize(runs: &[Run], label: &str, axis: Axis) -> Summary {
    let maxima: Vec<f64> = runs
        .iter()
        .map(|r| extremum(r.series.axis(axis), f64::max))
        .collect();
    let minima: Vec<f64> = runs
        .iter()
        .map(|r| extremum(r.series.axis(axis), f64::min))
        .collect();

    Summary {
        label: label.to_string(),
        axis,
        runs: runs.len(),
        maxima: ExtremaStats {
            extreme: extremum(&maxima, f64::max),
            mean: mean(&maxima),
            std: std_dev(&maxima),
        },
        minima: ExtremaStats {
            extreme: extremum(&minima, f64::min),
            mean: mean(&minima),
            std: std_dev(&minima),
        },
    }
}

/// Split `group` per run and summarize it.
pub fn summarize_group(
    group: &RunGroup,
    label: &str,
    axis: Axis,
    config: &AggregateConfig,
) -> Result<Summary> {
    let runs = per_run(group, config)?;
    Ok(summarize(&runs, label, axis))
}

fn extremum(values: &[f64], pick: fn(f64, f64) -> f64) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(pick)
        .unwrap_or(f64::NAN)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}
