//! Combining the runs of a group into one table.
//!
//! Two shapes are produced:
//!
//! - [`concat`]: every run's samples appended into one series, for pooled
//!   export and plotting
//! - [`per_run`]: one entry per run, for statistics that look at each run
//!   on its own
//!
//! In both cases each run is truncated to [`AggregateConfig::max_samples`]
//! before it is combined.

use visdump_types::{Run, RunGroup, Series};

use crate::error::{Error, Result};

/// Options shared by both aggregation shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateConfig {
    /// Keep at most this many samples of each run. `None` keeps everything.
    pub max_samples: Option<usize>,
}

/// Append all runs, in discovery order, into a single series.
pub fn concat(group: &RunGroup, config: &AggregateConfig) -> Result<Series> {
    check_group(group)?;

    let mut pooled = Series::default();
    for run in group.iter() {
        let mut series = run.series.clone();
        series.truncate(config.max_samples);
        pooled.extend(&series);
    }
    Ok(pooled)
}

/// Keep runs separate, each truncated on its own.
///
/// The result has exactly one entry per run of `group`.
pub fn per_run(group: &RunGroup, config: &AggregateConfig) -> Result<Vec<Run>> {
    check_group(group)?;

    Ok(group
        .iter()
        .map(|run| {
            let mut series = run.series.clone();
            series.truncate(config.max_samples);
            Run {
                env: run.env.clone(),
                series,
            }
        })
        .collect())
}

fn check_group(group: &RunGroup) -> Result<()> {
    if group.is_empty() {
        return Err(Error::NoMatch {
            pattern: group.name.clone(),
        });
    }
    if let Some(run) = group.iter().find(|r| r.series.is_empty()) {
        return Err(Error::MalformedResponse(format!(
            "environment '{}' of group '{}' has no samples",
            run.env, group.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> RunGroup {
        let mut group = RunGroup::new("exp");
        group.push(
            "exp_0",
            Series::new(vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]).unwrap(),
        );
        group.push("exp_1", Series::new(vec![1.0, 2.0], vec![11.0, 21.0]).unwrap());
        group
    }

    #[test]
    fn test_concat_appends_in_order() {
        let pooled = concat(&group(), &AggregateConfig::default()).unwrap();
        assert_eq!(pooled.x(), &[1.0, 2.0, 3.0, 1.0, 2.0]);
        assert_eq!(pooled.y(), &[10.0, 20.0, 30.0, 11.0, 21.0]);
    }

    #[test]
    fn test_concat_truncates_each_run() {
        let config = AggregateConfig {
            max_samples: Some(1),
        };
        let pooled = concat(&group(), &config).unwrap();
        assert_eq!(pooled.x(), &[1.0, 1.0]);
        assert_eq!(pooled.y(), &[10.0, 11.0]);
    }

    #[test]
    fn test_per_run_keeps_boundaries() {
        let group = group();
        let runs = per_run(&group, &AggregateConfig::default()).unwrap();
        assert_eq!(runs.len(), group.len());
        assert_eq!(runs[0].env, "exp_0");
        assert_eq!(runs[0].series.len(), 3);
        assert_eq!(runs[1].series.y(), &[11.0, 21.0]);

        let runs = per_run(
            &group,
            &AggregateConfig {
                max_samples: Some(2),
            },
        )
        .unwrap();
        assert_eq!(runs[0].series.x(), &[1.0, 2.0]);
    }

    #[test]
    fn test_empty_group_is_no_match() {
        let empty = RunGroup::new("ghost");
        assert!(matches!(
            concat(&empty, &AggregateConfig::default()),
            Err(Error::NoMatch { ref pattern }) if pattern == "ghost"
        ));
        assert!(per_run(&empty, &AggregateConfig::default()).is_err());
    }

    #[test]
    fn test_empty_run_is_rejected() {
        let mut group = group();
        group.push("exp_2", Series::default());
        let err = concat(&group, &AggregateConfig::default()).unwrap_err();
        assert!(err.to_string().contains("exp_2"));
    }
}
