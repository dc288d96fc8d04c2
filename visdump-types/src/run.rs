//! Run groups - repeated runs of one experiment.

use crate::Series;

/// The series of one feature pulled out of one environment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Run {
    /// Environment id the series came from.
    pub env: String,
    pub series: Series,
}

/// All environments sharing a base name, treated as repeated runs.
///
/// Runs are kept in discovery order and are assumed to be alignable by
/// sample position; no timestamp reconciliation is done.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunGroup {
    /// The base name the environments were matched on.
    pub name: String,
    pub runs: Vec<Run>,
}

impl RunGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runs: Vec::new(),
        }
    }

    /// Add a run.
    pub fn push(&mut self, env: impl Into<String>, series: Series) {
        self.runs.push(Run {
            env: env.into(),
            series,
        });
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Iterate over runs in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Run> {
        self.runs.iter()
    }

    /// Total samples across all runs.
    pub fn total_samples(&self) -> usize {
        self.runs.iter().map(|r| r.series.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_group_push_keeps_order() {
        let mut group = RunGroup::new("mnist");
        group.push("mnist_1", Series::new(vec![0.0], vec![1.0]).unwrap());
        group.push("mnist_0", Series::new(vec![0.0, 1.0], vec![1.0, 2.0]).unwrap());

        assert_eq!(group.len(), 2);
        assert_eq!(group.total_samples(), 3);
        let envs: Vec<&str> = group.iter().map(|r| r.env.as_str()).collect();
        assert_eq!(envs, vec!["mnist_1", "mnist_0"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let mut group = RunGroup::new("g");
        group.push("g_0", Series::new(vec![1.0], vec![2.0]).unwrap());
        let json = serde_json::to_string(&group).unwrap();
        let parsed: RunGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(group, parsed);
    }
}
