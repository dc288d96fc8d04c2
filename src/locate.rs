//! Environment discovery by name substring.

use tracing::info;

use crate::error::{Error, Result};
use crate::source::MetricSource;

/// Whether an empty match set is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matches {
    /// Listing mode: an empty result is fine.
    Any,
    /// Export modes: at least one environment must match.
    AtLeastOne,
}

/// Keep the ids containing `pattern`, preserving their order.
pub fn filter_environments<S: AsRef<str>>(envs: &[S], pattern: &str) -> Vec<String> {
    envs.iter()
        .map(AsRef::as_ref)
        .filter(|env| env.contains(pattern))
        .map(str::to_string)
        .collect()
}

/// List the environments of `source` whose id contains `pattern`.
pub async fn list_environments(
    source: &dyn MetricSource,
    pattern: &str,
    required: Matches,
) -> Result<Vec<String>> {
    let all = source.environments().await?;
    let matched = filter_environments(all.as_slice(), pattern);

    if matched.is_empty() && required == Matches::AtLeastOne {
        return Err(Error::NoMatch {
            pattern: pattern.to_string(),
        });
    }

    info!(
        "found {} matching envs for {} on {}",
        matched.len(),
        pattern,
        source.description()
    );
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::MemorySource;
    use visdump_types::WindowMap;

    #[test]
    fn test_filter_preserves_order() {
        let envs = ["b_run1", "main", "a_run0", "b_run0"];
        assert_eq!(
            filter_environments(&envs, "run"),
            vec!["b_run1", "a_run0", "b_run0"]
        );
        assert_eq!(filter_environments(&envs, "b_"), vec!["b_run1", "b_run0"]);
        assert!(filter_environments(&envs, "zzz").is_empty());
        assert_eq!(filter_environments(&envs, "").len(), 4);
    }

    fn source() -> MemorySource {
        MemorySource::new()
            .env("mnist_0", WindowMap::new())
            .env("cifar_0", WindowMap::new())
            .env("mnist_1", WindowMap::new())
    }

    #[tokio::test]
    async fn test_list_environments() {
        let envs = list_environments(&source(), "mnist", Matches::AtLeastOne)
            .await
            .unwrap();
        assert_eq!(envs, vec!["mnist_0", "mnist_1"]);
    }

    #[tokio::test]
    async fn test_no_match_is_error_only_when_required() {
        let err = list_environments(&source(), "svhn", Matches::AtLeastOne)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoMatch { ref pattern } if pattern == "svhn"));

        let envs = list_environments(&source(), "svhn", Matches::Any).await.unwrap();
        assert!(envs.is_empty());
    }
}
