//! Locate → fetch → extract, producing run groups.
//!
//! ```text
//! base name ──▶ list_environments ──▶ [env ids]
//!                                        │  (one request per env, in order)
//!                                        ▼
//!                                  window_data(env)
//!                                        │
//!                                        ▼
//!                         extract(feature) for each feature
//!                                        │
//!                                        ▼
//!                           RunGroup per (base, feature)
//! ```

use tracing::info;
use visdump_types::RunGroup;

use crate::error::{Error, Result};
use crate::extract::extract;
use crate::locate::{list_environments, Matches};
use crate::source::MetricSource;

/// Run groups collected for one base name, one per requested feature.
#[derive(Debug, Clone)]
pub struct BaseGroups {
    pub base: String,
    /// Same order as the requested features.
    pub features: Vec<(String, RunGroup)>,
}

impl BaseGroups {
    /// The group collected for `feature`.
    pub fn feature(&self, feature: &str) -> Option<&RunGroup> {
        self.features
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, group)| group)
    }
}

/// Collect every feature for all environments matching `base`.
///
/// Each environment is fetched once and all features are extracted from the
/// same window map. Any failure aborts the whole collection.
pub async fn collect_base(
    source: &dyn MetricSource,
    base: &str,
    features: &[String],
) -> Result<BaseGroups> {
    if features.is_empty() {
        return Err(Error::InvalidArgument(
            "at least one feature name is required".to_string(),
        ));
    }

    let envs = list_environments(source, base, Matches::AtLeastOne).await?;

    let mut groups: Vec<(String, RunGroup)> = features
        .iter()
        .map(|f| (f.clone(), RunGroup::new(base)))
        .collect();

    for env in &envs {
        let windows = source.window_data(env).await?;
        for (feature, group) in groups.iter_mut() {
            let series = extract(&windows, feature, env)?;
            group.push(env.clone(), series);
        }
    }

    info!(
        "collected {} features across {} envs for {}",
        features.len(),
        envs.len(),
        base
    );

    Ok(BaseGroups {
        base: base.to_string(),
        features: groups,
    })
}

/// Collect a single feature for all environments matching `base`.
pub async fn collect_run_group(
    source: &dyn MetricSource,
    base: &str,
    feature: &str,
) -> Result<RunGroup> {
    let mut collected = collect_base(source, base, &[feature.to_string()]).await?;
    collected
        .features
        .pop()
        .map(|(_, group)| group)
        .ok_or_else(|| Error::NoMatch {
            pattern: base.to_string(),
        })
}

/// Collect every feature for every base name, bases in the given order.
pub async fn collect_all(
    source: &dyn MetricSource,
    bases: &[String],
    features: &[String],
) -> Result<Vec<BaseGroups>> {
    let mut all = Vec::with_capacity(bases.len());
    for base in bases {
        all.push(collect_base(source, base, features).await?);
    }
    Ok(all)
}
