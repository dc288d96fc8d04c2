//! Feature extraction from an environment's windows.
//!
//! A feature is found by exact title match. The matched window must hold a
//! plot with exactly one trace carrying both `x` and `y`; samples are taken
//! verbatim.

use tracing::{debug, warn};
use visdump_types::{Series, WindowMap};

use crate::error::{Error, Result};

/// Pull the samples of `feature` out of the windows of `env`.
///
/// When several windows share the title, the first in document order wins
/// and a warning lists the ignored ones.
pub fn extract(windows: &WindowMap, feature: &str, env: &str) -> Result<Series> {
    let mut matches = windows.titled(feature);

    let Some((window_id, window)) = matches.next() else {
        return Err(Error::FeatureNotFound {
            feature: feature.to_string(),
            env: env.to_string(),
        });
    };

    let ignored: Vec<&str> = matches.map(|(id, _)| id).collect();
    if !ignored.is_empty() {
        warn!(
            "environment {} has {} more windows titled '{}' ({}), using {}",
            env,
            ignored.len(),
            feature,
            ignored.join(", "),
            window_id
        );
    }

    let malformed = |what: &str| {
        Error::MalformedResponse(format!(
            "window '{}' ('{}') in environment '{}' {}",
            window_id, feature, env, what
        ))
    };

    let traces = window.traces().ok_or_else(|| malformed("has no plot data"))?;

    let trace = match traces {
        [trace] => trace,
        [] => return Err(malformed("has an empty data list")),
        _ => {
            return Err(Error::AmbiguousSeries {
                feature: feature.to_string(),
                env: env.to_string(),
                window: window_id.to_string(),
                traces: traces.len(),
            })
        }
    };

    let x = trace.x.clone().ok_or_else(|| malformed("has no x samples"))?;
    let y = trace.y.clone().ok_or_else(|| malformed("has no y samples"))?;
    let series = Series::new(x, y).map_err(|e| malformed(&e.to_string()))?;

    debug!(
        "extracted {} samples of '{}' from {} (window {})",
        series.len(),
        feature,
        env,
        window_id
    );
    Ok(series)
}
