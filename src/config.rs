//! Layered settings: defaults, optional config file, environment.
//!
//! ```toml
//! [visdom]
//! url = "http://localhost"
//! port = 8097
//! base_url = "/"
//! timeout_secs = 10
//!
//! [plot]
//! x_label = "epoch"
//! y_label = "test-accuracy"
//! width = 1024
//! height = 768
//! ```
//!
//! Environment variables use the `VISDUMP` prefix with `__` between
//! sections, e.g. `VISDUMP_VISDOM__PORT=8098`. Command-line flags override
//! both.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use visdump_client::{DEFAULT_PORT, DEFAULT_SERVER};

use crate::export::RenderOptions;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_NAME: &str = "visdump";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub visdom: VisdomSettings,
    pub plot: PlotSettings,
}

/// Where the Visdom server lives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisdomSettings {
    pub url: String,
    pub port: u16,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for VisdomSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER.to_string(),
            port: DEFAULT_PORT,
            base_url: "/".to_string(),
            timeout_secs: 10,
        }
    }
}

impl VisdomSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Default plot labels and image size.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotSettings {
    fn default() -> Self {
        let size = RenderOptions::default();
        Self {
            x_label: "epoch".to_string(),
            y_label: "test-accuracy".to_string(),
            width: size.width,
            height: size.height,
        }
    }
}

impl PlotSettings {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            width: self.width,
            height: self.height,
        }
    }
}

impl Settings {
    /// Load settings from `path` (required to exist) or, without a path,
    /// from an optional `visdump.*` file in the working directory, then
    /// apply `VISDUMP_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("VISDUMP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.visdom.url, "http://localhost");
        assert_eq!(settings.visdom.port, 8097);
        assert_eq!(settings.visdom.timeout(), Duration::from_secs(10));
        assert_eq!(settings.plot.x_label, "epoch");
        assert_eq!(settings.plot.y_label, "test-accuracy");
        assert_eq!(settings.plot.render_options(), RenderOptions::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[visdom]
url = "http://vis.lab"
port = 9000

[plot]
y_label = "loss"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.visdom.url, "http://vis.lab");
        assert_eq!(settings.visdom.port, 9000);
        assert_eq!(settings.visdom.base_url, "/");
        assert_eq!(settings.plot.y_label, "loss");
        assert_eq!(settings.plot.x_label, "epoch");
        assert_eq!(settings.plot.width, 1024);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[visdom]\ntimeout_secs = 5\n").unwrap();

        // Only keys no other test asserts on, since the environment is shared.
        std::env::set_var("VISDUMP_VISDOM__TIMEOUT_SECS", "42");
        std::env::set_var("VISDUMP_PLOT__HEIGHT", "600");
        let settings = Settings::load(Some(file.path()));
        std::env::remove_var("VISDUMP_VISDOM__TIMEOUT_SECS");
        std::env::remove_var("VISDUMP_PLOT__HEIGHT");

        let settings = settings.unwrap();
        assert_eq!(settings.visdom.timeout_secs, 42);
        assert_eq!(settings.plot.height, 600);
        assert_eq!(settings.visdom.port, 8097);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("toml");
        drop(file);
        assert!(Settings::load(Some(&path)).is_err());
    }
}
