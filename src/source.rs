//! Metric source abstraction.
//!
//! The pipeline only needs two things from a server: the list of
//! environment ids and the windows of one environment. [`MetricSource`]
//! captures that so the locate/extract steps can run against anything that
//! answers those two questions.

use std::fmt::Debug;

use async_trait::async_trait;
use visdump_client::VisdomClient;
use visdump_types::WindowMap;

use crate::error::Result;

/// Something that can list environments and hand out their windows.
#[async_trait]
pub trait MetricSource: Send + Sync + Debug {
    /// All environment ids, in the order the source lists them.
    async fn environments(&self) -> Result<Vec<String>>;

    /// All windows of one environment.
    async fn window_data(&self, env: &str) -> Result<WindowMap>;

    /// Human-readable description, used in log lines.
    fn description(&self) -> &str;
}

#[async_trait]
impl MetricSource for VisdomClient {
    async fn environments(&self) -> Result<Vec<String>> {
        Ok(self.env_list().await?)
    }

    async fn window_data(&self, env: &str) -> Result<WindowMap> {
        Ok(VisdomClient::window_data(self, env).await?)
    }

    fn description(&self) -> &str {
        self.endpoint()
    }
}
