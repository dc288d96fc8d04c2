//! # visdump
//!
//! Export and plot experiment metrics stored on a Visdom server.
//!
//! Experiments log their curves to Visdom environments, one environment per
//! run. Runs of the same configuration share a base name (`resnet_lr0.1_seed0`,
//! `resnet_lr0.1_seed1`, ...). This crate finds those environments, pulls one
//! named curve out of each, and turns the collection into CSV files, summary
//! statistics or a plot.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────┐   ┌─────────┐   ┌───────────┐   ┌──────────┐
//! │ MetricSource │──▶│ locate  │──▶│ extract │──▶│ aggregate │──▶│  report  │
//! │ (Visdom)     │   │ (envs)  │   │ (series)│   │ (concat / │   │  export  │
//! └──────────────┘   └─────────┘   └─────────┘   │  per run) │   └──────────┘
//!                                                 └───────────┘
//! ```
//!
//! - **[`source`]**: the [`MetricSource`] trait, implemented for
//!   [`visdump_client::VisdomClient`]
//! - **[`locate`]**: substring matching over environment ids
//! - **[`extract`]**: picks the `(x, y)` series of a titled window
//! - **[`pipeline`]**: ties the three together into [`RunGroup`]s
//! - **[`aggregate`]**: concatenation and per-run views of a group
//! - **[`report`]**: max/min statistics across runs
//! - **[`export`]**: CSV files, serializable figures and rendered plots
//! - **[`config`]**: layered [`Settings`] (file, environment, defaults)
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # List environments whose id contains "resnet"
//! visdump ls resnet
//!
//! # One CSV per environment
//! visdump csv --feature-name test_acc --env-base-name resnet_lr0.1
//!
//! # Compare two configurations
//! visdump plot --feature-names test_acc \
//!     --env-base-names resnet_lr0.1 resnet_lr0.01 --output acc.png
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use visdump::{collect_run_group, summarize_group, AggregateConfig, Axis};
//! use visdump_client::VisdomClient;
//!
//! # async fn run() -> visdump::Result<()> {
//! let client = VisdomClient::builder().port(8097).build()?;
//! let group = collect_run_group(&client, "resnet_lr0.1", "test_acc").await?;
//! let summary = summarize_group(&group, "resnet", Axis::Y, &AggregateConfig::default())?;
//! println!("{}", summary);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod locate;
pub mod pipeline;
pub mod report;
pub mod source;

pub use aggregate::{concat, per_run, AggregateConfig};
pub use self::config::{PlotSettings, Settings, VisdomSettings};
pub use error::{Error, Result};
pub use export::{
    build_figure, export_group, render, AxisRange, CsvConfig, Figure, PlotConfig, RenderOptions,
};
pub use extract::extract;
pub use locate::{filter_environments, list_environments, Matches};
pub use pipeline::{collect_all, collect_base, collect_run_group, BaseGroups};
pub use report::{summarize, summarize_group, ExtremaStats, Summary};
pub use source::MetricSource;
pub use visdump_types::{Axis, Run, RunGroup, Series};
