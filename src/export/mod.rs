//! Output stages: CSV tables, figures and rendered plots.
//!
//! - [`csv`]: one `x,y` file per environment
//! - [`figure`]: the serializable figure model, built from run groups
//! - [`plot`]: drawing a figure to PNG/SVG

pub mod csv;
pub mod figure;
pub mod plot;

pub use self::csv::{export_group, write_series, CsvConfig};
pub use figure::{build_figure, AxisRange, BandPoint, Figure, Line, PlotConfig, FIGURE_VERSION};
pub use plot::{render, ImageFormat, RenderOptions};
