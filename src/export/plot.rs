//! Rendering a [`Figure`] to an image file with plotters.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use super::figure::Figure;
use crate::error::{Error, Result};

/// Output encoding, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Raster image; the encoder follows the extension (png, jpg, bmp, ...).
    Bitmap,
    Svg,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => ImageFormat::Svg,
            _ => ImageFormat::Bitmap,
        }
    }
}

/// Image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

/// Draw `figure` to `path`, overwriting any existing file.
pub fn render(figure: &Figure, path: &Path, options: &RenderOptions) -> Result<()> {
    let size = (options.width, options.height);

    let result = match ImageFormat::from_path(path) {
        ImageFormat::Svg => draw(SVGBackend::new(path, size).into_drawing_area(), figure),
        ImageFormat::Bitmap => draw(BitMapBackend::new(path, size).into_drawing_area(), figure),
    };
    result.map_err(Error::Render)?;

    info!(
        "rendered {} lines to {} ({}x{})",
        figure.lines.len(),
        path.display(),
        options.width,
        options.height
    );
    Ok(())
}

fn draw<DB>(
    root: DrawingArea<DB, Shift>,
    figure: &Figure,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let (x_range, y_range) = figure.axis_bounds();

    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(60);
    if !figure.title.is_empty() {
        builder.caption(&figure.title, ("sans-serif", 26));
    }
    let mut chart = builder.build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .label_style(("sans-serif", 15))
        .draw()?;

    for (i, line) in figure.lines.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        let band = line.band();

        if !band.is_empty() {
            let mut outline: Vec<(f64, f64)> = band.iter().map(|p| (p.x, p.upper)).collect();
            outline.extend(band.iter().rev().map(|p| (p.x, p.lower)));
            chart.draw_series(std::iter::once(Polygon::new(
                outline,
                color.mix(0.2).filled(),
            )))?;
        }

        chart
            .draw_series(LineSeries::new(
                band.iter().map(|p| (p.x, p.mean)),
                color.stroke_width(2),
            ))?
            .label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if !figure.lines.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::figure::{AxisRange, Line, FIGURE_VERSION};
    use tempfile::TempDir;

    fn fonts_available() -> bool {
        let available = ("sans-serif", 15).into_font().layout_box("0").is_ok();
        if !available {
            eprintln!("no sans-serif font on this host, skipping drawing");
        }
        available
    }

    fn figure(lines: Vec<Line>) -> Figure {
        Figure {
            version: FIGURE_VERSION,
            title: "MNIST".to_string(),
            x_label: "epoch".to_string(),
            y_label: "test-accuracy".to_string(),
            x_range: Some(AxisRange::new(0.0, 10.0).unwrap()),
            y_range: Some(AxisRange::new(0.0, 1.0).unwrap()),
            lines,
        }
    }

    fn two_runs() -> Line {
        Line {
            label: "lr0.1".to_string(),
            x: vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0],
            y: vec![0.2, 0.5, 0.7, 0.4, 0.6, f64::NAN],
        }
    }

    #[test]
    fn test_render_svg_overwrites() {
        if !fonts_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acc.svg");
        std::fs::write(&path, "stale").unwrap();

        let fig = figure(vec![two_runs()]);
        render(&fig, &path, &RenderOptions::default()).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        assert!(first.contains("<svg"));
        assert!(!first.starts_with("stale"));
        assert!(first.contains("lr0.1"));

        render(&fig, &path, &RenderOptions::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn test_render_figure_without_lines() {
        if !fonts_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.svg");

        render(&figure(Vec::new()), &path, &RenderOptions::default()).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_render_bitmap() {
        if !fonts_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acc.png");
        let options = RenderOptions {
            width: 320,
            height: 240,
        };

        render(&figure(vec![two_runs()]), &path, &options).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ImageFormat::from_path(Path::new("out.png")), ImageFormat::Bitmap);
        assert_eq!(ImageFormat::from_path(Path::new("out.SVG")), ImageFormat::Svg);
        assert_eq!(ImageFormat::from_path(Path::new("plots/out.svg")), ImageFormat::Svg);
        assert_eq!(ImageFormat::from_path(Path::new("out")), ImageFormat::Bitmap);
    }

    #[test]
    fn test_default_size() {
        let options = RenderOptions::default();
        assert_eq!((options.width, options.height), (1024, 768));
    }
}
