//! CSV export, one file per environment.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;
use visdump_types::{RunGroup, Series};

use crate::error::{Error, Result};

/// Where and how CSV files are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvConfig {
    /// Directory the files are written to.
    pub out_dir: PathBuf,
    /// Appended to the environment id to form the file name.
    pub suffix: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            suffix: ".csv".to_string(),
        }
    }
}

impl CsvConfig {
    /// File path for an environment.
    pub fn path_for(&self, env: &str) -> PathBuf {
        self.out_dir.join(format!("{}{}", env, self.suffix))
    }
}

/// Write every run of `group` to `<env><suffix>`. Existing files are
/// overwritten. Returns the written paths in run order.
pub fn export_group(group: &RunGroup, config: &CsvConfig) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(group.len());
    for run in group.iter() {
        let path = config.path_for(&run.env);
        write_series(&run.series, &path)?;
        info!("wrote {} rows to {}", run.series.len(), path.display());
        written.push(path);
    }
    Ok(written)
}

/// Write one series as an `x,y` table.
pub fn write_series(series: &Series, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);
    write_rows(series, &mut writer)?;
    writer.flush().map_err(|e| Error::io(path, e))
}

fn write_rows<W: Write>(series: &Series, writer: &mut csv::Writer<W>) -> Result<()> {
    writer.write_record(["x", "y"])?;
    for (x, y) in series.points() {
        writer.write_record([x.to_string(), y.to_string()])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn series() -> Series {
        Series::new(vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]).unwrap()
    }

    #[test]
    fn test_write_series_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("envA.csv");
        write_series(&series(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "x,y\n1,4\n2,5\n3,6\n");
    }

    #[test]
    fn test_fractional_and_nan_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.csv");
        let s = Series::new(vec![0.5, 1.0], vec![0.125, f64::NAN]).unwrap();
        write_series(&s, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "x,y\n0.5,0.125\n1,NaN\n");
    }

    #[test]
    fn test_export_group_names_files_by_env() {
        let dir = TempDir::new().unwrap();
        let config = CsvConfig {
            out_dir: dir.path().to_path_buf(),
            suffix: ".csv".to_string(),
        };

        let mut group = RunGroup::new("env");
        group.push("envA", series());
        group.push("envB", Series::new(vec![0.0], vec![1.0]).unwrap());

        let written = export_group(&group, &config).unwrap();
        assert_eq!(
            written,
            vec![dir.path().join("envA.csv"), dir.path().join("envB.csv")]
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("envB.csv")).unwrap(),
            "x,y\n0,1\n"
        );
    }

    #[test]
    fn test_rerun_overwrites_identically() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("envA_out.csv");
        std::fs::write(&path, "stale content that is longer than the new file\n").unwrap();

        write_series(&series(), &path).unwrap();
        let first = std::fs::read(&path).unwrap();
        write_series(&series(), &path).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, b"x,y\n1,4\n2,5\n3,6\n");
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let err = write_series(&series(), Path::new("/nonexistent/dir/out.csv")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
