use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::model::Dataset;
use crate::error::{Error, Result};

/// Write a dataset as CSV: one header row, no index column, missing cells
/// left empty.
///
/// The table goes to `<path>.tmp` first and is renamed into place, so `path`
/// either holds the complete table or is left untouched.
pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let staging = staging_path(path);
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let written = fs::File::create(&staging)
        .map_err(io_error)
        .and_then(|file| {
            write_csv_to(dataset, file).map_err(|source| Error::Csv {
                path: path.to_path_buf(),
                source,
            })
        })
        .and_then(|()| fs::rename(&staging, path).map_err(io_error));
    if let Err(e) = written {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }

    log::info!(
        "Wrote {} rows x {} columns to {}",
        dataset.len(),
        dataset.width(),
        path.display()
    );
    Ok(())
}

/// Same as [`write_csv`] but into any writer.
pub fn write_csv_to<W: Write>(dataset: &Dataset, out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    if dataset.width() == 0 {
        writer.flush()?;
        return Ok(());
    }

    writer.write_record(dataset.column_names())?;
    for row in 0..dataset.len() {
        writer.write_record(dataset.columns().iter().map(|c| format_cell(c.values[row])))?;
    }
    writer.flush()?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn format_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}
