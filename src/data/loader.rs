use std::fs::File;
use std::path::Path;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::Dataset;
use super::schema::Metric;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a table of arbitrary numeric columns. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one numeric value per cell, empty cell = missing
/// * `.parquet` – any numeric columns, nulls become missing
///
/// The dataset is named after the file stem.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        _ => {
            return Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    log::info!(
        "Loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.width(),
        path.display()
    );
    Ok(dataset)
}

/// Load a benchmark sample table, keeping only the columns of the benchmark
/// schema. Other headers are logged and dropped.
pub fn load_samples(path: &Path) -> Result<Dataset> {
    let dataset = load_file(path)?;
    let is_metric = |name: &str| name.parse::<Metric>().is_ok();

    let extra: Vec<&str> = dataset.column_names().filter(|n| !is_metric(*n)).collect();
    if extra.is_empty() {
        return Ok(dataset);
    }
    log::warn!(
        "{}: ignoring columns outside the benchmark schema: {}",
        path.display(),
        extra.join(", ")
    );
    Ok(dataset.retain_columns(is_metric))
}

/// Identifier a file is referred to by: its stem (`runs/A.csv` → `A`).
pub fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let csv_error = |source| Error::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(csv_error)?;
        for (col_idx, values) in columns.iter_mut().enumerate() {
            let cell = record.get(col_idx).unwrap_or("");
            values.push(parse_cell(cell).ok_or_else(|| Error::Parse {
                path: path.to_path_buf(),
                row: row_no,
                column: headers[col_idx].clone(),
                value: cell.to_string(),
            })?);
        }
    }

    let mut dataset = Dataset::new(dataset_name(path));
    for (name, values) in headers.into_iter().zip(columns) {
        dataset.push_column(name, values)?;
    }
    Ok(dataset)
}

/// Empty cells are missing values; anything else must be a number.
fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(f64::NAN);
    }
    cell.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

fn load_parquet(path: &Path) -> Result<Dataset> {
    let parquet_error = |e: &dyn std::fmt::Display| Error::Parquet {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| parquet_error(&e))?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().map_err(|e| parquet_error(&e))?;

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for batch_result in reader {
        let batch = batch_result.map_err(|e| parquet_error(&e))?;
        for (col_idx, values) in columns.iter_mut().enumerate() {
            let as_f64 = arrow::compute::cast(batch.column(col_idx), &DataType::Float64)
                .map_err(|e| parquet_error(&e))?;
            let array = as_f64.as_primitive::<Float64Type>();
            values.extend((0..array.len()).map(|i| {
                if array.is_null(i) {
                    f64::NAN
                } else {
                    array.value(i)
                }
            }));
        }
    }

    let mut dataset = Dataset::new(dataset_name(path));
    for (name, values) in names.into_iter().zip(columns) {
        dataset.push_column(name, values)?;
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_csv_keeps_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "A.csv", "x,y\n1,10\n2,20\n3,30\n");

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.name, "A");
        assert_eq!(ds.column_names().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(ds.column("x").unwrap().values, vec![1.0, 2.0, 3.0]);
        assert_eq!(ds.column("y").unwrap().values, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_empty_cells_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "gaps.csv", "a,b\n1,\n,4\n");

        let ds = load_file(&path).unwrap();
        let a = &ds.column("a").unwrap().values;
        assert_eq!(a[0], 1.0);
        assert!(a[1].is_nan());
        assert_eq!(ds.column("b").unwrap().present().collect::<Vec<_>>(), vec![4.0]);
    }

    #[test]
    fn test_non_numeric_cell_reports_row_and_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.csv", "a,b\n1,2\n3,oops\n");

        match load_file(&path) {
            Err(Error::Parse { row, column, value, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "b");
                assert_eq!(value, "oops");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        match load_file(&path) {
            Err(Error::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "notes.txt", "a\n1\n");
        assert!(matches!(load_file(&path), Err(Error::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_load_samples_keeps_schema_columns() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(
            dir.path(),
            "frames.csv",
            "gpu_frame_time_elapsed_ns,chunks_in_use\n1000,8\n",
        );
        assert_eq!(load_samples(&good).unwrap().width(), 2);
    }

    #[test]
    fn test_load_samples_drops_columns_outside_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "meshing.csv",
            "gpu_meshing_time_elapsed_ns,real_meshing_time_elapsed_ns,gpu_meshing_setup_time_ns\n\
             3,4,1\n5,6,2\n",
        );

        let ds = load_samples(&path).unwrap();
        assert_eq!(
            ds.column_names().collect::<Vec<_>>(),
            vec!["gpu_meshing_time_elapsed_ns", "real_meshing_time_elapsed_ns"]
        );
        assert_eq!(ds.len(), 2);
        assert_eq!(
            ds.metric(Metric::RealMeshingTimeElapsedNs).unwrap().values,
            vec![4.0, 6.0]
        );
        // generic loading keeps everything
        assert_eq!(load_file(&path).unwrap().width(), 3);
    }

    #[test]
    fn test_load_parquet_casts_to_f64() {
        use std::sync::Arc;

        use arrow::array::{ArrayRef, Float64Array, Int64Array};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.parquet");
        let batch = RecordBatch::try_from_iter(vec![
            ("chunks_in_use", Arc::new(Int64Array::from(vec![8, 8, 9])) as ArrayRef),
            (
                "gpu_frame_time_elapsed_ns",
                Arc::new(Float64Array::from(vec![Some(1.5), None, Some(2.5)])) as ArrayRef,
            ),
        ])
        .unwrap();
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_samples(&path).unwrap();
        assert_eq!(ds.name, "run");
        assert_eq!(ds.column("chunks_in_use").unwrap().values, vec![8.0, 8.0, 9.0]);
        let times = &ds.column("gpu_frame_time_elapsed_ns").unwrap().values;
        assert_eq!(times[0], 1.5);
        assert!(times[1].is_nan());
        assert_eq!(times[2], 2.5);
    }
}
