use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use meshstat::data::loader::{dataset_name, load_file};
use meshstat::data::writer::write_csv;
use meshstat::merge::merge;

/// Copy selected columns of several result tables into one CSV.
#[derive(Parser, Debug)]
#[command(name = "merge_columns", version)]
struct Cli {
    /// Result tables (CSV or Parquet)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Columns to copy, as `source:column` where `source` is a file stem
    #[arg(short, long, num_args = 1.., required = true)]
    columns: Vec<String>,

    /// Merged CSV to write
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut datasets = BTreeMap::new();
    for path in &cli.files {
        let dataset = load_file(path).with_context(|| format!("loading {}", path.display()))?;
        let name = dataset_name(path);
        if datasets.insert(name.clone(), dataset).is_some() {
            log::warn!("two inputs named {name}, keeping {}", path.display());
        }
    }

    let merged = merge(&datasets, &cli.columns);
    if merged.width() == 0 {
        log::warn!("none of the requested columns was found, writing an empty table");
    }

    write_csv(&merged, &cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    Ok(())
}
