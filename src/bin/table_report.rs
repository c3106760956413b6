//! Loads a local CSV through the same typed-table path the dashboard uses
//! and prints a column summary, a preview, and the content fingerprint.
//! Handy for checking how a file will type before uploading it.

use std::env;

use cpdash::config::Config;
use cpdash::table::{Column, Table};

fn main() {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "data/sample.csv".to_string());
    let cfg = Config::from_env();

    let table = match Table::from_csv_path(path.as_ref()) {
        Ok(t) => t,
        Err(err) => {
            eprintln!("failed to load {}: {}", path, err);
            std::process::exit(1);
        }
    };

    println!("{}: {} rows x {} cols", path, table.n_rows(), table.n_cols());
    println!("fingerprint: {}", table.fingerprint());
    println!();

    for column in table.columns() {
        match column {
            Column::Numeric { name, .. } => {
                println!("  {:<24} numeric  ({} nulls)", name, column.null_count());
            }
            Column::Categorical { name, .. } => {
                println!(
                    "  {:<24} text     ({} nulls, {} distinct)",
                    name,
                    column.null_count(),
                    column.observed_values().len()
                );
            }
        }
    }

    println!();
    println!("head:");
    println!("  {}", table.column_names().join(", "));
    for row in table.head(cfg.preview_rows) {
        println!("  {}", row.join(", "));
    }
}
