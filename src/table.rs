//! In-memory tabular dataset.
//!
//! A `Table` is built once per dataset load from CSV bytes and then treated
//! as immutable: columns keep header order, and each column is typed by a
//! whole-column parse (numeric when every non-empty cell parses as a float,
//! categorical otherwise). Empty cells are nulls in both cases.
//!
//! Parse failures return the parser's message; the caller converts that into
//! the dataset-load error contract. A failed parse never yields a partial
//! table.

use rand::seq::index::sample;
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Num(f64),
    Text(String),
    Null,
}

impl Cell {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Cell::Num(v) => serde_json::json!(v),
            Cell::Text(s) => serde_json::Value::String(s.clone()),
            Cell::Null => serde_json::Value::Null,
        }
    }

    /// Display form for preview grids. Whole floats render without the
    /// trailing ".0" so integer-ish CSV columns read back as written.
    pub fn render(&self) -> String {
        match self {
            Cell::Num(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    format!("{}", *v as i64)
                } else {
                    format!("{}", v)
                }
            }
            Cell::Text(s) => s.clone(),
            Cell::Null => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric { name: String, values: Vec<Option<f64>> },
    Categorical { name: String, values: Vec<Option<String>> },
}

impl Column {
    pub fn name(&self) -> &str {
        match self {
            Column::Numeric { name, .. } | Column::Categorical { name, .. } => name,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric { values, .. } => values.len(),
            Column::Categorical { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric { .. })
    }

    pub fn null_count(&self) -> usize {
        match self {
            Column::Numeric { values, .. } => values.iter().filter(|v| v.is_none()).count(),
            Column::Categorical { values, .. } => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    pub fn cell(&self, idx: usize) -> Cell {
        match self {
            Column::Numeric { values, .. } => match values.get(idx) {
                Some(Some(v)) => Cell::Num(*v),
                _ => Cell::Null,
            },
            Column::Categorical { values, .. } => match values.get(idx) {
                Some(Some(s)) => Cell::Text(s.clone()),
                _ => Cell::Null,
            },
        }
    }

    pub fn numeric_values(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Numeric { values, .. } => Some(values),
            Column::Categorical { .. } => None,
        }
    }

    /// Distinct non-null values in first-seen order. For categorical columns
    /// this is the choice list offered when editing a prediction field.
    pub fn observed_values(&self) -> Vec<String> {
        let mut seen = Vec::new();
        let n = self.len();
        for idx in 0..n {
            let rendered = match self.cell(idx) {
                Cell::Null => continue,
                cell => cell.render(),
            };
            if !seen.contains(&rendered) {
                seen.push(rendered);
            }
        }
        seen
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Zero rows, zero columns.
    pub fn empty() -> Self {
        Table::default()
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// One row as ordered (column name, cell) pairs.
    pub fn row(&self, idx: usize) -> Option<Vec<(String, Cell)>> {
        if idx >= self.rows {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| (c.name().to_string(), c.cell(idx)))
                .collect(),
        )
    }

    /// First `n` rows rendered for a preview grid.
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        let take = n.min(self.rows);
        (0..take)
            .map(|idx| self.columns.iter().map(|c| c.cell(idx).render()).collect())
            .collect()
    }

    /// Up to `n` distinct random row indices, in draw order. Short tables
    /// clamp to their row count instead of failing.
    pub fn sample_rows(&self, n: usize) -> Vec<usize> {
        let amount = n.min(self.rows);
        if amount == 0 {
            return Vec::new();
        }
        let mut rng = rand::thread_rng();
        sample(&mut rng, self.rows, amount).into_vec()
    }

    /// Content hash over the typed cell grid. Two loads of an unchanged
    /// backing file hash identically, so reload detection and the
    /// idempotence check need no raw bytes around.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for col in &self.columns {
            hasher.update(col.name().as_bytes());
            hasher.update([if col.is_numeric() { b'n' } else { b'c' }, 0x1f]);
        }
        for idx in 0..self.rows {
            for col in &self.columns {
                match col.cell(idx) {
                    Cell::Num(v) => hasher.update(format!("{:?}", v).as_bytes()),
                    Cell::Text(s) => hasher.update(s.as_bytes()),
                    Cell::Null => hasher.update([0x00]),
                }
                hasher.update([0x1f]);
            }
            hasher.update([0x1e]);
        }
        hex::encode(hasher.finalize())
    }

    pub fn from_csv_str(text: &str) -> Result<Self, String> {
        Self::from_csv_bytes(text.as_bytes())
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
        Self::from_csv_bytes(&bytes)
    }

    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| e.to_string())?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut grid: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| e.to_string())?;
            grid.push(record.iter().map(|f| f.to_string()).collect());
        }

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) && grid.is_empty() {
            return Ok(Table::empty());
        }

        let rows = grid.len();
        let columns = headers
            .iter()
            .enumerate()
            .map(|(j, name)| build_column(name, &grid, j))
            .collect();

        Ok(Table { columns, rows })
    }
}

fn build_column(name: &str, grid: &[Vec<String>], j: usize) -> Column {
    let raw: Vec<&str> = grid.iter().map(|row| row[j].as_str()).collect();
    let numeric = raw
        .iter()
        .filter(|v| !v.is_empty())
        .all(|v| v.parse::<f64>().is_ok());

    if numeric {
        Column::Numeric {
            name: name.to_string(),
            values: raw
                .iter()
                .map(|v| if v.is_empty() { None } else { v.parse::<f64>().ok() })
                .collect(),
        }
    } else {
        Column::Categorical {
            name: name.to_string(),
            values: raw
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        None
                    } else {
                        Some(v.to_string())
                    }
                })
                .collect(),
        }
    }
}
