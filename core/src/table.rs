//! In-memory tabular data read from CSV.
//!
//! Cells are kept as the source text. Numeric interpretation happens only
//! where a module needs it (the probability column), so a table written
//! back out carries exactly the values it was read with.

use crate::error::{ExplorerError, ExplorerResult};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows:    Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Parse a CSV stream with a header row. Ragged rows are an error.
    pub fn from_reader<R: Read>(reader: R) -> ExplorerResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let columns = rdr.headers()?.iter().map(str::to_string).collect();
        let rows = rdr
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        Ok(Self { columns, rows })
    }

    pub fn from_path(path: &Path) -> ExplorerResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ExplorerError::MissingFile {
                path: path.to_path_buf(),
            },
            _ => ExplorerError::Io(e),
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one column, top to bottom.
    pub fn column_values(&self, name: &str) -> ExplorerResult<Vec<&str>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| ExplorerError::ColumnNotFound {
                column: name.to_string(),
            })?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows:    self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Keep the named columns that exist, in the order requested.
    /// Names absent from the table are skipped.
    pub fn select(&self, names: &[&str]) -> Self {
        let picked: Vec<(usize, &str)> = names
            .iter()
            .filter_map(|n| self.column_index(n).map(|i| (i, *n)))
            .collect();

        Self {
            columns: picked.iter().map(|(_, n)| n.to_string()).collect(),
            rows:    self
                .rows
                .iter()
                .map(|row| picked.iter().map(|(i, _)| row[*i].clone()).collect())
                .collect(),
        }
    }

    /// Set a column to `values`, replacing it in place if it already exists
    /// or appending it otherwise. `values` must have one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len(), "column length mismatch");
        match self.column_index(name) {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
    }

    /// Standard CSV: header row, no index column, UTF-8, `\n` line endings.
    /// The header is written even when there are no rows.
    pub fn to_csv_bytes(&self) -> ExplorerResult<Vec<u8>> {
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.into_inner()
            .map_err(|e| ExplorerError::Io(e.into_error()))
    }
}
