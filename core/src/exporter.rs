//! Retention list export.
//!
//! Output is deterministic: the same classified table always produces
//! the same bytes and the same file name.

use crate::{
    classifier::ClassifiedTable,
    error::ExplorerResult,
    presenter::ranked_view,
    table::Table,
    types::Threshold,
};
use std::path::{Path, PathBuf};

pub const RETENTION_MIME: &str = "text/csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionExport {
    pub file_name: String,
    pub rows:      usize,
    pub bytes:     Vec<u8>,
}

impl RetentionExport {
    /// Write the attachment into `dir`, returning the full path.
    pub fn write_to(&self, dir: &Path) -> ExplorerResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        log::info!(
            "exporter: wrote {} customers to {}",
            self.rows,
            path.display()
        );
        Ok(path)
    }
}

/// Every flagged customer, highest probability first, key columns only.
pub fn retention_list(classified: &ClassifiedTable) -> Table {
    ranked_view(classified, |i| classified.labels[i].is_flagged())
}

pub fn retention_file_name(threshold: Threshold) -> String {
    format!("churn_retention_list_thr_{threshold}.csv")
}

pub fn export_retention(classified: &ClassifiedTable) -> ExplorerResult<RetentionExport> {
    let list = retention_list(classified);
    Ok(RetentionExport {
        file_name: retention_file_name(classified.threshold),
        rows:      list.len(),
        bytes:     list.to_csv_bytes()?,
    })
}
