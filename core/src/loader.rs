//! Data loading with per-session memoisation.
//!
//! RULE: a table is read from disk at most once per (path, file stamp).
//! A cache entry is reused only while the file's modification time and
//! length still match what was recorded when it was read. Any change
//! invalidates the entry and the next request re-reads the file.

use crate::{
    error::{ExplorerError, ExplorerResult},
    table::Table,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// The two required tables and the optional operating-points table.
#[derive(Debug, Clone)]
pub struct DataTables {
    pub raw:              Arc<Table>,
    pub scored:           Arc<Table>,
    pub operating_points: Option<Arc<Table>>,
}

/// What the cache remembers about a file to decide whether it changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: Option<SystemTime>,
    pub len:      u64,
}

impl FileStamp {
    /// `Ok(None)` when the file does not exist.
    pub fn of(path: &Path) -> ExplorerResult<Option<Self>> {
        match std::fs::metadata(path) {
            Ok(meta) => Ok(Some(Self {
                modified: meta.modified().ok(),
                len:      meta.len(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    stamp:     FileStamp,
    table:     Arc<Table>,
    loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits:   u64,
    pub misses: u64,
}

/// Tables keyed by the path they were read from.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<PathBuf, CacheEntry>,
    stats:   CacheStats,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, reading it if absent or stale.
    /// `Ok(None)` when the file does not exist; any stale entry is dropped.
    pub fn get_or_load(&mut self, path: &Path) -> ExplorerResult<Option<Arc<Table>>> {
        let Some(stamp) = FileStamp::of(path)? else {
            self.entries.remove(path);
            return Ok(None);
        };

        if let Some(entry) = self.entries.get(path) {
            if entry.stamp == stamp {
                self.stats.hits += 1;
                return Ok(Some(Arc::clone(&entry.table)));
            }
            log::debug!("loader: {} changed on disk, re-reading", path.display());
        }

        let table = Arc::new(Table::from_path(path)?);
        self.stats.misses += 1;
        log::info!(
            "loader: read {} ({} rows, {} columns)",
            path.display(),
            table.len(),
            table.columns.len()
        );
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                stamp,
                table: Arc::clone(&table),
                loaded_at: Utc::now(),
            },
        );
        Ok(Some(table))
    }

    /// When `path` was last read from disk, if it is cached.
    pub fn loaded_at(&self, path: &Path) -> Option<DateTime<Utc>> {
        self.entries.get(path).map(|e| e.loaded_at)
    }

    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads the explorer's input files through a [`TableCache`].
#[derive(Debug, Default)]
pub struct DataLoader {
    cache: TableCache,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A missing file is fatal: `ExplorerError::MissingFile`.
    pub fn load_required(&mut self, path: &Path) -> ExplorerResult<Arc<Table>> {
        self.cache
            .get_or_load(path)?
            .ok_or_else(|| ExplorerError::MissingFile {
                path: path.to_path_buf(),
            })
    }

    /// Load the raw and scored tables. Either one missing aborts the load.
    pub fn load_data(&mut self, raw: &Path, scored: &Path) -> ExplorerResult<(Arc<Table>, Arc<Table>)> {
        let raw = self.load_required(raw)?;
        let scored = self.load_required(scored)?;
        Ok((raw, scored))
    }

    /// A missing operating-points file is not an error.
    pub fn load_operating_points(&mut self, path: &Path) -> ExplorerResult<Option<Arc<Table>>> {
        let table = self.cache.get_or_load(path)?;
        if table.is_none() {
            log::info!("loader: no operating points table at {}", path.display());
        }
        Ok(table)
    }

    /// All three inputs in one go.
    pub fn load_all(
        &mut self,
        raw: &Path,
        scored: &Path,
        operating_points: &Path,
    ) -> ExplorerResult<DataTables> {
        let (raw, scored) = self.load_data(raw, scored)?;
        let operating_points = self.load_operating_points(operating_points)?;
        Ok(DataTables { raw, scored, operating_points })
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TableCache {
        &mut self.cache
    }
}
