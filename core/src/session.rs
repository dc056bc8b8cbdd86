//! One interactive session of the explorer.
//!
//! A session owns everything that persists between interactions: its
//! config, its table cache and the current threshold. Sessions share
//! nothing. Each interaction runs the whole pipeline again: the loader
//! revalidates its cache (re-reading only changed files) and `render`
//! rebuilds the view from scratch.

use crate::{
    config::ExplorerConfig,
    error::ExplorerResult,
    exporter::RetentionExport,
    loader::{CacheStats, DataLoader, DataTables},
    pipeline::{self, ViewModel},
    types::{SessionId, Threshold},
};

pub struct ExplorerSession {
    pub session_id: SessionId,
    pub config:     ExplorerConfig,
    threshold:      Threshold,
    loader:         DataLoader,
    tables:         DataTables,
}

impl ExplorerSession {
    /// Load the inputs and start at the configured default threshold.
    /// Fails if the raw or scored file is missing.
    pub fn open(config: ExplorerConfig) -> ExplorerResult<Self> {
        let threshold = Threshold::from_slider(config.default_threshold)?;
        let mut loader = DataLoader::new();
        let tables = Self::load(&mut loader, &config)?;
        let session_id = uuid::Uuid::new_v4().to_string();

        log::info!(
            "session={session_id}: opened with {} raw rows, {} scored rows, threshold={threshold}",
            tables.raw.len(),
            tables.scored.len()
        );

        Ok(Self {
            session_id,
            config,
            threshold,
            loader,
            tables,
        })
    }

    fn load(loader: &mut DataLoader, config: &ExplorerConfig) -> ExplorerResult<DataTables> {
        loader.load_all(
            &config.raw_file(),
            &config.scored_file(),
            &config.operating_points_file(),
        )
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Move the threshold control. The value is snapped to the 0.01 step.
    pub fn set_threshold(&mut self, value: f64) -> ExplorerResult<Threshold> {
        self.threshold = Threshold::from_slider(value)?;
        log::debug!("session={}: threshold={}", self.session_id, self.threshold);
        Ok(self.threshold)
    }

    /// Run the pipeline for the current threshold.
    pub fn view(&mut self) -> ExplorerResult<ViewModel> {
        self.refresh()?;
        Ok(pipeline::render(&self.config, &self.tables, self.threshold))
    }

    /// Build the retention attachment for the current threshold.
    pub fn export(&mut self) -> ExplorerResult<Option<RetentionExport>> {
        self.refresh()?;
        pipeline::export(&self.config, &self.tables, self.threshold)
    }

    /// Drop every cached table and read the inputs again.
    pub fn reload(&mut self) -> ExplorerResult<()> {
        self.loader.cache_mut().clear();
        self.refresh()
    }

    pub fn tables(&self) -> &DataTables {
        &self.tables
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.loader.cache().stats()
    }

    fn refresh(&mut self) -> ExplorerResult<()> {
        self.tables = Self::load(&mut self.loader, &self.config)?;
        Ok(())
    }
}
