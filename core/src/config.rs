use crate::types::DEFAULT_THRESHOLD;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the optional override file inside the root directory.
pub const CONFIG_FILE: &str = "explorer.json";

/// Exact column names tried first, in order, when looking for the
/// probability column.
pub const PROBABILITY_CANDIDATES: [&str; 6] = [
    "proba",
    "y_proba",
    "y_proba_calibrated",
    "y_proba_xgb_calibrated",
    "churn_proba",
    "pred_proba",
];

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Directory every relative path below is resolved against.
    #[serde(skip)]
    pub root: PathBuf,
    pub raw_path: PathBuf,
    pub scored_path: PathBuf,
    /// Threshold comparison table. Optional at runtime.
    pub operating_points_path: PathBuf,
    pub default_threshold: f64,
    /// Rows shown in the raw and scored overview tables.
    pub preview_rows: usize,
    /// Rows shown in the risk-ranked table.
    pub top_n: usize,
    pub probability_candidates: Vec<String>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            raw_path: PathBuf::from("data/telco_churn.csv"),
            scored_path: PathBuf::from("outputs/scored/scored_test_calibrated.csv"),
            operating_points_path: PathBuf::from("outputs/tables/threshold_compare.csv"),
            default_threshold: DEFAULT_THRESHOLD,
            preview_rows: 10,
            top_n: 25,
            probability_candidates: PROBABILITY_CANDIDATES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl ExplorerConfig {
    /// Load from `root/explorer.json` if it exists, else the built-in
    /// defaults. Keys missing from the file keep their defaults.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let path = root.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
            let parsed: ExplorerConfig = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
            log::info!("config: loaded overrides from {}", path.display());
            parsed
        } else {
            log::debug!("config: {} not present, using defaults", path.display());
            ExplorerConfig::default()
        };
        config.root = root.to_path_buf();
        Ok(config)
    }

    /// Config rooted at `root` with hardcoded defaults, for tests.
    pub fn default_test(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Self::default()
        }
    }

    pub fn raw_file(&self) -> PathBuf {
        self.root.join(&self.raw_path)
    }

    pub fn scored_file(&self) -> PathBuf {
        self.root.join(&self.scored_path)
    }

    pub fn operating_points_file(&self) -> PathBuf {
        self.root.join(&self.operating_points_path)
    }
}
