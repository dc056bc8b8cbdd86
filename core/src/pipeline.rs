//! The dashboard as a pure function of (config, tables, threshold).
//!
//! RULES:
//!   - Every interaction re-runs `render` from the top. Nothing derived is
//!     kept between calls.
//!   - `render` performs no I/O. Loading belongs to the loader and writing
//!     the export to the caller.
//!   - A missing probability column or unreadable probabilities disable the
//!     explorer section only; the overview sections always render.

use crate::{
    classifier::{classify, ClassifiedTable, RiskSummary},
    config::ExplorerConfig,
    exporter::{export_retention, retention_file_name, RetentionExport},
    error::ExplorerResult,
    loader::DataTables,
    presenter,
    resolver::{resolve_probability_column, ColumnResolution, ResolveMethod},
    table::Table,
    types::Threshold,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub threshold:        Threshold,
    pub raw_preview:      Table,
    pub scored_preview:   Table,
    pub operating_points: OperatingPointsSection,
    pub explorer:         ExplorerSection,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperatingPointsSection {
    Available { table: Table },
    Missing { notice: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExplorerSection {
    Ready(RiskPanel),
    ColumnNotFound {
        message:   String,
        available: Vec<String>,
    },
    InvalidProbabilities {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskPanel {
    pub probability_column:  String,
    pub method:              ResolveMethod,
    pub summary:             RiskSummary,
    pub headline:            String,
    pub top:                 Table,
    pub retention_rows:      usize,
    pub retention_file_name: String,
}

/// Outcome of resolving and classifying the scored table.
#[derive(Debug, Clone)]
pub enum Exploration {
    Classified {
        classified: ClassifiedTable,
        method:     ResolveMethod,
    },
    Unavailable(ExplorerSection),
}

/// Resolve the probability column and label every row at `threshold`.
pub fn explore(scored: &Table, candidates: &[String], threshold: Threshold) -> Exploration {
    let (column, method) = match resolve_probability_column(scored, candidates) {
        ColumnResolution::Found { column, method } => (column, method),
        ColumnResolution::NotFound { available } => {
            log::warn!("pipeline: no probability column among {available:?}");
            return Exploration::Unavailable(ExplorerSection::ColumnNotFound {
                message: format!(
                    "Could not find a probability column in the scored table. \
                     Available columns are: {}",
                    available.join(", ")
                ),
                available,
            });
        }
    };

    match classify(scored, &column, threshold) {
        Ok(classified) => Exploration::Classified { classified, method },
        Err(e) => {
            log::warn!("pipeline: cannot classify on '{column}': {e}");
            Exploration::Unavailable(ExplorerSection::InvalidProbabilities {
                message: e.to_string(),
            })
        }
    }
}

/// `At threshold 0.06, 6 / 100 customers (6.0%) are flagged as churn-risk.`
pub fn headline(summary: &RiskSummary) -> String {
    let pct = match summary.flagged_pct {
        Some(p) => format!("{p:.1}%"),
        None    => "n/a".to_string(),
    };
    format!(
        "At threshold {}, {} / {} customers ({pct}) are flagged as churn-risk.",
        summary.threshold, summary.flagged, summary.total
    )
}

pub fn render(config: &ExplorerConfig, tables: &DataTables, threshold: Threshold) -> ViewModel {
    let operating_points = match &tables.operating_points {
        Some(table) => OperatingPointsSection::Available {
            table: presenter::operating_points_view(table),
        },
        None => OperatingPointsSection::Missing {
            notice: format!(
                "Threshold comparison table not found at `{}`.",
                config.operating_points_path.display()
            ),
        },
    };

    let explorer = match explore(&tables.scored, &config.probability_candidates, threshold) {
        Exploration::Classified { classified, method } => {
            let summary = classified.summary();
            let retention_rows = summary.flagged;
            ExplorerSection::Ready(RiskPanel {
                probability_column: classified.probability_column.clone(),
                method,
                headline: headline(&summary),
                summary,
                top: presenter::top_risk(&classified, config.top_n),
                retention_rows,
                retention_file_name: retention_file_name(threshold),
            })
        }
        Exploration::Unavailable(section) => section,
    };

    ViewModel {
        threshold,
        raw_preview: presenter::preview(&tables.raw, config.preview_rows),
        scored_preview: presenter::preview(&tables.scored, config.preview_rows),
        operating_points,
        explorer,
    }
}

/// Build the retention attachment for `threshold`. `Ok(None)` when the
/// explorer section is unavailable for this data.
pub fn export(
    config: &ExplorerConfig,
    tables: &DataTables,
    threshold: Threshold,
) -> ExplorerResult<Option<RetentionExport>> {
    match explore(&tables.scored, &config.probability_candidates, threshold) {
        Exploration::Classified { classified, .. } => Ok(Some(export_retention(&classified)?)),
        Exploration::Unavailable(_) => Ok(None),
    }
}
