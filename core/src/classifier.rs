//! Threshold classification of scored customers.
//!
//! A customer is `ChurnRisk` when its probability is >= the threshold
//! (inclusive), `Safe` otherwise. Missing probabilities are never flagged.
//! The source table is never touched: labels go onto a private copy.

use crate::{
    error::{ExplorerError, ExplorerResult},
    table::Table,
    types::Threshold,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived column holding a copy of the resolved probability.
pub const PROBA_COLUMN: &str = "churn_proba";
/// Derived column holding the label.
pub const FLAG_COLUMN: &str = "churn_flag";

/// Cell values read as "no probability".
const MISSING_MARKERS: [&str; 6] = ["", "nan", "na", "n/a", "null", "none"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "Churn risk")]
    ChurnRisk,
    #[serde(rename = "Safe")]
    Safe,
}

impl RiskLabel {
    pub fn for_score(score: Option<f64>, threshold: Threshold) -> Self {
        match score {
            Some(p) if p >= threshold.value() => RiskLabel::ChurnRisk,
            _ => RiskLabel::Safe,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLabel::ChurnRisk => "Churn risk",
            RiskLabel::Safe      => "Safe",
        }
    }

    pub fn is_flagged(self) -> bool {
        self == RiskLabel::ChurnRisk
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate counts for one threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskSummary {
    pub threshold:    Threshold,
    pub flagged:      usize,
    pub safe:         usize,
    pub total:        usize,
    /// `None` when the table has no rows.
    pub flagged_pct:  Option<f64>,
    /// Rows whose probability lies outside [0, 1]. Reported, not rejected.
    pub out_of_range: usize,
}

impl RiskSummary {
    /// e.g. `6 / 100 (6.0%)`, or `0 / 0 (n/a)` for an empty table.
    pub fn headline(&self) -> String {
        match self.flagged_pct {
            Some(pct) => format!("{} / {} ({pct:.1}%)", self.flagged, self.total),
            None      => format!("{} / {} (n/a)", self.flagged, self.total),
        }
    }
}

/// The scored table with `churn_proba` and `churn_flag` attached.
#[derive(Debug, Clone)]
pub struct ClassifiedTable {
    pub table:              Table,
    pub probability_column: String,
    pub threshold:          Threshold,
    pub scores:             Vec<Option<f64>>,
    pub labels:             Vec<RiskLabel>,
}

impl ClassifiedTable {
    pub fn summary(&self) -> RiskSummary {
        let total = self.labels.len();
        let flagged = self.labels.iter().filter(|l| l.is_flagged()).count();
        let flagged_pct = (total > 0).then(|| flagged as f64 / total as f64 * 100.0);
        let out_of_range = self
            .scores
            .iter()
            .flatten()
            .filter(|p| !(0.0..=1.0).contains(*p))
            .count();

        RiskSummary {
            threshold: self.threshold,
            flagged,
            safe: total - flagged,
            total,
            flagged_pct,
            out_of_range,
        }
    }

    /// Row indices ordered by probability, highest first. Stable: equal
    /// scores keep table order. Missing scores go last.
    pub fn ranked_indices(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.scores.len()).collect();
        order.sort_by(|&a, &b| match (self.scores[a], self.scores[b]) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
            (Some(_), None)    => std::cmp::Ordering::Less,
            (None, Some(_))    => std::cmp::Ordering::Greater,
            (None, None)       => std::cmp::Ordering::Equal,
        });
        order
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbabilityCell {
    Missing,
    Value(f64),
    Invalid,
}

/// Interpret one probability cell.
pub fn parse_probability(cell: &str) -> ProbabilityCell {
    let trimmed = cell.trim();
    if MISSING_MARKERS.contains(&trimmed.to_ascii_lowercase().as_str()) {
        return ProbabilityCell::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_nan() => ProbabilityCell::Missing,
        Ok(v)               => ProbabilityCell::Value(v),
        Err(_)              => ProbabilityCell::Invalid,
    }
}

pub fn classify(
    scored: &Table,
    probability_column: &str,
    threshold: Threshold,
) -> ExplorerResult<ClassifiedTable> {
    let cells = scored.column_values(probability_column)?;

    let mut scores = Vec::with_capacity(cells.len());
    for (row, cell) in cells.iter().enumerate() {
        let score = match parse_probability(cell) {
            ProbabilityCell::Missing  => None,
            ProbabilityCell::Value(v) => Some(v),
            ProbabilityCell::Invalid  => {
                return Err(ExplorerError::NonNumericProbability {
                    column: probability_column.to_string(),
                    row,
                    value: cell.to_string(),
                })
            }
        };
        scores.push(score);
    }

    let labels: Vec<RiskLabel> = scores
        .iter()
        .map(|s| RiskLabel::for_score(*s, threshold))
        .collect();

    let proba_cells: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
    let mut table = scored.clone();
    table.set_column(PROBA_COLUMN, proba_cells);
    table.set_column(
        FLAG_COLUMN,
        labels.iter().map(|l| l.as_str().to_string()).collect(),
    );

    let classified = ClassifiedTable {
        table,
        probability_column: probability_column.to_string(),
        threshold,
        scores,
        labels,
    };

    let summary = classified.summary();
    if summary.out_of_range > 0 {
        log::warn!(
            "classifier: {} values in '{probability_column}' fall outside [0, 1]",
            summary.out_of_range
        );
    }
    log::debug!(
        "classifier: threshold={threshold} flagged={}",
        summary.headline()
    );

    Ok(classified)
}
