//! Probability column detection for the scored table.
//!
//! Two passes, first match wins in each:
//!   1. exact names from the candidate list, in list order
//!   2. any column whose lowercased name contains "proba" or "prob",
//!      in table order

use crate::table::Table;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMethod {
    Exact,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ColumnResolution {
    Found {
        column: String,
        method: ResolveMethod,
    },
    NotFound {
        available: Vec<String>,
    },
}

impl ColumnResolution {
    pub fn column(&self) -> Option<&str> {
        match self {
            ColumnResolution::Found { column, .. } => Some(column),
            ColumnResolution::NotFound { .. } => None,
        }
    }
}

pub fn resolve_probability_column(table: &Table, candidates: &[String]) -> ColumnResolution {
    if let Some(column) = candidates.iter().find(|c| table.has_column(c)) {
        return ColumnResolution::Found {
            column: column.clone(),
            method: ResolveMethod::Exact,
        };
    }

    let by_substring = table.columns.iter().find(|c| {
        let lower = c.to_lowercase();
        lower.contains("proba") || lower.contains("prob")
    });

    match by_substring {
        Some(column) => ColumnResolution::Found {
            column: column.clone(),
            method: ResolveMethod::Substring,
        },
        None => ColumnResolution::NotFound {
            available: table.columns.clone(),
        },
    }
}
