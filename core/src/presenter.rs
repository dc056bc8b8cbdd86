//! Table views shown on the dashboard.

use crate::{
    classifier::{ClassifiedTable, FLAG_COLUMN, PROBA_COLUMN},
    table::Table,
};

/// Identifier and ground-truth columns carried into the risk views when
/// the scored table has them.
pub const ID_COLUMNS: [&str; 3] = ["customerID", "Churn", "y_true"];

/// Columns of the operating-points table worth showing, in display order.
pub const OPERATING_POINT_COLUMNS: [&str; 7] = [
    "Operating Point",
    "Threshold",
    "Accuracy",
    "Precision",
    "Recall",
    "F1",
    "Profit",
];

pub fn preview(table: &Table, n: usize) -> Table {
    table.head(n)
}

pub fn operating_points_view(table: &Table) -> Table {
    table.select(&OPERATING_POINT_COLUMNS)
}

/// Present identifier columns followed by `churn_proba` and `churn_flag`.
pub fn key_columns(classified: &ClassifiedTable) -> Vec<&'static str> {
    ID_COLUMNS
        .iter()
        .copied()
        .filter(|c| classified.table.has_column(c))
        .chain([PROBA_COLUMN, FLAG_COLUMN])
        .collect()
}

/// Rows of `classified` accepted by `keep`, in risk order, limited to the key
/// columns.
pub(crate) fn ranked_view(classified: &ClassifiedTable, keep: impl Fn(usize) -> bool) -> Table {
    let ordered = Table::new(
        classified.table.columns.clone(),
        classified
            .ranked_indices()
            .into_iter()
            .filter(|&i| keep(i))
            .map(|i| classified.table.rows[i].clone())
            .collect(),
    );
    ordered.select(&key_columns(classified))
}

/// The `n` highest-risk customers, flagged or not.
pub fn top_risk(classified: &ClassifiedTable, n: usize) -> Table {
    ranked_view(classified, |_| true).head(n)
}
