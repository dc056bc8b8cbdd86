use churn_explorer_core::{
    config::ExplorerConfig,
    error::ExplorerError,
    pipeline::{render, ExplorerSection, OperatingPointsSection},
    resolver::ResolveMethod,
    session::ExplorerSession,
    table::Table,
};
use std::fs;
use std::path::Path;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Rows whose calibrated probability is >= 0.06 in `scored_csv`.
const FLAGGED_ROWS: [(usize, &str); 6] = [
    (3, "0.06"),
    (10, "0.5"),
    (25, "0.07"),
    (47, "0.91"),
    (60, "0.06"),
    (99, "0.2"),
];

/// 100 customers, exactly six at or above 0.06, the rest in 0.01..=0.05.
fn scored_csv() -> String {
    let mut out = String::from("customerID,y_proba_calibrated,Churn\n");
    for i in 0..100 {
        let p = FLAGGED_ROWS
            .iter()
            .find(|(idx, _)| *idx == i)
            .map(|(_, p)| p.to_string())
            .unwrap_or_else(|| format!("0.0{}", 1 + i % 5));
        let churn = if i % 7 == 0 { "Yes" } else { "No" };
        out.push_str(&format!("{i:04}-CUST,{p},{churn}\n"));
    }
    out
}

fn raw_csv() -> String {
    let mut out = String::from("customerID,gender,tenure,MonthlyCharges\n");
    for i in 0..100 {
        out.push_str(&format!("{i:04}-CUST,Female,{},{}.5\n", i % 72, 20 + i));
    }
    out
}

/// Lay out a root directory the way the default config expects it.
fn write_root(root: &Path, scored: &str, operating_points: Option<&str>) -> ExplorerConfig {
    let config = ExplorerConfig::default_test(root);
    for (path, body) in [
        (config.raw_file(), raw_csv()),
        (config.scored_file(), scored.to_string()),
    ] {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }
    if let Some(body) = operating_points {
        let path = config.operating_points_file();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }
    config
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// 100 customers, 6 at or above 0.06: "6 / 100 (6.0%)", six exported rows.
#[test]
fn default_threshold_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_root(dir.path(), &scored_csv(), None);
    let mut session = ExplorerSession::open(config).unwrap();

    let view = session.view().unwrap();
    let ExplorerSection::Ready(panel) = &view.explorer else {
        panic!("explorer section should be ready: {:?}", view.explorer);
    };
    assert_eq!(panel.probability_column, "y_proba_calibrated");
    assert_eq!(panel.method, ResolveMethod::Exact);
    assert_eq!(panel.summary.headline(), "6 / 100 (6.0%)");
    assert_eq!(
        panel.headline,
        "At threshold 0.06, 6 / 100 customers (6.0%) are flagged as churn-risk."
    );
    assert_eq!(panel.retention_rows, 6);
    assert_eq!(panel.top.len(), 25);
    assert_eq!(panel.top.columns, vec!["customerID", "Churn", "churn_proba", "churn_flag"]);
    assert_eq!(panel.top.rows[0][0], "0047-CUST");

    let export = session.export().unwrap().unwrap();
    assert_eq!(export.file_name, "churn_retention_list_thr_0.06.csv");
    let parsed = Table::from_reader(export.bytes.as_slice()).unwrap();
    assert_eq!(parsed.len(), 6);
    let ids: Vec<&str> = parsed.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(
        ids,
        vec!["0047-CUST", "0010-CUST", "0099-CUST", "0025-CUST", "0003-CUST", "0060-CUST"]
    );
}

/// Overview sections show the first rows of each input.
#[test]
fn previews_are_first_ten_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_root(dir.path(), &scored_csv(), None);
    let mut session = ExplorerSession::open(config).unwrap();

    let view = session.view().unwrap();
    assert_eq!(view.raw_preview.len(), 10);
    assert_eq!(view.scored_preview.len(), 10);
    assert_eq!(view.raw_preview.rows[9][0], "0009-CUST");
}

/// No probability-like column: error panel with the real columns, the
/// overview still renders, nothing to export.
#[test]
fn unresolvable_column_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_root(
        dir.path(),
        "customerID,score,Churn\n0001-A,0.4,Yes\n",
        None,
    );
    let mut session = ExplorerSession::open(config).unwrap();

    let view = session.view().unwrap();
    match &view.explorer {
        ExplorerSection::ColumnNotFound { message, available } => {
            assert_eq!(available, &vec!["customerID", "score", "Churn"]);
            assert!(message.contains("customerID, score, Churn"));
        }
        other => panic!("expected ColumnNotFound, got {other:?}"),
    }
    assert_eq!(view.scored_preview.len(), 1);
    assert_eq!(view.raw_preview.len(), 10);
    assert!(session.export().unwrap().is_none());
}

/// Operating points: listed columns only, in display order.
#[test]
fn operating_points_keep_known_columns() {
    let dir = tempfile::tempdir().unwrap();
    let op = "F1,Threshold,Operating Point,Notes,Profit\n\
              0.61,0.5,Default,x,1200\n\
              0.58,0.06,Profit-optimal,y,4100\n";
    let config = write_root(dir.path(), &scored_csv(), Some(op));
    let mut session = ExplorerSession::open(config).unwrap();

    match session.view().unwrap().operating_points {
        OperatingPointsSection::Available { table } => {
            assert_eq!(table.columns, vec!["Operating Point", "Threshold", "F1", "Profit"]);
            assert_eq!(table.rows[1], vec!["Profit-optimal", "0.06", "0.58", "4100"]);
        }
        other => panic!("expected operating points, got {other:?}"),
    }
}

/// Without the operating-points file an informational notice is shown.
#[test]
fn missing_operating_points_shows_notice() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_root(dir.path(), &scored_csv(), None);
    let mut session = ExplorerSession::open(config).unwrap();

    match session.view().unwrap().operating_points {
        OperatingPointsSection::Missing { notice } => {
            assert!(notice.contains("outputs/tables/threshold_compare.csv"));
        }
        other => panic!("expected notice, got {other:?}"),
    }
}

/// Missing scored file: the session cannot open.
#[test]
fn missing_scored_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExplorerConfig::default_test(dir.path());
    fs::create_dir_all(config.raw_file().parent().unwrap()).unwrap();
    fs::write(config.raw_file(), raw_csv()).unwrap();

    match ExplorerSession::open(config) {
        Err(ExplorerError::MissingFile { path }) => {
            assert!(path.ends_with("outputs/scored/scored_test_calibrated.csv"));
        }
        Err(e) => panic!("expected MissingFile, got {e}"),
        Ok(_) => panic!("expected MissingFile, session opened"),
    }
}

/// Moving the threshold re-runs everything without touching the disk again.
#[test]
fn threshold_changes_reuse_cached_tables() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_root(dir.path(), &scored_csv(), None);
    let mut session = ExplorerSession::open(config).unwrap();
    let misses_after_open = session.cache_stats().misses;

    let mut flagged = Vec::new();
    for t in [0.0, 0.06, 0.07, 0.5, 1.0] {
        session.set_threshold(t).unwrap();
        let ExplorerSection::Ready(panel) = session.view().unwrap().explorer else {
            panic!("explorer should be ready");
        };
        flagged.push(panel.summary.flagged);
    }

    assert_eq!(flagged, vec![100, 6, 4, 2, 0]);
    assert_eq!(session.cache_stats().misses, misses_after_open);
    assert!(session.cache_stats().hits >= 10);
}

/// Threshold 1.0 with calibrated probabilities: empty but valid export.
#[test]
fn full_threshold_exports_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_root(dir.path(), &scored_csv(), None);
    let mut session = ExplorerSession::open(config).unwrap();
    session.set_threshold(1.0).unwrap();

    let export = session.export().unwrap().unwrap();
    assert_eq!(export.rows, 0);
    assert_eq!(export.file_name, "churn_retention_list_thr_1.00.csv");
    assert_eq!(export.bytes, b"customerID,Churn,churn_proba,churn_flag\n");
}

/// Invalid thresholds are refused and leave the session unchanged.
#[test]
fn invalid_threshold_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_root(dir.path(), &scored_csv(), None);
    let mut session = ExplorerSession::open(config).unwrap();

    assert!(session.set_threshold(1.5).is_err());
    assert!(session.set_threshold(f64::NAN).is_err());
    assert_eq!(session.threshold().value(), 0.06);
}

/// An empty scored table renders "n/a" instead of dividing by zero.
#[test]
fn empty_scored_table_reports_na() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_root(dir.path(), "customerID,proba\n", None);
    let mut session = ExplorerSession::open(config).unwrap();

    let ExplorerSection::Ready(panel) = session.view().unwrap().explorer else {
        panic!("explorer should be ready");
    };
    assert_eq!(panel.summary.flagged_pct, None);
    assert!(panel.headline.contains("0 / 0 customers (n/a)"));
}

/// `render` is a pure function of its inputs.
#[test]
fn render_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_root(dir.path(), &scored_csv(), None);
    let session = ExplorerSession::open(config.clone()).unwrap();

    let a = serde_json::to_string(&render(&config, session.tables(), session.threshold())).unwrap();
    let b = serde_json::to_string(&render(&config, session.tables(), session.threshold())).unwrap();
    assert_eq!(a, b);
}

/// Sessions never share threshold or cache.
#[test]
fn sessions_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_root(dir.path(), &scored_csv(), None);
    let mut one = ExplorerSession::open(config.clone()).unwrap();
    let two = ExplorerSession::open(config).unwrap();

    one.set_threshold(0.5).unwrap();
    one.view().unwrap();

    assert_ne!(one.session_id, two.session_id);
    assert_eq!(two.threshold().value(), 0.06);
    assert_eq!(two.cache_stats().hits, 0);
}

/// Overrides in explorer.json replace defaults key by key.
#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("explorer.json"),
        r#"{ "default_threshold": 0.1, "top_n": 5 }"#,
    )
    .unwrap();

    let config = ExplorerConfig::load(dir.path()).unwrap();
    assert_eq!(config.default_threshold, 0.1);
    assert_eq!(config.top_n, 5);
    assert_eq!(config.preview_rows, 10);
    assert_eq!(config.root, dir.path());
    assert!(config.scored_file().ends_with("outputs/scored/scored_test_calibrated.csv"));
}
