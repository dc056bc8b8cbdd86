//! churn-explorer: churn-risk dashboard over a scored customer table.
//!
//! Usage:
//!   churn-explorer --root . --threshold 0.06
//!   churn-explorer --root . --threshold 0.10 --export-dir out
//!   churn-explorer --root . --ipc-mode

use anyhow::{Context, Result};
use churn_explorer_core::{
    config::ExplorerConfig,
    exporter::RETENTION_MIME,
    pipeline::{ExplorerSection, OperatingPointsSection, ViewModel},
    session::ExplorerSession,
    table::Table,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    SetThreshold {
        value: f64,
    },
    Export {
        #[serde(default)]
        dir: Option<PathBuf>,
    },
    Reload,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    session_id: &'a str,
    view:       ViewModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    exported:   Option<ExportReport>,
}

/// Result of an `export` command. Without a target directory the CSV
/// travels inline in `content`.
#[derive(serde::Serialize)]
struct ExportReport {
    file_name: String,
    mime:      &'static str,
    rows:      usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    path:      Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content:   Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let root = PathBuf::from(parse_str_arg(&args, "--root").unwrap_or("."));
    let export_dir = parse_str_arg(&args, "--export-dir").map(PathBuf::from);

    let config = ExplorerConfig::load(&root)?;
    let threshold = parse_arg(&args, "--threshold")?.unwrap_or(config.default_threshold);

    // A missing raw or scored file ends the run here.
    let mut session = ExplorerSession::open(config)?;
    session.set_threshold(threshold)?;

    if ipc_mode {
        let stdin = io::stdin();
        run_ipc_loop(&mut session, export_dir.as_deref(), stdin.lock(), io::stdout())?;
    } else {
        let view = session.view()?;
        print_dashboard(&view);
        if let Some(dir) = export_dir {
            match session.export()? {
                Some(export) => {
                    let path = export.write_to(&dir)?;
                    println!();
                    println!("Retention list written to {}", path.display());
                }
                None => println!("\nNo retention list: probability column unavailable."),
            }
        }
    }

    Ok(())
}

fn run_ipc_loop<R: BufRead, W: Write>(
    session: &mut ExplorerSession,
    default_dir: Option<&Path>,
    mut input: R,
    mut output: W,
) -> Result<()> {
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = input.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut output, &e.to_string())?;
                continue;
            }
        };

        let mut exported = None;
        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::SetThreshold { value } => {
                if let Err(e) = session.set_threshold(value) {
                    write_error(&mut output, &e.to_string())?;
                    continue;
                }
            }
            IpcCommand::Export { dir } => {
                let dir = dir.or_else(|| default_dir.map(Path::to_path_buf));
                match handle_export(session, dir.as_deref()) {
                    Ok(report) => exported = report,
                    Err(e) => {
                        write_error(&mut output, &format!("{e:#}"))?;
                        continue;
                    }
                }
            }
            IpcCommand::Reload => {
                if let Err(e) = session.reload() {
                    write_error(&mut output, &e.to_string())?;
                    continue;
                }
            }
        }

        let view = match session.view() {
            Ok(v) => v,
            Err(e) => {
                write_error(&mut output, &e.to_string())?;
                continue;
            }
        };
        let state = UiState {
            session_id: &session.session_id,
            view,
            exported,
        };
        writeln!(output, "{}", serde_json::to_string(&state)?)?;
        output.flush()?;
    }
    Ok(())
}

/// `Ok(None)` when there is no probability column to export from.
fn handle_export(session: &mut ExplorerSession, dir: Option<&Path>) -> Result<Option<ExportReport>> {
    let Some(export) = session.export()? else {
        log::warn!("Export requested but no probability column is available");
        return Ok(None);
    };
    let (path, content) = match dir {
        Some(d) => {
            let path = export
                .write_to(d)
                .with_context(|| format!("cannot write export to {}", d.display()))?;
            (Some(path), None)
        }
        None => (None, Some(String::from_utf8(export.bytes)?)),
    };
    Ok(Some(ExportReport {
        file_name: export.file_name,
        mime: RETENTION_MIME,
        rows: export.rows,
        path,
        content,
    }))
}

fn write_error<W: Write>(output: &mut W, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(output, "{}", err_json)?;
    output.flush()?;
    Ok(())
}

fn print_dashboard(view: &ViewModel) {
    println!("=== Telco Customer Churn: Model Demo ===");
    println!();
    println!("--- Input data (first {} rows) ---", view.raw_preview.len());
    print_table(&view.raw_preview);
    println!();
    println!("--- Scored output (first {} rows) ---", view.scored_preview.len());
    print_table(&view.scored_preview);
    println!();

    match &view.operating_points {
        OperatingPointsSection::Available { table } => {
            println!("--- Model Operating Points ---");
            print_table(table);
        }
        OperatingPointsSection::Missing { notice } => println!("(info) {notice}"),
    }
    println!();

    println!("=== Churn-Risk Explorer ===");
    match &view.explorer {
        ExplorerSection::Ready(panel) => {
            println!("Using column {} as churn probability.", panel.probability_column);
            println!("{}", panel.headline);
            if panel.summary.out_of_range > 0 {
                println!(
                    "(warning) {} probabilities fall outside [0, 1]",
                    panel.summary.out_of_range
                );
            }
            println!();
            println!("Top customers ranked by churn risk:");
            print_table(&panel.top);
            println!();
            println!(
                "Retention list contains {} customers to target for offers / calls ({}).",
                panel.retention_rows, panel.retention_file_name
            );
        }
        ExplorerSection::ColumnNotFound { message, .. } => println!("(error) {message}"),
        ExplorerSection::InvalidProbabilities { message } => println!("(error) {message}"),
    }
}

fn print_table(table: &Table) {
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            table
                .rows
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("  {}", line(&table.columns));
    for row in &table.rows {
        println!("  {}", line(row));
    }
    if table.is_empty() {
        println!("  (no rows)");
    }
}

fn parse_str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// A present but unparsable flag value is an error, not a silent default.
fn parse_arg<T>(args: &[String], flag: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_str_arg(args, flag)
        .map(|v| v.parse().with_context(|| format!("invalid value for {flag}: {v:?}")))
        .transpose()
}
