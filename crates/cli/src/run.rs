//! `taxmatch run` and `taxmatch validate`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use taxmatch_recon::model::ReconMeta;
use taxmatch_recon::{
    AppliedFilter, FilterChoice, ReconConfig, ReconSession, ReconSummary, SessionOutcome, Side,
    Table, TableView, XLSX_MIME,
};

use crate::exit_codes::{EXIT_DIFFERENCES, EXIT_RUNTIME, EXIT_USAGE};
use crate::render::render_view;
use crate::CliError;

pub struct RunArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub filter: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

/// Machine-readable result printed by `--json`.
#[derive(Serialize)]
struct RunJson<'a> {
    meta: &'a ReconMeta,
    reconciled: bool,
    summary: &'a ReconSummary,
    sentence: &'a str,
    left_only: &'a TableView,
    right_only: &'a TableView,
    mismatches: &'a TableView,
    filter: Option<&'a AppliedFilter>,
    workbook: String,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = match args.config {
        Some(ref path) => load_config(path)?,
        None => ReconConfig::default(),
    };
    log::debug!(
        "config '{}': key '{}', compare '{}'",
        config.name,
        config.key_column,
        config.compare_column
    );

    let mut session = ReconSession::new(config);
    session.set_table(Side::Left, load_table(&args.left)?);
    session.set_table(Side::Right, load_table(&args.right)?);
    if let Some(value) = args.filter {
        session.set_filter(FilterChoice::Apply(Some(value)));
    }

    let output = match session.run()? {
        SessionOutcome::Complete(output) => output,
        SessionOutcome::AwaitingInput(missing) => {
            return Err(CliError {
                code: EXIT_USAGE,
                message: format!("input table(s) not loaded: {missing:?}"),
                hint: None,
            });
        }
    };
    let config = session.config();

    let workbook_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.file_name));
    let bytes = taxmatch_io::write_report(config, &output.result)?;
    std::fs::write(&workbook_path, bytes).map_err(|e| CliError {
        code: EXIT_RUNTIME,
        message: format!("cannot write {}: {e}", workbook_path.display()),
        hint: None,
    })?;

    let report = &output.report;
    if args.json {
        let doc = RunJson {
            meta: &output.result.meta,
            reconciled: report.summary.is_reconciled(),
            summary: &report.summary,
            sentence: &report.sentence,
            left_only: &report.left_only,
            right_only: &report.right_only,
            mismatches: &report.mismatches,
            filter: output.filtered.as_ref(),
            workbook: workbook_path.display().to_string(),
        };
        let json_str = serde_json::to_string_pretty(&doc).map_err(|e| CliError {
            code: EXIT_RUNTIME,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{json_str}");
    } else if !args.quiet {
        for view in [&report.left_only, &report.right_only, &report.mismatches] {
            println!("{}", render_view(view));
        }
        if let Some(ref filtered) = output.filtered {
            println!("{}", render_view(&filtered.view));
        }
        println!("{}", report.sentence);
    }

    if !args.quiet {
        if args.json {
            eprintln!("{}", report.sentence);
        }
        eprintln!("wrote {} ({XLSX_MIME})", workbook_path.display());
    }

    if report.summary.is_reconciled() {
        Ok(())
    } else {
        Err(CliError { code: EXIT_DIFFERENCES, message: String::new(), hint: None })
    }
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let [left_sheet, right_sheet, mismatch_sheet] = config.sheet_names();
    eprintln!(
        "valid: '{}' joins on '{}' and compares '{}' ({} vs {})",
        config.name, config.key_column, config.compare_column, config.left.label, config.right.label,
    );
    eprintln!("sheets: {left_sheet}, {right_sheet}, {mismatch_sheet} -> {}", config.output.file_name);
    Ok(())
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_RUNTIME,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: None,
    })?;
    Ok(ReconConfig::from_toml(&config_str)?)
}

fn load_table(path: &Path) -> Result<Table, CliError> {
    let table = taxmatch_io::load_path(path)?;
    log::info!("{}: {} row(s)", path.display(), table.len());
    Ok(table)
}
