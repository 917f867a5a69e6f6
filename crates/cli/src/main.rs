// taxmatch CLI - reconcile two invoice tables by key

mod exit_codes;
mod render;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use taxmatch_recon::ReconError;

use exit_codes::{exit_code_for, EXIT_SUCCESS};
use run::RunArgs;

#[derive(Parser)]
#[command(name = "taxmatch")]
#[command(about = "Reconcile two invoice tables by key and compare a fiscal code")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile two tables and write the differences workbook
    #[command(after_help = "\
Examples:
  taxmatch run bbts.csv nci.xlsx
  taxmatch run bbts.csv nci.csv --config bbts-nci.recon.toml
  taxmatch run a.csv b.csv --filter 5102
  taxmatch run a.csv b.csv --json --output report.xlsx

Exit codes:
  0  tables reconcile
  1  exclusive rows or mismatches found
  3  missing column, 4 unreadable input, 5 invalid config, 6 IO failure")]
    Run {
        /// First table (.csv, .tsv, .txt, .xlsx, .xls, .ods)
        left: PathBuf,

        /// Second table
        right: PathBuf,

        /// Path to a .recon.toml config (defaults apply when omitted)
        #[arg(long, short = 'c', env = "TAXMATCH_CONFIG")]
        config: Option<PathBuf>,

        /// Where to write the workbook (default: the config's file_name)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Show only mismatches whose code on either side equals VALUE
        #[arg(long, value_name = "VALUE")]
        filter: Option<String>,

        /// Output JSON to stdout instead of text tables
        #[arg(long)]
        json: bool,

        /// Suppress all non-error output
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a config without running
    #[command(after_help = "\
Examples:
  taxmatch validate bbts-nci.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  taxmatch-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { left, right, config, output, filter, json, quiet } => run::cmd_run(RunArgs {
            left,
            right,
            config,
            output,
            filter,
            json,
            quiet,
        }),
        Commands::Validate { config } => run::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let code = exit_code_for(&err);
        let hint = match &err {
            ReconError::MissingColumn { .. } => {
                Some("set key_column / compare_column in a config and pass it with --config")
            }
            ReconError::ColumnCollision(_) => Some("set distinct `suffix` values under [left] and [right]"),
            ReconError::UnsupportedFormat(_) => Some("supported: .csv .tsv .txt .xlsx .xlsm .xlsb .xls .ods"),
            ReconError::DuplicateKey { .. } => {
                Some("remove the duplicates or set duplicate_keys = \"cross_product\"")
            }
            _ => None,
        };
        let err = Self { code, message: err.to_string(), hint: None };
        match hint {
            Some(h) => err.with_hint(h),
            None => err,
        }
    }
}
