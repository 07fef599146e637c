// rollcall - compare the API employee export with the manual spreadsheet,
// cross-referenced with attendance.

mod exit_codes;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use exit_codes::{EXIT_ERROR, EXIT_MISSING_INPUT, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};
use rollcall_io::LoadError;
use rollcall_recon::{ReconConfig, ReconError, ReconInput};

/// Config picked up from the working directory when `--config` is not given.
const DEFAULT_CONFIG: &str = "rollcall.toml";

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(about = "Compare the API employee export with the manual roster and summarize attendance")]
#[command(version)]
#[command(after_help = "\
Examples:
  rollcall
  rollcall --config march.toml
  rollcall --output /tmp/comparison_results.json --quiet
  RUST_LOG=info rollcall")]
struct Cli {
    /// Config file (defaults to ./rollcall.toml when present)
    #[arg(long, short = 'c', env = "ROLLCALL_CONFIG")]
    config: Option<PathBuf>,

    /// Write the JSON report here instead of the configured path
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Do not print the console summary
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Map an input failure to its exit code.
    pub fn load(err: LoadError) -> Self {
        match &err {
            LoadError::MissingFile { .. } => Self {
                code: EXIT_MISSING_INPUT,
                message: err.to_string(),
                hint: Some(format!(
                    "run from the directory holding the exports, or set [inputs] in {DEFAULT_CONFIG}"
                )),
            },
            LoadError::Parse { .. } => Self { code: EXIT_PARSE, message: err.to_string(), hint: None },
            LoadError::Io { .. } => Self { code: EXIT_ERROR, message: err.to_string(), hint: None },
        }
    }

    pub fn recon(err: ReconError) -> Self {
        let code = match &err {
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_USAGE,
            ReconError::MissingColumn { .. } => EXIT_PARSE,
        };
        let hint = match &err {
            ReconError::MissingColumn { source, .. } => {
                Some(format!("set [{source}] id_field in {DEFAULT_CONFIG}"))
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cmd_run(cli) {
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

/// Load the config and the directory its relative paths resolve against.
fn load_config(explicit: Option<PathBuf>) -> Result<(ReconConfig, PathBuf), CliError> {
    let path = match explicit {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG).is_file() => PathBuf::from(DEFAULT_CONFIG),
        None => {
            log::info!("no {DEFAULT_CONFIG}, using defaults");
            return Ok((ReconConfig::default(), PathBuf::from(".")));
        }
    };

    let text = std::fs::read_to_string(&path)
        .map_err(|e| CliError::usage(format!("cannot read config {}: {e}", path.display())))?;
    let config = ReconConfig::from_toml(&text).map_err(CliError::recon)?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    log::info!("loaded config {} ({})", path.display(), config.name);
    Ok((config, base_dir))
}

fn cmd_run(cli: Cli) -> Result<(), CliError> {
    let (config, base_dir) = load_config(cli.config)?;

    let api_path = base_dir.join(&config.inputs.api);
    let excel_path = base_dir.join(&config.inputs.excel);
    let attendance_path = base_dir.join(&config.inputs.attendance);

    // Load everything before computing anything; a missing file aborts the run.
    let api_rows = rollcall_io::api::load_employees(&api_path).map_err(CliError::load)?;
    let roster = rollcall_io::xlsx::load_roster(&excel_path, &config.excel).map_err(CliError::load)?;
    let attendance = rollcall_io::attendance::load_shifts(&attendance_path, &config.attendance)
        .map_err(CliError::load)?;

    let info = report::InputInfo {
        sheet: roster.sheet,
        attendance_rows: attendance.total_rows,
        attendance_skipped: attendance.skipped,
    };
    let input = ReconInput {
        api_rows,
        excel_rows: roster.rows,
        excel_columns: roster.columns,
        shifts: attendance.shifts,
    };

    let result = rollcall_recon::run(&config, &input).map_err(CliError::recon)?;

    let output = cli
        .output
        .unwrap_or_else(|| base_dir.join(&config.output.json));
    rollcall_io::json::export(&result, &output).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: format!("cannot write report: {e}"),
        hint: None,
    })?;

    if !cli.quiet {
        print!("{}", report::render(&result, &info, &output));
    }

    Ok(())
}
