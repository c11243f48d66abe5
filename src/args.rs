use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Extracts compliance data from spreadsheet forms and prints it as JSON.
///
/// Logs go to stderr; set RUST_LOG (e.g. `RUST_LOG=rusty_form=debug`) for more detail.
#[derive(Debug, Parser)]
#[command(author, version, bin_name = "rusty-form")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract a Supplier Export Control Classification Form.
    Seccf(SeccfCommand),
    /// List the sheet names of a workbook.
    Sheets(SheetsCommand),
    /// List the form controls of one sheet.
    Controls(ControlsCommand),
}

#[derive(Debug, Args)]
pub struct SeccfCommand {
    /// Workbook to read (xlsx, xlsm, xltx or xltm).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Company name substituted into labels (repeatable), replacing the configured ones.
    #[arg(long = "company", value_name = "NAME")]
    pub companies: Vec<String>,

    /// YAML configuration overriding sheet names, table window or field criteria.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct SheetsCommand {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct ControlsCommand {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Sheet name; matched case-insensitively, last match wins.
    #[arg(value_name = "SHEET")]
    pub sheet: String,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}
