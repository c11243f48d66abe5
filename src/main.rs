mod args;

use anyhow::{Context, Result};
use args::{Cli, Command, ControlsCommand, SeccfCommand, SheetsCommand};
use clap::Parser;
use rusty_form::extractor::sheets::find_sheet;
use rusty_form::{open_spreadsheet, ExtractorConfig, FormExtractor, FormSchema, Spreadsheet};
use serde::Serialize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: u8 = 3;

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Success,
    Error,
}

/// Envelope written to stdout on success and to stderr on failure.
#[derive(Debug, Serialize)]
struct Response<T: Serialize> {
    status: Status,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match dispatch_command(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let response = Response::<()> {
                status: Status::Error,
                message: format!("{error:#}"),
                data: None,
                warnings: None,
            };
            match serde_json::to_string(&response) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{error:#}"),
            }
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

// stdout carries the JSON response, so logs go to stderr
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn dispatch_command(command: Command) -> Result<()> {
    match command {
        Command::Seccf(cmd) => handle_seccf(cmd),
        Command::Sheets(cmd) => handle_sheets(cmd),
        Command::Controls(cmd) => handle_controls(cmd),
    }
}

fn handle_seccf(command: SeccfCommand) -> Result<()> {
    let config = match &command.config {
        Some(path) => ExtractorConfig::load(path)?,
        None => ExtractorConfig::default(),
    }
    .with_company_names(command.companies);
    let schema = FormSchema::from_config(&config).context("Invalid extraction schema")?;

    let mut extractor = FormExtractor::open(&command.file, schema)
        .with_context(|| format!("Failed to open '{}'", command.file.display()))?;
    let extraction = extractor.extract().context("Extraction failed")?;
    let warnings = extractor.diagnostics().iter().map(ToString::to_string).collect();
    extractor.close();

    print_success("SECCF extraction completed", extraction, Some(warnings), command.pretty)
}

fn handle_sheets(command: SheetsCommand) -> Result<()> {
    let mut spreadsheet = open_spreadsheet(&command.file)
        .with_context(|| format!("Failed to open '{}'", command.file.display()))?;
    let sheet_names = spreadsheet.sheet_names()?;
    spreadsheet.close();
    print_success("Sheets listed", sheet_names, None, false)
}

fn handle_controls(command: ControlsCommand) -> Result<()> {
    let mut spreadsheet = open_spreadsheet(&command.file)
        .with_context(|| format!("Failed to open '{}'", command.file.display()))?;
    let sheet = find_sheet(&spreadsheet.sheet_names()?, &command.sheet)?;
    let controls = spreadsheet.form_controls(&sheet)?;
    spreadsheet.close();
    print_success(&format!("Form controls of '{sheet}'"), controls, None, command.pretty)
}

fn print_success<T: Serialize>(message: &str, data: T, warnings: Option<Vec<String>>, pretty: bool) -> Result<()> {
    let response = Response {
        status: Status::Success,
        message: message.to_owned(),
        data: Some(data),
        warnings,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{json}");
    Ok(())
}
