// crates/vsim_cli/src/main.rs
//
// `vsim`: generate (or import) an election, apply the selected rules, run
// polls, render the score tables on stdout and optionally export a snapshot.
// Logs go to stderr.

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    pub const VALIDATION: u8 = 2;
    pub const IO: u8 = 4;
    pub const ENGINE: u8 = 5;
}

use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use args::{Args, RenderFormat};
use vsim_core::variables::SimParams;
use vsim_engine::{Election, EngineError};
use vsim_io::loader::{load_params, load_snapshot, write_snapshot};
use vsim_io::snapshot::ElectionSnapshot;
use vsim_io::validate::validate_snapshot;
use vsim_io::IoError;
use vsim_report::{build_table, render_text::render_text, ReportError};

/// Exit-code buckets.
#[derive(Debug, Error)]
enum CliError {
    /// Bad params, invalid or tampered snapshot.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Io(String),
    /// Engine, algorithm or report failure.
    #[error("{0}")]
    Engine(String),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Validation(_) => exitcodes::VALIDATION,
            CliError::Io(_) => exitcodes::IO,
            CliError::Engine(_) => exitcodes::ENGINE,
        }
    }
}

impl From<IoError> for CliError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Path(_) => CliError::Io(e.to_string()),
            IoError::Json { .. } | IoError::DigestMismatch { .. } | IoError::Invalid(_) => {
                CliError::Validation(e.to_string())
            }
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(io) => io.into(),
            EngineError::Import(_) => CliError::Validation(e.to_string()),
            other => CliError::Engine(other.to_string()),
        }
    }
}

impl From<ReportError> for CliError {
    fn from(e: ReportError) -> Self {
        CliError::Engine(e.to_string())
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args);

    let result = if args.validate_only { validate_only(&args) } else { run_once(&args) };
    match result {
        Ok(()) => ExitCode::from(exitcodes::OK),
        Err(e) => {
            eprintln!("vsim: error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load a snapshot and reject it unless every check passes.
fn load_checked(path: &std::path::Path) -> Result<ElectionSnapshot, CliError> {
    let snapshot = load_snapshot(path)?;
    let report = validate_snapshot(&snapshot);
    for issue in &report.issues {
        tracing::warn!(code = issue.code, pointer = %issue.pointer, "{}", issue.message);
    }
    if !report.pass {
        return Err(CliError::Validation(format!("{}: {}", path.display(), report.summary())));
    }
    Ok(snapshot)
}

fn validate_only(args: &Args) -> Result<(), CliError> {
    let path = args
        .import
        .as_deref()
        .ok_or_else(|| CliError::Validation("--validate-only needs --import".into()))?;
    let snapshot = load_checked(path)?;
    tracing::info!(
        candidates = snapshot.candidates.len(),
        electors = snapshot.electors.len(),
        "snapshot OK"
    );
    Ok(())
}

fn run_once(args: &Args) -> Result<(), CliError> {
    // 1) Params: file, then flag overrides.
    let mut params = match &args.params {
        Some(p) => load_params(p)?,
        None => SimParams::default(),
    };
    args.apply_overrides(&mut params);
    params
        .validate_domains()
        .map_err(|e| CliError::Validation(format!("params: {e}")))?;

    // 2) People.
    let mut election = Election::new(params)?;
    match &args.import {
        Some(path) => {
            let snapshot = load_checked(path)?;
            election.import_people(&snapshot)?;
        }
        None => election.populate_random(args.electors, args.candidates),
    }

    // 3) Rules, then polls.
    election.start_election(&args.selected_rules())?;
    if election.params().polls > 0 {
        let rounds = election.run_polls()?;
        let withdrawn: usize = rounds.iter().map(|r| r.withdrawn.len()).sum();
        tracing::info!(rounds = rounds.len(), withdrawn, "polls finished");
    }

    // 4) Export.
    let snapshot = election.export_snapshot();
    if let Some(path) = &args.export {
        write_snapshot(path, &snapshot)?;
    }

    // 5) Render.
    let table = build_table(&snapshot, Some(&election.satisfaction_table()))?;
    let rendered = match args.render {
        RenderFormat::Text => render_text(&table),
        RenderFormat::Json => vsim_report::render_json::render_json(&table)?,
    };
    println!("{rendered}");
    Ok(())
}
