//! QW command-line runner.
//!
//! ```text
//! qw-run <file>           check, then execute on the engine
//! qw-run --check <file>   print parse and lint diagnostics only
//! qw-run --format         read stdin, print canonical program text
//! ```
//!
//! Engine settings come from `QW_ENGINE_URL`, `QW_BACKEND`, `QW_SHOTS` and
//! `QW_TIMEOUT_SECS`. Logging is controlled with `RUST_LOG`.

use std::io::Read;
use std::process::ExitCode;

use qw_core::layout::TrackGeometry;
use qw_core::lint::{LintSeverity, lint_program};
use qw_core::parser::parse_program;
use qw_editor::sync::SyncController;
use qw_exec::{EngineConfig, ExecutionOutcome, HttpEngine, Session, Visualization};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("--format") => format_stdin(),
        Some("--check") => match args.get(1) {
            Some(path) => read_file(path).map_or(ExitCode::FAILURE, |text| check(&text)),
            None => usage(),
        },
        Some(path) if !path.starts_with('-') => match read_file(path) {
            Some(text) => run(&text).await,
            None => ExitCode::FAILURE,
        },
        _ => usage(),
    }
}

fn usage() -> ExitCode {
    eprintln!("usage: qw-run [--check] <file> | qw-run --format");
    ExitCode::from(2)
}

fn read_file(path: &str) -> Option<String> {
    std::fs::read_to_string(path)
        .inspect_err(|e| eprintln!("qw-run: cannot read {path}: {e}"))
        .ok()
}

fn format_stdin() -> ExitCode {
    let mut text = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut text) {
        eprintln!("qw-run --format: {e}");
        return ExitCode::FAILURE;
    }
    let formatted = qw_core::format_program(&text);
    for dropped in &formatted.dropped {
        eprintln!("dropped {dropped}");
    }
    print!("{}", formatted.text);
    ExitCode::SUCCESS
}

/// Print diagnostics; fails if any line was unreadable.
fn check(text: &str) -> ExitCode {
    let parsed = parse_program(text);
    for diag in &parsed.diagnostics {
        eprintln!("skipped {diag}");
    }
    for lint in lint_program(&parsed) {
        let level = match lint.severity {
            LintSeverity::Warning => "warning",
            LintSeverity::Info => "info",
        };
        eprintln!("{level}[{}]: {}", lint.rule, lint.message);
    }
    if parsed.diagnostics.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run(text: &str) -> ExitCode {
    check(text);

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("qw-run: {e}");
            return ExitCode::FAILURE;
        }
    };
    let engine = match HttpEngine::new(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("qw-run: {e}");
            return ExitCode::FAILURE;
        }
    };

    let controller = SyncController::from_text(text, TrackGeometry::default());
    let mut session = Session::new(engine, config);
    let Some(report) = session.run(&controller).await else {
        return ExitCode::FAILURE;
    };

    let model = match &report.outcome {
        ExecutionOutcome::Completed(model) => model,
        ExecutionOutcome::Failed { message } => {
            eprintln!("execution failed: {message}");
            return ExitCode::FAILURE;
        }
    };

    println!("{:?} result", model.state_kind);
    for (index, p) in model.probabilities.iter().enumerate() {
        if *p > 0.0 {
            println!(
                "  {}  p={p:.4}  |a|={:.4}  phase={:.4}",
                model.basis_label(index),
                model.amplitudes.get(index).copied().unwrap_or_default(),
                model.phases.get(index).copied().unwrap_or_default(),
            );
        }
    }
    if !model.counts.is_empty() {
        println!("counts:");
        for (outcome, count) in &model.counts {
            println!("  {outcome}: {count}");
        }
    }
    if let Some(Visualization::Bloch { qubit, vector }) = &report.bloch {
        println!(
            "bloch q[{qubit}]: ({:.3}, {:.3}, {:.3})",
            vector[0], vector[1], vector[2]
        );
    }
    if let Some(metrics) = &report.entanglement {
        println!("total entropy: {:.4}", metrics.total_entropy);
    }
    ExitCode::SUCCESS
}
