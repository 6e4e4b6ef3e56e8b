//! Lint command implementation

use std::path::PathBuf;
use std::sync::Arc;

use lintbridge_core::{
    FailureKind, LintRequest, LintbridgeConfig, Orchestrator, RunSettings, SystemIo,
};
use miette::{IntoDiagnostic, Result};
use tracing::{info, warn};

use crate::cli::{Cli, LintArgs};
use crate::utils::create_tokio_runtime;

/// Runs the lint command. Returns whether any file was unclean or failed.
///
/// Everything that can be rejected is checked before the first file is
/// dispatched, so a fatal error leaves stdout untouched.
pub fn run_lint(cli: &Cli, args: &LintArgs) -> Result<bool> {
    let mut config = if let Some(ref path) = cli.config {
        LintbridgeConfig::from_file(path).into_diagnostic()?
    } else {
        find_config()?
    };
    apply_overrides(&mut config, args)?;

    let paths = collect_paths(args)?;
    if paths.is_empty() {
        warn!("No files to lint");
    }

    let backend = config.backend();
    info!(
        "Using {} via '{}'",
        config.engine.display_name(),
        backend.program()
    );

    let orchestrator = Orchestrator::new(
        Arc::new(SystemIo::new()),
        Arc::new(backend),
        RunSettings::from_config(&config),
    );
    let request = LintRequest::new(config.engine, paths).with_options(config.options.clone());

    let runtime = create_tokio_runtime()?;
    let summary = runtime
        .block_on(orchestrator.run(&request))
        .into_diagnostic()?;

    info!(
        "{} result(s), {} problem(s), {} unclean, {} read failure(s), {} engine failure(s), {} write failure(s)",
        summary.results,
        summary.problems,
        summary.unclean,
        summary.failures_of(FailureKind::Read),
        summary.failures_of(FailureKind::Engine),
        summary.failures_of(FailureKind::Write)
    );

    Ok(!summary.is_clean())
}

fn find_config() -> Result<LintbridgeConfig> {
    if let Some(path) = LintbridgeConfig::discover(".") {
        info!("Using config: {}", path.display());
        return LintbridgeConfig::from_file(&path).into_diagnostic();
    }

    // Return default config if no file found
    info!("No config file found, using defaults");
    Ok(LintbridgeConfig::new())
}

/// Applies command-line flags on top of the loaded configuration.
fn apply_overrides(config: &mut LintbridgeConfig, args: &LintArgs) -> Result<()> {
    if let Some(engine) = args.engine {
        config.engine = engine;
    }
    if let Some(framing) = args.framing {
        config.framing = Some(framing.into());
    }
    if let Some(ordering) = args.ordering {
        config.ordering = ordering.into();
    }
    if args.no_fix {
        config.fix = false;
    }
    if let Some(ref options) = args.options {
        config.options = parse_options(options)?;
    }
    Ok(())
}

fn parse_options(json: &str) -> Result<serde_json::Value> {
    let options: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| miette::miette!("Invalid --options: {}", e))?;
    if !options.is_object() {
        return Err(miette::miette!("Invalid --options: expected a JSON object"));
    }
    Ok(options)
}

/// `--paths` entries first, then positional files.
fn collect_paths(args: &LintArgs) -> Result<Vec<PathBuf>> {
    let mut paths = match args.paths {
        Some(ref json) => serde_json::from_str::<Vec<PathBuf>>(json)
            .map_err(|e| miette::miette!("Invalid --paths: {}", e))?,
        None => Vec::new(),
    };
    paths.extend(args.files.iter().cloned());
    Ok(paths)
}
