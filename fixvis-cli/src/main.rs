mod config;
mod events;
mod prompt;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{CliOverrides, ConfigMerger, MergedConfig};
use fixvis_core::adapters::{BuildozerCli, FixedAnswer};
use fixvis_core::ports::Confirm;
use fixvis_core::{FailurePolicy, FixRecord, FixVisibilityPlugin, OutcomeStatus};
use fs_err as fs;
use prompt::TerminalConfirm;
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Exit code for `--check` when fixes were found but not applied.
const EXIT_PENDING_FIXES: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "fixvis",
    version,
    about = "Find Bazel visibility errors in a build event stream and fix them with buildozer."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay build events and fix (or print fixes for) visibility errors.
    Fix(FixArgs),
    /// List the visibility fixes found in build events without running buildozer.
    Scan(ScanArgs),
}

#[derive(Debug, Parser)]
struct IntakeArgs {
    /// NDJSON file written by `bazel --build_event_json_file`.
    #[arg(long)]
    events: Utf8PathBuf,

    /// Bazel workspace root (default: current directory).
    #[arg(long, env = "BUILD_WORKSPACE_DIRECTORY", default_value = ".")]
    workspace: Utf8PathBuf,

    /// Seconds to wait for in-flight events before remediating.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Intake slots before event submission waits.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    capacity: Option<u64>,

    /// Submit every event without a sequence number.
    #[arg(long, default_value_t = false)]
    unordered: bool,
}

#[derive(Debug, Parser)]
struct FixArgs {
    #[command(flatten)]
    intake: IntakeArgs,

    /// Ask before applying each fix. Without it, commands are only printed.
    #[arg(long, default_value_t = false)]
    interactive: bool,

    /// Apply every fix without asking.
    #[arg(long, default_value_t = false, conflicts_with = "interactive")]
    yes: bool,

    /// Path to the buildozer binary.
    #[arg(long)]
    buildozer: Option<String>,

    /// What to do when a fix fails.
    #[arg(long, value_enum)]
    on_error: Option<OnError>,

    /// Write the remediation report as JSON to this file.
    #[arg(long)]
    report: Option<Utf8PathBuf>,

    /// Exit with status 2 when fixes were printed or declined instead of applied.
    #[arg(long, default_value_t = false)]
    check: bool,
}

#[derive(Debug, Parser)]
struct ScanArgs {
    #[command(flatten)]
    intake: IntakeArgs,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OnError {
    Abort,
    Continue,
}

impl From<OnError> for FailurePolicy {
    fn from(value: OnError) -> Self {
        match value {
            OnError::Abort => FailurePolicy::Abort,
            OnError::Continue => FailurePolicy::Continue,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Fix(args) => cmd_fix(args),
        Command::Scan(args) => cmd_scan(args),
    }
}

fn cmd_fix(args: FixArgs) -> anyhow::Result<ExitCode> {
    let merged = merged_config(
        &args.intake,
        args.buildozer.clone(),
        args.on_error.map(FailurePolicy::from),
    )?;
    let events = events::read_events(&args.intake.events)?;
    let editor = BuildozerCli::new(merged.buildozer, Some(args.intake.workspace.clone()));
    let interactive = args.interactive || args.yes;
    let confirm: Box<dyn Confirm> = if args.yes {
        Box::new(FixedAnswer(true))
    } else {
        Box::new(TerminalConfirm::new())
    };

    let report = runtime()?.block_on(async {
        let mut plugin = FixVisibilityPlugin::new(merged.settings, editor);
        events::replay(&plugin, events, args.intake.unordered).await?;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let report = plugin
            .post_build_hook(interactive, confirm.as_ref(), &mut out)
            .await?;
        out.flush().context("flush stdout")?;
        anyhow::Ok(report)
    })?;

    info!(
        applied = report.count(OutcomeStatus::Applied),
        reported = report.count(OutcomeStatus::Reported),
        declined = report.count(OutcomeStatus::Declined),
        failed = report.count(OutcomeStatus::Failed),
        "remediation finished"
    );
    if !report.events_complete {
        warn!("some build events were not processed before the timeout");
    }

    if let Some(path) = &args.report {
        write_json(path, &report)?;
        debug!("wrote report to {}", path);
    }

    if report.has_failures() {
        anyhow::bail!(
            "{} visibility fix(es) failed",
            report.count(OutcomeStatus::Failed)
        );
    }
    if args.check && report.has_pending_fixes() {
        return Ok(ExitCode::from(EXIT_PENDING_FIXES));
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_scan(args: ScanArgs) -> anyhow::Result<ExitCode> {
    let merged = merged_config(&args.intake, None, None)?;
    let events = events::read_events(&args.intake.events)?;
    let editor = BuildozerCli::new(merged.buildozer, Some(args.intake.workspace.clone()));

    let (records, complete) = runtime()?.block_on(async {
        let mut plugin = FixVisibilityPlugin::new(merged.settings, editor);
        events::replay(&plugin, events, args.intake.unordered).await?;
        anyhow::Ok(plugin.finish_events().await)
    })?;
    if !complete {
        warn!("some build events were not processed before the timeout");
    }

    match args.format {
        OutputFormat::Text => print_records_text(&records),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&records).context("serialize json")?;
            println!("{json}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn merged_config(
    intake: &IntakeArgs,
    buildozer: Option<String>,
    on_error: Option<FailurePolicy>,
) -> anyhow::Result<MergedConfig> {
    let file_config =
        config::load_or_default(&intake.workspace).context("load fixvis.toml config")?;
    let capacity = intake
        .capacity
        .map(usize::try_from)
        .transpose()
        .context("--capacity out of range")?;
    let merged = ConfigMerger::new(file_config).merge(CliOverrides {
        capacity,
        timeout_secs: intake.timeout_secs,
        buildozer,
        on_error,
    });
    debug!(
        "merged config: capacity={}, idle_timeout={:?}, on_error={:?}, buildozer={}",
        merged.settings.intake_capacity,
        merged.settings.idle_timeout,
        merged.settings.on_error,
        merged.buildozer
    );
    Ok(merged)
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")
}

fn print_records_text(records: &[FixRecord]) {
    if records.is_empty() {
        println!("No visibility issues found.");
        return;
    }
    for record in records {
        println!("{record}");
    }
}

fn write_json<T: serde::Serialize>(path: &Utf8Path, v: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize json")?;
    fs::write(path, s).with_context(|| format!("write {}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn yes_conflicts_with_interactive() {
        let err = Cli::try_parse_from([
            "fixvis",
            "fix",
            "--events",
            "bep.json",
            "--yes",
            "--interactive",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn on_error_maps_to_policy() {
        let cli = Cli::try_parse_from([
            "fixvis",
            "fix",
            "--events",
            "bep.json",
            "--on-error",
            "continue",
        ])
        .unwrap();
        let Command::Fix(args) = cli.cmd else {
            panic!("expected fix");
        };
        assert_eq!(
            args.on_error.map(FailurePolicy::from),
            Some(FailurePolicy::Continue)
        );
    }
}
