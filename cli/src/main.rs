//! CLI entrypoint for synod
//!
//! This is the composition root: it loads the configuration, builds the
//! infrastructure adapters, wires them into the engine and drives the
//! session runner until the run stops or the user interrupts it.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use synod_application::{
    Engine, EngineConfig, NoObserver, PacingConfig, ReentryPacer, SessionHandle,
    SessionObserver, SessionOutcome, SessionRunner, SessionStatus,
};
use synod_domain::{FeedbackLoop, GenerationMode, LoopResponse, Role};
use synod_infrastructure::{
    ConfigLoader, FieldSchemaValidator, FileConfig, FileLoggingConfig, HeuristicHealthProbe,
    JsonReportWriter, JsonSnapshotStore, JsonlDispatchLogger, OfflineGenerator,
};
use synod_presentation::{
    Cli, ConsoleFormatter, OutputFormat, ProgressObserver, RunSummary, SimpleObserver,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        for line in ConfigLoader::describe_sources() {
            println!("{}", line);
        }
        return Ok(());
    }

    // === Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let log_dir = cli.log_dir.clone().or_else(|| file_config.logging.log_dir.clone());
    let _log_guard = init_logging(cli.verbose, log_dir.as_ref());

    for issue in file_config.validate() {
        warn!("Config: {}", issue);
    }

    let engine_config = engine_config(&cli, &file_config);
    let pacing = pacing_config(&cli, &file_config);
    info!(
        mode = %engine_config.mode,
        max_ticks = engine_config.max_ticks,
        generation = %engine_config.generation,
        "Starting synod"
    );

    // === Dependency Injection ===
    let engine = build_engine(&cli, &file_config, engine_config.clone());
    let report_dir = cli
        .report_dir
        .clone()
        .unwrap_or_else(|| FileLoggingConfig::expand(&file_config.logging.report_dir));
    let snapshot_path = cli
        .snapshot
        .clone()
        .unwrap_or_else(|| FileLoggingConfig::expand(&file_config.logging.snapshot_path));

    let (runner, handle) = SessionRunner::new(
        engine,
        ReentryPacer::new(pacing),
        Arc::new(JsonReportWriter::new(report_dir)),
        Arc::new(JsonSnapshotStore::new(snapshot_path)),
    );
    let mut task = tokio::spawn(runner.exit_when_stopped(true).run());

    if cli.restore {
        let status = handle.restore().await.context("Could not restore snapshot")?;
        if status == SessionStatus::Stopped {
            // the runner exits on its own; the summary shows the finished run
            info!("Restored run had already finished");
        } else {
            handle.resume().await?;
        }
    } else {
        let Some(directive) = cli.directive.as_deref() else {
            handle.shutdown().await?;
            bail!("A directive is required unless --restore is given.");
        };
        handle
            .start(directive, engine_config.mode, engine_config.max_ticks)
            .await?;
        // Restored runs carry their remaining loops in the snapshot
        handle
            .register_loop(FeedbackLoop::on_stall(
                "refocus-strategy",
                LoopResponse::InjectDirective {
                    target: Role::Strategy,
                    instruction:
                        "The deliberation has stalled; narrow the plan to its next concrete step"
                            .to_string(),
                },
            ))
            .await?;
    }

    let outcome = tokio::select! {
        outcome = &mut task => outcome?,
        _ = tokio::signal::ctrl_c() => interrupt(&handle, task).await?,
    };

    let summary = RunSummary::from_engine(&outcome.engine, &outcome.reports);
    let output = match cli.output {
        OutputFormat::Summary => ConsoleFormatter::format(&summary),
        OutputFormat::Full => ConsoleFormatter::format_full(&summary),
        OutputFormat::Json => ConsoleFormatter::format_json(&summary),
    };
    println!("{}", output);

    Ok(())
}

/// Initialize tracing: stderr filtered by verbosity, plus an optional daily
/// rolling file. The returned guard flushes the file writer on drop.
fn init_logging(verbose: u8, log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_dir.map(|dir| FileLoggingConfig::expand(dir)) {
        Some(dir) if std::fs::create_dir_all(&dir).is_ok() => {
            let appender = tracing_appender::rolling::daily(&dir, "synod.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

/// File configuration with command-line overrides applied
fn engine_config(cli: &Cli, file_config: &FileConfig) -> EngineConfig {
    let (mut config, _) = file_config.to_engine_config();
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(ticks) = cli.ticks {
        config.max_ticks = ticks;
    }
    if let Some(control) = cli.control {
        config.control_mode = control;
    }
    if cli.offline {
        config.generation = GenerationMode::Offline;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config
}

fn pacing_config(cli: &Cli, file_config: &FileConfig) -> PacingConfig {
    let pacing = file_config.to_pacing_config();
    match cli.interval_ms {
        Some(ms) => pacing.with_base_interval_ms(ms),
        None => pacing,
    }
}

fn build_engine(cli: &Cli, file_config: &FileConfig, config: EngineConfig) -> Engine {
    let mut generator = OfflineGenerator::new();
    if let Some(n) = cli.ethics_fail_every {
        generator = generator.with_ethics_fail_every(n);
    }

    let observer: Arc<dyn SessionObserver> = match (cli.quiet, cli.output) {
        (true, _) | (false, OutputFormat::Json) => Arc::new(NoObserver),
        (false, _) if cli.verbose > 0 => Arc::new(SimpleObserver),
        (false, _) => Arc::new(ProgressObserver::new()),
    };

    let mut engine = Engine::new(config, Arc::new(generator))
        .with_validator(Arc::new(FieldSchemaValidator::default()))
        .with_health_probe(Arc::new(HeuristicHealthProbe::default()))
        .with_observer(observer);

    let transcript = cli
        .dispatch_log
        .clone()
        .or_else(|| file_config.logging.dispatch_log.clone());
    if let Some(path) = transcript
        && let Some(logger) = JsonlDispatchLogger::new(FileLoggingConfig::expand(&path))
    {
        info!(path = %logger.path().display(), "Writing dispatch transcript");
        engine = engine.with_dispatch_logger(Arc::new(logger));
    }
    engine
}

/// Ctrl-C: pause between ticks, persist the run, then stop the runner.
async fn interrupt(
    handle: &SessionHandle,
    task: JoinHandle<SessionOutcome>,
) -> Result<SessionOutcome> {
    eprintln!("\nInterrupted; saving snapshot...");
    handle.pause().await?;
    match handle.snapshot().await {
        Ok(location) => eprintln!("Snapshot saved to {} (resume with --restore)", location),
        Err(e) => warn!("Snapshot failed: {}", e),
    }
    handle.shutdown().await?;
    Ok(task.await?)
}
