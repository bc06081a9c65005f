// # parceld - Parcel Tracking Daemon
//
// The parceld daemon is a thin integration layer responsible for:
// 1. Reading settings from environment variables and the configuration file
// 2. Initializing logging and the runtime
// 3. Building the DHL tracking source and the SMTP notifier
// 4. Running the tracking engine until the parcel is delivered
//
// All tracking logic lives in parcel-core.
//
// ## Environment
//
// - `PARCEL_CONFIG`: Path to the TOML configuration file (default: `dhl_details.toml`)
// - `PARCEL_LOG_LEVEL`: trace, debug, info, warn or error (default: info)
// - `PARCEL_MODE`: set to `dry-run` to log emails instead of sending them
//
// ## Example
//
// ```bash
// export PARCEL_CONFIG=/etc/parceld/dhl_details.toml
// export PARCEL_LOG_LEVEL=debug
//
// parceld
// ```

use anyhow::Result;
use parcel_core::{EngineEvent, TokioSleeper, TrackerConfig, TrackingEngine};
use parcel_notify_smtp::SmtpNotifier;
use parcel_tracker_dhl::DhlTracker;
use std::env;
use std::process::ExitCode;
use tokio::sync::{mpsc, oneshot};
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Default configuration file, relative to the working directory
const DEFAULT_CONFIG_PATH: &str = "dhl_details.toml";

/// Exit codes for different termination scenarios
///
/// - 0: Parcel delivered, or clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParcelExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<ParcelExitCode> for ExitCode {
    fn from(code: ParcelExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Process settings taken from the environment
struct Settings {
    config_path: String,
    log_level: String,
    dry_run: bool,
}

impl Settings {
    /// Load settings from environment variables
    fn from_env() -> Self {
        Self {
            config_path: env::var("PARCEL_CONFIG")
                .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
            log_level: env::var("PARCEL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            dry_run: env::var("PARCEL_MODE")
                .unwrap_or_default()
                .eq_ignore_ascii_case("dry-run"),
        }
    }

    /// Map the configured log level to a tracing level
    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "PARCEL_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn main() -> ExitCode {
    let settings = Settings::from_env();

    let log_level = match settings.level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ParcelExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ParcelExitCode::ConfigError.into();
    }

    info!("Starting parceld");

    let config = match TrackerConfig::from_file(&settings.config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ParcelExitCode::ConfigError.into();
        }
    };
    info!(
        "Configuration loaded from {}: tracking {}",
        settings.config_path, config.dhl.tracking_number
    );
    debug!("{:?}", config);

    // Polling is strictly sequential; one thread is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ParcelExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_tracker(&config, settings.dry_run)).into()
}

/// Build and run the tracker, mapping the outcome to an exit code
async fn run_tracker(config: &TrackerConfig, dry_run: bool) -> ParcelExitCode {
    // The SMTP transport needs a runtime to be built
    let engine = match build_engine(config, dry_run) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup error: {}", e);
            return ParcelExitCode::ConfigError;
        }
    };

    serve(engine, None).await
}

/// Build the engine and its components from configuration
fn build_engine(
    config: &TrackerConfig,
    dry_run: bool,
) -> Result<(TrackingEngine, mpsc::Receiver<EngineEvent>)> {
    let source = DhlTracker::new(&config.dhl)?;
    let notifier = SmtpNotifier::new(&config.email, dry_run)?;

    let engine = TrackingEngine::new(
        Box::new(source),
        Box::new(notifier),
        Box::new(TokioSleeper),
        config.engine.clone(),
    )?;

    Ok(engine)
}

/// Run an engine to completion and pick the exit code
///
/// `shutdown_rx` of `None` stops on SIGINT.
async fn serve(
    engine: (TrackingEngine, mpsc::Receiver<EngineEvent>),
    shutdown_rx: Option<oneshot::Receiver<()>>,
) -> ParcelExitCode {
    match run_daemon(engine, shutdown_rx).await {
        Ok(()) => ParcelExitCode::CleanShutdown,
        Err(e) => {
            error!("Daemon error: {}", e);
            ParcelExitCode::RuntimeError
        }
    }
}

/// Run the daemon until delivery or shutdown
async fn run_daemon(
    (mut engine, mut events): (TrackingEngine, mpsc::Receiver<EngineEvent>),
    shutdown_rx: Option<oneshot::Receiver<()>>,
) -> Result<()> {
    // Engine events are only logged; the engine never waits on this task
    let monitor = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Engine event: {:?}", event);
        }
    });

    let result = engine.run_with_shutdown(shutdown_rx).await;

    // Dropping the engine closes the event channel and ends the monitor
    drop(engine);
    let _ = monitor.await;

    result.map_err(Into::into)
}
