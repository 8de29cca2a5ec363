//! orgusers
//!
//! Export the users of an organization from a MongoDB directory as JSON.
//!
//! # Usage
//!
//! ```bash
//! orgusers -murl db.internal -mport 27017 -mdb idm -org acme -file acme.json
//! ```

use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use orgusers::cli::{CliInterface, startup_report};
use orgusers::connection::{self, ConnectionManager};
use orgusers::error::Result;
use orgusers::executor::{self, ExportJob, ExportSummary, OperationScope};
use orgusers::formatter::JsonFormatter;

/// Application entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match CliInterface::new() {
        Ok(cli) => cli,
        Err(e) => {
            if let Some(report) = startup_report(&e) {
                eprintln!("{report}");
            }
            std::process::exit(1);
        }
    };

    initialize_logging(&cli);

    // Failures are logged where they happen.
    if run(&cli).await.is_err() {
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Handle subcommands
/// 2. Build and validate the connection
/// 3. Resolve the organization, fetch its users, export them
/// 4. Shut the client down, whatever the outcome
async fn run(cli: &CliInterface) -> Result<()> {
    if cli.handle_subcommand()? {
        return Ok(());
    }

    let target = cli.connection_target();
    let scope = OperationScope::new(cli.timeout());

    let options = connection::client_options(&target, scope.budget())
        .await
        .inspect_err(|e| {
            error!(
                kind = e.kind(),
                operation = "build_connection",
                uri = %target.sanitized(),
                error = %e,
                "invalid connection settings"
            )
        })?;

    let manager = ConnectionManager::connect(options, &target.database).inspect_err(|e| {
        error!(
            kind = e.kind(),
            operation = "connect",
            uri = %target.sanitized(),
            error = %e,
            "couldn't connect"
        )
    })?;

    info!(
        uri = %target.sanitized(),
        database = %target.database,
        timeout = ?scope.budget(),
        "connecting"
    );

    let job = cli.export_job();
    let formatter = JsonFormatter::new(cli.color_enabled() && job.destination.is_terminal());

    let ctrl_c_handle = spawn_ctrl_c_handler(&scope);
    let outcome = connect_and_export(&manager, &scope, &job, &formatter).await;
    ctrl_c_handle.abort();

    manager.disconnect().await;
    outcome.map(|_| ())
}

/// Ping the deployment, then run the export pipeline
async fn connect_and_export(
    manager: &ConnectionManager,
    scope: &OperationScope,
    job: &ExportJob,
    formatter: &JsonFormatter,
) -> Result<ExportSummary> {
    manager.ping(scope).await.inspect_err(|e| {
        error!(
            kind = e.kind(),
            operation = "connect",
            error = %e,
            "couldn't connect"
        )
    })?;

    executor::run_export(&manager.directory(), scope, job, formatter).await
}

/// Cancel the scope on Ctrl+C
fn spawn_ctrl_c_handler(scope: &OperationScope) -> tokio::task::JoinHandle<()> {
    let cancel_token = scope.get_cancel_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupted, cancelling outstanding operations");
                cancel_token.cancel();
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for Ctrl+C");
            }
        }
    })
}

/// Initialize logging system based on verbosity level
///
/// Logs go to stderr so they never mix with exported data on stdout.
/// `RUST_LOG`, when set, takes precedence over flags and config.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.log_level().to_tracing_level();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
