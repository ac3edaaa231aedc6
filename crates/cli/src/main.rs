// SPDX-License-Identifier: MIT
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `triadd` — the sync daemon's command-line entry point.
//!
//! `run` is the long-running mode (also the Docker `CMD`); `cycle`, `health`, and
//! `config show` are operational aids layered on the same `Config`/`Daemon` wiring
//! that `run` uses, so there is exactly one code path that assembles a daemon.

mod color;
mod exit_error;
mod output;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use triad_daemon::{Config, Daemon, DaemonError};

use exit_error::ExitError;
use output::{format_or_json, OutputFormat};

#[derive(Parser)]
#[command(name = "triadd", about = "Three-way issue tracker sync daemon")]
struct Cli {
    /// Output format shared by every subcommand.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scheduler in the foreground until signaled to stop.
    Run,
    /// Run exactly one sync cycle to completion and exit.
    Cycle,
    /// Query a running daemon's `/health` endpoint.
    Health {
        /// Base URL of the daemon's health endpoint, e.g. http://127.0.0.1:8080.
        /// Defaults to http://127.0.0.1:$HEALTH_PORT (falling back to 8080).
        #[arg(long)]
        url: Option<String>,
    },
    /// Inspect the resolved configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the resolved `Config`, loaded and validated the same way `run` does,
    /// with tokens redacted. Does not run a cycle.
    Show,
}

#[tokio::main]
async fn main() {
    let cmd = Cli::command().styles(color::styles());
    let matches = cmd.get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    init_tracing();

    if let Err(e) = dispatch(cli).await {
        eprintln!("{e}");
        std::process::exit(e.code);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn dispatch(cli: Cli) -> Result<(), ExitError> {
    match cli.command {
        Command::Run => run().await,
        Command::Cycle => cycle(cli.format).await,
        Command::Health { url } => health(url, cli.format).await,
        Command::Config { command: ConfigCommand::Show } => config_show(cli.format),
    }
}

fn load_config() -> Result<Config, ExitError> {
    Config::load().map_err(|e| ExitError::new(1, format!("configuration error: {e}")))
}

async fn run() -> Result<(), ExitError> {
    let config = load_config()?;
    let cancel = CancellationToken::new();

    let daemon = Daemon::build(&config, cancel.clone()).map_err(startup_err)?;
    tokio::spawn(triad_daemon::wiring::wait_for_shutdown_signal(cancel));

    daemon.run().await.map_err(runtime_err)
}

async fn cycle(format: OutputFormat) -> Result<(), ExitError> {
    let config = load_config()?;
    let cancel = CancellationToken::new();
    let daemon = Daemon::build(&config, cancel.clone()).map_err(startup_err)?;

    let report = daemon.run_once().await;
    cancel.cancel();

    format_or_json(format, &report, || {
        println!("status: {:?}", report.status);
        if let Some(c) = &report.last_cycle {
            println!("entities considered: {}", c.entities_considered);
            println!("writes succeeded:    {}", c.writes_succeeded);
            println!("errors:              {}", c.errors);
        }
    })
    .map_err(|e| ExitError::new(2, e.to_string()))
}

async fn health(url: Option<String>, format: OutputFormat) -> Result<(), ExitError> {
    let base = url.unwrap_or_else(|| {
        let port: u16 = std::env::var("HEALTH_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080);
        format!("http://127.0.0.1:{port}")
    });
    let endpoint = format!("{}/health", base.trim_end_matches('/'));

    let report: serde_json::Value = reqwest::get(&endpoint)
        .await
        .map_err(|e| ExitError::new(2, format!("failed to reach {endpoint}: {e}")))?
        .json()
        .await
        .map_err(|e| ExitError::new(2, format!("malformed health response from {endpoint}: {e}")))?;

    let status = report.get("status").and_then(|v| v.as_str()).unwrap_or("unknown").to_string();

    format_or_json(format, &report, || {
        println!("status: {status}");
        if let Some(last) = report.get("last_cycle") {
            println!("last cycle: {last}");
        }
    })
    .map_err(|e| ExitError::new(2, e.to_string()))?;

    if status == "unhealthy" {
        return Err(ExitError::new(1, format!("daemon at {endpoint} reports unhealthy")));
    }
    Ok(())
}

fn config_show(format: OutputFormat) -> Result<(), ExitError> {
    let config = load_config()?;
    let redacted = config.redacted();

    format_or_json(format, &redacted, || {
        let allowlist = if redacted.project_allowlist.is_empty() {
            color::muted("(none)")
        } else {
            color::literal(&redacted.project_allowlist.join(", "))
        };
        let stacks_dir = match &redacted.stacks_dir {
            Some(dir) => color::literal(&dir.display().to_string()),
            None => color::muted("(none)"),
        };
        println!("{} {}", color::header("primary_api_url:"), color::literal(&redacted.primary_api_url));
        println!("{} {}", color::header("primary_token:"), color::context(&redacted.primary_token));
        println!("{} {}", color::header("board_api_url:"), color::literal(&redacted.board_api_url));
        println!("{} {}", color::header("board_token:"), color::context(&redacted.board_token));
        println!("{} {}", color::header("local_cli_path:"), color::literal(&redacted.local_cli_path.display().to_string()));
        println!("{} {}", color::header("stacks_dir:"), stacks_dir);
        println!("{} {}", color::header("sync_interval_ms:"), color::literal(&redacted.sync_interval_ms.to_string()));
        println!("{} {}", color::header("incremental_sync:"), color::literal(&redacted.incremental_sync.to_string()));
        println!("{} {}", color::header("parallel_sync:"), color::literal(&redacted.parallel_sync.to_string()));
        println!("{} {}", color::header("max_workers:"), color::literal(&redacted.max_workers.to_string()));
        println!("{} {}", color::header("dry_run:"), color::literal(&redacted.dry_run.to_string()));
        println!("{} {}", color::header("skip_empty_projects:"), color::literal(&redacted.skip_empty_projects.to_string()));
        println!("{} {}", color::header("health_port:"), color::literal(&redacted.health_port.to_string()));
        println!("{} {}", color::header("project_allowlist:"), allowlist);
        println!("{} {}", color::header("state_db_path:"), color::literal(&redacted.state_db_path.display().to_string()));
    })
    .map_err(|e| ExitError::new(2, e.to_string()))
}

fn startup_err(e: DaemonError) -> ExitError {
    ExitError::new(1, e.to_string())
}

fn runtime_err(e: DaemonError) -> ExitError {
    let code = if e.is_startup_error() { 1 } else { 2 };
    ExitError::new(code, e.to_string())
}
