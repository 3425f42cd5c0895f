use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use glint_capture::{CaptureAgent, HttpFrameSink, ScreenFrameSource};
use glint_core::TargetId;
use glint_engine::{
    EngineConfig, HeadlessBackend, HeadlessSurface, HttpSyncApi, PushListener, SyncEngine,
};
use glint_store::{MemoryStore, SqliteStore, StateStore};
use glint_telemetry::{init_telemetry, TelemetryConfig};

#[derive(Parser)]
#[command(name = "glint", version, about = "Live link widget: sync engine and capture agent")]
struct Cli {
    /// Base URL of the backend API.
    #[arg(long, default_value = "http://127.0.0.1:5000", global = true)]
    api_base: String,

    /// Disable the SQLite log sink.
    #[arg(long, global = true)]
    no_log_db: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the synchronization engine with a headless host surface.
    Widget {
        /// Push channel endpoint.
        #[arg(long, default_value = "ws://127.0.0.1:5000/socket")]
        push_url: String,

        /// Poll interval in milliseconds.
        #[arg(long, default_value_t = 800)]
        poll_interval_ms: u64,

        /// Takeover state database. Defaults to ~/.glint/state.db.
        #[arg(long)]
        state_db: Option<PathBuf>,
    },
    /// Run the capture agent against the primary display.
    Capture {
        /// Identifier reported with every frame.
        #[arg(long, default_value = "display:0")]
        target: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _telemetry = init_telemetry(TelemetryConfig {
        log_to_sqlite: !cli.no_log_db,
        ..Default::default()
    });

    match cli.command {
        Command::Widget {
            push_url,
            poll_interval_ms,
            state_db,
        } => run_widget(cli.api_base, push_url, poll_interval_ms, state_db).await,
        Command::Capture { target } => run_capture(cli.api_base, target).await,
    }
}

async fn run_widget(
    api_base: String,
    push_url: String,
    poll_interval_ms: u64,
    state_db: Option<PathBuf>,
) -> Result<()> {
    let api = HttpSyncApi::new(&api_base)?;
    let store = open_store(state_db);
    let surface = Arc::new(HeadlessSurface::new());

    let config = EngineConfig {
        api_base,
        poll_interval: Duration::from_millis(poll_interval_ms),
    };
    let (engine, commands) = SyncEngine::new(api, store, surface, HeadlessBackend::new(), config);

    tokio::spawn(PushListener::new(push_url, commands).run());
    let engine_task = tokio::spawn(engine.run());

    info!("widget engine running");
    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    engine_task.abort();
    Ok(())
}

fn open_store(state_db: Option<PathBuf>) -> Arc<dyn StateStore> {
    let path = state_db.unwrap_or_else(|| {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
            .join(".glint/state.db")
    });
    match SqliteStore::open(&path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, path = %path.display(),
                "takeover state database unavailable, state will not survive restarts");
            Arc::new(MemoryStore::new())
        }
    }
}

async fn run_capture(api_base: String, target: String) -> Result<()> {
    let source = ScreenFrameSource::primary();
    let sink = HttpFrameSink::new(&api_base)?;
    let (agent, handle) = CaptureAgent::new(source, sink);
    let agent_task = tokio::spawn(agent.run());

    let status = handle.start(TargetId::from_raw(target)).await;
    info!(?status, "capture agent running");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    handle.stop().await;
    agent_task.abort();
    Ok(())
}
