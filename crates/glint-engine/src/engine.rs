use std::sync::Arc;
use std::time::Duration;

use glint_core::{StyleConfig, TakeoverDirective};
use glint_store::StateStore;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::SyncApi;
use crate::renderer::{RenderBackend, RendererAdapter};
use crate::surface::HostSurface;
use crate::takeover::TakeoverController;

/// Interval between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(800);

const COMMAND_BUFFER: usize = 16;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub api_base: String,
    pub poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:5000".to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Command from an out-of-band producer, currently the push listener.
#[derive(Clone, Debug)]
pub enum EngineCommand {
    Activate(TakeoverDirective),
    Deactivate,
}

/// The reducer at the center of the engine. Both producers funnel into
/// one place: poll cycles run on the interval, push commands arrive on
/// the channel, and all state transitions happen here sequentially.
pub struct SyncEngine<A, S: ?Sized, H, B> {
    pub(crate) api: A,
    pub(crate) takeover: TakeoverController<S, H>,
    pub(crate) surface: Arc<H>,
    pub(crate) renderer: RendererAdapter<B>,
    pub(crate) current_style: StyleConfig,
    pub(crate) last_fingerprint: Option<String>,
    commands: mpsc::Receiver<EngineCommand>,
    // Held so the command channel stays open when no push producer is
    // attached and the engine runs on polling alone.
    _commands_tx: mpsc::Sender<EngineCommand>,
    config: EngineConfig,
}

impl<A, S, H, B> SyncEngine<A, S, H, B>
where
    A: SyncApi,
    S: StateStore + ?Sized,
    H: HostSurface,
    B: RenderBackend,
{
    /// Build an engine and the command sender producers use to reach it.
    pub fn new(
        api: A,
        store: Arc<S>,
        surface: Arc<H>,
        backend: B,
        config: EngineConfig,
    ) -> (Self, mpsc::Sender<EngineCommand>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let takeover = TakeoverController::new(store, surface.clone(), &config.api_base);
        let engine = Self {
            api,
            takeover,
            surface,
            renderer: RendererAdapter::new(backend),
            current_style: StyleConfig::default(),
            last_fingerprint: None,
            commands: rx,
            _commands_tx: tx.clone(),
            config,
        };
        (engine, tx)
    }

    /// Reconcile persisted state, then alternate between interval polls
    /// and push commands until the task is dropped.
    pub async fn run(mut self) {
        self.reconcile_startup().await;

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Startup already polled; skip the interval's immediate first tick.
        ticker.reset();

        loop {
            tokio::select! {
                _ = ticker.tick() => self.poll_cycle().await,
                Some(command) = self.commands.recv() => self.handle_command(command).await,
            }
        }
    }

    pub(crate) async fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Activate(directive) => self.takeover.apply(directive),
            EngineCommand::Deactivate => {
                self.takeover.deactivate();
                // Resume rendering without waiting for the next tick.
                self.sync_once().await;
            }
        }
    }

    /// A persisted takeover record is a claim, not a fact: the overlay it
    /// describes is only restored once the server confirms it, and the
    /// record is dropped when the server disagrees. An unreachable server
    /// is not disagreement; the record stands and polling settles it.
    pub(crate) async fn reconcile_startup(&mut self) {
        let record = match self.takeover.load_record() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "persisted takeover state unreadable, discarding");
                self.takeover.clear_record();
                None
            }
        };

        if let Some(record) = record {
            if record.active && !record.file_ref.is_empty() {
                match self.api.takeover_status().await {
                    Ok(status) if status.active => {
                        // The server's directive wins; an active status with
                        // no usable target falls back to the persisted file.
                        let directive = status
                            .takeover_directive()
                            .unwrap_or(TakeoverDirective::File(record.file_ref));
                        info!(directive = ?directive, "restoring takeover after reload");
                        self.takeover.apply(directive);
                        return;
                    }
                    Ok(_) => {
                        info!("server no longer reports takeover, clearing persisted state");
                        self.takeover.clear_record();
                    }
                    Err(e) => {
                        debug!(error = %e, error_kind = e.error_kind(),
                            "takeover status unavailable at startup, record kept unverified");
                    }
                }
            } else {
                self.takeover.clear_record();
            }
        }

        self.surface.show_spinner();
        self.poll_cycle().await;
    }
}
