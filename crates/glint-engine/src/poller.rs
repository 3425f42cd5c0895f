//! The poll side of the engine: interval-driven fetch, fingerprint
//! gating, and overlay-mode status checks.

use glint_core::{render_fingerprint, translate};
use glint_store::StateStore;
use tracing::{debug, warn};

use crate::api::SyncApi;
use crate::engine::SyncEngine;
use crate::renderer::RenderBackend;
use crate::surface::HostSurface;

impl<A, S, H, B> SyncEngine<A, S, H, B>
where
    A: SyncApi,
    S: StateStore + ?Sized,
    H: HostSurface,
    B: RenderBackend,
{
    /// One poll tick. While an overlay is up only the takeover status is
    /// checked; a server-side deactivation tears it down and immediately
    /// resumes a normal cycle.
    pub(crate) async fn poll_cycle(&mut self) {
        if self.takeover.is_overlay_active() {
            if self.check_takeover_status().await {
                self.sync_once().await;
            }
            return;
        }
        self.sync_once().await;
    }

    /// Returns true when the server reported the takeover over and the
    /// overlay was torn down.
    async fn check_takeover_status(&mut self) -> bool {
        match self.api.takeover_status().await {
            Ok(status) if !status.active => {
                self.takeover.deactivate();
                true
            }
            Ok(_) => false,
            Err(e) => {
                // Unreachable server while overlaid: hold the overlay.
                debug!(error = %e, error_kind = e.error_kind(), "takeover status check failed");
                false
            }
        }
    }

    /// One normal synchronization pass: fetch style and content together,
    /// honor any takeover the content carries, and re-render only when the
    /// style-plus-link fingerprint changed.
    pub(crate) async fn sync_once(&mut self) {
        let (style, content) =
            match tokio::join!(self.api.fetch_style(), self.api.fetch_content()) {
                (Ok(style), Ok(content)) => (style, content),
                (Err(e), _) | (_, Err(e)) => {
                    debug!(error = %e, error_kind = e.error_kind(), "poll failed");
                    self.surface.show_spinner();
                    return;
                }
            };

        self.current_style = style;

        if let Some(directive) = content.takeover_directive() {
            self.takeover.apply(directive);
            return;
        }

        let link = match content.link {
            Some(link) if !link.is_empty() => link,
            _ => {
                self.surface.show_spinner();
                return;
            }
        };

        let fingerprint = render_fingerprint(&self.current_style, &link);
        if self.last_fingerprint.as_deref() == Some(fingerprint.as_str()) {
            self.surface.hide_spinner();
            return;
        }

        let options = translate(&self.current_style);
        match self.renderer.render(&link, &options).await {
            Ok(()) => {
                self.last_fingerprint = Some(fingerprint);
                self.surface.hide_spinner();
            }
            Err(e) => {
                warn!(error = %e, error_kind = e.error_kind(), "render failed");
                self.surface.show_spinner();
            }
        }
    }
}
