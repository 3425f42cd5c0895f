use std::sync::Arc;

use glint_core::TakeoverDirective;
use glint_store::{StateStore, StoreError, TakeoverRecord};
use tracing::{info, warn};

use crate::surface::HostSurface;

/// Where the widget currently stands with respect to takeover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TakeoverState {
    /// Rendering content as usual.
    Normal,
    /// A full-viewport overlay is mounted and rendering is suspended.
    Overlay,
}

/// Owns the takeover state machine: overlay activation, navigation
/// directives, persistence across page reloads, and deactivation.
///
/// Navigation directives are fire-and-forget. The new page carries its
/// own widget instance, so nothing is persisted and no state is kept for
/// them here.
pub struct TakeoverController<S: ?Sized, H> {
    store: Arc<S>,
    surface: Arc<H>,
    uploads_base: String,
    state: TakeoverState,
}

impl<S, H> TakeoverController<S, H>
where
    S: StateStore + ?Sized,
    H: HostSurface,
{
    pub fn new(store: Arc<S>, surface: Arc<H>, api_base: &str) -> Self {
        Self {
            store,
            surface,
            uploads_base: format!("{}/uploads", api_base.trim_end_matches('/')),
            state: TakeoverState::Normal,
        }
    }

    pub fn state(&self) -> TakeoverState {
        self.state
    }

    pub fn is_overlay_active(&self) -> bool {
        self.state == TakeoverState::Overlay
    }

    /// Apply a takeover directive from either producer. Safe to call with
    /// the same directive from both the poller and the push channel.
    pub fn apply(&mut self, directive: TakeoverDirective) {
        match directive {
            TakeoverDirective::Url(url) => {
                info!(url = %url, "takeover requested navigation");
                self.surface.navigate(&url);
            }
            TakeoverDirective::File(file) => self.activate_overlay(&file),
        }
    }

    fn activate_overlay(&mut self, file: &str) {
        if self.state == TakeoverState::Overlay && self.surface.overlay_visible() {
            return;
        }

        // Persist before mounting so a reload mid-takeover restores the
        // overlay. Storage failure degrades to a session-only takeover.
        if let Err(e) = self.store.save(&TakeoverRecord::file(file)) {
            warn!(error = %e, "takeover state not persisted");
        }

        let resource_url = format!("{}/{}", self.uploads_base, file);
        info!(file, "activating takeover overlay");
        self.surface.show_overlay(&resource_url);
        self.state = TakeoverState::Overlay;
    }

    /// Tear down the overlay and clear persisted state. Harmless when no
    /// takeover is active.
    pub fn deactivate(&mut self) {
        if self.state == TakeoverState::Overlay {
            info!("deactivating takeover overlay");
        }
        self.state = TakeoverState::Normal;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "takeover state not cleared");
        }
        self.surface.remove_overlay();
    }

    pub fn load_record(&self) -> Result<Option<TakeoverRecord>, StoreError> {
        self.store.load()
    }

    pub fn clear_record(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "stale takeover state not cleared");
        }
    }
}
