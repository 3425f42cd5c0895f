use std::sync::atomic::{AtomicBool, Ordering};

/// The embedding page, as seen by the engine.
///
/// Implementations must make `show_overlay` idempotent-safe at the page
/// level: while an overlay is mounted it covers the viewport and the page
/// must not scroll, and `remove_overlay` restores the previous scroll
/// behavior. `navigate` replaces the whole page, after which the engine
/// instance is gone.
pub trait HostSurface: Send + Sync {
    fn show_spinner(&self);
    fn hide_spinner(&self);
    fn navigate(&self, url: &str);
    fn show_overlay(&self, resource_url: &str);
    fn remove_overlay(&self);
    fn overlay_visible(&self) -> bool;
}

/// Surface for headless runs: logs every transition and tracks overlay
/// visibility so the state machine behaves as it would in a page.
#[derive(Default)]
pub struct HeadlessSurface {
    spinner: AtomicBool,
    overlay: AtomicBool,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spinner_visible(&self) -> bool {
        self.spinner.load(Ordering::SeqCst)
    }
}

impl HostSurface for HeadlessSurface {
    fn show_spinner(&self) {
        if !self.spinner.swap(true, Ordering::SeqCst) {
            tracing::debug!("showing loading state");
        }
    }

    fn hide_spinner(&self) {
        if self.spinner.swap(false, Ordering::SeqCst) {
            tracing::debug!("hiding loading state");
        }
    }

    fn navigate(&self, url: &str) {
        tracing::info!(url, "navigation requested");
    }

    fn show_overlay(&self, resource_url: &str) {
        self.overlay.store(true, Ordering::SeqCst);
        tracing::info!(resource_url, "overlay mounted");
    }

    fn remove_overlay(&self) {
        if self.overlay.swap(false, Ordering::SeqCst) {
            tracing::info!("overlay removed");
        }
    }

    fn overlay_visible(&self) -> bool {
        self.overlay.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_visibility_tracks_mount_and_remove() {
        let surface = HeadlessSurface::new();
        assert!(!surface.overlay_visible());

        surface.show_overlay("http://127.0.0.1:5000/uploads/promo.html");
        assert!(surface.overlay_visible());

        surface.remove_overlay();
        assert!(!surface.overlay_visible());
    }

    #[test]
    fn spinner_toggles() {
        let surface = HeadlessSurface::new();
        surface.show_spinner();
        assert!(surface.spinner_visible());
        surface.hide_spinner();
        assert!(!surface.spinner_visible());
    }
}
