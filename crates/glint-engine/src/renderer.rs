use async_trait::async_trait;
use glint_core::{RenderOptions, SyncError};
use tokio::sync::OnceCell;

/// The rendering library behind the widget.
///
/// `load` fetches or initializes the library and may fail transiently;
/// the adapter retries it on the next render rather than caching the
/// failure. `mount` creates the visual instance, `update` restyles the
/// existing one in place.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    async fn load(&self) -> Result<(), SyncError>;
    fn mount(&self, link: &str, options: &RenderOptions) -> Result<(), SyncError>;
    fn update(&self, link: &str, options: &RenderOptions) -> Result<(), SyncError>;
}

/// Lazy-loading wrapper that turns "render this" into the right backend
/// call: load once, mount on first render, update afterwards.
pub struct RendererAdapter<B> {
    backend: B,
    loaded: OnceCell<()>,
    mounted: bool,
}

impl<B: RenderBackend> RendererAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            loaded: OnceCell::new(),
            mounted: false,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub async fn render(&mut self, link: &str, options: &RenderOptions) -> Result<(), SyncError> {
        self.loaded
            .get_or_try_init(|| self.backend.load())
            .await?;

        if self.mounted {
            self.backend.update(link, options)
        } else {
            self.backend.mount(link, options)?;
            self.mounted = true;
            Ok(())
        }
    }
}

/// Backend for headless runs: renders by logging the resolved options.
#[derive(Default)]
pub struct HeadlessBackend;

impl HeadlessBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RenderBackend for HeadlessBackend {
    async fn load(&self) -> Result<(), SyncError> {
        Ok(())
    }

    fn mount(&self, link: &str, options: &RenderOptions) -> Result<(), SyncError> {
        tracing::info!(link, options = ?options, "mounting widget");
        Ok(())
    }

    fn update(&self, link: &str, options: &RenderOptions) -> Result<(), SyncError> {
        tracing::info!(link, options = ?options, "updating widget");
        Ok(())
    }
}
