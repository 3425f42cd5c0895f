//! The client synchronization & takeover engine.
//!
//! Two independent producers (the update poller and the push channel
//! listener) feed one reducer that owns the takeover state machine and
//! the renderer adapter. The embedding page and the rendering library sit
//! behind the [`HostSurface`] and [`RenderBackend`] seams, so the whole
//! engine runs without a browser.

pub mod api;
pub mod engine;
mod poller;
pub mod push;
pub mod renderer;
pub mod surface;
pub mod takeover;
#[cfg(test)]
mod testkit;

pub use api::{HttpSyncApi, SyncApi};
pub use engine::{EngineCommand, EngineConfig, SyncEngine};
pub use push::PushListener;
pub use renderer::{HeadlessBackend, RenderBackend, RendererAdapter};
pub use surface::{HeadlessSurface, HostSurface};
pub use takeover::{TakeoverController, TakeoverState};
