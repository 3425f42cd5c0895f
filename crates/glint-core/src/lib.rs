//! Core data model for the glint widget: style configuration, content
//! state, render option translation, and the shared error taxonomy.
//!
//! Everything in this crate is pure: no I/O, no clocks, no storage.

pub mod content;
pub mod error;
pub mod ids;
pub mod render;
pub mod style;

pub use content::{
    ContentState, PushFrame, TakeoverDirective, TakeoverPayload, TakeoverStatus,
    PUSH_EVENT_TAKEOVER_OFF, PUSH_EVENT_TAKEOVER_ON,
};
pub use error::SyncError;
pub use ids::TargetId;
pub use render::{render_fingerprint, translate, RenderOptions};
pub use style::{ColorValue, StyleConfig};
