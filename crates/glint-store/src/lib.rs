//! Persisted takeover state: a typed record behind an explicit
//! (de)serialization boundary, stored in a namespaced key-value table.
//!
//! The engine writes the record on every takeover transition, reads it
//! once at startup, and clears it on deactivation. Storage failures are
//! the caller's business to absorb; both impls report them as
//! [`StoreError`] without panicking.

pub mod error;
pub mod memory;
pub mod record;
pub mod sqlite;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use record::{TakeoverRecord, TargetKind};
pub use sqlite::SqliteStore;

/// Storage seam for the takeover record.
pub trait StateStore: Send + Sync {
    fn save(&self, record: &TakeoverRecord) -> Result<(), StoreError>;
    fn load(&self) -> Result<Option<TakeoverRecord>, StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}
