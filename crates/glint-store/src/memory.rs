use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::StoreError;
use crate::record::TakeoverRecord;
use crate::StateStore;

/// In-memory store. Used in tests and as the silent degradation path when
/// the on-disk store cannot be opened: the widget keeps working, the
/// record just does not survive a reload.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn save(&self, record: &TakeoverRecord) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();
        for (key, value) in record.to_pairs() {
            entries.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn load(&self) -> Result<Option<TakeoverRecord>, StoreError> {
        let entries = self.entries.lock();
        TakeoverRecord::from_pairs(|key| entries.get(key).map(String::as_str))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.entries.lock().clear();
        Ok(())
    }
}
