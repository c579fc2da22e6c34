use chrono::FixedOffset;
use storage::{AttendanceStore, SharedStore};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
    offset: FixedOffset,
}

impl AppState {
    pub fn new(store: SharedStore, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    pub fn store(&self) -> &dyn AttendanceStore {
        self.store.as_ref()
    }

    /// Offset used to decide the local day and month of a request
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}
