//! Process-wide model handle storage. Mirrors the teacher application's
//! `SharedLlamaState = Arc<Mutex<Option<LlamaState>>>` pattern: the handle
//! is lazily constructed on first use, guarded by a single mutex, and
//! released once at teardown — never touched directly by `LocalResolver` or
//! `HybridRouter`, which only ever see a borrowed `&mut dyn ModelHandle`.

use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::model::ModelHandle;

pub struct ModelSlot {
    inner: OnceLock<Mutex<Option<Box<dyn ModelHandle>>>>,
}

impl ModelSlot {
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    fn cell(&self) -> &Mutex<Option<Box<dyn ModelHandle>>> {
        self.inner.get_or_init(|| Mutex::new(None))
    }

    /// Locks the slot, constructing the handle with `init` on first access.
    /// The returned guard holds the lock for as long as the caller needs
    /// exclusive access to the model.
    pub fn get_or_init(
        &self,
        init: impl FnOnce() -> Box<dyn ModelHandle>,
    ) -> MutexGuard<'_, Option<Box<dyn ModelHandle>>> {
        let mut guard = self.cell().lock().unwrap_or_else(|poison| poison.into_inner());
        if guard.is_none() {
            *guard = Some(init());
        }
        guard
    }

    /// Drops the handle. A later `get_or_init` call re-constructs it.
    pub fn teardown(&self) {
        if let Some(cell) = self.inner.get() {
            *cell.lock().unwrap_or_else(|poison| poison.into_inner()) = None;
        }
    }
}

impl Default for ModelSlot {
    fn default() -> Self {
        Self::new()
    }
}
