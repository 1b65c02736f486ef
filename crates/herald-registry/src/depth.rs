//! Per-thread nested dispatch counter.

use std::cell::Cell;

thread_local! {
    static DEPTH: Cell<u8> = const { Cell::new(0) };
}

/// Marks one dispatch in progress on the current thread.
///
/// The count is released on drop, so it stays correct when a listener
/// panic unwinds through `dispatch`.
pub(crate) struct DepthGuard(());

impl DepthGuard {
    /// Enters one level. Returns the current depth as `Err` when it has
    /// already reached `max_depth`.
    pub(crate) fn enter(max_depth: u8) -> Result<Self, u8> {
        DEPTH.with(|depth| {
            let current = depth.get();
            if current >= max_depth {
                return Err(current);
            }
            depth.set(current + 1);
            Ok(Self(()))
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
