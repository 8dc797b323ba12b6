use std::sync::atomic::{AtomicU32, Ordering};

/// Global per-tick allowance of chunk scans.
///
/// Shared by the chunk-availability path, the deferred queue and rescan batches, so
/// the total number of scans in one tick never exceeds the configured limit no matter
/// which path asks.
#[derive(Debug, Default)]
pub struct ScanBudget {
    remaining: AtomicU32,
}

impl ScanBudget {
    /// Creates a budget holding `limit` scans.
    pub fn new(limit: u32) -> Self {
        Self {
            remaining: AtomicU32::new(limit),
        }
    }

    /// Refills the budget at the start of a tick.
    pub fn reset(&self, limit: u32) {
        self.remaining.store(limit, Ordering::Release);
    }

    /// Takes one scan from the budget. Returns `false` once it is spent.
    pub fn try_acquire(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok()
    }

    /// Scans still available this tick.
    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::Acquire)
    }
}
