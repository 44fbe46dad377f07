//! Simulated secondary-storage latency.
//!
//! Accesses to "persistent" state (the status vectors, the inode table,
//! the block pool) insert a short busy loop, as if those structures really
//! lived on secondary storage. The loop body goes through
//! [`std::hint::black_box`] so the optimizer cannot erase it; the delay is
//! observable only through timing.

use std::hint;

/// Busy-loop iterations per simulated storage access.
const DELAY: usize = 5000;

/// Artificially delays execution.
pub(crate) fn storage_delay() {
    for _ in 0..DELAY {
        hint::black_box(());
    }
}
