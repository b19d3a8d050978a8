//! Simulation statistics collection trait

/// Trait for collecting simulation statistics
///
/// Rules report what they did through this trait so the hot loop never
/// depends on how (or whether) the numbers are kept.
pub trait SimStats {
    /// Record that a cell moved or swapped
    fn record_cell_moved(&mut self);

    /// Record that a cell changed material in place (ignition, burn-out)
    fn record_state_change(&mut self);

    /// Record that an explosion went off
    fn record_explosion(&mut self);
}

/// A no-op implementation for when stats collection is not needed
#[derive(Default)]
pub struct NoopStats;

impl SimStats for NoopStats {
    fn record_cell_moved(&mut self) {}
    fn record_state_change(&mut self) {}
    fn record_explosion(&mut self) {}
}

/// Running totals kept by `World`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimCounters {
    pub ticks: u64,
    pub cells_moved: u64,
    pub state_changes: u64,
    pub explosions: u64,
    /// Chunks swept during the most recent tick
    pub active_chunks: usize,
}

impl SimStats for SimCounters {
    fn record_cell_moved(&mut self) {
        self.cells_moved += 1;
    }

    fn record_state_change(&mut self) {
        self.state_changes += 1;
    }

    fn record_explosion(&mut self) {
        self.explosions += 1;
    }
}
