//! Failure budget and the watch state machine

use helm_crds::HelmRequestPhase;

/// Failed observations tolerated when none is given
pub const DEFAULT_FAILURE_TOLERANCE: u32 = 75;

/// Watch session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Still waiting for a terminal phase
    Pending,

    /// Controller reported the request as synced
    Synced,

    /// Failure budget exhausted
    Failed,

    /// Deadline passed before a terminal phase
    TimedOut,
}

impl WatchState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WatchState::Pending)
    }
}

/// Count of failed observations against a limit
///
/// The count is cumulative for the whole session: a later non-failed
/// observation does not reset it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureBudget {
    failures: u32,
    limit: u32,
}

impl FailureBudget {
    /// A fresh budget; a limit of zero behaves like one
    pub fn new(limit: u32) -> Self {
        Self {
            failures: 0,
            limit: limit.max(1),
        }
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn is_exhausted(&self) -> bool {
        self.failures >= self.limit
    }

    fn record_failure(self) -> Self {
        Self {
            failures: self.failures.saturating_add(1),
            ..self
        }
    }
}

impl Default for FailureBudget {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_TOLERANCE)
    }
}

/// Fold one observed phase into the session
///
/// Returns the budget to carry into the next poll and the resulting state.
/// Timeouts are decided by the poll loop, never here.
pub fn observe(budget: FailureBudget, phase: &HelmRequestPhase) -> (FailureBudget, WatchState) {
    match phase {
        HelmRequestPhase::Synced => (budget, WatchState::Synced),
        HelmRequestPhase::Failed => {
            let budget = budget.record_failure();
            if budget.is_exhausted() {
                (budget, WatchState::Failed)
            } else {
                (budget, WatchState::Pending)
            }
        }
        HelmRequestPhase::Pending | HelmRequestPhase::Syncing | HelmRequestPhase::Unknown => {
            (budget, WatchState::Pending)
        }
    }
}
