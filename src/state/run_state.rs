/// Run state definitions for tracking a mirror run
///
/// A run moves `Idle → Running → {Completed, Stopped, Failed}`. A run that never
/// managed to create its output tree may also go straight from `Idle` to `Failed`.
use std::fmt;

/// Represents the current state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    // ===== Active States =====
    /// Run has been created but the output tree does not exist yet
    Idle,

    /// Frontier loop is processing pages
    Running,

    // ===== Terminal States =====
    /// Frontier emptied or the page budget was reached
    Completed,

    /// Cancellation was observed; partial output is kept
    Stopped,

    /// An internal error ended the run; partial output is kept
    Failed,
}

impl RunState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Failed)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Stopped)
                | (Self::Running, Self::Failed)
        )
    }

    /// Returns the lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
