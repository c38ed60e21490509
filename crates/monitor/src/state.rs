use std::fmt;

/// Lifecycle of one monitoring cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleState {
    Pending,
    Fetching,
    Diffing,
    Persisting,
    Delivering,
    Done,
    Failed,
}

impl CycleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CycleState::Done | CycleState::Failed)
    }

    /// Whether `self -> next` is a legal step
    pub fn can_transition_to(&self, next: CycleState) -> bool {
        use CycleState::*;
        matches!(
            (self, next),
            (Pending, Fetching)
                | (Fetching, Diffing)
                | (Diffing, Persisting)
                | (Persisting, Delivering)
                | (Delivering, Done)
                | (Pending, Failed)
                | (Fetching, Failed)
                | (Diffing, Failed)
                | (Persisting, Failed)
        )
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleState::Pending => "pending",
            CycleState::Fetching => "fetching",
            CycleState::Diffing => "diffing",
            CycleState::Persisting => "persisting",
            CycleState::Delivering => "delivering",
            CycleState::Done => "done",
            CycleState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}
