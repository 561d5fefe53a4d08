//! Graph walker state machine

use serde::{Deserialize, Serialize};

/// States of a single marshal or unmarshal pass
///
/// State transitions:
/// ```text
/// NotStarted → InProgress → Done
///                   │
///                   └──────→ Failed
/// ```
///
/// A walker is single-use: both terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkState {
    /// The walker was created but has not traversed anything
    #[default]
    NotStarted,
    /// A traversal is running and owns the reference table
    InProgress,
    /// The tree was fully resolved
    Done,
    /// A strategy error aborted the traversal
    Failed,
}

impl WalkState {
    /// Check if this state can transition to the target state
    pub fn can_transition_to(&self, target: WalkState) -> bool {
        use WalkState::*;
        matches!(
            (self, target),
            (NotStarted, InProgress) | (InProgress, Done) | (InProgress, Failed)
        )
    }

    /// Check if the walker is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, WalkState::Done | WalkState::Failed)
    }

    /// Get a human-readable description of this state
    pub fn description(&self) -> &'static str {
        match self {
            WalkState::NotStarted => "Walker has not started",
            WalkState::InProgress => "Walker is traversing the graph",
            WalkState::Done => "Walker resolved the whole graph",
            WalkState::Failed => "Walker aborted on an error",
        }
    }
}

impl std::fmt::Display for WalkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkState::NotStarted => write!(f, "NotStarted"),
            WalkState::InProgress => write!(f, "InProgress"),
            WalkState::Done => write!(f, "Done"),
            WalkState::Failed => write!(f, "Failed"),
        }
    }
}
