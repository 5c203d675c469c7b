//! Lifecycle of a single render invocation.

use std::fmt;

/// Phase of a render invocation.
///
/// ```text
/// NotStarted -> Spawned -> StreamsDraining -> ChildExited -> Succeeded
///                                                         \-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Nothing has happened yet.
    NotStarted,
    /// The child process exists and owns three pipes.
    Spawned,
    /// Stdin is being fed while stdout and stderr are drained.
    StreamsDraining,
    /// Both output streams reached EOF and the exit status was collected.
    ChildExited,
    /// The child exited with status zero.
    Succeeded,
    /// The child exited with a non-zero status.
    Failed,
}

impl RenderState {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Spawned)
                | (Self::Spawned, Self::StreamsDraining)
                | (Self::StreamsDraining, Self::ChildExited)
                | (Self::ChildExited, Self::Succeeded)
                | (Self::ChildExited, Self::Failed)
        )
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not-started",
            Self::Spawned => "spawned",
            Self::StreamsDraining => "streams-draining",
            Self::ChildExited => "child-exited",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks the state of one invocation and traces each transition.
#[derive(Debug)]
pub(crate) struct StateTracker {
    state: RenderState,
}

impl StateTracker {
    pub(crate) fn new() -> Self {
        Self {
            state: RenderState::NotStarted,
        }
    }

    pub(crate) fn state(&self) -> RenderState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: RenderState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal render transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!(from = %self.state, to = %next, "render state");
        self.state = next;
    }
}
