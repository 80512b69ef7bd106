use super::state::StateHandle;
use super::transition::TransitionHandle;

/// What currently controls the camera.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ViewportStatus {
    /// Nothing; the camera is left to gestures and direct calls.
    #[default]
    Idle,
    /// A state is updating the camera.
    State(StateHandle),
    /// A transition is moving the camera towards its destination state.
    Transition(TransitionHandle, StateHandle),
}

impl ViewportStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, ViewportStatus::Idle)
    }

    pub fn state(&self) -> Option<&StateHandle> {
        match self {
            ViewportStatus::State(state) => Some(state),
            _ => None,
        }
    }

    /// The state a transition is heading to.
    pub fn destination(&self) -> Option<&StateHandle> {
        match self {
            ViewportStatus::Transition(_, to_state) => Some(to_state),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewportStatusChangeReason {
    IdleRequested,
    TransitionStarted,
    TransitionSucceeded,
    TransitionFailed,
    UserInteraction,
    StateRequested,
}

/// A status change as reported by [`Viewport::change_signal`](super::Viewport::change_signal).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusChange {
    pub from: ViewportStatus,
    pub to: ViewportStatus,
    pub reason: ViewportStatusChangeReason,
}
