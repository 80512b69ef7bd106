//! Viewport states, transitions and the status machine that arbitrates
//! between them.

mod machine;
mod state;
pub mod states;
mod status;
mod transition;
pub mod transitions;

pub use machine::{Viewport, ViewportOptions};
pub use state::{CameraHandler, StateHandle, ViewportState};
pub use states::{
    CameraViewportState, FollowBearing, FollowOptions, FollowState, OverviewOptions,
    OverviewState, TrackedPosition,
};
pub use status::{StatusChange, ViewportStatus, ViewportStatusChangeReason};
pub use transition::{TransitionCompletion, TransitionHandle, ViewportTransition};
pub use transitions::{DefaultTransition, DefaultTransitionOptions, ImmediateTransition};
