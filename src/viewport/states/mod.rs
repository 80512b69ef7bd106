mod camera;
mod follow;
mod overview;

pub use camera::CameraViewportState;
pub use follow::{FollowBearing, FollowOptions, FollowState, TrackedPosition};
pub use overview::{OverviewOptions, OverviewState};
