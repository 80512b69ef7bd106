//! Camera value types and the animation pipeline.
//!
//! [`CameraAnimator`]s interpolate between two [`CameraOptions`], the
//! [`CameraAnimatorsRunner`] advances them once per frame, and the
//! [`CameraAnimationsManager`] is the usual way to start one.
//!
//! # Example
//!
//! ```ignore
//! let runner = CameraAnimatorsRunner::new(Rc::new(SystemClock));
//! let manager = CameraAnimationsManager::new(runner.clone(), map, Rc::new(SystemClock));
//!
//! manager.ease_to(
//!     CameraOptions::new().zoom(14.0),
//!     Duration::from_millis(800),
//!     TimingFunction::EaseOut,
//!     AnimationOwner::CAMERA_ANIMATIONS_MANAGER,
//!     None,
//! );
//!
//! // every frame
//! runner.update();
//! ```

pub mod animatable;
pub mod animator;
pub mod clock;
pub mod manager;
pub mod options;
pub mod owner;
pub mod runner;
pub mod timing;

pub use animatable::Animatable;
pub use animator::{AnimatingPosition, AnimationCompletion, AnimatorState, CameraAnimator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::CameraAnimationsManager;
pub use options::{CameraFields, CameraOptions, CameraState, Coordinate, EdgeInsets, ScreenPoint};
pub use owner::AnimationOwner;
pub use runner::CameraAnimatorsRunner;
pub use timing::TimingFunction;
