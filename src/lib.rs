//! Viewport state machine and camera animation coordinator for map renderers.
//!
//! The crate decides which logical owner may move a map camera at any
//! moment: user gestures, one-shot animated transitions, continuous follow
//! behaviours or programmatic sets. The host engine plugs in through the
//! traits in [`map`] and calls [`MapViewport::tick`] once per frame.
//!
//! # Example
//!
//! ```ignore
//! let map_viewport = MapViewport::with_config(
//!     map,
//!     ViewportConfig::default().default_transition(
//!         DefaultTransitionOptions::default().max_duration(Duration::from_secs(2)),
//!     ),
//! );
//!
//! let position = Signal::empty();
//! let follow = map_viewport.make_follow_state(position.clone(), FollowOptions::default());
//! map_viewport.viewport().transition(follow.into(), None, None);
//!
//! // every frame
//! map_viewport.tick();
//! ```

pub mod camera;
pub mod map;
pub mod reactive;
pub mod viewport;

use std::rc::Rc;

use camera::{
    CameraAnimationsManager, CameraAnimatorsRunner, CameraOptions, Clock, EdgeInsets, SystemClock,
};
use map::{CameraFit, MapCamera, StyleMetadata};
use reactive::Signal;
use viewport::{
    CameraViewportState, DefaultTransition, DefaultTransitionOptions, FollowOptions, FollowState,
    ImmediateTransition, OverviewOptions, OverviewState, TrackedPosition, Viewport,
    ViewportOptions,
};

pub mod prelude {
    pub use crate::camera::{
        AnimatingPosition, AnimationOwner, CameraAnimationsManager, CameraAnimatorsRunner,
        CameraOptions, CameraState, Clock, Coordinate, EdgeInsets, ManualClock, ScreenPoint,
        SystemClock, TimingFunction,
    };
    pub use crate::map::{CameraFit, MapCamera, StyleMetadata};
    pub use crate::reactive::{
        create_signal, Cancelable, Coordinator, CoordinatorHandle, SchedulerError, Signal,
    };
    pub use crate::viewport::{
        CameraViewportState, DefaultTransition, DefaultTransitionOptions, FollowBearing,
        FollowOptions, FollowState, ImmediateTransition, OverviewOptions, OverviewState,
        StateHandle, StatusChange, TrackedPosition, TransitionHandle, Viewport, ViewportOptions,
        ViewportState, ViewportStatus, ViewportStatusChangeReason, ViewportTransition,
    };
    pub use crate::{MapViewport, ViewportConfig};
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportConfig {
    pub viewport: ViewportOptions,
    pub default_transition: DefaultTransitionOptions,
    pub animations_enabled: bool,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportOptions::default(),
            default_transition: DefaultTransitionOptions::default(),
            animations_enabled: true,
        }
    }
}

impl ViewportConfig {
    pub fn viewport(mut self, options: ViewportOptions) -> Self {
        self.viewport = options;
        self
    }

    pub fn default_transition(mut self, options: DefaultTransitionOptions) -> Self {
        self.default_transition = options;
        self
    }

    /// Reduced motion: when `false`, camera easing completes immediately.
    pub fn animations_enabled(mut self, enabled: bool) -> Self {
        self.animations_enabled = enabled;
        self
    }
}

/// Everything needed to drive one map's camera, wired together.
pub struct MapViewport {
    map: Rc<dyn MapCamera>,
    runner: Rc<CameraAnimatorsRunner>,
    manager: Rc<CameraAnimationsManager>,
    viewport: Rc<Viewport>,
}

impl MapViewport {
    pub fn new(map: Rc<dyn MapCamera>) -> Self {
        Self::with_config(map, ViewportConfig::default())
    }

    pub fn with_config(map: Rc<dyn MapCamera>, config: ViewportConfig) -> Self {
        Self::with_clock(map, Rc::new(SystemClock), config)
    }

    /// Like [`with_config`](Self::with_config) with a custom time source.
    pub fn with_clock(
        map: Rc<dyn MapCamera>,
        clock: Rc<dyn Clock>,
        config: ViewportConfig,
    ) -> Self {
        let runner = CameraAnimatorsRunner::new(clock.clone());
        let manager = Rc::new(CameraAnimationsManager::new(
            runner.clone(),
            map.clone(),
            clock,
        ));
        manager.set_animations_enabled(config.animations_enabled);

        let default_transition =
            DefaultTransition::new(config.default_transition, manager.clone());
        let viewport = Viewport::new(
            map.clone(),
            Rc::new(default_transition).into(),
            config.viewport,
        );

        log::debug!("map viewport created with {:?}", config);
        Self {
            map,
            runner,
            manager,
            viewport,
        }
    }

    /// Advance running camera animations. Call once per display refresh.
    pub fn tick(&self) {
        self.runner.update();
    }

    pub fn viewport(&self) -> &Rc<Viewport> {
        &self.viewport
    }

    pub fn camera(&self) -> &Rc<CameraAnimationsManager> {
        &self.manager
    }

    pub fn runner(&self) -> &Rc<CameraAnimatorsRunner> {
        &self.runner
    }

    pub fn set_animations_enabled(&self, enabled: bool) {
        self.manager.set_animations_enabled(enabled);
    }

    pub fn make_follow_state(
        &self,
        position: Signal<TrackedPosition>,
        options: FollowOptions,
    ) -> Rc<FollowState> {
        FollowState::new(position, options, self.manager.clone())
    }

    pub fn make_overview_state(
        &self,
        options: OverviewOptions,
        fit: Rc<dyn CameraFit>,
    ) -> Rc<OverviewState> {
        OverviewState::new(options, fit, self.manager.clone())
    }

    pub fn make_fixed_state(&self, camera: CameraOptions) -> Rc<CameraViewportState> {
        CameraViewportState::fixed(camera, self.map.clone())
    }

    pub fn make_style_default_state(
        &self,
        padding: EdgeInsets,
        style: Rc<dyn StyleMetadata>,
    ) -> Rc<CameraViewportState> {
        CameraViewportState::style_default(padding, style, self.map.clone())
    }

    pub fn make_default_transition(
        &self,
        options: DefaultTransitionOptions,
    ) -> Rc<DefaultTransition> {
        Rc::new(DefaultTransition::new(options, self.manager.clone()))
    }

    pub fn make_immediate_transition(&self) -> Rc<ImmediateTransition> {
        Rc::new(ImmediateTransition::new(self.map.clone()))
    }
}
